pub mod clock;
pub mod config;
pub mod error;
pub mod types;

pub use clock::{SimClock, SIMULATION_SPEED_MULTIPLIER};
pub use config::TrackerConfig;
pub use error::{Result, TrackerError};
pub use types::Mode;
