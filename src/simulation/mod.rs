pub mod delivery;
pub mod incidents;
pub mod reindeer;
pub mod route;
pub mod runner;
pub mod sleigh;
pub mod tracker;
pub mod weather;
pub mod workshop;

pub use delivery::DeliverySimulator;
pub use incidents::IncidentSimulator;
pub use reindeer::{ReindeerName, ReindeerSimulator};
pub use runner::{Simulator, SimulatorHandle};
pub use sleigh::SleighSimulator;
pub use tracker::{SantaTracker, TrackerSummary};
pub use weather::WeatherSimulator;
pub use workshop::WorkshopSimulator;
