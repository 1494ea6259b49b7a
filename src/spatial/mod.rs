pub mod geo;

pub use self::geo::{distance_miles, heading_degrees, interpolate, EARTH_RADIUS_MILES};
