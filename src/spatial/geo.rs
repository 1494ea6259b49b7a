//! Great-circle helpers for the sleigh route
//!
//! Headings come from `geo`'s haversine bearing; distance keeps its own
//! haversine so the earth radius stays at 3959 miles.

use geo::{HaversineBearing, Point};

use crate::core::types::Position;

/// Earth radius used for all route distances
pub const EARTH_RADIUS_MILES: f64 = 3959.0;

fn to_point(position: &Position) -> Point<f64> {
    Point::new(position.lng, position.lat)
}

/// Initial bearing from `from` to `to`, normalized to [0, 360)
pub fn heading_degrees(from: &Position, to: &Position) -> f64 {
    let bearing = to_point(from).haversine_bearing(to_point(to));
    (bearing + 360.0) % 360.0
}

/// Haversine great-circle distance in miles (altitude ignored)
pub fn distance_miles(from: &Position, to: &Position) -> f64 {
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lng = (to.lng - from.lng).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + from.lat.to_radians().cos() * to.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);

    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_MILES * c
}

/// Straight lat/lng blend between two stops; `t` is clamped to [0, 1]
pub fn interpolate(from: &Position, to: &Position, t: f64) -> Position {
    let t = t.clamp(0.0, 1.0);
    Position::new(
        from.lat + (to.lat - from.lat) * t,
        from.lng + (to.lng - from.lng) * t,
        from.altitude + (to.altitude - from.altitude) * t,
    )
}
