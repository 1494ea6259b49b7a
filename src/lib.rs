//! Santa Tracker - time-compressed Christmas Eve simulation engine

pub mod core;
pub mod simulation;
pub mod spatial;
pub mod telemetry;
