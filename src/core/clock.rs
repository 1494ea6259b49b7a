//! Time compression for the Christmas Eve run
//!
//! Ten real minutes cover the whole 24 simulated hours. Every simulator uses
//! the same multiplier but keeps its own start instant, so two simulators
//! started a few milliseconds apart drift by that much.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Real time is multiplied by this to get simulated time (24h / 10min)
pub const SIMULATION_SPEED_MULTIPLIER: f64 = 144.0;

const MS_PER_MINUTE: f64 = 60_000.0;
const MS_PER_HOUR: f64 = 3_600_000.0;

/// Simulated hours represented by `elapsed_ms` of wall-clock time
pub fn simulated_hours(elapsed_ms: f64) -> f64 {
    (elapsed_ms.max(0.0) / MS_PER_HOUR) * SIMULATION_SPEED_MULTIPLIER
}

/// Simulated minutes represented by `elapsed_ms` of wall-clock time
pub fn simulated_minutes(elapsed_ms: f64) -> f64 {
    (elapsed_ms.max(0.0) / MS_PER_MINUTE) * SIMULATION_SPEED_MULTIPLIER
}

/// Start instant of one simulator's run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimClock {
    started_at: DateTime<Utc>,
}

impl SimClock {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self { started_at }
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Wall-clock milliseconds since start (never negative)
    pub fn elapsed_ms(&self, now: DateTime<Utc>) -> f64 {
        (now - self.started_at).num_milliseconds().max(0) as f64
    }

    pub fn hours_elapsed(&self, now: DateTime<Utc>) -> f64 {
        simulated_hours(self.elapsed_ms(now))
    }

    pub fn minutes_elapsed(&self, now: DateTime<Utc>) -> f64 {
        simulated_minutes(self.elapsed_ms(now))
    }

    /// Restart the clock, e.g. at a shift change
    pub fn reset(&mut self, now: DateTime<Utc>) {
        self.started_at = now;
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}
