//! Tracker configuration with documented defaults
//!
//! Tick cadences default per mode; a TOML file can override any of them.
//!
//! ```toml
//! mode = "christmas-eve"
//! seed = 2024
//! log_filter = "santa_tracker=debug"
//!
//! [intervals]
//! sleigh_ms = 1000
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, TrackerError};
use crate::core::types::Mode;

/// Configuration shared by all six simulators
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Scenario to run
    pub mode: Mode,

    /// Seed for every simulator's random stream
    ///
    /// `None` seeds from entropy, which is what a live dashboard wants.
    pub seed: Option<u64>,

    /// Default `tracing` filter directive when `RUST_LOG` is unset
    pub log_filter: String,

    /// Capacity of the outbound telemetry channel
    ///
    /// Records are dropped (and a warning logged) when the consumer falls
    /// this far behind.
    pub telemetry_buffer: usize,

    /// Per-simulator tick overrides
    pub intervals: IntervalOverrides,
}

/// Tick interval overrides in milliseconds
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IntervalOverrides {
    pub sleigh_ms: Option<u64>,
    pub reindeer_ms: Option<u64>,
    pub workshop_ms: Option<u64>,
    pub delivery_ms: Option<u64>,
    pub weather_ms: Option<u64>,
    pub incident_ms: Option<u64>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            mode: Mode::ChristmasEve,
            seed: None,
            log_filter: "santa_tracker=info".into(),
            telemetry_buffer: 4096,
            intervals: IntervalOverrides::default(),
        }
    }
}

impl TrackerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let overrides = [
            ("sleigh_ms", self.intervals.sleigh_ms),
            ("reindeer_ms", self.intervals.reindeer_ms),
            ("workshop_ms", self.intervals.workshop_ms),
            ("delivery_ms", self.intervals.delivery_ms),
            ("weather_ms", self.intervals.weather_ms),
            ("incident_ms", self.intervals.incident_ms),
        ];

        for (name, value) in overrides {
            if value == Some(0) {
                return Err(TrackerError::InvalidConfig(format!(
                    "intervals.{} must be positive",
                    name
                )));
            }
        }

        if self.telemetry_buffer == 0 {
            return Err(TrackerError::InvalidConfig(
                "telemetry_buffer must be positive".into(),
            ));
        }

        Ok(())
    }

    /// Sleigh ticks faster on Christmas Eve
    pub fn sleigh_interval(&self) -> Duration {
        let default = if self.mode.is_christmas_eve() { 2000 } else { 5000 };
        Duration::from_millis(self.intervals.sleigh_ms.unwrap_or(default))
    }

    pub fn reindeer_interval(&self) -> Duration {
        Duration::from_millis(self.intervals.reindeer_ms.unwrap_or(3000))
    }

    pub fn workshop_interval(&self) -> Duration {
        Duration::from_millis(self.intervals.workshop_ms.unwrap_or(4000))
    }

    pub fn delivery_interval(&self) -> Duration {
        let default = if self.mode.is_christmas_eve() { 2000 } else { 5000 };
        Duration::from_millis(self.intervals.delivery_ms.unwrap_or(default))
    }

    pub fn weather_interval(&self) -> Duration {
        Duration::from_millis(self.intervals.weather_ms.unwrap_or(5000))
    }

    /// How often the incident desk rolls for a new incident
    pub fn incident_interval(&self) -> Duration {
        let default = if self.mode.is_christmas_eve() { 60_000 } else { 120_000 };
        Duration::from_millis(self.intervals.incident_ms.unwrap_or(default))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_intervals_follow_mode() {
        let mut config = TrackerConfig::default();
        assert_eq!(config.sleigh_interval(), Duration::from_millis(2000));
        assert_eq!(config.incident_interval(), Duration::from_secs(60));

        config.mode = Mode::Planning;
        assert_eq!(config.sleigh_interval(), Duration::from_millis(5000));
        assert_eq!(config.delivery_interval(), Duration::from_millis(5000));
        assert_eq!(config.incident_interval(), Duration::from_secs(120));
    }

    #[test]
    fn test_parse_toml_with_overrides() {
        let config = TrackerConfig::from_toml(
            r#"
            mode = "planning"
            seed = 42

            [intervals]
            weather_ms = 250
            "#,
        )
        .expect("config should parse");

        assert_eq!(config.mode, Mode::Planning);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.weather_interval(), Duration::from_millis(250));
        assert_eq!(config.log_filter, "santa_tracker=info");
    }

    #[test]
    fn test_zero_interval_rejected() {
        let result = TrackerConfig::from_toml("[intervals]\nsleigh_ms = 0\n");
        assert!(matches!(result, Err(TrackerError::InvalidConfig(_))));
    }

    #[test]
    fn test_unknown_mode_is_parse_error() {
        let result = TrackerConfig::from_toml("mode = \"boxing-day\"\n");
        assert!(matches!(result, Err(TrackerError::TomlError(_))));
    }
}
