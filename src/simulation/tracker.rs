//! All six simulators behind one value

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::config::TrackerConfig;
use crate::core::error::Result;
use crate::simulation::delivery::{DeliveryMetrics, DeliverySimulator};
use crate::simulation::incidents::{IncidentSimulator, IncidentStats};
use crate::simulation::reindeer::{ReindeerSimulator, TeamAverages};
use crate::simulation::runner::SimulatorHandle;
use crate::simulation::sleigh::{SleighMetrics, SleighSimulator};
use crate::simulation::weather::{CurrentWeather, WeatherSimulator};
use crate::simulation::workshop::{WorkshopMetrics, WorkshopSimulator};
use crate::telemetry::Telemetry;

/// Point-in-time view across every simulator
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerSummary {
    pub sleigh: SleighMetrics,
    pub reindeer: TeamAverages,
    pub workshop: WorkshopMetrics,
    pub delivery: DeliveryMetrics,
    pub weather: CurrentWeather,
    pub incidents: IncidentStats,
}

pub struct SantaTracker {
    pub sleigh: SimulatorHandle<SleighSimulator>,
    pub reindeer: SimulatorHandle<ReindeerSimulator>,
    pub workshop: SimulatorHandle<WorkshopSimulator>,
    pub delivery: SimulatorHandle<DeliverySimulator>,
    pub weather: SimulatorHandle<WeatherSimulator>,
    pub incidents: SimulatorHandle<IncidentSimulator>,
}

impl SantaTracker {
    pub fn new(config: &TrackerConfig, telemetry: Telemetry) -> Self {
        Self::new_at(config, telemetry, Utc::now())
    }

    /// Build every simulator with the same start instant
    pub fn new_at(config: &TrackerConfig, telemetry: Telemetry, now: DateTime<Utc>) -> Self {
        Self {
            sleigh: SimulatorHandle::new(SleighSimulator::new(config, now), telemetry.clone()),
            reindeer: SimulatorHandle::new(ReindeerSimulator::new(config, now), telemetry.clone()),
            workshop: SimulatorHandle::new(WorkshopSimulator::new(config, now), telemetry.clone()),
            delivery: SimulatorHandle::new(DeliverySimulator::new(config, now), telemetry.clone()),
            weather: SimulatorHandle::new(WeatherSimulator::new(config, now), telemetry.clone()),
            incidents: SimulatorHandle::new(IncidentSimulator::new(config, now), telemetry),
        }
    }

    /// Start every tick task; stops the ones already started if any fails
    pub fn start_all(&self) -> Result<()> {
        let started = self
            .sleigh
            .start()
            .and_then(|_| self.reindeer.start())
            .and_then(|_| self.workshop.start())
            .and_then(|_| self.delivery.start())
            .and_then(|_| self.weather.start())
            .and_then(|_| self.incidents.start());

        if let Err(err) = started {
            tracing::error!(error = %err, "failed to start simulators");
            self.stop_all();
            return Err(err);
        }
        tracing::info!("all simulators running");
        Ok(())
    }

    pub fn stop_all(&self) {
        for (name, running) in self.running() {
            if !running {
                continue;
            }
            match name {
                "sleigh" => self.sleigh.stop(),
                "reindeer" => self.reindeer.stop(),
                "workshop" => self.workshop.stop(),
                "delivery" => self.delivery.stop(),
                "weather" => self.weather.stop(),
                _ => self.incidents.stop(),
            }
        }
    }

    /// Running flag per simulator name
    pub fn running(&self) -> [(&'static str, bool); 6] {
        [
            ("sleigh", self.sleigh.is_running()),
            ("reindeer", self.reindeer.is_running()),
            ("workshop", self.workshop.is_running()),
            ("delivery", self.delivery.is_running()),
            ("weather", self.weather.is_running()),
            ("incidents", self.incidents.is_running()),
        ]
    }

    /// Tick every simulator once at `now`, in dependency-free order
    pub fn tick_all_at(&self, now: DateTime<Utc>) {
        self.sleigh.tick_at(now);
        self.reindeer.tick_at(now);
        self.workshop.tick_at(now);
        self.delivery.tick_at(now);
        self.weather.tick_at(now);
        self.incidents.tick_at(now);
    }

    pub fn summary(&self) -> TrackerSummary {
        TrackerSummary {
            sleigh: self.sleigh.read(|s| s.metrics()),
            reindeer: self.reindeer.read(|r| r.team_averages()),
            workshop: self.workshop.read(|w| w.metrics()),
            delivery: self.delivery.read(|d| d.metrics()),
            weather: self.weather.read(|w| w.current_weather()),
            incidents: self.incidents.read(|i| i.stats()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::TrackerError;
    use crate::telemetry::MemorySink;
    use std::sync::Arc;

    fn config() -> TrackerConfig {
        TrackerConfig {
            seed: Some(11),
            ..TrackerConfig::default()
        }
    }

    #[test]
    fn test_start_without_runtime_leaves_everything_stopped() {
        let tracker = SantaTracker::new(&config(), Telemetry::disabled());
        let err = tracker.start_all().unwrap_err();
        assert!(matches!(err, TrackerError::NoRuntime("sleigh")));
        assert!(tracker.running().iter().all(|(_, running)| !running));
    }

    #[test]
    fn test_tick_all_publishes_from_every_simulator() {
        let sink = Arc::new(MemorySink::new());
        let start = Utc::now();
        let tracker = SantaTracker::new_at(&config(), Telemetry::new(sink.clone()), start);

        tracker.tick_all_at(start + chrono::Duration::seconds(30));

        assert_eq!(sink.events_named("SantaLocation").len(), 1);
        assert_eq!(sink.events_named("ReindeerTeamStatus").len(), 1);
        assert_eq!(sink.events_named("WorkshopMetrics").len(), 1);
        assert_eq!(sink.events_named("GiftDelivery").len(), 1);
        assert_eq!(sink.events_named("WeatherConditions").len(), 1);
        assert_eq!(sink.metric_values("Custom/Incidents/Active").len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_and_stop_all() {
        let tracker = SantaTracker::new(&config(), Telemetry::disabled());
        tracker.start_all().unwrap();
        assert!(tracker.running().iter().all(|(_, running)| *running));

        tracker.stop_all();
        assert!(tracker.running().iter().all(|(_, running)| !running));

        // Second stop is harmless
        tracker.stop_all();
    }
}
