//! Sleigh position, route progress and vehicle health

use std::time::Duration;

use ahash::AHashSet;
use chrono::{DateTime, Utc};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::core::clock::SimClock;
use crate::core::config::TrackerConfig;
use crate::core::types::{simulation_rng, Mode, Position};
use crate::simulation::route::{world_route, RouteStop};
use crate::simulation::runner::Simulator;
use crate::spatial::{distance_miles, heading_degrees, interpolate};
use crate::telemetry::Telemetry;

const STOPS_PER_HOUR: f64 = 20.0;
const FUEL_THRESHOLDS: [u32; 4] = [75, 50, 40, 20];
const JOURNEY_MILESTONES: [(f64, &str); 4] = [
    (90.0, "Almost there! Just a few more chimneys to go!"),
    (75.0, "Three quarters complete - the finish line is in sight!"),
    (50.0, "HALFWAY DONE! The night is still young!"),
    (25.0, "Quarter of the way there - just getting warmed up!"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigationStatus {
    Optimal,
    Degraded,
    Critical,
}

impl NavigationStatus {
    /// Classify from the magic fuel level
    pub fn from_fuel(fuel: f64) -> Self {
        if fuel < 20.0 {
            NavigationStatus::Critical
        } else if fuel < 40.0 {
            NavigationStatus::Degraded
        } else {
            NavigationStatus::Optimal
        }
    }
}

/// Snapshot of where the sleigh is and how it is flying
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleighMetrics {
    pub position: Position,
    /// Mach number
    pub speed: f64,
    pub heading: f64,
    pub altitude: f64,
    pub magic_fuel_level: f64,
    pub structural_integrity: f64,
    pub navigation_status: NavigationStatus,
    pub next_stop: String,
    pub distance_to_next_stop: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackerStatus {
    Online,
    Offline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
    Connected,
    Disconnected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineHealth {
    /// Percent of rated output
    pub performance: f64,
    /// Degrees Fahrenheit
    pub temperature: f64,
    /// Gigawatts
    pub magic_output: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationHealth {
    /// Meters
    pub gps_accuracy: f64,
    pub star_tracker_status: TrackerStatus,
    pub compass_calibration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunicationHealth {
    pub north_pole_link: LinkStatus,
    /// Milliseconds
    pub latency: f64,
    /// Mbps
    pub bandwidth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleighHealth {
    pub engine: EngineHealth,
    pub navigation: NavigationHealth,
    pub communication: CommunicationHealth,
}

impl Default for SleighHealth {
    fn default() -> Self {
        Self {
            engine: EngineHealth {
                performance: 100.0,
                temperature: 72.0,
                magic_output: 21.5,
            },
            navigation: NavigationHealth {
                gps_accuracy: 0.5,
                star_tracker_status: TrackerStatus::Online,
                compass_calibration: 100.0,
            },
            communication: CommunicationHealth {
                north_pole_link: LinkStatus::Connected,
                latency: 12.0,
                bandwidth: 1000.0,
            },
        }
    }
}

pub struct SleighSimulator {
    mode: Mode,
    interval: Duration,
    clock: SimClock,
    rng: ChaCha8Rng,
    route: Vec<RouteStop>,
    current_stop_index: usize,
    metrics: SleighMetrics,
    health: SleighHealth,
    previous_stop_index: usize,
    fuel_thresholds_logged: AHashSet<u32>,
}

impl SleighSimulator {
    pub const STREAM: u64 = 1;

    /// Sleigh parked at the North Pole, facing south
    pub fn new(config: &TrackerConfig, now: DateTime<Utc>) -> Self {
        let route = world_route();
        let next_stop = route
            .first()
            .map_or_else(|| "North Pole".to_string(), |s| s.city.clone());

        tracing::info!(
            total_stops = route.len(),
            mode = config.mode.label(),
            "sleigh simulator initialized"
        );

        Self {
            mode: config.mode,
            interval: config.sleigh_interval(),
            clock: SimClock::new(now),
            rng: simulation_rng(config.seed, Self::STREAM),
            metrics: SleighMetrics {
                position: Position::new(90.0, 0.0, 45_000.0),
                speed: 0.0,
                heading: 180.0,
                altitude: 45_000.0,
                magic_fuel_level: 100.0,
                structural_integrity: 100.0,
                navigation_status: NavigationStatus::Optimal,
                next_stop,
                distance_to_next_stop: 0.0,
                timestamp: now,
            },
            health: SleighHealth::default(),
            route,
            current_stop_index: 0,
            previous_stop_index: 0,
            fuel_thresholds_logged: AHashSet::new(),
        }
    }

    pub fn metrics(&self) -> SleighMetrics {
        self.metrics.clone()
    }

    pub fn health(&self) -> SleighHealth {
        self.health.clone()
    }

    pub fn route(&self) -> Vec<RouteStop> {
        self.route.clone()
    }

    pub fn current_stop(&self) -> Option<RouteStop> {
        self.route.get(self.current_stop_index).cloned()
    }

    pub fn current_stop_index(&self) -> usize {
        self.current_stop_index
    }

    pub fn percent_complete(&self) -> f64 {
        if self.route.is_empty() {
            return 0.0;
        }
        self.current_stop_index as f64 / self.route.len() as f64 * 100.0
    }

    fn update_route_planning(&mut self, hours: f64, now: DateTime<Utc>) {
        // Test flights over the workshop: overlapping waves keep the charts moving
        let minutes = hours * 60.0;
        let speed = (3.5 + (minutes / 5.0).sin() * 2.0 + (minutes / 3.0).cos() * 1.5).clamp(1.0, 6.0);
        let altitude = (42_500.0 + (minutes / 7.0).sin() * 5000.0 + (minutes / 4.0).cos() * 3000.0)
            .clamp(35_000.0, 50_000.0);

        self.metrics.speed = speed;
        self.metrics.altitude = altitude;
        self.metrics.position.altitude = altitude;
        self.metrics.magic_fuel_level = 98.0 + self.rng.gen_range(0.0..2.0);
        self.metrics.structural_integrity = 99.0 + self.rng.gen_range(0.0..1.0);
        self.metrics.navigation_status = NavigationStatus::Optimal;
        self.metrics.timestamp = now;

        self.health.engine.performance = 95.0 + self.rng.gen_range(0.0..5.0);
        self.health.navigation.gps_accuracy = 0.3 + self.rng.gen_range(0.0..0.5);
        self.health.communication.latency = 10.0 + self.rng.gen_range(0.0..10.0);
    }

    fn update_christmas_eve(&mut self, hours: f64, now: DateTime<Utc>) {
        let last_index = self.route.len().saturating_sub(1);
        let expected = hours * STOPS_PER_HOUR;
        let expected_index = expected.floor() as usize;
        if expected_index > self.current_stop_index {
            self.current_stop_index = expected_index.min(last_index);
        }

        let (current, next) = match (
            self.route.get(self.current_stop_index),
            self.route.get(self.current_stop_index + 1),
        ) {
            (Some(current), Some(next)) => (current.clone(), next.clone()),
            // Final stop reached: hold steady
            _ => return,
        };

        let progress = (expected - self.current_stop_index as f64).clamp(0.0, 1.0);
        let here = interpolate(&current.location, &next.location, progress);
        let heading = heading_degrees(&current.location, &next.location);
        let distance = distance_miles(&here, &next.location);

        let fraction = hours / 24.0;
        let speed = (5.0 + hours.sin() * 2.0).clamp(2.0, 8.0);
        let fuel = (100.0 - fraction * 40.0 + self.rng.gen_range(0.0..5.0)).clamp(30.0, 100.0);
        let integrity = (100.0 - fraction * 10.0).max(85.0);
        let navigation_status = NavigationStatus::from_fuel(fuel);
        let altitude = 40_000.0 + self.rng.gen_range(0.0..10_000.0);

        let engine_performance = (100.0 - fraction * 20.0 + self.rng.gen_range(0.0..5.0)).max(70.0);
        let latency = 12.0 + fraction * 50.0 + self.rng.gen_range(0.0..20.0);

        self.log_stop_progress(&current, &next, speed, heading, distance);
        self.log_fuel_thresholds(fuel);

        if navigation_status != self.metrics.navigation_status {
            let previous = self.metrics.navigation_status;
            match navigation_status {
                NavigationStatus::Optimal => tracing::info!(
                    ?previous,
                    "navigation optimal, as precise as Rudolph's nose is bright"
                ),
                NavigationStatus::Degraded => tracing::warn!(
                    ?previous,
                    fuel = fuel.round(),
                    "navigation degraded, a bit cloudy but Santa knows the way"
                ),
                NavigationStatus::Critical => tracing::error!(
                    ?previous,
                    fuel = fuel.round(),
                    "GPS is acting naughty, manual navigation engaged"
                ),
            }
        }

        if integrity < 90.0 && self.metrics.structural_integrity >= 90.0 {
            tracing::warn!(integrity = integrity.round(), "sleigh integrity below 90%");
        }
        if engine_performance < 80.0 && self.health.engine.performance >= 80.0 {
            tracing::warn!(
                performance = engine_performance.round(),
                "engine performance below 80%, could use some North Pole TLC"
            );
        }
        if latency > 50.0 && self.health.communication.latency <= 50.0 {
            tracing::warn!(latency_ms = latency.round(), "North Pole link getting laggy");
        }

        self.metrics = SleighMetrics {
            position: Position::new(here.lat, here.lng, altitude),
            speed,
            heading,
            altitude,
            magic_fuel_level: fuel,
            structural_integrity: integrity,
            navigation_status,
            next_stop: next.city.clone(),
            distance_to_next_stop: distance,
            timestamp: now,
        };

        self.health.engine.performance = engine_performance;
        self.health.engine.temperature = 72.0 + fraction * 30.0 + self.rng.gen_range(0.0..10.0);
        self.health.engine.magic_output = (21.5 - fraction * 5.0).max(15.0);
        self.health.navigation.gps_accuracy = 0.5 + fraction * 2.0;
        self.health.communication.latency = latency;

        self.previous_stop_index = self.current_stop_index;
    }

    /// Stop just left behind, if this tick moved past one after takeoff
    fn completed_stop(&self) -> Option<&RouteStop> {
        if self.previous_stop_index == 0 || self.current_stop_index <= self.previous_stop_index {
            return None;
        }
        self.route.get(self.previous_stop_index)
    }

    fn log_stop_progress(
        &self,
        current: &RouteStop,
        next: &RouteStop,
        speed: f64,
        heading: f64,
        distance: f64,
    ) {
        if self.current_stop_index <= self.previous_stop_index {
            return;
        }

        let total = self.route.len();
        let percent = self.percent_complete();
        if let Some(completed) = self.completed_stop() {
            tracing::info!(
                city = %completed.city,
                country = %completed.country,
                gifts = completed.estimated_gifts,
                stop = self.current_stop_index,
                total_stops = total,
                "stop complete"
            );
        }

        let previous_percent = self.previous_stop_index as f64 / total as f64 * 100.0;
        if let Some((mark, message)) = JOURNEY_MILESTONES
            .iter()
            .find(|(mark, _)| percent >= *mark && previous_percent < *mark)
        {
            tracing::info!(
                milestone = mark,
                percent = percent.round(),
                remaining_stops = total - self.current_stop_index,
                "{}",
                message
            );
        }

        if self.current_stop_index % 10 == 0 {
            tracing::info!(
                city = %current.city,
                speed = %format!("{:.1}", speed),
                heading = heading.round(),
                next_stop = %next.city,
                distance_miles = distance.round(),
                "Ho ho ho! Santa's sleigh is soaring overhead"
            );
        }
    }

    fn log_fuel_thresholds(&mut self, fuel: f64) {
        for threshold in FUEL_THRESHOLDS {
            if fuel <= f64::from(threshold) && self.fuel_thresholds_logged.insert(threshold) {
                if threshold > 40 {
                    tracing::info!(threshold, fuel = fuel.round(), "magic fuel threshold reached");
                } else {
                    tracing::warn!(threshold, fuel = fuel.round(), "magic fuel running low");
                }
            }
        }
    }

    fn publish(&self, telemetry: &Telemetry) {
        let m = &self.metrics;
        telemetry.event(
            "SantaLocation",
            &json!({
                "latitude": m.position.lat,
                "longitude": m.position.lng,
                "altitude": m.position.altitude,
                "speed": m.speed,
                "heading": m.heading,
                "magicFuelLevel": m.magic_fuel_level,
                "structuralIntegrity": m.structural_integrity,
                "navigationStatus": m.navigation_status,
                "nextStop": m.next_stop,
                "distanceToNextStop": m.distance_to_next_stop,
                "timestamp": m.timestamp,
                "mode": self.mode.label(),
                "stopIndex": self.current_stop_index,
                "totalStops": self.route.len(),
                "percentComplete": self.percent_complete(),
            }),
        );

        let h = &self.health;
        telemetry.metric("Custom/Sleigh/Speed", m.speed);
        telemetry.metric("Custom/Sleigh/Altitude", m.altitude);
        telemetry.metric("Custom/Sleigh/FuelLevel", m.magic_fuel_level);
        telemetry.metric("Custom/Sleigh/StructuralIntegrity", m.structural_integrity);
        telemetry.metric("Custom/Sleigh/EnginePerformance", h.engine.performance);
        telemetry.metric("Custom/Sleigh/EngineTemperature", h.engine.temperature);
        telemetry.metric("Custom/Sleigh/MagicOutput", h.engine.magic_output);
        telemetry.metric("Custom/Sleigh/GPSAccuracy", h.navigation.gps_accuracy);
        telemetry.metric("Custom/Sleigh/CommunicationLatency", h.communication.latency);
    }
}

impl Simulator for SleighSimulator {
    fn name(&self) -> &'static str {
        "sleigh"
    }

    fn tick_interval(&self) -> Duration {
        self.interval
    }

    fn tick(&mut self, now: DateTime<Utc>, telemetry: &Telemetry) {
        let hours = self.clock.hours_elapsed(now);
        match self.mode {
            Mode::Planning => self.update_route_planning(hours, now),
            Mode::ChristmasEve => self.update_christmas_eve(hours, now),
        }
        self.publish(telemetry);
    }
}
