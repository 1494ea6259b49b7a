//! Operational incidents and their auto-resolution
//!
//! Incidents age in real wall-clock time, not simulated time: a critical
//! incident stays open for half an hour of the operator's day even though
//! the sleigh covers several simulated hours in that window.

use std::time::Duration;

use ahash::AHashMap;
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::core::config::TrackerConfig;
use crate::core::types::{simulation_rng, Mode};
use crate::simulation::runner::Simulator;
use crate::telemetry::Telemetry;

const LOCATIONS: [&str; 12] = [
    "Over Pacific Ocean",
    "Tokyo Airspace",
    "North Pole",
    "London Region",
    "New York Metro",
    "Sydney Harbor",
    "Moscow Vicinity",
    "Dubai Airspace",
    "São Paulo Region",
    "Cairo District",
    "Mumbai Sector",
    "Beijing Area",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IncidentKind {
    WeatherDelay,
    ReindeerFatigue,
    ChimneyObstruction,
    AirspaceConflict,
    FuelLow,
    GiftMismatch,
    NavigationError,
    CommunicationLoss,
}

impl IncidentKind {
    pub const ALL: [IncidentKind; 8] = [
        IncidentKind::WeatherDelay,
        IncidentKind::ReindeerFatigue,
        IncidentKind::ChimneyObstruction,
        IncidentKind::AirspaceConflict,
        IncidentKind::FuelLow,
        IncidentKind::GiftMismatch,
        IncidentKind::NavigationError,
        IncidentKind::CommunicationLoss,
    ];

    /// Percent weights for low, medium, high and critical
    fn severity_weights(&self) -> [u32; 4] {
        match self {
            IncidentKind::WeatherDelay => [20, 50, 25, 5],
            IncidentKind::ReindeerFatigue => [10, 40, 40, 10],
            IncidentKind::ChimneyObstruction => [60, 30, 10, 0],
            IncidentKind::AirspaceConflict => [30, 50, 15, 5],
            IncidentKind::FuelLow => [5, 30, 45, 20],
            IncidentKind::GiftMismatch => [50, 40, 10, 0],
            IncidentKind::NavigationError => [20, 40, 30, 10],
            IncidentKind::CommunicationLoss => [30, 40, 25, 5],
        }
    }

    fn titles(&self) -> &'static [&'static str] {
        match self {
            IncidentKind::WeatherDelay => &[
                "Severe Weather Detected",
                "Blizzard Conditions",
                "Heavy Snowfall Slowing Delivery",
            ],
            IncidentKind::ReindeerFatigue => &["Reindeer Energy Low", "Team Fatigue Warning", "Rest Break Needed"],
            IncidentKind::ChimneyObstruction => &[
                "Chimney Access Blocked",
                "Entry Point Compromised",
                "Alternative Route Required",
            ],
            IncidentKind::AirspaceConflict => &[
                "Airspace Coordination Issue",
                "Flight Path Conflict",
                "Route Adjustment Needed",
            ],
            IncidentKind::FuelLow => &[
                "Magic Fuel Below Threshold",
                "Energy Reserves Depleting",
                "Refuel Required",
            ],
            IncidentKind::GiftMismatch => &[
                "Inventory Discrepancy",
                "Gift Manifest Error",
                "List Synchronization Issue",
            ],
            IncidentKind::NavigationError => &["GPS Malfunction", "Star Tracker Offline", "Position Uncertainty"],
            IncidentKind::CommunicationLoss => &[
                "North Pole Link Down",
                "Communication Interrupted",
                "Signal Degradation",
            ],
        }
    }

    fn descriptions(&self) -> &'static [&'static str] {
        match self {
            IncidentKind::WeatherDelay => &[
                "Intense snowstorm reducing visibility to near zero. Sleigh speed reduced by 40%.",
                "Unexpected blizzard forcing altitude adjustment. Navigation systems compensating.",
                "High winds creating turbulence. Reindeer maintaining formation with difficulty.",
            ],
            IncidentKind::ReindeerFatigue => &[
                "Multiple reindeer showing signs of exhaustion. Reducing speed to conserve energy.",
                "Dasher and Dancer energy levels below optimal. Brief landing recommended.",
                "Team morale declining after continuous flight. Cookie break scheduled.",
            ],
            IncidentKind::ChimneyObstruction => &[
                "Chimney blocked by debris. Searching for alternative entry point.",
                "Fireplace active - too hot for safe entry. Waiting for clearance.",
                "Chimney too narrow for standard approach. Deploying miniaturization protocol.",
            ],
            IncidentKind::AirspaceConflict => &[
                "Commercial aircraft detected in delivery zone. Adjusting altitude.",
                "Military training exercise active. Coordinating with local authorities.",
                "Drone activity reported. Temporary route deviation required.",
            ],
            IncidentKind::FuelLow => &[
                "Magic fuel at 35%. Landing at intermediate checkpoint for replenishment.",
                "Unexpected energy consumption detected. Optimizing power distribution.",
                "Fuel efficiency degraded due to weather. Emergency reserves activated.",
            ],
            IncidentKind::GiftMismatch => &[
                "Naughty/Nice list update not synced. Reconciling data with North Pole.",
                "Gift count mismatch detected. Reindexing inventory database.",
                "Last-minute list changes causing delays. Updating delivery priorities.",
            ],
            IncidentKind::NavigationError => &[
                "Northern lights interfering with GPS signal. Switching to star navigation.",
                "Compass calibration drift detected. Recalibrating navigation systems.",
                "Magnetic anomaly affecting heading. Manual course correction applied.",
            ],
            IncidentKind::CommunicationLoss => &[
                "Lost contact with mission control. Operating on cached instructions.",
                "Satellite link unstable. Switching to backup communication channels.",
                "Aurora borealis causing radio interference. Restoring communication.",
            ],
        }
    }

    fn impacted_systems(&self) -> &'static [&'static str] {
        match self {
            IncidentKind::WeatherDelay => &["Navigation", "Flight Control", "Weather Monitoring"],
            IncidentKind::ReindeerFatigue => &["Propulsion", "Team Performance", "Health Monitoring"],
            IncidentKind::ChimneyObstruction => &["Delivery System", "Entry Protocol"],
            IncidentKind::AirspaceConflict => &["Traffic Control", "Route Planning", "Communication"],
            IncidentKind::FuelLow => &["Power Management", "Engine Control", "Fuel System"],
            IncidentKind::GiftMismatch => &["Inventory", "Database Sync", "List Management"],
            IncidentKind::NavigationError => &["GPS", "Star Tracker", "Compass", "Navigation Computer"],
            IncidentKind::CommunicationLoss => &["Satellite Link", "Radio", "North Pole Uplink"],
        }
    }

    /// The production failure this incident stands in for
    pub fn real_world_analogy(&self) -> &'static str {
        match self {
            IncidentKind::WeatherDelay => "Network latency spike due to infrastructure issues",
            IncidentKind::ReindeerFatigue => "Server CPU/Memory exhaustion requiring scaling",
            IncidentKind::ChimneyObstruction => "API endpoint timeout or blocked route",
            IncidentKind::AirspaceConflict => "Rate limiting or throttling from external service",
            IncidentKind::FuelLow => "Resource exhaustion - memory leak or connection pool depletion",
            IncidentKind::GiftMismatch => "Data inconsistency between services or cache invalidation",
            IncidentKind::NavigationError => "Service discovery failure or DNS resolution issues",
            IncidentKind::CommunicationLoss => "Message queue failure or service mesh communication breakdown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl IncidentSeverity {
    const ORDERED: [IncidentSeverity; 4] = [
        IncidentSeverity::Low,
        IncidentSeverity::Medium,
        IncidentSeverity::High,
        IncidentSeverity::Critical,
    ];

    /// Pick a severity from a roll in [0, 100) against cumulative weights
    pub fn from_roll(kind: IncidentKind, roll: f64) -> Self {
        let mut cumulative = 0.0;
        for (severity, weight) in Self::ORDERED.iter().zip(kind.severity_weights()) {
            cumulative += f64::from(weight);
            if roll < cumulative {
                return *severity;
            }
        }
        IncidentSeverity::Critical
    }

    /// Wall-clock time an incident stays open
    pub fn resolution_window(&self) -> chrono::Duration {
        match self {
            IncidentSeverity::Low => chrono::Duration::minutes(5),
            IncidentSeverity::Medium => chrono::Duration::minutes(10),
            IncidentSeverity::High => chrono::Duration::minutes(20),
            IncidentSeverity::Critical => chrono::Duration::minutes(30),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentStatus {
    Active,
    Investigating,
    Resolved,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: IncidentKind,
    pub severity: IncidentSeverity,
    pub title: String,
    pub description: String,
    pub location: String,
    pub timestamp: DateTime<Utc>,
    pub status: IncidentStatus,
    pub impacted_systems: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution_time: Option<DateTime<Utc>>,
    pub real_world_analogy: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityTally {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub critical: usize,
}

impl SeverityTally {
    fn bump(&mut self, severity: IncidentSeverity) {
        match severity {
            IncidentSeverity::Low => self.low += 1,
            IncidentSeverity::Medium => self.medium += 1,
            IncidentSeverity::High => self.high += 1,
            IncidentSeverity::Critical => self.critical += 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentStats {
    pub active: usize,
    pub resolved: usize,
    pub total: usize,
    pub by_severity: SeverityTally,
}

pub struct IncidentSimulator {
    mode: Mode,
    interval: Duration,
    rng: ChaCha8Rng,
    counter: u64,
    history: Vec<Incident>,
    /// History indices of unresolved incidents, oldest first
    open: Vec<usize>,
    by_id: AHashMap<String, usize>,
}

impl IncidentSimulator {
    pub const STREAM: u64 = 6;

    pub fn new(config: &TrackerConfig, _now: DateTime<Utc>) -> Self {
        tracing::info!(mode = config.mode.label(), "incident generator initialized");
        Self {
            mode: config.mode,
            interval: config.incident_interval(),
            rng: simulation_rng(config.seed, Self::STREAM),
            counter: 0,
            history: Vec::new(),
            open: Vec::new(),
            by_id: AHashMap::new(),
        }
    }

    fn spawn_probability(&self) -> f64 {
        if self.mode.is_christmas_eve() {
            0.35
        } else {
            0.05
        }
    }

    pub fn active_incidents(&self) -> Vec<Incident> {
        self.open.iter().map(|&i| self.history[i].clone()).collect()
    }

    pub fn all_incidents(&self) -> Vec<Incident> {
        self.history.clone()
    }

    pub fn incident(&self, id: &str) -> Option<Incident> {
        self.by_id.get(id).map(|&i| self.history[i].clone())
    }

    pub fn stats(&self) -> IncidentStats {
        let mut by_severity = SeverityTally::default();
        for incident in &self.history {
            by_severity.bump(incident.severity);
        }
        IncidentStats {
            active: self.open.len(),
            resolved: self.history.len() - self.open.len(),
            total: self.history.len(),
            by_severity,
        }
    }

    /// Open a new incident of `kind` and `severity`, returning its id
    pub fn raise(
        &mut self,
        kind: IncidentKind,
        severity: IncidentSeverity,
        now: DateTime<Utc>,
        telemetry: &Telemetry,
    ) -> String {
        self.counter += 1;
        let pick = |options: &'static [&'static str], rng: &mut ChaCha8Rng| {
            options.choose(rng).copied().unwrap_or_default().to_string()
        };

        let incident = Incident {
            id: format!("INC-{}-{}", now.timestamp_millis(), self.counter),
            kind,
            severity,
            title: pick(kind.titles(), &mut self.rng),
            description: pick(kind.descriptions(), &mut self.rng),
            location: pick(&LOCATIONS[..], &mut self.rng),
            timestamp: now,
            status: IncidentStatus::Active,
            impacted_systems: kind.impacted_systems().iter().map(|s| s.to_string()).collect(),
            resolution_time: None,
            real_world_analogy: kind.real_world_analogy().to_string(),
        };

        tracing::warn!(
            id = %incident.id,
            kind = ?incident.kind,
            severity = ?incident.severity,
            location = %incident.location,
            "new incident created"
        );
        telemetry.event("SantaIncident", &incident_event(&incident, "created", None));

        let id = incident.id.clone();
        let index = self.history.len();
        self.history.push(incident);
        self.open.push(index);
        self.by_id.insert(id.clone(), index);
        id
    }

    /// Walk the open incidents: resolve those past their window, mark the
    /// rest as investigating once they are halfway there.
    pub fn review_incidents(&mut self, now: DateTime<Utc>, telemetry: &Telemetry) {
        let history = &mut self.history;
        self.open.retain(|&index| {
            let incident = &mut history[index];
            let age = now - incident.timestamp;
            let window = incident.severity.resolution_window();

            if age > window {
                incident.status = IncidentStatus::Resolved;
                incident.resolution_time = Some(now);
                tracing::info!(
                    id = %incident.id,
                    kind = ?incident.kind,
                    duration_secs = age.num_milliseconds() as f64 / 1000.0,
                    "incident resolved"
                );
                telemetry.event(
                    "SantaIncident",
                    &incident_event(incident, "resolved", Some(age.num_milliseconds())),
                );
                return false;
            }

            if incident.status == IncidentStatus::Active && age > window / 2 {
                incident.status = IncidentStatus::Investigating;
                tracing::info!(id = %incident.id, severity = ?incident.severity, "incident under investigation");
            }
            true
        });
    }

    fn maybe_spawn(&mut self, now: DateTime<Utc>, telemetry: &Telemetry) {
        if self.rng.gen::<f64>() >= self.spawn_probability() {
            return;
        }
        let kind = IncidentKind::ALL[self.rng.gen_range(0..IncidentKind::ALL.len())];
        let severity = IncidentSeverity::from_roll(kind, self.rng.gen_range(0.0..100.0));
        self.raise(kind, severity, now, telemetry);
    }
}

impl Simulator for IncidentSimulator {
    fn name(&self) -> &'static str {
        "incidents"
    }

    fn tick_interval(&self) -> Duration {
        self.interval
    }

    fn tick(&mut self, now: DateTime<Utc>, telemetry: &Telemetry) {
        self.maybe_spawn(now, telemetry);
        self.review_incidents(now, telemetry);
        telemetry.metric("Custom/Incidents/Active", self.open.len() as f64);
    }
}

fn incident_event(incident: &Incident, status: &str, duration_ms: Option<i64>) -> serde_json::Value {
    let mut event = json!({
        "id": incident.id,
        "type": incident.kind,
        "severity": incident.severity,
        "title": incident.title,
        "description": incident.description,
        "location": incident.location,
        "timestamp": incident.timestamp,
        "status": status,
        "impactedSystems": incident.impacted_systems.join(", "),
        "realWorldAnalogy": incident.real_world_analogy,
    });
    if let Some(map) = event.as_object_mut() {
        if let Some(resolved_at) = incident.resolution_time {
            map.insert("resolutionTime".into(), json!(resolved_at));
        }
        if let Some(duration) = duration_ms {
            map.insert("duration".into(), json!(duration));
        }
    }
    event
}
