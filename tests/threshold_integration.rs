//! Integration tests for crossing detection and incident lifecycle
//!
//! Thresholds and incidents must fire exactly once per crossing:
//! - Reindeer energy thresholds fire on the downward crossing only
//! - Weather alerts are raised once while conditions stay hazardous
//! - Incidents resolve strictly after their window and stay resolved

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use santa_tracker::core::config::TrackerConfig;
use santa_tracker::core::types::Mode;
use santa_tracker::simulation::incidents::{IncidentKind, IncidentSeverity, IncidentSimulator, IncidentStatus};
use santa_tracker::simulation::reindeer::{ReindeerName, ReindeerSimulator, Vitals};
use santa_tracker::simulation::weather::{CurrentWeather, Precipitation, Severity, WeatherSimulator};
use santa_tracker::simulation::Simulator;
use santa_tracker::telemetry::{MemorySink, Telemetry};

fn config(seed: u64) -> TrackerConfig {
    TrackerConfig {
        mode: Mode::ChristmasEve,
        seed: Some(seed),
        ..TrackerConfig::default()
    }
}

/// One simulated hour is 25 real seconds
fn at_hours(start: DateTime<Utc>, hours: f64) -> DateTime<Utc> {
    start + Duration::milliseconds((hours * 25_000.0) as i64)
}

#[test]
fn test_reindeer_energy_crossing_fires_once() {
    let start = Utc::now();
    let mut sim = ReindeerSimulator::new(&config(3), start);
    let sink = Arc::new(MemorySink::new());
    let telemetry = Telemetry::new(sink.clone());

    sim.override_vitals(
        ReindeerName::Dasher,
        Vitals {
            energy: 65.0,
            health: 90.0,
            morale: 90.0,
            speed_contribution: 90.0,
        },
    );

    // Late in the night energy sits near the floor, so both ticks land below 60
    sim.tick(at_hours(start, 30.0), &telemetry);
    sim.tick(at_hours(start, 31.0), &telemetry);

    let crossings: Vec<_> = sink
        .events_named("ReindeerEnergyThreshold")
        .into_iter()
        .filter(|e| e["reindeerName"] == "Dasher" && e["threshold"] == 60.0)
        .collect();
    assert_eq!(crossings.len(), 1);

    let dasher = sim.reindeer(ReindeerName::Dasher).unwrap();
    assert!(dasher.energy <= 60.0);
}

#[test]
fn test_reindeer_names_parse() {
    assert_eq!("Rudolph".parse::<ReindeerName>().unwrap(), ReindeerName::Rudolph);
    assert!("Olive".parse::<ReindeerName>().is_err());
}

#[test]
fn test_critical_incident_lifecycle() {
    let start = Utc::now();
    let mut sim = IncidentSimulator::new(&config(5), start);
    let sink = Arc::new(MemorySink::new());
    let telemetry = Telemetry::new(sink.clone());

    let id = sim.raise(IncidentKind::ReindeerFatigue, IncidentSeverity::Critical, start, &telemetry);

    for minutes in [1, 10, 20, 29, 30] {
        sim.review_incidents(start + Duration::minutes(minutes), &telemetry);
        let incident = sim.incident(&id).unwrap();
        assert_ne!(incident.status, IncidentStatus::Resolved, "resolved early at {} min", minutes);
        assert!(incident.resolution_time.is_none());
    }

    let resolved_at = start + Duration::minutes(30) + Duration::seconds(1);
    sim.review_incidents(resolved_at, &telemetry);

    let incident = sim.incident(&id).unwrap();
    assert_eq!(incident.status, IncidentStatus::Resolved);
    assert_eq!(incident.resolution_time, Some(resolved_at));
    assert!(sim.active_incidents().iter().all(|i| i.id != id));
    assert_eq!(sim.stats().resolved, 1);

    let statuses: Vec<_> = sink
        .events_named("SantaIncident")
        .iter()
        .map(|e| e["status"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(statuses, vec!["created", "resolved"]);
}

#[test]
fn test_low_incident_resolves_before_high() {
    let start = Utc::now();
    let mut sim = IncidentSimulator::new(&config(6), start);
    let telemetry = Telemetry::disabled();

    let low = sim.raise(IncidentKind::ChimneyObstruction, IncidentSeverity::Low, start, &telemetry);
    let high = sim.raise(IncidentKind::FuelLow, IncidentSeverity::High, start, &telemetry);

    sim.review_incidents(start + Duration::minutes(6), &telemetry);
    assert_eq!(sim.incident(&low).unwrap().status, IncidentStatus::Resolved);
    assert_eq!(sim.incident(&high).unwrap().status, IncidentStatus::Active);

    sim.review_incidents(start + Duration::minutes(11), &telemetry);
    assert_eq!(sim.incident(&high).unwrap().status, IncidentStatus::Investigating);
    assert_eq!(sim.active_incidents().len(), 1);
}

fn reading(precipitation: Precipitation, wind_speed: u32, visibility: f64) -> CurrentWeather {
    let severity = Severity::classify(precipitation, wind_speed, visibility);
    CurrentWeather {
        location: "Reykjavik".to_string(),
        temperature: 15,
        wind_speed,
        wind_direction: 270,
        visibility,
        precipitation,
        severity,
        impact: String::new(),
        forecast: String::new(),
    }
}

#[test]
fn test_weather_alert_raised_once_then_cleared() {
    let start = Utc::now();
    let mut sim = WeatherSimulator::new(&config(8), start);
    let sink = Arc::new(MemorySink::new());
    let telemetry = Telemetry::new(sink.clone());

    sim.record_conditions(reading(Precipitation::Blizzard, 35, 0.2), start, &telemetry);
    sim.record_conditions(reading(Precipitation::Clear, 45, 9.0), start + Duration::seconds(5), &telemetry);

    let active = sim.active_alerts();
    assert_eq!(active.len(), 1, "still hazardous, no second alert");
    assert_eq!(active[0].alert_type, "Blizzard Warning");
    assert_eq!(active[0].severity, Severity::Extreme);
    assert_eq!(sink.events_named("WeatherAlert").len(), 1);

    let cleared_at = start + Duration::seconds(10);
    sim.record_conditions(reading(Precipitation::LightSnow, 10, 4.0), cleared_at, &telemetry);
    assert!(sim.active_alerts().is_empty());

    let history = sim.all_alerts();
    assert_eq!(history.len(), 1);
    assert!(!history[0].active);
    assert_eq!(history[0].end_time, Some(cleared_at));

    // A later calm reading leaves the cleared alert untouched
    sim.record_conditions(reading(Precipitation::Clear, 5, 9.5), cleared_at + Duration::seconds(5), &telemetry);
    assert_eq!(sim.all_alerts()[0].end_time, Some(cleared_at));
}
