//! Integration tests for a full compressed Christmas Eve
//!
//! Every simulator is stepped through the ten real minutes that make up the
//! 24 simulated hours, checking the invariants that must hold between ticks:
//! - Gift totals and per-country counts only grow, and never pass population
//! - The sleigh only moves forward along its route
//! - Reindeer vitals stay above their Christmas Eve floors
//! - Fuel and inventory stay inside their bounds
//! - Milestones fire once each, in ascending order

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use santa_tracker::core::config::TrackerConfig;
use santa_tracker::simulation::SantaTracker;
use santa_tracker::telemetry::{MemorySink, Telemetry};

/// Two real seconds per step covers the day in 300 steps
const STEP_MS: i64 = 2_000;
const STEPS: i64 = 310;

fn tracker(seed: u64) -> (SantaTracker, Arc<MemorySink>, DateTime<Utc>) {
    let config = TrackerConfig {
        seed: Some(seed),
        ..TrackerConfig::default()
    };
    let sink = Arc::new(MemorySink::new());
    let start = Utc::now();
    let tracker = SantaTracker::new_at(&config, Telemetry::new(sink.clone()), start);
    (tracker, sink, start)
}

#[test]
fn test_full_night_keeps_invariants() {
    let (tracker, _sink, start) = tracker(2024);

    let mut last_total = 0;
    let mut last_stop = 0;
    let mut last_countries = tracker.delivery.read(|d| d.country_stats());

    for step in 1..=STEPS {
        let now = start + Duration::milliseconds(step * STEP_MS);
        tracker.tick_all_at(now);

        let total = tracker.delivery.read(|d| d.total_gifts_delivered());
        assert!(total >= last_total, "total went backwards at step {}", step);
        last_total = total;

        let countries = tracker.delivery.read(|d| d.country_stats());
        for country in &countries {
            assert!(country.gifts_delivered <= country.population, "{} over population", country.country);
            let before = last_countries
                .iter()
                .find(|c| c.country == country.country)
                .map(|c| c.gifts_delivered)
                .unwrap_or(0);
            assert!(country.gifts_delivered >= before, "{} went backwards", country.country);
        }
        last_countries = countries;

        let stop = tracker.sleigh.read(|s| s.current_stop_index());
        assert!(stop >= last_stop, "sleigh moved backwards at step {}", step);
        last_stop = stop;

        let sleigh = tracker.sleigh.read(|s| s.metrics());
        assert!((0.0..=100.0).contains(&sleigh.magic_fuel_level));
        assert!((0.0..=100.0).contains(&sleigh.structural_integrity));

        for reindeer in tracker.reindeer.read(|r| r.all_reindeer()) {
            assert!((20.0..=100.0).contains(&reindeer.energy));
            assert!((60.0..=100.0).contains(&reindeer.health));
            assert!((40.0..=100.0).contains(&reindeer.morale));
            assert!((65.0..=100.0).contains(&reindeer.speed_contribution));
        }

        let inventory = tracker.workshop.read(|w| w.inventory());
        assert!(inventory.wrapping_paper >= 0.0);
        assert!(inventory.ribbons >= 0.0);
        assert!(inventory.magic_dust >= 0.0);
    }

    assert!(last_total > 1_000_000_000, "a full night delivers billions, got {}", last_total);
    assert!(last_stop > 0);
}

#[test]
fn test_milestones_fire_once_in_order() {
    let (tracker, sink, start) = tracker(7);

    for step in 1..=STEPS {
        let now = start + Duration::milliseconds(step * STEP_MS);
        tracker.delivery.tick_at(now);
    }

    let milestones: Vec<u64> = sink
        .events_named("DeliveryMilestone")
        .iter()
        .filter_map(|e| e["milestone"].as_u64())
        .collect();

    assert!(!milestones.is_empty());
    assert!(milestones.windows(2).all(|w| w[0] < w[1]), "{:?}", milestones);
    assert_eq!(milestones[0], 1_000_000);
}

#[test]
fn test_same_seed_replays_the_same_night() {
    let (first, _, start_a) = tracker(99);
    let (second, _, start_b) = tracker(99);

    for step in 1..=60 {
        first.tick_all_at(start_a + Duration::milliseconds(step * STEP_MS));
        second.tick_all_at(start_b + Duration::milliseconds(step * STEP_MS));
    }

    assert_eq!(
        first.delivery.read(|d| d.total_gifts_delivered()),
        second.delivery.read(|d| d.total_gifts_delivered())
    );
    assert_eq!(
        first.reindeer.read(|r| r.team_averages()),
        second.reindeer.read(|r| r.team_averages())
    );
    assert_eq!(
        first.weather.read(|w| w.current_weather()),
        second.weather.read(|w| w.current_weather())
    );
}
