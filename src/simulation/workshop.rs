//! Elf workshop: shifts, department fatigue and inventory flow

use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::core::clock::SimClock;
use crate::core::config::TrackerConfig;
use crate::core::types::simulation_rng;
use crate::simulation::runner::Simulator;
use crate::telemetry::Telemetry;

pub const TOTAL_ELVES: u32 = 500;
const SHIFT_MINUTES: f64 = 8.0 * 60.0;
const BASE_PRODUCTION_RATE: f64 = 10_000.0;
const REPLENISH_CHANCE: f64 = 0.05;

const MAX_TOYS: f64 = 5_000_000.0;
const WRAPPING_PAPER_RANGE: (f64, f64) = (500_000.0, 2_000_000.0);
const RIBBON_RANGE: (f64, f64) = (300_000.0, 1_000_000.0);
const MAGIC_DUST_RANGE: (f64, f64) = (10_000.0, 50_000.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shift {
    Morning,
    Evening,
    Night,
}

impl Shift {
    pub fn next(self) -> Self {
        match self {
            Shift::Morning => Shift::Evening,
            Shift::Evening => Shift::Night,
            Shift::Night => Shift::Morning,
        }
    }

    /// Fraction of each department on the floor during this shift
    pub fn staffing(self) -> f64 {
        match self {
            Shift::Night => 0.7,
            _ => 0.95,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Department {
    Manufacturing,
    QualityControl,
    Wrapping,
    Logistics,
}

impl Department {
    pub fn as_str(&self) -> &'static str {
        match self {
            Department::Manufacturing => "manufacturing",
            Department::QualityControl => "quality-control",
            Department::Wrapping => "wrapping",
            Department::Logistics => "logistics",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentStats {
    pub name: Department,
    pub elf_count: u32,
    pub current_shift: Shift,
    pub productivity: f64,
    pub morale: f64,
    pub active_elves: u32,
    pub toys_produced: u64,
    pub defect_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryLevels {
    pub toys: f64,
    pub wrapping_paper: f64,
    pub ribbons: f64,
    pub magic_dust: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkshopMetrics {
    pub total_elves: u32,
    pub active_elves: u32,
    /// Toys per minute
    pub production_rate: u32,
    pub quality_score: f64,
    pub inventory: InventoryLevels,
    pub current_shift: Shift,
    /// Simulated minutes until the next rotation
    pub shift_rotation_in: f64,
    pub departments: Vec<DepartmentStats>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionStats {
    pub total_production: u64,
    pub current_rate: u32,
    pub quality_score: f64,
    pub avg_productivity: f64,
    pub avg_morale: f64,
}

/// Department plus the hidden state that drives it
#[derive(Debug, Clone)]
struct Crew {
    stats: DepartmentStats,
    /// Productivity at the start of the shift, before fatigue
    baseline: f64,
    staffing: f64,
}

impl Crew {
    fn new(name: Department, elf_count: u32, productivity: f64, morale: f64, defect_rate: f64) -> Self {
        Self {
            stats: DepartmentStats {
                name,
                elf_count,
                current_shift: Shift::Morning,
                productivity,
                morale,
                active_elves: elf_count,
                toys_produced: 0,
                defect_rate,
            },
            baseline: productivity,
            staffing: Shift::Morning.staffing(),
        }
    }
}

pub struct WorkshopSimulator {
    interval: Duration,
    shift_clock: SimClock,
    rng: ChaCha8Rng,
    crews: Vec<Crew>,
    metrics: WorkshopMetrics,
}

impl WorkshopSimulator {
    pub const STREAM: u64 = 3;

    pub fn new(config: &TrackerConfig, now: DateTime<Utc>) -> Self {
        let crews = vec![
            Crew::new(Department::Manufacturing, 200, 95.0, 88.0, 1.2),
            Crew::new(Department::QualityControl, 100, 92.0, 85.0, 0.5),
            Crew::new(Department::Wrapping, 125, 90.0, 90.0, 0.8),
            Crew::new(Department::Logistics, 75, 93.0, 87.0, 0.3),
        ];

        let metrics = WorkshopMetrics {
            total_elves: TOTAL_ELVES,
            active_elves: TOTAL_ELVES,
            production_rate: BASE_PRODUCTION_RATE as u32,
            quality_score: 96.5,
            inventory: InventoryLevels {
                toys: 3_000_000.0,
                wrapping_paper: 1_250_000.0,
                ribbons: 650_000.0,
                magic_dust: 30_000.0,
            },
            current_shift: Shift::Morning,
            shift_rotation_in: SHIFT_MINUTES,
            departments: crews.iter().map(|c| c.stats.clone()).collect(),
            timestamp: now,
        };

        tracing::info!(
            total_elves = TOTAL_ELVES,
            departments = crews.len(),
            production_rate = metrics.production_rate,
            "workshop simulator initialized"
        );

        Self {
            interval: config.workshop_interval(),
            shift_clock: SimClock::new(now),
            rng: simulation_rng(config.seed, Self::STREAM),
            crews,
            metrics,
        }
    }

    pub fn metrics(&self) -> WorkshopMetrics {
        self.metrics.clone()
    }

    pub fn department(&self, name: &str) -> Option<DepartmentStats> {
        self.crews
            .iter()
            .find(|c| c.stats.name.as_str() == name)
            .map(|c| c.stats.clone())
    }

    pub fn departments(&self) -> Vec<DepartmentStats> {
        self.crews.iter().map(|c| c.stats.clone()).collect()
    }

    pub fn inventory(&self) -> InventoryLevels {
        self.metrics.inventory.clone()
    }

    pub fn production_stats(&self) -> ProductionStats {
        ProductionStats {
            total_production: self.crews.iter().map(|c| c.stats.toys_produced).sum(),
            current_rate: self.metrics.production_rate,
            quality_score: self.metrics.quality_score,
            avg_productivity: self.average(|s| s.productivity),
            avg_morale: self.average(|s| s.morale),
        }
    }

    fn average(&self, f: fn(&DepartmentStats) -> f64) -> f64 {
        if self.crews.is_empty() {
            return 0.0;
        }
        self.crews.iter().map(|c| f(&c.stats)).sum::<f64>() / self.crews.len() as f64
    }

    /// Advance to the next shift with fresh morale and baselines
    pub fn rotate_shift(&mut self, now: DateTime<Utc>, telemetry: &Telemetry) {
        let from = self.metrics.current_shift;
        let next = from.next();
        tracing::info!(?from, to = ?next, "rotating shift");

        for crew in &mut self.crews {
            crew.stats.current_shift = next;
            crew.stats.morale = self.rng.gen_range(85.0..95.0);
            crew.baseline = self.rng.gen_range(90.0..98.0);
            crew.stats.productivity = crew.baseline;
            crew.staffing = next.staffing();
            crew.stats.active_elves = (f64::from(crew.stats.elf_count) * crew.staffing).floor() as u32;
        }

        self.shift_clock.reset(now);
        self.metrics.current_shift = next;
        self.metrics.shift_rotation_in = SHIFT_MINUTES;

        telemetry.event(
            "ShiftRotation",
            &json!({
                "shift": next,
                "totalElves": TOTAL_ELVES,
                "activeElves": self.crews.iter().map(|c| c.stats.active_elves).sum::<u32>(),
                "timestamp": now,
            }),
        );
    }

    fn update_crew(crew: &mut Crew, shift_progress: f64, rng: &mut ChaCha8Rng) {
        let fatigue = 1.0 - shift_progress * 0.15;
        let noise = rng.gen_range(-2.5..2.5);
        crew.stats.productivity = (crew.baseline * fatigue + noise).clamp(0.0, 99.0);

        crew.stats.morale = (crew.stats.morale + rng.gen_range(-1.5..1.5)).clamp(70.0, 95.0);

        let present = crew.staffing * rng.gen_range(0.9..1.0);
        crew.stats.active_elves = (f64::from(crew.stats.elf_count) * present).floor() as u32;

        if crew.stats.name == Department::Manufacturing {
            crew.stats.toys_produced += (crew.stats.productivity * 2.0 * rng.gen_range(0.0..1.0)).floor() as u64;
        }

        let quality_factor = (crew.stats.productivity + crew.stats.morale) / 200.0;
        crew.stats.defect_rate = ((1.0 - quality_factor) * 5.0).clamp(0.2, 5.0);
    }

    fn update_inventory(&mut self, production_rate: f64, telemetry: &Telemetry, now: DateTime<Utc>) {
        let toys_this_tick = production_rate * self.interval.as_secs_f64() / 60.0;
        let inv = &mut self.metrics.inventory;
        inv.toys = (inv.toys + toys_this_tick).min(MAX_TOYS);

        let per_10k = toys_this_tick / 10_000.0;
        inv.wrapping_paper = (inv.wrapping_paper - 50.0 * per_10k).max(WRAPPING_PAPER_RANGE.0);
        inv.ribbons = (inv.ribbons - 30.0 * per_10k).max(RIBBON_RANGE.0);
        inv.magic_dust = (inv.magic_dust - 5.0 * per_10k).max(MAGIC_DUST_RANGE.0);

        if self.rng.gen_bool(REPLENISH_CHANCE) {
            let paper = self.rng.gen_range(100_000.0..150_000.0);
            let ribbons = self.rng.gen_range(50_000.0..80_000.0);
            let dust = self.rng.gen_range(5_000.0..10_000.0);

            inv.wrapping_paper = (inv.wrapping_paper + paper).min(WRAPPING_PAPER_RANGE.1);
            inv.ribbons = (inv.ribbons + ribbons).min(RIBBON_RANGE.1);
            inv.magic_dust = (inv.magic_dust + dust).min(MAGIC_DUST_RANGE.1);

            tracing::info!(
                wrapping_paper = paper.round(),
                ribbons = ribbons.round(),
                magic_dust = dust.round(),
                "materials replenished"
            );
            telemetry.event(
                "MaterialsReplenished",
                &json!({
                    "wrappingPaper": paper,
                    "ribbons": ribbons,
                    "magicDust": dust,
                    "timestamp": now,
                }),
            );
        }
    }

    fn publish(&self, telemetry: &Telemetry) {
        let m = &self.metrics;
        telemetry.event(
            "WorkshopMetrics",
            &json!({
                "totalElves": m.total_elves,
                "activeElves": m.active_elves,
                "productionRate": m.production_rate,
                "qualityScore": m.quality_score,
                "currentShift": m.current_shift,
                "shiftRotationIn": m.shift_rotation_in,
                "toyInventory": m.inventory.toys,
                "wrappingPaperInventory": m.inventory.wrapping_paper,
                "ribbonsInventory": m.inventory.ribbons,
                "magicDustInventory": m.inventory.magic_dust,
                "timestamp": m.timestamp,
            }),
        );

        for dept in &m.departments {
            telemetry.event(
                "ElfProduction",
                &json!({
                    "department": dept.name,
                    "elfCount": dept.elf_count,
                    "activeElves": dept.active_elves,
                    "productivity": dept.productivity,
                    "morale": dept.morale,
                    "defectRate": dept.defect_rate,
                    "shift": dept.current_shift,
                    "toysProduced": dept.toys_produced,
                    "timestamp": m.timestamp,
                }),
            );
        }

        telemetry.metric("Custom/Workshop/ProductionRate", f64::from(m.production_rate));
        telemetry.metric("Custom/Workshop/QualityScore", m.quality_score);
        telemetry.metric("Custom/Workshop/ActiveElves", f64::from(m.active_elves));
        telemetry.metric("Custom/Workshop/ToyInventory", m.inventory.toys);
        telemetry.metric("Custom/Workshop/WrappingPaper", m.inventory.wrapping_paper);
        telemetry.metric("Custom/Workshop/Ribbons", m.inventory.ribbons);
        telemetry.metric("Custom/Workshop/MagicDust", m.inventory.magic_dust);

        for dept in &m.departments {
            let prefix = format!("Custom/Workshop/Department/{}", dept.name.as_str());
            telemetry.metric(&format!("{}/Productivity", prefix), dept.productivity);
            telemetry.metric(&format!("{}/Morale", prefix), dept.morale);
            telemetry.metric(&format!("{}/DefectRate", prefix), dept.defect_rate);
        }
    }
}

impl Simulator for WorkshopSimulator {
    fn name(&self) -> &'static str {
        "workshop"
    }

    fn tick_interval(&self) -> Duration {
        self.interval
    }

    fn tick(&mut self, now: DateTime<Utc>, telemetry: &Telemetry) {
        if SHIFT_MINUTES - self.shift_clock.minutes_elapsed(now) <= 0.0 {
            self.rotate_shift(now, telemetry);
        }
        let minutes_into_shift = self.shift_clock.minutes_elapsed(now);
        let shift_progress = (minutes_into_shift / SHIFT_MINUTES).clamp(0.0, 1.0);

        for crew in &mut self.crews {
            Self::update_crew(crew, shift_progress, &mut self.rng);
        }

        let avg_productivity = self.average(|s| s.productivity);
        let avg_morale = self.average(|s| s.morale);
        let efficiency = (avg_productivity / 100.0) * (avg_morale / 100.0);
        let production_rate = (BASE_PRODUCTION_RATE * efficiency * self.rng.gen_range(0.5..1.5))
            .floor()
            .clamp(5_000.0, 15_000.0);
        let quality_score =
            (92.0 + avg_productivity / 100.0 * 7.0 + self.rng.gen_range(0.0..2.0)).clamp(0.0, 99.0);

        self.update_inventory(production_rate, telemetry, now);

        let departments = self.departments();
        self.metrics = WorkshopMetrics {
            total_elves: TOTAL_ELVES,
            active_elves: departments.iter().map(|d| d.active_elves).sum(),
            production_rate: production_rate as u32,
            quality_score,
            inventory: self.metrics.inventory.clone(),
            current_shift: self.metrics.current_shift,
            shift_rotation_in: (SHIFT_MINUTES - minutes_into_shift).max(0.0),
            departments,
            timestamp: now,
        };

        self.publish(telemetry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::MemorySink;
    use std::sync::Arc;

    /// One simulated hour is 25 real seconds
    fn at_hours(start: DateTime<Utc>, hours: f64) -> DateTime<Utc> {
        start + chrono::Duration::milliseconds((hours * 25_000.0) as i64)
    }

    fn seeded(seed: u64) -> (WorkshopSimulator, DateTime<Utc>) {
        let config = TrackerConfig {
            seed: Some(seed),
            ..TrackerConfig::default()
        };
        let start = Utc::now();
        (WorkshopSimulator::new(&config, start), start)
    }

    #[test]
    fn test_shift_cycle() {
        assert_eq!(Shift::Morning.next(), Shift::Evening);
        assert_eq!(Shift::Evening.next(), Shift::Night);
        assert_eq!(Shift::Night.next(), Shift::Morning);
    }

    #[test]
    fn test_initial_state() {
        let (sim, _) = seeded(1);
        let m = sim.metrics();
        assert_eq!(m.total_elves, 500);
        assert_eq!(m.production_rate, 10_000);
        assert_eq!(m.current_shift, Shift::Morning);
        assert_eq!(m.shift_rotation_in, 480.0);

        let elves: u32 = sim.departments().iter().map(|d| d.elf_count).sum();
        assert_eq!(elves, TOTAL_ELVES);
        assert_eq!(sim.department("quality-control").unwrap().elf_count, 100);
        assert!(sim.department("reindeer-care").is_none());
    }

    #[test]
    fn test_bounds_hold_over_many_ticks() {
        let (mut sim, start) = seeded(2);
        let telemetry = Telemetry::disabled();
        for step in 1..=300 {
            sim.tick(at_hours(start, step as f64 * 0.2), &telemetry);
            let m = sim.metrics();
            assert!((5_000..=15_000).contains(&m.production_rate));
            assert!((0.0..=99.0).contains(&m.quality_score));
            assert!(m.inventory.toys <= MAX_TOYS);
            assert!((WRAPPING_PAPER_RANGE.0..=WRAPPING_PAPER_RANGE.1).contains(&m.inventory.wrapping_paper));
            assert!((RIBBON_RANGE.0..=RIBBON_RANGE.1).contains(&m.inventory.ribbons));
            assert!((MAGIC_DUST_RANGE.0..=MAGIC_DUST_RANGE.1).contains(&m.inventory.magic_dust));
            for d in &m.departments {
                assert!((0.0..=99.0).contains(&d.productivity));
                assert!((70.0..=95.0).contains(&d.morale));
                assert!((0.2..=5.0).contains(&d.defect_rate));
                assert!(d.active_elves <= d.elf_count);
            }
        }
    }

    #[test]
    fn test_shift_rotates_after_eight_simulated_hours() {
        let (mut sim, start) = seeded(3);
        let sink = Arc::new(MemorySink::new());
        let telemetry = Telemetry::new(sink.clone());

        sim.tick(at_hours(start, 7.9), &telemetry);
        assert_eq!(sim.metrics().current_shift, Shift::Morning);
        assert!(sim.metrics().shift_rotation_in > 0.0);

        sim.tick(at_hours(start, 8.1), &telemetry);
        assert_eq!(sim.metrics().current_shift, Shift::Evening);
        // Clock restarted at rotation
        assert_eq!(sim.metrics().shift_rotation_in, 480.0);
        assert_eq!(sink.events_named("ShiftRotation").len(), 1);

        sim.tick(at_hours(start, 16.2), &telemetry);
        assert_eq!(sim.metrics().current_shift, Shift::Night);
        for d in sim.departments() {
            let cap = (f64::from(d.elf_count) * 0.7).floor() as u32;
            assert!(d.active_elves <= cap, "{:?} staffing above night level", d.name);
        }
    }

    #[test]
    fn test_fatigue_lowers_productivity_late_in_shift() {
        let (mut early, start) = seeded(4);
        let (mut late, late_start) = seeded(4);
        let telemetry = Telemetry::disabled();

        early.tick(at_hours(start, 0.1), &telemetry);
        late.tick(at_hours(late_start, 7.9), &telemetry);

        let early_avg = early.production_stats().avg_productivity;
        let late_avg = late.production_stats().avg_productivity;
        assert!(late_avg < early_avg, "{late_avg} should be below {early_avg}");
    }

    #[test]
    fn test_manufacturing_counter_only_grows() {
        let (mut sim, start) = seeded(5);
        let telemetry = Telemetry::disabled();
        let mut last = 0;
        for step in 1..50 {
            sim.tick(at_hours(start, step as f64 * 0.1), &telemetry);
            let produced = sim.department("manufacturing").unwrap().toys_produced;
            assert!(produced >= last);
            last = produced;
            assert_eq!(sim.department("wrapping").unwrap().toys_produced, 0);
        }
        assert_eq!(sim.production_stats().total_production, last);
    }
}
