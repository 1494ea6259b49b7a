//! Reindeer team fatigue model
//!
//! Nine reindeer with fixed harness positions. On Christmas Eve energy,
//! health and morale drain with simulated hours (rear positions drain 1.5x
//! faster); in planning mode they oscillate around training baselines.
//! Status is never stored: it is classified from the current vitals on every
//! read.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::core::clock::SimClock;
use crate::core::config::TrackerConfig;
use crate::core::error::TrackerError;
use crate::core::types::{simulation_rng, Mode};
use crate::simulation::runner::Simulator;
use crate::telemetry::Telemetry;

const ENCOURAGEMENT_CHANCE: f64 = 0.05;
const ENERGY_THRESHOLDS: [f64; 2] = [60.0, 40.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReindeerName {
    Dasher,
    Dancer,
    Prancer,
    Vixen,
    Comet,
    Cupid,
    Donner,
    Blitzen,
    Rudolph,
}

impl ReindeerName {
    pub const ALL: [ReindeerName; 9] = [
        ReindeerName::Dasher,
        ReindeerName::Dancer,
        ReindeerName::Prancer,
        ReindeerName::Vixen,
        ReindeerName::Comet,
        ReindeerName::Cupid,
        ReindeerName::Donner,
        ReindeerName::Blitzen,
        ReindeerName::Rudolph,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReindeerName::Dasher => "Dasher",
            ReindeerName::Dancer => "Dancer",
            ReindeerName::Prancer => "Prancer",
            ReindeerName::Vixen => "Vixen",
            ReindeerName::Comet => "Comet",
            ReindeerName::Cupid => "Cupid",
            ReindeerName::Donner => "Donner",
            ReindeerName::Blitzen => "Blitzen",
            ReindeerName::Rudolph => "Rudolph",
        }
    }

    /// Fixed harness position
    pub fn position(&self) -> TeamPosition {
        match self {
            ReindeerName::Dasher | ReindeerName::Dancer | ReindeerName::Rudolph => TeamPosition::Lead,
            ReindeerName::Donner | ReindeerName::Blitzen => TeamPosition::Rear,
            _ => TeamPosition::Middle,
        }
    }

    fn low_energy_quip(&self) -> &'static str {
        match self {
            ReindeerName::Dasher => "Still dashing but needs a candy cane break soon!",
            ReindeerName::Dancer => "Not dancing as gracefully as usual!",
            ReindeerName::Prancer => "Prancing has turned into trotting!",
            ReindeerName::Vixen => "Feeling a bit less vixen-y than usual!",
            ReindeerName::Comet => "Moving slower than a comet right now!",
            ReindeerName::Cupid => "Could use some love and encouragement!",
            ReindeerName::Donner => "Thunder is getting quieter!",
            ReindeerName::Blitzen => "Not blitzing as fast as usual!",
            ReindeerName::Rudolph => "That nose is dimming a bit - time for some carrots!",
        }
    }
}

impl fmt::Display for ReindeerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReindeerName {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReindeerName::ALL
            .into_iter()
            .find(|name| name.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| TrackerError::UnknownReindeer(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamPosition {
    Lead,
    Middle,
    Rear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Excellent,
    Good,
    Tired,
    Exhausted,
    Resting,
}

impl Condition {
    /// Classify the average of energy, health and morale
    ///
    /// Planning mode never reports `Exhausted`.
    pub fn classify(mode: Mode, average: f64) -> Self {
        match mode {
            Mode::ChristmasEve => {
                if average > 85.0 {
                    Condition::Excellent
                } else if average > 70.0 {
                    Condition::Good
                } else if average > 50.0 {
                    Condition::Tired
                } else if average > 35.0 {
                    Condition::Exhausted
                } else {
                    Condition::Resting
                }
            }
            Mode::Planning => {
                if average > 90.0 {
                    Condition::Excellent
                } else if average > 80.0 {
                    Condition::Good
                } else if average > 70.0 {
                    Condition::Tired
                } else {
                    Condition::Resting
                }
            }
        }
    }

    fn cheer(&self) -> &'static str {
        match self {
            Condition::Excellent => "Back in top form!",
            Condition::Good => "Holding steady!",
            Condition::Tired => "Needs some encouragement!",
            Condition::Exhausted => "Really needs a break!",
            Condition::Resting => "Taking it easy now.",
        }
    }
}

/// Raw vitals, each in [0, 100]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vitals {
    pub energy: f64,
    pub health: f64,
    pub morale: f64,
    pub speed_contribution: f64,
}

impl Vitals {
    pub fn average_condition(&self) -> f64 {
        (self.energy + self.health + self.morale) / 3.0
    }

    fn clamped(self) -> Self {
        Self {
            energy: self.energy.clamp(0.0, 100.0),
            health: self.health.clamp(0.0, 100.0),
            morale: self.morale.clamp(0.0, 100.0),
            speed_contribution: self.speed_contribution.clamp(0.0, 100.0),
        }
    }
}

/// Read-side view of one reindeer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReindeerStatus {
    pub name: ReindeerName,
    pub energy: f64,
    pub health: f64,
    pub morale: f64,
    pub speed_contribution: f64,
    pub status: Condition,
    pub position: TeamPosition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamAverages {
    pub average_energy: f64,
    pub average_health: f64,
    pub average_morale: f64,
    pub average_speed_contribution: f64,
    pub total_reindeer: usize,
}

#[derive(Debug, Clone)]
struct Reindeer {
    name: ReindeerName,
    vitals: Vitals,
}

pub struct ReindeerSimulator {
    mode: Mode,
    interval: Duration,
    clock: SimClock,
    rng: ChaCha8Rng,
    team: Vec<Reindeer>,
    encouragement_count: u64,
    team_exhausted_alert: bool,
    team_low_energy_alert: bool,
}

impl ReindeerSimulator {
    pub const STREAM: u64 = 2;

    pub fn new(config: &TrackerConfig, now: DateTime<Utc>) -> Self {
        let mut rng = simulation_rng(config.seed, Self::STREAM);
        let team = ReindeerName::ALL
            .into_iter()
            .map(|name| Reindeer {
                name,
                vitals: Vitals {
                    energy: rng.gen_range(50.0..100.0),
                    health: rng.gen_range(70.0..100.0),
                    morale: rng.gen_range(60.0..100.0),
                    speed_contribution: rng.gen_range(80.0..100.0),
                },
            })
            .collect();

        tracing::info!(
            total_reindeer = ReindeerName::ALL.len(),
            mode = config.mode.label(),
            "reindeer simulator initialized"
        );

        Self {
            mode: config.mode,
            interval: config.reindeer_interval(),
            clock: SimClock::new(now),
            rng,
            team,
            encouragement_count: 0,
            team_exhausted_alert: false,
            team_low_energy_alert: false,
        }
    }

    pub fn reindeer(&self, name: ReindeerName) -> Option<ReindeerStatus> {
        self.team
            .iter()
            .find(|r| r.name == name)
            .map(|r| self.status_of(r))
    }

    pub fn all_reindeer(&self) -> Vec<ReindeerStatus> {
        self.team.iter().map(|r| self.status_of(r)).collect()
    }

    pub fn team_averages(&self) -> TeamAverages {
        let count = self.team.len();
        let n = count.max(1) as f64;
        let sum = |f: fn(&Vitals) -> f64| self.team.iter().map(|r| f(&r.vitals)).sum::<f64>() / n;

        TeamAverages {
            average_energy: sum(|v| v.energy),
            average_health: sum(|v| v.health),
            average_morale: sum(|v| v.morale),
            average_speed_contribution: sum(|v| v.speed_contribution),
            total_reindeer: count,
        }
    }

    /// Times Santa's encouragement replaced the normal drain
    pub fn encouragement_count(&self) -> u64 {
        self.encouragement_count
    }

    /// Replace one reindeer's vitals, e.g. after a vet check
    pub fn override_vitals(&mut self, name: ReindeerName, vitals: Vitals) {
        if let Some(r) = self.team.iter_mut().find(|r| r.name == name) {
            r.vitals = vitals.clamped();
        }
    }

    fn status_of(&self, r: &Reindeer) -> ReindeerStatus {
        ReindeerStatus {
            name: r.name,
            energy: r.vitals.energy,
            health: r.vitals.health,
            morale: r.vitals.morale,
            speed_contribution: r.vitals.speed_contribution,
            status: Condition::classify(self.mode, r.vitals.average_condition()),
            position: r.name.position(),
        }
    }

    fn update_route_planning(&mut self, hours: f64) {
        let minutes = hours * 60.0;
        for (index, r) in self.team.iter_mut().enumerate() {
            // Staggered training schedules
            let t = minutes + index as f64 * 0.5;
            let rng = &mut self.rng;

            r.vitals = Vitals {
                energy: (85.0 + (t / 4.0).sin() * 8.0 + rng.gen_range(0.0..4.0)).clamp(70.0, 100.0),
                health: (88.0 + (t / 6.0).sin() * 6.0 + (t / 3.0).cos() * 4.0 + rng.gen_range(0.0..3.0))
                    .clamp(75.0, 100.0),
                morale: (90.0 + (t / 5.0).cos() * 7.0 + rng.gen_range(0.0..5.0)).clamp(80.0, 100.0),
                speed_contribution: (93.0 + (t / 4.5).sin() * 4.0 + rng.gen_range(0.0..3.0))
                    .clamp(85.0, 100.0),
            };
        }
    }

    fn update_christmas_eve(&mut self, hours: f64, telemetry: &Telemetry) {
        let fraction = hours / 24.0;
        let mode = self.mode;

        for r in self.team.iter_mut() {
            let position = r.name.position();
            let before = r.vitals;
            let before_status = Condition::classify(mode, before.average_condition());

            let drain_factor = if position == TeamPosition::Rear { 1.5 } else { 1.0 };
            let energy = (100.0 - fraction * 40.0 * drain_factor + self.rng.gen_range(0.0..5.0))
                .clamp(20.0, 100.0);
            let health = (100.0 - fraction * 15.0 + self.rng.gen_range(0.0..3.0)).clamp(60.0, 100.0);
            let morale = (70.0 - fraction * 20.0 + self.rng.gen_range(0.0..20.0)).clamp(40.0, 100.0);
            let speed_contribution = (95.0 - (100.0 - energy) * 0.2 + self.rng.gen_range(0.0..5.0))
                .clamp(65.0, 100.0);

            let (energy, morale) = if self.rng.gen_bool(ENCOURAGEMENT_CHANCE) {
                self.encouragement_count += 1;
                let boosted = ((energy + 5.0).min(100.0), (morale + 10.0).min(100.0));
                tracing::info!(
                    reindeer = %r.name,
                    energy = boosted.0.round(),
                    morale = boosted.1.round(),
                    "Santa gave some encouraging words, that's the Christmas spirit"
                );
                boosted
            } else {
                (energy, morale)
            };

            r.vitals = Vitals {
                energy,
                health,
                morale,
                speed_contribution,
            };
            let status = Condition::classify(mode, r.vitals.average_condition());

            for threshold in ENERGY_THRESHOLDS {
                if before.energy > threshold && energy <= threshold {
                    tracing::warn!(
                        reindeer = %r.name,
                        energy = energy.round(),
                        threshold,
                        ?status,
                        "{}",
                        r.name.low_energy_quip()
                    );
                    telemetry.event(
                        "ReindeerEnergyThreshold",
                        &json!({
                            "reindeerName": r.name,
                            "energy": energy,
                            "threshold": threshold,
                            "status": status,
                            "position": position,
                        }),
                    );
                }
            }

            if status != before_status {
                tracing::info!(
                    reindeer = %r.name,
                    from = ?before_status,
                    to = ?status,
                    energy = energy.round(),
                    "{}",
                    status.cheer()
                );
            }

            if speed_contribution < before.speed_contribution - 10.0 {
                tracing::warn!(
                    reindeer = %r.name,
                    speed_contribution = speed_contribution.round(),
                    previous = before.speed_contribution.round(),
                    ?position,
                    "speed contribution dropped sharply"
                );
            }
        }

        self.check_team();
    }

    fn check_team(&mut self) {
        let averages = self.team_averages();
        let exhausted: Vec<ReindeerName> = self
            .all_reindeer()
            .into_iter()
            .filter(|s| s.status == Condition::Exhausted)
            .map(|s| s.name)
            .collect();

        let too_many_exhausted = exhausted.len() >= 3;
        if too_many_exhausted && !self.team_exhausted_alert {
            tracing::error!(
                count = exhausted.len(),
                reindeer = ?exhausted,
                average_energy = averages.average_energy.round(),
                "multiple exhausted reindeer, Santa needs to slow down"
            );
        }
        self.team_exhausted_alert = too_many_exhausted;

        let low_energy = averages.average_energy < 50.0;
        if low_energy && !self.team_low_energy_alert {
            tracing::warn!(
                average_energy = averages.average_energy.round(),
                average_morale = averages.average_morale.round(),
                average_health = averages.average_health.round(),
                "team energy low, the whole crew needs some Christmas cookies"
            );
        }
        self.team_low_energy_alert = low_energy;
    }

    fn publish(&self, now: DateTime<Utc>, telemetry: &Telemetry) {
        let mode = self.mode.label();
        for status in self.all_reindeer() {
            telemetry.event(
                "ReindeerStatus",
                &json!({
                    "name": status.name,
                    "energy": status.energy,
                    "health": status.health,
                    "morale": status.morale,
                    "speedContribution": status.speed_contribution,
                    "status": status.status,
                    "position": status.position,
                    "mode": mode,
                    "timestamp": now,
                }),
            );

            let name = status.name;
            telemetry.metric(&format!("Custom/Reindeer/{}/Energy", name), status.energy);
            telemetry.metric(&format!("Custom/Reindeer/{}/Health", name), status.health);
            telemetry.metric(&format!("Custom/Reindeer/{}/Morale", name), status.morale);
            telemetry.metric(
                &format!("Custom/Reindeer/{}/SpeedContribution", name),
                status.speed_contribution,
            );
        }

        let team = self.team_averages();
        telemetry.event(
            "ReindeerTeamStatus",
            &json!({
                "averageEnergy": team.average_energy,
                "averageHealth": team.average_health,
                "averageMorale": team.average_morale,
                "averageSpeedContribution": team.average_speed_contribution,
                "totalReindeer": team.total_reindeer,
                "mode": mode,
                "timestamp": now,
            }),
        );
        telemetry.metric("Custom/Reindeer/Team/AverageEnergy", team.average_energy);
        telemetry.metric("Custom/Reindeer/Team/AverageHealth", team.average_health);
        telemetry.metric("Custom/Reindeer/Team/AverageMorale", team.average_morale);
        telemetry.metric(
            "Custom/Reindeer/Team/AverageSpeedContribution",
            team.average_speed_contribution,
        );
    }
}

impl Simulator for ReindeerSimulator {
    fn name(&self) -> &'static str {
        "reindeer"
    }

    fn tick_interval(&self) -> Duration {
        self.interval
    }

    fn tick(&mut self, now: DateTime<Utc>, telemetry: &Telemetry) {
        let hours = self.clock.hours_elapsed(now);
        match self.mode {
            Mode::Planning => self.update_route_planning(hours),
            Mode::ChristmasEve => self.update_christmas_eve(hours, telemetry),
        }
        self.publish(now, telemetry);
    }
}
