//! Weather along the route and the alert lifecycle
//!
//! Conditions are redrawn from scratch every tick for the location being
//! watched; there is no smoothing between ticks.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::core::clock::SimClock;
use crate::core::config::TrackerConfig;
use crate::core::types::simulation_rng;
use crate::simulation::runner::Simulator;
use crate::telemetry::Telemetry;

/// Simulated minutes spent watching each location
const ROTATION_MINUTES: f64 = 5.0;

pub const LOCATIONS: [&str; 18] = [
    "North Pole",
    "Tokyo, Japan",
    "Sydney, Australia",
    "London, UK",
    "Paris, France",
    "New York, USA",
    "Los Angeles, USA",
    "Moscow, Russia",
    "Beijing, China",
    "Mumbai, India",
    "Dubai, UAE",
    "Cairo, Egypt",
    "Lagos, Nigeria",
    "Johannesburg, South Africa",
    "São Paulo, Brazil",
    "Buenos Aires, Argentina",
    "Toronto, Canada",
    "Mexico City, Mexico",
];

const HIGH_LATITUDE: [&str; 3] = ["Moscow", "Toronto", "London"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Precipitation {
    Clear,
    LightSnow,
    HeavySnow,
    Rain,
    Blizzard,
}

impl Precipitation {
    /// Pick precipitation from the temperature band and a roll in [0, 1)
    pub fn from_roll(temperature: i32, roll: f64) -> Self {
        if temperature < 32 {
            if roll < 0.3 {
                Precipitation::Clear
            } else if roll < 0.6 {
                Precipitation::LightSnow
            } else if roll < 0.85 {
                Precipitation::HeavySnow
            } else {
                Precipitation::Blizzard
            }
        } else if roll < 0.6 {
            Precipitation::Clear
        } else {
            Precipitation::Rain
        }
    }

    fn visibility_range(&self) -> std::ops::Range<f64> {
        match self {
            Precipitation::Clear => 8.0..10.0,
            Precipitation::LightSnow | Precipitation::Rain => 3.0..6.0,
            Precipitation::HeavySnow => 0.5..2.5,
            Precipitation::Blizzard => 0.1..0.5,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Precipitation::Clear => "clear",
            Precipitation::LightSnow => "light-snow",
            Precipitation::HeavySnow => "heavy-snow",
            Precipitation::Rain => "rain",
            Precipitation::Blizzard => "blizzard",
        }
    }

    fn headline(&self) -> &'static str {
        match self {
            Precipitation::Clear => "skies clearing, smooth flying ahead",
            Precipitation::LightSnow => "light snow beginning, perfect Christmas weather",
            Precipitation::HeavySnow => "heavy snow developing, Santa's got the snow gear on",
            Precipitation::Blizzard => "blizzard conditions developing, Santa's got the storm gear on",
            Precipitation::Rain => "rain starting to fall, good thing reindeer don't mind getting wet",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Clear,
    Moderate,
    Severe,
    Extreme,
}

impl Severity {
    /// Deterministic classification from precipitation, wind and visibility
    pub fn classify(precipitation: Precipitation, wind_speed: u32, visibility: f64) -> Self {
        if precipitation == Precipitation::Blizzard || (wind_speed > 50 && visibility < 1.0) {
            Severity::Extreme
        } else if precipitation == Precipitation::HeavySnow || wind_speed > 40 {
            Severity::Severe
        } else if matches!(precipitation, Precipitation::LightSnow | Precipitation::Rain) || wind_speed > 25 {
            Severity::Moderate
        } else {
            Severity::Clear
        }
    }

    pub fn is_hazardous(&self) -> bool {
        *self >= Severity::Severe
    }

    /// Numeric level for trend charts
    pub fn level(&self) -> u8 {
        *self as u8
    }

    fn impact(&self, visibility: f64) -> String {
        match self {
            Severity::Extreme => format!(
                "EXTREME CONDITIONS: Delivery speed reduced by 60%. High risk to sleigh and reindeer. Visibility {} mi.",
                visibility
            ),
            Severity::Severe => format!(
                "SEVERE CONDITIONS: Delivery speed reduced by 40%. Increased risk to operations. Visibility {} mi.",
                visibility
            ),
            Severity::Moderate => format!(
                "MODERATE CONDITIONS: Delivery speed reduced by 20%. Exercise caution. Visibility {} mi.",
                visibility
            ),
            Severity::Clear => format!(
                "OPTIMAL CONDITIONS: No impact on delivery operations. Visibility {} mi.",
                visibility
            ),
        }
    }

    fn outlooks(&self) -> &'static [&'static str] {
        match self {
            Severity::Clear => &[
                "Conditions expected to remain clear for next 6 hours",
                "Clear skies with good visibility expected",
                "Excellent conditions for delivery operations",
            ],
            Severity::Moderate => &[
                "Conditions may worsen in next 3 hours",
                "Precipitation expected to continue",
                "Slight improvement expected in 4-6 hours",
            ],
            Severity::Severe => &[
                "Severe conditions expected to persist for 2-4 hours",
                "Possible improvement after midnight",
                "Storm system moving through region",
            ],
            Severity::Extreme => &[
                "EXTREME weather expected for next 2 hours - consider route diversion",
                "Blizzard conditions may persist - seek alternate route",
                "Storm expected to clear in 3-4 hours",
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentWeather {
    pub location: String,
    /// Degrees Fahrenheit
    pub temperature: i32,
    /// mph
    pub wind_speed: u32,
    pub wind_direction: u32,
    /// Miles, one decimal
    pub visibility: f64,
    pub precipitation: Precipitation,
    pub severity: Severity,
    pub impact: String,
    pub forecast: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherForecast {
    pub location: String,
    pub next_hour: CurrentWeather,
    pub next_3_hours: CurrentWeather,
    pub next_6_hours: CurrentWeather,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherAlert {
    pub id: Uuid,
    pub location: String,
    pub severity: Severity,
    #[serde(rename = "type")]
    pub alert_type: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub active: bool,
}

pub struct WeatherSimulator {
    interval: Duration,
    clock: SimClock,
    rng: ChaCha8Rng,
    location_index: usize,
    rotation_slot: u64,
    location_since: DateTime<Utc>,
    current: CurrentWeather,
    forecast: WeatherForecast,
    alerts: Vec<WeatherAlert>,
}

impl WeatherSimulator {
    pub const STREAM: u64 = 5;

    pub fn new(config: &TrackerConfig, now: DateTime<Utc>) -> Self {
        let mut rng = simulation_rng(config.seed, Self::STREAM);
        let current = generate_weather(LOCATIONS[0], &mut rng);
        let forecast = forecast_from(&current, now, &mut rng);

        tracing::info!(
            location = %current.location,
            precipitation = ?current.precipitation,
            "weather simulator initialized"
        );

        Self {
            interval: config.weather_interval(),
            clock: SimClock::new(now),
            rng,
            location_index: 0,
            rotation_slot: 0,
            location_since: now,
            current,
            forecast,
            alerts: Vec::new(),
        }
    }

    pub fn current_weather(&self) -> CurrentWeather {
        self.current.clone()
    }

    /// Outlook computed at the most recent tick
    pub fn forecast(&self) -> WeatherForecast {
        self.forecast.clone()
    }

    pub fn active_alerts(&self) -> Vec<WeatherAlert> {
        self.alerts.iter().filter(|a| a.active).cloned().collect()
    }

    /// Every alert ever raised, cleared ones included
    pub fn all_alerts(&self) -> Vec<WeatherAlert> {
        self.alerts.clone()
    }

    pub fn location(&self) -> &'static str {
        LOCATIONS[self.location_index]
    }

    /// Adopt `weather` as the current conditions and run the alert lifecycle
    pub fn record_conditions(&mut self, weather: CurrentWeather, now: DateTime<Utc>, telemetry: &Telemetry) {
        let previous = std::mem::replace(&mut self.current, weather);
        self.log_changes(&previous);
        self.update_alerts(now, telemetry);
    }

    fn rotate_location(&mut self, now: DateTime<Utc>) {
        let slot = (self.clock.minutes_elapsed(now) / ROTATION_MINUTES).floor() as u64;
        if slot <= self.rotation_slot {
            return;
        }
        self.rotation_slot = slot;

        let from = self.location();
        self.location_index = (self.location_index + 1) % LOCATIONS.len();
        tracing::info!(
            from,
            to = self.location(),
            watched_secs = (now - self.location_since).num_seconds(),
            "weather monitoring moving on"
        );
        self.location_since = now;
    }

    fn log_changes(&self, previous: &CurrentWeather) {
        let w = &self.current;
        if previous.precipitation != w.precipitation {
            tracing::info!(
                location = %w.location,
                from = ?previous.precipitation,
                to = ?w.precipitation,
                temperature = w.temperature,
                wind_speed = w.wind_speed,
                visibility = w.visibility,
                "{}",
                w.precipitation.headline()
            );
        }
        if previous.severity != w.severity {
            tracing::info!(
                location = %w.location,
                from = ?previous.severity,
                to = ?w.severity,
                impact = %w.impact,
                "weather severity changed"
            );
        }

        if w.visibility < 2.0 {
            tracing::warn!(location = %w.location, visibility = w.visibility, "visibility low, Rudolph's nose is extra helpful");
        }
        if w.wind_speed > 50 {
            tracing::warn!(location = %w.location, wind_speed = w.wind_speed, "high winds, holding on tight to the reins");
        }
        if w.temperature < -20 {
            tracing::warn!(location = %w.location, temperature = w.temperature, "even Santa's bundling up");
        }
        if w.precipitation == Precipitation::Clear
            && w.wind_speed < 15
            && w.visibility > 8.0
            && previous.precipitation != Precipitation::Clear
        {
            tracing::info!(location = %w.location, "perfect flying weather");
        }
    }

    fn update_alerts(&mut self, now: DateTime<Utc>, telemetry: &Telemetry) {
        let w = &self.current;

        if w.severity.is_hazardous() {
            let already_active = self
                .alerts
                .iter()
                .any(|a| a.active && a.location == w.location);
            if already_active {
                return;
            }

            let alert = WeatherAlert {
                id: Uuid::new_v4(),
                location: w.location.clone(),
                severity: w.severity,
                alert_type: if w.precipitation == Precipitation::Blizzard {
                    "Blizzard Warning".into()
                } else {
                    "Weather Advisory".into()
                },
                description: format!(
                    "{} {} conditions at {}",
                    format!("{:?}", w.severity).to_uppercase(),
                    w.precipitation.as_str(),
                    w.location
                ),
                start_time: now,
                end_time: None,
                active: true,
            };

            tracing::warn!(
                location = %alert.location,
                severity = ?alert.severity,
                alert_type = %alert.alert_type,
                "weather alert raised"
            );
            telemetry.event(
                "WeatherAlert",
                &json!({
                    "id": alert.id,
                    "location": alert.location,
                    "severity": alert.severity,
                    "type": alert.alert_type,
                    "description": alert.description,
                    "startTime": alert.start_time,
                    "active": true,
                    "windSpeed": w.wind_speed,
                    "visibility": w.visibility,
                    "temperature": w.temperature,
                }),
            );
            self.alerts.push(alert);
        } else {
            let location = w.location.clone();
            for alert in self
                .alerts
                .iter_mut()
                .filter(|a| a.active && a.location == location)
            {
                alert.active = false;
                alert.end_time = Some(now);
                tracing::info!(
                    location = %alert.location,
                    duration_ms = (now - alert.start_time).num_milliseconds(),
                    "weather alert cleared"
                );
            }
        }
    }

    fn publish(&self, now: DateTime<Utc>, telemetry: &Telemetry) {
        let w = &self.current;
        telemetry.event(
            "WeatherConditions",
            &json!({
                "location": w.location,
                "temperature": w.temperature,
                "windSpeed": w.wind_speed,
                "windDirection": w.wind_direction,
                "visibility": w.visibility,
                "precipitation": w.precipitation,
                "severity": w.severity,
                "impact": w.impact,
                "timestamp": now,
            }),
        );
        telemetry.metric("Custom/Weather/Temperature", f64::from(w.temperature));
        telemetry.metric("Custom/Weather/WindSpeed", f64::from(w.wind_speed));
        telemetry.metric("Custom/Weather/Visibility", w.visibility);
        telemetry.metric("Custom/Weather/Severity", f64::from(w.severity.level()));
    }
}

impl Simulator for WeatherSimulator {
    fn name(&self) -> &'static str {
        "weather"
    }

    fn tick_interval(&self) -> Duration {
        self.interval
    }

    fn tick(&mut self, now: DateTime<Utc>, telemetry: &Telemetry) {
        self.rotate_location(now);
        let weather = generate_weather(self.location(), &mut self.rng);
        self.record_conditions(weather, now, telemetry);
        self.forecast = forecast_from(&self.current, now, &mut self.rng);
        self.publish(now, telemetry);
    }
}

/// Fresh conditions for `location`
pub fn generate_weather(location: &str, rng: &mut impl Rng) -> CurrentWeather {
    let temperature = if location.contains("North Pole") {
        rng.gen_range(-30.0..-10.0)
    } else if HIGH_LATITUDE.iter().any(|city| location.contains(city)) {
        rng.gen_range(10.0..50.0)
    } else {
        rng.gen_range(30.0..70.0)
    };
    let temperature = f64::round(temperature) as i32;

    let wind_speed = (rng.gen_range(0.0..30.0) + rng.gen_range(0.0..30.0_f64)).round() as u32;
    let wind_direction = rng.gen_range(0.0..360.0_f64).round() as u32;

    let precipitation = Precipitation::from_roll(temperature, rng.gen());
    let visibility = (rng.gen_range(precipitation.visibility_range()) * 10.0).round() / 10.0;
    let severity = Severity::classify(precipitation, wind_speed, visibility);

    let forecast = severity
        .outlooks()
        .choose(rng)
        .copied()
        .unwrap_or_default()
        .to_string();

    CurrentWeather {
        location: location.to_string(),
        temperature,
        wind_speed,
        wind_direction,
        visibility,
        precipitation,
        severity,
        impact: severity.impact(visibility),
        forecast,
    }
}

fn future_weather(current: &CurrentWeather, hours_ahead: u32, rng: &mut impl Rng) -> CurrentWeather {
    let h = f64::from(hours_ahead);
    let temp_change = rng.gen_range(-0.5..0.5) * 10.0 * h;
    let wind_change = rng.gen_range(-0.5..0.5) * 20.0 * h;

    let severity = match current.severity {
        Severity::Extreme if hours_ahead > 3 => Severity::Severe,
        Severity::Severe if hours_ahead > 4 => Severity::Moderate,
        other => other,
    };

    CurrentWeather {
        temperature: (f64::from(current.temperature) + temp_change).round() as i32,
        wind_speed: (f64::from(current.wind_speed) + wind_change).round().max(0.0) as u32,
        severity,
        forecast: format!("Forecast for +{}h from current conditions", hours_ahead),
        ..current.clone()
    }
}

fn forecast_from(current: &CurrentWeather, now: DateTime<Utc>, rng: &mut impl Rng) -> WeatherForecast {
    WeatherForecast {
        location: current.location.clone(),
        next_hour: future_weather(current, 1, rng),
        next_3_hours: future_weather(current, 3, rng),
        next_6_hours: future_weather(current, 6, rng),
        timestamp: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::MemorySink;
    use std::sync::Arc;

    fn seeded(seed: u64) -> (WeatherSimulator, DateTime<Utc>) {
        let config = TrackerConfig {
            seed: Some(seed),
            ..TrackerConfig::default()
        };
        let start = Utc::now();
        (WeatherSimulator::new(&config, start), start)
    }

    fn conditions(location: &str, precipitation: Precipitation, wind_speed: u32, visibility: f64) -> CurrentWeather {
        let severity = Severity::classify(precipitation, wind_speed, visibility);
        CurrentWeather {
            location: location.to_string(),
            temperature: 20,
            wind_speed,
            wind_direction: 90,
            visibility,
            precipitation,
            severity,
            impact: severity.impact(visibility),
            forecast: String::new(),
        }
    }

    /// 5 simulated minutes is 2083 real milliseconds
    fn at_minutes(start: DateTime<Utc>, minutes: f64) -> DateTime<Utc> {
        start + chrono::Duration::milliseconds((minutes * 60_000.0 / 144.0).ceil() as i64)
    }

    #[test]
    fn test_severity_classification() {
        use Precipitation::*;
        assert_eq!(Severity::classify(Blizzard, 0, 5.0), Severity::Extreme);
        assert_eq!(Severity::classify(Clear, 55, 0.8), Severity::Extreme);
        assert_eq!(Severity::classify(HeavySnow, 0, 2.0), Severity::Severe);
        assert_eq!(Severity::classify(Clear, 45, 9.0), Severity::Severe);
        assert_eq!(Severity::classify(Rain, 0, 4.0), Severity::Moderate);
        assert_eq!(Severity::classify(Clear, 30, 9.0), Severity::Moderate);
        assert_eq!(Severity::classify(Clear, 10, 9.0), Severity::Clear);
    }

    #[test]
    fn test_precipitation_bands() {
        assert_eq!(Precipitation::from_roll(10, 0.1), Precipitation::Clear);
        assert_eq!(Precipitation::from_roll(10, 0.5), Precipitation::LightSnow);
        assert_eq!(Precipitation::from_roll(10, 0.7), Precipitation::HeavySnow);
        assert_eq!(Precipitation::from_roll(10, 0.9), Precipitation::Blizzard);
        assert_eq!(Precipitation::from_roll(40, 0.5), Precipitation::Clear);
        assert_eq!(Precipitation::from_roll(40, 0.9), Precipitation::Rain);
    }

    #[test]
    fn test_generated_weather_is_consistent() {
        let mut rng = simulation_rng(Some(1), 99);
        for location in LOCATIONS {
            for _ in 0..20 {
                let w = generate_weather(location, &mut rng);
                assert_eq!(w.severity, Severity::classify(w.precipitation, w.wind_speed, w.visibility));
                assert!(w.wind_speed <= 60);
                assert!(w.wind_direction <= 360);
                assert_eq!((w.visibility * 10.0).round() / 10.0, w.visibility);
                if location == "North Pole" {
                    assert!((-30..=-10).contains(&w.temperature));
                    assert!(!matches!(w.precipitation, Precipitation::Rain));
                }
            }
        }
    }

    #[test]
    fn test_alert_created_once_and_cleared_once() {
        let (mut sim, start) = seeded(1);
        let sink = Arc::new(MemorySink::new());
        let telemetry = Telemetry::new(sink.clone());

        sim.record_conditions(conditions("Oslo", Precipitation::Blizzard, 20, 0.3), start, &telemetry);
        sim.record_conditions(conditions("Oslo", Precipitation::HeavySnow, 20, 1.5), start, &telemetry);
        assert_eq!(sim.active_alerts().len(), 1, "no duplicate while active");
        assert_eq!(sim.active_alerts()[0].alert_type, "Blizzard Warning");
        assert_eq!(sink.events_named("WeatherAlert").len(), 1);

        let cleared_at = start + chrono::Duration::seconds(30);
        sim.record_conditions(conditions("Oslo", Precipitation::Clear, 5, 9.5), cleared_at, &telemetry);
        assert!(sim.active_alerts().is_empty());

        let all = sim.all_alerts();
        assert_eq!(all.len(), 1, "cleared alerts are kept");
        assert_eq!(all[0].end_time, Some(cleared_at));

        // A second improvement does not touch the cleared alert again
        let later = cleared_at + chrono::Duration::seconds(30);
        sim.record_conditions(conditions("Oslo", Precipitation::Rain, 5, 4.0), later, &telemetry);
        assert_eq!(sim.all_alerts()[0].end_time, Some(cleared_at));
    }

    #[test]
    fn test_alerts_are_per_location() {
        let (mut sim, start) = seeded(2);
        let telemetry = Telemetry::disabled();
        sim.record_conditions(conditions("Oslo", Precipitation::HeavySnow, 10, 1.0), start, &telemetry);
        sim.record_conditions(conditions("Tromsø", Precipitation::HeavySnow, 10, 1.0), start, &telemetry);
        sim.record_conditions(conditions("Oslo", Precipitation::Clear, 10, 9.0), start, &telemetry);

        let active = sim.active_alerts();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].location, "Tromsø");
        assert_eq!(active[0].alert_type, "Weather Advisory");
        assert_eq!(active[0].description, "SEVERE heavy-snow conditions at Tromsø");
    }

    #[test]
    fn test_location_rotates_one_step_per_boundary() {
        let (mut sim, start) = seeded(3);
        let telemetry = Telemetry::disabled();

        sim.tick(at_minutes(start, 2.0), &telemetry);
        assert_eq!(sim.location(), "North Pole");

        sim.tick(at_minutes(start, 5.0), &telemetry);
        assert_eq!(sim.location(), "Tokyo, Japan");
        sim.tick(at_minutes(start, 6.0), &telemetry);
        assert_eq!(sim.location(), "Tokyo, Japan");

        // Several boundaries between ticks still move a single step
        sim.tick(at_minutes(start, 21.0), &telemetry);
        assert_eq!(sim.location(), "Sydney, Australia");
        assert_eq!(sim.current_weather().location, "Sydney, Australia");
    }

    #[test]
    fn test_forecast_eases_severity() {
        let mut rng = simulation_rng(Some(4), 1);
        let current = conditions("Oslo", Precipitation::Blizzard, 20, 0.3);
        let forecast = forecast_from(&current, Utc::now(), &mut rng);

        assert_eq!(forecast.next_hour.severity, Severity::Extreme);
        assert_eq!(forecast.next_3_hours.severity, Severity::Extreme);
        assert_eq!(forecast.next_6_hours.severity, Severity::Severe);
        assert_eq!(forecast.next_6_hours.forecast, "Forecast for +6h from current conditions");
    }

    #[test]
    fn test_tick_publishes_conditions() {
        let (mut sim, start) = seeded(5);
        let sink = Arc::new(MemorySink::new());
        sim.tick(start, &Telemetry::new(sink.clone()));

        assert_eq!(sink.events_named("WeatherConditions").len(), 1);
        let severity = sink.metric_values("Custom/Weather/Severity");
        assert_eq!(severity.len(), 1);
        assert!((0.0..=3.0).contains(&severity[0]));
        assert_eq!(sim.forecast().location, "North Pole");
    }
}
