//! Synthetic wind forecasts.
//!
//! A "Navier-Stokes inspired" perturbation of a single reading: pressure
//! and temperature anomalies push the speed, a periodic term adds diurnal
//! or oscillatory variation, and bounded noise keeps each call different.
//! Randomness is always drawn from the caller's RNG so a seeded generator
//! reproduces a forecast exactly.

use chrono::Timelike;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::f64::consts::PI;
use std::fmt;

use crate::constants::{
    MIN_FORECAST_SPEED, PREDICTION_STEPS, REFERENCE_PRESSURE_HPA, REFERENCE_TEMPERATURE_C,
};
use crate::models::{wrap_degrees, ForecastPoint, Observation, PredictionPoint};

/// Returns a seeded RNG when a seed is given, otherwise an entropy-seeded one.
pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}

/// Current local hour, the phase of the diurnal term.
pub fn local_hour() -> u32 {
    chrono::Local::now().hour()
}

/// Forcing terms derived from the observation's pressure and temperature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Forcing {
    pub pressure_gradient: f64,
    pub thermal: f64,
}

impl Forcing {
    pub fn from_observation(obs: &Observation) -> Self {
        Self {
            pressure_gradient: obs
                .pressure
                .map_or(0.0, |p| (REFERENCE_PRESSURE_HPA - p) / 10.0),
            thermal: obs
                .temperature
                .map_or(0.0, |t| (t - REFERENCE_TEMPERATURE_C) / 10.0),
        }
    }

    /// Rotation sense imposed by the pressure gradient.
    pub fn rotation_sign(&self) -> f64 {
        if self.pressure_gradient > 0.0 {
            1.0
        } else {
            -1.0
        }
    }
}

/// Symmetric noise in [-amplitude/2, amplitude/2).
fn noise<R: Rng>(rng: &mut R, amplitude: f64) -> f64 {
    (rng.random::<f64>() - 0.5) * amplitude
}

/// Hourly forecast starting at local hour `start_hour`.
///
/// Every point is an independent perturbation of the observation, so the
/// zeroth direction equals the observed direction while its speed already
/// carries the forcing and noise terms.
pub fn hourly_forecast<R: Rng>(
    obs: &Observation,
    hours: u32,
    start_hour: u32,
    rng: &mut R,
) -> Vec<ForecastPoint> {
    let forcing = Forcing::from_observation(obs);
    let sign = forcing.rotation_sign();

    (0..hours)
        .map(|hour| {
            let t = f64::from(hour);
            let diurnal = (f64::from(start_hour + hour) * PI / 12.0).sin() * 0.5;

            let speed_change = forcing.pressure_gradient * 0.2
                + forcing.thermal * 0.1 * t
                + diurnal
                + noise(rng, 0.8);

            let direction_change = t * 3.0 * sign + (t / 2.0).sin() * 10.0;

            ForecastPoint {
                hour,
                speed: (obs.speed + speed_change).max(MIN_FORECAST_SPEED),
                direction: wrap_degrees(obs.direction + direction_change),
            }
        })
        .collect()
}

/// Slider-bounded input to the short-range prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionRange {
    pub minutes: f64,
    pub distance_km: f64,
}

impl PredictionRange {
    pub const MINUTES_MIN: f64 = 20.0;
    pub const MINUTES_MAX: f64 = 90.0;
    pub const MINUTES_STEP: f64 = 5.0;
    pub const DISTANCE_MIN: f64 = 1.0;
    pub const DISTANCE_MAX: f64 = 4.0;
    pub const DISTANCE_STEP: f64 = 0.5;

    /// Clamps and snaps both values onto the slider grid. Non-finite
    /// values fall back to the defaults.
    pub fn new(minutes: f64, distance_km: f64) -> Self {
        let default = Self::default();
        Self {
            minutes: snap(
                minutes,
                default.minutes,
                Self::MINUTES_MIN,
                Self::MINUTES_MAX,
                Self::MINUTES_STEP,
            ),
            distance_km: snap(
                distance_km,
                default.distance_km,
                Self::DISTANCE_MIN,
                Self::DISTANCE_MAX,
                Self::DISTANCE_STEP,
            ),
        }
    }
}

impl Default for PredictionRange {
    fn default() -> Self {
        Self {
            minutes: 60.0,
            distance_km: 2.0,
        }
    }
}

fn snap(value: f64, fallback: f64, min: f64, max: f64, step: f64) -> f64 {
    if !value.is_finite() {
        return fallback;
    }
    let clamped = value.clamp(min, max);
    (min + ((clamped - min) / step).round() * step).min(max)
}

/// Qualitative storm risk from the peak predicted speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StormChance {
    Low,
    Moderate,
    High,
}

impl StormChance {
    pub fn from_max_speed(speed: f64) -> Self {
        if speed >= 17.0 {
            Self::High
        } else if speed >= 10.0 {
            Self::Moderate
        } else {
            Self::Low
        }
    }
}

impl fmt::Display for StormChance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "0.001%"),
            Self::Moderate => write!(f, "Moderate"),
            Self::High => write!(f, "High"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub range: PredictionRange,
    pub points: Vec<PredictionPoint>,
    pub storm_chance: StormChance,
}

impl Prediction {
    pub fn max_speed(&self) -> f64 {
        peak_speed(&self.points)
    }
}

fn peak_speed(points: &[PredictionPoint]) -> f64 {
    points.iter().map(|p| p.speed).fold(0.0, f64::max)
}

/// Short-range prediction over `range.minutes`, integrated in
/// [`PREDICTION_STEPS`] steps. Unlike the hourly forecast, each step
/// evolves the previous state, and the parcel's travelled distance feeds
/// back as a drag term.
pub fn predict<R: Rng>(
    obs: &Observation,
    range: PredictionRange,
    rng: &mut R,
) -> Prediction {
    let forcing = Forcing::from_observation(obs);
    let sign = forcing.rotation_sign();
    let step = range.minutes / f64::from(PREDICTION_STEPS);

    let mut speed = obs.speed;
    let mut direction = obs.direction;
    let mut distance_m = 0.0;
    let mut points = Vec::with_capacity(PREDICTION_STEPS as usize + 1);

    for i in 0..=PREDICTION_STEPS {
        if i > 0 {
            let pressure_effect = forcing.pressure_gradient * 0.02 * step;
            let thermal_effect = forcing.thermal * 0.01 * step;
            let drag = (distance_m / 1000.0) * 0.05;
            let turbulence = noise(rng, 0.2 * step);

            speed = (speed + pressure_effect + thermal_effect - drag + turbulence)
                .max(MIN_FORECAST_SPEED);

            let direction_change = sign * 0.5 * step + noise(rng, 5.0);
            direction = wrap_degrees(direction + direction_change);

            // m/s over `step` minutes
            distance_m += speed * 60.0 * step;
        }

        points.push(PredictionPoint {
            minutes: f64::from(i) * step,
            speed,
            direction,
            distance_km: distance_m / 1000.0,
        });
    }

    Prediction {
        range,
        storm_chance: StormChance::from_max_speed(peak_speed(&points)),
        points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Observation {
        Observation::new(5.0, 90.0)
            .with_pressure(1000.0)
            .with_temperature(20.0)
    }

    #[test]
    fn test_forcing_terms() {
        let forcing = Forcing::from_observation(&sample());
        assert!((forcing.pressure_gradient - 1.3).abs() < 1e-9);
        assert!((forcing.thermal - 0.5).abs() < 1e-9);
        assert_eq!(forcing.rotation_sign(), 1.0);

        let calm = Forcing::from_observation(&Observation::new(3.0, 0.0));
        assert_eq!(calm.pressure_gradient, 0.0);
        assert_eq!(calm.thermal, 0.0);
        assert_eq!(calm.rotation_sign(), -1.0);
    }

    #[test]
    fn test_freezing_reading_is_not_treated_as_missing() {
        let obs = Observation::new(3.0, 0.0).with_temperature(0.0);
        let forcing = Forcing::from_observation(&obs);
        assert!((forcing.thermal + 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_hourly_forecast_known_values() {
        let mut rng = rng_from_seed(Some(7));
        let points = hourly_forecast(&sample(), 12, 9, &mut rng);

        assert_eq!(points.len(), 12);
        assert_eq!(points[0].hour, 0);
        assert_eq!(points[0].direction, 90.0);
        for (i, p) in points.iter().enumerate() {
            assert_eq!(p.hour as usize, i);
            assert!(p.speed >= 0.5);
            assert!((0.0..360.0).contains(&p.direction));
        }
    }

    #[test]
    fn test_hourly_forecast_is_reproducible_with_seed() {
        let a = hourly_forecast(&sample(), 12, 0, &mut rng_from_seed(Some(42)));
        let b = hourly_forecast(&sample(), 12, 0, &mut rng_from_seed(Some(42)));
        let c = hourly_forecast(&sample(), 12, 0, &mut rng_from_seed(Some(43)));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_hourly_speed_floor_for_calm_high_pressure() {
        // Strong high pressure and cold air push the speed well below zero
        let obs = Observation::new(0.0, 5.0)
            .with_pressure(1050.0)
            .with_temperature(-20.0);
        let mut rng = rng_from_seed(Some(1));
        for p in hourly_forecast(&obs, 48, 0, &mut rng) {
            assert!(p.speed >= 0.5);
            assert!((0.0..360.0).contains(&p.direction));
        }
    }

    #[test]
    fn test_hourly_direction_wraps_negative_deltas() {
        // Negative rotation from a northerly reading would go below zero
        let obs = Observation::new(4.0, 2.0).with_pressure(1020.0);
        let points = hourly_forecast(&obs, 12, 0, &mut rng_from_seed(Some(3)));
        assert!(points.iter().skip(1).any(|p| p.direction > 180.0));
        assert!(points.iter().all(|p| (0.0..360.0).contains(&p.direction)));
    }

    #[test]
    fn test_zero_hours_is_empty() {
        assert!(hourly_forecast(&sample(), 0, 0, &mut rng_from_seed(Some(0))).is_empty());
    }

    #[test]
    fn test_prediction_shape() {
        let mut rng = rng_from_seed(Some(11));
        let prediction = predict(&sample(), PredictionRange::default(), &mut rng);

        assert_eq!(prediction.points.len(), 11);
        let first = prediction.points[0];
        assert_eq!(first.minutes, 0.0);
        assert_eq!(first.speed, 5.0);
        assert_eq!(first.direction, 90.0);
        assert_eq!(first.distance_km, 0.0);
        assert_eq!(prediction.points[10].minutes, 60.0);

        for pair in prediction.points.windows(2) {
            assert!(pair[1].distance_km >= pair[0].distance_km);
            assert!(pair[1].minutes > pair[0].minutes);
        }
        for p in &prediction.points {
            assert!(p.speed >= 0.5);
            assert!((0.0..360.0).contains(&p.direction));
        }
    }

    #[test]
    fn test_prediction_storm_chance_matches_peak() {
        let prediction = predict(
            &Observation::new(25.0, 180.0),
            PredictionRange::new(20.0, 1.0),
            &mut rng_from_seed(Some(5)),
        );
        assert_eq!(
            prediction.storm_chance,
            StormChance::from_max_speed(prediction.max_speed())
        );
        assert_eq!(prediction.points[0].speed, 25.0);
    }

    #[test]
    fn test_storm_chance_thresholds() {
        assert_eq!(StormChance::from_max_speed(9.99), StormChance::Low);
        assert_eq!(StormChance::from_max_speed(10.0), StormChance::Moderate);
        assert_eq!(StormChance::from_max_speed(16.9), StormChance::Moderate);
        assert_eq!(StormChance::from_max_speed(17.0), StormChance::High);
        assert_eq!(StormChance::Low.to_string(), "0.001%");
    }

    #[test]
    fn test_prediction_range_snaps_to_slider() {
        assert_eq!(PredictionRange::new(62.0, 2.2), PredictionRange::new(60.0, 2.0));
        assert_eq!(PredictionRange::new(5.0, 0.0), PredictionRange::new(20.0, 1.0));
        assert_eq!(PredictionRange::new(500.0, 9.0), PredictionRange::new(90.0, 4.0));
        assert_eq!(PredictionRange::new(f64::NAN, f64::INFINITY), PredictionRange::default());
        let r = PredictionRange::new(88.0, 3.8);
        assert_eq!(r.minutes, 90.0);
        assert_eq!(r.distance_km, 4.0);
    }
}
