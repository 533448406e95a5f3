use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_FORECAST_HOURS, DEFAULT_GRID_SIZE};

/// Wraps any angle (including negative ones) into [0, 360).
pub fn wrap_degrees(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

// ============================================================================
// OpenWeatherMap API Models
// ============================================================================

/// Subset of the OpenWeatherMap current weather payload the model reads.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamWeather {
    pub wind: UpstreamWind,
    pub main: Option<UpstreamMain>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamWind {
    pub speed: f64,
    pub deg: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamMain {
    pub pressure: Option<f64>,
    pub temp: Option<f64>,
    pub humidity: Option<f64>,
}

// ============================================================================
// Domain Models
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// One wind reading at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// m/s
    pub speed: f64,
    /// Meteorological degrees, [0, 360)
    pub direction: f64,
    /// hPa
    pub pressure: Option<f64>,
    /// °C
    pub temperature: Option<f64>,
    /// Percent
    pub humidity: Option<f64>,
}

impl Observation {
    pub fn new(speed: f64, direction: f64) -> Self {
        Self {
            speed: speed.max(0.0),
            direction: wrap_degrees(direction),
            pressure: None,
            temperature: None,
            humidity: None,
        }
    }

    pub fn with_pressure(mut self, pressure: f64) -> Self {
        self.pressure = Some(pressure);
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_humidity(mut self, humidity: f64) -> Self {
        self.humidity = Some(humidity);
        self
    }
}

impl From<UpstreamWeather> for Observation {
    fn from(weather: UpstreamWeather) -> Self {
        let main = weather.main;
        Self {
            pressure: main.as_ref().and_then(|m| m.pressure),
            temperature: main.as_ref().and_then(|m| m.temp),
            humidity: main.as_ref().and_then(|m| m.humidity),
            ..Self::new(weather.wind.speed, weather.wind.deg)
        }
    }
}

/// Hourly synthetic forecast entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastPoint {
    /// Hours from now
    pub hour: u32,
    pub speed: f64,
    pub direction: f64,
}

/// Short-range prediction entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionPoint {
    pub minutes: f64,
    pub speed: f64,
    pub direction: f64,
    /// Distance travelled by the air parcel since the start
    pub distance_km: f64,
}

/// Synthetic map arrow around the observation point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridArrow {
    pub lat: f64,
    pub lon: f64,
    pub speed: f64,
    pub direction: f64,
}

// ============================================================================
// MCP Tool Request Models
// ============================================================================

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct GetWindRequest {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct GetWindForecastRequest {
    pub latitude: f64,
    pub longitude: f64,
    /// Forecast horizon in hours (default 12)
    #[serde(default = "default_hours")]
    pub hours: u32,
    /// Optional RNG seed for reproducible output
    pub seed: Option<u64>,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct PredictWindRequest {
    pub latitude: f64,
    pub longitude: f64,
    /// Time range in minutes, 20-90 (default 60)
    pub time_range_minutes: Option<f64>,
    /// Distance range in km, 1-4 (default 2)
    pub distance_range_km: Option<f64>,
    pub seed: Option<u64>,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct GetWindFieldRequest {
    pub latitude: f64,
    pub longitude: f64,
    /// Grid side length (default 5)
    #[serde(default = "default_grid_size")]
    pub grid_size: usize,
}

fn default_hours() -> u32 {
    DEFAULT_FORECAST_HOURS
}

fn default_grid_size() -> usize {
    DEFAULT_GRID_SIZE
}
