use std::time::Duration;

/// User agent string for HTTP requests
pub const USER_AGENT: &str = "wind-forecast-server/0.1.0";

/// OpenWeatherMap current weather API base URL
pub const OPENWEATHER_API_BASE: &str = "https://api.openweathermap.org/data/2.5";

/// Upstream request timeout
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// Default listen address for the HTTP proxy
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:3000";

/// Sea-level reference pressure (hPa) for the pressure-gradient term
pub const REFERENCE_PRESSURE_HPA: f64 = 1013.0;

/// Reference temperature (°C) for the thermal term
pub const REFERENCE_TEMPERATURE_C: f64 = 15.0;

/// Speeds below this are treated as non-physical in forecasts (m/s)
pub const MIN_FORECAST_SPEED: f64 = 0.5;

/// Default hourly forecast horizon, and the longest one served
pub const DEFAULT_FORECAST_HOURS: u32 = 12;
pub const MAX_FORECAST_HOURS: u32 = 168;

/// Prediction steps (the prediction holds one more point than this)
pub const PREDICTION_STEPS: u32 = 10;

/// Default map arrow grid size and spacing (degrees, ~50m)
pub const DEFAULT_GRID_SIZE: usize = 5;
pub const DEFAULT_GRID_SPACING: f64 = 0.0005;
pub const MAX_GRID_SIZE: usize = 25;

pub const MISSING_COORDINATES_MESSAGE: &str = "Latitude and longitude are required";
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch wind data";
pub const INVALID_COORDINATES_MESSAGE: &str = "Latitude and longitude must be numeric";
