//! One-shot location acquisition gating the rest of the flow.

use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use crate::models::Coordinates;

/// Fixed acquisition settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeolocationOptions {
    pub enable_high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest cached position that is still acceptable
    pub maximum_age: Duration,
}

impl Default for GeolocationOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout: Duration::from_millis(15_000),
            maximum_age: Duration::from_millis(10_000),
        }
    }
}

/// Location failures, each with a fixed user-facing message
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeolocationError {
    #[error("Geolocation is not supported by your browser")]
    Unsupported,
    #[error("You denied the request for location access. Please enable location services for this site in your browser settings.")]
    PermissionDenied,
    #[error("Location information is unavailable. Please try again later.")]
    PositionUnavailable,
    #[error("The request to get your location timed out. Please try again.")]
    Timeout,
    #[error("Failed to get your location")]
    Other,
}

impl GeolocationError {
    /// Maps a W3C `GeolocationPositionError` code
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => Self::PermissionDenied,
            2 => Self::PositionUnavailable,
            3 => Self::Timeout,
            _ => Self::Other,
        }
    }
}

impl FromStr for Coordinates {
    type Err = GeolocationError;

    /// Parses `"lat,lon"` in decimal degrees
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lon) = s
            .split_once(',')
            .ok_or(GeolocationError::PositionUnavailable)?;
        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|_| GeolocationError::PositionUnavailable)?;
        let lon: f64 = lon
            .trim()
            .parse()
            .map_err(|_| GeolocationError::PositionUnavailable)?;

        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(GeolocationError::PositionUnavailable);
        }
        Ok(Coordinates { lat, lon })
    }
}

/// Parses one position report: either `"lat,lon"` or `"error <code>"`
/// for a failed acquisition.
pub fn parse_position_report(line: &str) -> Result<Coordinates, GeolocationError> {
    let line = line.trim();
    match line.strip_prefix("error") {
        Some(code) => Err(code
            .trim()
            .parse()
            .map_or(GeolocationError::Other, GeolocationError::from_code)),
        None => line.parse(),
    }
}

/// Resolves a single position, failing with [`GeolocationError::Timeout`]
/// when the source does not answer within `options.timeout`.
pub async fn locate<F>(
    source: F,
    options: &GeolocationOptions,
) -> Result<Coordinates, GeolocationError>
where
    F: Future<Output = Result<Coordinates, GeolocationError>>,
{
    match tokio::time::timeout(options.timeout, source).await {
        Ok(result) => {
            if let Ok(position) = &result {
                tracing::info!("Location acquired: {:.4}, {:.4}", position.lat, position.lon);
            }
            result
        }
        Err(_) => {
            tracing::warn!("Location request timed out after {:?}", options.timeout);
            Err(GeolocationError::Timeout)
        }
    }
}
