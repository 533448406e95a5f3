use warp::http::StatusCode;

use crate::constants::{
    FETCH_FAILED_MESSAGE, INVALID_COORDINATES_MESSAGE, MISSING_COORDINATES_MESSAGE,
};

/// Errors raised while serving wind data
#[derive(Debug, thiserror::Error)]
pub enum WindError {
    #[error("Latitude and longitude are required")]
    MissingCoordinates,
    #[error("Latitude and longitude must be numeric")]
    InvalidCoordinates,
    #[error("OpenWeatherMap API key is not configured")]
    MissingApiKey,
    #[error("OpenWeatherMap API responded with status: {0}")]
    UpstreamStatus(u16),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl WindError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingCoordinates | Self::InvalidCoordinates => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to hand back to clients. Upstream and configuration
    /// details stay in the server log.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::MissingCoordinates => MISSING_COORDINATES_MESSAGE,
            Self::InvalidCoordinates => INVALID_COORDINATES_MESSAGE,
            _ => FETCH_FAILED_MESSAGE,
        }
    }
}
