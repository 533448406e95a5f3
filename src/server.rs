use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use warp::http::StatusCode;
use warp::reply::{Json, WithStatus};
use warp::{Filter, Rejection, Reply};

use crate::constants::{
    DEFAULT_FORECAST_HOURS, DEFAULT_GRID_SIZE, MAX_FORECAST_HOURS, MAX_GRID_SIZE,
};
use crate::error::WindError;
use crate::field::{wind_field, FieldConfig};
use crate::forecast::{hourly_forecast, local_hour, predict, rng_from_seed, PredictionRange};
use crate::models::{Coordinates, ForecastPoint, GridArrow, Observation};
use crate::upstream::OpenWeatherClient;

pub async fn run(address: std::net::SocketAddr, client: OpenWeatherClient) {
    if !client.has_api_key() {
        tracing::warn!("OPENWEATHER_API_KEY is not set, wind requests will fail");
    }
    tracing::info!("Listening on http://{}", address);

    warp::serve(routes(client)).run(address).await
}

pub fn routes(
    client: OpenWeatherClient,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let health_route = warp::path!("health")
        .and(warp::get())
        .map(|| StatusCode::OK);

    let wind_route = warp::path!("api" / "wind")
        .and(warp::get())
        .and(warp::query::<Vec<(String, String)>>().map(WindQuery::from))
        .and(with_client(client.clone()))
        .and_then(proxy_wind);

    let forecast_route = warp::path!("api" / "forecast")
        .and(warp::get())
        .and(warp::query::<ForecastQuery>())
        .and(with_client(client.clone()))
        .and_then(forecast);

    let prediction_route = warp::path!("api" / "prediction")
        .and(warp::get())
        .and(warp::query::<PredictionQuery>())
        .and(with_client(client.clone()))
        .and_then(prediction);

    let field_route = warp::path!("api" / "field")
        .and(warp::get())
        .and(warp::query::<FieldQuery>())
        .and(with_client(client))
        .and_then(field);

    health_route
        .or(wind_route)
        .or(forecast_route)
        .or(prediction_route)
        .or(field_route)
        .recover(rejection)
}

fn with_client(
    client: OpenWeatherClient,
) -> impl Filter<Extract = (OpenWeatherClient,), Error = Infallible> + Clone {
    warp::any().map(move || client.clone())
}

// ============================================================================
// Query Parameters
// ============================================================================

/// Proxy parameters. Repeated keys keep their first value.
#[derive(Debug, Default)]
pub struct WindQuery {
    lat: Option<String>,
    lon: Option<String>,
}

impl From<Vec<(String, String)>> for WindQuery {
    fn from(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "lat" if query.lat.is_none() => query.lat = Some(value),
                "lon" if query.lon.is_none() => query.lon = Some(value),
                _ => {}
            }
        }
        query
    }
}

#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    lat: Option<String>,
    lon: Option<String>,
    hours: Option<u32>,
    start_hour: Option<u32>,
    seed: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct PredictionQuery {
    lat: Option<String>,
    lon: Option<String>,
    minutes: Option<f64>,
    distance: Option<f64>,
    seed: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct FieldQuery {
    lat: Option<String>,
    lon: Option<String>,
    size: Option<usize>,
}

/// Both coordinates as sent; empty values count as missing.
fn required_coordinates<'a>(
    lat: &'a Option<String>,
    lon: &'a Option<String>,
) -> Result<(&'a str, &'a str), WindError> {
    match (lat.as_deref(), lon.as_deref()) {
        (Some(lat), Some(lon)) if !lat.is_empty() && !lon.is_empty() => Ok((lat, lon)),
        _ => Err(WindError::MissingCoordinates),
    }
}

fn numeric_coordinates(
    lat: &Option<String>,
    lon: &Option<String>,
) -> Result<Coordinates, WindError> {
    let (lat, lon) = required_coordinates(lat, lon)?;
    match (lat.trim().parse::<f64>(), lon.trim().parse::<f64>()) {
        (Ok(lat), Ok(lon)) if lat.is_finite() && lon.is_finite() => Ok(Coordinates { lat, lon }),
        _ => Err(WindError::InvalidCoordinates),
    }
}

// ============================================================================
// Handlers
// ============================================================================

#[derive(Serialize)]
struct ErrorMessage {
    error: String,
}

fn error_reply(err: &WindError) -> WithStatus<Json> {
    match err {
        WindError::MissingCoordinates | WindError::InvalidCoordinates => {
            tracing::debug!("Rejected request: {}", err)
        }
        _ => tracing::error!("Error fetching wind data: {}", err),
    }
    let json = warp::reply::json(&ErrorMessage {
        error: err.public_message().to_string(),
    });
    warp::reply::with_status(json, err.status())
}

fn respond<T: Serialize>(result: Result<T, WindError>) -> Result<WithStatus<Json>, Infallible> {
    Ok(match result {
        Ok(body) => warp::reply::with_status(warp::reply::json(&body), StatusCode::OK),
        Err(err) => error_reply(&err),
    })
}

/// Relays the upstream payload verbatim.
pub async fn proxy_wind(
    query: WindQuery,
    client: OpenWeatherClient,
) -> Result<impl Reply, Infallible> {
    let result = match required_coordinates(&query.lat, &query.lon) {
        Ok((lat, lon)) => {
            tracing::info!("Proxying wind request for {}, {}", lat, lon);
            client.fetch_raw(lat, lon).await
        }
        Err(e) => Err(e),
    };
    respond(result)
}

#[derive(Serialize)]
struct ForecastResponse {
    observation: Observation,
    points: Vec<ForecastPoint>,
}

pub async fn forecast(
    query: ForecastQuery,
    client: OpenWeatherClient,
) -> Result<impl Reply, Infallible> {
    let result = async {
        let at = numeric_coordinates(&query.lat, &query.lon)?;
        let observation = client.fetch_observation(at).await?;

        let hours = query
            .hours
            .unwrap_or(DEFAULT_FORECAST_HOURS)
            .min(MAX_FORECAST_HOURS);
        let start_hour = query.start_hour.unwrap_or_else(local_hour) % 24;
        let mut rng = rng_from_seed(query.seed);

        Ok::<_, WindError>(ForecastResponse {
            observation,
            points: hourly_forecast(&observation, hours, start_hour, &mut rng),
        })
    }
    .await;
    respond(result)
}

pub async fn prediction(
    query: PredictionQuery,
    client: OpenWeatherClient,
) -> Result<impl Reply, Infallible> {
    let result = async {
        let at = numeric_coordinates(&query.lat, &query.lon)?;
        let observation = client.fetch_observation(at).await?;

        let default = PredictionRange::default();
        let range = PredictionRange::new(
            query.minutes.unwrap_or(default.minutes),
            query.distance.unwrap_or(default.distance_km),
        );
        let mut rng = rng_from_seed(query.seed);

        Ok::<_, WindError>(predict(&observation, range, &mut rng))
    }
    .await;
    respond(result)
}

#[derive(Serialize)]
struct FieldResponse {
    center: Coordinates,
    config: FieldConfig,
    arrows: Vec<GridArrow>,
}

pub async fn field(query: FieldQuery, client: OpenWeatherClient) -> Result<impl Reply, Infallible> {
    let result = async {
        let center = numeric_coordinates(&query.lat, &query.lon)?;
        let observation = client.fetch_observation(center).await?;

        let size = query.size.unwrap_or(DEFAULT_GRID_SIZE).min(MAX_GRID_SIZE);
        let config = FieldConfig::with_grid_size(size);

        Ok::<_, WindError>(FieldResponse {
            center,
            arrows: wind_field(center, &observation, &config),
            config,
        })
    }
    .await;
    respond(result)
}

pub async fn rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (code, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found")
    } else if err.find::<warp::reject::InvalidQuery>().is_some() {
        (StatusCode::BAD_REQUEST, "Invalid query parameters")
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
    } else {
        tracing::error!("Unhandled rejection: {:?}", err);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    };

    let json = warp::reply::json(&ErrorMessage {
        error: message.into(),
    });

    Ok(warp::reply::with_status(json, code))
}
