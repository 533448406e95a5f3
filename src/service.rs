use anyhow::Result;
use rmcp::{
    handler::server::{wrapper::Parameters, ServerHandler, tool::ToolRouter},
    model::{CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
    ErrorData as McpError,
};

use crate::constants::{MAX_FORECAST_HOURS, MAX_GRID_SIZE};
use crate::error::WindError;
use crate::field::{wind_field, FieldConfig};
use crate::formatters::{format_field, format_forecast, format_observation, format_prediction};
use crate::forecast::{hourly_forecast, local_hour, predict, rng_from_seed, PredictionRange};
use crate::models::{
    Coordinates, GetWindFieldRequest, GetWindForecastRequest, GetWindRequest, Observation,
    PredictWindRequest,
};
use crate::upstream::OpenWeatherClient;

/// Wind service exposing the forecast model over MCP
#[derive(Clone)]
pub struct Wind {
    client: OpenWeatherClient,
    tool_router: ToolRouter<Self>,
}

impl Wind {
    /// Creates a new Wind service instance
    pub fn new(client: OpenWeatherClient) -> Result<Self> {
        if !client.has_api_key() {
            anyhow::bail!("OPENWEATHER_API_KEY must be set to serve wind tools");
        }

        Ok(Self {
            client,
            tool_router: Self::tool_router(),
        })
    }

    /// Validates coordinates before anything goes upstream
    fn coordinates(latitude: f64, longitude: f64) -> Result<Coordinates, McpError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(McpError::invalid_params(
                "Latitude must be within [-90, 90] and longitude within [-180, 180].",
                None,
            ));
        }
        Ok(Coordinates {
            lat: latitude,
            lon: longitude,
        })
    }

    /// Fetches the current observation, mapping upstream failures to MCP errors
    async fn observe(&self, at: Coordinates) -> Result<Observation, McpError> {
        self.client.fetch_observation(at).await.map_err(|e| match e {
            WindError::UpstreamStatus(404) => McpError::invalid_params(
                "Location not found by the weather provider.",
                None,
            ),
            e => McpError::internal_error(format!("Failed to fetch wind data: {}", e), None),
        })
    }
}

#[tool_handler]
impl ServerHandler for Wind {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "wind-forecast".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                title: None,
                website_url: None,
            },
            instructions: Some(
                "Current wind conditions from OpenWeatherMap plus a synthetic, \
                Navier-Stokes inspired wind forecast for display purposes. \
                Forecast values are randomized; pass a seed for reproducible output."
                    .to_string(),
            ),
        }
    }
}

#[tool_router]
impl Wind {
    /// Gets current wind conditions for a location
    #[tool(description = "Get current wind speed, direction, temperature, humidity and Beaufort force for a location. Provide latitude and longitude (e.g., latitude: 52.52, longitude: 13.41 for Berlin).")]
    async fn get_wind(
        &self,
        Parameters(request): Parameters<GetWindRequest>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(
            "Getting wind for coordinates: {}, {}",
            request.latitude,
            request.longitude
        );

        let at = Self::coordinates(request.latitude, request.longitude)?;
        let observation = self.observe(at).await?;

        Ok(CallToolResult::success(vec![Content::text(
            format_observation(at, &observation),
        )]))
    }

    /// Gets the synthetic hourly wind forecast
    #[tool(description = "Get a synthetic hourly wind speed and direction forecast (default 12 hours, max 168) derived from the current reading with a simplified Navier-Stokes inspired model. Optional seed makes the output reproducible.")]
    async fn get_wind_forecast(
        &self,
        Parameters(request): Parameters<GetWindForecastRequest>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(
            "Getting {}h wind forecast for coordinates: {}, {}",
            request.hours,
            request.latitude,
            request.longitude
        );

        if request.hours == 0 || request.hours > MAX_FORECAST_HOURS {
            return Err(McpError::invalid_params(
                format!("hours must be between 1 and {}", MAX_FORECAST_HOURS),
                None,
            ));
        }

        let at = Self::coordinates(request.latitude, request.longitude)?;
        let observation = self.observe(at).await?;

        let mut rng = rng_from_seed(request.seed);
        let points = hourly_forecast(&observation, request.hours, local_hour(), &mut rng);

        Ok(CallToolResult::success(vec![Content::text(format_forecast(
            &points,
        ))]))
    }

    /// Predicts short-range wind evolution and storm chance
    #[tool(description = "Predict wind speed, direction and travelled distance over a short time range (20-90 minutes, default 60) and distance range (1-4 km, default 2), including storm probability. Out-of-range values are clamped.")]
    async fn predict_wind(
        &self,
        Parameters(request): Parameters<PredictWindRequest>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(
            "Predicting wind for coordinates: {}, {}",
            request.latitude,
            request.longitude
        );

        let at = Self::coordinates(request.latitude, request.longitude)?;
        let observation = self.observe(at).await?;

        let default = PredictionRange::default();
        let range = PredictionRange::new(
            request.time_range_minutes.unwrap_or(default.minutes),
            request.distance_range_km.unwrap_or(default.distance_km),
        );
        let mut rng = rng_from_seed(request.seed);
        let prediction = predict(&observation, range, &mut rng);

        Ok(CallToolResult::success(vec![Content::text(
            format_prediction(&prediction),
        )]))
    }

    /// Gets the map arrow field around a location
    #[tool(description = "Get a grid of synthetic wind arrows (default 5x5, about 50m spacing) around a location for map display.")]
    async fn get_wind_field(
        &self,
        Parameters(request): Parameters<GetWindFieldRequest>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(
            "Getting {}x{} wind field for coordinates: {}, {}",
            request.grid_size,
            request.grid_size,
            request.latitude,
            request.longitude
        );

        if request.grid_size == 0 || request.grid_size > MAX_GRID_SIZE {
            return Err(McpError::invalid_params(
                format!("grid_size must be between 1 and {}", MAX_GRID_SIZE),
                None,
            ));
        }

        let at = Self::coordinates(request.latitude, request.longitude)?;
        let observation = self.observe(at).await?;
        let arrows = wind_field(at, &observation, &FieldConfig::with_grid_size(request.grid_size));

        Ok(CallToolResult::success(vec![Content::text(format_field(
            &arrows,
        ))]))
    }
}
