use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;

use crate::constants::{OPENWEATHER_API_BASE, UPSTREAM_TIMEOUT, USER_AGENT};
use crate::error::WindError;
use crate::models::{Coordinates, Observation, UpstreamWeather};

/// Client for the OpenWeatherMap current weather endpoint.
///
/// The API key is optional at construction so the proxy can still start
/// and answer with a server error when it is missing.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: Arc<Client>,
    base_url: String,
    api_key: Option<String>,
}

impl OpenWeatherClient {
    pub fn new(api_key: Option<String>) -> Result<Self, WindError> {
        Self::with_base_url(api_key, OPENWEATHER_API_BASE)
    }

    pub fn with_base_url(api_key: Option<String>, base_url: &str) -> Result<Self, WindError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(UPSTREAM_TIMEOUT)
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url: base_url.trim_end_matches('/').to_string(),
            // Blank keys in .env files count as unset
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Fetches current weather and returns the upstream JSON untouched.
    ///
    /// `lat` and `lon` are forwarded exactly as the caller supplied them.
    pub async fn fetch_raw(&self, lat: &str, lon: &str) -> Result<Value, WindError> {
        let api_key = self.api_key.as_deref().ok_or(WindError::MissingApiKey)?;

        let url = format!("{}/weather", self.base_url);
        tracing::debug!("Requesting current weather for {}, {}", lat, lon);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", lat),
                ("lon", lon),
                ("units", "metric"),
                ("appid", api_key),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(WindError::UpstreamStatus(response.status().as_u16()));
        }

        let data = response.json::<Value>().await?;
        Ok(data)
    }

    /// Fetches current weather and decodes the wind reading from it.
    pub async fn fetch_observation(&self, at: Coordinates) -> Result<Observation, WindError> {
        let raw = self
            .fetch_raw(&at.lat.to_string(), &at.lon.to_string())
            .await?;
        let weather: UpstreamWeather = serde_json::from_value(raw)?;
        Ok(Observation::from(weather))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_body() -> Value {
        serde_json::json!({
            "coord": {"lon": -0.13, "lat": 51.51},
            "wind": {"speed": 5.1, "deg": 250},
            "main": {"temp": 12.3, "pressure": 1002, "humidity": 81},
            "name": "London"
        })
    }

    #[tokio::test]
    async fn test_fetch_raw_relays_body_verbatim() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("lat", "51.51"))
            .and(query_param("lon", "-0.13"))
            .and(query_param("units", "metric"))
            .and(query_param("appid", "test_key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
            .mount(&mock_server)
            .await;

        let client =
            OpenWeatherClient::with_base_url(Some("test_key".into()), &mock_server.uri()).unwrap();
        let body = client.fetch_raw("51.51", "-0.13").await.unwrap();

        assert_eq!(body, sample_body());
    }

    #[tokio::test]
    async fn test_fetch_observation() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
            .mount(&mock_server)
            .await;

        let client =
            OpenWeatherClient::with_base_url(Some("k".into()), &mock_server.uri()).unwrap();
        let obs = client
            .fetch_observation(Coordinates { lat: 51.51, lon: -0.13 })
            .await
            .unwrap();

        assert_eq!(obs.speed, 5.1);
        assert_eq!(obs.direction, 250.0);
        assert_eq!(obs.pressure, Some(1002.0));
    }

    #[tokio::test]
    async fn test_upstream_error_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let client =
            OpenWeatherClient::with_base_url(Some("bad".into()), &mock_server.uri()).unwrap();
        let result = client.fetch_raw("1", "2").await;

        assert!(matches!(result, Err(WindError::UpstreamStatus(401))));
    }

    #[tokio::test]
    async fn test_missing_api_key_skips_request() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
            .expect(0)
            .mount(&mock_server)
            .await;

        let client =
            OpenWeatherClient::with_base_url(Some("  ".into()), &mock_server.uri()).unwrap();
        assert!(!client.has_api_key());

        let result = client.fetch_raw("1", "2").await;
        assert!(matches!(result, Err(WindError::MissingApiKey)));
    }

    #[tokio::test]
    async fn test_observation_requires_wind_object() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"main": {}})),
            )
            .mount(&mock_server)
            .await;

        let client =
            OpenWeatherClient::with_base_url(Some("k".into()), &mock_server.uri()).unwrap();
        let result = client
            .fetch_observation(Coordinates { lat: 0.0, lon: 0.0 })
            .await;

        assert!(matches!(result, Err(WindError::Parse(_))));
    }
}
