use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::{
    config::OpenWeatherConfig,
    error::WeatherError,
    query::WeatherQuery,
};

use super::{Endpoint, WeatherProvider};

/// HTTP access to the OpenWeather 2.5 API.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    config: OpenWeatherConfig,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(config: OpenWeatherConfig) -> Result<Self, WeatherError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("weather-mcp/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { config, http })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn endpoint_url(&self, endpoint: Endpoint) -> String {
        format!("{}/{}", self.config.base_url, endpoint.path())
    }

    fn classify(&self, err: reqwest::Error) -> WeatherError {
        if err.is_timeout() {
            WeatherError::Timeout(self.config.timeout)
        } else {
            // without_url keeps the appid out of the message
            WeatherError::Transport(err.without_url())
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    #[instrument(level = "debug", skip_all, fields(endpoint = %endpoint))]
    async fn fetch(&self, endpoint: Endpoint, query: &WeatherQuery) -> Result<Value, WeatherError> {
        let url = self.endpoint_url(endpoint);
        debug!(query = ?query.echo(), "requesting OpenWeather");

        let res = self
            .http
            .get(&url)
            .query(&query.params())
            .query(&[("appid", self.config.api_key.expose())])
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "OpenWeather returned an error status");
            return Err(WeatherError::Upstream {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                body,
            });
        }

        let body = res.text().await.map_err(|e| self.classify(e))?;
        let parsed: Value = serde_json::from_str(&body)?;

        debug!(bytes = body.len(), "OpenWeather response received");
        Ok(parsed)
    }
}
