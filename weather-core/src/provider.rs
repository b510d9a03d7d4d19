use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;

use crate::{error::WeatherError, query::WeatherQuery};

pub mod openweather;

pub use openweather::OpenWeatherProvider;

/// Upstream endpoints, relative to the configured base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Current,
    Forecast,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Current => "weather",
            Endpoint::Forecast => "forecast",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Source of raw weather documents. Each call is one upstream request.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch(&self, endpoint: Endpoint, query: &WeatherQuery) -> Result<Value, WeatherError>;

    async fn current(&self, query: &WeatherQuery) -> Result<Value, WeatherError> {
        self.fetch(Endpoint::Current, query).await
    }

    async fn forecast(&self, query: &WeatherQuery) -> Result<Value, WeatherError> {
        self.fetch(Endpoint::Forecast, query).await
    }
}
