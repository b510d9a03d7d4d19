//! Core library for the weather MCP server.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Validation of tool arguments into upstream queries
//! - Access to the OpenWeather HTTP API behind the [`WeatherProvider`] trait
//! - Summaries of current conditions and forecasts
//!
//! It is used by `weather-server` and `weather-cli`, but has no knowledge of
//! the tool protocol itself.

pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod query;
pub mod service;
pub mod summary;

pub use config::{ApiKey, Config, OpenWeatherConfig};
pub use error::WeatherError;
pub use model::{ForecastArgs, Units, WeatherArgs};
pub use provider::{Endpoint, OpenWeatherProvider, WeatherProvider};
pub use query::{Location, WeatherQuery};
pub use service::WeatherService;
pub use summary::{CurrentReport, CurrentSummary, ForecastEntry, ForecastReport};
