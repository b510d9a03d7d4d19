//! Binary for the `weather-server` MCP server.
//!
//! Reads the OpenWeather settings once at startup, then serves the tools
//! over stdin/stdout. Logs go to stderr.

use std::sync::Arc;

use anyhow::Context;
use rmcp::{ServiceExt, transport::stdio};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use weather_core::{Config, OpenWeatherProvider, WeatherService};
use weather_server::WeatherServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let settings = Config::load()?.resolve_from_env()?;
    let provider = OpenWeatherProvider::new(settings).context("Failed to build HTTP client")?;
    tracing::info!(base_url = provider.base_url(), "starting weather-server on stdio");

    let server = WeatherServer::new(WeatherService::new(Arc::new(provider)));
    let service = server
        .serve(stdio())
        .await
        .context("MCP handshake failed")?;

    let reason = service.waiting().await?;
    tracing::info!(?reason, "weather-server stopped");
    Ok(())
}
