//! MCP tool surface for the weather lookups.
//!
//! Exposes `get_current_weather` and `get_forecast` through `rmcp`. Each
//! tool answers with a single text block holding pretty-printed JSON, or an
//! error result carrying the failure message.

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};
use tracing::{info, warn};
use weather_core::{ForecastArgs, WeatherArgs, WeatherError, WeatherService};

pub const SERVER_NAME: &str = "weather-server";

const INSTRUCTIONS: &str = "Current weather and 5 day / 3 hour forecasts from OpenWeather. \
    Locate by city name (q) or by coordinates (lat, lon).";

#[derive(Clone)]
pub struct WeatherServer {
    service: WeatherService,
    tool_router: ToolRouter<Self>,
}

impl std::fmt::Debug for WeatherServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherServer")
            .field("service", &self.service)
            .finish_non_exhaustive()
    }
}

#[tool_router]
impl WeatherServer {
    pub fn new(service: WeatherService) -> Self {
        Self {
            service,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        name = "get_current_weather",
        description = "Get current weather by city name (q) or coordinates (lat, lon). Units supported: standard, metric, imperial."
    )]
    async fn get_current_weather(
        &self,
        Parameters(args): Parameters<WeatherArgs>,
    ) -> Result<CallToolResult, McpError> {
        let report = self.service.current_weather(&args).await;
        Ok(into_tool_result(
            "get_current_weather",
            report.and_then(|r| r.to_pretty_json().map_err(WeatherError::from)),
        ))
    }

    #[tool(
        name = "get_forecast",
        description = "Get 5 day / 3 hour forecast by city name (q) or coordinates (lat, lon). Units supported: standard, metric, imperial."
    )]
    async fn get_forecast(
        &self,
        Parameters(args): Parameters<ForecastArgs>,
    ) -> Result<CallToolResult, McpError> {
        let report = self.service.forecast(&args).await;
        Ok(into_tool_result(
            "get_forecast",
            report.and_then(|r| r.to_pretty_json().map_err(WeatherError::from)),
        ))
    }
}

/// Failures are reported to the caller as error results, not protocol errors.
fn into_tool_result(tool: &str, outcome: Result<String, WeatherError>) -> CallToolResult {
    match outcome {
        Ok(text) => {
            info!(tool, "tool call succeeded");
            CallToolResult::success(vec![Content::text(text)])
        }
        Err(err) => {
            warn!(tool, error = %err, "tool call failed");
            CallToolResult::error(vec![Content::text(err.to_string())])
        }
    }
}

#[tool_handler]
impl ServerHandler for WeatherServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(INSTRUCTIONS.to_string()),
            ..Default::default()
        }
    }
}
