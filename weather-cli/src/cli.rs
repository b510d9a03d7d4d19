use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode};
use rmcp::{
    ServiceExt,
    model::{CallToolRequestParam, CallToolResult},
    service::{RoleClient, RunningService},
    transport::TokioChildProcess,
};
use tokio::process::Command as ProcessCommand;
use tracing::{debug, info};
use weather_core::{
    Config, ForecastArgs, OpenWeatherConfig, Units, WeatherArgs, config::API_KEY_ENV,
};

const SERVER_BIN: &str = "weather-server";
const DEFAULT_CITY: &str = "Toronto";

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Demonstration client for the weather MCP server")]
pub struct Cli {
    /// Path to the weather-server executable. Defaults to the binary next to
    /// this one, then to `weather-server` on PATH.
    #[arg(long, global = true)]
    pub server: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store an OpenWeather API key in the config file.
    Configure,

    /// List the tools exposed by the server.
    ListTools,

    /// Call `get_current_weather` once and print the result.
    Current(LocationOpts),

    /// Call `get_forecast` once and print the result.
    Forecast {
        #[command(flatten)]
        location: LocationOpts,

        /// Number of 3-hour entries to return (1-40).
        #[arg(long)]
        limit: Option<u32>,
    },
}

#[derive(Debug, Clone, Args)]
pub struct LocationOpts {
    /// City name, e.g. "Toronto" or "London,uk". Defaults to Toronto when
    /// no coordinates are given either.
    #[arg(short = 'q', long = "city")]
    pub q: Option<String>,

    /// Latitude in decimal degrees.
    #[arg(long, allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude in decimal degrees.
    #[arg(long, allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// standard, metric or imperial.
    #[arg(long, default_value_t = Units::Metric)]
    pub units: Units,

    /// Language code for the weather description, e.g. "fr".
    #[arg(long)]
    pub lang: Option<String>,
}

impl LocationOpts {
    fn into_args(self) -> WeatherArgs {
        let q = match (&self.q, self.lat, self.lon) {
            (None, None, None) => Some(DEFAULT_CITY.to_string()),
            _ => self.q,
        };
        WeatherArgs {
            q,
            lat: self.lat,
            lon: self.lon,
            units: Some(self.units),
            lang: self.lang,
        }
    }
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        if let Command::Configure = self.command {
            return configure();
        }

        // Fail before spawning anything when there is no key.
        let settings = Config::load()?.resolve_from_env()?;
        let client = connect(self.server, &settings).await?;

        let outcome = match self.command {
            Command::Configure => Ok(()),
            Command::ListTools => list_tools(&client).await,
            Command::Current(location) => {
                let args = serde_json::to_value(location.into_args())?;
                call_and_print(&client, "get_current_weather", args).await
            }
            Command::Forecast { location, limit } => {
                let args = ForecastArgs {
                    location: location.into_args(),
                    limit,
                };
                call_and_print(&client, "get_forecast", serde_json::to_value(args)?).await
            }
        };

        client.cancel().await.context("Failed to shut down the server connection")?;
        outcome
    }
}

fn configure() -> Result<()> {
    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("No API key entered")?;

    let api_key = api_key.trim().to_string();
    if api_key.is_empty() {
        bail!("API key must not be empty");
    }

    let mut config = Config::load()?;
    config.set_api_key(api_key);
    config.save()?;

    println!("Saved API key to {}", Config::config_file_path()?.display());
    Ok(())
}

fn server_path(explicit: Option<PathBuf>) -> PathBuf {
    if let Some(path) = explicit {
        return path;
    }
    let sibling = std::env::current_exe()
        .ok()
        .map(|exe| exe.with_file_name(format!("{SERVER_BIN}{}", std::env::consts::EXE_SUFFIX)))
        .filter(|path| path.exists());

    sibling.unwrap_or_else(|| PathBuf::from(SERVER_BIN))
}

async fn connect(
    server: Option<PathBuf>,
    settings: &OpenWeatherConfig,
) -> Result<RunningService<RoleClient, ()>> {
    let path = server_path(server);
    info!(server = %path.display(), "spawning weather server");

    let mut cmd = ProcessCommand::new(&path);
    cmd.env(API_KEY_ENV, settings.api_key.expose());

    let transport = TokioChildProcess::new(cmd)
        .with_context(|| format!("Failed to start {}", path.display()))?;
    let client = ().serve(transport).await.context("MCP handshake with the server failed")?;

    Ok(client)
}

async fn list_tools(client: &RunningService<RoleClient, ()>) -> Result<()> {
    let tools = client.list_all_tools().await.context("Failed to list tools")?;

    println!("Tools available:");
    for tool in tools {
        match tool.description.as_deref() {
            Some(description) => println!("- {}: {description}", tool.name),
            None => println!("- {}", tool.name),
        }
    }
    Ok(())
}

async fn call_and_print(
    client: &RunningService<RoleClient, ()>,
    tool: &'static str,
    args: serde_json::Value,
) -> Result<()> {
    debug!(tool, %args, "calling tool");
    let result = client
        .call_tool(CallToolRequestParam {
            name: tool.into(),
            arguments: args.as_object().cloned(),
        })
        .await
        .with_context(|| format!("Calling {tool} failed"))?;

    println!("{}", render(&result)?);

    if result.is_error == Some(true) {
        bail!("{tool} reported an error");
    }
    Ok(())
}

/// The first text block, or the whole result as JSON when there is none.
fn render(result: &CallToolResult) -> Result<String> {
    match result.content.first().and_then(|c| c.as_text()) {
        Some(text) => Ok(text.text.clone()),
        None => Ok(serde_json::to_string_pretty(result)?),
    }
}
