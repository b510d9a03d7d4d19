use std::time::Duration;

use thiserror::Error;

/// Errors produced while validating arguments, calling OpenWeather or
/// reading its responses.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// No API key in the environment or the config file.
    #[error(
        "Missing OPENWEATHER_API_KEY environment variable. Set it before launching the server \
         (or run `weather configure`)."
    )]
    MissingCredential,

    /// Neither a usable place name nor a usable coordinate pair.
    #[error("Provide either 'q' (city name) or both 'lat' and 'lon'.")]
    InvalidLocation,

    /// Forecast limit outside 1..=40.
    #[error("Forecast limit must be between 1 and 40, got {0}.")]
    InvalidLimit(u32),

    /// OpenWeather answered with a non-success status.
    #[error("OpenWeather request failed: {status} {status_text} - {}", display_body(.body))]
    Upstream {
        status: u16,
        status_text: String,
        body: String,
    },

    /// The response body was not valid JSON.
    #[error("Failed to parse OpenWeather response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("OpenWeather request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Failed to reach OpenWeather: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        WeatherError::Transport(err)
    }
}

fn display_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.is_empty() {
        return "no body".to_string();
    }
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
