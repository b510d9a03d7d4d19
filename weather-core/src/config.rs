use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fmt, fs, path::PathBuf, time::Duration};

use crate::error::WeatherError;

pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";
pub const BASE_URL_ENV: &str = "OPENWEATHER_BASE_URL";
pub const TIMEOUT_ENV: &str = "OPENWEATHER_TIMEOUT_SECS";

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// OpenWeather API key. Never printed: `Debug` and `Display` are redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw key, for the outbound request only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey([redacted])")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[redacted]")
    }
}

/// Configuration stored on disk. Every field can be overridden from the
/// environment.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// base_url = "https://api.openweathermap.org/data/2.5"
/// timeout_secs = 30
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// Fully resolved settings handed to [`crate::OpenWeatherClient`].
#[derive(Debug, Clone)]
pub struct OpenWeatherConfig {
    pub api_key: ApiKey,
    pub base_url: String,
    pub timeout: Duration,
}

impl OpenWeatherConfig {
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-task", "weather-mcp")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    /// Merge environment overrides (looked up through `env`) over the file
    /// values and produce the settings for the HTTP client.
    pub fn resolve<F>(&self, env: F) -> Result<OpenWeatherConfig, WeatherError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| env(name).filter(|v| !v.trim().is_empty());

        let api_key = lookup(API_KEY_ENV)
            .or_else(|| self.api_key.clone().filter(|k| !k.trim().is_empty()))
            .map(ApiKey::new)
            .ok_or(WeatherError::MissingCredential)?;

        let base_url = lookup(BASE_URL_ENV)
            .or_else(|| self.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout_secs = match lookup(TIMEOUT_ENV) {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                WeatherError::Config(format!("{TIMEOUT_ENV} must be a whole number of seconds, got '{raw}'"))
            })?,
            None => self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        };
        if timeout_secs == 0 {
            return Err(WeatherError::Config("timeout must be at least one second".into()));
        }

        Ok(OpenWeatherConfig {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Resolve against the process environment.
    pub fn resolve_from_env(&self) -> Result<OpenWeatherConfig, WeatherError> {
        self.resolve(|name| std::env::var(name).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn missing_key_is_a_credential_error() {
        let cfg = Config::default();
        let err = cfg.resolve(env_of(&[])).unwrap_err();

        assert!(matches!(err, WeatherError::MissingCredential));
        assert!(err.to_string().contains(API_KEY_ENV));
    }

    #[test]
    fn blank_env_key_counts_as_missing() {
        let cfg = Config::default();
        let err = cfg.resolve(env_of(&[(API_KEY_ENV, "  ")])).unwrap_err();
        assert!(matches!(err, WeatherError::MissingCredential));
    }

    #[test]
    fn env_key_and_defaults() {
        let cfg = Config::default();
        let resolved = cfg.resolve(env_of(&[(API_KEY_ENV, "ENV_KEY")])).unwrap();

        assert_eq!(resolved.api_key.expose(), "ENV_KEY");
        assert_eq!(resolved.base_url, DEFAULT_BASE_URL);
        assert_eq!(resolved.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn env_overrides_file() {
        let cfg = Config {
            api_key: Some("FILE_KEY".into()),
            base_url: Some("http://file.example".into()),
            timeout_secs: Some(5),
        };
        let resolved = cfg
            .resolve(env_of(&[
                (API_KEY_ENV, "ENV_KEY"),
                (BASE_URL_ENV, "http://env.example/"),
                (TIMEOUT_ENV, "7"),
            ]))
            .unwrap();

        assert_eq!(resolved.api_key.expose(), "ENV_KEY");
        assert_eq!(resolved.base_url, "http://env.example");
        assert_eq!(resolved.timeout, Duration::from_secs(7));
    }

    #[test]
    fn file_values_used_without_env() {
        let cfg: Config = toml::from_str(
            r#"
            api_key = "FILE_KEY"
            timeout_secs = 3
            "#,
        )
        .unwrap();
        let resolved = cfg.resolve(env_of(&[])).unwrap();

        assert_eq!(resolved.api_key.expose(), "FILE_KEY");
        assert_eq!(resolved.base_url, DEFAULT_BASE_URL);
        assert_eq!(resolved.timeout, Duration::from_secs(3));
    }

    #[test]
    fn bad_timeouts_are_rejected() {
        let cfg = Config::default();
        let err = cfg
            .resolve(env_of(&[(API_KEY_ENV, "K"), (TIMEOUT_ENV, "soon")]))
            .unwrap_err();
        assert!(matches!(err, WeatherError::Config(_)));

        let err = cfg
            .resolve(env_of(&[(API_KEY_ENV, "K"), (TIMEOUT_ENV, "0")]))
            .unwrap_err();
        assert!(matches!(err, WeatherError::Config(_)));
    }

    #[test]
    fn api_key_is_redacted_in_debug_output() {
        let cfg = Config::default();
        let resolved = cfg.resolve(env_of(&[(API_KEY_ENV, "SECRET123")])).unwrap();

        assert!(!format!("{resolved:?}").contains("SECRET123"));
        assert_eq!(resolved.api_key.to_string(), "[redacted]");
    }

    #[test]
    fn empty_config_serializes_to_empty_toml() {
        let mut cfg = Config::default();
        assert_eq!(toml::to_string_pretty(&cfg).unwrap().trim(), "");

        cfg.set_api_key("KEY".into());
        let text = toml::to_string_pretty(&cfg).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back, cfg);
    }
}
