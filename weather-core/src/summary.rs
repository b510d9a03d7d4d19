//! Reshaping of OpenWeather documents into compact summaries.
//!
//! Upstream documents are read through partial structures in which every
//! field is optional and a field of the wrong type reads as absent, so a
//! surprising payload never fails a call.

use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::{Map, Number, Value};

use crate::model::Units;

pub const CURRENT_SOURCE: &str = "https://openweathermap.org/current";
pub const FORECAST_SOURCE: &str = "https://openweathermap.org/forecast5";
pub const FORECAST_NOTE: &str = "Times are in UTC (Unix seconds).";

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn read<T: DeserializeOwned + Default>(raw: &Value) -> T {
    T::deserialize(raw).unwrap_or_default()
}

#[derive(Debug, Default, Deserialize)]
struct MainBlock {
    #[serde(default, deserialize_with = "lenient")]
    temp: Option<Number>,
    #[serde(default, deserialize_with = "lenient")]
    feels_like: Option<Number>,
    #[serde(default, deserialize_with = "lenient")]
    humidity: Option<Number>,
    #[serde(default, deserialize_with = "lenient")]
    pressure: Option<Number>,
}

#[derive(Debug, Default, Deserialize)]
struct SysBlock {
    #[serde(default, deserialize_with = "lenient")]
    sunrise: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    sunset: Option<i64>,
}

/// `GET /weather` payload, as far as the summary cares.
#[derive(Debug, Default, Deserialize)]
struct CurrentPayload {
    #[serde(default, deserialize_with = "lenient")]
    name: Option<String>,
    #[serde(default)]
    coord: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    weather: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "lenient")]
    main: Option<MainBlock>,
    #[serde(default, deserialize_with = "lenient")]
    visibility: Option<Number>,
    #[serde(default)]
    wind: Option<Value>,
    #[serde(default)]
    clouds: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    sys: Option<SysBlock>,
    #[serde(default, deserialize_with = "lenient")]
    dt: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct ForecastItem {
    #[serde(default, deserialize_with = "lenient")]
    dt: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    main: Option<MainBlock>,
    #[serde(default, deserialize_with = "lenient")]
    weather: Option<Vec<Value>>,
    #[serde(default)]
    wind: Option<Value>,
    #[serde(default)]
    clouds: Option<Value>,
}

/// `GET /forecast` payload.
#[derive(Debug, Default, Deserialize)]
struct ForecastPayload {
    #[serde(default)]
    city: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    list: Option<Vec<Value>>,
}

/// Curated view of current conditions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feels_like: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pressure: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clouds: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sunrise_utc: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sunset_utc: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observation_time_utc: Option<i64>,
    pub unit_system: Units,
    pub source: &'static str,
}

/// Output of the current-weather tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentReport {
    pub query: Map<String, Value>,
    pub summary: CurrentSummary,
    pub raw: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_utc: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feels_like: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pressure: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clouds: Option<Value>,
}

/// Output of the forecast tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<Value>,
    pub count: usize,
    pub entries: Vec<ForecastEntry>,
    pub unit_system: Units,
    pub note: &'static str,
    pub source: &'static str,
}

impl CurrentReport {
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl ForecastReport {
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn first_condition(weather: Option<Vec<Value>>) -> Option<Value> {
    weather.and_then(|list| list.into_iter().next())
}

/// Summarize a current-weather document. `query` is the redacted echo of
/// what was sent upstream.
pub fn summarize_current(raw: Value, query: Map<String, Value>, units: Units) -> CurrentReport {
    let payload: CurrentPayload = read(&raw);
    let main = payload.main.unwrap_or_default();
    let sys = payload.sys.unwrap_or_default();

    let summary = CurrentSummary {
        location: payload.name,
        coordinates: payload.coord,
        weather: first_condition(payload.weather),
        temperature: main.temp,
        feels_like: main.feels_like,
        humidity: main.humidity,
        pressure: main.pressure,
        visibility: payload.visibility,
        wind: payload.wind,
        clouds: payload.clouds,
        sunrise_utc: sys.sunrise,
        sunset_utc: sys.sunset,
        observation_time_utc: payload.dt,
        unit_system: units,
        source: CURRENT_SOURCE,
    };

    CurrentReport {
        query,
        summary,
        raw,
    }
}

/// Summarize a forecast document, keeping the first `limit` entries in
/// upstream order.
pub fn summarize_forecast(raw: &Value, limit: usize, units: Units) -> ForecastReport {
    let payload: ForecastPayload = read(raw);

    let entries: Vec<ForecastEntry> = payload
        .list
        .unwrap_or_default()
        .iter()
        .take(limit)
        .map(|item| {
            let item: ForecastItem = read(item);
            let main = item.main.unwrap_or_default();
            ForecastEntry {
                time_utc: item.dt,
                temp: main.temp,
                feels_like: main.feels_like,
                humidity: main.humidity,
                pressure: main.pressure,
                weather: first_condition(item.weather),
                wind: item.wind,
                clouds: item.clouds,
            }
        })
        .collect();

    ForecastReport {
        city: payload.city,
        count: entries.len(),
        entries,
        unit_system: units,
        note: FORECAST_NOTE,
        source: FORECAST_SOURCE,
    }
}
