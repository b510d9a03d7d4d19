//! Validation of tool arguments and construction of the upstream query.

use serde_json::{Map, Value};

use crate::{
    error::WeatherError,
    model::{ForecastArgs, Units, WeatherArgs},
};

/// Number of forecast entries returned when the caller gives no limit
/// (eight 3-hour slots, roughly the next 24 hours).
pub const DEFAULT_FORECAST_LIMIT: usize = 8;
pub const MAX_FORECAST_LIMIT: u32 = 40;

/// Where to look up the weather.
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    /// Free-text place name, already trimmed and non-empty.
    Name(String),
    Coordinates { lat: f64, lon: f64 },
}

/// A validated upstream query, without the credential.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherQuery {
    pub location: Location,
    pub units: Units,
    pub lang: Option<String>,
}

impl WeatherQuery {
    /// Validate caller arguments. A non-blank `q` wins and the coordinates
    /// are not looked at; otherwise both `lat` and `lon` must be finite.
    pub fn from_args(args: &WeatherArgs) -> Result<Self, WeatherError> {
        let name = args.q.as_deref().map(str::trim).filter(|q| !q.is_empty());

        let location = match (name, args.lat, args.lon) {
            (Some(name), _, _) => Location::Name(name.to_string()),
            (None, Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => {
                Location::Coordinates { lat, lon }
            }
            _ => return Err(WeatherError::InvalidLocation),
        };

        Ok(Self {
            location,
            units: args.units.unwrap_or_default(),
            lang: args.lang.clone().filter(|l| !l.is_empty()),
        })
    }

    /// Key/value pairs for the upstream URL, minus `appid`.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(4);

        match &self.location {
            Location::Name(name) => params.push(("q", name.clone())),
            Location::Coordinates { lat, lon } => {
                params.push(("lat", lat.to_string()));
                params.push(("lon", lon.to_string()));
            }
        }
        params.push(("units", self.units.as_str().to_string()));
        if let Some(lang) = &self.lang {
            params.push(("lang", lang.clone()));
        }

        params
    }

    /// The query as echoed back to callers. The credential is never part of it.
    pub fn echo(&self) -> Map<String, Value> {
        self.params()
            .into_iter()
            .map(|(k, v)| (k.to_string(), Value::String(v)))
            .collect()
    }
}

/// Validate the optional forecast limit.
pub fn forecast_limit(args: &ForecastArgs) -> Result<usize, WeatherError> {
    match args.limit {
        None => Ok(DEFAULT_FORECAST_LIMIT),
        Some(n) if (1..=MAX_FORECAST_LIMIT).contains(&n) => Ok(n as usize),
        Some(n) => Err(WeatherError::InvalidLimit(n)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param<'a>(params: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn name_takes_precedence_over_coordinates() {
        let args = WeatherArgs {
            q: Some("  Toronto ".into()),
            lat: Some(f64::NAN),
            lon: None,
            ..WeatherArgs::default()
        };
        let query = WeatherQuery::from_args(&args).unwrap();

        assert_eq!(query.location, Location::Name("Toronto".into()));
        let params = query.params();
        assert_eq!(param(&params, "q"), Some("Toronto"));
        assert_eq!(param(&params, "lat"), None);
        assert_eq!(param(&params, "lon"), None);
    }

    #[test]
    fn blank_name_falls_through_to_coordinates() {
        let args = WeatherArgs {
            q: Some("   ".into()),
            ..WeatherArgs::coordinates(43.65107, -79.347015)
        };
        let query = WeatherQuery::from_args(&args).unwrap();
        let params = query.params();

        assert_eq!(param(&params, "q"), None);
        assert_eq!(param(&params, "lat"), Some("43.65107"));
        assert_eq!(param(&params, "lon"), Some("-79.347015"));
    }

    #[test]
    fn whole_coordinates_render_without_fraction() {
        let query = WeatherQuery::from_args(&WeatherArgs::coordinates(5.0, -0.5)).unwrap();
        let params = query.params();

        assert_eq!(param(&params, "lat"), Some("5"));
        assert_eq!(param(&params, "lon"), Some("-0.5"));
    }

    #[test]
    fn missing_or_non_finite_coordinates_are_invalid() {
        let cases = [
            WeatherArgs::default(),
            WeatherArgs {
                lat: Some(1.0),
                ..WeatherArgs::default()
            },
            WeatherArgs {
                lon: Some(1.0),
                ..WeatherArgs::default()
            },
            WeatherArgs::coordinates(f64::NAN, 1.0),
            WeatherArgs::coordinates(1.0, f64::INFINITY),
            WeatherArgs {
                q: Some(String::new()),
                ..WeatherArgs::default()
            },
        ];

        for args in &cases {
            let err = WeatherQuery::from_args(args).unwrap_err();
            assert!(matches!(err, WeatherError::InvalidLocation), "{args:?}");
        }
    }

    #[test]
    fn units_default_to_metric() {
        let query = WeatherQuery::from_args(&WeatherArgs::city("Oslo")).unwrap();
        assert_eq!(query.units, Units::Metric);
        assert_eq!(param(&query.params(), "units"), Some("metric"));

        for units in Units::all() {
            let query = WeatherQuery::from_args(&WeatherArgs::city("Oslo").with_units(*units)).unwrap();
            assert_eq!(param(&query.params(), "units"), Some(units.as_str()));
        }
    }

    #[test]
    fn lang_is_forwarded_only_when_present() {
        let query = WeatherQuery::from_args(&WeatherArgs::city("Paris")).unwrap();
        assert_eq!(param(&query.params(), "lang"), None);

        let query = WeatherQuery::from_args(&WeatherArgs::city("Paris").with_lang("")).unwrap();
        assert_eq!(param(&query.params(), "lang"), None);

        let query = WeatherQuery::from_args(&WeatherArgs::city("Paris").with_lang("fr")).unwrap();
        assert_eq!(param(&query.params(), "lang"), Some("fr"));
    }

    #[test]
    fn echo_never_contains_credential() {
        let query = WeatherQuery::from_args(&WeatherArgs::city("Paris").with_lang("fr")).unwrap();
        let echo = query.echo();

        assert!(!echo.contains_key("appid"));
        assert_eq!(echo["q"], "Paris");
        assert_eq!(echo["units"], "metric");
        assert_eq!(echo["lang"], "fr");
    }

    #[test]
    fn forecast_limit_bounds() {
        let args = ForecastArgs::new(WeatherArgs::city("Rome"));
        assert_eq!(forecast_limit(&args).unwrap(), DEFAULT_FORECAST_LIMIT);
        assert_eq!(forecast_limit(&args.clone().with_limit(1)).unwrap(), 1);
        assert_eq!(forecast_limit(&args.clone().with_limit(40)).unwrap(), 40);

        for bad in [0, 41, 1000] {
            let err = forecast_limit(&args.clone().with_limit(bad)).unwrap_err();
            assert!(matches!(err, WeatherError::InvalidLimit(n) if n == bad));
        }
    }
}
