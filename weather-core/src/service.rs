use std::sync::Arc;

use tracing::debug;

use crate::{
    error::WeatherError,
    model::{ForecastArgs, WeatherArgs},
    provider::WeatherProvider,
    query::{WeatherQuery, forecast_limit},
    summary::{CurrentReport, ForecastReport, summarize_current, summarize_forecast},
};

/// The two weather lookups, independent of any transport. Arguments are
/// validated before the provider is touched.
#[derive(Debug, Clone)]
pub struct WeatherService {
    provider: Arc<dyn WeatherProvider>,
}

impl WeatherService {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self { provider }
    }

    pub async fn current_weather(&self, args: &WeatherArgs) -> Result<CurrentReport, WeatherError> {
        let query = WeatherQuery::from_args(args)?;
        let raw = self.provider.current(&query).await?;

        debug!(location = ?query.location, "summarizing current weather");
        Ok(summarize_current(raw, query.echo(), query.units))
    }

    pub async fn forecast(&self, args: &ForecastArgs) -> Result<ForecastReport, WeatherError> {
        let query = WeatherQuery::from_args(&args.location)?;
        let limit = forecast_limit(args)?;
        let raw = self.provider.forecast(&query).await?;

        debug!(location = ?query.location, limit, "summarizing forecast");
        Ok(summarize_forecast(&raw, limit, query.units))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{model::Units, provider::Endpoint};
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::sync::Mutex;

    /// Records every request and answers with a canned document.
    #[derive(Debug, Default)]
    struct Recording {
        calls: Mutex<Vec<(Endpoint, WeatherQuery)>>,
        reply: Value,
    }

    #[async_trait]
    impl WeatherProvider for Recording {
        async fn fetch(&self, endpoint: Endpoint, query: &WeatherQuery) -> Result<Value, WeatherError> {
            self.calls.lock().unwrap().push((endpoint, query.clone()));
            Ok(self.reply.clone())
        }
    }

    fn service_with(reply: Value) -> (WeatherService, Arc<Recording>) {
        let provider = Arc::new(Recording {
            reply,
            ..Recording::default()
        });
        (WeatherService::new(provider.clone()), provider)
    }

    #[tokio::test]
    async fn invalid_location_never_reaches_provider() {
        let (service, provider) = service_with(json!({}));

        let err = service.current_weather(&WeatherArgs::default()).await.unwrap_err();
        assert!(matches!(err, WeatherError::InvalidLocation));

        let err = service
            .forecast(&ForecastArgs::new(WeatherArgs::coordinates(f64::NAN, 2.0)))
            .await
            .unwrap_err();
        assert!(matches!(err, WeatherError::InvalidLocation));

        assert!(provider.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn bad_limit_never_reaches_provider() {
        let (service, provider) = service_with(json!({}));

        let args = ForecastArgs::new(WeatherArgs::city("Lima")).with_limit(0);
        let err = service.forecast(&args).await.unwrap_err();

        assert!(matches!(err, WeatherError::InvalidLimit(0)));
        assert!(provider.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn current_weather_echoes_units() {
        let (service, provider) = service_with(json!({ "name": "Toronto", "main": { "temp": 5 } }));

        let report = service
            .current_weather(&WeatherArgs::city("Toronto").with_units(Units::Imperial))
            .await
            .unwrap();

        assert_eq!(report.summary.unit_system, Units::Imperial);
        assert_eq!(report.query["units"], "imperial");
        assert_eq!(report.query["q"], "Toronto");

        let calls = provider.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, Endpoint::Current);
    }

    #[tokio::test]
    async fn forecast_uses_forecast_endpoint_and_limit() {
        let list: Vec<Value> = (0..10).map(|i| json!({ "dt": i })).collect();
        let (service, provider) = service_with(json!({ "list": list }));

        let args = ForecastArgs::new(WeatherArgs::city("Toronto")).with_limit(3);
        let report = service.forecast(&args).await.unwrap();

        assert_eq!(report.count, 3);
        assert_eq!(report.unit_system, Units::Metric);
        assert_eq!(provider.calls.lock().unwrap()[0].0, Endpoint::Forecast);
    }
}
