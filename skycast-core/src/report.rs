//! Boundary between providers and presentation.
//!
//! Network and response-shape failures stop here and come back as [`ErrorReport`]
//! values, so callers branch on the error instead of unwinding. Configuration and
//! location errors are not recoverable and still propagate.

use tracing::warn;

use crate::{
    error::{ErrorReport, WeatherError},
    model::{CityMatch, CurrentWeather, ForecastResult, LocationQuery},
    provider::WeatherProvider,
};

pub type Report<T> = Result<T, ErrorReport>;

fn recover<T>(context: &str, result: Result<T, WeatherError>) -> Result<Report<T>, WeatherError> {
    match result {
        Ok(value) => Ok(Ok(value)),
        Err(err) if err.is_recoverable() => {
            warn!(error = %err, "{context}");
            Ok(Err(ErrorReport::new(context, &err)))
        }
        Err(err) => Err(err),
    }
}

pub async fn current_weather_report(
    provider: &dyn WeatherProvider,
    query: &LocationQuery,
) -> Result<Report<CurrentWeather>, WeatherError> {
    recover(
        "Failed to fetch current weather",
        provider.current_weather(query).await,
    )
}

pub async fn forecast_report(
    provider: &dyn WeatherProvider,
    query: &LocationQuery,
    days: usize,
) -> Result<Report<ForecastResult>, WeatherError> {
    recover("Failed to fetch forecast", provider.forecast(query, days).await)
}

pub async fn search_report(
    provider: &dyn WeatherProvider,
    query: &str,
) -> Result<Report<Vec<CityMatch>>, WeatherError> {
    recover("Failed to search cities", provider.search_cities(query).await)
}
