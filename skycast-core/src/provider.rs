use crate::{
    Config, WeatherError,
    model::{CityMatch, CurrentWeather, ForecastResult, LocationQuery},
    provider::openweather::OpenWeatherProvider,
    transport::HttpTransport,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current_weather(&self, query: &LocationQuery) -> Result<CurrentWeather, WeatherError>;

    /// Daily summaries for at most `days` calendar days.
    async fn forecast(&self, query: &LocationQuery, days: usize)
    -> Result<ForecastResult, WeatherError>;

    async fn search_cities(&self, query: &str) -> Result<Vec<CityMatch>, WeatherError>;
}

/// Construct the OpenWeatherMap provider from config.
///
/// Fails with [`WeatherError::Configuration`] before any request when no key is set.
pub fn provider_from_config(config: &Config) -> Result<Box<dyn WeatherProvider>, WeatherError> {
    let api_key = config.require_api_key()?;

    let transport = HttpTransport::new(config.timeout())?;
    let provider = OpenWeatherProvider::new(transport, api_key.to_owned())
        .with_base_url(config.base_url.clone());

    Ok(Box::new(provider))
}
