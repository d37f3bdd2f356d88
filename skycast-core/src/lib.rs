//! Core library for the `skycast` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The HTTP transport and the OpenWeatherMap provider built on it
//! - Mapping of current conditions and day-by-day forecast aggregation
//! - Shared domain models and the error taxonomy
//!
//! It is used by `skycast-cli`, but can also be reused by other binaries or services.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod mapper;
pub mod model;
pub mod provider;
pub mod report;
pub mod transport;

pub use config::Config;
pub use error::{ErrorReport, TransportError, WeatherError};
pub use model::{
    CityMatch, ConditionGroup, CurrentWeather, DailySummary, ForecastEntry, ForecastResult,
    LocationQuery,
};
pub use provider::{WeatherProvider, provider_from_config};
pub use report::Report;
