use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::WeatherError;

/// Display format for wall-clock timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// What to ask the provider about.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    /// `q=City` or `q=City,CC`.
    City {
        name: String,
        country: Option<String>,
    },
    Coordinates {
        lat: f64,
        lon: f64,
    },
}

impl LocationQuery {
    pub fn city(name: impl Into<String>, country: Option<String>) -> Self {
        LocationQuery::City {
            name: name.into(),
            country,
        }
    }

    pub fn coordinates(lat: f64, lon: f64) -> Result<Self, WeatherError> {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(WeatherError::InvalidLocation(format!(
                "({lat}, {lon}): latitude must be -90..90 and longitude -180..180"
            )));
        }
        Ok(LocationQuery::Coordinates { lat, lon })
    }

    /// Parse user input: `"<lat>,<lon>"` becomes a coordinate query, anything else a city.
    ///
    /// An explicit `country` is appended to a city name; it is rejected for coordinates.
    pub fn parse(input: &str, country: Option<&str>) -> Result<Self, WeatherError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(WeatherError::InvalidLocation("location is empty".into()));
        }

        if let Some((a, b)) = input.split_once(',') {
            if let (Ok(lat), Ok(lon)) = (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
                if country.is_some() {
                    return Err(WeatherError::InvalidLocation(
                        "a country code cannot be combined with coordinates".into(),
                    ));
                }
                return Self::coordinates(lat, lon);
            }
        }

        let country = country
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_uppercase);
        Ok(Self::city(input, country))
    }

    /// Query parameters identifying the location, excluding credentials and units.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        match self {
            LocationQuery::City {
                name,
                country: Some(cc),
            } => vec![("q", format!("{name},{cc}"))],
            LocationQuery::City {
                name,
                country: None,
            } => vec![("q", name.clone())],
            LocationQuery::Coordinates { lat, lon } => {
                vec![("lat", lat.to_string()), ("lon", lon.to_string())]
            }
        }
    }
}

impl std::fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocationQuery::City {
                name,
                country: Some(cc),
            } => write!(f, "{name},{cc}"),
            LocationQuery::City { name, country: None } => f.write_str(name),
            LocationQuery::Coordinates { lat, lon } => write!(f, "{lat},{lon}"),
        }
    }
}

/// Coarse weather category derived from the provider's numeric condition id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionGroup {
    Thunderstorm,
    Drizzle,
    Rain,
    Snow,
    Mist,
    Clear,
    Clouds,
}

impl ConditionGroup {
    pub fn from_id(id: u32) -> Self {
        match id {
            200..=299 => ConditionGroup::Thunderstorm,
            300..=399 => ConditionGroup::Drizzle,
            500..=599 => ConditionGroup::Rain,
            600..=699 => ConditionGroup::Snow,
            700..=799 => ConditionGroup::Mist,
            800 => ConditionGroup::Clear,
            801.. => ConditionGroup::Clouds,
            _ => ConditionGroup::Clear,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionGroup::Thunderstorm => "thunderstorm",
            ConditionGroup::Drizzle => "drizzle",
            ConditionGroup::Rain => "rain",
            ConditionGroup::Snow => "snow",
            ConditionGroup::Mist => "mist",
            ConditionGroup::Clear => "clear",
            ConditionGroup::Clouds => "clouds",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub location: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub condition: String,
    pub condition_group: ConditionGroup,
    pub humidity: u8,
    pub wind_speed: f64,
    /// When the mapping ran, local time, [`TIMESTAMP_FORMAT`].
    pub timestamp: String,
}

/// One three-hourly forecast reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub timestamp: DateTime<Utc>,
    /// Local wall-clock time of `timestamp`, `HH:MM`.
    pub time: String,
    pub temperature: f64,
    pub condition: String,
    pub humidity: u8,
    pub wind_speed: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    /// ISO local date, `YYYY-MM-DD`.
    pub date: String,
    pub day_name: String,
    pub min_temp: f64,
    pub max_temp: f64,
    /// Mean humidity over the day's entries, rounded to a whole percent.
    pub avg_humidity: u8,
    /// Mean wind speed over the day's entries, one decimal.
    pub avg_wind_speed: f64,
    pub dominant_condition: String,
    pub detailed_forecasts: Vec<ForecastEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub location: String,
    pub days: Vec<DailySummary>,
    /// When the aggregation ran, local time, [`TIMESTAMP_FORMAT`].
    pub generated_at: String,
}

/// A city returned by the provider's search endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityMatch {
    pub name: String,
    pub country: String,
    pub state: Option<String>,
    pub lat: f64,
    pub lon: f64,
}
