//! Typed views over the provider's JSON and the current-weather mapping.

use chrono::NaiveDateTime;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    error::WeatherError,
    model::{ConditionGroup, CurrentWeather, TIMESTAMP_FORMAT},
};

#[derive(Debug, Deserialize)]
pub(crate) struct OwMain {
    pub temp: f64,
    #[serde(default)]
    pub feels_like: Option<f64>,
    pub humidity: u8,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OwWeather {
    #[serde(default)]
    pub id: Option<u32>,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OwWind {
    pub speed: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OwSys {
    pub country: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    sys: OwSys,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

/// Deserialize `raw` into `T`, reporting shape mismatches as `MalformedResponse`.
pub(crate) fn extract<T: DeserializeOwned>(raw: &Value, what: &str) -> Result<T, WeatherError> {
    T::deserialize(raw).map_err(|e| WeatherError::malformed(format!("{what}: {e}")))
}

/// Map a current-weather response into [`CurrentWeather`], stamped with `now`.
pub fn map_current(raw: &Value, now: NaiveDateTime) -> Result<CurrentWeather, WeatherError> {
    let parsed: OwCurrentResponse = extract(raw, "current weather")?;

    let weather = parsed
        .weather
        .first()
        .ok_or_else(|| WeatherError::malformed("current weather: empty `weather` list"))?;

    let feels_like = parsed
        .main
        .feels_like
        .ok_or_else(|| WeatherError::malformed("current weather: missing field `feels_like`"))?;

    Ok(CurrentWeather {
        location: format!("{}, {}", parsed.name, parsed.sys.country),
        temperature: round1(parsed.main.temp),
        feels_like: round1(feels_like),
        condition: title_case(&weather.description),
        condition_group: weather
            .id
            .map(ConditionGroup::from_id)
            .unwrap_or(ConditionGroup::Clear),
        humidity: parsed.main.humidity,
        wind_speed: parsed.wind.speed,
        timestamp: now.format(TIMESTAMP_FORMAT).to_string(),
    })
}

/// Round to one decimal place, halves away from zero.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Upper-case the first letter of every alphabetic run, lower-case the rest.
///
/// `"light rain"` becomes `"Light Rain"`, `"o'clock"` becomes `"O'Clock"`.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;

    for c in text.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }

    out
}
