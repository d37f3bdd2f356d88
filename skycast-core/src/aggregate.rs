//! Groups three-hourly forecast items into per-day summaries.
//!
//! Days appear in the order their date was first seen in the input and are never
//! re-sorted. Within a day, entries keep input order.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::WeatherError,
    mapper::{OwMain, OwWeather, OwWind, extract, round1, title_case},
    model::{DailySummary, ForecastEntry, ForecastResult, TIMESTAMP_FORMAT},
};

#[derive(Debug, Deserialize)]
struct OwForecastItem {
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug)]
struct DailyBucket {
    date: NaiveDate,
    entries: Vec<ForecastEntry>,
}

impl DailyBucket {
    fn summarize(self) -> DailySummary {
        // buckets are only created together with their first entry
        let mut min_temp = f64::INFINITY;
        let mut max_temp = f64::NEG_INFINITY;
        let mut humidity_sum = 0u32;
        let mut wind_sum = 0.0;
        for entry in &self.entries {
            min_temp = min_temp.min(entry.temperature);
            max_temp = max_temp.max(entry.temperature);
            humidity_sum += u32::from(entry.humidity);
            wind_sum += entry.wind_speed;
        }
        let n = self.entries.len() as f64;

        DailySummary {
            date: self.date.format("%Y-%m-%d").to_string(),
            day_name: self.date.format("%A").to_string(),
            min_temp,
            max_temp,
            avg_humidity: (f64::from(humidity_sum) / n).round() as u8,
            avg_wind_speed: round1(wind_sum / n),
            dominant_condition: dominant_condition(&self.entries),
            detailed_forecasts: self.entries,
        }
    }
}

/// Aggregate raw forecast items into at most `max_days` daily summaries.
///
/// Calendar dates are taken in `tz`; `now` is the wall-clock stamp for `generated_at`.
/// One malformed item fails the whole call.
pub fn aggregate<Tz: TimeZone>(
    items: &[Value],
    location: &str,
    max_days: usize,
    tz: &Tz,
    now: NaiveDateTime,
) -> Result<ForecastResult, WeatherError> {
    let buckets = bucket_by_date(items, tz)?;

    let days = buckets
        .into_iter()
        .take(max_days)
        .map(DailyBucket::summarize)
        .collect();

    Ok(ForecastResult {
        location: location.to_string(),
        days,
        generated_at: now.format(TIMESTAMP_FORMAT).to_string(),
    })
}

fn bucket_by_date<Tz: TimeZone>(items: &[Value], tz: &Tz) -> Result<Vec<DailyBucket>, WeatherError> {
    let mut buckets: Vec<DailyBucket> = Vec::new();
    let mut index_by_date: HashMap<NaiveDate, usize> = HashMap::new();

    for (i, raw) in items.iter().enumerate() {
        let entry = parse_entry(raw, i, tz)?;
        let date = entry.timestamp.with_timezone(tz).date_naive();

        let idx = *index_by_date.entry(date).or_insert_with(|| {
            buckets.push(DailyBucket {
                date,
                entries: Vec::new(),
            });
            buckets.len() - 1
        });
        buckets[idx].entries.push(entry);
    }

    Ok(buckets)
}

fn parse_entry<Tz: TimeZone>(raw: &Value, index: usize, tz: &Tz) -> Result<ForecastEntry, WeatherError> {
    let what = format!("forecast item {index}");
    let item: OwForecastItem = extract(raw, &what)?;

    let timestamp = DateTime::<Utc>::from_timestamp(item.dt, 0)
        .ok_or_else(|| WeatherError::malformed(format!("{what}: timestamp {} out of range", item.dt)))?;

    let weather = item
        .weather
        .first()
        .ok_or_else(|| WeatherError::malformed(format!("{what}: empty `weather` list")))?;

    Ok(ForecastEntry {
        timestamp,
        time: timestamp.with_timezone(tz).naive_local().format("%H:%M").to_string(),
        temperature: round1(item.main.temp),
        condition: title_case(&weather.description),
        humidity: item.main.humidity,
        wind_speed: item.wind.speed,
    })
}

/// Most frequent condition. On a tie the label that reached the top count first wins.
fn dominant_condition(entries: &[ForecastEntry]) -> String {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut best: Option<(&str, usize)> = None;

    for entry in entries {
        let count = counts.entry(entry.condition.as_str()).or_default();
        *count += 1;

        match best {
            Some((_, best_count)) if *count <= best_count => {}
            _ => best = Some((entry.condition.as_str(), *count)),
        }
    }

    best.map(|(label, _)| label.to_string()).unwrap_or_default()
}
