//! Human-readable rendering of weather reports.

use std::io::{self, Write};

use skycast_core::{CityMatch, ConditionGroup, CurrentWeather, ErrorReport, ForecastResult, Report};

/// Days with this many entries or fewer are partial and get their hourly lines shown.
const HOURLY_DETAIL_MAX_ENTRIES: usize = 4;

pub fn banner(out: &mut impl Write, title: &str) -> io::Result<()> {
    let rule = "=".repeat(60);
    writeln!(out, "{rule}")?;
    writeln!(out, "🌍 {title}")?;
    writeln!(out, "{rule}")
}

pub fn error(out: &mut impl Write, report: &ErrorReport) -> io::Result<()> {
    writeln!(out, "❌ {report}")
}

pub fn current(out: &mut impl Write, report: &Report<CurrentWeather>) -> io::Result<()> {
    let weather = match report {
        Ok(weather) => weather,
        Err(report) => return error(out, report),
    };

    writeln!(out)?;
    writeln!(
        out,
        "{}  Current Weather for {}",
        icon(weather.condition_group),
        weather.location
    )?;
    writeln!(out, "📅 {}", weather.timestamp)?;
    writeln!(
        out,
        "🌡️  Temperature: {:.1}°C (feels like {:.1}°C)",
        weather.temperature, weather.feels_like
    )?;
    writeln!(out, "☁️  Condition: {}", weather.condition)?;
    writeln!(out, "💧 Humidity: {}%", weather.humidity)?;
    writeln!(out, "💨 Wind Speed: {} m/s", weather.wind_speed)
}

pub fn forecast(
    out: &mut impl Write,
    requested_days: usize,
    report: &Report<ForecastResult>,
) -> io::Result<()> {
    let forecast = match report {
        Ok(forecast) => forecast,
        Err(report) => return error(out, report),
    };

    writeln!(out)?;
    writeln!(out, "📅 {requested_days}-Day Forecast for {}", forecast.location)?;
    writeln!(out, "🕐 Generated: {}", forecast.generated_at)?;
    writeln!(out, "{}", "-".repeat(60))?;

    if forecast.days.is_empty() {
        writeln!(out, "\nNo forecast data available.")?;
    }

    for day in &forecast.days {
        writeln!(out)?;
        writeln!(out, "📆 {}, {}", day.day_name, day.date)?;
        writeln!(out, "🌡️  {:.1}°C - {:.1}°C", day.min_temp, day.max_temp)?;
        writeln!(out, "☁️  {}", day.dominant_condition)?;
        writeln!(
            out,
            "💧 {}%  💨 {:.1} m/s",
            day.avg_humidity, day.avg_wind_speed
        )?;

        if day.detailed_forecasts.len() <= HOURLY_DETAIL_MAX_ENTRIES {
            writeln!(out, "   Hourly:")?;
            for entry in &day.detailed_forecasts {
                writeln!(
                    out,
                    "   {}: {:.1}°C, {}",
                    entry.time, entry.temperature, entry.condition
                )?;
            }
        }
    }

    Ok(())
}

pub fn cities(out: &mut impl Write, query: &str, report: &Report<Vec<CityMatch>>) -> io::Result<()> {
    let cities = match report {
        Ok(cities) => cities,
        Err(report) => return error(out, report),
    };

    if cities.is_empty() {
        return writeln!(out, "No cities found for \"{query}\".");
    }

    for (i, city) in cities.iter().enumerate() {
        match &city.state {
            Some(state) => write!(out, "{}. {}, {}, {}", i + 1, city.name, state, city.country)?,
            None => write!(out, "{}. {}, {}", i + 1, city.name, city.country)?,
        }
        writeln!(out, " ({:.4}, {:.4})", city.lat, city.lon)?;
    }

    Ok(())
}

fn icon(group: ConditionGroup) -> &'static str {
    match group {
        ConditionGroup::Clear => "☀️",
        ConditionGroup::Clouds => "☁️",
        ConditionGroup::Rain | ConditionGroup::Drizzle => "🌧️",
        ConditionGroup::Snow => "❄️",
        ConditionGroup::Thunderstorm => "⛈️",
        ConditionGroup::Mist => "🌫️",
    }
}
