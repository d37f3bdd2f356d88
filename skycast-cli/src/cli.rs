use std::io;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode};
use skycast_core::{
    Config, LocationQuery, WeatherError,
    config::API_KEY_ENV,
    provider_from_config,
    report::{current_weather_report, forecast_report, search_report},
};
use tracing::info;

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "skycast",
    version,
    about = "Current weather and multi-day forecasts from OpenWeatherMap"
)]
pub struct Cli {
    /// OpenWeatherMap API key. Overrides OPENWEATHER_API_KEY and the config file.
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Verbosity level (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store an OpenWeatherMap API key in the config file.
    Configure,

    /// Show current conditions for a location.
    Current {
        #[command(flatten)]
        location: LocationArgs,
    },

    /// Show a day-by-day forecast for a location.
    Forecast {
        #[command(flatten)]
        location: LocationArgs,

        /// Number of days; defaults to `forecast_days` from the config file.
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=16))]
        days: Option<u8>,
    },

    /// Show current conditions followed by the forecast.
    Show {
        #[command(flatten)]
        location: LocationArgs,

        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=16))]
        days: Option<u8>,
    },

    /// Look up cities matching a name.
    Search {
        query: String,
    },
}

#[derive(Debug, Args)]
pub struct LocationArgs {
    /// City name ("London" or "London,GB") or coordinates ("51.51,-0.13").
    pub location: String,

    /// ISO 3166 country code appended to the city name.
    #[arg(long)]
    pub country: Option<String>,
}

impl LocationArgs {
    pub fn query(&self) -> Result<LocationQuery, WeatherError> {
        LocationQuery::parse(&self.location, self.country.as_deref())
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let env_key = std::env::var(API_KEY_ENV).ok();
        let lenient =
            tolerates_broken_config(&self.command, self.api_key.as_deref(), env_key.as_deref());
        let file_config = if lenient {
            Config::load_or_default()?
        } else {
            Config::load()?
        };
        let config = file_config
            .clone()
            .with_api_key_overrides(self.api_key, env_key);
        let mut out = io::stdout();

        match self.command {
            Command::Configure => configure(file_config)?,
            Command::Current { location } => {
                let query = location.query()?;
                let provider = provider_from_config(&config)?;

                let report = current_weather_report(provider.as_ref(), &query).await?;
                render::current(&mut out, &report)?;
            }
            Command::Forecast { location, days } => {
                let query = location.query()?;
                let days = days.map_or(config.forecast_days, usize::from);
                let provider = provider_from_config(&config)?;

                let report = forecast_report(provider.as_ref(), &query, days).await?;
                render::forecast(&mut out, days, &report)?;
            }
            Command::Show { location, days } => {
                let query = location.query()?;
                let days = days.map_or(config.forecast_days, usize::from);
                let provider = provider_from_config(&config)?;

                render::banner(&mut out, &format!("SKYCAST - {}", query.to_string().to_uppercase()))?;
                let current = current_weather_report(provider.as_ref(), &query).await?;
                render::current(&mut out, &current)?;
                let forecast = forecast_report(provider.as_ref(), &query, days).await?;
                render::forecast(&mut out, days, &forecast)?;
            }
            Command::Search { query } => {
                let provider = provider_from_config(&config)?;

                let report = search_report(provider.as_ref(), &query).await?;
                render::cities(&mut out, &query, &report)?;
            }
        }

        Ok(())
    }
}

/// A broken config file only blocks commands that still need it for the API key.
/// `configure` rewrites the file, and a key from the flag or environment bypasses it.
fn tolerates_broken_config(
    command: &Command,
    flag_key: Option<&str>,
    env_key: Option<&str>,
) -> bool {
    let given = |k: Option<&str>| k.is_some_and(|k| !k.trim().is_empty());
    matches!(command, Command::Configure) || given(flag_key) || given(env_key)
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let api_key = Password::new("OpenWeatherMap API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message("Create one at https://home.openweathermap.org/api_keys")
        .prompt()
        .context("Failed to read API key")?;

    if api_key.trim().is_empty() {
        bail!("API key must not be empty");
    }

    config.set_api_key(api_key);
    let path = config.save()?;
    info!(path = %path.display(), "saved configuration");

    println!("API key saved to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn forecast_with_country_and_days() {
        let cli = parse(&["skycast", "forecast", "London", "--country", "gb", "--days", "3"]);
        match cli.command {
            Command::Forecast { location, days } => {
                assert_eq!(days, Some(3));
                assert_eq!(
                    location.query().unwrap(),
                    LocationQuery::city("London", Some("GB".into()))
                );
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = parse(&["skycast", "current", "51.51,-0.13", "--api-key", "K", "-vv"]);
        assert_eq!(cli.api_key.as_deref(), Some("K"));
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Current { location } => {
                assert_eq!(
                    location.query().unwrap(),
                    LocationQuery::Coordinates {
                        lat: 51.51,
                        lon: -0.13
                    }
                );
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn days_out_of_range_is_rejected() {
        assert!(Cli::try_parse_from(["skycast", "forecast", "Paris", "--days", "0"]).is_err());
        assert!(Cli::try_parse_from(["skycast", "show", "Paris", "--days", "17"]).is_err());
    }

    #[test]
    fn search_and_configure_parse() {
        assert!(matches!(
            parse(&["skycast", "search", "Spring"]).command,
            Command::Search { query } if query == "Spring"
        ));
        assert!(matches!(parse(&["skycast", "configure"]).command, Command::Configure));
    }

    #[test]
    fn broken_config_is_tolerated_for_configure_and_key_overrides() {
        let current = parse(&["skycast", "current", "Paris"]).command;
        assert!(!tolerates_broken_config(&current, None, None));
        assert!(!tolerates_broken_config(&current, Some("  "), None));
        assert!(tolerates_broken_config(&current, Some("K"), None));
        assert!(tolerates_broken_config(&current, None, Some("ENV_KEY")));

        let configure = parse(&["skycast", "configure"]).command;
        assert!(tolerates_broken_config(&configure, None, None));
    }

    #[test]
    fn location_is_required() {
        assert!(Cli::try_parse_from(["skycast", "current"]).is_err());
    }
}
