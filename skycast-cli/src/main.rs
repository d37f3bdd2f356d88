//! Binary crate for the `skycast` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Resolving the API key from flag, environment and config file
//! - Human-friendly output formatting

use std::process::ExitCode;

use clap::Parser;
use skycast_core::WeatherError;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod render;

const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn init_tracing(verbose: u8) {
    // RUST_LOG only applies when no -v flag was given
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(log_filter_from_verbosity(0))),
        v => EnvFilter::new(log_filter_from_verbosity(v)),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn report_failure(err: &anyhow::Error) {
    match err.downcast_ref::<WeatherError>() {
        Some(WeatherError::Configuration(msg)) => eprintln!("❌ Configuration Error: {msg}"),
        Some(e @ WeatherError::InvalidLocation(_)) => eprintln!("❌ {e}"),
        _ => eprintln!("❌ Unexpected error: {err:#}"),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // a missing .env file is fine
    dotenvy::dotenv().ok();

    let cmd = cli::Cli::parse();
    init_tracing(cmd.verbose);

    match cmd.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_failure(&err);
            ExitCode::FAILURE
        }
    }
}
