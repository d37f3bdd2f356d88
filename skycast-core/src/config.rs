use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use tracing::warn;

use crate::error::WeatherError;

/// Environment variable consulted for the API key.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// forecast_days = 5
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// OpenWeatherMap credential. Never logged.
    pub api_key: Option<String>,

    /// API root; every endpoint path is appended to it.
    pub base_url: String,

    /// Per-request timeout.
    pub timeout_secs: u64,

    /// Days shown by `forecast` when `--days` is not given.
    pub forecast_days: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
            forecast_days: 5,
        }
    }
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Like [`Config::load`], but a file that cannot be read or parsed is logged and
    /// replaced by defaults.
    pub fn load_or_default() -> Result<Self> {
        Ok(Self::load_from_or_default(&Self::config_file_path()?))
    }

    pub fn load_from_or_default(path: &Path) -> Self {
        Self::load_from(path).unwrap_or_else(|err| {
            warn!(error = %format!("{err:#}"), "ignoring config file, using defaults");
            Self::default()
        })
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "skycast", "skycast")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Apply credential overrides: an explicit flag beats the environment, which beats the file.
    pub fn with_api_key_overrides(mut self, flag: Option<String>, env: Option<String>) -> Self {
        let pick = |v: Option<String>| v.filter(|k| !k.trim().is_empty());

        if let Some(key) = pick(flag).or_else(|| pick(env)) {
            self.api_key = Some(key);
        }
        self
    }

    /// Set/replace the stored API key.
    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key.trim().to_string());
    }

    /// Returns the API key, or a configuration error with remediation steps.
    pub fn require_api_key(&self) -> Result<&str, WeatherError> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                WeatherError::Configuration(format!(
                    "OpenWeatherMap API key is required.\n\
                     To fix this:\n\
                     1. Create a .env file in the working directory\n\
                     2. Add your OpenWeatherMap API key: {API_KEY_ENV}=your_key_here\n\
                     3. Or pass it directly with `--api-key <KEY>`, or store it with `skycast configure`"
                ))
            })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
