//! Configuration management for khoj.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "khoj";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "khoj.db";

/// Prefix for environment overrides. Nested keys are separated by `__`,
/// as in `KHOJ_ANALYTICS__TOP_N=3`.
const ENV_PREFIX: &str = "KHOJ_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `KHOJ_`)
/// 2. TOML config file at `~/.config/khoj/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Input validation configuration.
    pub validation: ValidationConfig,
    /// Analytics configuration.
    pub analytics: AnalyticsConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/khoj/khoj.db`
    pub database_path: Option<PathBuf>,
}

/// Input validation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Pattern contact numbers must match. Empty disables the check.
    pub phone_pattern: String,
}

/// Analytics configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Number of days to forecast, starting today.
    pub forecast_days: u32,
    /// Days of history averaged for the forecast.
    pub rolling_window_days: u32,
    /// Length of the "most common" rankings.
    pub top_n: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            phone_pattern: r"^\+?[0-9]{7,15}$".to_string(),
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            forecast_days: 7,
            rolling_window_days: 7,
            top_n: 5,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        self.phone_regex()?;

        for (name, value) in [
            ("forecast_days", self.analytics.forecast_days),
            ("rolling_window_days", self.analytics.rolling_window_days),
        ] {
            if value == 0 {
                return Err(Error::ConfigValidation {
                    message: format!("{name} must be greater than 0"),
                });
            }
        }

        if self.analytics.top_n == 0 {
            return Err(Error::ConfigValidation {
                message: "top_n must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Compile the configured phone pattern, or `None` when it is disabled.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is not a valid regex.
    pub fn phone_regex(&self) -> Result<Option<Regex>> {
        let pattern = self.validation.phone_pattern.trim();
        if pattern.is_empty() {
            return Ok(None);
        }
        Regex::new(pattern)
            .map(Some)
            .map_err(|e| Error::ConfigValidation {
                message: format!("invalid phone_pattern regex '{pattern}': {e}"),
            })
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }
}
