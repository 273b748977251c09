//! Configuration structures for deserialisation.
//!
//! These structures map directly to the JSON configuration file format.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::ConfigError;

/// Log levels accepted in `logging.level`.
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Root configuration structure.
///
/// This is the top-level structure that matches the JSON config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Optional JSON schema reference (ignored during parsing).
    #[serde(rename = "$schema", default)]
    _schema: Option<String>,

    /// Optional comment field (ignored during parsing).
    #[serde(rename = "_comment", default)]
    _comment: Option<String>,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Backing files for resources.
    #[serde(default)]
    pub data: DataConfig,

    /// Mock external API settings.
    #[serde(default)]
    pub api: ApiConfig,
}

impl Config {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let level = self.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    LOG_LEVELS.join(", ")
                ),
            });
        }
        Ok(())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Paths of the JSON files backing the resources.
///
/// A missing or unreadable file is not an error: the resource falls back to
/// its built-in dataset.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataConfig {
    /// Data file for `logs://system`.
    #[serde(default = "default_logs_path")]
    pub logs_path: PathBuf,

    /// Data file for `profiles://users`.
    #[serde(default = "default_profiles_path")]
    pub profiles_path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            logs_path: default_logs_path(),
            profiles_path: default_profiles_path(),
        }
    }
}

fn default_logs_path() -> PathBuf {
    PathBuf::from("./data/logs.json")
}

fn default_profiles_path() -> PathBuf {
    PathBuf::from("./data/profiles.json")
}

/// Mock external API configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Artificial delay applied to each mock fetch, in milliseconds.
    #[serde(default)]
    pub simulated_latency_ms: u64,
}
