//! Configuration file loading and parsing.
//!
//! This module handles loading the configuration file from disk and parsing
//! it into validated, type-safe structures. The resulting [`Config`] is
//! passed explicitly to the server; nothing reads process state later.
//!
//! # Configuration Sources
//!
//! 1. Path given on the command line (or `MCP_DEMO_CONFIG`); it must exist
//! 2. Default location, used only if present:
//!    - **Linux/macOS:** `~/.mcp-demo-server/config.json`
//!    - **Windows:** `%USERPROFILE%\.mcp-demo-server\config.json`
//! 3. Built-in defaults
//!
//! Environment overrides (`LOG_LEVEL`, `LOGS_PATH`, `PROFILES_PATH`) are
//! applied on top by [`Overrides`].

mod settings;

pub use settings::{ApiConfig, Config, DataConfig, LoggingConfig, LOG_LEVELS};

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Returns the default configuration directory.
///
/// - **Linux/macOS:** `~/.mcp-demo-server/`
/// - **Windows:** `%USERPROFILE%\.mcp-demo-server\`
#[must_use]
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|p| p.join(".mcp-demo-server"))
}

/// Returns the platform-specific default configuration file path.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    default_config_dir().map(|p| p.join("config.json"))
}

/// Loads and parses a configuration file.
///
/// # Errors
///
/// Returns an error if:
/// - The configuration file cannot be found
/// - The file cannot be read
/// - The JSON is malformed
/// - A field holds an invalid value
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config: Config = serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    config.validate()?;

    Ok(config)
}

/// Resolves the configuration from an optional explicit path.
///
/// With no explicit path, the default location is used if a file exists
/// there; otherwise built-in defaults apply.
///
/// # Errors
///
/// Returns an error if an explicit path is missing, or if any file that is
/// used cannot be read, parsed or validated.
pub fn resolve_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    if let Some(path) = path {
        return load_config(path);
    }

    match default_config_path() {
        Some(default_path) if default_path.exists() => load_config(&default_path),
        _ => Ok(Config::default()),
    }
}

/// Values taken from the environment or command line that replace file
/// settings.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub log_level: Option<String>,
    pub logs_path: Option<PathBuf>,
    pub profiles_path: Option<PathBuf>,
}

impl Overrides {
    /// Applies the overrides and re-validates.
    ///
    /// # Errors
    ///
    /// Returns an error if an overridden value is invalid.
    pub fn apply(self, mut config: Config) -> Result<Config, ConfigError> {
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
        if let Some(path) = self.logs_path {
            config.data.logs_path = path;
        }
        if let Some(path) = self.profiles_path {
            config.data.profiles_path = path;
        }
        config.validate()?;
        Ok(config)
    }
}
