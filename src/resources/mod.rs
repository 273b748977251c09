//! Resource handlers.
//!
//! Each resource reads a JSON data file and falls back to a built-in dataset
//! when the file is missing or malformed. The fallback is built once per
//! handler, so repeated reads in one process return identical data.

pub mod logs;
pub mod profiles;

pub use logs::LogsResource;
pub use profiles::ProfilesResource;

use std::path::Path;
use std::sync::OnceLock;

use serde_json::Value;

use crate::capability::{Handler, RegistryBuilder};
use crate::config::Config;
use crate::error::RegistryError;

/// MIME type of every resource served here.
pub const JSON_MIME_TYPE: &str = "application/json";

/// Registers every resource, in listing order.
///
/// # Errors
///
/// Returns an error if a resource URI is already registered.
pub fn register(builder: &mut RegistryBuilder, config: &Config) -> Result<(), RegistryError> {
    builder
        .add(Handler::resource(LogsResource::new(&config.data.logs_path)))?
        .add(Handler::resource(ProfilesResource::new(
            &config.data.profiles_path,
        )))?;
    Ok(())
}

/// A JSON data file with a lazily built fallback.
#[derive(Debug)]
struct FileBacked {
    uri: &'static str,
    path: std::path::PathBuf,
    fallback: OnceLock<Value>,
    build_fallback: fn() -> Value,
}

impl FileBacked {
    fn new(uri: &'static str, path: &Path, build_fallback: fn() -> Value) -> Self {
        Self {
            uri,
            path: path.to_path_buf(),
            fallback: OnceLock::new(),
            build_fallback,
        }
    }

    /// Reads the data file, or returns the fallback dataset.
    async fn load(&self) -> Value {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(value) => return value,
                Err(e) => tracing::warn!(
                    uri = self.uri,
                    path = %self.path.display(),
                    error = %e,
                    "Malformed data file, using built-in data"
                ),
            },
            Err(e) => tracing::warn!(
                uri = self.uri,
                path = %self.path.display(),
                error = %e,
                "Data file unavailable, using built-in data"
            ),
        }

        self.fallback.get_or_init(self.build_fallback).clone()
    }
}
