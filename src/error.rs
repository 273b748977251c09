//! Error types for mcp-demo-server.
//!
//! Only [`RegistryError`] (at startup) and [`ServerError::Transport`] ever
//! terminate the process. Every per-request error is converted into a
//! well-formed response payload by the dispatch core.

use std::io;
use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

use crate::capability::CapabilityKind;

/// Errors that can occur during configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("failed to read configuration file: {path}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// Configuration file could not be parsed.
    #[error("failed to parse configuration file: {path}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Configuration file not found.
    #[error("configuration file not found: {path}")]
    NotFound {
        /// Path where the configuration file was expected.
        path: PathBuf,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation failure.
        message: String,
    },
}

/// Errors raised while building the capability registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The same identifier was registered twice for one capability kind.
    #[error("duplicate {kind} identifier: {identifier}")]
    DuplicateIdentifier {
        /// Kind the duplicate was registered under.
        kind: CapabilityKind,
        /// The offending identifier.
        identifier: String,
    },

    /// A handler was registered under a kind it does not serve.
    #[error("{identifier} registered as {kind} but its handler serves {handler_kind}")]
    KindMismatch {
        /// Kind the registration asked for.
        kind: CapabilityKind,
        /// Identifier being registered.
        identifier: String,
        /// Kind the handler actually serves.
        handler_kind: CapabilityKind,
    },
}

/// Request-shape errors, raised before any handler runs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// No capability with this identifier exists for the requested kind.
    #[error("Unknown {kind}: {identifier}")]
    UnknownCapability {
        /// Requested kind.
        kind: CapabilityKind,
        /// Requested identifier.
        identifier: String,
    },
}

/// The first schema constraint violated by a set of call arguments.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("invalid argument '{field}': expected {constraint}, got {observed}")]
pub struct ValidationError {
    /// Dotted path of the offending field (`arguments` for the argument object).
    pub field: String,
    /// The constraint that was not met.
    pub constraint: String,
    /// Short rendering of the observed value.
    pub observed: String,
}

impl ValidationError {
    /// Creates a validation error, rendering `observed` compactly.
    #[must_use]
    pub fn new(field: impl Into<String>, constraint: impl Into<String>, observed: &Value) -> Self {
        Self {
            field: field.into(),
            constraint: constraint.into(),
            observed: render_observed(observed),
        }
    }

    /// Creates a validation error for an absent field.
    #[must_use]
    pub fn missing(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            constraint: "required field".to_string(),
            observed: "nothing".to_string(),
        }
    }
}

fn render_observed(value: &Value) -> String {
    const MAX: usize = 64;
    let text = value.to_string();
    if text.chars().count() > MAX {
        let truncated: String = text.chars().take(MAX).collect();
        format!("{truncated}...")
    } else {
        text
    }
}

/// A domain-level failure reported by a handler while it runs.
///
/// The message is returned verbatim to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    /// Creates a handler error with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the message carried by this error.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(format!("Invalid JSON: {e}"))
    }
}

/// Fatal server errors.
#[derive(Error, Debug)]
pub enum ServerError {
    /// The transport failed to attach or broke while serving.
    #[error("transport error: {0}")]
    Transport(#[from] io::Error),

    /// The static registration table is malformed.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn config_error_display() {
        let error = ConfigError::NotFound {
            path: PathBuf::from("/path/to/config.json"),
        };
        let msg = error.to_string();
        assert!(msg.contains("not found"));
        assert!(msg.contains("config.json"));
    }

    #[test]
    fn unknown_capability_display() {
        let error = ProtocolError::UnknownCapability {
            kind: CapabilityKind::Tool,
            identifier: "does_not_exist".to_string(),
        };
        assert_eq!(error.to_string(), "Unknown tool: does_not_exist");

        let error = ProtocolError::UnknownCapability {
            kind: CapabilityKind::Resource,
            identifier: "logs://missing".to_string(),
        };
        assert_eq!(error.to_string(), "Unknown resource: logs://missing");
    }

    #[test]
    fn duplicate_identifier_display() {
        let error = RegistryError::DuplicateIdentifier {
            kind: CapabilityKind::Prompt,
            identifier: "analyze_data".to_string(),
        };
        assert_eq!(error.to_string(), "duplicate prompt identifier: analyze_data");
    }

    #[test]
    fn validation_error_display() {
        let error = ValidationError::new("operation", "one of [\"add\"]", &json!("modulo"));
        assert_eq!(
            error.to_string(),
            "invalid argument 'operation': expected one of [\"add\"], got \"modulo\""
        );

        let error = ValidationError::missing("table");
        assert!(error.to_string().contains("required field"));
    }

    #[test]
    fn validation_error_truncates_large_values() {
        let big = json!("x".repeat(500));
        let error = ValidationError::new("expression", "string", &big);
        assert!(error.observed.ends_with("..."));
        assert!(error.observed.len() < 100);
    }

    #[test]
    fn handler_error_keeps_raw_message() {
        let error = HandlerError::new("Cannot divide by zero");
        assert_eq!(error.to_string(), "Cannot divide by zero");
        assert_eq!(error.message(), "Cannot divide by zero");

        let source: &dyn std::error::Error = &error;
        assert!(source.source().is_none());
    }
}
