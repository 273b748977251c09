//! Error boundary around handler invocation.
//!
//! Every dispatch ends in exactly one [`Outcome`]:
//!
//! - [`Outcome::Ok`]: the handler returned normally.
//! - [`Outcome::HandlerFailed`]: the call completed but the operation was
//!   declined. This covers schema violations, errors the handler reports
//!   itself, and handler panics. Callers should retry with different
//!   arguments.
//! - [`Outcome::ProtocolFailed`]: the request named a capability that does not
//!   exist. No handler ran. Callers should retry with a different identifier.

use std::any::Any;

use serde_json::{json, Value};

use super::{CapabilityKind, Handler};
use crate::error::{HandlerError, ProtocolError};

/// Classified result of a single dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The handler produced a payload.
    Ok(Value),
    /// The handler (or argument validation) declined the request.
    HandlerFailed {
        /// Raw cause text, returned to the caller verbatim.
        message: String,
    },
    /// The request itself was invalid.
    ProtocolFailed(ProtocolError),
}

impl Outcome {
    /// Returns `true` for [`Outcome::Ok`].
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    /// Returns `true` for [`Outcome::HandlerFailed`].
    #[must_use]
    pub const fn is_handler_failure(&self) -> bool {
        matches!(self, Self::HandlerFailed { .. })
    }

    /// Returns `true` for [`Outcome::ProtocolFailed`].
    #[must_use]
    pub const fn is_protocol_failure(&self) -> bool {
        matches!(self, Self::ProtocolFailed(_))
    }
}

/// Builds the body reported for a failed call:
/// `{"success": false, "error": <message>, "<kind>": <identifier>}`.
#[must_use]
pub fn error_payload(kind: CapabilityKind, identifier: &str, message: &str) -> Value {
    let mut payload = json!({
        "success": false,
        "error": message,
    });
    payload[kind.as_str()] = Value::String(identifier.to_string());
    payload
}

/// Maps a handler's return value onto an [`Outcome`], logging failures.
#[must_use]
pub fn classify(
    kind: CapabilityKind,
    identifier: &str,
    result: Result<Value, HandlerError>,
) -> Outcome {
    match result {
        Ok(payload) => Outcome::Ok(payload),
        Err(e) => {
            tracing::warn!(
                kind = %kind,
                identifier,
                error = %e,
                "Capability {} failed",
                kind.verb()
            );
            Outcome::HandlerFailed {
                message: e.message().to_string(),
            }
        }
    }
}

/// Runs `handler` on `arguments` in its own task and classifies the result.
///
/// A panic inside the handler is contained to that task and reported as
/// [`Outcome::HandlerFailed`]; it never reaches the serving loop.
pub async fn guard(
    kind: CapabilityKind,
    identifier: &str,
    handler: Handler,
    arguments: Value,
) -> Outcome {
    let task = tokio::spawn(async move { handler.run(arguments).await });

    match task.await {
        Ok(result) => classify(kind, identifier, result),
        Err(e) if e.is_panic() => {
            let cause = panic_message(e.into_panic().as_ref());
            tracing::error!(
                kind = %kind,
                identifier,
                panic = %cause,
                "Handler panicked"
            );
            Outcome::HandlerFailed {
                message: format!("Handler panicked: {cause}"),
            }
        }
        Err(e) => {
            tracing::error!(kind = %kind, identifier, error = %e, "Handler task aborted");
            Outcome::HandlerFailed {
                message: "Handler was cancelled".to_string(),
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown cause".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{CapabilityDescriptor, CapabilityResult, ToolHandler};
    use async_trait::async_trait;

    struct Panics;

    #[async_trait]
    impl ToolHandler for Panics {
        fn descriptor(&self) -> CapabilityDescriptor {
            CapabilityDescriptor::new("panics", "always panics")
        }

        async fn invoke(&self, _arguments: Value) -> Result<CapabilityResult, HandlerError> {
            panic!("boom");
        }
    }

    struct Declines;

    #[async_trait]
    impl ToolHandler for Declines {
        fn descriptor(&self) -> CapabilityDescriptor {
            CapabilityDescriptor::new("declines", "always fails")
        }

        async fn invoke(&self, _arguments: Value) -> Result<CapabilityResult, HandlerError> {
            Err(HandlerError::new("Cannot divide by zero"))
        }
    }

    #[test]
    fn error_payload_names_the_kind() {
        assert_eq!(
            error_payload(CapabilityKind::Tool, "calculate_math", "bad"),
            json!({"success": false, "error": "bad", "tool": "calculate_math"})
        );
        assert_eq!(
            error_payload(CapabilityKind::Resource, "logs://system", "bad")["resource"],
            json!("logs://system")
        );
        assert_eq!(
            error_payload(CapabilityKind::Prompt, "analyze_data", "bad")["prompt"],
            json!("analyze_data")
        );
    }

    #[test]
    fn classify_success_and_failure() {
        let ok = classify(CapabilityKind::Tool, "t", Ok(json!(1)));
        assert_eq!(ok, Outcome::Ok(json!(1)));

        let failed = classify(CapabilityKind::Tool, "t", Err(HandlerError::new("nope")));
        assert_eq!(
            failed,
            Outcome::HandlerFailed {
                message: "nope".to_string()
            }
        );
        assert!(failed.is_handler_failure());
        assert!(!failed.is_protocol_failure());
    }

    #[tokio::test]
    async fn guard_converts_handler_error() {
        let outcome = guard(
            CapabilityKind::Tool,
            "declines",
            Handler::tool(Declines),
            json!({}),
        )
        .await;
        assert_eq!(
            outcome,
            Outcome::HandlerFailed {
                message: "Cannot divide by zero".to_string()
            }
        );
    }

    #[tokio::test]
    async fn guard_contains_panics() {
        let outcome = guard(CapabilityKind::Tool, "panics", Handler::tool(Panics), json!({})).await;
        let Outcome::HandlerFailed { message } = outcome else {
            panic!("expected HandlerFailed, got {outcome:?}");
        };
        assert!(message.contains("boom"));
    }
}
