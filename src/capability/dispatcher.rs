//! Request dispatcher.
//!
//! Resolves a [`CapabilityRequest`] against the [`Registry`], validates its
//! arguments, and runs the handler inside the error boundary. Each request
//! is handled exactly once; there are no retries.

use serde_json::{Map, Value};

use super::boundary::{self, Outcome};
use super::schema;
use super::{CapabilityDescriptor, CapabilityKind, CapabilityRequest, Registry};
use crate::error::ValidationError;

/// Dispatches capability requests against a fixed registry.
#[derive(Debug)]
pub struct Dispatcher {
    registry: Registry,
}

impl Dispatcher {
    /// Creates a dispatcher over a built registry.
    #[must_use]
    pub const fn new(registry: Registry) -> Self {
        Self { registry }
    }

    /// The registry requests are resolved against.
    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Handles one request.
    ///
    /// An unknown identifier yields [`Outcome::ProtocolFailed`] before any
    /// validation. Arguments that violate the descriptor's schema yield
    /// [`Outcome::HandlerFailed`] and the handler is not invoked.
    pub async fn dispatch(&self, request: CapabilityRequest) -> Outcome {
        let CapabilityRequest {
            kind,
            identifier,
            arguments,
        } = request;

        let entry = match self.registry.lookup(kind, &identifier) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(kind = %kind, identifier = %identifier, "Unknown capability requested");
                return Outcome::ProtocolFailed(e);
            }
        };

        tracing::debug!(kind = %kind, identifier = %identifier, "Dispatching request");

        let arguments = match prepare_arguments(kind, entry.descriptor(), arguments) {
            Ok(arguments) => arguments,
            Err(e) => {
                tracing::warn!(
                    kind = %kind,
                    identifier = %identifier,
                    field = %e.field,
                    error = %e,
                    "Rejected invalid arguments"
                );
                return Outcome::HandlerFailed {
                    message: e.to_string(),
                };
            }
        };

        boundary::guard(kind, &identifier, entry.handler().clone(), arguments).await
    }
}

/// Produces the arguments a handler will see.
///
/// Resources take none. For tools and prompts, absent arguments are treated
/// as an empty object so required fields are still enforced.
fn prepare_arguments(
    kind: CapabilityKind,
    descriptor: &CapabilityDescriptor,
    arguments: Option<Value>,
) -> Result<Value, ValidationError> {
    if !kind.takes_arguments() {
        return Ok(Value::Null);
    }

    let arguments = arguments.unwrap_or_else(|| Value::Object(Map::new()));
    match descriptor.schema() {
        Some(schema) => schema::validate(schema, &arguments),
        None => Ok(arguments),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{
        CapabilityResult, Handler, RegistryBuilder, ResourceHandler, ToolHandler,
    };
    use crate::error::HandlerError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Counts invocations and echoes its arguments.
    struct Counting {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ToolHandler for Counting {
        fn descriptor(&self) -> CapabilityDescriptor {
            CapabilityDescriptor::new("count", "Counts calls").with_schema(json!({
                "type": "object",
                "properties": {
                    "mode": {"type": "string", "enum": ["fast", "slow"]},
                    "limit": {"type": "number", "default": 10}
                },
                "required": ["mode"]
            }))
        }

        async fn invoke(&self, arguments: Value) -> Result<CapabilityResult, HandlerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(CapabilityResult::success(arguments, "counted"))
        }
    }

    struct Static;

    #[async_trait]
    impl ResourceHandler for Static {
        fn descriptor(&self) -> CapabilityDescriptor {
            CapabilityDescriptor::new("static://data", "Static data")
        }

        async fn read(&self) -> Result<Value, HandlerError> {
            Ok(json!({"items": [1, 2, 3]}))
        }
    }

    fn dispatcher(calls: &Arc<AtomicUsize>) -> Dispatcher {
        let mut builder = RegistryBuilder::new();
        builder
            .add(Handler::tool(Counting {
                calls: Arc::clone(calls),
            }))
            .unwrap();
        builder.add(Handler::resource(Static)).unwrap();
        Dispatcher::new(builder.build())
    }

    #[tokio::test]
    async fn valid_call_runs_handler_once_with_defaults() {
        let calls = Arc::new(AtomicUsize::new(0));
        let dispatcher = dispatcher(&calls);

        let outcome = dispatcher
            .dispatch(CapabilityRequest::tool("count", Some(json!({"mode": "fast"}))))
            .await;

        let Outcome::Ok(payload) = outcome else {
            panic!("expected Ok, got {outcome:?}");
        };
        assert_eq!(payload["data"], json!({"mode": "fast", "limit": 10}));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_identifier_is_protocol_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let dispatcher = dispatcher(&calls);

        let outcome = dispatcher
            .dispatch(CapabilityRequest::tool("does_not_exist", Some(json!({}))))
            .await;

        let Outcome::ProtocolFailed(e) = outcome else {
            panic!("expected ProtocolFailed, got {outcome:?}");
        };
        assert_eq!(e.to_string(), "Unknown tool: does_not_exist");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn kinds_do_not_share_identifiers() {
        let calls = Arc::new(AtomicUsize::new(0));
        let dispatcher = dispatcher(&calls);

        let outcome = dispatcher.dispatch(CapabilityRequest::resource("count")).await;
        assert!(outcome.is_protocol_failure());
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let dispatcher = dispatcher(&calls);

        let missing = dispatcher
            .dispatch(CapabilityRequest::tool("count", Some(json!({}))))
            .await;
        let bad_enum = dispatcher
            .dispatch(CapabilityRequest::tool("count", Some(json!({"mode": "warp"}))))
            .await;
        let absent = dispatcher.dispatch(CapabilityRequest::tool("count", None)).await;

        for outcome in [&missing, &bad_enum, &absent] {
            assert!(outcome.is_handler_failure(), "got {outcome:?}");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn resources_ignore_arguments() {
        let calls = Arc::new(AtomicUsize::new(0));
        let dispatcher = dispatcher(&calls);

        let mut request = CapabilityRequest::resource("static://data");
        request.arguments = Some(json!({"unexpected": true}));

        let outcome = dispatcher.dispatch(request).await;
        assert_eq!(outcome, Outcome::Ok(json!({"items": [1, 2, 3]})));
    }
}
