//! Capability dispatch core.
//!
//! A *capability* is a named unit of server functionality: a tool that can be
//! invoked, a resource that can be read, or a prompt that can be generated.
//! Each one is described by an immutable [`CapabilityDescriptor`] and bound to
//! a [`Handler`].
//!
//! ```text
//! request ──▶ Dispatcher ──▶ Registry lookup ──▶ Schema validation
//!                                                       │
//!                          Outcome ◀── Error Boundary ◀─┘ (handler runs here)
//! ```
//!
//! The [`Registry`] is assembled once at startup through a
//! [`RegistryBuilder`] and is read-only afterwards, so lookups need no
//! locking.

pub mod boundary;
pub mod dispatcher;
pub mod registry;
pub mod schema;

pub use boundary::Outcome;
pub use dispatcher::Dispatcher;
pub use registry::{Registry, RegistryBuilder, RegistryEntry};

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::HandlerError;

/// The three kinds of capability a server can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityKind {
    /// Callable action (`tools/call`).
    Tool,
    /// Readable data source (`resources/read`).
    Resource,
    /// Generatable prompt template (`prompts/get`).
    Prompt,
}

impl CapabilityKind {
    /// All kinds, in listing order.
    pub const ALL: [Self; 3] = [Self::Tool, Self::Resource, Self::Prompt];

    /// Lowercase name used in messages and error payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tool => "tool",
            Self::Resource => "resource",
            Self::Prompt => "prompt",
        }
    }

    /// The verb a caller uses on this kind.
    #[must_use]
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Tool => "invoke",
            Self::Resource => "read",
            Self::Prompt => "generate",
        }
    }

    /// Whether requests of this kind carry call arguments.
    #[must_use]
    pub const fn takes_arguments(self) -> bool {
        !matches!(self, Self::Resource)
    }
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static metadata describing one capability.
///
/// Descriptors are immutable once registered.
#[derive(Debug, Clone, PartialEq)]
pub struct CapabilityDescriptor {
    identifier: String,
    description: String,
    title: Option<String>,
    mime_type: Option<String>,
    schema: Option<Value>,
}

impl CapabilityDescriptor {
    /// Creates a descriptor with an identifier (name or URI) and description.
    #[must_use]
    pub fn new(identifier: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            description: description.into(),
            title: None,
            mime_type: None,
            schema: None,
        }
    }

    /// Attaches an input schema (JSON Schema subset, see [`schema`]).
    #[must_use]
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Attaches a human-readable display name.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Attaches the MIME type of the data a resource returns.
    #[must_use]
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Name or URI, unique within the capability's kind.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Display name, falling back to the identifier.
    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.identifier)
    }

    #[must_use]
    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    #[must_use]
    pub const fn schema(&self) -> Option<&Value> {
        self.schema.as_ref()
    }
}

/// The normal result of a tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityResult {
    /// Whether the requested operation succeeded.
    pub success: bool,
    /// Structured result data.
    #[serde(rename = "data")]
    pub payload: Value,
    /// Optional human-readable summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CapabilityResult {
    /// Creates a successful result carrying `payload`.
    #[must_use]
    pub fn success(payload: Value, message: impl Into<String>) -> Self {
        Self {
            success: true,
            payload,
            message: Some(message.into()),
        }
    }
}

/// An inbound request for a single capability.
#[derive(Debug, Clone, PartialEq)]
pub struct CapabilityRequest {
    pub kind: CapabilityKind,
    pub identifier: String,
    pub arguments: Option<Value>,
}

impl CapabilityRequest {
    /// A tool invocation.
    #[must_use]
    pub fn tool(name: impl Into<String>, arguments: Option<Value>) -> Self {
        Self {
            kind: CapabilityKind::Tool,
            identifier: name.into(),
            arguments,
        }
    }

    /// A resource read. Resources take no arguments.
    #[must_use]
    pub fn resource(uri: impl Into<String>) -> Self {
        Self {
            kind: CapabilityKind::Resource,
            identifier: uri.into(),
            arguments: None,
        }
    }

    /// A prompt generation.
    #[must_use]
    pub fn prompt(name: impl Into<String>, arguments: Option<Value>) -> Self {
        Self {
            kind: CapabilityKind::Prompt,
            identifier: name.into(),
            arguments,
        }
    }
}

/// Speaker of a prompt message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Content of a prompt message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PromptContent {
    /// Plain text.
    Text {
        /// The text content.
        text: String,
    },
}

/// One message of a generated prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: Role,
    pub content: PromptContent,
}

impl PromptMessage {
    /// A user message with text content.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: PromptContent::Text { text: text.into() },
        }
    }

    /// An assistant message with text content.
    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: PromptContent::Text { text: text.into() },
        }
    }
}

/// Behaviour bound to a tool descriptor.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Describes the tool, including its input schema.
    fn descriptor(&self) -> CapabilityDescriptor;

    /// Runs the tool on arguments that already passed schema validation.
    async fn invoke(&self, arguments: Value) -> Result<CapabilityResult, HandlerError>;
}

/// Behaviour bound to a resource descriptor.
#[async_trait]
pub trait ResourceHandler: Send + Sync {
    /// Describes the resource. The identifier is its URI.
    fn descriptor(&self) -> CapabilityDescriptor;

    /// Produces the resource's current data.
    async fn read(&self) -> Result<Value, HandlerError>;
}

/// Behaviour bound to a prompt descriptor.
#[async_trait]
pub trait PromptHandler: Send + Sync {
    /// Describes the prompt. Its schema declares the prompt arguments.
    fn descriptor(&self) -> CapabilityDescriptor;

    /// Renders the prompt messages from validated arguments.
    async fn generate(&self, arguments: Value) -> Result<Vec<PromptMessage>, HandlerError>;
}

/// A registered handler, one variant per capability kind.
#[derive(Clone)]
pub enum Handler {
    Tool(Arc<dyn ToolHandler>),
    Resource(Arc<dyn ResourceHandler>),
    Prompt(Arc<dyn PromptHandler>),
}

impl Handler {
    /// Wraps a tool handler.
    pub fn tool(handler: impl ToolHandler + 'static) -> Self {
        Self::Tool(Arc::new(handler))
    }

    /// Wraps a resource handler.
    pub fn resource(handler: impl ResourceHandler + 'static) -> Self {
        Self::Resource(Arc::new(handler))
    }

    /// Wraps a prompt handler.
    pub fn prompt(handler: impl PromptHandler + 'static) -> Self {
        Self::Prompt(Arc::new(handler))
    }

    /// The kind this handler serves.
    #[must_use]
    pub const fn kind(&self) -> CapabilityKind {
        match self {
            Self::Tool(_) => CapabilityKind::Tool,
            Self::Resource(_) => CapabilityKind::Resource,
            Self::Prompt(_) => CapabilityKind::Prompt,
        }
    }

    /// The descriptor the handler reports for itself.
    #[must_use]
    pub fn descriptor(&self) -> CapabilityDescriptor {
        match self {
            Self::Tool(h) => h.descriptor(),
            Self::Resource(h) => h.descriptor(),
            Self::Prompt(h) => h.descriptor(),
        }
    }

    /// Returns `true` if both values wrap the same handler instance.
    #[must_use]
    pub fn same_instance(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Tool(a), Self::Tool(b)) => Arc::ptr_eq(a, b),
            (Self::Resource(a), Self::Resource(b)) => Arc::ptr_eq(a, b),
            (Self::Prompt(a), Self::Prompt(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Runs the kind-specific verb and flattens its output to JSON.
    pub(crate) async fn run(&self, arguments: Value) -> Result<Value, HandlerError> {
        match self {
            Self::Tool(h) => Ok(serde_json::to_value(h.invoke(arguments).await?)?),
            Self::Resource(h) => h.read().await,
            Self::Prompt(h) => Ok(serde_json::to_value(h.generate(arguments).await?)?),
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handler").field(&self.kind()).finish()
    }
}
