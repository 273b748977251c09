//! MCP server facade.
//!
//! This module implements the MCP server lifecycle:
//!
//! 1. **Connection**: a transport is attached and the server awaits `initialize`
//! 2. **Serving**: listings are answered inline, capability calls run as
//!    independent tasks and are answered as they complete
//! 3. **Shutdown**: on interrupt or end of input, reading stops and every
//!    in-flight call is allowed to finish before the loop returns

use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::task::{JoinError, JoinSet};

use crate::capability::boundary::error_payload;
use crate::capability::{
    CapabilityKind, CapabilityRequest, Dispatcher, Outcome, PromptMessage, Registry,
    RegistryBuilder,
};
use crate::config::Config;
use crate::error::{ProtocolError, RegistryError, ServerError};
use crate::mcp::protocol::{
    parse_message, ErrorCode, IncomingMessage, JsonRpcError, JsonRpcErrorData,
    JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, Outgoing, RequestId,
    MCP_PROTOCOL_VERSION, SERVER_NAME,
};
use crate::mcp::transport::{StdioTransport, Transport};
use crate::{prompts, resources, tools};

/// MIME type reported for resource data when the descriptor names none.
const DEFAULT_MIME_TYPE: &str = "application/json";

/// Server state in the MCP lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Registrations fixed, no transport attached yet.
    Uninitialized,
    /// Transport attached, waiting for `initialize`.
    Connected,
    /// Accepting requests.
    Serving,
    /// No longer reading; in-flight calls are finishing.
    ShuttingDown,
    /// The serving loop has returned.
    Terminated,
}

/// Server capabilities advertised during initialisation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ServerCapabilities {
    pub tools: ListCapability,
    pub resources: ListCapability,
    pub prompts: ListCapability,
}

/// Capability flags shared by every listable kind.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListCapability {
    /// Whether the list can change during the session. Always false here,
    /// the registry is fixed at startup.
    #[serde(rename = "listChanged", skip_serializing_if = "is_false")]
    pub list_changed: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)] // serde's skip_serializing_if requires a predicate fn(&T) -> bool
const fn is_false(b: &bool) -> bool {
    !*b
}

/// Server information for initialisation response.
#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Client information received during initialisation.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
}

/// Parameters for the initialize request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    /// Protocol version requested by client.
    pub protocol_version: String,
    #[serde(default)]
    pub capabilities: Value,
    #[serde(default)]
    pub client_info: Option<ClientInfo>,
}

/// A tool definition for tools/list response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema for the tool's input parameters.
    pub input_schema: Value,
}

/// A resource definition for resources/list response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDefinition {
    pub uri: String,
    pub name: String,
    pub description: String,
    pub mime_type: String,
}

/// One declared prompt argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptArgument {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub required: bool,
}

/// A prompt definition for prompts/list response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptDefinition {
    pub name: String,
    pub description: String,
    pub arguments: Vec<PromptArgument>,
}

/// Parameters for tools/call request.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Option<Value>,
}

/// Parameters for resources/read request.
#[derive(Debug, Clone, Deserialize)]
pub struct ReadResourceParams {
    pub uri: String,
}

/// Parameters for prompts/get request.
#[derive(Debug, Clone, Deserialize)]
pub struct GetPromptParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Option<Value>,
}

/// Content item in a tool call response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Text content.
    Text {
        /// The text content.
        text: String,
    },
}

/// Result of a tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    pub content: Vec<ToolContent>,
    /// Whether the tool declined the call.
    #[serde(skip_serializing_if = "is_false")]
    pub is_error: bool,
}

impl ToolCallResult {
    /// Creates a successful text result.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: false,
        }
    }

    /// Creates an error text result.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: message.into(),
            }],
            is_error: true,
        }
    }

    /// The text of the first content item.
    #[must_use]
    pub fn first_text(&self) -> Option<&str> {
        self.content.first().map(|ToolContent::Text { text }| text.as_str())
    }
}

/// One item of resource data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceContents {
    pub uri: String,
    pub mime_type: String,
    pub text: String,
}

/// Result of a resource read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadResourceResult {
    pub contents: Vec<ResourceContents>,
    #[serde(skip_serializing_if = "is_false")]
    pub is_error: bool,
}

/// Result of a prompt generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetPromptResult {
    pub messages: Vec<PromptMessage>,
    #[serde(skip_serializing_if = "is_false")]
    pub is_error: bool,
}

/// The MCP server.
#[derive(Debug)]
pub struct McpServer {
    state: ServerState,
    dispatcher: Arc<Dispatcher>,
    /// Negotiated protocol version (set after initialisation).
    protocol_version: Option<String>,
}

impl McpServer {
    /// Creates a server over a built registry.
    #[must_use]
    pub fn new(registry: Registry) -> Self {
        Self {
            state: ServerState::Uninitialized,
            dispatcher: Arc::new(Dispatcher::new(registry)),
            protocol_version: None,
        }
    }

    /// Builds the registry from the static registration table and creates
    /// the server.
    ///
    /// # Errors
    ///
    /// Returns an error if two capabilities of one kind share an identifier.
    pub fn from_config(config: &Config) -> Result<Self, RegistryError> {
        let mut builder = RegistryBuilder::new();
        tools::register(&mut builder, config)?;
        resources::register(&mut builder, config)?;
        prompts::register(&mut builder)?;
        let registry = builder.build();

        tracing::info!(
            tools = registry.len(CapabilityKind::Tool),
            resources = registry.len(CapabilityKind::Resource),
            prompts = registry.len(CapabilityKind::Prompt),
            "Capability registry built"
        );

        Ok(Self::new(registry))
    }

    /// Returns the current server state.
    #[must_use]
    pub const fn state(&self) -> ServerState {
        self.state
    }

    /// The protocol version agreed during `initialize`.
    #[must_use]
    pub fn protocol_version(&self) -> Option<&str> {
        self.protocol_version.as_deref()
    }

    /// Lists tools in registration order.
    #[must_use]
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        self.registry()
            .list(CapabilityKind::Tool)
            .map(|d| ToolDefinition {
                name: d.identifier().to_string(),
                description: d.description().to_string(),
                input_schema: d
                    .schema()
                    .cloned()
                    .unwrap_or_else(|| json!({"type": "object"})),
            })
            .collect()
    }

    /// Lists resources in registration order.
    #[must_use]
    pub fn list_resources(&self) -> Vec<ResourceDefinition> {
        self.registry()
            .list(CapabilityKind::Resource)
            .map(|d| ResourceDefinition {
                uri: d.identifier().to_string(),
                name: d.title().to_string(),
                description: d.description().to_string(),
                mime_type: d.mime_type().unwrap_or(DEFAULT_MIME_TYPE).to_string(),
            })
            .collect()
    }

    /// Lists prompts in registration order.
    #[must_use]
    pub fn list_prompts(&self) -> Vec<PromptDefinition> {
        self.registry()
            .list(CapabilityKind::Prompt)
            .map(|d| PromptDefinition {
                name: d.identifier().to_string(),
                description: d.description().to_string(),
                arguments: prompt_arguments(d.schema()),
            })
            .collect()
    }

    /// Invokes a tool.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::UnknownCapability`] if no tool has that name.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Option<Value>,
    ) -> Result<ToolCallResult, ProtocolError> {
        call_tool(&self.dispatcher, name, arguments).await
    }

    /// Reads a resource.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::UnknownCapability`] if no resource has that URI.
    pub async fn read_resource(&self, uri: &str) -> Result<ReadResourceResult, ProtocolError> {
        read_resource(&self.dispatcher, uri).await
    }

    /// Generates a prompt.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::UnknownCapability`] if no prompt has that name.
    pub async fn get_prompt(
        &self,
        name: &str,
        arguments: Option<Value>,
    ) -> Result<GetPromptResult, ProtocolError> {
        get_prompt(&self.dispatcher, name, arguments).await
    }

    fn registry(&self) -> &Registry {
        self.dispatcher.registry()
    }

    /// Serves MCP over stdio until interrupted or stdin closes.
    ///
    /// # Errors
    ///
    /// Returns an error if signal handlers cannot be installed or transport
    /// I/O fails.
    pub async fn run(&mut self) -> Result<(), ServerError> {
        let shutdown = shutdown_signal()?;
        let mut transport = StdioTransport::stdio();
        self.serve(&mut transport, shutdown).await
    }

    /// Serves MCP over `transport` until `shutdown` resolves or the peer
    /// closes its end.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O fails.
    pub async fn serve<R, W, S>(
        &mut self,
        transport: &mut Transport<R, W>,
        shutdown: S,
    ) -> Result<(), ServerError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
        S: Future<Output = ()>,
    {
        self.state = ServerState::Connected;
        tracing::debug!("Transport attached");

        tokio::pin!(shutdown);
        let mut in_flight: JoinSet<Outgoing> = JoinSet::new();

        let result = loop {
            tokio::select! {
                () = &mut shutdown => {
                    tracing::info!("Shutdown requested");
                    break Ok(());
                }

                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(e) = write_joined(transport, joined).await {
                        break Err(e);
                    }
                }

                line = transport.read_line() => {
                    match line {
                        Ok(Some(Ok(line))) => {
                            if let Some(reply) = self.handle_line(&line, &mut in_flight) {
                                if let Err(e) = transport.write(&reply).await {
                                    break Err(e);
                                }
                            }
                        }
                        Ok(Some(Err(e))) => {
                            tracing::warn!(error = %e, "Rejected line that is not UTF-8");
                            let reply = Outgoing::Error(JsonRpcError::parse_error());
                            if let Err(e) = transport.write(&reply).await {
                                break Err(e);
                            }
                        }
                        Ok(None) => {
                            tracing::info!("Transport closed by peer");
                            break Ok(());
                        }
                        Err(e) => break Err(e),
                    }
                }
            }
        };

        self.state = ServerState::ShuttingDown;

        let result = match result {
            Ok(()) => {
                if !in_flight.is_empty() {
                    tracing::info!(pending = in_flight.len(), "Waiting for in-flight requests");
                }
                let mut drained = Ok(());
                while let Some(joined) = in_flight.join_next().await {
                    if let Err(e) = write_joined(transport, joined).await {
                        drained = Err(e);
                        break;
                    }
                }
                drained
            }
            Err(e) => {
                tracing::error!(error = %e, "Transport failed");
                Err(e)
            }
        };

        self.state = ServerState::Terminated;
        result.map_err(ServerError::from)
    }

    /// Handles a single line of input.
    ///
    /// Returns the reply to write now, or `None` when there is nothing to
    /// write yet (blank lines, notifications, and spawned capability calls).
    fn handle_line(&mut self, line: &str, in_flight: &mut JoinSet<Outgoing>) -> Option<Outgoing> {
        if line.trim().is_empty() {
            return None;
        }

        match parse_message(line) {
            Ok(IncomingMessage::Request(req)) => self.handle_request(req, in_flight),
            Ok(IncomingMessage::Notification(ref notif)) => {
                Self::handle_notification(notif);
                None
            }
            Err(error) => {
                tracing::warn!(code = error.error.code, "Rejected malformed message");
                Some(Outgoing::Error(error))
            }
        }
    }

    fn handle_request(
        &mut self,
        req: JsonRpcRequest,
        in_flight: &mut JoinSet<Outgoing>,
    ) -> Option<Outgoing> {
        tracing::debug!(id = %req.id, method = %req.method, "Request received");

        let reply = match req.method.as_str() {
            "initialize" => self.handle_initialize(&req),
            "ping" => Ok(JsonRpcResponse::success(req.id.clone(), json!({}))),
            "tools/list" => self.respond_serving(&req, || json!({"tools": self.list_tools()})),
            "resources/list" => {
                self.respond_serving(&req, || json!({"resources": self.list_resources()}))
            }
            "prompts/list" => {
                self.respond_serving(&req, || json!({"prompts": self.list_prompts()}))
            }
            "tools/call" | "resources/read" | "prompts/get" => {
                match self.prepare_call(&req) {
                    Ok(request) => {
                        let dispatcher = Arc::clone(&self.dispatcher);
                        let id = req.id.clone();
                        in_flight.spawn(async move { execute(&dispatcher, id, request).await });
                        return None;
                    }
                    Err(error) => Err(error),
                }
            }
            _ => Err(JsonRpcError::method_not_found(req.id.clone(), &req.method)),
        };

        Some(reply.into())
    }

    /// Handles an incoming notification.
    fn handle_notification(notif: &JsonRpcNotification) {
        match notif.method.as_str() {
            "notifications/initialized" => tracing::debug!("Client finished initialisation"),
            other => tracing::debug!(method = other, "Ignoring notification"),
        }
    }

    /// Handles the initialize request.
    fn handle_initialize(&mut self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        if self.state != ServerState::Connected {
            return Err(JsonRpcError::new(
                Some(req.id.clone()),
                JsonRpcErrorData::with_message(
                    ErrorCode::InvalidRequest,
                    "Server already initialised",
                ),
            ));
        }

        let params: InitializeParams = parse_params(req, "initialize")?;
        if let Some(client) = &params.client_info {
            tracing::info!(
                client = %client.name,
                version = client.version.as_deref().unwrap_or("unknown"),
                requested = %params.protocol_version,
                "Client connected"
            );
        }

        let negotiated_version = MCP_PROTOCOL_VERSION.to_string();
        self.protocol_version = Some(negotiated_version.clone());
        self.state = ServerState::Serving;

        let result = json!({
            "protocolVersion": negotiated_version,
            "capabilities": ServerCapabilities::default(),
            "serverInfo": ServerInfo::default(),
        });

        Ok(JsonRpcResponse::success(req.id.clone(), result))
    }

    fn respond_serving(
        &self,
        req: &JsonRpcRequest,
        result: impl FnOnce() -> Value,
    ) -> Result<JsonRpcResponse, JsonRpcError> {
        self.require_serving(&req.id)?;
        Ok(JsonRpcResponse::success(req.id.clone(), result()))
    }

    /// Turns a call request into a capability request, rejecting bad params.
    fn prepare_call(&self, req: &JsonRpcRequest) -> Result<CapabilityRequest, JsonRpcError> {
        self.require_serving(&req.id)?;

        match req.method.as_str() {
            "tools/call" => {
                let params: ToolCallParams = parse_params(req, "tool call")?;
                Ok(CapabilityRequest::tool(params.name, params.arguments))
            }
            "resources/read" => {
                let params: ReadResourceParams = parse_params(req, "resource read")?;
                Ok(CapabilityRequest::resource(params.uri))
            }
            _ => {
                let params: GetPromptParams = parse_params(req, "prompt")?;
                Ok(CapabilityRequest::prompt(params.name, params.arguments))
            }
        }
    }

    /// Ensures the server is in the Serving state.
    fn require_serving(&self, id: &RequestId) -> Result<(), JsonRpcError> {
        if self.state != ServerState::Serving {
            return Err(JsonRpcError::new(
                Some(id.clone()),
                JsonRpcErrorData::with_message(ErrorCode::InvalidRequest, "Server not initialised"),
            ));
        }
        Ok(())
    }
}

fn parse_params<T: for<'de> Deserialize<'de>>(
    req: &JsonRpcRequest,
    what: &str,
) -> Result<T, JsonRpcError> {
    let params = req.params.clone().ok_or_else(|| {
        JsonRpcError::invalid_params(req.id.clone(), format!("Missing {what} params"))
    })?;

    serde_json::from_value(params).map_err(|e| {
        JsonRpcError::invalid_params(req.id.clone(), format!("Invalid {what} params: {e}"))
    })
}

/// Runs one capability call and builds its wire reply.
async fn execute(dispatcher: &Dispatcher, id: RequestId, request: CapabilityRequest) -> Outgoing {
    let CapabilityRequest {
        kind,
        identifier,
        arguments,
    } = request;

    let result = match kind {
        CapabilityKind::Tool => call_tool(dispatcher, &identifier, arguments)
            .await
            .map(serde_json::to_value),
        CapabilityKind::Resource => read_resource(dispatcher, &identifier)
            .await
            .map(serde_json::to_value),
        CapabilityKind::Prompt => get_prompt(dispatcher, &identifier, arguments)
            .await
            .map(serde_json::to_value),
    };

    match result {
        Ok(Ok(value)) => Outgoing::Response(JsonRpcResponse::success(id, value)),
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Failed to serialise capability result");
            Outgoing::Error(JsonRpcError::new(
                Some(id),
                JsonRpcErrorData::with_message(
                    ErrorCode::InternalError,
                    "Internal error: failed to serialise result",
                ),
            ))
        }
        Err(e) => Outgoing::Error(JsonRpcError::invalid_params(id, e.to_string())),
    }
}

async fn write_joined<R, W>(
    transport: &mut Transport<R, W>,
    joined: Result<Outgoing, JoinError>,
) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    match joined {
        Ok(reply) => transport.write(&reply).await,
        // The error boundary already contains handler panics, so this only
        // happens if building the reply itself panicked.
        Err(e) => {
            tracing::error!(error = %e, "Request task failed");
            Ok(())
        }
    }
}

async fn call_tool(
    dispatcher: &Dispatcher,
    name: &str,
    arguments: Option<Value>,
) -> Result<ToolCallResult, ProtocolError> {
    match dispatcher
        .dispatch(CapabilityRequest::tool(name, arguments))
        .await
    {
        Outcome::Ok(payload) => Ok(ToolCallResult::text(pretty(&payload))),
        Outcome::HandlerFailed { message } => Ok(ToolCallResult::error(pretty(&error_payload(
            CapabilityKind::Tool,
            name,
            &message,
        )))),
        Outcome::ProtocolFailed(e) => Err(e),
    }
}

async fn read_resource(dispatcher: &Dispatcher, uri: &str) -> Result<ReadResourceResult, ProtocolError> {
    let outcome = dispatcher.dispatch(CapabilityRequest::resource(uri)).await;

    let (text, is_error) = match outcome {
        Outcome::Ok(payload) => (pretty(&payload), false),
        Outcome::HandlerFailed { message } => (
            pretty(&error_payload(CapabilityKind::Resource, uri, &message)),
            true,
        ),
        Outcome::ProtocolFailed(e) => return Err(e),
    };

    let mime_type = dispatcher
        .registry()
        .lookup(CapabilityKind::Resource, uri)
        .ok()
        .and_then(|entry| entry.descriptor().mime_type())
        .unwrap_or(DEFAULT_MIME_TYPE)
        .to_string();

    Ok(ReadResourceResult {
        contents: vec![ResourceContents {
            uri: uri.to_string(),
            mime_type,
            text,
        }],
        is_error,
    })
}

async fn get_prompt(
    dispatcher: &Dispatcher,
    name: &str,
    arguments: Option<Value>,
) -> Result<GetPromptResult, ProtocolError> {
    let outcome = dispatcher
        .dispatch(CapabilityRequest::prompt(name, arguments))
        .await;

    let failure = |message: &str| GetPromptResult {
        messages: vec![PromptMessage::assistant(pretty(&error_payload(
            CapabilityKind::Prompt,
            name,
            message,
        )))],
        is_error: true,
    };

    match outcome {
        Outcome::Ok(payload) => match serde_json::from_value::<Vec<PromptMessage>>(payload) {
            Ok(messages) => Ok(GetPromptResult {
                messages,
                is_error: false,
            }),
            Err(e) => Ok(failure(&format!("Invalid prompt output: {e}"))),
        },
        Outcome::HandlerFailed { message } => Ok(failure(&message)),
        Outcome::ProtocolFailed(e) => Err(e),
    }
}

/// Declared prompt arguments, in schema property order.
fn prompt_arguments(schema: Option<&Value>) -> Vec<PromptArgument> {
    let Some(schema) = schema else {
        return Vec::new();
    };

    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    schema
        .get("properties")
        .and_then(Value::as_object)
        .map(|properties| {
            properties
                .iter()
                .map(|(name, property)| PromptArgument {
                    name: name.clone(),
                    description: property
                        .get("description")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                    required: required.contains(&name.as_str()),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

#[cfg(unix)]
fn shutdown_signal() -> std::io::Result<impl Future<Output = ()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    Ok(async move {
        tokio::select! {
            _ = sigint.recv() => tracing::info!("Received SIGINT, initiating graceful shutdown"),
            _ = sigterm.recv() => tracing::info!("Received SIGTERM, initiating graceful shutdown"),
        }
    })
}

#[cfg(windows)]
fn shutdown_signal() -> std::io::Result<impl Future<Output = ()>> {
    Ok(async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Received Ctrl+C, initiating graceful shutdown"),
            Err(e) => {
                tracing::warn!(error = %e, "Ctrl+C handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    })
}
