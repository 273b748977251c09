//! Model Context Protocol (MCP) server implementation.
//!
//! The server exposes the capability registry to AI assistants over stdio
//! using JSON-RPC 2.0 messages.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          MCP Server                          │
//! │                                                              │
//! │   ┌─────────────┐    ┌─────────────┐    ┌──────────────┐     │
//! │   │  Transport  │───▶│   Server    │───▶│  Dispatcher  │     │
//! │   │   (stdio)   │    │ (lifecycle) │    │  (per call)  │     │
//! │   └─────────────┘    └─────────────┘    └──────────────┘     │
//! │          ▲                  │                  │             │
//! │          └──────── replies, in completion order ◀┘           │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Protocol Version
//!
//! This implementation targets MCP protocol version 2024-11-05.

pub mod protocol;
pub mod server;
pub mod transport;

pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, Outgoing, MCP_PROTOCOL_VERSION};
pub use server::{McpServer, ServerState};
pub use transport::{StdioTransport, Transport};
