//! mcp-demo-server: an MCP server exposing tools, resources and prompts
//!
//! The server speaks JSON-RPC 2.0 over newline-delimited stdio and routes
//! every capability call through a small dispatch core:
//!
//! - **Registry**: capabilities keyed by kind and identifier, fixed at startup
//! - **Schema validation**: arguments are checked before any handler runs
//! - **Error boundary**: every call ends in `Ok`, `HandlerFailed` or
//!   `ProtocolFailed`, and a failing handler never takes the server down
//!
//! # Modules
//!
//! - [`capability`] — Registry, schema validator, error boundary, dispatcher
//! - [`config`] — Configuration loading and validation
//! - [`error`] — Error types
//! - [`mcp`] — MCP protocol, transport and server facade
//! - [`tools`], [`resources`], [`prompts`] — The registered capabilities

pub mod capability;
pub mod config;
pub mod error;
pub mod mcp;
pub mod prompts;
pub mod resources;
pub mod tools;
