//! Minimal JSON-RPC 2.0 / MCP server: `initialize`, `initialized`, `ping`,
//! `tools/list` and `tools/call` over newline-delimited JSON.

pub mod server;
pub mod types;

pub use server::{serve_stdio, McpServer};
pub use types::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
