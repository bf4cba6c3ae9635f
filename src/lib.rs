//! docpack-mcp - recipe and documentation tool server
//!
//! Loads a bundled content archive, indexes recipes and API docs with BM25,
//! and serves list/read/search tools over line-delimited JSON-RPC on stdio.

pub mod config;
pub mod error;
pub mod handlers;
pub mod index;
pub mod ingestion;
pub mod protocol;
pub mod state;
pub mod tools;

// Re-export key types for convenience
pub use config::{Config, LogFormat};
pub use error::{AppError, LoadError, Result, ToolError};
pub use index::{Bm25Index, Corpus};
pub use ingestion::{load_archive, ContentCategory, ContentItem, LoadedContent};
pub use protocol::{serve_stdio, McpServer};
pub use state::AppState;
pub use tools::{Tool, ToolRegistry, ToolResult};
