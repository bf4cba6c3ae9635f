use crate::protocol::types::JsonRpcError;
use serde_json::Value;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to load the content archive. Always fatal at startup.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Archive not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read archive {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decompress archive: {0}")]
    Archive(String),
}

/// Failure inside a tool handler. Surfaces as a tool result flagged
/// `isError`, never as a JSON-RPC error.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("{0}")]
    Failed(String),
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        ToolError::InvalidArguments(err.to_string())
    }
}

/// Protocol-level failures, each mapped to a JSON-RPC error code.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum AppError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid Request: {0}")]
    InvalidRequest(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AppError {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;

    pub fn code(&self) -> i64 {
        match self {
            AppError::ParseError(_) => Self::PARSE_ERROR,
            AppError::InvalidRequest(_) => Self::INVALID_REQUEST,
            AppError::MethodNotFound(_) => Self::METHOD_NOT_FOUND,
            AppError::InvalidParams(_) => Self::INVALID_PARAMS,
            AppError::UnknownTool(_) | AppError::InternalError(_) => Self::INTERNAL_ERROR,
        }
    }

    /// Convert into the wire error object, logging at a level matching severity.
    pub fn into_rpc_error(self) -> JsonRpcError {
        let data = match &self {
            AppError::ParseError(msg) => {
                tracing::warn!(error = %msg, "Unparseable input line");
                None
            }
            AppError::InvalidRequest(msg) => {
                tracing::warn!(error = %msg, "Invalid request envelope");
                None
            }
            AppError::MethodNotFound(method) => {
                tracing::warn!(method = %method, "Method not found");
                Some(Value::String(method.clone()))
            }
            AppError::InvalidParams(msg) => {
                tracing::warn!(error = %msg, "Invalid params");
                None
            }
            AppError::UnknownTool(name) => {
                tracing::warn!(tool = %name, "Unknown tool requested");
                Some(Value::String(name.clone()))
            }
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                None
            }
        };

        JsonRpcError {
            code: self.code(),
            message: self.to_string(),
            data,
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
