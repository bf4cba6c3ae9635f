//! MCP JSON-RPC protocol engine over line-delimited streams.
//!
//! Each input line is parsed and handled on its own task, so completions may
//! interleave; responses are correlated by `id` only. All responses go
//! through one channel to a single writer task, which writes each as one
//! line and flushes. A malformed line produces an error response and never
//! affects the lines after it.

use crate::error::{AppError, Result};
use crate::protocol::types::{
    CallToolParams, InitializeParams, InitializeResult, JsonRpcRequest, JsonRpcResponse,
    ServerCapabilities, ServerInfo, ToolsCapability, ToolsListResult, JSONRPC_VERSION,
};
use crate::state::AppState;
use crate::tools::ToolResult;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

/// Notifications the client may send; never answered.
const LIFECYCLE_NOTIFICATIONS: &[&str] = &[
    "initialized",
    "notifications/initialized",
    "notifications/cancelled",
];

pub struct McpServer {
    state: Arc<AppState>,
}

impl McpServer {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Handle one raw input line. Returns `None` when nothing should be
    /// written back (notifications).
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                return Some(JsonRpcResponse::failure(
                    Value::Null,
                    AppError::ParseError(e.to_string()),
                ))
            }
        };

        let id_hint = value.get("id").cloned().unwrap_or(Value::Null);

        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(e) => {
                return Some(JsonRpcResponse::failure(
                    id_hint,
                    AppError::InvalidRequest(e.to_string()),
                ))
            }
        };

        if request.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::failure(
                id_hint,
                AppError::InvalidRequest(format!(
                    "unsupported jsonrpc version \"{}\"",
                    request.jsonrpc
                )),
            ));
        }

        self.handle_request(request).await
    }

    /// Dispatch a parsed request.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let JsonRpcRequest {
            id, method, params, ..
        } = request;

        if LIFECYCLE_NOTIFICATIONS.contains(&method.as_str()) {
            tracing::info!(method = %method, "Client notification");
            return None;
        }

        let outcome = self.dispatch(&method, params).await;

        let Some(id) = id else {
            tracing::debug!(method = %method, "Notification handled without response");
            return None;
        };

        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(e) => JsonRpcResponse::failure(id, e),
        })
    }

    async fn dispatch(&self, method: &str, params: Option<Value>) -> Result<Value> {
        match method {
            "initialize" => self.initialize(params),
            "ping" => Ok(json!({})),
            "tools/list" => self.list_tools(),
            "tools/call" => self.call_tool(params).await,
            other => Err(AppError::MethodNotFound(other.to_string())),
        }
    }

    fn initialize(&self, params: Option<Value>) -> Result<Value> {
        let params: InitializeParams = match params {
            None | Some(Value::Null) => InitializeParams::default(),
            Some(value) => decode_params(value)?,
        };

        let repeated = self.state.mark_initialized();
        let config = &self.state.config;

        tracing::info!(
            client = params.client_info.as_ref().map(|c| c.name.as_str()).unwrap_or("unknown"),
            client_version = params
                .client_info
                .as_ref()
                .and_then(|c| c.version.as_deref())
                .unwrap_or("unknown"),
            requested_protocol = params.protocol_version.as_deref().unwrap_or("unspecified"),
            repeated,
            "Client initialized"
        );

        to_result(InitializeResult {
            protocol_version: config.protocol_version.clone(),
            capabilities: ServerCapabilities {
                tools: ToolsCapability { list_changed: true },
            },
            server_info: ServerInfo {
                name: config.server_name.clone(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: config.instructions.clone(),
        })
    }

    fn list_tools(&self) -> Result<Value> {
        to_result(ToolsListResult {
            tools: self.state.registry.definitions(),
        })
    }

    async fn call_tool(&self, params: Option<Value>) -> Result<Value> {
        let params: CallToolParams = decode_params(params.unwrap_or(Value::Null))?;

        let tool = self
            .state
            .registry
            .get(&params.name)
            .ok_or_else(|| AppError::UnknownTool(params.name.clone()))?;

        if !self.state.is_initialized() {
            tracing::debug!(tool = %params.name, "Tool call before initialize");
        }

        let args = match params.arguments {
            None | Some(Value::Null) => json!({}),
            Some(args) => args,
        };

        let start = Instant::now();
        let result = match tokio::task::spawn_blocking(move || tool.invoke(args)).await {
            Ok(Ok(text)) => ToolResult::text(text),
            Ok(Err(e)) => {
                tracing::warn!(tool = %params.name, error = %e, "Tool returned an error");
                ToolResult::error(e.to_string())
            }
            Err(e) => {
                let message = join_error_message(e);
                tracing::error!(tool = %params.name, error = %message, "Tool task failed");
                ToolResult::error(message)
            }
        };

        let elapsed = start.elapsed();
        record_tool_call(&params.name, result.is_error, elapsed);

        tracing::info!(
            tool = %params.name,
            is_error = result.is_error,
            elapsed_ms = elapsed.as_millis() as u64,
            "Tool call completed"
        );

        to_result(result)
    }

    /// Serve requests from `reader` until EOF, writing responses to `writer`.
    ///
    /// Returns once every in-flight request has been answered and the
    /// writer has flushed.
    pub async fn serve<R, W>(self: Arc<Self>, mut reader: R, writer: W) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel::<JsonRpcResponse>();
        let writer_task = tokio::spawn(write_responses(writer, rx));

        let mut buf = Vec::new();
        let mut received = 0u64;
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }

            let line = String::from_utf8_lossy(&buf).trim().to_string();
            if line.is_empty() {
                continue;
            }
            received += 1;

            let server = Arc::clone(&self);
            let tx = tx.clone();
            tokio::spawn(async move {
                if let Some(response) = server.handle_line(&line).await {
                    // Receiver only goes away if stdout failed; nothing left to do.
                    let _ = tx.send(response);
                }
            });
        }

        tracing::info!(received, "Input closed, draining in-flight requests");
        drop(tx);

        writer_task.await.map_err(io::Error::other)?
    }
}

/// Serve on the process's stdin/stdout.
pub async fn serve_stdio(state: Arc<AppState>) -> io::Result<()> {
    let server = Arc::new(McpServer::new(state));
    server
        .serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await
}

async fn write_responses<W>(
    mut writer: W,
    mut rx: mpsc::UnboundedReceiver<JsonRpcResponse>,
) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        let mut line = match serde_json::to_string(&response) {
            Ok(line) => line,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize response");
                continue;
            }
        };
        line.push('\n');
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
    }
    Ok(())
}

fn record_tool_call(tool: &str, is_error: bool, elapsed: Duration) {
    metrics::counter!("tool_calls_total", "tool" => tool.to_string()).increment(1);
    if is_error {
        metrics::counter!("tool_errors_total", "tool" => tool.to_string()).increment(1);
    }
    metrics::histogram!("tool_call_latency_ms").record(elapsed.as_secs_f64() * 1000.0);
}

fn decode_params<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| AppError::InvalidParams(e.to_string()))
}

fn to_result<T: serde::Serialize>(value: T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| AppError::InternalError(e.to_string()))
}

fn join_error_message(err: tokio::task::JoinError) -> String {
    if !err.is_panic() {
        return "Tool execution was cancelled".to_string();
    }
    let payload = err.into_panic();
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "Tool panicked".to_string()
    }
}
