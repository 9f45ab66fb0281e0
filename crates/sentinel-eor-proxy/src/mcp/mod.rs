//! Model Context Protocol request dispatch.
//!
//! The dispatcher answers the small subset of MCP the proxy needs
//! (`initialize`, `ping`, `tools/list`, `tools/call`) and is shared by the
//! stdio and SSE transports, which only differ in framing.

use sentinel_eor_forwarder::{Forward, ForwardError, Operation};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::sync::Arc;

pub mod jsonrpc;
pub mod tools;

pub use jsonrpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
pub use tools::ToolDefinition;

/// MCP protocol revision implemented by the proxy.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Name reported in `serverInfo` and on the HTTP info routes.
pub const SERVER_NAME: &str = "Sentinel Asia EOR API Server";

#[derive(Debug, Deserialize)]
struct CallToolParams {
    name: Option<String>,
    #[serde(default)]
    arguments: Map<String, Value>,
}

/// Dispatches JSON-RPC requests onto the forwarder.
#[derive(Clone)]
pub struct McpDispatcher {
    forwarder: Arc<dyn Forward>,
}

impl std::fmt::Debug for McpDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpDispatcher").finish_non_exhaustive()
    }
}

impl McpDispatcher {
    /// Dispatcher forwarding tool calls through `forwarder`.
    pub fn new(forwarder: Arc<dyn Forward>) -> Self {
        Self { forwarder }
    }

    /// Decode one raw message and handle it.
    ///
    /// Undecodable input is answered with a parse or invalid-request error
    /// carrying a `null` id. Returns `None` for notifications.
    pub async fn handle_message(&self, raw: &[u8]) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_slice(raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!("Rejecting undecodable message: {e}");
                return Some(JsonRpcResponse::failure(
                    Value::Null,
                    JsonRpcError::parse_error(e),
                ));
            }
        };

        let id = value.get("id").cloned().unwrap_or(Value::Null);
        match serde_json::from_value::<JsonRpcRequest>(value) {
            Ok(request) => self.handle(request).await,
            Err(e) => Some(JsonRpcResponse::failure(
                id,
                JsonRpcError::invalid_request(e),
            )),
        }
    }

    /// Handle a decoded request. Returns `None` for notifications.
    pub async fn handle(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let Some(id) = request.id else {
            tracing::debug!("Received notification: {}", request.method);
            return None;
        };

        tracing::debug!("Handling {} (id {})", request.method, id);

        let outcome = match request.method.as_str() {
            "initialize" => Ok(Self::initialize_result()),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": tools::definitions() })),
            "tools/call" => self.call_tool(request.params).await,
            other => Err(JsonRpcError::method_not_found(other)),
        };

        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => JsonRpcResponse::failure(id, error),
        })
    }

    fn initialize_result() -> Value {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": { "tools": {} },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION"),
            },
        })
    }

    async fn call_tool(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let params: CallToolParams = serde_json::from_value(params.unwrap_or(Value::Null))
            .map_err(|e| JsonRpcError::invalid_params(format!("Invalid tool call: {e}")))?;

        let name = params
            .name
            .ok_or_else(|| JsonRpcError::invalid_params("Tool name is required"))?;
        let operation: Operation = name
            .parse()
            .map_err(|_| JsonRpcError::new(jsonrpc::METHOD_NOT_FOUND, format!("Unknown tool: {name}")))?;

        let query = tools::arguments_to_params(operation, &params.arguments);
        let result = self
            .forwarder
            .forward(operation, &query)
            .await
            .map_err(|e| {
                tracing::warn!("Tool {operation} failed: {e}");
                forward_error_to_rpc(&e)
            })?;

        let text = serde_json::to_string_pretty(&result)
            .map_err(|e| JsonRpcError::internal(format!("Failed to encode result: {e}")))?;

        Ok(json!({
            "content": [{ "type": "text", "text": text }]
        }))
    }
}

/// JSON-RPC error for a failed forward.
pub fn forward_error_to_rpc(err: &ForwardError) -> JsonRpcError {
    if err.is_client_input() {
        JsonRpcError::invalid_params(err.to_string())
    } else {
        JsonRpcError::internal(err.to_string())
    }
}
