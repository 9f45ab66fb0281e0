//! JSON-RPC 2.0 message shapes.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Protocol version tag carried by every message.
pub const JSONRPC_VERSION: &str = "2.0";

/// Body is not valid JSON.
pub const PARSE_ERROR: i64 = -32700;
/// JSON is valid but not a request object.
pub const INVALID_REQUEST: i64 = -32600;
/// Method (or tool) does not exist.
pub const METHOD_NOT_FOUND: i64 = -32601;
/// Params are missing or malformed.
pub const INVALID_PARAMS: i64 = -32602;
/// Request failed while being handled.
pub const INTERNAL_ERROR: i64 = -32603;

fn default_version() -> String {
    JSONRPC_VERSION.to_string()
}

// Only called when the member is present, so `"id": null` stays `Some(Null)`.
fn present_id<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Incoming request or notification.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct JsonRpcRequest {
    /// Version tag, normally `"2.0"`
    #[serde(default = "default_version")]
    pub jsonrpc: String,

    /// Request id; `None` only when the member is absent (a notification)
    #[serde(
        default,
        deserialize_with = "present_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<Value>,

    /// Method name
    pub method: String,

    /// Method parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// Build a request with the given id.
    pub fn new(id: impl Into<Value>, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: default_version(),
            id: Some(id.into()),
            method: method.into(),
            params,
        }
    }

    /// Whether the sender expects no response.
    pub const fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// Error object of a failed response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct JsonRpcError {
    /// Error code
    pub code: i64,
    /// Human-readable message
    pub message: String,
    /// Optional structured detail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    /// Error with `code` and `message`.
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// `-32700` parse error.
    pub fn parse_error(detail: impl std::fmt::Display) -> Self {
        Self::new(PARSE_ERROR, format!("Parse error: {detail}"))
    }

    /// `-32600` invalid request.
    pub fn invalid_request(detail: impl std::fmt::Display) -> Self {
        Self::new(INVALID_REQUEST, format!("Invalid request: {detail}"))
    }

    /// `-32601` unknown method.
    pub fn method_not_found(method: &str) -> Self {
        Self::new(METHOD_NOT_FOUND, format!("Unknown method: {method}"))
    }

    /// `-32602` invalid params.
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(INVALID_PARAMS, message)
    }

    /// `-32603` internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(INTERNAL_ERROR, message)
    }
}

/// Outgoing response.
///
/// Exactly one of `result` and `error` is set.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct JsonRpcResponse {
    /// Version tag, always `"2.0"`
    pub jsonrpc: String,

    /// Id of the request being answered; `null` when it could not be read
    pub id: Value,

    /// Success payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    /// Failure payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Successful response.
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: default_version(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Failed response.
    pub fn failure(id: Value, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: default_version(),
            id,
            result: None,
            error: Some(error),
        }
    }

    /// Whether this response carries an error.
    pub const fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_request_defaults() {
        let request: JsonRpcRequest =
            serde_json::from_value(json!({"method": "notifications/initialized"})).unwrap();
        assert_eq!(request.jsonrpc, "2.0");
        assert!(request.is_notification());
        assert_eq!(request.params, None);

        let request: JsonRpcRequest =
            serde_json::from_value(json!({"jsonrpc": "2.0", "id": "abc", "method": "ping"}))
                .unwrap();
        assert_eq!(request.id, Some(json!("abc")));
    }

    #[test]
    fn test_null_id_is_not_a_notification() {
        let request: JsonRpcRequest =
            serde_json::from_value(json!({"jsonrpc": "2.0", "id": null, "method": "ping"}))
                .unwrap();
        assert_eq!(request.id, Some(Value::Null));
        assert!(!request.is_notification());
    }

    #[test]
    fn test_response_serialization_omits_absent_members() {
        let ok = JsonRpcResponse::success(json!(1), json!({}));
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({"jsonrpc": "2.0", "id": 1, "result": {}})
        );

        let err = JsonRpcResponse::failure(Value::Null, JsonRpcError::parse_error("eof"));
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({
                "jsonrpc": "2.0",
                "id": null,
                "error": {"code": -32700, "message": "Parse error: eof"}
            })
        );
    }
}
