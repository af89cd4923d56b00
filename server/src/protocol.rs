//! JSON-RPC 2.0 message types and MCP constants

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC version tag
pub const JSONRPC_VERSION: &str = "2.0";

/// MCP protocol revision offered when the client does not name one
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Name reported in `serverInfo`
pub const SERVER_NAME: &str = "fred-mcp";

/// Instructions returned from `initialize`
pub const INSTRUCTIONS: &str =
    "Query FRED API v1, GeoFRED maps API, and FRED API v2 release observations.";

/// Well-known JSON-RPC error codes
pub mod error_codes {
    /// Invalid JSON was received
    pub const PARSE_ERROR: i32 = -32700;
    /// The JSON sent is not a valid request object
    pub const INVALID_REQUEST: i32 = -32600;
    /// The method does not exist
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Invalid method parameters
    pub const INVALID_PARAMS: i32 = -32602;
}

/// Incoming request or notification
///
/// A missing `id` marks a notification, which never gets a reply.
#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    /// Request id, number or string
    #[serde(default)]
    pub id: Option<Value>,
    /// Method name
    pub method: String,
    /// Method parameters
    #[serde(default)]
    pub params: Value,
}

impl Request {
    /// Whether this message expects no reply
    #[must_use]
    pub const fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// Outgoing response
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Response {
    /// Always `"2.0"`
    pub jsonrpc: &'static str,
    /// Id of the request being answered (`null` when it could not be read)
    pub id: Value,
    /// Success value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Failure value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

/// JSON-RPC error object
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RpcError {
    /// Error code
    pub code: i32,
    /// Error message
    pub message: String,
}

impl Response {
    /// Successful response
    #[must_use]
    pub const fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Error response
    #[must_use]
    pub fn failure(id: Value, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_parsing() {
        let message = json!({"jsonrpc": "2.0", "id": "a1", "method": "ping"});
        let request: Request = serde_json::from_value(message).unwrap();
        assert_eq!(request.id, Some(json!("a1")));
        assert_eq!(request.params, Value::Null);
        assert!(!request.is_notification());

        let message = json!({"jsonrpc": "2.0", "method": "notifications/initialized"});
        let note: Request = serde_json::from_value(message).unwrap();
        assert!(note.is_notification());
    }

    #[test]
    fn test_response_serialization() {
        let ok = serde_json::to_value(Response::success(json!(1), json!({}))).unwrap();
        assert_eq!(ok, json!({"jsonrpc": "2.0", "id": 1, "result": {}}));

        let failure = Response::failure(Value::Null, -32700, "Parse error");
        let err = serde_json::to_value(failure).unwrap();
        assert_eq!(
            err,
            json!({
                "jsonrpc": "2.0",
                "id": null,
                "error": {"code": -32700, "message": "Parse error"}
            })
        );
    }
}
