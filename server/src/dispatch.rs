//! MCP method dispatch
//!
//! Turns one incoming line into at most one response. Notifications and
//! tool calls abandoned by shutdown produce no response.

use crate::protocol::{INSTRUCTIONS, PROTOCOL_VERSION, Request, Response, SERVER_NAME, error_codes};
use fred_mcp_client::JsonObject;
use fred_mcp_tools::{Cancelled, ToolRegistry};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

/// Routes requests to the tool registry
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: ToolRegistry,
}

impl Dispatcher {
    /// Create a dispatcher over `registry`
    #[must_use]
    pub const fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }

    /// Registry backing `tools/list` and `tools/call`
    #[must_use]
    pub const fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Handle one raw line from the transport
    pub async fn handle_line(&self, line: &str) -> Option<Response> {
        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Unparseable message");
                return Some(Response::failure(
                    Value::Null,
                    error_codes::PARSE_ERROR,
                    format!("Parse error: {e}"),
                ));
            }
        };

        let id = value.get("id").cloned().unwrap_or(Value::Null);
        match serde_json::from_value::<Request>(value) {
            Ok(request) => self.handle(request).await,
            Err(e) => Some(Response::failure(
                id,
                error_codes::INVALID_REQUEST,
                format!("Invalid request: {e}"),
            )),
        }
    }

    /// Handle one decoded request
    pub async fn handle(&self, request: Request) -> Option<Response> {
        let method = request.method.clone();
        debug!(method = %method, "Dispatching request");

        match method.as_str() {
            "initialize" => {
                info!("Client initialised session");
                reply(request.id, initialize_result(&request.params))
            }
            "ping" => reply(request.id, json!({})),
            "tools/list" => reply(request.id, json!({"tools": self.registry.get_tools()})),
            "tools/call" => self.call_tool(request).await,
            method if method.starts_with("notifications/") => None,
            method => {
                let id = request.id?;
                Some(Response::failure(
                    id,
                    error_codes::METHOD_NOT_FOUND,
                    format!("Method not found: {method}"),
                ))
            }
        }
    }

    async fn call_tool(&self, request: Request) -> Option<Response> {
        let id = request.id.unwrap_or(Value::Null);
        let Some(name) = request.params.get("name").and_then(Value::as_str) else {
            return Some(Response::failure(id, error_codes::INVALID_PARAMS, "Missing tool name"));
        };
        let arguments = request
            .params
            .get("arguments")
            .cloned()
            .unwrap_or(Value::Null);

        match self.registry.execute(name, arguments).await {
            Ok(object) => Some(Response::success(id, call_result(object))),
            Err(Cancelled) => {
                debug!(tool = name, "Tool call abandoned by shutdown");
                None
            }
        }
    }
}

fn reply(id: Option<Value>, result: Value) -> Option<Response> {
    id.map(|id| Response::success(id, result))
}

fn initialize_result(params: &Value) -> Value {
    let protocol_version = params
        .get("protocolVersion")
        .and_then(Value::as_str)
        .unwrap_or(PROTOCOL_VERSION);
    json!({
        "protocolVersion": protocol_version,
        "capabilities": {"tools": {"listChanged": false}},
        "serverInfo": {"name": SERVER_NAME, "version": env!("CARGO_PKG_VERSION")},
        "instructions": INSTRUCTIONS,
    })
}

/// Wrap a tool's object as an MCP `tools/call` result
///
/// The object is returned both as text content and as structured content;
/// `isError` is set when it is an error payload.
#[must_use]
pub fn call_result(object: JsonObject) -> Value {
    let is_error = object.contains_key("error");
    let text = Value::Object(object.clone()).to_string();
    json!({
        "content": [{"type": "text", "text": text}],
        "structuredContent": object,
        "isError": is_error,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use fred_mcp_client::{FredClient, FredConfig};

    fn dispatcher() -> Dispatcher {
        let client = FredClient::new(FredConfig::new("key"));
        Dispatcher::new(ToolRegistry::with_fred_tools(client))
    }

    async fn send(dispatcher: &Dispatcher, message: Value) -> Option<Response> {
        dispatcher.handle_line(&message.to_string()).await
    }

    #[tokio::test]
    async fn test_initialize() {
        let message = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "initialize",
            "params": {"protocolVersion": "2025-03-26"}
        });
        let response = send(&dispatcher(), message).await.unwrap();
        let result = response.result.unwrap();

        assert_eq!(result["protocolVersion"], "2025-03-26");
        assert_eq!(result["serverInfo"]["name"], "fred-mcp");
        assert_eq!(result["instructions"], INSTRUCTIONS);
        assert!(result["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn test_notifications_get_no_reply() {
        let dispatcher = dispatcher();
        let initialized = json!({"jsonrpc": "2.0", "method": "notifications/initialized"});
        assert!(send(&dispatcher, initialized).await.is_none());

        let unknown = json!({"jsonrpc": "2.0", "method": "unknown/thing"});
        assert!(send(&dispatcher, unknown).await.is_none());
    }

    #[tokio::test]
    async fn test_protocol_errors() {
        let dispatcher = dispatcher();

        let parse = dispatcher.handle_line("{not json").await.unwrap();
        assert_eq!(parse.id, Value::Null);
        assert_eq!(parse.error.unwrap().code, error_codes::PARSE_ERROR);

        let invalid = send(&dispatcher, json!({"id": 3})).await.unwrap();
        assert_eq!(invalid.id, json!(3));
        assert_eq!(invalid.error.unwrap().code, error_codes::INVALID_REQUEST);

        let message = json!({"jsonrpc": "2.0", "id": 4, "method": "resources/list"});
        let unknown = send(&dispatcher, message).await.unwrap();
        assert_eq!(unknown.error.unwrap().code, error_codes::METHOD_NOT_FOUND);

        let message = json!({"jsonrpc": "2.0", "id": 5, "method": "tools/call", "params": {}});
        let nameless = send(&dispatcher, message).await.unwrap();
        assert_eq!(nameless.error.unwrap().code, error_codes::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_tools_list() {
        let message = json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"});
        let response = send(&dispatcher(), message).await.unwrap();
        let tools = response.result.unwrap()["tools"].as_array().unwrap().clone();

        assert_eq!(tools.len(), 39);
        assert!(tools.iter().all(|tool| tool["inputSchema"]["type"] == "object"));
    }

    #[tokio::test]
    async fn test_tool_error_is_flagged() {
        let message = json!({
            "jsonrpc": "2.0",
            "id": 6,
            "method": "tools/call",
            "params": {"name": "nope"}
        });
        let response = send(&dispatcher(), message).await.unwrap();
        let result = response.result.unwrap();

        assert_eq!(result["isError"], true);
        assert_eq!(result["structuredContent"]["error"], "Unknown tool: nope");
        let text = result["content"][0]["text"].as_str().unwrap();
        let parsed: Value = serde_json::from_str(text).unwrap();
        assert_eq!(parsed, result["structuredContent"]);
    }

    #[test]
    fn test_call_result_success() {
        let mut object = JsonObject::new();
        object.insert("ok".into(), Value::Bool(true));
        let result = call_result(object);

        assert_eq!(result["isError"], false);
        assert_eq!(result["content"][0]["type"], "text");
        assert_eq!(result["structuredContent"], json!({"ok": true}));
    }
}
