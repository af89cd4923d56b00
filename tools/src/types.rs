//! Tool definitions and executor signatures

use fred_mcp_client::{FredClient, FredError, JsonObject};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Tool definition as advertised by `tools/list`
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Tool {
    /// Tool name (used to identify which tool to call)
    pub name: String,
    /// Human-readable description of what the tool does
    pub description: String,
    /// JSON schema for the tool's arguments
    #[serde(rename = "inputSchema")]
    pub input_schema: serde_json::Value,
}

impl Tool {
    /// Create a tool definition
    #[must_use]
    pub fn new(name: &str, description: &str, input_schema: serde_json::Value) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            input_schema,
        }
    }
}

/// Raw outcome of a tool implementation, before the boundary
pub type ToolResult = Result<JsonObject, FredError>;

/// Boxed future returned by tool implementations
pub type ToolFuture = Pin<Box<dyn Future<Output = ToolResult> + Send>>;

/// A tool implementation: shared client plus raw JSON arguments
pub type ToolHandlerFn = Arc<dyn Fn(FredClient, serde_json::Value) -> ToolFuture + Send + Sync>;

/// Marker returned instead of a value when shutdown interrupts a call
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("tool call cancelled by shutdown")]
pub struct Cancelled;

/// Outcome seen by callers: a result object, an error payload object, or
/// cancellation
pub type ToolOutcome = Result<JsonObject, Cancelled>;

/// A tool implementation already wrapped by the error boundary
pub type ToolExecutorFn = Arc<
    dyn Fn(serde_json::Value) -> Pin<Box<dyn Future<Output = ToolOutcome> + Send>> + Send + Sync,
>;
