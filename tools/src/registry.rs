//! Tool registry for name-based dispatch
//!
//! The registry provides:
//! - Registration that wraps every handler in the error boundary
//! - Thread-safe tool storage
//! - Tool execution by name
//! - Tool listing and introspection

use crate::boundary;
use crate::types::{Tool, ToolExecutorFn, ToolHandlerFn, ToolOutcome};
use fred_mcp_client::{ErrorPayload, FredClient};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Thread-safe tool registry bound to one [`FredClient`]
///
/// ## Example
///
/// ```no_run
/// use fred_mcp_client::FredClient;
/// use fred_mcp_tools::ToolRegistry;
/// use serde_json::json;
///
/// # async fn demo() {
/// let registry = ToolRegistry::with_fred_tools(FredClient::from_env());
///
/// let result = registry.execute("get_series", json!({"series_id": "GDP"})).await;
/// # }
/// ```
#[derive(Clone)]
pub struct ToolRegistry {
    client: FredClient,
    tools: Arc<RwLock<HashMap<String, (Tool, ToolExecutorFn)>>>,
}

impl ToolRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new(client: FredClient) -> Self {
        Self {
            client,
            tools: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a registry holding every FRED, GeoFRED and v2 tool
    #[must_use]
    pub fn with_fred_tools(client: FredClient) -> Self {
        let registry = Self::new(client);
        for (tool, handler) in crate::all_tools() {
            registry.register(tool, handler);
        }
        registry
    }

    /// Client shared by all registered tools
    #[must_use]
    pub const fn client(&self) -> &FredClient {
        &self.client
    }

    /// Register a tool, wrapping its handler in the error boundary
    ///
    /// If a tool with the same name already exists, it is replaced and this
    /// returns `true`.
    pub fn register(&self, tool: Tool, handler: ToolHandlerFn) -> bool {
        let executor = boundary::wrap(&tool.name, self.client.clone(), handler);
        let mut tools = self.tools.write().unwrap_or_else(PoisonError::into_inner);
        tools.insert(tool.name.clone(), (tool, executor)).is_some()
    }

    /// Execute a tool by name
    ///
    /// Always yields a JSON object unless shutdown interrupted the call. An
    /// unknown name yields a `validation_error` payload.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`](crate::Cancelled) when shutdown interrupts the call.
    pub async fn execute(&self, name: &str, args: serde_json::Value) -> ToolOutcome {
        // Get executor (release lock quickly)
        let executor = {
            let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
            tools.get(name).map(|(_, executor)| Arc::clone(executor))
        };

        match executor {
            Some(executor) => executor(args).await,
            None => Ok(ErrorPayload::validation(format!("Unknown tool: {name}")).into_object()),
        }
    }

    /// Registered tool names, sorted
    #[must_use]
    pub fn list_tools(&self) -> Vec<String> {
        let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Registered tool definitions sorted by name (for `tools/list`)
    #[must_use]
    pub fn get_tools(&self) -> Vec<Tool> {
        let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        let mut tool_list: Vec<Tool> = tools.values().map(|(tool, _)| tool.clone()).collect();
        tool_list.sort_by(|a, b| a.name.cmp(&b.name));
        tool_list
    }

    /// A specific tool definition
    #[must_use]
    pub fn get_tool(&self, name: &str) -> Option<Tool> {
        let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        tools.get(name).map(|(tool, _)| tool.clone())
    }

    /// Number of registered tools
    #[must_use]
    pub fn count(&self) -> usize {
        let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        tools.len()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.list_tools())
            .finish_non_exhaustive()
    }
}
