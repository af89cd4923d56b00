//! # FRED MCP Server
//!
//! Exposes the FRED tool catalogue to MCP clients over line-delimited
//! JSON-RPC on stdio.
//!
//! ## Example
//!
//! ```no_run
//! use fred_mcp_client::{CancellationToken, FredClient};
//! use fred_mcp_server::{Dispatcher, serve};
//! use fred_mcp_tools::ToolRegistry;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = FredClient::from_env();
//! let dispatcher = Arc::new(Dispatcher::new(ToolRegistry::with_fred_tools(client.clone())));
//!
//! serve(dispatcher, tokio::io::stdin(), tokio::io::stdout(), CancellationToken::new()).await?;
//! client.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod dispatch;
pub mod error;
pub mod protocol;
pub mod telemetry;
pub mod transport;

pub use dispatch::{Dispatcher, call_result};
pub use error::ServerError;
pub use protocol::{Request, Response, RpcError};
pub use telemetry::init_tracing;
pub use transport::serve;
