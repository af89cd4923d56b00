//! `fred-mcp` binary: serve the FRED tools on stdio

use fred_mcp_client::{CancellationToken, FredClient, FredConfig};
use fred_mcp_server::{Dispatcher, init_tracing, serve};
use fred_mcp_tools::ToolRegistry;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    init_tracing()?;

    let shutdown = CancellationToken::new();
    let client = FredClient::builder(FredConfig::from_env())
        .shutdown_token(shutdown.clone())
        .build();

    if !client.config().has_api_key() {
        warn!("FRED_API_KEY is not set; every upstream tool call will fail validation");
    }

    let registry = ToolRegistry::with_fred_tools(client.clone());
    info!(tools = registry.count(), "FRED MCP server starting on stdio");
    let dispatcher = Arc::new(Dispatcher::new(registry));

    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received");
            ctrl_c.cancel();
        }
    });

    let result = serve(dispatcher, tokio::io::stdin(), tokio::io::stdout(), shutdown).await;

    client.shutdown().await;
    info!("FRED MCP server stopped");

    result.map_err(Into::into)
}
