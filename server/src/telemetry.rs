//! Logging setup
//!
//! stdout carries the protocol, so every log line goes to stderr.

use crate::error::ServerError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str =
    "fred_mcp=info,fred_mcp_server=info,fred_mcp_client=info,fred_mcp_tools=info";

/// Install the global subscriber
///
/// # Errors
///
/// Returns `ServerError::Telemetry` if a subscriber is already installed.
pub fn init_tracing() -> Result<(), ServerError> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .map_err(|e| ServerError::Telemetry(e.to_string()))
}
