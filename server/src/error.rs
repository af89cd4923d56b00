//! Server error types

use thiserror::Error;

/// Errors that end the server loop
#[derive(Debug, Error)]
pub enum ServerError {
    /// Reading stdin or writing stdout failed
    #[error("stdio transport failed: {0}")]
    Io(#[from] std::io::Error),

    /// A response could not be serialised
    #[error("failed to serialise response: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A spawned task panicked or was aborted
    #[error("server task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Logging could not be installed
    #[error("failed to initialise tracing: {0}")]
    Telemetry(String),
}
