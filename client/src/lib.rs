//! # FRED access layer
//!
//! Resilient HTTP client for the FRED v1, GeoFRED and FRED v2 APIs.
//!
//! ## Example
//!
//! ```no_run
//! use fred_mcp_client::{FredClient, JsonObject};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads FRED_API_KEY
//!     let client = FredClient::from_env();
//!
//!     let mut params = JsonObject::new();
//!     params.insert("series_id".into(), "GDP".into());
//!
//!     let series = client.fred_get("series", params).await?;
//!     println!("{series:?}");
//!
//!     client.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - One lazily-built, shared connection pool per client
//! - `api_key` as query parameter (v1, GeoFRED) or header (v2)
//! - Retry with exponential backoff honouring `Retry-After`
//! - Structured [`ErrorPayload`] for every failure, credentials redacted
//! - Pure parameter normalisers in [`validation`]

pub mod client;
pub mod config;
pub mod error;
pub mod facade;
pub mod pool;
pub mod redact;
pub mod sleeper;
pub mod validation;

/// A decoded JSON object
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

// Re-export main types for convenience
pub use client::{FredClient, FredClientBuilder, RequestDescriptor};
pub use config::{
    FRED_API_BASE, FRED_V2_API_BASE, FredConfig, GEOFRED_API_BASE, HTTP_MAX_RETRIES, HTTP_TIMEOUT,
    RETRYABLE_STATUS_CODES, RetryPolicy,
};
pub use error::{ErrorCode, ErrorDetails, ErrorPayload, FredError};
pub use facade::{AuthScheme, Upstream};
pub use sleeper::{Sleeper, TokioSleeper};
pub use tokio_util::sync::CancellationToken;
