//! # FRED MCP Testing
//!
//! Testing utilities and helpers shared by the workspace crates.
//!
//! This crate provides:
//! - A recording [`Sleeper`](fred_mcp_client::Sleeper) so retry tests run
//!   instantly and can assert on backoff durations
//! - Client builders wired to a `wiremock` server
//! - Canned upstream response bodies
//!
//! ## Example
//!
//! ```ignore
//! use fred_mcp_testing::helpers::mock_client;
//! use wiremock::MockServer;
//!
//! #[tokio::test]
//! async fn test_series() {
//!     let server = MockServer::start().await;
//!     let (client, sleeper) = mock_client(&server);
//!     // mount mocks, call client.fred_get(...), inspect sleeper.delays()
//! }
//! ```

/// Mock implementations of client seams
pub mod mocks {
    use fred_mcp_client::Sleeper;
    use futures::future::BoxFuture;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Sleeper that records every requested delay and returns at once
    ///
    /// # Example
    ///
    /// ```
    /// use fred_mcp_testing::mocks::RecordingSleeper;
    /// use fred_mcp_client::Sleeper;
    /// use std::time::Duration;
    ///
    /// let sleeper = RecordingSleeper::new();
    /// futures::executor::block_on(sleeper.sleep(Duration::from_secs(8)));
    /// assert_eq!(sleeper.delays(), vec![Duration::from_secs(8)]);
    /// ```
    #[derive(Debug, Clone, Default)]
    pub struct RecordingSleeper {
        delays: Arc<Mutex<Vec<Duration>>>,
    }

    impl RecordingSleeper {
        /// Create an empty recorder
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Delays requested so far, in order
        #[must_use]
        pub fn delays(&self) -> Vec<Duration> {
            self.delays
                .lock()
                .map(|delays| delays.clone())
                .unwrap_or_default()
        }

        /// Delays in seconds, convenient for comparing against literals
        #[must_use]
        pub fn delay_seconds(&self) -> Vec<f64> {
            self.delays().iter().map(Duration::as_secs_f64).collect()
        }
    }

    impl Sleeper for RecordingSleeper {
        fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
            if let Ok(mut delays) = self.delays.lock() {
                delays.push(duration);
            }
            Box::pin(std::future::ready(()))
        }
    }

    /// Sleeper that never finishes, for exercising shutdown mid-backoff
    #[derive(Debug, Clone, Copy, Default)]
    pub struct StalledSleeper;

    impl Sleeper for StalledSleeper {
        fn sleep(&self, _duration: Duration) -> BoxFuture<'static, ()> {
            Box::pin(std::future::pending())
        }
    }
}

/// Test helpers and utilities
pub mod helpers {
    use crate::mocks::RecordingSleeper;
    use fred_mcp_client::{FredClient, FredConfig};
    use std::sync::Arc;
    use wiremock::MockServer;

    /// API key every mock client is configured with
    pub const TEST_API_KEY: &str = "test-fred-api-key";

    /// Config pointing all three upstreams at `server`
    #[must_use]
    pub fn mock_config(server: &MockServer) -> FredConfig {
        FredConfig::new(TEST_API_KEY).with_base_root(&server.uri())
    }

    /// Client bound to `server`, with a recording sleeper
    #[must_use]
    pub fn mock_client(server: &MockServer) -> (FredClient, RecordingSleeper) {
        client_with_config(mock_config(server))
    }

    /// Client for an arbitrary config, with a recording sleeper
    #[must_use]
    pub fn client_with_config(config: FredConfig) -> (FredClient, RecordingSleeper) {
        let sleeper = RecordingSleeper::new();
        let client = FredClient::builder(config)
            .sleeper(Arc::new(sleeper.clone()))
            .build();
        (client, sleeper)
    }

    /// Route test logs through the test harness writer
    pub fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }
}

/// Canned upstream response bodies
pub mod fixtures {
    use serde_json::{Value, json};

    /// A `series` lookup with one row
    #[must_use]
    pub fn gdp_series() -> Value {
        json!({
            "realtime_start": "2024-01-01",
            "realtime_end": "2024-01-01",
            "seriess": [gdp_series_row()]
        })
    }

    /// One full upstream series row
    #[must_use]
    pub fn gdp_series_row() -> Value {
        json!({
            "id": "GDP",
            "realtime_start": "2024-01-01",
            "realtime_end": "2024-01-01",
            "title": "Gross Domestic Product",
            "observation_start": "1947-01-01",
            "observation_end": "2023-10-01",
            "frequency": "Quarterly",
            "frequency_short": "Q",
            "units": "Billions of Dollars",
            "units_short": "Bil. of $",
            "seasonal_adjustment": "Seasonally Adjusted Annual Rate",
            "seasonal_adjustment_short": "SAAR",
            "last_updated": "2024-01-25 07:52:02-06",
            "popularity": 93,
            "notes": "BEA Account Code: A191RC"
        })
    }
}

// Re-export commonly used items
pub use helpers::{TEST_API_KEY, mock_client};
pub use mocks::RecordingSleeper;

#[cfg(test)]
mod tests {
    use super::*;
    use fred_mcp_client::Sleeper;
    use std::time::Duration;

    #[tokio::test]
    async fn test_recording_sleeper() {
        let sleeper = RecordingSleeper::new();
        sleeper.sleep(Duration::from_millis(500)).await;
        sleeper.sleep(Duration::from_secs(1)).await;
        assert_eq!(sleeper.delay_seconds(), vec![0.5, 1.0]);
    }
}
