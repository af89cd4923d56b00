//! Shared connection pool
//!
//! One `reqwest::Client` per [`HttpPool`], built on first use. Concurrent
//! first callers race on a mutex and re-check before constructing, so
//! exactly one client is ever built per generation. [`HttpPool::reset`]
//! drops the current client; the next call builds a fresh one.

use crate::error::FredError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

/// Lazily-initialised, resettable HTTP connection pool
#[derive(Debug)]
pub struct HttpPool {
    client: RwLock<Option<reqwest::Client>>,
    init: Mutex<()>,
    builds: AtomicU64,
    timeout: Duration,
}

impl HttpPool {
    /// Create an empty pool whose client will use `timeout` per request
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: RwLock::new(None),
            init: Mutex::new(()),
            builds: AtomicU64::new(0),
            timeout,
        }
    }

    /// Get the shared client, building it on first use
    ///
    /// `reqwest::Client` is reference-counted internally, so the returned
    /// handle shares connections with every other caller.
    ///
    /// # Errors
    ///
    /// Returns `FredError::Internal` if the TLS backend cannot be set up.
    pub async fn get(&self) -> Result<reqwest::Client, FredError> {
        if let Some(client) = self.client.read().await.as_ref() {
            return Ok(client.clone());
        }

        let _guard = self.init.lock().await;
        if let Some(client) = self.client.read().await.as_ref() {
            return Ok(client.clone());
        }

        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| FredError::internal(&e))?;
        *self.client.write().await = Some(client.clone());
        let generation = self.builds.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::debug!(
            generation,
            timeout_secs = self.timeout.as_secs_f64(),
            "HTTP pool initialised"
        );
        Ok(client)
    }

    /// Drop the current client so idle connections close
    ///
    /// Requests already holding a handle finish normally.
    pub async fn reset(&self) {
        let _guard = self.init.lock().await;
        if self.client.write().await.take().is_some() {
            tracing::debug!("HTTP pool reset");
        }
    }

    /// Whether a client is currently live
    pub async fn is_initialized(&self) -> bool {
        self.client.read().await.is_some()
    }

    /// Number of clients built over the pool's lifetime
    #[must_use]
    pub fn builds(&self) -> u64 {
        self.builds.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::sync::Barrier;

    #[tokio::test]
    async fn test_pool_is_lazy() {
        let pool = HttpPool::new(Duration::from_secs(30));
        assert!(!pool.is_initialized().await);

        pool.get().await.unwrap();
        assert!(pool.is_initialized().await);
        assert_eq!(pool.builds(), 1);
    }

    #[tokio::test]
    async fn test_reset_allows_rebuild() {
        let pool = HttpPool::new(Duration::from_secs(30));
        pool.get().await.unwrap();

        pool.reset().await;
        assert!(!pool.is_initialized().await);

        pool.get().await.unwrap();
        assert!(pool.is_initialized().await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_use_builds_once() {
        let pool = Arc::new(HttpPool::new(Duration::from_secs(30)));
        let start = Arc::new(Barrier::new(16));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let pool = Arc::clone(&pool);
                let start = Arc::clone(&start);
                tokio::spawn(async move {
                    start.wait().await;
                    pool.get().await.map(|_| ())
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert!(pool.is_initialized().await);
        assert_eq!(pool.builds(), 1);

        pool.get().await.unwrap();
        assert_eq!(pool.builds(), 1);

        pool.reset().await;
        assert_eq!(pool.builds(), 1);
        pool.get().await.unwrap();
        pool.get().await.unwrap();
        assert_eq!(pool.builds(), 2);
    }
}
