//! Backoff sleeping
//!
//! Every retry wait goes through a [`Sleeper`] so tests can observe the
//! computed delays without actually waiting.

use futures::future::BoxFuture;
use std::time::Duration;

/// Source of backoff waits
pub trait Sleeper: Send + Sync {
    /// Wait for `duration`
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()>;
}

/// Real sleeper backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep(duration))
    }
}
