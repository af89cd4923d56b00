//! Client configuration
//!
//! [`FredConfig`] carries the credential, the three upstream base URLs, the
//! per-attempt timeout and the [`RetryPolicy`]. Production code builds it
//! with [`FredConfig::from_env`]; tests point the base URLs at a mock
//! server through the builder methods.

use crate::error::FredError;
use std::time::Duration;

/// FRED API v1 base URL
pub const FRED_API_BASE: &str = "https://api.stlouisfed.org/fred";
/// GeoFRED maps API base URL
pub const GEOFRED_API_BASE: &str = "https://api.stlouisfed.org/geofred";
/// FRED API v2 base URL
pub const FRED_V2_API_BASE: &str = "https://api.stlouisfed.org/fred/v2";

/// Environment variable holding the API key
pub const API_KEY_ENV_VAR: &str = "FRED_API_KEY";

/// Per-attempt request timeout
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
/// Retries after the first attempt
pub const HTTP_MAX_RETRIES: u32 = 3;
/// First exponential backoff delay
pub const BACKOFF_BASE: Duration = Duration::from_millis(500);
/// Cap for both exponential backoff and `Retry-After`
pub const BACKOFF_MAX: Duration = Duration::from_secs(8);
/// Statuses treated as transient
pub const RETRYABLE_STATUS_CODES: [u16; 5] = [429, 500, 502, 503, 504];

/// Retry policy for upstream requests
///
/// # Default Values
///
/// - `max_retries`: 3 (4 attempts in total)
/// - `backoff_base`: 500ms
/// - `backoff_max`: 8 seconds
/// - `retryable_status_codes`: 429, 500, 502, 503, 504
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry, doubled for each following one
    pub backoff_base: Duration,
    /// Upper bound for any single delay
    pub backoff_max: Duration,
    /// HTTP statuses eligible for retry
    pub retryable_status_codes: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: HTTP_MAX_RETRIES,
            backoff_base: BACKOFF_BASE,
            backoff_max: BACKOFF_MAX,
            retryable_status_codes: RETRYABLE_STATUS_CODES.to_vec(),
        }
    }
}

impl RetryPolicy {
    /// Total attempts, first one included
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Whether `status` is transient under this policy
    #[must_use]
    pub fn is_retryable(&self, status: u16) -> bool {
        self.retryable_status_codes.contains(&status)
    }

    /// Exponential delay after the given 1-indexed attempt
    ///
    /// `backoff_base * 2^(attempt - 1)`, capped at `backoff_max`.
    #[must_use]
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 1_u32
            .checked_shl(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.backoff_base.saturating_mul(factor).min(self.backoff_max)
    }

    /// Parse a numeric `Retry-After` value, clamped to `[0, backoff_max]`
    ///
    /// Returns `None` for anything that is not a number (HTTP dates included).
    #[must_use]
    pub fn retry_after_delay(&self, header: &str) -> Option<Duration> {
        let seconds = header.trim().parse::<f64>().ok()?;
        if seconds.is_nan() {
            return None;
        }
        let capped = seconds.clamp(0.0, self.backoff_max.as_secs_f64());
        Some(Duration::from_secs_f64(capped))
    }

    /// Delay before retrying after `attempt`, honouring a server hint
    #[must_use]
    pub fn delay_for(&self, attempt: u32, retry_after: Option<&str>) -> Duration {
        retry_after
            .and_then(|value| self.retry_after_delay(value))
            .unwrap_or_else(|| self.backoff_delay(attempt))
    }
}

/// Configuration shared by every call made through a client
#[derive(Clone)]
pub struct FredConfig {
    api_key: Option<String>,
    /// Base URL for FRED v1 calls
    pub fred_base_url: String,
    /// Base URL for GeoFRED calls
    pub geofred_base_url: String,
    /// Base URL for FRED v2 calls
    pub fred_v2_base_url: String,
    /// Timeout applied to each individual attempt
    pub timeout: Duration,
    /// Retry behaviour for transient failures
    pub retry: RetryPolicy,
}

impl FredConfig {
    /// Create a config with an explicit API key and default endpoints
    ///
    /// The key is trimmed; a blank key is stored as missing.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_optional_key(Some(api_key.into()))
    }

    /// Create a config from `FRED_API_KEY`
    ///
    /// A missing variable is not an error here: every call reports it as a
    /// validation failure before touching the network.
    #[must_use]
    pub fn from_env() -> Self {
        Self::with_optional_key(std::env::var(API_KEY_ENV_VAR).ok())
    }

    fn with_optional_key(api_key: Option<String>) -> Self {
        let api_key = api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());
        Self {
            api_key,
            fred_base_url: FRED_API_BASE.to_string(),
            geofred_base_url: GEOFRED_API_BASE.to_string(),
            fred_v2_base_url: FRED_V2_API_BASE.to_string(),
            timeout: HTTP_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }

    /// The configured API key
    ///
    /// # Errors
    ///
    /// Returns `FredError::Validation` when no non-blank key is configured.
    pub fn api_key(&self) -> Result<&str, FredError> {
        self.api_key.as_deref().ok_or_else(|| {
            FredError::Validation(format!("Missing {API_KEY_ENV_VAR} environment variable"))
        })
    }

    /// Whether a usable API key is present
    #[must_use]
    pub const fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Builder: point all three upstreams under one root (tests, proxies)
    ///
    /// Produces `{root}/fred`, `{root}/geofred` and `{root}/fred/v2`.
    #[must_use]
    pub fn with_base_root(mut self, root: &str) -> Self {
        let root = root.trim_end_matches('/');
        self.fred_base_url = format!("{root}/fred");
        self.geofred_base_url = format!("{root}/geofred");
        self.fred_v2_base_url = format!("{root}/fred/v2");
        self
    }

    /// Builder: set the per-attempt timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder: set the retry policy
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

impl std::fmt::Debug for FredConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FredConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("fred_base_url", &self.fred_base_url)
            .field("geofred_base_url", &self.geofred_base_url)
            .field("fred_v2_base_url", &self.fred_v2_base_url)
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;

    #[test]
    fn test_backoff_sequence() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.backoff_delay(1), Duration::from_millis(500));
        assert_eq!(policy.backoff_delay(2), Duration::from_secs(1));
        assert_eq!(policy.backoff_delay(3), Duration::from_secs(2));
        assert_eq!(policy.backoff_delay(4), Duration::from_secs(4));
        assert_eq!(policy.backoff_delay(5), Duration::from_secs(8));
        assert_eq!(policy.backoff_delay(40), Duration::from_secs(8));
    }

    #[test]
    fn test_retry_after_is_clamped() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.retry_after_delay("2"), Some(Duration::from_secs(2)));
        assert_eq!(policy.retry_after_delay(" 1.5 "), Some(Duration::from_millis(1500)));
        assert_eq!(policy.retry_after_delay("120"), Some(Duration::from_secs(8)));
        assert_eq!(policy.retry_after_delay("-4"), Some(Duration::ZERO));
        assert_eq!(policy.retry_after_delay("NaN"), None);
        assert_eq!(policy.retry_after_delay("Wed, 21 Oct 2015 07:28:00 GMT"), None);
    }

    #[test]
    fn test_delay_for_prefers_hint() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.delay_for(1, Some("3")), Duration::from_secs(3));
        assert_eq!(policy.delay_for(3, Some("soon")), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2, None), Duration::from_secs(1));
    }

    #[test]
    fn test_retryable_statuses() {
        let policy = RetryPolicy::default();

        for status in [429, 500, 502, 503, 504] {
            assert!(policy.is_retryable(status));
        }
        for status in [400, 401, 403, 404, 408, 501] {
            assert!(!policy.is_retryable(status));
        }
        assert_eq!(policy.max_attempts(), 4);
    }

    #[test]
    fn test_blank_key_is_missing() {
        let config = FredConfig::new("   ");
        assert!(!config.has_api_key());
        let err = config.api_key().unwrap_err();
        assert_eq!(err.to_string(), "Missing FRED_API_KEY environment variable");
    }

    #[test]
    fn test_key_is_trimmed() {
        let config = FredConfig::new("  abc123\n");
        assert_eq!(config.api_key().unwrap(), "abc123");
    }

    #[test]
    fn test_base_root() {
        let config = FredConfig::new("k").with_base_root("http://127.0.0.1:9999/");
        assert_eq!(config.fred_base_url, "http://127.0.0.1:9999/fred");
        assert_eq!(config.geofred_base_url, "http://127.0.0.1:9999/geofred");
        assert_eq!(config.fred_v2_base_url, "http://127.0.0.1:9999/fred/v2");
    }

    #[test]
    fn test_debug_hides_key() {
        let rendered = format!("{:?}", FredConfig::new("super-secret"));
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("***"));
    }
}
