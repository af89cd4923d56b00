//! Resilient fetch engine
//!
//! [`FredClient::fetch_json`] issues one logical GET against an upstream
//! base URL and resolves to either a decoded JSON object or a
//! [`FredError`]. Transient failures (retryable statuses, transport
//! errors) are retried with backoff; everything else is terminal.
//!
//! ```text
//! attempting ──2xx + JSON object──────────────▶ succeeded
//!     │  ▲
//!     │  └──────── backoff sleep ◀── retrying
//!     │                                ▲
//!     ├──retryable status / transport──┘   (attempts remain)
//!     └──non-retryable status, bad JSON, exhausted──▶ failed-terminal
//! ```

use crate::config::FredConfig;
use crate::error::{ErrorCode, ErrorPayload, FredError};
use crate::pool::HttpPool;
use crate::redact::{API_KEY_PARAM, redact_api_key_text, sanitize_log_params};
use crate::sleeper::{Sleeper, TokioSleeper};
use crate::validation::clean_params;
use crate::JsonObject;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

/// One outgoing GET, built fresh per call
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    /// Upstream base URL
    pub base_url: String,
    /// Endpoint path without leading/trailing slashes
    pub endpoint: String,
    /// Query string pairs, credential included when sent as a parameter
    pub query: Vec<(String, String)>,
    /// Extra request headers
    pub headers: HeaderMap,
}

impl RequestDescriptor {
    /// Full request URL without the query string
    #[must_use]
    pub fn url(&self) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), self.endpoint)
    }
}

/// Result of a single attempt, before retry classification
enum Attempt {
    Body(String),
    Status {
        status: u16,
        retry_after: Option<String>,
    },
    Transport(reqwest::Error),
}

struct Inner {
    config: FredConfig,
    pool: HttpPool,
    sleeper: Arc<dyn Sleeper>,
    shutdown: CancellationToken,
}

/// Handle to the FRED access layer
///
/// Cheap to clone; all clones share one connection pool, one sleeper and
/// one shutdown token.
#[derive(Clone)]
pub struct FredClient {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for FredClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FredClient")
            .field("config", &self.inner.config)
            .field("cancelled", &self.inner.shutdown.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl FredClient {
    /// Create a client with the real tokio sleeper and a fresh shutdown token
    #[must_use]
    pub fn new(config: FredConfig) -> Self {
        Self::builder(config).build()
    }

    /// Create a client with API key and endpoints from the environment
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(FredConfig::from_env())
    }

    /// Start building a client
    #[must_use]
    pub fn builder(config: FredConfig) -> FredClientBuilder {
        FredClientBuilder {
            config,
            sleeper: None,
            shutdown: None,
        }
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &FredConfig {
        &self.inner.config
    }

    /// Shared connection pool
    #[must_use]
    pub fn pool(&self) -> &HttpPool {
        &self.inner.pool
    }

    /// Token that aborts in-flight requests and backoff sleeps when cancelled
    #[must_use]
    pub fn shutdown_token(&self) -> CancellationToken {
        self.inner.shutdown.clone()
    }

    /// Cancel in-flight work and drain the connection pool
    pub async fn shutdown(&self) {
        self.inner.shutdown.cancel();
        self.inner.pool.reset().await;
    }

    /// Fetch a JSON object from `base_url/endpoint`
    ///
    /// `params` are cleaned, `file_type=json` is forced, and when
    /// `include_api_key_in_query` is set the credential is added as the
    /// `api_key` query parameter. Otherwise the caller is expected to have
    /// put it in `headers`.
    ///
    /// # Errors
    ///
    /// - `FredError::Validation` when no API key is configured (no I/O happens)
    /// - `FredError::Upstream` with code `upstream_http_error`,
    ///   `upstream_network_error`, `upstream_invalid_json` or
    ///   `upstream_invalid_payload`
    /// - `FredError::Cancelled` if the shutdown token fires mid-call
    /// - `FredError::Internal` if the HTTP client cannot be built
    pub async fn fetch_json(
        &self,
        base_url: &str,
        endpoint: &str,
        params: JsonObject,
        headers: Option<HeaderMap>,
        include_api_key_in_query: bool,
    ) -> Result<JsonObject, FredError> {
        let api_key = self.inner.config.api_key()?;

        let mut query: Vec<(String, String)> = clean_params(params)
            .into_iter()
            .filter(|(key, _)| key != API_KEY_PARAM && key != "file_type")
            .map(|(key, value)| (key, query_value(&value)))
            .collect();
        if include_api_key_in_query {
            query.push((API_KEY_PARAM.to_string(), api_key.to_string()));
        }
        query.push(("file_type".to_string(), "json".to_string()));

        let request = RequestDescriptor {
            base_url: base_url.to_string(),
            endpoint: endpoint.trim_matches('/').to_string(),
            query,
            headers: headers.unwrap_or_default(),
        };

        let client = self.inner.pool.get().await?;
        self.execute(&client, &request).await
    }

    async fn execute(
        &self,
        client: &reqwest::Client,
        request: &RequestDescriptor,
    ) -> Result<JsonObject, FredError> {
        let policy = &self.inner.config.retry;
        let max_attempts = policy.max_attempts();
        let safe_query = Value::Object(sanitize_log_params(&request.query));
        let url = request.url();

        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            debug!(endpoint = %request.endpoint, attempt, "Sending upstream request");

            match self.attempt_once(client, &url, request).await? {
                Attempt::Body(body) => return decode_object(request, &body, attempt, &safe_query),

                Attempt::Status { status, retry_after } => {
                    let retryable = policy.is_retryable(status);
                    if retryable && attempt < max_attempts {
                        let delay = policy.delay_for(attempt, retry_after.as_deref());
                        warn!(
                            base_url = %request.base_url,
                            endpoint = %request.endpoint,
                            status_code = status,
                            attempt,
                            delay_seconds = delay.as_secs_f64(),
                            query = %safe_query,
                            "Retrying upstream HTTP error"
                        );
                        self.pause(delay).await?;
                        continue;
                    }

                    error!(
                        base_url = %request.base_url,
                        endpoint = %request.endpoint,
                        status_code = status,
                        retryable,
                        attempt,
                        query = %safe_query,
                        "Upstream HTTP request failed"
                    );
                    return Err(ErrorPayload::new(
                        format!("Upstream request failed with status {status}"),
                        ErrorCode::UpstreamHttpError,
                    )
                    .with_base_url(request.base_url.as_str())
                    .with_endpoint(&request.endpoint)
                    .with_status_code(status)
                    .with_retryable(retryable)
                    .with_detail("attempt", attempt)
                    .into());
                }

                Attempt::Transport(err) => {
                    let reason = redact_api_key_text(&err.to_string());
                    if attempt < max_attempts {
                        let delay = policy.backoff_delay(attempt);
                        warn!(
                            base_url = %request.base_url,
                            endpoint = %request.endpoint,
                            attempt,
                            delay_seconds = delay.as_secs_f64(),
                            query = %safe_query,
                            reason = %reason,
                            "Retrying upstream network error"
                        );
                        self.pause(delay).await?;
                        continue;
                    }

                    error!(
                        base_url = %request.base_url,
                        endpoint = %request.endpoint,
                        attempt,
                        query = %safe_query,
                        reason = %reason,
                        "Upstream network request failed"
                    );
                    return Err(ErrorPayload::new(
                        "Network error while contacting upstream API",
                        ErrorCode::UpstreamNetworkError,
                    )
                    .with_base_url(request.base_url.as_str())
                    .with_endpoint(&request.endpoint)
                    .with_retryable(true)
                    .with_detail("attempt", attempt)
                    .with_detail("reason", reason)
                    .into());
                }
            }
        }
    }

    async fn attempt_once(
        &self,
        client: &reqwest::Client,
        url: &str,
        request: &RequestDescriptor,
    ) -> Result<Attempt, FredError> {
        let sent = self
            .cancellable(
                client
                    .get(url)
                    .query(&request.query)
                    .headers(request.headers.clone())
                    .send(),
            )
            .await?;

        let response = match sent {
            Ok(response) => response,
            Err(err) => return Ok(Attempt::Transport(err)),
        };

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);
            return Ok(Attempt::Status {
                status: status.as_u16(),
                retry_after,
            });
        }

        match self.cancellable(response.text()).await? {
            Ok(body) => Ok(Attempt::Body(body)),
            Err(err) => Ok(Attempt::Transport(err)),
        }
    }

    /// Backoff wait that gives way to shutdown
    async fn pause(&self, delay: Duration) -> Result<(), FredError> {
        self.cancellable(self.inner.sleeper.sleep(delay)).await
    }

    async fn cancellable<F: Future>(&self, future: F) -> Result<F::Output, FredError> {
        tokio::select! {
            biased;
            () = self.inner.shutdown.cancelled() => Err(FredError::Cancelled),
            output = future => Ok(output),
        }
    }
}

/// Builder for [`FredClient`]
pub struct FredClientBuilder {
    config: FredConfig,
    sleeper: Option<Arc<dyn Sleeper>>,
    shutdown: Option<CancellationToken>,
}

impl FredClientBuilder {
    /// Use a custom sleeper for backoff waits
    #[must_use]
    pub fn sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = Some(sleeper);
        self
    }

    /// Tie the client to an existing shutdown token
    #[must_use]
    pub fn shutdown_token(mut self, token: CancellationToken) -> Self {
        self.shutdown = Some(token);
        self
    }

    /// Build the [`FredClient`]
    #[must_use]
    pub fn build(self) -> FredClient {
        let pool = HttpPool::new(self.config.timeout);
        FredClient {
            inner: Arc::new(Inner {
                config: self.config,
                pool,
                sleeper: self.sleeper.unwrap_or_else(|| Arc::new(TokioSleeper)),
                shutdown: self.shutdown.unwrap_or_default(),
            }),
        }
    }
}

/// Render one cleaned parameter value for the query string
fn query_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Decode a 2xx body; anything but a JSON object is terminal
fn decode_object(
    request: &RequestDescriptor,
    body: &str,
    attempt: u32,
    safe_query: &Value,
) -> Result<JsonObject, FredError> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(_) => {
            error!(
                base_url = %request.base_url,
                endpoint = %request.endpoint,
                attempt,
                query = %safe_query,
                "Upstream response was not a JSON object"
            );
            Err(ErrorPayload::new(
                "Upstream response was not a JSON object",
                ErrorCode::UpstreamInvalidPayload,
            )
            .with_base_url(request.base_url.as_str())
            .with_endpoint(&request.endpoint)
            .with_detail("attempt", attempt)
            .into())
        }
        Err(err) => {
            error!(
                base_url = %request.base_url,
                endpoint = %request.endpoint,
                attempt,
                query = %safe_query,
                "Upstream response JSON decode failed"
            );
            Err(ErrorPayload::new(
                "Failed to decode upstream JSON response",
                ErrorCode::UpstreamInvalidJson,
            )
            .with_base_url(request.base_url.as_str())
            .with_endpoint(&request.endpoint)
            .with_detail("attempt", attempt)
            .with_detail("reason", err.to_string())
            .into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_value_rendering() {
        assert_eq!(query_value(&json!("GDP")), "GDP");
        assert_eq!(query_value(&json!(20)), "20");
        assert_eq!(query_value(&json!(1.5)), "1.5");
        assert_eq!(query_value(&json!("true")), "true");
    }

    #[test]
    fn test_descriptor_url() {
        let request = RequestDescriptor {
            base_url: "https://api.stlouisfed.org/fred/".to_string(),
            endpoint: "series/observations".to_string(),
            query: Vec::new(),
            headers: HeaderMap::new(),
        };
        assert_eq!(request.url(), "https://api.stlouisfed.org/fred/series/observations");
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_pool_is_built() {
        let client = FredClient::new(FredConfig::new(" "));
        let result = client
            .fetch_json("http://127.0.0.1:9", "series", JsonObject::new(), None, true)
            .await;

        assert!(matches!(result, Err(FredError::Validation(_))));
        assert!(!client.pool().is_initialized().await);
    }

    #[tokio::test]
    async fn test_cancelled_client_never_reports_payload() {
        let client = FredClient::new(FredConfig::new("key"));
        client.shutdown_token().cancel();

        let result = client
            .fetch_json("http://127.0.0.1:9", "series", JsonObject::new(), None, true)
            .await;

        assert!(matches!(result, Err(FredError::Cancelled)));
    }
}
