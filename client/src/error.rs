//! Error types for the FRED access layer
//!
//! Two layers live here:
//! - [`ErrorPayload`]: the canonical structured failure object every tool
//!   returns instead of raising.
//! - [`FredError`]: the internal error enum raised by the fetch engine and
//!   the tool implementations. The tool boundary is the only place that
//!   turns a `FredError` into an `ErrorPayload`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Machine-readable failure category carried in `error_details.code`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Bad local input, never retried
    ValidationError,
    /// Upstream answered with a failure status
    UpstreamHttpError,
    /// Transport-level failure (connect, DNS, timeout)
    UpstreamNetworkError,
    /// Upstream body was not valid JSON
    UpstreamInvalidJson,
    /// Upstream body was JSON but not an object
    UpstreamInvalidPayload,
    /// A single-entity lookup returned no entity
    NotFound,
    /// Unanticipated fault
    InternalError,
}

impl ErrorCode {
    /// Wire representation of this code
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ValidationError => "validation_error",
            Self::UpstreamHttpError => "upstream_http_error",
            Self::UpstreamNetworkError => "upstream_network_error",
            Self::UpstreamInvalidJson => "upstream_invalid_json",
            Self::UpstreamInvalidPayload => "upstream_invalid_payload",
            Self::NotFound => "not_found",
            Self::InternalError => "internal_error",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured context nested under `error_details`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Failure type (mirrors `code` for every failure this crate produces)
    #[serde(rename = "type")]
    pub error_type: ErrorCode,
    /// Failure code used for programmatic branching
    pub code: ErrorCode,
    /// Upstream base URL, absent for local failures
    pub base_url: Option<String>,
    /// Upstream endpoint path without leading/trailing slashes
    pub endpoint: Option<String>,
    /// HTTP status returned by upstream, if any
    pub status_code: Option<u16>,
    /// Whether retrying the same call later may succeed
    pub retryable: bool,
    /// Free-form extra context
    pub details: Map<String, Value>,
}

/// Canonical failure object returned by every tool
///
/// Serializes as:
///
/// ```json
/// {
///   "error": "Upstream request failed with status 503",
///   "error_details": {
///     "type": "upstream_http_error",
///     "code": "upstream_http_error",
///     "base_url": "https://api.stlouisfed.org/fred",
///     "endpoint": "series/observations",
///     "status_code": 503,
///     "retryable": true,
///     "details": {"attempt": 4}
///   }
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// Human-readable message
    pub error: String,
    /// Structured context
    pub error_details: ErrorDetails,
}

impl ErrorPayload {
    /// Create a payload with the given message and code
    ///
    /// The error type defaults to the code; everything else starts empty.
    #[must_use]
    pub fn new(message: impl Into<String>, code: ErrorCode) -> Self {
        Self {
            error: message.into(),
            error_details: ErrorDetails {
                error_type: code,
                code,
                base_url: None,
                endpoint: None,
                status_code: None,
                retryable: false,
                details: Map::new(),
            },
        }
    }

    /// Payload for a local input-validation failure
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(message, ErrorCode::ValidationError)
    }

    /// Builder: override the error type
    #[must_use]
    pub const fn with_type(mut self, error_type: ErrorCode) -> Self {
        self.error_details.error_type = error_type;
        self
    }

    /// Builder: set the upstream base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.error_details.base_url = Some(base_url.into());
        self
    }

    /// Builder: set the endpoint, stripping leading/trailing `/`
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        let trimmed = endpoint.trim_matches('/');
        self.error_details.endpoint = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    /// Builder: set the upstream HTTP status
    #[must_use]
    pub const fn with_status_code(mut self, status_code: u16) -> Self {
        self.error_details.status_code = Some(status_code);
        self
    }

    /// Builder: mark the failure retryable or not
    #[must_use]
    pub const fn with_retryable(mut self, retryable: bool) -> Self {
        self.error_details.retryable = retryable;
        self
    }

    /// Builder: add one entry to `error_details.details`
    #[must_use]
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.error_details.details.insert(key.into(), value.into());
        self
    }

    /// Failure code shortcut
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.error_details.code
    }

    /// Render as a JSON object, the shape tools hand back to callers
    #[must_use]
    pub fn into_object(self) -> Map<String, Value> {
        let ErrorDetails {
            error_type,
            code,
            base_url,
            endpoint,
            status_code,
            retryable,
            details,
        } = self.error_details;

        let mut inner = Map::new();
        inner.insert("type".into(), Value::from(error_type.as_str()));
        inner.insert("code".into(), Value::from(code.as_str()));
        inner.insert("base_url".into(), base_url.map_or(Value::Null, Value::from));
        inner.insert("endpoint".into(), endpoint.map_or(Value::Null, Value::from));
        inner.insert("status_code".into(), status_code.map_or(Value::Null, Value::from));
        inner.insert("retryable".into(), Value::Bool(retryable));
        inner.insert("details".into(), Value::Object(details));

        let mut outer = Map::new();
        outer.insert("error".into(), Value::String(self.error));
        outer.insert("error_details".into(), Value::Object(inner));
        outer
    }
}

/// Errors raised inside the access layer and tool implementations
#[derive(Debug, Error)]
pub enum FredError {
    /// Local input or configuration problem
    #[error("{0}")]
    Validation(String),

    /// Upstream failure with its payload already built by the fetch engine
    #[error("{}", .0.error)]
    Upstream(Box<ErrorPayload>),

    /// Shutdown requested while a call was suspended
    #[error("operation cancelled by shutdown")]
    Cancelled,

    /// Unanticipated fault; `kind` is safe to show, `message` is not
    #[error("internal fault ({kind}): {message}")]
    Internal {
        /// Category name of the fault
        kind: String,
        /// Raw fault text, for server-side logs only
        message: String,
    },
}

impl FredError {
    /// Wrap an arbitrary error as an internal fault, keeping its type name
    #[must_use]
    pub fn internal<E: std::error::Error>(err: &E) -> Self {
        Self::Internal {
            kind: short_type_name::<E>().to_string(),
            message: err.to_string(),
        }
    }

    /// Wrap an already-built payload
    #[must_use]
    pub fn upstream(payload: ErrorPayload) -> Self {
        Self::Upstream(Box::new(payload))
    }
}

impl From<ErrorPayload> for FredError {
    fn from(payload: ErrorPayload) -> Self {
        Self::upstream(payload)
    }
}

fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)] // Test code
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_defaults() {
        let payload = ErrorPayload::validation("bad input");

        assert_eq!(payload.error, "bad input");
        assert_eq!(payload.code(), ErrorCode::ValidationError);
        assert_eq!(payload.error_details.error_type, ErrorCode::ValidationError);
        assert_eq!(payload.error_details.base_url, None);
        assert_eq!(payload.error_details.endpoint, None);
        assert!(!payload.error_details.retryable);
        assert!(payload.error_details.details.is_empty());
    }

    #[test]
    fn test_endpoint_is_stripped_of_slashes() {
        let payload = ErrorPayload::new("x", ErrorCode::UpstreamHttpError)
            .with_endpoint("/series/observations/");
        assert_eq!(
            payload.error_details.endpoint.as_deref(),
            Some("series/observations")
        );

        let empty = ErrorPayload::new("x", ErrorCode::UpstreamHttpError).with_endpoint("//");
        assert_eq!(empty.error_details.endpoint, None);
    }

    #[test]
    fn test_into_object_shape() {
        let object = ErrorPayload::new(
            "Upstream request failed with status 503",
            ErrorCode::UpstreamHttpError,
        )
        .with_base_url("https://api.stlouisfed.org/fred")
        .with_endpoint("series")
        .with_status_code(503)
        .with_retryable(true)
        .with_detail("attempt", 4)
        .into_object();

        assert_eq!(
            Value::Object(object),
            json!({
                "error": "Upstream request failed with status 503",
                "error_details": {
                    "type": "upstream_http_error",
                    "code": "upstream_http_error",
                    "base_url": "https://api.stlouisfed.org/fred",
                    "endpoint": "series",
                    "status_code": 503,
                    "retryable": true,
                    "details": {"attempt": 4}
                }
            })
        );
    }

    #[test]
    fn test_into_object_matches_serde() {
        let payload = ErrorPayload::new("gone", ErrorCode::NotFound).with_endpoint("category");
        let via_serde = serde_json::to_value(&payload).unwrap();
        assert_eq!(via_serde, Value::Object(payload.into_object()));
    }

    #[test]
    fn test_internal_keeps_type_name_only() {
        let err = serde_json::from_str::<Value>("{").unwrap_err();
        match FredError::internal(&err) {
            FredError::Internal { kind, .. } => assert_eq!(kind, "Error"),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_upstream_display_uses_message() {
        let err = FredError::upstream(ErrorPayload::new("boom", ErrorCode::UpstreamInvalidJson));
        assert_eq!(err.to_string(), "boom");
    }
}
