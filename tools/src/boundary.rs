//! Error boundary around every tool call
//!
//! [`guard`] is the single place where a [`FredError`] becomes a value the
//! caller sees. Upstream failures are returned as their prebuilt payload,
//! validation failures get a `validation_error` payload, and anything
//! unanticipated (internal faults, panics) is logged in full here but
//! reaches the caller only as `internal_error` plus a category name.
//! Cancellation is never turned into a payload.

use crate::types::{Cancelled, ToolHandlerFn, ToolExecutorFn, ToolOutcome};
use fred_mcp_client::{ErrorCode, ErrorPayload, FredClient, FredError, JsonObject};
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::error;

/// Message shown to callers for any unanticipated fault
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Run one tool call and resolve it to a caller-facing object
///
/// # Errors
///
/// Returns [`Cancelled`] only when the call was interrupted by shutdown.
pub async fn guard<F>(tool: &str, call: F) -> ToolOutcome
where
    F: Future<Output = Result<JsonObject, FredError>> + Send,
{
    match AssertUnwindSafe(call).catch_unwind().await {
        Ok(Ok(result)) => Ok(result),
        Ok(Err(err)) => resolve(tool, err),
        Err(panic) => {
            error!(tool, panic = %panic_message(panic.as_ref()), "Unhandled tool error");
            Ok(internal_payload("panic"))
        }
    }
}

/// Wrap a handler so every invocation goes through [`guard`]
#[must_use]
pub fn wrap(name: &str, client: FredClient, handler: ToolHandlerFn) -> ToolExecutorFn {
    let name: Arc<str> = Arc::from(name);
    Arc::new(move |args| {
        let name = Arc::clone(&name);
        let call = handler(client.clone(), args);
        Box::pin(async move { guard(&name, call).await })
    })
}

fn resolve(tool: &str, err: FredError) -> ToolOutcome {
    match err {
        FredError::Cancelled => Err(Cancelled),
        FredError::Upstream(payload) => Ok(payload.into_object()),
        FredError::Validation(message) => Ok(ErrorPayload::validation(message).into_object()),
        FredError::Internal { kind, message } => {
            error!(tool, kind = %kind, message = %message, "Unhandled tool error");
            Ok(internal_payload(&kind))
        }
    }
}

fn internal_payload(kind: &str) -> JsonObject {
    ErrorPayload::new(INTERNAL_ERROR_MESSAGE, ErrorCode::InternalError)
        .with_detail("exception_type", kind)
        .into_object()
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(text) = panic.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = panic.downcast_ref::<String>() {
        text.clone()
    } else {
        "non-string panic".to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)] // Test code
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn object(value: Value) -> JsonObject {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_success_passes_through() {
        let outcome = guard("t", async { Ok(object(json!({"ok": true}))) }).await;
        assert_eq!(outcome.unwrap(), object(json!({"ok": true})));
    }

    #[tokio::test]
    async fn test_validation_becomes_payload() {
        let outcome = guard("t", async { Err(FredError::Validation("limit is bad".into())) }).await;
        let payload = Value::Object(outcome.unwrap());

        assert_eq!(payload["error"], "limit is bad");
        assert_eq!(payload["error_details"]["code"], "validation_error");
        assert_eq!(payload["error_details"]["type"], "validation_error");
        assert_eq!(payload["error_details"]["base_url"], Value::Null);
        assert_eq!(payload["error_details"]["endpoint"], Value::Null);
    }

    #[tokio::test]
    async fn test_upstream_payload_is_unwrapped() {
        let built = ErrorPayload::new(
            "Upstream request failed with status 404",
            ErrorCode::UpstreamHttpError,
        )
        .with_endpoint("series")
        .with_status_code(404);
        let expected = built.clone().into_object();

        let outcome = guard("t", async move { Err(FredError::upstream(built)) }).await;
        assert_eq!(outcome.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_internal_hides_message() {
        let outcome = guard("t", async {
            Err(FredError::Internal {
                kind: "KeyError".into(),
                message: "secret internals".into(),
            })
        })
        .await;
        let payload = Value::Object(outcome.unwrap());

        assert_eq!(payload["error"], INTERNAL_ERROR_MESSAGE);
        assert_eq!(payload["error_details"]["code"], "internal_error");
        assert_eq!(payload["error_details"]["details"]["exception_type"], "KeyError");
        assert!(!payload.to_string().contains("secret internals"));
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let outcome = guard("t", async {
            if Value::Null.is_null() {
                panic!("boom with details");
            }
            Ok(JsonObject::new())
        })
        .await;
        let payload = Value::Object(outcome.unwrap());

        assert_eq!(payload["error_details"]["code"], "internal_error");
        assert_eq!(payload["error_details"]["details"]["exception_type"], "panic");
        assert!(!payload.to_string().contains("boom"));
    }

    #[tokio::test]
    async fn test_cancellation_propagates() {
        let outcome = guard("t", async { Err(FredError::Cancelled) }).await;
        assert_eq!(outcome, Err(Cancelled));
    }
}
