//! Credential redaction for logs and error details

use serde_json::{Map, Value};
use std::sync::LazyLock;

use regex::Regex;

/// Query parameter and header name carrying the credential
pub const API_KEY_PARAM: &str = "api_key";

const MASK: &str = "***";

#[allow(clippy::expect_used)] // Literal pattern, checked by tests
static API_KEY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(api_key=)[^&\s]+").expect("valid api_key pattern"));

/// Mask whatever follows `api_key=` in free text (URLs in error messages)
#[must_use]
pub fn redact_api_key_text(text: &str) -> String {
    API_KEY_PATTERN
        .replace_all(text, format!("${{1}}{MASK}"))
        .into_owned()
}

/// Render a query snapshot for logs with the credential masked
#[must_use]
pub fn sanitize_log_params(query: &[(String, String)]) -> Map<String, Value> {
    query
        .iter()
        .map(|(key, value)| {
            let shown = if key == API_KEY_PARAM { MASK } else { value.as_str() };
            (key.clone(), Value::String(shown.to_string()))
        })
        .collect()
}
