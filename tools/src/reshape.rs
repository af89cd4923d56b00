//! Light reshaping of upstream payloads
//!
//! Only a handful of tools touch the payload: single-entity lookups unwrap
//! their one-element list, series listings are projected to a compact row,
//! and observation rows get the missing-value sentinel `"."` replaced by
//! `null`.

use fred_mcp_client::{ErrorCode, ErrorPayload, FredError, JsonObject};
use serde_json::Value;

/// Fields kept when compacting series rows
pub const COMPACT_SERIES_FIELDS: [&str; 7] = [
    "id",
    "title",
    "frequency",
    "units",
    "observation_start",
    "observation_end",
    "popularity",
];

/// Upstream marker for a missing observation value
pub const MISSING_VALUE: &str = ".";

/// Where a single-entity lookup was served from, for the not-found payload
#[derive(Debug, Clone, Copy)]
pub struct Lookup<'a> {
    /// Upstream base URL
    pub base_url: &'a str,
    /// Endpoint path
    pub endpoint: &'a str,
    /// Entity label used in the message, e.g. `Category 125`
    pub label: &'a str,
}

/// Take the first element of `payload[key]`, or fail with `not_found`
///
/// # Errors
///
/// Returns an upstream `not_found` payload when the list is missing or empty.
pub fn unwrap_single(
    mut payload: JsonObject,
    key: &str,
    lookup: Lookup<'_>,
) -> Result<JsonObject, FredError> {
    let first = match payload.remove(key) {
        Some(Value::Array(items)) => items.into_iter().next(),
        _ => None,
    };
    match first {
        Some(Value::Object(entity)) => Ok(entity),
        _ => Err(
            ErrorPayload::new(format!("{} not found", lookup.label), ErrorCode::NotFound)
                .with_base_url(lookup.base_url)
                .with_endpoint(lookup.endpoint)
                .into(),
        ),
    }
}

/// Project one series row onto [`COMPACT_SERIES_FIELDS`]
///
/// Absent fields are carried as `null` so every row has the same keys.
#[must_use]
pub fn compact_series_row(row: &Value) -> Value {
    let compact: JsonObject = COMPACT_SERIES_FIELDS
        .iter()
        .map(|field| ((*field).to_string(), row.get(*field).cloned().unwrap_or(Value::Null)))
        .collect();
    Value::Object(compact)
}

/// Compact every row of the `seriess` list in a listing payload
#[must_use]
pub fn compact_series_listing(mut payload: JsonObject) -> JsonObject {
    if let Some(Value::Array(rows)) = payload.get_mut("seriess") {
        for row in rows.iter_mut() {
            *row = compact_series_row(row);
        }
    }
    payload
}

/// `"."` becomes `null`; anything else is unchanged
#[must_use]
pub fn observation_value(value: Value) -> Value {
    match value {
        Value::String(text) if text == MISSING_VALUE => Value::Null,
        other => other,
    }
}

/// Reduce an observation row to `{date, value}` with the sentinel replaced
#[must_use]
pub fn observation_row(row: &Value) -> Value {
    let mut out = JsonObject::new();
    out.insert("date".into(), row.get("date").cloned().unwrap_or(Value::Null));
    out.insert(
        "value".into(),
        observation_value(row.get("value").cloned().unwrap_or(Value::Null)),
    );
    Value::Object(out)
}

/// Replace `"."` values inside every `observations` list, at any depth
///
/// Used for v2 payloads where observations are nested per series.
pub fn null_missing_observations(payload: &mut JsonObject) {
    for (key, child) in payload.iter_mut() {
        visit(key, child);
    }
}

fn visit(key: &str, value: &mut Value) {
    if key == "observations" {
        if let Value::Array(rows) = value {
            for row in rows.iter_mut() {
                if let Some(entry) = row.get_mut("value") {
                    *entry = observation_value(entry.take());
                }
            }
        }
        return;
    }
    match value {
        Value::Object(map) => null_missing_observations(map),
        Value::Array(items) => {
            for item in items.iter_mut() {
                if let Value::Object(map) = item {
                    null_missing_observations(map);
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)] // Test code
mod tests {
    use super::*;
    use serde_json::json;

    const LOOKUP: Lookup<'static> = Lookup {
        base_url: "https://api.stlouisfed.org/fred",
        endpoint: "category",
        label: "Category 125",
    };

    fn object(value: Value) -> JsonObject {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_unwrap_single() {
        let payload = object(json!({"categories": [{"id": 125, "name": "Trade Balance"}]}));
        let entity = unwrap_single(payload, "categories", LOOKUP).unwrap();
        assert_eq!(entity["name"], "Trade Balance");
    }

    #[test]
    fn test_unwrap_single_not_found() {
        for payload in [json!({"categories": []}), json!({}), json!({"categories": "x"})] {
            match unwrap_single(object(payload), "categories", LOOKUP) {
                Err(FredError::Upstream(payload)) => {
                    assert_eq!(payload.code(), ErrorCode::NotFound);
                    assert_eq!(payload.error, "Category 125 not found");
                    assert_eq!(payload.error_details.endpoint.as_deref(), Some("category"));
                    assert!(!payload.error_details.retryable);
                }
                other => panic!("expected not_found, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_compact_series() {
        let payload = object(json!({
            "count": 1,
            "seriess": [{"id": "GDP", "title": "GDP", "notes": "long", "units_short": "Bil."}]
        }));
        let compact = compact_series_listing(payload);

        assert_eq!(compact["count"], 1);
        assert_eq!(
            compact["seriess"][0],
            json!({
                "id": "GDP",
                "title": "GDP",
                "frequency": null,
                "units": null,
                "observation_start": null,
                "observation_end": null,
                "popularity": null
            })
        );
    }

    #[test]
    fn test_observation_row() {
        assert_eq!(
            observation_row(&json!({"date": "2024-01-01", "value": ".", "realtime_start": "x"})),
            json!({"date": "2024-01-01", "value": null})
        );
        assert_eq!(
            observation_row(&json!({"date": "2024-02-01", "value": "1.23"})),
            json!({"date": "2024-02-01", "value": "1.23"})
        );
    }

    #[test]
    fn test_nested_observations() {
        let mut payload = object(json!({
            "has_more": false,
            "series": [
                {"series_id": "A", "observations": [{"date": "2024-01-01", "value": "."}]},
                {"series_id": "B", "observations": [{"date": "2024-01-01", "value": "2.5"}]}
            ]
        }));
        null_missing_observations(&mut payload);

        assert_eq!(payload["series"][0]["observations"][0]["value"], Value::Null);
        assert_eq!(payload["series"][1]["observations"][0]["value"], "2.5");
        assert_eq!(payload["has_more"], false);
    }
}
