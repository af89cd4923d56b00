//! Argument decoding and query building shared by the tool modules

use crate::types::{ToolHandlerFn, ToolResult};
use fred_mcp_client::validation::{
    OrderByEndpoint, clamp_limit, normalize_offset, normalize_order_by, normalize_sort_order_or,
};
use fred_mcp_client::{FredClient, FredError, JsonObject};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

/// Build a handler that decodes its arguments into `A` first
///
/// A missing or `null` argument object is treated as `{}`. Arguments of
/// the wrong type are a validation failure.
pub fn handler<A, F, Fut>(tool: &'static str, run: F) -> ToolHandlerFn
where
    A: DeserializeOwned + Send + 'static,
    F: Fn(FredClient, A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ToolResult> + Send + 'static,
{
    let run = Arc::new(run);
    Arc::new(move |client, raw| {
        let run = Arc::clone(&run);
        Box::pin(async move {
            let args = decode::<A>(tool, raw)?;
            run(client, args).await
        })
    })
}

/// Decode tool arguments
///
/// # Errors
///
/// Returns `FredError::Validation` when the arguments do not fit `A`.
pub fn decode<A: DeserializeOwned>(tool: &str, raw: Value) -> Result<A, FredError> {
    let raw = if raw.is_null() {
        Value::Object(JsonObject::new())
    } else {
        raw
    };
    serde_json::from_value(raw)
        .map_err(|e| FredError::Validation(format!("Invalid arguments for {tool}: {e}")))
}

/// Require a non-blank string argument, returning it trimmed
///
/// # Errors
///
/// Returns `FredError::Validation` when the argument is absent or blank.
pub fn required<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str, FredError> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .ok_or_else(|| FredError::Validation(format!("{name} is required")))
}

/// Require a numeric id argument
///
/// # Errors
///
/// Returns `FredError::Validation` when the argument is absent.
pub fn required_id(value: Option<u64>, name: &str) -> Result<u64, FredError> {
    value.ok_or_else(|| FredError::Validation(format!("{name} is required")))
}

/// Page size to send upstream
///
/// An omitted `limit` takes the endpoint's maximum, which is also the
/// upstream default. A supplied value is clamped into `[low, high]`.
#[must_use]
pub fn page_limit(value: Option<&Value>, low: i64, high: i64) -> i64 {
    match value {
        None | Some(Value::Null) => high,
        supplied => clamp_limit(supplied, low, high),
    }
}

/// Query parameters under construction
///
/// `None` values are skipped, so optional arguments can be passed through
/// without branching.
#[derive(Debug, Default, Clone)]
pub struct Query(JsonObject);

impl Query {
    /// Start an empty query
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter if present
    #[must_use]
    pub fn opt<V: Into<Value>>(mut self, key: &str, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.0.insert(key.to_string(), value.into());
        }
        self
    }

    /// Add a parameter unconditionally
    #[must_use]
    pub fn set<V: Into<Value>>(mut self, key: &str, value: V) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    /// Add the real-time window
    #[must_use]
    pub fn realtime(self, window: &Realtime) -> Self {
        self.opt("realtime_start", window.realtime_start.clone())
            .opt("realtime_end", window.realtime_end.clone())
    }

    /// Add `limit` (see [`page_limit`]) and a floored `offset`
    #[must_use]
    pub fn paging(self, paging: &Paging, low: i64, high: i64) -> Self {
        self.set("limit", page_limit(paging.limit.as_ref(), low, high))
            .set("offset", normalize_offset(paging.offset.as_ref()))
    }

    /// Add `order_by` normalised against `endpoint` and `sort_order`
    #[must_use]
    pub fn ordering(self, endpoint: OrderByEndpoint, sorting: &Sorting) -> Self {
        self.set("order_by", normalize_order_by(endpoint, sorting.order_by.as_deref()))
            .sorted(sorting, "desc")
    }

    /// Add `sort_order` normalised with the given default
    #[must_use]
    pub fn sorted(self, sorting: &Sorting, default: &'static str) -> Self {
        self.set(
            "sort_order",
            normalize_sort_order_or(sorting.sort_order.as_deref(), default),
        )
    }

    /// Finished parameter object
    #[must_use]
    pub fn build(self) -> JsonObject {
        self.0
    }
}

/// `realtime_start` / `realtime_end` arguments
#[derive(Debug, Default, Clone, serde::Deserialize)]
#[serde(default)]
pub struct Realtime {
    /// Start of the real-time period (YYYY-MM-DD)
    pub realtime_start: Option<String>,
    /// End of the real-time period (YYYY-MM-DD)
    pub realtime_end: Option<String>,
}

/// Lenient `limit` / `offset` arguments
#[derive(Debug, Default, Clone, serde::Deserialize)]
#[serde(default)]
pub struct Paging {
    /// Page size; omitted means the endpoint maximum, garbage the minimum
    pub limit: Option<Value>,
    /// Rows to skip; anything non-numeric falls back to 0
    pub offset: Option<Value>,
}

/// `order_by` / `sort_order` arguments, normalised leniently
#[derive(Debug, Default, Clone, serde::Deserialize)]
#[serde(default)]
pub struct Sorting {
    /// Field to order by
    pub order_by: Option<String>,
    /// `asc` or `desc`, any case
    pub sort_order: Option<String>,
}

/// Tag filters shared by the tag-listing endpoints
#[derive(Debug, Default, Clone, serde::Deserialize)]
#[serde(default)]
pub struct TagFilter {
    /// Semicolon-delimited tag names to match
    pub tag_names: Option<String>,
    /// Tag group (freq, gen, geo, geot, rls, seas, src)
    pub tag_group_id: Option<String>,
    /// Words to match in tag names and notes
    pub search_text: Option<String>,
}

impl Query {
    /// Add tag filters
    #[must_use]
    pub fn tags(self, filter: &TagFilter) -> Self {
        self.opt("tag_names", filter.tag_names.clone())
            .opt("tag_group_id", filter.tag_group_id.clone())
            .opt("search_text", filter.search_text.clone())
    }
}

/// Series filters shared by the series-listing endpoints
#[derive(Debug, Default, Clone, serde::Deserialize)]
#[serde(default)]
pub struct SeriesFilter {
    /// Attribute to filter on (frequency, units, `seasonal_adjustment`)
    pub filter_variable: Option<String>,
    /// Value of `filter_variable` to keep
    pub filter_value: Option<String>,
    /// Semicolon-delimited tags series must carry
    pub tag_names: Option<String>,
    /// Semicolon-delimited tags series must not carry
    pub exclude_tag_names: Option<String>,
}

impl Query {
    /// Add series filters
    #[must_use]
    pub fn series_filter(self, filter: &SeriesFilter) -> Self {
        self.opt("filter_variable", filter.filter_variable.clone())
            .opt("filter_value", filter.filter_value.clone())
            .opt("tag_names", filter.tag_names.clone())
            .opt("exclude_tag_names", filter.exclude_tag_names.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, serde::Deserialize)]
    struct Example {
        #[serde(default)]
        series_id: Option<String>,
        #[serde(flatten)]
        paging: Paging,
    }

    #[test]
    fn test_null_arguments_are_empty() {
        let args: Example = decode("t", Value::Null).unwrap();
        assert!(args.series_id.is_none());
        assert!(args.paging.limit.is_none());
    }

    #[test]
    fn test_wrong_type_is_validation() {
        let err = decode::<Example>("get_series", json!({"series_id": 12})).unwrap_err();
        assert!(err.to_string().starts_with("Invalid arguments for get_series:"));
    }

    #[test]
    fn test_required_trims() {
        assert_eq!(required(Some("  GDP "), "series_id").unwrap(), "GDP");
        assert_eq!(
            required(Some("   "), "series_id").unwrap_err().to_string(),
            "series_id is required"
        );
        assert!(required(None, "series_id").is_err());
    }

    #[test]
    fn test_query_builder() {
        let paging = Paging {
            limit: Some(json!("abc")),
            offset: Some(json!(-5)),
        };
        let sorting = Sorting {
            order_by: Some("NAME".into()),
            sort_order: Some(" AsC ".into()),
        };
        let query = Query::new()
            .opt("tag_names", None::<String>)
            .set("source_id", 1)
            .paging(&paging, 1, 1000)
            .ordering(OrderByEndpoint::Sources, &sorting)
            .build();

        assert_eq!(
            Value::Object(query),
            json!({
                "source_id": 1,
                "limit": 1,
                "offset": 0,
                "order_by": "name",
                "sort_order": "asc"
            })
        );
    }

    #[test]
    fn test_page_limit_defaults_to_maximum() {
        assert_eq!(page_limit(None, 1, 1000), 1000);
        assert_eq!(page_limit(Some(&Value::Null), 1, 100_000), 100_000);
        assert_eq!(page_limit(Some(&json!(25)), 1, 1000), 25);
        assert_eq!(page_limit(Some(&json!(5000)), 1, 1000), 1000);
        assert_eq!(page_limit(Some(&json!(0)), 1, 1000), 1);
        assert_eq!(page_limit(Some(&json!("abc")), 1, 1000), 1);

        let query = Query::new().paging(&Paging::default(), 1, 10_000).build();
        assert_eq!(query["limit"], json!(10_000));
        assert_eq!(query["offset"], json!(0));
    }
}
