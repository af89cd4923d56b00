//! Parameter normalisation
//!
//! Pure, total functions that turn loosely-typed tool arguments into values
//! the upstream API accepts. None of them fail: out-of-range or garbage
//! input collapses to a documented fallback.
//!
//! The per-endpoint `order_by` rules are a fixed table keyed by
//! [`OrderByEndpoint`]. Adding a variant without a rule does not compile.

use crate::error::FredError;
use serde_json::{Map, Value};
use std::str::FromStr;

/// Accepted `sort_order` values
pub const SORT_ORDER_VALUES: &[&str] = &["asc", "desc"];

/// Sortable release fields
pub const RELEASE_ORDER_BY_VALUES: &[&str] = &[
    "release_id",
    "name",
    "press_release",
    "realtime_start",
    "realtime_end",
];

/// Sortable series fields
pub const SERIES_ORDER_BY_VALUES: &[&str] = &[
    "series_id",
    "title",
    "units",
    "frequency",
    "seasonal_adjustment",
    "realtime_start",
    "realtime_end",
    "last_updated",
    "observation_start",
    "observation_end",
    "popularity",
    "group_popularity",
];

/// Sortable series fields for full-text search (adds `search_rank`)
pub const SEARCH_SERIES_ORDER_BY_VALUES: &[&str] = &[
    "search_rank",
    "series_id",
    "title",
    "units",
    "frequency",
    "seasonal_adjustment",
    "realtime_start",
    "realtime_end",
    "last_updated",
    "observation_start",
    "observation_end",
    "popularity",
    "group_popularity",
];

/// Sortable tag fields
pub const TAGS_ORDER_BY_VALUES: &[&str] =
    &["series_count", "popularity", "created", "name", "group_id"];

/// Sortable source fields
pub const SOURCES_ORDER_BY_VALUES: &[&str] =
    &["source_id", "name", "realtime_start", "realtime_end"];

/// Default and allowed values for one endpoint's `order_by`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrderByRule {
    /// Value used when the input is missing or not allowed
    pub default: &'static str,
    /// Allowed values, lowercase
    pub allowed: &'static [&'static str],
}

/// Endpoints that accept an `order_by` parameter
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OrderByEndpoint {
    /// `category/series`
    CategorySeries,
    /// `category/tags`
    CategoryTags,
    /// `category/related_tags`
    CategoryRelatedTags,
    /// `releases`
    Releases,
    /// `release/series`
    ReleaseSeries,
    /// `release/tags`
    ReleaseTags,
    /// `release/related_tags`
    ReleaseRelatedTags,
    /// `series/search`
    SeriesSearch,
    /// `series/search/tags`
    SeriesSearchTags,
    /// `series/search/related_tags`
    SeriesSearchRelatedTags,
    /// `series/tags`
    SeriesTags,
    /// `sources`
    Sources,
    /// `source/releases`
    SourceReleases,
    /// `tags`
    Tags,
    /// `related_tags`
    RelatedTags,
    /// `tags/series`
    TagsSeries,
}

impl OrderByEndpoint {
    /// Every endpoint with an `order_by` rule
    pub const ALL: [Self; 16] = [
        Self::CategorySeries,
        Self::CategoryTags,
        Self::CategoryRelatedTags,
        Self::Releases,
        Self::ReleaseSeries,
        Self::ReleaseTags,
        Self::ReleaseRelatedTags,
        Self::SeriesSearch,
        Self::SeriesSearchTags,
        Self::SeriesSearchRelatedTags,
        Self::SeriesTags,
        Self::Sources,
        Self::SourceReleases,
        Self::Tags,
        Self::RelatedTags,
        Self::TagsSeries,
    ];

    /// Upstream path for this endpoint
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::CategorySeries => "category/series",
            Self::CategoryTags => "category/tags",
            Self::CategoryRelatedTags => "category/related_tags",
            Self::Releases => "releases",
            Self::ReleaseSeries => "release/series",
            Self::ReleaseTags => "release/tags",
            Self::ReleaseRelatedTags => "release/related_tags",
            Self::SeriesSearch => "series/search",
            Self::SeriesSearchTags => "series/search/tags",
            Self::SeriesSearchRelatedTags => "series/search/related_tags",
            Self::SeriesTags => "series/tags",
            Self::Sources => "sources",
            Self::SourceReleases => "source/releases",
            Self::Tags => "tags",
            Self::RelatedTags => "related_tags",
            Self::TagsSeries => "tags/series",
        }
    }

    /// The `order_by` rule for this endpoint
    #[must_use]
    pub const fn rule(self) -> OrderByRule {
        match self {
            Self::CategorySeries | Self::ReleaseSeries | Self::TagsSeries => OrderByRule {
                default: "popularity",
                allowed: SERIES_ORDER_BY_VALUES,
            },
            Self::SeriesSearch => OrderByRule {
                default: "search_rank",
                allowed: SEARCH_SERIES_ORDER_BY_VALUES,
            },
            Self::CategoryTags
            | Self::CategoryRelatedTags
            | Self::ReleaseTags
            | Self::ReleaseRelatedTags
            | Self::SeriesSearchTags
            | Self::SeriesSearchRelatedTags
            | Self::SeriesTags
            | Self::Tags
            | Self::RelatedTags => OrderByRule {
                default: "series_count",
                allowed: TAGS_ORDER_BY_VALUES,
            },
            Self::Releases | Self::SourceReleases => OrderByRule {
                default: "release_id",
                allowed: RELEASE_ORDER_BY_VALUES,
            },
            Self::Sources => OrderByRule {
                default: "source_id",
                allowed: SOURCES_ORDER_BY_VALUES,
            },
        }
    }
}

impl FromStr for OrderByEndpoint {
    type Err = FredError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let path = s.trim_matches('/');
        Self::ALL
            .into_iter()
            .find(|endpoint| endpoint.path() == path)
            .ok_or_else(|| FredError::Validation(format!("Unsupported order_by endpoint '{path}'")))
    }
}

/// Read an integer out of a loosely-typed JSON value
///
/// Integers pass through, floats are truncated, strings are trimmed and
/// parsed as integers. Everything else is rejected.
#[allow(clippy::cast_possible_truncation)] // `as` saturates, which is the intent
fn parse_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Clamp a page size into `[low, high]`
///
/// Missing or non-numeric input falls back to `low`.
#[must_use]
pub fn clamp_limit(value: Option<&Value>, low: i64, high: i64) -> i64 {
    let parsed = value.and_then(parse_integer).unwrap_or(low);
    parsed.min(high).max(low)
}

/// Floor an offset at zero
///
/// Missing or non-numeric input yields 0. There is no upper bound.
#[must_use]
pub fn normalize_offset(value: Option<&Value>) -> i64 {
    value.and_then(parse_integer).unwrap_or(0).max(0)
}

/// Case-insensitive, whitespace-trimmed lookup in `allowed`
///
/// Returns the canonical entry from `allowed`, or `default` when nothing
/// matches.
#[must_use]
pub fn normalize_enum(
    value: Option<&str>,
    allowed: &[&'static str],
    default: &'static str,
) -> &'static str {
    let Some(candidate) = value.map(|v| v.trim().to_lowercase()) else {
        return default;
    };
    allowed
        .iter()
        .copied()
        .find(|option| *option == candidate)
        .unwrap_or(default)
}

/// Normalise `sort_order`, defaulting to `desc`
#[must_use]
pub fn normalize_sort_order(value: Option<&str>) -> &'static str {
    normalize_sort_order_or(value, "desc")
}

/// Normalise `sort_order` with an endpoint-specific default
#[must_use]
pub fn normalize_sort_order_or(value: Option<&str>, default: &'static str) -> &'static str {
    normalize_enum(value, SORT_ORDER_VALUES, default)
}

/// Normalise `order_by` against the endpoint's rule
#[must_use]
pub fn normalize_order_by(endpoint: OrderByEndpoint, value: Option<&str>) -> &'static str {
    let rule = endpoint.rule();
    normalize_enum(value, rule.allowed, rule.default)
}

/// Prepare parameters for query construction
///
/// Drops `null` values and renders booleans as lowercase strings. Everything
/// else passes through untouched. Applying it twice is a no-op.
#[must_use]
pub fn clean_params(params: Map<String, Value>) -> Map<String, Value> {
    params
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::Null => None,
            Value::Bool(flag) => Some((key, Value::String(flag.to_string()))),
            other => Some((key, other)),
        })
        .collect()
}

/// Strictly parse a JSON object from text
///
/// # Errors
///
/// Returns `FredError::Validation` with an `Invalid JSON: ...` message for
/// malformed input, or `JSON value must be an object` for any other JSON
/// value.
pub fn parse_json_object(raw: &str) -> Result<Map<String, Value>, FredError> {
    let parsed: Value =
        serde_json::from_str(raw).map_err(|e| FredError::Validation(format!("Invalid JSON: {e}")))?;
    match parsed {
        Value::Object(object) => Ok(object),
        _ => Err(FredError::Validation("JSON value must be an object".to_string())),
    }
}
