//! Series tools
//!
//! `get_series` unwraps the single series; `get_observations` returns a
//! paging envelope around `{date, value}` rows with missing values as
//! `null`. Listings that return series rows are compacted.

use crate::args::{Paging, Query, Realtime, SeriesFilter, Sorting, handler, page_limit, required};
use crate::reshape::{Lookup, compact_series_listing, observation_row, unwrap_single};
use crate::schema;
use crate::types::{Tool, ToolHandlerFn};
use fred_mcp_client::validation::{OrderByEndpoint, normalize_enum, normalize_offset};
use fred_mcp_client::{FredClient, FredError, JsonObject};
use serde::Deserialize;
use serde_json::Value;

/// Upper bound for `series/observations` page sizes
pub const OBSERVATIONS_MAX_LIMIT: i64 = 100_000;

const SEARCH_TYPES: &[&str] = &["full_text", "series_id"];
const UPDATE_FILTERS: &[&str] = &["macro", "regional", "all"];

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SeriesArgs {
    series_id: Option<String>,
    #[serde(flatten)]
    realtime: Realtime,
}

impl SeriesArgs {
    fn id(&self) -> Result<&str, FredError> {
        required(self.series_id.as_deref(), "series_id")
    }

    fn query(&self) -> Result<Query, FredError> {
        Ok(Query::new()
            .set("series_id", self.id()?)
            .realtime(&self.realtime))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ObservationsArgs {
    #[serde(flatten)]
    series: SeriesArgs,
    #[serde(flatten)]
    paging: Paging,
    #[serde(flatten)]
    sorting: Sorting,
    observation_start: Option<String>,
    observation_end: Option<String>,
    units: Option<String>,
    frequency: Option<String>,
    aggregation_method: Option<String>,
    output_type: Option<u64>,
    vintage_dates: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchArgs {
    search_text: Option<String>,
    search_type: Option<String>,
    #[serde(flatten)]
    realtime: Realtime,
    #[serde(flatten)]
    paging: Paging,
    #[serde(flatten)]
    sorting: Sorting,
    #[serde(flatten)]
    filter: SeriesFilter,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchTagsArgs {
    series_search_text: Option<String>,
    tag_names: Option<String>,
    exclude_tag_names: Option<String>,
    tag_group_id: Option<String>,
    tag_search_text: Option<String>,
    #[serde(flatten)]
    realtime: Realtime,
    #[serde(flatten)]
    paging: Paging,
    #[serde(flatten)]
    sorting: Sorting,
}

impl SearchTagsArgs {
    fn query(&self) -> Result<Query, FredError> {
        let text = required(self.series_search_text.as_deref(), "series_search_text")?;
        Ok(Query::new()
            .set("series_search_text", text)
            .opt("tag_names", self.tag_names.clone())
            .opt("tag_group_id", self.tag_group_id.clone())
            .opt("tag_search_text", self.tag_search_text.clone())
            .realtime(&self.realtime)
            .paging(&self.paging, 1, 1000))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SeriesTagsArgs {
    #[serde(flatten)]
    series: SeriesArgs,
    #[serde(flatten)]
    sorting: Sorting,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UpdatesArgs {
    #[serde(flatten)]
    realtime: Realtime,
    #[serde(flatten)]
    paging: Paging,
    filter_value: Option<String>,
    start_time: Option<String>,
    end_time: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct VintageDatesArgs {
    #[serde(flatten)]
    series: SeriesArgs,
    #[serde(flatten)]
    paging: Paging,
    #[serde(flatten)]
    sorting: Sorting,
}

fn series_id_schema() -> Vec<(&'static str, Value)> {
    vec![("series_id", schema::string("Series id, e.g. GDP"))]
}

fn search_tags_schema(endpoint: OrderByEndpoint) -> Vec<(&'static str, Value)> {
    [
        vec![
            ("series_search_text", schema::string("Words to match against series")),
            ("tag_names", schema::string("Semicolon-delimited tag names")),
            ("exclude_tag_names", schema::string("Semicolon-delimited tags to exclude")),
            (
                "tag_group_id",
                schema::one_of(&["freq", "gen", "geo", "geot", "rls", "seas", "src"], "Tag group"),
            ),
            ("tag_search_text", schema::string("Words to find in tag names")),
        ],
        schema::realtime(),
        schema::paging(1000),
        schema::sorting(endpoint.rule().allowed),
    ]
    .concat()
}

/// Create the `get_series` tool
///
/// Returns the series object itself, or a `not_found` payload.
#[must_use]
pub fn get_series_tool() -> (Tool, ToolHandlerFn) {
    let tool = Tool::new(
        "get_series",
        "Get metadata for a FRED series",
        schema::object([series_id_schema(), schema::realtime()].concat(), &["series_id"]),
    );
    let handler = handler("get_series", |client: FredClient, args: SeriesArgs| async move {
        let payload = client.fred_get("series", args.query()?.build()).await?;
        unwrap_single(
            payload,
            "seriess",
            Lookup {
                base_url: &client.config().fred_base_url,
                endpoint: "series",
                label: &format!("Series {}", args.id()?),
            },
        )
    });
    (tool, handler)
}

/// Create the `get_series_categories` tool
#[must_use]
pub fn get_series_categories_tool() -> (Tool, ToolHandlerFn) {
    let tool = Tool::new(
        "get_series_categories",
        "List the categories a FRED series belongs to",
        schema::object([series_id_schema(), schema::realtime()].concat(), &["series_id"]),
    );
    let handler = handler(
        "get_series_categories",
        |client: FredClient, args: SeriesArgs| async move {
            client.fred_get("series/categories", args.query()?.build()).await
        },
    );
    (tool, handler)
}

/// Create the `get_observations` tool
///
/// Returns:
/// ```json
/// {
///   "series_id": "GDP",
///   "count": 2,
///   "total_count": 5000,
///   "offset": 120,
///   "limit": 2,
///   "observations": [{"date": "2024-01-01", "value": null}]
/// }
/// ```
/// `count` is the number of rows returned; `total_count` and `offset` are
/// what upstream reported.
#[must_use]
pub fn get_observations_tool() -> (Tool, ToolHandlerFn) {
    let tool = Tool::new(
        "get_observations",
        "Get observations (data values) for a FRED series",
        schema::object(
            [
                series_id_schema(),
                schema::realtime(),
                schema::paging(OBSERVATIONS_MAX_LIMIT),
                schema::sort_order(),
                vec![
                    ("observation_start", schema::string("First observation date, YYYY-MM-DD")),
                    ("observation_end", schema::string("Last observation date, YYYY-MM-DD")),
                    (
                        "units",
                        schema::one_of(
                            &["lin", "chg", "ch1", "pch", "pc1", "pca", "cch", "cca", "log"],
                            "Data value transformation",
                        ),
                    ),
                    (
                        "frequency",
                        schema::string("Aggregate to a lower frequency, e.g. a, q, m, w"),
                    ),
                    (
                        "aggregation_method",
                        schema::one_of(&["avg", "sum", "eop"], "How to aggregate"),
                    ),
                    ("output_type", schema::integer("1-4, real-time period layout")),
                    ("vintage_dates", schema::string("Comma-separated vintage dates")),
                ],
            ]
            .concat(),
            &["series_id"],
        ),
    );
    let handler = handler(
        "get_observations",
        |client: FredClient, args: ObservationsArgs| async move {
            let series_id = args.series.id()?.to_string();
            let limit = page_limit(args.paging.limit.as_ref(), 1, OBSERVATIONS_MAX_LIMIT);
            let offset = normalize_offset(args.paging.offset.as_ref());
            let params = args
                .series
                .query()?
                .set("limit", limit)
                .set("offset", offset)
                .sorted(&args.sorting, "asc")
                .opt("observation_start", args.observation_start)
                .opt("observation_end", args.observation_end)
                .opt("units", args.units)
                .opt("frequency", args.frequency)
                .opt("aggregation_method", args.aggregation_method)
                .opt("output_type", args.output_type)
                .opt("vintage_dates", args.vintage_dates)
                .build();

            let payload = client.fred_get("series/observations", params).await?;
            Ok(observations_envelope(series_id, limit, offset, &payload))
        },
    );
    (tool, handler)
}

fn observations_envelope(
    series_id: String,
    limit: i64,
    offset: i64,
    payload: &JsonObject,
) -> JsonObject {
    let observations: Vec<Value> = payload
        .get("observations")
        .and_then(Value::as_array)
        .map(|rows| rows.iter().map(observation_row).collect())
        .unwrap_or_default();

    let mut out = JsonObject::new();
    out.insert("series_id".into(), Value::String(series_id));
    out.insert("count".into(), Value::from(observations.len()));
    out.insert("total_count".into(), payload.get("count").cloned().unwrap_or(Value::Null));
    out.insert(
        "offset".into(),
        payload.get("offset").cloned().unwrap_or_else(|| Value::from(offset)),
    );
    out.insert("limit".into(), Value::from(limit));
    out.insert("observations".into(), Value::Array(observations));
    out
}

/// Create the `get_series_release` tool
#[must_use]
pub fn get_series_release_tool() -> (Tool, ToolHandlerFn) {
    let tool = Tool::new(
        "get_series_release",
        "Get the release a FRED series belongs to",
        schema::object([series_id_schema(), schema::realtime()].concat(), &["series_id"]),
    );
    let handler = handler("get_series_release", |client: FredClient, args: SeriesArgs| async move {
        client.fred_get("series/release", args.query()?.build()).await
    });
    (tool, handler)
}

/// Create the `search_series` tool
#[must_use]
pub fn search_series_tool() -> (Tool, ToolHandlerFn) {
    let tool = Tool::new(
        "search_series",
        "Search FRED series by keywords",
        schema::object(
            [
                vec![
                    ("search_text", schema::string("Words to match against series")),
                    ("search_type", schema::one_of(SEARCH_TYPES, "Match full text or series ids")),
                ],
                schema::realtime(),
                schema::paging(1000),
                schema::sorting(OrderByEndpoint::SeriesSearch.rule().allowed),
                schema::series_filter(),
            ]
            .concat(),
            &["search_text"],
        ),
    );
    let handler = handler("search_series", |client: FredClient, args: SearchArgs| async move {
        let text = required(args.search_text.as_deref(), "search_text")?;
        let params = Query::new()
            .set("search_text", text)
            .set(
                "search_type",
                normalize_enum(args.search_type.as_deref(), SEARCH_TYPES, "full_text"),
            )
            .realtime(&args.realtime)
            .paging(&args.paging, 1, 1000)
            .ordering(OrderByEndpoint::SeriesSearch, &args.sorting)
            .series_filter(&args.filter)
            .build();
        let payload = client.fred_get("series/search", params).await?;
        Ok(compact_series_listing(payload))
    });
    (tool, handler)
}

/// Create the `search_series_tags` tool
#[must_use]
pub fn search_series_tags_tool() -> (Tool, ToolHandlerFn) {
    let tool = Tool::new(
        "search_series_tags",
        "List the tags of series matching a search",
        schema::object(
            search_tags_schema(OrderByEndpoint::SeriesSearchTags),
            &["series_search_text"],
        ),
    );
    let handler = handler(
        "search_series_tags",
        |client: FredClient, args: SearchTagsArgs| async move {
            let params = args
                .query()?
                .ordering(OrderByEndpoint::SeriesSearchTags, &args.sorting)
                .build();
            client.fred_get("series/search/tags", params).await
        },
    );
    (tool, handler)
}

/// Create the `search_series_related_tags` tool
#[must_use]
pub fn search_series_related_tags_tool() -> (Tool, ToolHandlerFn) {
    let tool = Tool::new(
        "search_series_related_tags",
        "List tags related to the given tags among series matching a search",
        schema::object(
            search_tags_schema(OrderByEndpoint::SeriesSearchRelatedTags),
            &["series_search_text", "tag_names"],
        ),
    );
    let handler = handler(
        "search_series_related_tags",
        |client: FredClient, args: SearchTagsArgs| async move {
            required(args.tag_names.as_deref(), "tag_names")?;
            let params = args
                .query()?
                .opt("exclude_tag_names", args.exclude_tag_names.clone())
                .ordering(OrderByEndpoint::SeriesSearchRelatedTags, &args.sorting)
                .build();
            client.fred_get("series/search/related_tags", params).await
        },
    );
    (tool, handler)
}

/// Create the `get_series_tags` tool
#[must_use]
pub fn get_series_tags_tool() -> (Tool, ToolHandlerFn) {
    let tool = Tool::new(
        "get_series_tags",
        "List the tags of a FRED series",
        schema::object(
            [
                series_id_schema(),
                schema::realtime(),
                schema::sorting(OrderByEndpoint::SeriesTags.rule().allowed),
            ]
            .concat(),
            &["series_id"],
        ),
    );
    let handler = handler("get_series_tags", |client: FredClient, args: SeriesTagsArgs| async move {
        let params = args
            .series
            .query()?
            .ordering(OrderByEndpoint::SeriesTags, &args.sorting)
            .build();
        client.fred_get("series/tags", params).await
    });
    (tool, handler)
}

/// Create the `get_series_updates` tool
#[must_use]
pub fn get_series_updates_tool() -> (Tool, ToolHandlerFn) {
    let tool = Tool::new(
        "get_series_updates",
        "List recently updated FRED series",
        schema::object(
            [
                schema::realtime(),
                schema::paging(1000),
                vec![
                    ("filter_value", schema::one_of(UPDATE_FILTERS, "Kind of series to list")),
                    ("start_time", schema::string("Start of the update window, YYYYMMDDHhmm")),
                    ("end_time", schema::string("End of the update window, YYYYMMDDHhmm")),
                ],
            ]
            .concat(),
            &[],
        ),
    );
    let handler = handler("get_series_updates", |client: FredClient, args: UpdatesArgs| async move {
        let params = Query::new()
            .realtime(&args.realtime)
            .paging(&args.paging, 1, 1000)
            .set(
                "filter_value",
                normalize_enum(args.filter_value.as_deref(), UPDATE_FILTERS, "all"),
            )
            .opt("start_time", args.start_time)
            .opt("end_time", args.end_time)
            .build();
        let payload = client.fred_get("series/updates", params).await?;
        Ok(compact_series_listing(payload))
    });
    (tool, handler)
}

/// Create the `get_series_vintage_dates` tool
#[must_use]
pub fn get_series_vintage_dates_tool() -> (Tool, ToolHandlerFn) {
    let tool = Tool::new(
        "get_series_vintage_dates",
        "List the dates on which a FRED series was revised",
        schema::object(
            [
                series_id_schema(),
                schema::realtime(),
                schema::paging(10_000),
                schema::sort_order(),
            ]
            .concat(),
            &["series_id"],
        ),
    );
    let handler = handler(
        "get_series_vintage_dates",
        |client: FredClient, args: VintageDatesArgs| async move {
            let params = args
                .series
                .query()?
                .paging(&args.paging, 1, 10_000)
                .sorted(&args.sorting, "asc")
                .build();
            client.fred_get("series/vintagedates", params).await
        },
    );
    (tool, handler)
}

/// All series tools
#[must_use]
pub fn tools() -> Vec<(Tool, ToolHandlerFn)> {
    vec![
        get_series_tool(),
        get_series_categories_tool(),
        get_observations_tool(),
        get_series_release_tool(),
        search_series_tool(),
        search_series_tags_tool(),
        search_series_related_tags_tool(),
        get_series_tags_tool(),
        get_series_updates_tool(),
        get_series_vintage_dates_tool(),
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_observations_envelope() {
        let payload = json!({
            "count": 5000,
            "offset": 120,
            "observations": [
                {"date": "2024-01-01", "value": "."},
                {"date": "2024-02-01", "value": "1.23"}
            ]
        });
        let out = observations_envelope("GDP".into(), 2, 20, payload.as_object().unwrap());

        assert_eq!(
            Value::Object(out),
            json!({
                "series_id": "GDP",
                "count": 2,
                "total_count": 5000,
                "offset": 120,
                "limit": 2,
                "observations": [
                    {"date": "2024-01-01", "value": null},
                    {"date": "2024-02-01", "value": "1.23"}
                ]
            })
        );
    }

    #[test]
    fn test_observations_envelope_without_metadata() {
        let out = observations_envelope("GDP".into(), 10, 5, &JsonObject::new());
        assert_eq!(out["count"], 0);
        assert_eq!(out["offset"], 5);
        assert_eq!(out["total_count"], Value::Null);
        assert_eq!(out["observations"], json!([]));
    }
}
