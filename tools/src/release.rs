//! Release tools

use crate::args::{
    Paging, Query, Realtime, SeriesFilter, Sorting, TagFilter, handler, required, required_id,
};
use crate::reshape::compact_series_listing;
use crate::schema;
use crate::types::{Tool, ToolHandlerFn};
use fred_mcp_client::FredClient;
use fred_mcp_client::validation::OrderByEndpoint;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ListingArgs {
    #[serde(flatten)]
    realtime: Realtime,
    #[serde(flatten)]
    paging: Paging,
    #[serde(flatten)]
    sorting: Sorting,
    include_release_dates_with_no_data: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ReleaseArgs {
    release_id: Option<u64>,
    #[serde(flatten)]
    realtime: Realtime,
}

impl ReleaseArgs {
    fn query(&self) -> Result<Query, fred_mcp_client::FredError> {
        let id = required_id(self.release_id, "release_id")?;
        Ok(Query::new().set("release_id", id).realtime(&self.realtime))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ReleaseDatesArgs {
    #[serde(flatten)]
    release: ReleaseArgs,
    #[serde(flatten)]
    paging: Paging,
    #[serde(flatten)]
    sorting: Sorting,
    include_release_dates_with_no_data: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ReleaseSeriesArgs {
    #[serde(flatten)]
    release: ReleaseArgs,
    #[serde(flatten)]
    paging: Paging,
    #[serde(flatten)]
    sorting: Sorting,
    #[serde(flatten)]
    filter: SeriesFilter,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ReleaseTagsArgs {
    #[serde(flatten)]
    release: ReleaseArgs,
    #[serde(flatten)]
    tags: TagFilter,
    exclude_tag_names: Option<String>,
    #[serde(flatten)]
    paging: Paging,
    #[serde(flatten)]
    sorting: Sorting,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ReleaseTablesArgs {
    release_id: Option<u64>,
    element_id: Option<u64>,
    include_observation_values: Option<bool>,
    observation_date: Option<String>,
}

fn release_id_schema() -> Vec<(&'static str, Value)> {
    vec![("release_id", schema::integer("Release id"))]
}

fn no_data_schema() -> Vec<(&'static str, Value)> {
    vec![(
        "include_release_dates_with_no_data",
        schema::boolean("Include release dates without published data"),
    )]
}

/// Create the `get_releases` tool
#[must_use]
pub fn get_releases_tool() -> (Tool, ToolHandlerFn) {
    let tool = Tool::new(
        "get_releases",
        "List all FRED releases",
        schema::object(
            [
                schema::realtime(),
                schema::paging(1000),
                schema::sorting(OrderByEndpoint::Releases.rule().allowed),
            ]
            .concat(),
            &[],
        ),
    );
    let handler = handler("get_releases", |client: FredClient, args: ListingArgs| async move {
        let params = Query::new()
            .realtime(&args.realtime)
            .paging(&args.paging, 1, 1000)
            .ordering(OrderByEndpoint::Releases, &args.sorting)
            .build();
        client.fred_get("releases", params).await
    });
    (tool, handler)
}

/// Create the `get_releases_dates` tool
#[must_use]
pub fn get_releases_dates_tool() -> (Tool, ToolHandlerFn) {
    let tool = Tool::new(
        "get_releases_dates",
        "List release dates across all FRED releases",
        schema::object(
            [
                schema::realtime(),
                schema::paging(1000),
                schema::sort_order(),
                no_data_schema(),
            ]
            .concat(),
            &[],
        ),
    );
    let handler = handler("get_releases_dates", |client: FredClient, args: ListingArgs| async move {
        let params = Query::new()
            .realtime(&args.realtime)
            .paging(&args.paging, 1, 1000)
            .sorted(&args.sorting, "desc")
            .opt(
                "include_release_dates_with_no_data",
                args.include_release_dates_with_no_data,
            )
            .build();
        client.fred_get("releases/dates", params).await
    });
    (tool, handler)
}

/// Create the `get_release` tool
#[must_use]
pub fn get_release_tool() -> (Tool, ToolHandlerFn) {
    let tool = Tool::new(
        "get_release",
        "Get a FRED release",
        schema::object([release_id_schema(), schema::realtime()].concat(), &["release_id"]),
    );
    let handler = handler("get_release", |client: FredClient, args: ReleaseArgs| async move {
        client.fred_get("release", args.query()?.build()).await
    });
    (tool, handler)
}

/// Create the `get_release_dates` tool
#[must_use]
pub fn get_release_dates_tool() -> (Tool, ToolHandlerFn) {
    let tool = Tool::new(
        "get_release_dates",
        "List the release dates of a FRED release",
        schema::object(
            [
                release_id_schema(),
                schema::realtime(),
                schema::paging(10_000),
                schema::sort_order(),
                no_data_schema(),
            ]
            .concat(),
            &["release_id"],
        ),
    );
    let handler = handler(
        "get_release_dates",
        |client: FredClient, args: ReleaseDatesArgs| async move {
            let params = args
                .release
                .query()?
                .paging(&args.paging, 1, 10_000)
                .sorted(&args.sorting, "asc")
                .opt(
                    "include_release_dates_with_no_data",
                    args.include_release_dates_with_no_data,
                )
                .build();
            client.fred_get("release/dates", params).await
        },
    );
    (tool, handler)
}

/// Create the `get_release_series` tool
#[must_use]
pub fn get_release_series_tool() -> (Tool, ToolHandlerFn) {
    let tool = Tool::new(
        "get_release_series",
        "List the series in a FRED release",
        schema::object(
            [
                release_id_schema(),
                schema::realtime(),
                schema::paging(1000),
                schema::sorting(OrderByEndpoint::ReleaseSeries.rule().allowed),
                schema::series_filter(),
            ]
            .concat(),
            &["release_id"],
        ),
    );
    let handler = handler(
        "get_release_series",
        |client: FredClient, args: ReleaseSeriesArgs| async move {
            let params = args
                .release
                .query()?
                .paging(&args.paging, 1, 1000)
                .ordering(OrderByEndpoint::ReleaseSeries, &args.sorting)
                .series_filter(&args.filter)
                .build();
            let payload = client.fred_get("release/series", params).await?;
            Ok(compact_series_listing(payload))
        },
    );
    (tool, handler)
}

/// Create the `get_release_sources` tool
#[must_use]
pub fn get_release_sources_tool() -> (Tool, ToolHandlerFn) {
    let tool = Tool::new(
        "get_release_sources",
        "List the sources of a FRED release",
        schema::object([release_id_schema(), schema::realtime()].concat(), &["release_id"]),
    );
    let handler = handler(
        "get_release_sources",
        |client: FredClient, args: ReleaseArgs| async move {
            client.fred_get("release/sources", args.query()?.build()).await
        },
    );
    (tool, handler)
}

/// Create the `get_release_tags` tool
#[must_use]
pub fn get_release_tags_tool() -> (Tool, ToolHandlerFn) {
    let tool = Tool::new(
        "get_release_tags",
        "List the tags for series in a FRED release",
        schema::object(
            [
                release_id_schema(),
                schema::realtime(),
                schema::tag_filter(),
                schema::paging(1000),
                schema::sorting(OrderByEndpoint::ReleaseTags.rule().allowed),
            ]
            .concat(),
            &["release_id"],
        ),
    );
    let handler = handler(
        "get_release_tags",
        |client: FredClient, args: ReleaseTagsArgs| async move {
            let params = args
                .release
                .query()?
                .tags(&args.tags)
                .paging(&args.paging, 1, 1000)
                .ordering(OrderByEndpoint::ReleaseTags, &args.sorting)
                .build();
            client.fred_get("release/tags", params).await
        },
    );
    (tool, handler)
}

/// Create the `get_release_related_tags` tool
#[must_use]
pub fn get_release_related_tags_tool() -> (Tool, ToolHandlerFn) {
    let tool = Tool::new(
        "get_release_related_tags",
        "List tags related to the given tags within a FRED release",
        schema::object(
            [
                release_id_schema(),
                schema::realtime(),
                schema::tag_filter(),
                vec![(
                    "exclude_tag_names",
                    schema::string("Semicolon-delimited tags to exclude"),
                )],
                schema::paging(1000),
                schema::sorting(OrderByEndpoint::ReleaseRelatedTags.rule().allowed),
            ]
            .concat(),
            &["release_id", "tag_names"],
        ),
    );
    let handler = handler(
        "get_release_related_tags",
        |client: FredClient, args: ReleaseTagsArgs| async move {
            required(args.tags.tag_names.as_deref(), "tag_names")?;
            let params = args
                .release
                .query()?
                .tags(&args.tags)
                .opt("exclude_tag_names", args.exclude_tag_names.clone())
                .paging(&args.paging, 1, 1000)
                .ordering(OrderByEndpoint::ReleaseRelatedTags, &args.sorting)
                .build();
            client.fred_get("release/related_tags", params).await
        },
    );
    (tool, handler)
}

/// Create the `get_release_tables` tool
#[must_use]
pub fn get_release_tables_tool() -> (Tool, ToolHandlerFn) {
    let tool = Tool::new(
        "get_release_tables",
        "Get the table tree of a FRED release, optionally below one element",
        schema::object(
            vec![
                ("release_id", schema::integer("Release id")),
                ("element_id", schema::integer("Table element to start from")),
                (
                    "include_observation_values",
                    schema::boolean("Include observation values for each series"),
                ),
                ("observation_date", schema::string("Observation date, YYYY-MM-DD")),
            ],
            &["release_id"],
        ),
    );
    let handler = handler(
        "get_release_tables",
        |client: FredClient, args: ReleaseTablesArgs| async move {
            let params = Query::new()
                .set("release_id", required_id(args.release_id, "release_id")?)
                .opt("element_id", args.element_id)
                .opt("include_observation_values", args.include_observation_values)
                .opt("observation_date", args.observation_date)
                .build();
            client.fred_get("release/tables", params).await
        },
    );
    (tool, handler)
}

/// All release tools
#[must_use]
pub fn tools() -> Vec<(Tool, ToolHandlerFn)> {
    vec![
        get_releases_tool(),
        get_releases_dates_tool(),
        get_release_tool(),
        get_release_dates_tool(),
        get_release_series_tool(),
        get_release_sources_tool(),
        get_release_tags_tool(),
        get_release_related_tags_tool(),
        get_release_tables_tool(),
    ]
}
