//! Category tools
//!
//! - `get_category`: one category, unwrapped from the upstream list
//! - `get_category_children`, `get_category_related`: neighbouring categories
//! - `get_category_series`: series in a category, compacted
//! - `get_category_tags`, `get_category_related_tags`: tags of a category

use crate::args::{Paging, Query, Realtime, SeriesFilter, Sorting, TagFilter, handler, required};
use crate::reshape::{Lookup, compact_series_listing, unwrap_single};
use crate::schema;
use crate::types::{Tool, ToolHandlerFn};
use fred_mcp_client::FredClient;
use fred_mcp_client::validation::OrderByEndpoint;
use serde::Deserialize;

/// The root of the category tree
pub const ROOT_CATEGORY: u64 = 0;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CategoryArgs {
    category_id: Option<u64>,
    #[serde(flatten)]
    realtime: Realtime,
}

impl CategoryArgs {
    fn query(&self) -> Query {
        Query::new()
            .set("category_id", self.category_id.unwrap_or(ROOT_CATEGORY))
            .realtime(&self.realtime)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CategorySeriesArgs {
    #[serde(flatten)]
    category: CategoryArgs,
    #[serde(flatten)]
    paging: Paging,
    #[serde(flatten)]
    sorting: Sorting,
    #[serde(flatten)]
    filter: SeriesFilter,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CategoryTagsArgs {
    #[serde(flatten)]
    category: CategoryArgs,
    #[serde(flatten)]
    tags: TagFilter,
    exclude_tag_names: Option<String>,
    #[serde(flatten)]
    paging: Paging,
    #[serde(flatten)]
    sorting: Sorting,
}

fn category_id_schema() -> Vec<(&'static str, serde_json::Value)> {
    vec![("category_id", schema::integer("Category id, 0 (root) when omitted"))]
}

/// Create the `get_category` tool
///
/// Returns the category object itself, or a `not_found` payload.
#[must_use]
pub fn get_category_tool() -> (Tool, ToolHandlerFn) {
    let tool = Tool::new(
        "get_category",
        "Get a FRED category by id",
        schema::object(category_id_schema(), &[]),
    );
    let handler = handler("get_category", |client: FredClient, args: CategoryArgs| async move {
        let id = args.category_id.unwrap_or(ROOT_CATEGORY);
        let payload = client.fred_get("category", args.query().build()).await?;
        unwrap_single(
            payload,
            "categories",
            Lookup {
                base_url: &client.config().fred_base_url,
                endpoint: "category",
                label: &format!("Category {id}"),
            },
        )
    });
    (tool, handler)
}

/// Create the `get_category_children` tool
#[must_use]
pub fn get_category_children_tool() -> (Tool, ToolHandlerFn) {
    let tool = Tool::new(
        "get_category_children",
        "List the child categories of a FRED category",
        schema::object([category_id_schema(), schema::realtime()].concat(), &[]),
    );
    let handler = handler(
        "get_category_children",
        |client: FredClient, args: CategoryArgs| async move {
            client.fred_get("category/children", args.query().build()).await
        },
    );
    (tool, handler)
}

/// Create the `get_category_related` tool
#[must_use]
pub fn get_category_related_tool() -> (Tool, ToolHandlerFn) {
    let tool = Tool::new(
        "get_category_related",
        "List categories related to a FRED category",
        schema::object([category_id_schema(), schema::realtime()].concat(), &[]),
    );
    let handler = handler(
        "get_category_related",
        |client: FredClient, args: CategoryArgs| async move {
            client.fred_get("category/related", args.query().build()).await
        },
    );
    (tool, handler)
}

/// Create the `get_category_series` tool
///
/// Series rows are compacted to their identifying fields.
#[must_use]
pub fn get_category_series_tool() -> (Tool, ToolHandlerFn) {
    let tool = Tool::new(
        "get_category_series",
        "List the series in a FRED category",
        schema::object(
            [
                category_id_schema(),
                schema::realtime(),
                schema::paging(1000),
                schema::sorting(OrderByEndpoint::CategorySeries.rule().allowed),
                schema::series_filter(),
            ]
            .concat(),
            &[],
        ),
    );
    let handler = handler(
        "get_category_series",
        |client: FredClient, args: CategorySeriesArgs| async move {
            let params = args
                .category
                .query()
                .paging(&args.paging, 1, 1000)
                .ordering(OrderByEndpoint::CategorySeries, &args.sorting)
                .series_filter(&args.filter)
                .build();
            let payload = client.fred_get("category/series", params).await?;
            Ok(compact_series_listing(payload))
        },
    );
    (tool, handler)
}

/// Create the `get_category_tags` tool
#[must_use]
pub fn get_category_tags_tool() -> (Tool, ToolHandlerFn) {
    let tool = Tool::new(
        "get_category_tags",
        "List the tags for series in a FRED category",
        schema::object(
            [
                category_id_schema(),
                schema::realtime(),
                schema::tag_filter(),
                schema::paging(1000),
                schema::sorting(OrderByEndpoint::CategoryTags.rule().allowed),
            ]
            .concat(),
            &[],
        ),
    );
    let handler = handler(
        "get_category_tags",
        |client: FredClient, args: CategoryTagsArgs| async move {
            let params = args
                .category
                .query()
                .tags(&args.tags)
                .paging(&args.paging, 1, 1000)
                .ordering(OrderByEndpoint::CategoryTags, &args.sorting)
                .build();
            client.fred_get("category/tags", params).await
        },
    );
    (tool, handler)
}

/// Create the `get_category_related_tags` tool
#[must_use]
pub fn get_category_related_tags_tool() -> (Tool, ToolHandlerFn) {
    let tool = Tool::new(
        "get_category_related_tags",
        "List tags related to the given tags within a FRED category",
        schema::object(
            [
                category_id_schema(),
                schema::realtime(),
                schema::tag_filter(),
                vec![(
                    "exclude_tag_names",
                    schema::string("Semicolon-delimited tags to exclude"),
                )],
                schema::paging(1000),
                schema::sorting(OrderByEndpoint::CategoryRelatedTags.rule().allowed),
            ]
            .concat(),
            &["tag_names"],
        ),
    );
    let handler = handler(
        "get_category_related_tags",
        |client: FredClient, args: CategoryTagsArgs| async move {
            required(args.tags.tag_names.as_deref(), "tag_names")?;
            let params = args
                .category
                .query()
                .tags(&args.tags)
                .opt("exclude_tag_names", args.exclude_tag_names.clone())
                .paging(&args.paging, 1, 1000)
                .ordering(OrderByEndpoint::CategoryRelatedTags, &args.sorting)
                .build();
            client.fred_get("category/related_tags", params).await
        },
    );
    (tool, handler)
}

/// All category tools
#[must_use]
pub fn tools() -> Vec<(Tool, ToolHandlerFn)> {
    vec![
        get_category_tool(),
        get_category_children_tool(),
        get_category_related_tool(),
        get_category_series_tool(),
        get_category_tags_tool(),
        get_category_related_tags_tool(),
    ]
}
