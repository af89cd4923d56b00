//! Tag tools

use crate::args::{Paging, Query, Realtime, Sorting, TagFilter, handler, required};
use crate::reshape::compact_series_listing;
use crate::schema;
use crate::types::{Tool, ToolHandlerFn};
use fred_mcp_client::FredClient;
use fred_mcp_client::validation::OrderByEndpoint;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TagsArgs {
    #[serde(flatten)]
    tags: TagFilter,
    exclude_tag_names: Option<String>,
    #[serde(flatten)]
    realtime: Realtime,
    #[serde(flatten)]
    paging: Paging,
    #[serde(flatten)]
    sorting: Sorting,
}

impl TagsArgs {
    fn query(&self) -> Query {
        Query::new()
            .tags(&self.tags)
            .realtime(&self.realtime)
            .paging(&self.paging, 1, 1000)
    }
}

fn exclude_schema() -> Vec<(&'static str, serde_json::Value)> {
    vec![(
        "exclude_tag_names",
        schema::string("Semicolon-delimited tags to exclude"),
    )]
}

/// Create the `get_tags` tool
#[must_use]
pub fn get_tags_tool() -> (Tool, ToolHandlerFn) {
    let tool = Tool::new(
        "get_tags",
        "List FRED tags, optionally filtered",
        schema::object(
            [
                schema::tag_filter(),
                schema::realtime(),
                schema::paging(1000),
                schema::sorting(OrderByEndpoint::Tags.rule().allowed),
            ]
            .concat(),
            &[],
        ),
    );
    let handler = handler("get_tags", |client: FredClient, args: TagsArgs| async move {
        let params = args
            .query()
            .ordering(OrderByEndpoint::Tags, &args.sorting)
            .build();
        client.fred_get("tags", params).await
    });
    (tool, handler)
}

/// Create the `get_related_tags` tool
#[must_use]
pub fn get_related_tags_tool() -> (Tool, ToolHandlerFn) {
    let tool = Tool::new(
        "get_related_tags",
        "List tags related to the given tags",
        schema::object(
            [
                schema::tag_filter(),
                exclude_schema(),
                schema::realtime(),
                schema::paging(1000),
                schema::sorting(OrderByEndpoint::RelatedTags.rule().allowed),
            ]
            .concat(),
            &["tag_names"],
        ),
    );
    let handler = handler("get_related_tags", |client: FredClient, args: TagsArgs| async move {
        required(args.tags.tag_names.as_deref(), "tag_names")?;
        let params = args
            .query()
            .opt("exclude_tag_names", args.exclude_tag_names.clone())
            .ordering(OrderByEndpoint::RelatedTags, &args.sorting)
            .build();
        client.fred_get("related_tags", params).await
    });
    (tool, handler)
}

/// Create the `get_tags_series` tool
#[must_use]
pub fn get_tags_series_tool() -> (Tool, ToolHandlerFn) {
    let tool = Tool::new(
        "get_tags_series",
        "List the series carrying all of the given tags",
        schema::object(
            [
                vec![("tag_names", schema::string("Semicolon-delimited tag names"))],
                exclude_schema(),
                schema::realtime(),
                schema::paging(1000),
                schema::sorting(OrderByEndpoint::TagsSeries.rule().allowed),
            ]
            .concat(),
            &["tag_names"],
        ),
    );
    let handler = handler("get_tags_series", |client: FredClient, args: TagsArgs| async move {
        let tag_names = required(args.tags.tag_names.as_deref(), "tag_names")?;
        let params = Query::new()
            .set("tag_names", tag_names)
            .opt("exclude_tag_names", args.exclude_tag_names.clone())
            .realtime(&args.realtime)
            .paging(&args.paging, 1, 1000)
            .ordering(OrderByEndpoint::TagsSeries, &args.sorting)
            .build();
        let payload = client.fred_get("tags/series", params).await?;
        Ok(compact_series_listing(payload))
    });
    (tool, handler)
}

/// All tag tools
#[must_use]
pub fn tools() -> Vec<(Tool, ToolHandlerFn)> {
    vec![get_tags_tool(), get_related_tags_tool(), get_tags_series_tool()]
}
