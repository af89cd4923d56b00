//! Source tools

use crate::args::{Paging, Query, Realtime, Sorting, handler, required_id};
use crate::schema;
use crate::types::{Tool, ToolHandlerFn};
use fred_mcp_client::FredClient;
use fred_mcp_client::validation::OrderByEndpoint;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SourcesArgs {
    #[serde(flatten)]
    realtime: Realtime,
    #[serde(flatten)]
    paging: Paging,
    #[serde(flatten)]
    sorting: Sorting,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SourceArgs {
    source_id: Option<u64>,
    #[serde(flatten)]
    listing: SourcesArgs,
}

/// Create the `get_sources` tool
#[must_use]
pub fn get_sources_tool() -> (Tool, ToolHandlerFn) {
    let tool = Tool::new(
        "get_sources",
        "List all FRED data sources",
        schema::object(
            [
                schema::realtime(),
                schema::paging(1000),
                schema::sorting(OrderByEndpoint::Sources.rule().allowed),
            ]
            .concat(),
            &[],
        ),
    );
    let handler = handler("get_sources", |client: FredClient, args: SourcesArgs| async move {
        let params = Query::new()
            .realtime(&args.realtime)
            .paging(&args.paging, 1, 1000)
            .ordering(OrderByEndpoint::Sources, &args.sorting)
            .build();
        client.fred_get("sources", params).await
    });
    (tool, handler)
}

/// Create the `get_source` tool
#[must_use]
pub fn get_source_tool() -> (Tool, ToolHandlerFn) {
    let tool = Tool::new(
        "get_source",
        "Get a FRED data source",
        schema::object(
            [vec![("source_id", schema::integer("Source id"))], schema::realtime()].concat(),
            &["source_id"],
        ),
    );
    let handler = handler("get_source", |client: FredClient, args: SourceArgs| async move {
        let params = Query::new()
            .set("source_id", required_id(args.source_id, "source_id")?)
            .realtime(&args.listing.realtime)
            .build();
        client.fred_get("source", params).await
    });
    (tool, handler)
}

/// Create the `get_source_releases` tool
#[must_use]
pub fn get_source_releases_tool() -> (Tool, ToolHandlerFn) {
    let tool = Tool::new(
        "get_source_releases",
        "List the releases published by a FRED data source",
        schema::object(
            [
                vec![("source_id", schema::integer("Source id"))],
                schema::realtime(),
                schema::paging(1000),
                schema::sorting(OrderByEndpoint::SourceReleases.rule().allowed),
            ]
            .concat(),
            &["source_id"],
        ),
    );
    let handler = handler("get_source_releases", |client: FredClient, args: SourceArgs| async move {
        let params = Query::new()
            .set("source_id", required_id(args.source_id, "source_id")?)
            .realtime(&args.listing.realtime)
            .paging(&args.listing.paging, 1, 1000)
            .ordering(OrderByEndpoint::SourceReleases, &args.listing.sorting)
            .build();
        client.fred_get("source/releases", params).await
    });
    (tool, handler)
}

/// All source tools
#[must_use]
pub fn tools() -> Vec<(Tool, ToolHandlerFn)> {
    vec![get_sources_tool(), get_source_tool(), get_source_releases_tool()]
}
