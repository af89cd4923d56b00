//! Passthrough tools for endpoints without a dedicated tool
//!
//! Each takes an endpoint path and a JSON object of query parameters as
//! text. The text must decode to an object; anything else is a validation
//! failure.

use crate::args::{handler, required};
use crate::schema;
use crate::types::{Tool, ToolHandlerFn};
use fred_mcp_client::validation::parse_json_object;
use fred_mcp_client::{FredClient, Upstream};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PassthroughArgs {
    endpoint: Option<String>,
    params_json: Option<String>,
}

fn passthrough_tool(
    name: &'static str,
    upstream: Upstream,
    description: &str,
) -> (Tool, ToolHandlerFn) {
    let tool = Tool::new(
        name,
        description,
        schema::object(
            vec![
                ("endpoint", schema::string("Endpoint path, e.g. series/observations")),
                (
                    "params_json",
                    schema::string(
                        "Query parameters as a JSON object, e.g. {\"series_id\": \"GDP\"}",
                    ),
                ),
            ],
            &["endpoint"],
        ),
    );
    let handler = handler(name, move |client: FredClient, args: PassthroughArgs| async move {
        let params = parse_json_object(args.params_json.as_deref().unwrap_or("{}"))?;
        let endpoint = required(args.endpoint.as_deref(), "endpoint")?;
        client.get(upstream, endpoint, params).await
    });
    (tool, handler)
}

/// Create the `fred_request` tool
#[must_use]
pub fn fred_request_tool() -> (Tool, ToolHandlerFn) {
    passthrough_tool(
        "fred_request",
        Upstream::Fred,
        "Call any FRED v1 endpoint with raw query parameters",
    )
}

/// Create the `geofred_request` tool
#[must_use]
pub fn geofred_request_tool() -> (Tool, ToolHandlerFn) {
    passthrough_tool(
        "geofred_request",
        Upstream::GeoFred,
        "Call any GeoFRED endpoint with raw query parameters",
    )
}

/// Create the `fred_v2_request` tool
#[must_use]
pub fn fred_v2_request_tool() -> (Tool, ToolHandlerFn) {
    passthrough_tool(
        "fred_v2_request",
        Upstream::FredV2,
        "Call any FRED v2 endpoint with raw query parameters",
    )
}

/// All passthrough tools
#[must_use]
pub fn tools() -> Vec<(Tool, ToolHandlerFn)> {
    vec![fred_request_tool(), geofred_request_tool(), fred_v2_request_tool()]
}
