//! FRED v2 tools

use crate::args::{Query, handler, page_limit, required_id};
use crate::reshape::null_missing_observations;
use crate::schema;
use crate::types::{Tool, ToolHandlerFn};
use fred_mcp_client::FredClient;
use serde::Deserialize;
use serde_json::Value;

/// Upper bound for `release/observations` page sizes
pub const RELEASE_OBSERVATIONS_MAX_LIMIT: i64 = 500_000;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ReleaseObservationsArgs {
    release_id: Option<u64>,
    limit: Option<Value>,
    next_cursor: Option<String>,
    observation_start: Option<String>,
    observation_end: Option<String>,
}

/// Create the `get_release_observations` tool
///
/// Pages with `next_cursor`; pass back the cursor from the previous
/// response to continue. Missing values come back as `null`.
#[must_use]
pub fn get_release_observations_tool() -> (Tool, ToolHandlerFn) {
    let tool = Tool::new(
        "get_release_observations",
        "Get observations for every series in a FRED release (v2, cursor paginated)",
        schema::object(
            vec![
                ("release_id", schema::integer("Release id")),
                (
                    "limit",
                    schema::integer(&format!(
                        "Maximum observations to return, 1-{RELEASE_OBSERVATIONS_MAX_LIMIT}"
                    )),
                ),
                ("next_cursor", schema::string("Cursor from a previous page")),
                ("observation_start", schema::string("First observation date, YYYY-MM-DD")),
                ("observation_end", schema::string("Last observation date, YYYY-MM-DD")),
            ],
            &["release_id"],
        ),
    );
    let handler = handler(
        "get_release_observations",
        |client: FredClient, args: ReleaseObservationsArgs| async move {
            let params = Query::new()
                .set("release_id", required_id(args.release_id, "release_id")?)
                .set(
                    "limit",
                    page_limit(args.limit.as_ref(), 1, RELEASE_OBSERVATIONS_MAX_LIMIT),
                )
                .opt("next_cursor", args.next_cursor)
                .opt("observation_start", args.observation_start)
                .opt("observation_end", args.observation_end)
                .build();
            let mut payload = client.fred_v2_get("release/observations", params).await?;
            null_missing_observations(&mut payload);
            Ok(payload)
        },
    );
    (tool, handler)
}

/// All FRED v2 tools
#[must_use]
pub fn tools() -> Vec<(Tool, ToolHandlerFn)> {
    vec![get_release_observations_tool()]
}
