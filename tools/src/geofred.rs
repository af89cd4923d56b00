//! GeoFRED map tools

use crate::args::{Query, handler, required};
use crate::schema;
use crate::types::{Tool, ToolHandlerFn};
use fred_mcp_client::validation::normalize_enum;
use fred_mcp_client::{FredClient, FredError};
use serde::Deserialize;

/// Shape sets served by `shapes/file`
pub const SHAPES: &[&str] = &[
    "bea",
    "msa",
    "frb",
    "necta",
    "state",
    "country",
    "county",
    "censusregion",
    "censusdivision",
];

const SEASONS: &[&str] = &["SA", "NSA", "SSA"];

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ShapesArgs {
    shape: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SeriesDataArgs {
    series_id: Option<String>,
    date: Option<String>,
    start_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RegionalDataArgs {
    series_group: Option<String>,
    region_type: Option<String>,
    date: Option<String>,
    start_date: Option<String>,
    season: Option<String>,
    units: Option<String>,
    frequency: Option<String>,
    transformation: Option<String>,
    aggregation_method: Option<String>,
}

/// Create the `geofred_shapes` tool
#[must_use]
pub fn geofred_shapes_tool() -> (Tool, ToolHandlerFn) {
    let tool = Tool::new(
        "geofred_shapes",
        "Get GeoJSON boundaries for a GeoFRED shape set",
        schema::object(vec![("shape", schema::one_of(SHAPES, "Shape set"))], &["shape"]),
    );
    let handler = handler("geofred_shapes", |client: FredClient, args: ShapesArgs| async move {
        let requested = required(args.shape.as_deref(), "shape")?;
        let shape = normalize_enum(Some(requested), SHAPES, "");
        if shape.is_empty() {
            return Err(FredError::Validation(format!(
                "shape must be one of: {}",
                SHAPES.join(", ")
            )));
        }
        client
            .geofred_get("shapes/file", Query::new().set("shape", shape).build())
            .await
    });
    (tool, handler)
}

/// Create the `geofred_series_group` tool
#[must_use]
pub fn geofred_series_group_tool() -> (Tool, ToolHandlerFn) {
    let tool = Tool::new(
        "geofred_series_group",
        "Get the GeoFRED series group metadata for a series",
        schema::object(
            vec![("series_id", schema::string("Series id, e.g. WIPCPI"))],
            &["series_id"],
        ),
    );
    let handler = handler(
        "geofred_series_group",
        |client: FredClient, args: SeriesDataArgs| async move {
            let series_id = required(args.series_id.as_deref(), "series_id")?;
            client
                .geofred_get("series/group", Query::new().set("series_id", series_id).build())
                .await
        },
    );
    (tool, handler)
}

/// Create the `geofred_series_data` tool
#[must_use]
pub fn geofred_series_data_tool() -> (Tool, ToolHandlerFn) {
    let tool = Tool::new(
        "geofred_series_data",
        "Get cross-sectional GeoFRED data for a series",
        schema::object(
            vec![
                ("series_id", schema::string("Series id, e.g. WIPCPI")),
                ("date", schema::string("Observation date, YYYY-MM-DD")),
                ("start_date", schema::string("First observation date, YYYY-MM-DD")),
            ],
            &["series_id"],
        ),
    );
    let handler = handler(
        "geofred_series_data",
        |client: FredClient, args: SeriesDataArgs| async move {
            let series_id = required(args.series_id.as_deref(), "series_id")?;
            let params = Query::new()
                .set("series_id", series_id)
                .opt("date", args.date.clone())
                .opt("start_date", args.start_date.clone())
                .build();
            client.geofred_get("series/data", params).await
        },
    );
    (tool, handler)
}

/// Create the `geofred_regional_data` tool
#[must_use]
pub fn geofred_regional_data_tool() -> (Tool, ToolHandlerFn) {
    let tool = Tool::new(
        "geofred_regional_data",
        "Get GeoFRED data for a series group across a region type",
        schema::object(
            vec![
                ("series_group", schema::string("Series group id")),
                ("region_type", schema::one_of(SHAPES, "Region type")),
                ("date", schema::string("Observation date, YYYY-MM-DD")),
                ("start_date", schema::string("First observation date, YYYY-MM-DD")),
                ("season", schema::one_of(SEASONS, "Seasonality")),
                ("units", schema::string("Units of the series group")),
                ("frequency", schema::string("Frequency, e.g. a, q, m")),
                ("transformation", schema::string("Data transformation, e.g. lin")),
                ("aggregation_method", schema::one_of(&["avg", "sum", "eop"], "How to aggregate")),
            ],
            &["series_group", "region_type", "date", "season", "units"],
        ),
    );
    let handler = handler(
        "geofred_regional_data",
        |client: FredClient, args: RegionalDataArgs| async move {
            let params = Query::new()
                .set("series_group", required(args.series_group.as_deref(), "series_group")?)
                .set("region_type", required(args.region_type.as_deref(), "region_type")?)
                .set("date", required(args.date.as_deref(), "date")?)
                .set("season", required(args.season.as_deref(), "season")?)
                .set("units", required(args.units.as_deref(), "units")?)
                .opt("start_date", args.start_date.clone())
                .opt("frequency", args.frequency.clone())
                .opt("transformation", args.transformation.clone())
                .opt("aggregation_method", args.aggregation_method.clone())
                .build();
            client.geofred_get("regional/data", params).await
        },
    );
    (tool, handler)
}

/// All GeoFRED tools
#[must_use]
pub fn tools() -> Vec<(Tool, ToolHandlerFn)> {
    vec![
        geofred_shapes_tool(),
        geofred_series_group_tool(),
        geofred_series_data_tool(),
        geofred_regional_data_tool(),
    ]
}
