//! FRED tools for agent clients
//!
//! This crate exposes the FRED v1, GeoFRED and FRED v2 APIs as a set of
//! named tools, each taking a JSON object of optional arguments and
//! returning a JSON object.
//!
//! ## Design Principles
//!
//! **Every call returns a value**: a tool yields either the (lightly
//! reshaped) upstream object or an error payload with `error` and
//! `error_details`. Nothing is raised past the [`boundary`], except
//! [`Cancelled`] when shutdown interrupts a call.
//!
//! **Lenient arguments**: paging and sort arguments are normalised rather
//! than rejected; only structurally wrong arguments (wrong JSON type,
//! missing required id) are validation failures.
//!
//! ## Modules
//!
//! - `category`: category tree and category listings
//! - `release`: releases, release dates, release tables
//! - `series`: series metadata, observations, search, updates
//! - `source`: data sources
//! - `tag`: tags and tagged series
//! - `geofred`: `GeoFRED` shapes and regional data
//! - `v2`: FRED v2 release observations
//! - `passthrough`: raw calls to any endpoint
//! - `registry`: name-based dispatch with the error boundary applied

pub mod args;
pub mod boundary;
pub mod category;
pub mod geofred;
pub mod passthrough;
pub mod registry;
pub mod release;
pub mod reshape;
pub mod schema;
pub mod series;
pub mod source;
pub mod tag;
pub mod types;
pub mod v2;

// Re-export commonly used types
pub use registry::ToolRegistry;
pub use types::{Cancelled, Tool, ToolExecutorFn, ToolHandlerFn, ToolOutcome, ToolResult};

/// Every tool this crate provides, in catalogue order
#[must_use]
pub fn all_tools() -> Vec<(Tool, ToolHandlerFn)> {
    [
        category::tools(),
        release::tools(),
        series::tools(),
        source::tools(),
        tag::tools(),
        geofred::tools(),
        v2::tools(),
        passthrough::tools(),
    ]
    .into_iter()
    .flatten()
    .collect()
}
