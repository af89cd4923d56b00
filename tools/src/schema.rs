//! JSON-Schema fragments for tool `inputSchema` definitions

use serde_json::{Map, Value, json};

/// String property
#[must_use]
pub fn string(description: &str) -> Value {
    json!({"type": "string", "description": description})
}

/// Integer property
#[must_use]
pub fn integer(description: &str) -> Value {
    json!({"type": "integer", "description": description})
}

/// Boolean property
#[must_use]
pub fn boolean(description: &str) -> Value {
    json!({"type": "boolean", "description": description})
}

/// String property limited to `values`
#[must_use]
pub fn one_of(values: &[&str], description: &str) -> Value {
    json!({"type": "string", "enum": values, "description": description})
}

/// Object schema from `(name, schema)` pairs
#[must_use]
pub fn object(properties: Vec<(&str, Value)>, required: &[&str]) -> Value {
    let properties: Map<String, Value> = properties
        .into_iter()
        .map(|(name, schema)| (name.to_string(), schema))
        .collect();
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// `realtime_start` / `realtime_end`
#[must_use]
pub fn realtime() -> Vec<(&'static str, Value)> {
    vec![
        ("realtime_start", string("Start of the real-time period, YYYY-MM-DD")),
        ("realtime_end", string("End of the real-time period, YYYY-MM-DD")),
    ]
}

/// `limit` / `offset` with the endpoint's bounds in the description
#[must_use]
pub fn paging(high: i64) -> Vec<(&'static str, Value)> {
    vec![
        ("limit", integer(&format!("Maximum rows to return, 1-{high} (default {high})"))),
        ("offset", integer("Rows to skip, 0 or more")),
    ]
}

/// `order_by` limited to `allowed`, plus `sort_order`
#[must_use]
pub fn sorting(allowed: &[&str]) -> Vec<(&'static str, Value)> {
    vec![
        ("order_by", one_of(allowed, "Field to order results by")),
        ("sort_order", one_of(&["asc", "desc"], "Sort direction")),
    ]
}

/// `sort_order` only
#[must_use]
pub fn sort_order() -> Vec<(&'static str, Value)> {
    vec![("sort_order", one_of(&["asc", "desc"], "Sort direction"))]
}

/// Tag filters
#[must_use]
pub fn tag_filter() -> Vec<(&'static str, Value)> {
    vec![
        ("tag_names", string("Semicolon-delimited tag names")),
        (
            "tag_group_id",
            one_of(&["freq", "gen", "geo", "geot", "rls", "seas", "src"], "Tag group"),
        ),
        ("search_text", string("Words to find in tag names and notes")),
    ]
}

/// Series filters
#[must_use]
pub fn series_filter() -> Vec<(&'static str, Value)> {
    vec![
        (
            "filter_variable",
            one_of(&["frequency", "units", "seasonal_adjustment"], "Attribute to filter on"),
        ),
        ("filter_value", string("Value of filter_variable to keep")),
        ("tag_names", string("Semicolon-delimited tags series must have")),
        ("exclude_tag_names", string("Semicolon-delimited tags series must not have")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_shape() {
        let mut props = vec![("series_id", string("Series id"))];
        props.extend(paging(1000));
        let schema = object(props, &["series_id"]);

        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["series_id"]));
        assert_eq!(schema["properties"]["limit"]["type"], "integer");
        assert_eq!(
            schema["properties"]["limit"]["description"],
            "Maximum rows to return, 1-1000 (default 1000)"
        );
    }
}
