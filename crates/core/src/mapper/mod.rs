//! Conversion of T411 API JSON into taxonomy and search result types.
//!
//! Every function here is pure. The API encodes ids and counters as strings,
//! so numeric fields accept both JSON numbers and numeric strings.

mod search;
mod taxonomy;
mod types;

pub use search::{map_search_response, map_search_result, ADDED_FORMAT};
pub use taxonomy::{map_category, map_category_tree, map_term_type, map_term_type_tree};
pub use types::*;

use serde_json::Value;

/// Read an integer from a JSON number or a numeric string.
fn json_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Children of a JSON container: object values or array items.
fn json_children(value: &Value) -> Vec<&Value> {
    match value {
        Value::Object(map) => map.values().collect(),
        Value::Array(items) => items.iter().collect(),
        _ => Vec::new(),
    }
}
