use serde::Serialize;
use serde_json::{Map, Value};

use crate::hasher::HasherError;

/// How a structured record is turned into the bytes that get hashed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Canonicalization {
    /// Fields in declaration order, as the deployed dashboards serialize them.
    /// Keeps historical identifiers reproducible.
    #[default]
    InsertionOrder,
    /// Object keys sorted lexicographically at every depth.
    SortedKeys,
}

/// Serialize `value` to compact JSON under the given ordering rule.
pub fn canonical_json<T: Serialize + ?Sized>(
    value: &T,
    mode: Canonicalization,
) -> Result<String, HasherError> {
    let encoded = match mode {
        Canonicalization::InsertionOrder => serde_json::to_string(value),
        Canonicalization::SortedKeys => {
            let tree = serde_json::to_value(value)
                .map_err(|e| HasherError::Serialization(e.to_string()))?;
            serde_json::to_string(&sort_keys(tree))
        }
    };
    encoded.map_err(|e| HasherError::Serialization(e.to_string()))
}

// Rebuilds maps explicitly: with `preserve_order` a `Value` keeps document
// order, so collecting into a fresh map is not enough.
fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut sorted = Map::with_capacity(entries.len());
            for (k, v) in entries {
                sorted.insert(k, sort_keys(v));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}
