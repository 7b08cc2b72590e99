//! Settings layer merging.
//!
//! Tables merge key by key. Arrays and scalars from the later layer replace
//! the earlier value.

use serde_json::{Map, Value};

/// Merge `overlay` onto `base`.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut merged), Value::Object(overlay)) => {
            for (key, value) in overlay {
                let value = match merged.remove(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value,
                };
                merged.insert(key, value);
            }
            Value::Object(merged)
        }
        (_, overlay) => overlay,
    }
}

/// Fold layers lowest precedence first.
pub fn merge_layers<I>(layers: I) -> Value
where
    I: IntoIterator<Item = Value>,
{
    layers
        .into_iter()
        .fold(Value::Object(Map::new()), deep_merge)
}

/// A layer that sets only the dotted `path` (`save.ascii_escape`).
pub fn overlay_at(path: &str, value: Value) -> Value {
    path.rsplit('.').fold(value, |inner, segment| {
        let mut table = Map::new();
        table.insert(segment.to_string(), inner);
        Value::Object(table)
    })
}
