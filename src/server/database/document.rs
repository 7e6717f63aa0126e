//! Helpers for addressing fields of json documents with dotted paths.

use serde_json::{Map, Number, Value};

/// Resolve `path` (e.g. `order.table_id`) inside `doc`. Missing segments yield `Null`.
pub(crate) fn resolve_field(doc: &Value, path: &str) -> Value {
    let mut current = doc;
    for part in path.split('.') {
        match current {
            Value::Object(map) => match map.get(part) {
                Some(v) => current = v,
                None => return Value::Null,
            },
            _ => return Value::Null,
        }
    }
    current.clone()
}

/// Set `path` inside `doc`, creating intermediate objects as needed.
/// Non-object intermediates are left untouched.
pub(crate) fn set_field(doc: &mut Value, path: &str, value: Value) {
    let Value::Object(map) = doc else {
        return;
    };
    match path.split_once('.') {
        None => {
            map.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let child = map
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !child.is_object() {
                *child = Value::Object(Map::new());
            }
            set_field(child, rest, value);
        }
    }
}

/// Canonical string form of a value, used as a hash key for joins and groups.
/// Numbers compare by numeric value, so `3` and `3.0` share a key.
pub(crate) fn key_of(value: &Value) -> String {
    canonical(value).to_string()
}

/// Equality under the same rules as [`key_of`].
pub(crate) fn same_value(a: &Value, b: &Value) -> bool {
    key_of(a) == key_of(b)
}

fn canonical(value: &Value) -> Value {
    match value {
        Value::Number(n) => n
            .as_f64()
            .and_then(Number::from_f64)
            .map_or_else(|| value.clone(), Value::Number),
        Value::Array(items) => Value::Array(items.iter().map(canonical).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), canonical(v)))
                .collect(),
        ),
        _ => value.clone(),
    }
}
