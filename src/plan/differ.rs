//! Structural diff of plan attribute trees
//!
//! Computes the minimal part of an `after` tree that differs from its
//! `before` tree, for display. Arrays are compared position by position
//! and never aligned; a length change returns the whole `after` array.

use serde_json::{Map, Value};

/// Minimal substructure of `after` that differs from `before`
///
/// Returns `None` when nothing differs.
pub fn diff(before: &Value, after: &Value) -> Option<Value> {
    match (before, after) {
        (Value::Array(old), Value::Array(new)) => diff_arrays(old, new),
        (Value::Object(old), Value::Object(new)) => diff_objects(old, new).map(Value::Object),
        _ if strictly_equal(before, after) => None,
        _ => Some(after.clone()),
    }
}

/// Per-attribute delta of a whole resource
///
/// Keys missing from `before` are taken verbatim; keys whose delta is an
/// empty array are dropped.
pub fn updated_values(before: &Map<String, Value>, after: &Map<String, Value>) -> Map<String, Value> {
    let mut updated = diff_objects(before, after).unwrap_or_default();
    updated.retain(|_, value| !matches!(value, Value::Array(items) if items.is_empty()));
    updated
}

fn diff_arrays(before: &[Value], after: &[Value]) -> Option<Value> {
    if before.len() != after.len() {
        return Some(Value::Array(after.to_vec()));
    }

    let changed: Vec<Value> = before
        .iter()
        .zip(after)
        .filter(|(old, new)| !strictly_equal(old, new))
        .map(|(_, new)| new.clone())
        .collect();

    if changed.is_empty() {
        None
    } else {
        Some(Value::Array(changed))
    }
}

fn diff_objects(before: &Map<String, Value>, after: &Map<String, Value>) -> Option<Map<String, Value>> {
    let mut changed = Map::new();

    for (key, new) in after {
        let delta = match before.get(key) {
            Some(old) => diff(old, new),
            None => Some(new.clone()),
        };

        if let Some(delta) = delta {
            changed.insert(key.clone(), delta);
        }
    }

    if changed.is_empty() {
        None
    } else {
        Some(changed)
    }
}

/// Equality without type coercion; numbers compare by value
fn strictly_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            x == y || matches!((x.as_f64(), y.as_f64()), (Some(x), Some(y)) if x == y)
        }
        _ => a == b,
    }
}
