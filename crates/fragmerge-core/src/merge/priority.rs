//! Priority hint handling
//!
//! Any object that is an element of a list may carry a numeric `priority`.
//! Lists are reordered ascending by that number (absent or non-numeric means
//! `0`), keeping the relative order of equal priorities.

use std::cmp::Ordering;

use serde_json::{Map, Value};

/// Name of the ordering hint field
pub const PRIORITY_KEY: &str = "priority";

/// Priority of a list element, `0` unless it is an object with a numeric hint
#[must_use]
pub fn priority_of(value: &Value) -> f64 {
    value
        .as_object()
        .and_then(|map| map.get(PRIORITY_KEY))
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
}

/// Stable sort of `items` by ascending priority
///
/// Keys are computed once per element.
pub fn sort_by_priority<T>(items: &mut Vec<T>, priority: impl Fn(&T) -> f64) {
    let mut keyed: Vec<(f64, T)> = items.drain(..).map(|item| (priority(&item), item)).collect();
    keyed.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
    items.extend(keyed.into_iter().map(|(_, item)| item));
}

/// Sort every list in the tree by priority, innermost lists first
pub fn sort_lists(map: &mut Map<String, Value>) {
    for value in map.values_mut() {
        sort_value(value);
    }
}

fn sort_value(value: &mut Value) {
    match value {
        Value::Array(items) => {
            items.iter_mut().for_each(sort_value);
            sort_by_priority(items, priority_of);
        }
        Value::Object(map) => sort_lists(map),
        _ => {}
    }
}

/// Remove every numeric `priority` field from the tree
///
/// Non-numeric `priority` values are ordinary data and stay.
pub fn strip_priority(map: &mut Map<String, Value>) {
    map.retain(|key, value| !(key == PRIORITY_KEY && value.is_number()));
    for value in map.values_mut() {
        strip_value(value);
    }
}

fn strip_value(value: &mut Value) {
    match value {
        Value::Array(items) => items.iter_mut().for_each(strip_value),
        Value::Object(map) => strip_priority(map),
        _ => {}
    }
}
