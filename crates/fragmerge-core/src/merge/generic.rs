//! Schema-free merge over arbitrary JSON objects
//!
//! # Merging Semantics
//!
//! - **Zero values** (`null`, `false`, `0`, `""`, `[]`, `{}`) in a fragment
//!   mean "not specified" and never overwrite anything
//! - **Absent or zero** accumulator values are replaced by the fragment's
//!   value
//! - **Arrays**: additive, accumulator elements first
//! - **Objects**: merged key by key, recursively
//! - **Scalars**: the first non-zero value wins; later fragments cannot
//!   override it
//! - **Kind conflicts** (e.g. array vs object) fail with
//!   [`MergeError::TypeMismatch`] naming the dotted key path
//!
//! Once every fragment is folded, lists anywhere in the tree are sorted by
//! their elements' `priority` hint and the hint is removed.

use serde_json::{Map, Value};

use super::Strategy;
use super::priority::{sort_lists, strip_priority};
use crate::error::{MergeError, Result};

/// Generic merge strategy over `serde_json` objects
pub struct GenericMerge;

impl Strategy for GenericMerge {
    type Document = Map<String, Value>;

    fn fold(accumulator: &mut Self::Document, fragment: Self::Document) -> Result<()> {
        merge_maps(accumulator, fragment, "")
    }

    fn finish(accumulator: &mut Self::Document) -> Result<()> {
        sort_lists(accumulator);
        strip_priority(accumulator);
        Ok(())
    }
}

/// Fold `source` into `target` key by key
///
/// # Errors
///
/// Returns [`MergeError::TypeMismatch`] when both sides hold non-zero values
/// of different kinds for the same key.
pub fn merge_maps(
    target: &mut Map<String, Value>,
    source: Map<String, Value>,
    parent: &str,
) -> Result<()> {
    for (key, value) in source {
        if is_zero(&value) {
            continue;
        }

        let path = key_path(parent, &key);
        let slot = target.entry(key).or_insert(Value::Null);

        if is_zero(slot) {
            *slot = normalized(value, &path)?;
            continue;
        }

        merge_values(slot, value, &path)?;
    }

    Ok(())
}

fn merge_values(target: &mut Value, source: Value, path: &str) -> Result<()> {
    match (target, source) {
        (Value::Array(existing), Value::Array(items)) => existing.extend(items),
        (Value::Object(existing), Value::Object(map)) => merge_maps(existing, map, path)?,
        // first non-zero scalar wins
        (existing, incoming) if kind_of(existing) == kind_of(&incoming) => {}
        (_, incoming) => {
            return Err(MergeError::TypeMismatch {
                key: path.to_string(),
                kind: kind_of(&incoming),
            });
        }
    }

    Ok(())
}

/// Objects entering the accumulator lose their zero-valued fields too
fn normalized(value: Value, path: &str) -> Result<Value> {
    match value {
        Value::Object(map) => {
            let mut fresh = Map::new();
            merge_maps(&mut fresh, map, path)?;
            Ok(Value::Object(fresh))
        }
        other => Ok(other),
    }
}

/// Whether `value` is the zero value of its kind
#[must_use]
pub fn is_zero(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Kind name used in mismatch diagnostics
#[must_use]
pub const fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn key_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}
