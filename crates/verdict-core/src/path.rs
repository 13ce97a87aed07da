//! # Dotted-Path Lookup
//!
//! Resolves dotted paths like `params.upload.size` against nested JSON
//! values. Rule expressions reference plan and context fields exclusively
//! through this lookup; a missing path resolves to nothing rather than an
//! error, and predicates treat the absent value as null.

use serde_json::Value;

/// Resolve a dotted path against a JSON value.
///
/// Each segment steps into an object by key, or into an array by numeric
/// index. Returns `None` if any segment is missing or the current value
/// cannot be traversed.
///
/// An empty path returns the root itself.
pub fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(root);
    }
    let mut current = root;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => {
                let index: usize = segment.parse().ok()?;
                items.get(index)?
            }
            _ => return None,
        };
    }
    Some(current)
}
