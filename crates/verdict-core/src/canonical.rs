//! # Canonical Serialization
//!
//! This module defines [`CanonicalBytes`], the sole construction path for
//! bytes used in digest computation across the workspace.
//!
//! ## Security Invariant
//!
//! The inner `Vec<u8>` is private. The only way to construct `CanonicalBytes`
//! is through [`CanonicalBytes::new()`], which applies the full normalization
//! pipeline before serialization. Two structurally equal values always
//! produce identical bytes regardless of key insertion order, serializer
//! configuration, or timestamp formatting at the call site.
//!
//! ## Normalization Rules
//!
//! 1. Sort object keys lexicographically at every nesting depth.
//! 2. Normalize RFC 3339 datetime strings to UTC with a `Z` suffix,
//!    truncated to seconds.
//! 3. Compact separators (no whitespace between tokens).
//!
//! Floats pass through with serde_json's shortest-roundtrip formatting.
//! Plans are arbitrary caller JSON; a benign float must not turn into a
//! hashing fault inside a fail-closed evaluator.

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by recursive canonical serialization.
///
/// The inner `Vec<u8>` is private — downstream code cannot construct
/// `CanonicalBytes` except through [`CanonicalBytes::new()`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    ///
    /// Applies datetime normalization and recursive key sorting before
    /// serialization. This is the ONLY way to construct `CanonicalBytes`;
    /// all digest computation in the workspace must flow through here.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        let normalized = normalize_value(value);
        let mut bytes = Vec::new();
        write_canonical(&normalized, &mut bytes)?;
        Ok(Self(bytes))
    }

    /// Access the canonical bytes for digest computation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume and return the inner byte vector.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Recursively normalize a JSON value before canonical serialization.
fn normalize_value(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, normalize_value(v)))
                .collect(),
        ),
        Value::Array(arr) => Value::Array(arr.into_iter().map(normalize_value).collect()),
        Value::String(s) => {
            // Datetime normalization: strings that parse as RFC 3339 are
            // rewritten as UTC ISO 8601 with Z suffix, truncated to seconds.
            if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(&s) {
                let utc = dt.with_timezone(&chrono::Utc);
                Value::String(utc.format("%Y-%m-%dT%H:%M:%SZ").to_string())
            } else {
                Value::String(s)
            }
        }
        other => other,
    }
}

/// Serialize a JSON value with lexicographically sorted keys and compact
/// separators.
///
/// The writer sorts keys itself rather than relying on `serde_json::Map`
/// ordering, so canonical output does not depend on which `serde_json`
/// features the final binary happens to unify.
fn write_canonical(value: &Value, out: &mut Vec<u8>) -> Result<(), CanonicalizationError> {
    match value {
        Value::Null => out.extend_from_slice(b"null"),
        Value::Bool(true) => out.extend_from_slice(b"true"),
        Value::Bool(false) => out.extend_from_slice(b"false"),
        Value::Number(n) => out.extend_from_slice(n.to_string().as_bytes()),
        Value::String(s) => out.extend_from_slice(&serde_json::to_vec(s)?),
        Value::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_canonical(item, out)?;
            }
            out.push(b']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort_unstable();
            out.push(b'{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                out.extend_from_slice(&serde_json::to_vec(key)?);
                out.push(b':');
                write_canonical(&map[key.as_str()], out)?;
            }
            out.push(b'}');
        }
    }
    Ok(())
}
