//! # Quantity Parsing
//!
//! Byte and duration quantities with unit suffixes. [`parse_bytes`] and
//! [`parse_seconds`] are the only fallible functions in the predicate
//! library, by contract: rule-facing callers (`param_bytes_lte`,
//! `param_seconds_lte`) fold the failure to `false` and treat a missing
//! parameter as passing.

use serde_json::Value;
use thiserror::Error;

/// Errors from quantity parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnitParseError {
    /// The input has no parseable numeric part.
    #[error("malformed quantity \"{0}\"")]
    Malformed(String),

    /// The numeric part parsed but the suffix is not a known unit.
    #[error("unknown unit \"{unit}\" in \"{input}\"")]
    UnknownUnit {
        /// The unrecognized suffix.
        unit: String,
        /// The full input string.
        input: String,
    },

    /// The quantity is negative.
    #[error("negative quantity \"{0}\"")]
    Negative(String),
}

/// Split a quantity into its numeric part and unit suffix.
fn split_quantity(input: &str) -> Result<(f64, String), UnitParseError> {
    let trimmed = input.trim();
    let split_at = trimmed
        .char_indices()
        .find(|&(_, c)| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+'))
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());
    let (number_part, unit_part) = trimmed.split_at(split_at);

    let number: f64 = number_part
        .parse()
        .map_err(|_| UnitParseError::Malformed(input.to_string()))?;
    if number < 0.0 {
        return Err(UnitParseError::Negative(input.to_string()));
    }
    Ok((number, unit_part.trim().to_ascii_lowercase()))
}

/// Parse a byte quantity with decimal or binary unit suffixes.
///
/// Decimal: `KB`/`MB`/`GB`/`TB` and the `K`/`M`/`G`/`T` shorthand are powers
/// of 1000. Binary: `KiB`/`MiB`/`GiB`/`TiB` are powers of 1024. A bare
/// number or `B` suffix is bytes. Units are case-insensitive.
///
/// ```
/// use verdict_dsl::predicate::parse_bytes;
/// assert_eq!(parse_bytes("10MB").unwrap(), 10_000_000);
/// assert_eq!(parse_bytes("1KiB").unwrap(), 1024);
/// assert!(parse_bytes("garbage").is_err());
/// ```
pub fn parse_bytes(input: &str) -> Result<u64, UnitParseError> {
    let (number, unit) = split_quantity(input)?;
    let multiplier: f64 = match unit.as_str() {
        "" | "b" => 1.0,
        "k" | "kb" => 1e3,
        "m" | "mb" => 1e6,
        "g" | "gb" => 1e9,
        "t" | "tb" => 1e12,
        "kib" => 1024.0,
        "mib" => 1024.0 * 1024.0,
        "gib" => 1024.0 * 1024.0 * 1024.0,
        "tib" => 1024.0 * 1024.0 * 1024.0 * 1024.0,
        _ => {
            return Err(UnitParseError::UnknownUnit {
                unit,
                input: input.to_string(),
            });
        }
    };
    Ok((number * multiplier).round() as u64)
}

/// Parse a duration with time unit suffixes, returning seconds.
///
/// Accepted units: `s` (default), `ms`, `us`, `m` (minutes), `h`, `d`.
/// Units are case-insensitive.
pub fn parse_seconds(input: &str) -> Result<f64, UnitParseError> {
    let (number, unit) = split_quantity(input)?;
    let multiplier: f64 = match unit.as_str() {
        "" | "s" => 1.0,
        "ms" => 1e-3,
        "us" => 1e-6,
        "m" => 60.0,
        "h" => 3600.0,
        "d" => 86_400.0,
        _ => {
            return Err(UnitParseError::UnknownUnit {
                unit,
                input: input.to_string(),
            });
        }
    };
    Ok(number * multiplier)
}

/// Extract a byte count from a parameter value: integers are raw bytes,
/// strings go through [`parse_bytes`].
fn value_as_bytes(value: &Value) -> Result<u64, UnitParseError> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| UnitParseError::Malformed(n.to_string())),
        Value::String(s) => parse_bytes(s),
        other => Err(UnitParseError::Malformed(other.to_string())),
    }
}

/// Extract a duration in seconds from a parameter value.
fn value_as_seconds(value: &Value) -> Result<f64, UnitParseError> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .filter(|f| *f >= 0.0)
            .ok_or_else(|| UnitParseError::Malformed(n.to_string())),
        Value::String(s) => parse_seconds(s),
        other => Err(UnitParseError::Malformed(other.to_string())),
    }
}

/// Byte-quantity upper bound.
///
/// A missing parameter (null) passes — the rule constrains the parameter
/// only when it is supplied. An unparseable parameter or limit fails.
pub fn param_bytes_lte(param: &Value, limit: &Value) -> bool {
    if param.is_null() {
        return true;
    }
    match (value_as_bytes(param), value_as_bytes(limit)) {
        (Ok(p), Ok(l)) => p <= l,
        _ => false,
    }
}

/// Duration upper bound. Same missing/unparseable semantics as
/// [`param_bytes_lte`].
pub fn param_seconds_lte(param: &Value, limit: &Value) -> bool {
    if param.is_null() {
        return true;
    }
    match (value_as_seconds(param), value_as_seconds(limit)) {
        (Ok(p), Ok(l)) => p <= l,
        _ => false,
    }
}
