//! # Comparison Predicates
//!
//! Containment, equality, ordering, emptiness, and consent checks. All
//! functions are total; incompatible operand types evaluate to `false`.

use serde_json::Value;

/// Coerce a value to a number. Numeric strings parse; everything else is
/// `None`.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Render a scalar as the string form used for containment checks.
fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Containment. Strings check substrings, arrays check element equality,
/// objects check key presence.
pub fn contains(haystack: &Value, needle: &Value) -> bool {
    match haystack {
        Value::String(s) => match as_text(needle) {
            Some(n) => s.contains(&n),
            None => false,
        },
        Value::Array(items) => items.iter().any(|item| equals(item, needle)),
        Value::Object(map) => match needle.as_str() {
            Some(key) => map.contains_key(key),
            None => false,
        },
        _ => false,
    }
}

/// Loose equality: structural equality first, then numeric coercion so that
/// `"5"` equals `5`.
pub fn equals(a: &Value, b: &Value) -> bool {
    if a == b {
        return true;
    }
    match (as_number(a), as_number(b)) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

/// Numeric greater-than. Non-numeric operands are `false`.
pub fn greater_than(a: &Value, b: &Value) -> bool {
    match (as_number(a), as_number(b)) {
        (Some(x), Some(y)) => x > y,
        _ => false,
    }
}

/// Numeric less-than. Non-numeric operands are `false`.
pub fn less_than(a: &Value, b: &Value) -> bool {
    match (as_number(a), as_number(b)) {
        (Some(x), Some(y)) => x < y,
        _ => false,
    }
}

/// Regex match against the string form of `value`. An invalid pattern or a
/// non-string pattern is `false`. The `regex` engine is linear-time, so an
/// adversarial pattern cannot stall evaluation.
pub fn matches(value: &Value, pattern: &Value) -> bool {
    let pattern = match pattern.as_str() {
        Some(p) => p,
        None => return false,
    };
    let text = match as_text(value) {
        Some(t) => t,
        None => return false,
    };
    match regex::Regex::new(pattern) {
        Ok(re) => re.is_match(&text),
        Err(_) => false,
    }
}

/// Regex match against a precompiled pattern. Used by the compiler when the
/// pattern is a literal, so the expression pays compilation once.
pub fn matches_compiled(value: &Value, re: &regex::Regex) -> bool {
    match as_text(value) {
        Some(text) => re.is_match(&text),
        None => false,
    }
}

/// Null, empty/whitespace string, empty array, or empty object.
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Negation of [`is_empty`].
pub fn is_present(value: &Value) -> bool {
    !is_empty(value)
}

/// Consent negation: `true` unless the value is an explicit affirmative.
///
/// Affirmatives are boolean `true` and the strings `true`, `yes`, `granted`,
/// `approved` (case-insensitive). A missing field, `null`, `false`, or any
/// other value means consent is lacking.
pub fn lacks_consent(value: &Value) -> bool {
    match value {
        Value::Bool(b) => !b,
        Value::String(s) => !matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "yes" | "granted" | "approved"
        ),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn contains_substring() {
        assert!(contains(&json!("delete_user_data"), &json!("user")));
        assert!(!contains(&json!("read"), &json!("write")));
    }

    #[test]
    fn contains_array_element() {
        assert!(contains(&json!(["a", "b"]), &json!("b")));
        assert!(contains(&json!([1, 2, 3]), &json!("2")));
        assert!(!contains(&json!(["a"]), &json!("z")));
    }

    #[test]
    fn contains_object_key() {
        assert!(contains(&json!({"size": 1}), &json!("size")));
        assert!(!contains(&json!({"size": 1}), &json!("depth")));
    }

    #[test]
    fn contains_scalar_haystack_is_false() {
        assert!(!contains(&json!(42), &json!(4)));
        assert!(!contains(&Value::Null, &json!("x")));
    }

    #[test]
    fn equals_structural() {
        assert!(equals(&json!("x"), &json!("x")));
        assert!(equals(&json!({"a": 1}), &json!({"a": 1})));
        assert!(!equals(&json!("x"), &json!("y")));
    }

    #[test]
    fn equals_numeric_coercion() {
        assert!(equals(&json!("5"), &json!(5)));
        assert!(equals(&json!(5.0), &json!(5)));
        assert!(!equals(&json!("5a"), &json!(5)));
    }

    #[test]
    fn ordering_with_coercion() {
        assert!(greater_than(&json!(10), &json!(3)));
        assert!(greater_than(&json!("10"), &json!(3)));
        assert!(less_than(&json!("2.5"), &json!("3")));
        assert!(!greater_than(&json!(3), &json!(10)));
    }

    #[test]
    fn ordering_non_numeric_is_false() {
        assert!(!greater_than(&json!("abc"), &json!(1)));
        assert!(!less_than(&Value::Null, &json!(1)));
        assert!(!greater_than(&json!([1]), &json!(0)));
    }

    #[test]
    fn matches_basic() {
        assert!(matches(&json!("delete_user_data"), &json!("^delete_")));
        assert!(!matches(&json!("read"), &json!("^delete_")));
    }

    #[test]
    fn matches_bad_pattern_is_false() {
        assert!(!matches(&json!("anything"), &json!("([unclosed")));
    }

    #[test]
    fn matches_numeric_value_uses_string_form() {
        assert!(matches(&json!(1024), &json!("^10")));
    }

    #[test]
    fn matches_non_string_pattern_is_false() {
        assert!(!matches(&json!("x"), &json!(42)));
        assert!(!matches(&json!("x"), &Value::Null));
    }

    #[test]
    fn emptiness() {
        assert!(is_empty(&Value::Null));
        assert!(is_empty(&json!("")));
        assert!(is_empty(&json!("   ")));
        assert!(is_empty(&json!([])));
        assert!(is_empty(&json!({})));
        assert!(!is_empty(&json!(0)));
        assert!(!is_empty(&json!(false)));
        assert!(!is_empty(&json!("x")));
    }

    #[test]
    fn presence_is_negated_emptiness() {
        assert!(is_present(&json!("x")));
        assert!(!is_present(&Value::Null));
    }

    #[test]
    fn consent_affirmatives() {
        assert!(!lacks_consent(&json!(true)));
        assert!(!lacks_consent(&json!("yes")));
        assert!(!lacks_consent(&json!("Granted")));
        assert!(!lacks_consent(&json!("APPROVED")));
    }

    #[test]
    fn consent_everything_else_lacks() {
        assert!(lacks_consent(&json!(false)));
        assert!(lacks_consent(&Value::Null));
        assert!(lacks_consent(&json!("no")));
        assert!(lacks_consent(&json!("")));
        assert!(lacks_consent(&json!(1)));
        assert!(lacks_consent(&json!({"granted": true})));
    }
}
