//! # Domain Predicates
//!
//! URL canonicalization and domain matching. Canonicalization rides on the
//! `url` crate, which lower-cases hosts and IDNA-encodes non-ASCII labels to
//! punycode during parsing. Any failure along the way yields an empty
//! canonical form, which matches nothing.

use serde_json::Value;
use url::Url;

/// Schemes accepted by [`canonical_domain`]. Anything else canonicalizes to
/// the empty string.
const ALLOWED_SCHEMES: &[&str] = &["http", "https", "ftp", "ftps"];

/// Canonicalize a URL or bare domain to its host form.
///
/// - A missing scheme defaults to `https://`.
/// - The scheme must be http, https, ftp, or ftps.
/// - The host is lower-cased, stripped of a trailing dot, and IDNA-encoded
///   if it contains non-ASCII labels.
/// - Any parse failure returns the empty string, which no target matches.
pub fn canonical_domain(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let parsed = match Url::parse(&with_scheme) {
        Ok(url) => url,
        Err(_) => return String::new(),
    };

    if !ALLOWED_SCHEMES.contains(&parsed.scheme()) {
        return String::new();
    }

    match parsed.host_str() {
        Some(host) => host.trim_end_matches('.').to_ascii_lowercase(),
        None => String::new(),
    }
}

/// Exact canonical domain equality.
///
/// Both the value and the target are canonicalized, so
/// `domain_is("HTTPS://API.Example.com/x", "api.example.com")` holds.
pub fn domain_is(value: &Value, target: &Value) -> bool {
    let (value, target) = match (value.as_str(), target.as_str()) {
        (Some(v), Some(t)) => (v, t),
        _ => return false,
    };
    let host = canonical_domain(value);
    let want = canonical_domain(target);
    !host.is_empty() && host == want
}

/// Registrable-domain suffix match.
///
/// True when the canonical host equals the target or is a subdomain of it
/// (`sub.openai.com` matches target `openai.com`). The target is the
/// registrable domain supplied by the rule author; matching is a
/// dot-boundary suffix check, so `notopenai.com` does not match
/// `openai.com`.
pub fn domain_etld1(value: &Value, target: &Value) -> bool {
    let (value, target) = match (value.as_str(), target.as_str()) {
        (Some(v), Some(t)) => (v, t),
        _ => return false,
    };
    let host = canonical_domain(value);
    let want = canonical_domain(target);
    if host.is_empty() || want.is_empty() {
        return false;
    }
    host == want || host.ends_with(&format!(".{want}"))
}
