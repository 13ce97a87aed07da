//! # Content Digests
//!
//! SHA-256 digests over [`CanonicalBytes`][crate::CanonicalBytes], used to
//! correlate audit records with the plans and rulesets that produced them.
//!
//! ## Not a Security Boundary
//!
//! These digests are correlation fingerprints: equal input gives an equal
//! digest, different input gives a different digest with overwhelming
//! probability. They are not signed, not chained, and make no tamper-evidence
//! claims.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;

/// A 32-byte SHA-256 digest.
///
/// Can only be computed from [`CanonicalBytes`], which guarantees the input
/// was produced by the canonical serialization pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentDigest(pub [u8; 32]);

impl ContentDigest {
    /// Return the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Return a short 16-character hex prefix, the form used in audit
    /// records and rule fingerprints.
    pub fn short(&self) -> String {
        let mut hex = self.to_hex();
        hex.truncate(16);
        hex
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Compute the SHA-256 digest of canonical bytes.
pub fn sha256_digest(bytes: &CanonicalBytes) -> ContentDigest {
    let mut hasher = Sha256::new();
    hasher.update(bytes.as_bytes());
    ContentDigest(hasher.finalize().into())
}

/// Compute a short deterministic fingerprint of arbitrary text.
///
/// Returns the first 16 hex characters of the SHA-256 of the UTF-8 bytes.
/// Used for rule-text and ruleset identity: equal text gives an equal
/// fingerprint, different text a different one with overwhelming probability.
pub fn short_fingerprint(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest: [u8; 32] = hasher.finalize().into();
    ContentDigest(digest).short()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn digest_is_deterministic() {
        let bytes = CanonicalBytes::new(&json!({"a": 1})).unwrap();
        assert_eq!(sha256_digest(&bytes), sha256_digest(&bytes));
    }

    #[test]
    fn digest_differs_for_different_input() {
        let a = CanonicalBytes::new(&json!({"a": 1})).unwrap();
        let b = CanonicalBytes::new(&json!({"a": 2})).unwrap();
        assert_ne!(sha256_digest(&a), sha256_digest(&b));
    }

    #[test]
    fn hex_is_64_chars_lowercase() {
        let bytes = CanonicalBytes::new(&json!("x")).unwrap();
        let hex = sha256_digest(&bytes).to_hex();
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn short_is_prefix_of_hex() {
        let bytes = CanonicalBytes::new(&json!({"k": "v"})).unwrap();
        let digest = sha256_digest(&bytes);
        assert_eq!(digest.short(), digest.to_hex()[..16]);
    }

    #[test]
    fn fingerprint_stable_for_identical_text() {
        assert_eq!(
            short_fingerprint("equals(action, \"x\")"),
            short_fingerprint("equals(action, \"x\")")
        );
    }

    #[test]
    fn fingerprint_differs_for_different_text() {
        assert_ne!(short_fingerprint("a"), short_fingerprint("b"));
    }

    #[test]
    fn fingerprint_is_16_hex_chars() {
        let fp = short_fingerprint("and(is_present(user), equals(action, \"read\"))");
        assert_eq!(fp.len(), 16);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn display_matches_to_hex() {
        let bytes = CanonicalBytes::new(&json!(42)).unwrap();
        let digest = sha256_digest(&bytes);
        assert_eq!(format!("{digest}"), digest.to_hex());
    }
}
