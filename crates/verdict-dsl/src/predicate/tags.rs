//! # Tag Predicates
//!
//! Plans carry data-classification tags in several shapes, depending on
//! which upstream classifier produced them: a list of strings, a list of
//! tagged objects, a name→confidence map, or a comma-separated string.
//! [`TagSet::from_value`] normalizes all of them once at the boundary, so
//! the predicates themselves never branch on shape.

use std::collections::BTreeMap;

use serde_json::Value;

/// A single normalized tag.
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    /// Lower-cased, trimmed tag name.
    pub name: String,
    /// Classifier confidence, if the source shape carried one.
    pub confidence: Option<f64>,
    /// Explicit category, if the source shape carried one.
    pub category: Option<String>,
}

/// A normalized, deduplicated set of tags with deterministic iteration
/// order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagSet {
    tags: BTreeMap<String, Tag>,
}

/// The built-in category taxonomy mapping tag names to sensitivity
/// categories. The table is the single source of truth for
/// [`has_category`] and [`high_risk_tag_combination`].
const CATEGORY_TAXONOMY: &[(&str, &[&str])] = &[
    (
        "pii",
        &[
            "pii", "ssn", "email", "phone", "address", "dob", "passport", "biometric",
            "full_name",
        ],
    ),
    (
        "financial",
        &[
            "financial", "credit_card", "bank_account", "payment", "iban", "swift", "salary",
        ],
    ),
    (
        "security-risk",
        &[
            "security-risk", "credential", "secret", "token", "api_key", "private_key",
            "password",
        ],
    ),
    (
        "compliance",
        &["compliance", "gdpr", "hipaa", "pci", "sox", "ccpa"],
    ),
];

fn normalize_name(raw: &str) -> Option<String> {
    let name = raw.trim().to_ascii_lowercase();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

impl TagSet {
    /// Normalize any of the accepted tag shapes into a `TagSet`.
    ///
    /// Accepted shapes:
    /// - `["pii", "financial"]` — list of strings
    /// - `[{"name": "pii", "confidence": 0.9, "category": "privacy"}]` —
    ///   list of tagged objects (`tag` is accepted as an alias for `name`)
    /// - `{"pii": 0.9, "financial": 0.8}` — name→confidence map; a string
    ///   value is taken as a category, a boolean `true` as bare presence
    /// - `"pii, financial"` — comma-separated string
    ///
    /// Anything unrecognized contributes no tags. Duplicate names keep the
    /// highest confidence seen. Total: never fails, never panics.
    pub fn from_value(value: &Value) -> Self {
        let mut set = Self::default();
        match value {
            Value::String(s) => {
                for part in s.split(',') {
                    if let Some(name) = normalize_name(part) {
                        set.insert(Tag {
                            name,
                            confidence: None,
                            category: None,
                        });
                    }
                }
            }
            Value::Array(items) => {
                for item in items {
                    match item {
                        Value::String(s) => {
                            if let Some(name) = normalize_name(s) {
                                set.insert(Tag {
                                    name,
                                    confidence: None,
                                    category: None,
                                });
                            }
                        }
                        Value::Object(map) => {
                            let raw_name = map
                                .get("name")
                                .or_else(|| map.get("tag"))
                                .and_then(Value::as_str);
                            if let Some(name) = raw_name.and_then(normalize_name) {
                                set.insert(Tag {
                                    name,
                                    confidence: map.get("confidence").and_then(Value::as_f64),
                                    category: map
                                        .get("category")
                                        .and_then(Value::as_str)
                                        .and_then(normalize_name),
                                });
                            }
                        }
                        _ => {}
                    }
                }
            }
            Value::Object(map) => {
                for (key, entry) in map {
                    let Some(name) = normalize_name(key) else {
                        continue;
                    };
                    let tag = match entry {
                        Value::Number(n) => Tag {
                            name,
                            confidence: n.as_f64(),
                            category: None,
                        },
                        Value::String(s) => Tag {
                            name,
                            confidence: None,
                            category: normalize_name(s),
                        },
                        Value::Bool(false) => continue,
                        _ => Tag {
                            name,
                            confidence: None,
                            category: None,
                        },
                    };
                    set.insert(tag);
                }
            }
            _ => {}
        }
        set
    }

    /// Insert a tag, keeping the highest confidence for duplicate names.
    fn insert(&mut self, tag: Tag) {
        match self.tags.get_mut(&tag.name) {
            Some(existing) => {
                existing.confidence = match (existing.confidence, tag.confidence) {
                    (Some(a), Some(b)) => Some(a.max(b)),
                    (a, b) => a.or(b),
                };
                if existing.category.is_none() {
                    existing.category = tag.category;
                }
            }
            None => {
                self.tags.insert(tag.name.clone(), tag);
            }
        }
    }

    /// Whether a tag with this name is present (case-insensitive).
    pub fn has(&self, name: &str) -> bool {
        match normalize_name(name) {
            Some(name) => self.tags.contains_key(&name),
            None => false,
        }
    }

    /// The confidence recorded for a tag; a tag present without an explicit
    /// confidence counts as certain (1.0).
    pub fn confidence(&self, name: &str) -> Option<f64> {
        let name = normalize_name(name)?;
        self.tags.get(&name).map(|t| t.confidence.unwrap_or(1.0))
    }

    /// Whether any tag falls into the given taxonomy category, either by
    /// the built-in table or an explicit per-tag category.
    pub fn has_category(&self, category: &str) -> bool {
        let Some(category) = normalize_name(category) else {
            return false;
        };
        let table_names: &[&str] = CATEGORY_TAXONOMY
            .iter()
            .find(|(cat, _)| *cat == category)
            .map(|(_, names)| *names)
            .unwrap_or(&[]);
        self.tags.values().any(|tag| {
            tag.category.as_deref() == Some(category.as_str())
                || table_names.contains(&tag.name.as_str())
        })
    }

    /// The number of distinct tags.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Iterate tags in deterministic (name) order.
    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.tags.values()
    }
}

/// Whether the tag value contains the named tag.
pub fn has_tag(tags: &Value, name: &Value) -> bool {
    match name.as_str() {
        Some(name) => TagSet::from_value(tags).has(name),
        None => false,
    }
}

/// Whether the tag value contains any tag in the named taxonomy category.
pub fn has_category(tags: &Value, category: &Value) -> bool {
    match category.as_str() {
        Some(category) => TagSet::from_value(tags).has_category(category),
        None => false,
    }
}

/// Whether the named tag is present with at least the given confidence.
/// Tags without an explicit confidence count as certain.
pub fn tag_confidence(tags: &Value, name: &Value, minimum: &Value) -> bool {
    let (name, minimum) = match (name.as_str(), minimum.as_f64()) {
        (Some(n), Some(m)) => (n, m),
        _ => return false,
    };
    match TagSet::from_value(tags).confidence(name) {
        Some(confidence) => confidence >= minimum,
        None => false,
    }
}

/// Whether two or more distinct taxonomy categories are present at once.
///
/// A single sensitive category in isolation is routine; the combinations
/// (pii with financial, credentials with pii, and so on) are what mark a
/// plan as handling compounded sensitive data.
pub fn high_risk_tag_combination(tags: &Value) -> bool {
    let set = TagSet::from_value(tags);
    let present = CATEGORY_TAXONOMY
        .iter()
        .filter(|(category, _)| set.has_category(category))
        .count();
    present >= 2
}
