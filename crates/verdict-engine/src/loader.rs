//! # Rule Loading
//!
//! Parses external rule records into validated [`Rule`]s. The loader is the
//! collaborator boundary: whatever fetched the records (a config service, a
//! bundled document, an operator API) has already turned them into JSON
//! values, and file formats are its problem.
//!
//! A single invalid record is logged and skipped — one bad rule must not
//! abort the load. If the whole source is missing or yields no valid rules,
//! the built-in fallback ruleset is installed instead, so the engine never
//! starts with zero protective rules.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use verdict_core::RuleLoadError;

use crate::rule::{Action, Priority, Rule};
use crate::ruleset::RuleSet;

/// The external shape of a rule definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleRecord {
    /// Unique rule name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// The rule's DSL condition text.
    pub rule_dsl: String,
    /// One of allow/warn/block, case-insensitive.
    pub action: String,
    /// One of low/medium/high/critical, case-insensitive.
    pub priority: String,
    /// Optional free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl RuleRecord {
    /// Validate and convert this record into a rule.
    pub fn into_rule(self) -> Result<Rule, RuleLoadError> {
        let action: Action = self.action.parse()?;
        let priority: Priority = self.priority.parse()?;
        Ok(
            Rule::new(self.name, self.description, self.rule_dsl, action, priority)
                .with_tags(self.tags),
        )
    }
}

/// Parses external rule records and builds rulesets.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleLoader;

impl RuleLoader {
    /// Parse one record into a rule.
    ///
    /// Field-level validation happens here; DSL compilation happens inside
    /// [`Rule::new`] and cannot fail (a non-compiling DSL produces an inert
    /// rule, which is still a *valid* record — the text may be meant for a
    /// newer predicate library).
    pub fn parse_record(record: &Value) -> Result<Rule, RuleLoadError> {
        let map = record.as_object().ok_or(RuleLoadError::NotAnObject)?;

        let field = |name: &'static str| -> Result<&str, RuleLoadError> {
            match map.get(name) {
                None => Err(RuleLoadError::MissingField(name)),
                Some(Value::String(s)) => Ok(s),
                Some(_) => Err(RuleLoadError::WrongType {
                    field: name,
                    expected: "a string",
                }),
            }
        };

        let name = field("name")?;
        let description = field("description")?;
        let dsl = field("rule_dsl")?;
        let action: Action = field("action")?.parse()?;
        let priority: Priority = field("priority")?.parse()?;

        let tags = match map.get("tags") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => {
                let mut tags = Vec::with_capacity(items.len());
                for item in items {
                    match item.as_str() {
                        Some(tag) => tags.push(tag.to_string()),
                        None => {
                            return Err(RuleLoadError::WrongType {
                                field: "tags",
                                expected: "an array of strings",
                            });
                        }
                    }
                }
                tags
            }
            Some(_) => {
                return Err(RuleLoadError::WrongType {
                    field: "tags",
                    expected: "an array of strings",
                });
            }
        };

        Ok(Rule::new(name, description, dsl, action, priority).with_tags(tags))
    }

    /// Build a ruleset from external records.
    ///
    /// Invalid records are logged and skipped. If no record survives —
    /// including the empty-source case — the [fallback](Self::fallback_ruleset)
    /// is returned.
    pub fn from_records(records: &[Value]) -> RuleSet {
        let mut rules = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            match Self::parse_record(record) {
                Ok(rule) => rules.push(rule),
                Err(error) => {
                    tracing::warn!(index, error = %error, "skipping invalid rule record");
                }
            }
        }

        if rules.is_empty() {
            tracing::warn!(
                record_count = records.len(),
                "no usable rule records; installing fallback ruleset"
            );
            return Self::fallback_ruleset();
        }

        RuleSet::new(rules)
    }

    /// Build a ruleset from already-typed records, with the same
    /// skip-invalid and fallback semantics as [`Self::from_records`].
    pub fn from_typed_records(records: Vec<RuleRecord>) -> RuleSet {
        let record_count = records.len();
        let mut rules = Vec::with_capacity(record_count);
        for record in records {
            let name = record.name.clone();
            match record.into_rule() {
                Ok(rule) => rules.push(rule),
                Err(error) => {
                    tracing::warn!(rule = %name, error = %error, "skipping invalid rule record");
                }
            }
        }

        if rules.is_empty() {
            tracing::warn!(record_count, "no usable rule records; installing fallback ruleset");
            return Self::fallback_ruleset();
        }

        RuleSet::new(rules)
    }

    /// The hard-coded minimal ruleset installed when a rule source is
    /// entirely unusable. Carries one CRITICAL/BLOCK rule and one
    /// MEDIUM/WARN rule so the engine never runs unprotected.
    pub fn fallback_ruleset() -> RuleSet {
        RuleSet::new(vec![
            Rule::new(
                "fallback_block_destructive_actions",
                "Built-in guard: blocks destructive data actions when no rule source is available",
                r#"or(equals(action, "delete_user_data"), equals(action, "drop_database"), equals(action, "bulk_delete"))"#,
                Action::Block,
                Priority::Critical,
            )
            .with_tags(["fallback"]),
            Rule::new(
                "fallback_warn_external_call",
                "Built-in guard: flags calls leaving the system boundary",
                r#"equals(action, "external_call")"#,
                Action::Warn,
                Priority::Medium,
            )
            .with_tags(["fallback"]),
        ])
    }
}
