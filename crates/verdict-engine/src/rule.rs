//! # Rules
//!
//! A [`Rule`] binds DSL text to an action, a priority, and a compiled
//! predicate. Compilation happens exactly once, at construction, and
//! construction never fails: a rule whose DSL does not compile is installed
//! with a predicate that matches nothing, so a malformed rule can never
//! fire — and can never take the rest of the ruleset down with it.

use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use verdict_core::{EvaluationFault, RuleLoadError};
use verdict_dsl::{compile, hash_rule, CompiledExpr};

/// The decision a rule contributes when it triggers.
///
/// Ordered by restrictiveness: `Allow < Warn < Block`. Folding triggered
/// rules with `max` implements the decision lattice — once any rule blocks,
/// the result stays blocked.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// No objection.
    Allow,
    /// Proceed, but flag for review.
    Warn,
    /// Refuse the plan.
    Block,
}

impl Action {
    /// The lowercase string form used in records and reasons.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Warn => "warn",
            Self::Block => "block",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = RuleLoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "allow" => Ok(Self::Allow),
            "warn" => Ok(Self::Warn),
            "block" => Ok(Self::Block),
            _ => Err(RuleLoadError::InvalidAction(s.to_string())),
        }
    }
}

/// Evaluation priority. Higher-priority rules are evaluated first; the
/// ordering is part of the deterministic evaluation contract, not a
/// short-circuit (every rule is always evaluated).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Advisory rules.
    Low,
    /// Default tier.
    Medium,
    /// Rules protecting important invariants.
    High,
    /// Safety-critical rules; the fallback ruleset always carries one.
    Critical,
}

impl Priority {
    /// The lowercase string form used in records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = RuleLoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(RuleLoadError::InvalidPriority(s.to_string())),
        }
    }
}

/// The executable form of a rule's condition.
#[derive(Clone)]
pub(crate) enum RulePredicate {
    /// A successfully compiled DSL expression.
    Compiled(Arc<CompiledExpr>),
    /// Installed when the DSL failed to compile; matches nothing.
    Inert,
    /// A caller-supplied predicate. The fallible signature exists so
    /// embedders and fault-injection tests can exercise the engine's
    /// fail-closed path; compiled DSL rules never return `Err`.
    Custom(Arc<dyn Fn(&Value, &Value) -> Result<bool, EvaluationFault> + Send + Sync>),
}

/// A single policy rule: name, DSL condition, action, priority, and the
/// predicate compiled from the DSL. Immutable after construction.
#[derive(Clone)]
pub struct Rule {
    /// Unique rule name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// The DSL source text.
    pub dsl: String,
    /// The decision contributed when this rule triggers.
    pub action: Action,
    /// Evaluation priority.
    pub priority: Priority,
    /// Free-form tags attached by the rule author.
    pub tags: BTreeSet<String>,
    /// Deterministic fingerprint of the DSL text.
    pub dsl_hash: String,
    /// Stable machine-readable code derived from the name, reported in
    /// audit records.
    pub reason_code: String,
    pub(crate) predicate: RulePredicate,
}

impl Rule {
    /// Construct a rule, compiling its DSL.
    ///
    /// Never fails. If the DSL does not compile, the failure is logged and
    /// the rule is installed with an inert predicate that matches nothing.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        dsl: impl Into<String>,
        action: Action,
        priority: Priority,
    ) -> Self {
        let name = name.into();
        let dsl = dsl.into();
        let predicate = match compile(&dsl) {
            Ok(expr) => RulePredicate::Compiled(Arc::new(expr)),
            Err(error) => {
                tracing::warn!(rule = %name, error = %error, "rule DSL failed to compile; rule will never trigger");
                RulePredicate::Inert
            }
        };
        let reason_code = derive_reason_code(&name);
        let dsl_hash = hash_rule(&dsl);
        Self {
            name,
            description: description.into(),
            dsl,
            action,
            priority,
            tags: BTreeSet::new(),
            dsl_hash,
            reason_code,
            predicate,
        }
    }

    /// Attach tags, replacing any existing set.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the compiled predicate with a caller-supplied one.
    ///
    /// The DSL text is kept for identity and audit purposes but is no
    /// longer what executes. Intended for embedders with conditions the
    /// DSL cannot express, and for fault-injection tests.
    pub fn with_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Value, &Value) -> Result<bool, EvaluationFault> + Send + Sync + 'static,
    {
        self.predicate = RulePredicate::Custom(Arc::new(predicate));
        self
    }

    /// Whether the rule's DSL compiled. An inert rule never triggers.
    pub fn is_inert(&self) -> bool {
        matches!(self.predicate, RulePredicate::Inert)
    }

    /// Evaluate this rule's predicate.
    ///
    /// Compiled DSL predicates are total and return `Ok`. `Err` can only
    /// come from a custom predicate; the ruleset layer converts it into a
    /// BLOCK trigger.
    pub fn evaluate(&self, plan: &Value, context: &Value) -> Result<bool, EvaluationFault> {
        match &self.predicate {
            RulePredicate::Compiled(expr) => Ok(expr.evaluate(plan, context)),
            RulePredicate::Inert => Ok(false),
            RulePredicate::Custom(func) => func(plan, context),
        }
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("action", &self.action)
            .field("priority", &self.priority)
            .field("dsl_hash", &self.dsl_hash)
            .field("inert", &self.is_inert())
            .finish()
    }
}

/// Derive the machine-readable reason code from a rule name: upper-cased,
/// with runs of non-alphanumeric characters collapsed to underscores.
fn derive_reason_code(name: &str) -> String {
    let mut code = String::with_capacity(name.len());
    let mut last_was_sep = true;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            code.push(c.to_ascii_uppercase());
            last_was_sep = false;
        } else if !last_was_sep {
            code.push('_');
            last_was_sep = true;
        }
    }
    while code.ends_with('_') {
        code.pop();
    }
    code
}
