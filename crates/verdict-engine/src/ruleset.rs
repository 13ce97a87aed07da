//! # RuleSet and the Decision Lattice
//!
//! A [`RuleSet`] is an immutable, deterministically ordered collection of
//! rules. Evaluation visits every rule — there is no short-circuit, so the
//! audit trail records the complete set of triggered rules even after the
//! decision is already BLOCK — and fuses outcomes through the lattice
//! `Block > Warn > Allow`.
//!
//! ## Determinism
//!
//! Given identical rules, plan, and context, evaluation produces identical
//! results, including trigger order. This is guaranteed by:
//! - sorted rule iteration (priority descending, then name)
//! - pure predicate evaluation (no side effects)
//! - a ruleset hash computed over the sorted rules
//!
//! ## Fail-Closed Layers
//!
//! Predicate-internal faults already fold to `false` inside the DSL. This
//! layer adds two stronger guarantees: a rule whose predicate returns a
//! fault *or panics* is recorded as a triggered BLOCK rather than vanishing,
//! and a fault in the evaluation method itself collapses the whole result to
//! BLOCK. Nothing internal ever propagates to the caller.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use verdict_core::{sha256_digest, CanonicalBytes, EvaluationFault};

use crate::rule::{Action, Rule};

/// Reason string recorded when nothing fires.
const NO_RULES_TRIGGERED: &str = "allow: no_rules_triggered";

/// Reason code recorded for faulting rules and degraded results.
const EVALUATION_ERROR: &str = "EVALUATION_ERROR";

/// Marker recorded when plan or facts could not be canonicalized. Hashing
/// failures must not decide an evaluation.
const UNHASHABLE: &str = "unhashable";

/// A rule that fired during one evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggeredRule {
    /// The rule name.
    pub name: String,
    /// The action the rule contributed. For a faulting rule this is
    /// [`Action::Block`] regardless of the rule's declared action.
    pub action: Action,
    /// The rule's reason code, or `EVALUATION_ERROR` for a faulting rule.
    pub reason_code: String,
    /// Fingerprint of the rule's DSL text.
    pub dsl_hash: String,
}

/// The outcome of evaluating a plan against a ruleset.
///
/// Created fresh per call and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// The fused decision.
    pub action: Action,
    /// Every rule that fired, in evaluation order.
    pub triggered_rules: Vec<TriggeredRule>,
    /// Human-readable reasons, one per trigger, or the no-rules default.
    pub reasons: Vec<String>,
    /// Fingerprint of the canonical plan.
    pub plan_hash: String,
    /// Fingerprint of the canonical (plan, context) pair.
    pub facts_hash: String,
    /// Hash of the ruleset that produced this result.
    pub ruleset_hash: String,
    /// Wall-clock evaluation time.
    #[serde(with = "duration_micros")]
    pub duration: Duration,
}

/// Serialize durations as integer microseconds so results stay canonical.
mod duration_micros {
    use super::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_micros() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let micros = u64::deserialize(d)?;
        Ok(Duration::from_micros(micros))
    }
}

/// An immutable, deterministically ordered set of rules.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
    ruleset_hash: String,
}

impl RuleSet {
    /// Build a ruleset, sorting rules by priority descending then name
    /// ascending, and computing the ruleset hash over the sorted order.
    pub fn new(mut rules: Vec<Rule>) -> Self {
        rules.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| a.name.cmp(&b.name))
        });
        let ruleset_hash = compute_ruleset_hash(&rules);
        Self {
            rules,
            ruleset_hash,
        }
    }

    /// The rules in evaluation order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// The number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the set holds no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The deterministic fingerprint over every rule's
    /// (name, dsl, action, priority).
    pub fn ruleset_hash(&self) -> &str {
        &self.ruleset_hash
    }

    /// Evaluate a plan against every rule and fuse the outcomes.
    ///
    /// This method cannot fail and cannot panic: any internal fault —
    /// including a panicking predicate — degrades the result to BLOCK with
    /// an `evaluation_error` reason. See the module docs for the layered
    /// fail-closed model.
    pub fn evaluate(&self, plan: &Value, context: &Value) -> EvaluationResult {
        let started = Instant::now();
        let outcome = catch_unwind(AssertUnwindSafe(|| self.evaluate_inner(plan, context)));
        let duration = started.elapsed();

        match outcome {
            Ok(Ok(mut result)) => {
                result.duration = duration;
                result
            }
            Ok(Err(fault)) => {
                tracing::error!(error = %fault, "evaluation degraded to block");
                self.degraded_result(plan, context, duration)
            }
            Err(_) => {
                tracing::error!("evaluation panicked outside rule scope; degraded to block");
                self.degraded_result(plan, context, duration)
            }
        }
    }

    /// The fallible core of evaluation. Per-rule faults are handled here;
    /// an `Err` from this function means the evaluation machinery itself
    /// failed and the public wrapper must degrade the result.
    fn evaluate_inner(
        &self,
        plan: &Value,
        context: &Value,
    ) -> Result<EvaluationResult, EvaluationFault> {
        let mut triggered = Vec::new();
        let mut reasons = Vec::new();
        let mut highest = Action::Allow;

        for rule in &self.rules {
            let verdict = catch_unwind(AssertUnwindSafe(|| rule.evaluate(plan, context)));
            match verdict {
                Ok(Ok(true)) => {
                    highest = highest.max(rule.action);
                    reasons.push(format!("{}: {}", rule.action.as_str(), rule.name));
                    triggered.push(TriggeredRule {
                        name: rule.name.clone(),
                        action: rule.action,
                        reason_code: rule.reason_code.clone(),
                        dsl_hash: rule.dsl_hash.clone(),
                    });
                }
                Ok(Ok(false)) => {}
                Ok(Err(fault)) => {
                    tracing::warn!(rule = %rule.name, error = %fault, "rule faulted; recorded as block trigger");
                    highest = Action::Block;
                    reasons.push(format!("block: evaluation_error ({})", rule.name));
                    triggered.push(TriggeredRule {
                        name: rule.name.clone(),
                        action: Action::Block,
                        reason_code: EVALUATION_ERROR.to_string(),
                        dsl_hash: rule.dsl_hash.clone(),
                    });
                }
                Err(panic) => {
                    let message = panic_message(panic.as_ref());
                    tracing::warn!(rule = %rule.name, message = %message, "rule panicked; recorded as block trigger");
                    highest = Action::Block;
                    reasons.push(format!("block: evaluation_error ({})", rule.name));
                    triggered.push(TriggeredRule {
                        name: rule.name.clone(),
                        action: Action::Block,
                        reason_code: EVALUATION_ERROR.to_string(),
                        dsl_hash: rule.dsl_hash.clone(),
                    });
                }
            }
        }

        if reasons.is_empty() {
            reasons.push(NO_RULES_TRIGGERED.to_string());
        }

        Ok(EvaluationResult {
            action: highest,
            triggered_rules: triggered,
            reasons,
            plan_hash: hash_value(plan),
            facts_hash: hash_facts(plan, context),
            ruleset_hash: self.ruleset_hash.clone(),
            duration: Duration::ZERO,
        })
    }

    /// The most restrictive result, produced when evaluation itself faults.
    fn degraded_result(
        &self,
        plan: &Value,
        context: &Value,
        duration: Duration,
    ) -> EvaluationResult {
        EvaluationResult {
            action: Action::Block,
            triggered_rules: Vec::new(),
            reasons: vec!["block: evaluation_error".to_string()],
            plan_hash: hash_value(plan),
            facts_hash: hash_facts(plan, context),
            ruleset_hash: self.ruleset_hash.clone(),
            duration,
        }
    }
}

/// Fingerprint a value, degrading to a marker if canonicalization fails.
fn hash_value(value: &Value) -> String {
    match CanonicalBytes::new(value) {
        Ok(bytes) => sha256_digest(&bytes).short(),
        Err(error) => {
            tracing::warn!(error = %error, "canonicalization failed; hash unavailable");
            UNHASHABLE.to_string()
        }
    }
}

/// Fingerprint the full evaluation input: the plan together with its
/// context.
fn hash_facts(plan: &Value, context: &Value) -> String {
    hash_value(&json!({"plan": plan, "context": context}))
}

/// The ruleset hash covers every rule's identity-bearing fields in sorted
/// order. Changing any rule's dsl, action, or priority — or adding,
/// removing, or renaming a rule — changes the hash.
fn compute_ruleset_hash(rules: &[Rule]) -> String {
    let mut manifest = String::new();
    for rule in rules {
        manifest.push_str(&rule.name);
        manifest.push('\x1f');
        manifest.push_str(&rule.dsl);
        manifest.push('\x1f');
        manifest.push_str(rule.action.as_str());
        manifest.push('\x1f');
        manifest.push_str(rule.priority.as_str());
        manifest.push('\x1e');
    }
    verdict_dsl::hash_rule(&manifest)
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
