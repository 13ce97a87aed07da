//! # EthicsEngine
//!
//! The orchestrator. Owns exactly one [`RuleSet`] and the audit history;
//! everything else is delegated. Many threads may evaluate concurrently:
//! the ruleset is read-only and shared through an `Arc`, and the only
//! mutable state — the audit trail and the aggregate counters — sits behind
//! a `parking_lot` mutex and atomics respectively.
//!
//! All locks are `parking_lot`, not `std::sync`: non-poisonable, so a
//! panicking writer cannot permanently wedge the engine, and never held
//! while evaluating.
//!
//! There is no process-wide singleton accessor. Construct the engine in
//! your composition root and pass it where it is needed; if one shared
//! instance is desired, wrap it in an `Arc` there.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::audit::{AuditRecord, AuditTrail, DEFAULT_AUDIT_CAPACITY};
use crate::rule::Action;
use crate::ruleset::{EvaluationResult, RuleSet};
use crate::telemetry;

/// How many recent audit records [`EthicsEngine::get_stats`] returns.
const STATS_RECENT_TAIL: usize = 10;

/// Read-only aggregate statistics for an engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStats {
    /// Total evaluations performed since construction.
    pub total_evaluations: u64,
    /// Evaluations that resolved to allow.
    pub allowed: u64,
    /// Evaluations that resolved to warn.
    pub warned: u64,
    /// Evaluations that resolved to block.
    pub blocked: u64,
    /// Hash of the currently active ruleset.
    pub ruleset_hash: String,
    /// Number of rules in the active ruleset.
    pub rule_count: usize,
    /// Records currently held in the audit trail.
    pub audit_len: usize,
    /// The most recent audit records, oldest first.
    pub recent: Vec<AuditRecord>,
}

/// The policy evaluation orchestrator.
///
/// Thread-safe: share it behind an `Arc` and call from as many threads as
/// needed. Evaluation is pure CPU work over the immutable ruleset; the
/// audit append is the only section that takes a lock.
pub struct EthicsEngine {
    ruleset: RwLock<Arc<RuleSet>>,
    audit: Mutex<AuditTrail>,
    total: AtomicU64,
    allowed: AtomicU64,
    warned: AtomicU64,
    blocked: AtomicU64,
}

impl EthicsEngine {
    /// Create an engine with the default audit capacity.
    pub fn new(ruleset: RuleSet) -> Self {
        Self::with_audit_capacity(ruleset, DEFAULT_AUDIT_CAPACITY)
    }

    /// Create an engine with an explicit audit capacity.
    pub fn with_audit_capacity(ruleset: RuleSet, capacity: usize) -> Self {
        Self {
            ruleset: RwLock::new(Arc::new(ruleset)),
            audit: Mutex::new(AuditTrail::new(capacity)),
            total: AtomicU64::new(0),
            allowed: AtomicU64::new(0),
            warned: AtomicU64::new(0),
            blocked: AtomicU64::new(0),
        }
    }

    /// Evaluate a plan against the active ruleset and record the outcome.
    ///
    /// Inherits the ruleset's fail-closed contract: this method cannot fail
    /// and cannot panic; internal faults surface as a BLOCK result.
    pub fn evaluate_plan(&self, plan: &Value, context: &Value) -> EvaluationResult {
        // Clone the Arc and drop the read guard before evaluating, so a
        // concurrent reload never waits on an in-flight evaluation.
        let ruleset = Arc::clone(&self.ruleset.read());
        let result = ruleset.evaluate(plan, context);

        self.total.fetch_add(1, Ordering::Relaxed);
        match result.action {
            Action::Allow => self.allowed.fetch_add(1, Ordering::Relaxed),
            Action::Warn => self.warned.fetch_add(1, Ordering::Relaxed),
            Action::Block => self.blocked.fetch_add(1, Ordering::Relaxed),
        };

        telemetry::record_evaluation(&result);
        self.audit.lock().append(AuditRecord::from_result(&result));

        result
    }

    /// Whether the plan may proceed. WARN counts as allowed.
    pub fn is_plan_allowed(&self, plan: &Value, context: &Value) -> bool {
        self.evaluate_plan(plan, context).action != Action::Block
    }

    /// Atomically swap in a new ruleset.
    ///
    /// A single pointer swap: in-flight evaluations finish against the set
    /// they started with, and no reader ever observes a partially
    /// constructed set.
    pub fn reload(&self, ruleset: RuleSet) {
        let ruleset = Arc::new(ruleset);
        let hash = ruleset.ruleset_hash().to_string();
        *self.ruleset.write() = ruleset;
        tracing::info!(ruleset_hash = %hash, "ruleset reloaded");
    }

    /// A handle to the active ruleset.
    pub fn ruleset(&self) -> Arc<RuleSet> {
        Arc::clone(&self.ruleset.read())
    }

    /// Read-only aggregate counts and a tail of recent evaluations.
    pub fn get_stats(&self) -> EngineStats {
        let ruleset = self.ruleset();
        let audit = self.audit.lock();
        EngineStats {
            total_evaluations: self.total.load(Ordering::Relaxed),
            allowed: self.allowed.load(Ordering::Relaxed),
            warned: self.warned.load(Ordering::Relaxed),
            blocked: self.blocked.load(Ordering::Relaxed),
            ruleset_hash: ruleset.ruleset_hash().to_string(),
            rule_count: ruleset.len(),
            audit_len: audit.len(),
            recent: audit.recent(STATS_RECENT_TAIL),
        }
    }
}

impl std::fmt::Debug for EthicsEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EthicsEngine")
            .field("rule_count", &self.ruleset().len())
            .field("total_evaluations", &self.total.load(Ordering::Relaxed))
            .finish()
    }
}
