//! # Audit Trail
//!
//! Records every evaluation for later review. Audit records are redacted by
//! construction: they carry hashes, rule identifiers, and reason codes —
//! never plan or context contents, which may hold exactly the sensitive data
//! the rules exist to protect.
//!
//! The trail is a capped ring buffer. When full, the oldest record is
//! evicted on each append. Persistence is a caller concern; consumers that
//! need durable history should drain [`AuditTrail::recent`] into their own
//! store.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use verdict_core::Timestamp;

use crate::rule::Action;
use crate::ruleset::EvaluationResult;

/// Default audit history capacity.
pub const DEFAULT_AUDIT_CAPACITY: usize = 1000;

/// A redacted record of one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Unique record identifier.
    pub id: Uuid,
    /// When the evaluation finished.
    pub timestamp: Timestamp,
    /// Fingerprint of the evaluated plan.
    pub plan_hash: String,
    /// Fingerprint of the (plan, context) pair.
    pub facts_hash: String,
    /// The fused decision.
    pub action: Action,
    /// Names of the rules that fired, in evaluation order.
    pub triggered_rule_ids: Vec<String>,
    /// Reason codes for the fired rules, in evaluation order.
    pub reason_codes: Vec<String>,
    /// Evaluation wall-clock time in microseconds.
    pub duration_micros: u64,
    /// Hash of the ruleset that produced the decision.
    pub ruleset_hash: String,
}

impl AuditRecord {
    /// Build a redacted record from an evaluation result.
    pub fn from_result(result: &EvaluationResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Timestamp::now(),
            plan_hash: result.plan_hash.clone(),
            facts_hash: result.facts_hash.clone(),
            action: result.action,
            triggered_rule_ids: result
                .triggered_rules
                .iter()
                .map(|t| t.name.clone())
                .collect(),
            reason_codes: result
                .triggered_rules
                .iter()
                .map(|t| t.reason_code.clone())
                .collect(),
            duration_micros: result.duration.as_micros() as u64,
            ruleset_hash: result.ruleset_hash.clone(),
        }
    }
}

/// A bounded, oldest-first-evicting history of evaluation records.
///
/// Not internally synchronized; the engine wraps it in a mutex. The type
/// itself stays lock-free so it can be tested and reused without one.
#[derive(Debug)]
pub struct AuditTrail {
    records: VecDeque<AuditRecord>,
    capacity: usize,
}

impl AuditTrail {
    /// Create a trail holding at most `capacity` records. A zero capacity
    /// is treated as one: a trail that can never record anything would
    /// silently discard the evidence the audit exists to keep.
    pub fn new(capacity: usize) -> Self {
        Self {
            records: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Append a record, evicting the oldest when at capacity.
    pub fn append(&mut self, record: AuditRecord) {
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// The number of records currently held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the trail is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The most recent `n` records, oldest first.
    pub fn recent(&self, n: usize) -> Vec<AuditRecord> {
        let start = self.records.len().saturating_sub(n);
        self.records.iter().skip(start).cloned().collect()
    }

    /// Count records by decision.
    pub fn count_by_action(&self, action: Action) -> usize {
        self.records.iter().filter(|r| r.action == action).count()
    }
}

impl Default for AuditTrail {
    fn default() -> Self {
        Self::new(DEFAULT_AUDIT_CAPACITY)
    }
}
