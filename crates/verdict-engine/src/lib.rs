#![deny(missing_docs)]

//! # verdict-engine — Policy Evaluation Engine
//!
//! Decides ALLOW / WARN / BLOCK for incoming plans by evaluating an
//! immutable, deterministically ordered [`RuleSet`] and fusing rule
//! outcomes through the lattice `Block > Warn > Allow`.
//!
//! ## Fail-Closed Model
//!
//! Every internal fault resolves to the most restrictive visible outcome,
//! layered from the inside out:
//!
//! 1. Predicate faults (bad regex, unparseable quantity, type mismatch)
//!    fold to `false` inside the DSL.
//! 2. A rule whose DSL does not compile is installed inert and never
//!    triggers.
//! 3. A rule whose predicate faults or panics at evaluation time is
//!    recorded as a triggered BLOCK.
//! 4. A fault in evaluation itself collapses the whole result to BLOCK
//!    with reason `evaluation_error`.
//!
//! Nothing internal ever propagates past [`EthicsEngine::evaluate_plan`] or
//! [`EthicsEngine::is_plan_allowed`].
//!
//! ## Example
//!
//! ```
//! use serde_json::json;
//! use verdict_engine::{Action, EthicsEngine, Priority, Rule, RuleSet};
//!
//! let engine = EthicsEngine::new(RuleSet::new(vec![
//!     Rule::new(
//!         "no_user_data_deletion",
//!         "Blocks user data deletion",
//!         r#"equals(action, "delete_user_data")"#,
//!         Action::Block,
//!         Priority::Critical,
//!     ),
//! ]));
//!
//! assert!(!engine.is_plan_allowed(&json!({"action": "delete_user_data"}), &json!({})));
//! assert!(engine.is_plan_allowed(&json!({"action": "read_report"}), &json!({})));
//! ```

pub mod audit;
pub mod engine;
pub mod loader;
pub mod rule;
pub mod ruleset;
mod telemetry;

// Re-export primary types at crate root for ergonomic imports.
pub use audit::{AuditRecord, AuditTrail, DEFAULT_AUDIT_CAPACITY};
pub use engine::{EngineStats, EthicsEngine};
pub use loader::{RuleLoader, RuleRecord};
pub use rule::{Action, Priority, Rule};
pub use ruleset::{EvaluationResult, RuleSet, TriggeredRule};
