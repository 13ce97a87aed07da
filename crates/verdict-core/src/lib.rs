#![deny(missing_docs)]

//! # verdict-core — Foundational Types for the Verdict Policy Evaluator
//!
//! This crate defines the foundational types that every other crate in the
//! workspace depends on. It has no internal crate dependencies — only `serde`,
//! `serde_json`, `thiserror`, `chrono`, and `sha2` from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **[`CanonicalBytes`] is the sole path to digest computation.** Every
//!    plan hash, facts hash, and ruleset hash in the workspace flows through
//!    `CanonicalBytes::new()`, which applies recursive key sorting, compact
//!    separators, and datetime normalization before serialization.
//!
//! 2. **Digests are correlation fingerprints, not security proofs.** They
//!    exist so audit records can be matched to the plans that produced them
//!    without storing plan contents.
//!
//! 3. **Structured errors with `thiserror`.** No `Box<dyn Error>`, no
//!    `.unwrap()` outside tests. The error hierarchy mirrors the fail-closed
//!    fault taxonomy: compile-time DSL errors never escape rule construction,
//!    and evaluation faults collapse to the most restrictive decision at the
//!    engine boundary.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod path;
pub mod temporal;

// Re-export primary types at crate root for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, short_fingerprint, ContentDigest};
pub use error::{CanonicalizationError, DslError, EvaluationFault, RuleLoadError};
pub use path::lookup;
pub use temporal::Timestamp;
