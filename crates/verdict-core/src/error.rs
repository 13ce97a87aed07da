//! # Error Hierarchy
//!
//! Structured error types for the verdict workspace, built with `thiserror`.
//! No `Box<dyn Error>`, no `.unwrap()` outside tests.
//!
//! The hierarchy mirrors the fail-closed fault taxonomy:
//!
//! - [`DslError`] — compile-time rule failures. Never escapes rule
//!   construction: the rule is installed with an always-false predicate.
//! - [`EvaluationFault`] — runtime failures inside the evaluator. Caught at
//!   the ruleset layer (the faulting rule becomes a BLOCK trigger) or at the
//!   engine boundary (the whole result collapses to BLOCK).
//! - [`RuleLoadError`] — per-record loader failures. Logged and skipped;
//!   a fully unusable source falls back to the built-in protective ruleset.
//! - [`CanonicalizationError`] — digest-input serialization failures.

use thiserror::Error;

/// Compile-time errors for rule DSL text.
///
/// These are produced by the tokenizer, parser, and compiler. They never
/// propagate past rule construction — a rule whose DSL fails to compile is
/// installed with a predicate that matches nothing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DslError {
    /// The DSL text failed to tokenize or parse.
    #[error("syntax error at offset {offset}: {message}")]
    Syntax {
        /// Byte offset into the rule text where the error was detected.
        offset: usize,
        /// What the tokenizer or parser expected or rejected.
        message: String,
    },

    /// The expression names a predicate the library does not provide.
    #[error("unknown predicate \"{0}\"")]
    UnknownPredicate(String),

    /// A predicate or logical operator was called with the wrong number
    /// of arguments.
    #[error("\"{name}\" expects {expected} argument(s), got {got}")]
    Arity {
        /// The predicate or operator name.
        name: String,
        /// Human-readable description of the expected argument count.
        expected: &'static str,
        /// The number of arguments actually supplied.
        got: usize,
    },

    /// The expression is empty.
    #[error("empty rule expression")]
    Empty,
}

/// Runtime faults inside the evaluator.
///
/// Compiled DSL predicates fold their own failures to `false` and never
/// return these. The variants exist so that systemic faults — injected
/// predicates, panics, internal bugs — travel through a typed channel and
/// are collapsed to BLOCK at the boundary instead of escaping.
#[derive(Error, Debug, Clone)]
pub enum EvaluationFault {
    /// A single rule's predicate failed during evaluation.
    #[error("rule \"{rule}\" faulted during evaluation: {message}")]
    Rule {
        /// Name of the faulting rule.
        rule: String,
        /// Description of the failure.
        message: String,
    },

    /// A predicate panicked; the payload is the panic message if it was
    /// a string.
    #[error("evaluation panicked: {0}")]
    Panic(String),

    /// An internal invariant was violated somewhere outside any single rule.
    #[error("internal evaluation failure: {0}")]
    Internal(String),
}

/// Per-record failures while loading external rule definitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleLoadError {
    /// The record is missing a required field.
    #[error("missing required field \"{0}\"")]
    MissingField(&'static str),

    /// The record's action is not one of allow/warn/block.
    #[error("invalid action \"{0}\" (expected allow, warn, or block)")]
    InvalidAction(String),

    /// The record's priority is not one of low/medium/high/critical.
    #[error("invalid priority \"{0}\" (expected low, medium, high, or critical)")]
    InvalidPriority(String),

    /// The record is not a JSON object.
    #[error("rule record is not a JSON object")]
    NotAnObject,

    /// A required field is present but has the wrong type.
    #[error("field \"{field}\" must be {expected}")]
    WrongType {
        /// The offending field name.
        field: &'static str,
        /// The expected JSON type.
        expected: &'static str,
    },
}

/// Errors during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// JSON serialization failed during canonicalization.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
