#![deny(missing_docs)]

//! # verdict-dsl — Rule Expression Language
//!
//! A small expression DSL for policy rules, compiled into executable
//! predicates over a `(plan, context)` pair of JSON values.
//!
//! ## Syntax
//!
//! ASCII function-call form:
//!
//! ```text
//! and(equals(action, "delete_user_data"), greater_than(params.size, 1000))
//! ```
//!
//! String literals are double-quoted, numbers and booleans are bare, and
//! bare identifiers are dotted paths into the plan. Paths prefixed with
//! `context.` resolve against the context instead. Logical operators
//! (`and`, `or`, `not`) take nested expressions; predicates take only
//! literals and path references.
//!
//! ## Pipeline
//!
//! [`tokenize`](token::tokenize) → [`parse`](parser::parse) →
//! [`compile`](compile::compile). Each stage is total over its input:
//! malformed text produces a [`DslError`](verdict_core::DslError) at compile
//! time, and a compiled expression never fails at evaluation time — every
//! runtime fault inside a predicate folds to `false`.
//!
//! ## Fail-Closed Contract
//!
//! The predicate library converts faults (bad regex, non-numeric operands,
//! unparseable quantities, malformed URLs) into `false`, never an error.
//! Compile errors are surfaced to the caller, who must substitute an
//! always-false predicate for the broken rule.

pub mod ast;
pub mod compile;
pub mod parser;
pub mod predicate;
pub mod token;

pub use ast::{Arg, Expr, LogicalOp, PathRef, PathRoot};
pub use compile::{compile, hash_rule, CompiledExpr};
pub use parser::parse;
