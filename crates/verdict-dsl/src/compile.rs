//! # Compiler
//!
//! Lowers the typed AST into a closure bound to `(plan, context)`.
//! Predicate names and arities are resolved here, at compile time, so an
//! unknown predicate is a construction error and evaluation does no string
//! dispatch. Literal regex patterns are compiled once; an invalid literal
//! pattern lowers to a node that matches nothing.
//!
//! A compiled expression is total: evaluation returns a plain `bool` for
//! every `(plan, context)` pair. All runtime faults inside predicates have
//! already been folded to `false` by the predicate library.

use std::sync::OnceLock;

use serde_json::Value;
use verdict_core::{lookup, short_fingerprint, DslError};

use crate::ast::{Arg, Expr, PathRef, PathRoot};
use crate::parser::parse;
use crate::predicate::{self, compare, PredicateKind};

type NodeFn = Box<dyn Fn(&Value, &Value) -> bool + Send + Sync>;

/// A rule expression compiled to an executable predicate.
///
/// Holds the original source text alongside the lowered closure, so callers
/// can fingerprint and display the rule without re-parsing.
pub struct CompiledExpr {
    source: String,
    node: NodeFn,
}

impl CompiledExpr {
    /// Evaluate against a plan and context. Total: never fails, never
    /// panics on any JSON input.
    pub fn evaluate(&self, plan: &Value, context: &Value) -> bool {
        (self.node)(plan, context)
    }

    /// The original rule text.
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl std::fmt::Debug for CompiledExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledExpr")
            .field("source", &self.source)
            .finish()
    }
}

/// Compile rule text into an executable predicate.
///
/// Malformed syntax, unknown predicate names, and arity violations are all
/// compile-time errors. The caller decides what a broken rule means; the
/// engine substitutes an always-false predicate so a broken rule can never
/// trigger.
pub fn compile(src: &str) -> Result<CompiledExpr, DslError> {
    let expr = parse(src)?;
    let node = compile_expr(expr)?;
    Ok(CompiledExpr {
        source: src.to_string(),
        node,
    })
}

/// Compute the deterministic fingerprint of rule text.
///
/// Equal text gives an equal fingerprint; different text a different one
/// with overwhelming probability. Used for rule identity in audit records
/// and for the ruleset hash.
pub fn hash_rule(text: &str) -> String {
    short_fingerprint(text)
}

fn null_value() -> &'static Value {
    static NULL: OnceLock<Value> = OnceLock::new();
    NULL.get_or_init(|| Value::Null)
}

fn resolve<'a>(arg: &'a CompiledArg, plan: &'a Value, context: &'a Value) -> &'a Value {
    match arg {
        CompiledArg::Literal(value) => value,
        CompiledArg::Path(path_ref) => {
            let root = match path_ref.root {
                PathRoot::Plan => plan,
                PathRoot::Context => context,
            };
            lookup(root, &path_ref.path).unwrap_or_else(|| null_value())
        }
    }
}

enum CompiledArg {
    Literal(Value),
    Path(PathRef),
}

impl From<Arg> for CompiledArg {
    fn from(arg: Arg) -> Self {
        match arg {
            Arg::Literal(value) => Self::Literal(value),
            Arg::Path(path_ref) => Self::Path(path_ref),
        }
    }
}

fn compile_expr(expr: Expr) -> Result<NodeFn, DslError> {
    match expr {
        Expr::Logical { op, children } => {
            let compiled: Vec<NodeFn> = children
                .into_iter()
                .map(compile_expr)
                .collect::<Result<_, _>>()?;
            use crate::ast::LogicalOp;
            // Eager: every child is evaluated, no short-circuit.
            Ok(match op {
                LogicalOp::And => Box::new(move |plan, ctx| {
                    compiled
                        .iter()
                        .map(|child| child(plan, ctx))
                        .fold(true, |acc, value| acc & value)
                }),
                LogicalOp::Or => Box::new(move |plan, ctx| {
                    compiled
                        .iter()
                        .map(|child| child(plan, ctx))
                        .fold(false, |acc, value| acc | value)
                }),
                LogicalOp::Not => {
                    // Arity 1 enforced by the parser.
                    let got = compiled.len();
                    let Some(child) = compiled.into_iter().next() else {
                        return Err(DslError::Arity {
                            name: "not".to_string(),
                            expected: "exactly 1",
                            got,
                        });
                    };
                    Box::new(move |plan, ctx| !child(plan, ctx))
                }
            })
        }
        Expr::Predicate { name, args } => {
            let kind = PredicateKind::from_name(&name)
                .ok_or_else(|| DslError::UnknownPredicate(name.clone()))?;
            if args.len() != kind.arity() {
                return Err(DslError::Arity {
                    name,
                    expected: match kind.arity() {
                        1 => "exactly 1",
                        2 => "exactly 2",
                        _ => "exactly 3",
                    },
                    got: args.len(),
                });
            }
            compile_predicate(kind, args)
        }
    }
}

fn compile_predicate(kind: PredicateKind, args: Vec<Arg>) -> Result<NodeFn, DslError> {
    // matches() with a literal pattern compiles the regex once here. An
    // invalid literal pattern lowers to a constant-false node, keeping the
    // bad-pattern contract without paying recompilation per evaluation.
    if kind == PredicateKind::Matches {
        if let Arg::Literal(Value::String(pattern)) = &args[1] {
            let value_arg = CompiledArg::from(args[0].clone());
            return Ok(match regex::Regex::new(pattern) {
                Ok(re) => Box::new(move |plan, ctx| {
                    compare::matches_compiled(resolve(&value_arg, plan, ctx), &re)
                }),
                Err(error) => {
                    tracing::debug!(pattern = %pattern, error = %error, "invalid literal regex pattern; node matches nothing");
                    Box::new(|_, _| false)
                }
            });
        }
    }

    let compiled_args: Vec<CompiledArg> = args.into_iter().map(CompiledArg::from).collect();
    Ok(Box::new(move |plan, ctx| {
        let resolved: Vec<&Value> = compiled_args
            .iter()
            .map(|arg| resolve(arg, plan, ctx))
            .collect();
        predicate::eval(kind, &resolved)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> Value {
        json!({"caller": {"role": "admin", "consent": true}})
    }

    #[test]
    fn compiles_and_evaluates_simple_predicate() {
        let expr = compile(r#"equals(action, "delete_user_data")"#).unwrap();
        assert!(expr.evaluate(&json!({"action": "delete_user_data"}), &ctx()));
        assert!(!expr.evaluate(&json!({"action": "noop"}), &ctx()));
    }

    #[test]
    fn logical_and_or_not() {
        let expr = compile(
            r#"and(equals(action, "upload"), greater_than(params.size, 1000))"#,
        )
        .unwrap();
        assert!(expr.evaluate(&json!({"action": "upload", "params": {"size": 2048}}), &ctx()));
        assert!(!expr.evaluate(&json!({"action": "upload", "params": {"size": 10}}), &ctx()));

        let expr = compile(r#"or(equals(a, 1), equals(a, 2))"#).unwrap();
        assert!(expr.evaluate(&json!({"a": 2}), &ctx()));
        assert!(!expr.evaluate(&json!({"a": 3}), &ctx()));

        let expr = compile(r#"not(is_present(params.dry_run))"#).unwrap();
        assert!(expr.evaluate(&json!({}), &ctx()));
        assert!(!expr.evaluate(&json!({"params": {"dry_run": true}}), &ctx()));
    }

    #[test]
    fn context_paths_resolve_against_context() {
        let expr = compile(r#"equals(context.caller.role, "admin")"#).unwrap();
        assert!(expr.evaluate(&json!({}), &ctx()));
        assert!(!expr.evaluate(&json!({"caller": {"role": "admin"}}), &json!({})));
    }

    #[test]
    fn missing_path_resolves_to_null() {
        let expr = compile("is_empty(params.missing.deeply)").unwrap();
        assert!(expr.evaluate(&json!({}), &ctx()));
        let expr = compile("is_present(params.missing)").unwrap();
        assert!(!expr.evaluate(&json!({}), &ctx()));
    }

    #[test]
    fn unknown_predicate_is_compile_error() {
        assert_eq!(
            compile("frobnicate(a)").unwrap_err(),
            DslError::UnknownPredicate("frobnicate".to_string())
        );
    }

    #[test]
    fn wrong_arity_is_compile_error() {
        assert!(matches!(
            compile("equals(a)").unwrap_err(),
            DslError::Arity { .. }
        ));
        assert!(matches!(
            compile("is_empty(a, b)").unwrap_err(),
            DslError::Arity { .. }
        ));
        assert!(matches!(
            compile("tag_confidence(tags, \"pii\")").unwrap_err(),
            DslError::Arity { .. }
        ));
    }

    #[test]
    fn malformed_syntax_is_compile_error() {
        assert!(compile("equals(a, ").is_err());
        assert!(compile("").is_err());
    }

    #[test]
    fn literal_regex_precompiled_and_matching() {
        let expr = compile(r#"matches(action, "^delete_")"#).unwrap();
        assert!(expr.evaluate(&json!({"action": "delete_user_data"}), &ctx()));
        assert!(!expr.evaluate(&json!({"action": "read"}), &ctx()));
    }

    #[test]
    fn invalid_literal_regex_matches_nothing() {
        let expr = compile(r#"matches(action, "([unclosed")"#).unwrap();
        assert!(!expr.evaluate(&json!({"action": "anything"}), &ctx()));
    }

    #[test]
    fn dynamic_regex_pattern_from_path() {
        let expr = compile("matches(action, context.pattern)").unwrap();
        assert!(expr.evaluate(&json!({"action": "abc"}), &json!({"pattern": "^a"})));
        // Bad dynamic pattern folds to false at evaluation time.
        assert!(!expr.evaluate(&json!({"action": "abc"}), &json!({"pattern": "(["})));
        // Missing dynamic pattern folds to false.
        assert!(!expr.evaluate(&json!({"action": "abc"}), &json!({})));
    }

    #[test]
    fn evaluation_is_total_over_arbitrary_json() {
        let expr = compile(r#"and(greater_than(a, 1), contains(b, "x"))"#).unwrap();
        for plan in [
            json!(null),
            json!([1, 2, 3]),
            json!("scalar"),
            json!({"a": {"deep": []}, "b": 42}),
        ] {
            // Must not panic, whatever the shape.
            let _ = expr.evaluate(&plan, &ctx());
        }
    }

    #[test]
    fn source_is_preserved() {
        let src = r#"equals(action, "x")"#;
        assert_eq!(compile(src).unwrap().source(), src);
    }

    #[test]
    fn hash_rule_stable_and_discriminating() {
        let a = hash_rule(r#"equals(action, "x")"#);
        let b = hash_rule(r#"equals(action, "x")"#);
        let c = hash_rule(r#"equals(action, "y")"#);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 16);
    }

    #[test]
    fn param_predicates_through_compiler() {
        let expr = compile(r#"param_bytes_lte(params.size, "10MB")"#).unwrap();
        // Missing parameter passes.
        assert!(expr.evaluate(&json!({}), &ctx()));
        assert!(expr.evaluate(&json!({"params": {"size": "5MB"}}), &ctx()));
        assert!(!expr.evaluate(&json!({"params": {"size": "20MB"}}), &ctx()));
        assert!(!expr.evaluate(&json!({"params": {"size": "garbage"}}), &ctx()));
    }

    #[test]
    fn tag_predicates_through_compiler() {
        let expr = compile("high_risk_tag_combination(tags)").unwrap();
        assert!(expr.evaluate(&json!({"tags": ["ssn", "credit_card"]}), &ctx()));
        assert!(!expr.evaluate(&json!({"tags": ["ssn"]}), &ctx()));
    }
}
