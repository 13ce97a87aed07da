//! # Typed AST
//!
//! The tagged-union expression tree produced by the parser. Logical nodes
//! hold child expressions; predicate nodes hold only literal and path-ref
//! arguments. Path references are rooted at either the plan or the context,
//! decided once at parse time from the `context.` prefix.

use serde_json::Value;

/// A logical combinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    /// True when every child is true. Eager: all children are evaluated.
    And,
    /// True when any child is true. Eager: all children are evaluated.
    Or,
    /// Negates its single child.
    Not,
}

impl LogicalOp {
    /// Return the operator keyword, or `None` if the identifier is not a
    /// logical operator.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "and" => Some(Self::And),
            "or" => Some(Self::Or),
            "not" => Some(Self::Not),
            _ => None,
        }
    }

    /// The operator keyword as it appears in rule text.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "not",
        }
    }
}

impl std::fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which value a path reference resolves against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathRoot {
    /// The plan under evaluation.
    Plan,
    /// The ambient context.
    Context,
}

/// A dotted path reference in rule text.
///
/// `context.user.id` resolves `user.id` against the context; every other
/// identifier resolves against the plan. A bare `context` refers to the
/// whole context value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRef {
    /// The root the path resolves against.
    pub root: PathRoot,
    /// The dotted path below the root (may be empty for the root itself).
    pub path: String,
}

impl PathRef {
    /// Classify an identifier into a rooted path reference.
    pub fn from_ident(ident: &str) -> Self {
        if let Some(rest) = ident.strip_prefix("context.") {
            Self {
                root: PathRoot::Context,
                path: rest.to_string(),
            }
        } else if ident == "context" {
            Self {
                root: PathRoot::Context,
                path: String::new(),
            }
        } else {
            Self {
                root: PathRoot::Plan,
                path: ident.to_string(),
            }
        }
    }
}

/// An argument to a predicate call.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// A string, number, or boolean literal.
    Literal(Value),
    /// A dotted path reference, resolved at evaluation time.
    Path(PathRef),
}

/// A rule expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `and(...)`, `or(...)`, or `not(...)` over child expressions.
    Logical {
        /// The combinator.
        op: LogicalOp,
        /// Child expressions (exactly one for `not`).
        children: Vec<Expr>,
    },
    /// A predicate call with literal/path arguments.
    Predicate {
        /// The predicate name.
        name: String,
        /// The arguments in call order.
        args: Vec<Arg>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logical_op_from_name() {
        assert_eq!(LogicalOp::from_name("and"), Some(LogicalOp::And));
        assert_eq!(LogicalOp::from_name("or"), Some(LogicalOp::Or));
        assert_eq!(LogicalOp::from_name("not"), Some(LogicalOp::Not));
        assert_eq!(LogicalOp::from_name("equals"), None);
    }

    #[test]
    fn logical_op_display() {
        assert_eq!(LogicalOp::And.to_string(), "and");
        assert_eq!(LogicalOp::Not.to_string(), "not");
    }

    #[test]
    fn path_ref_plan_rooted_by_default() {
        let p = PathRef::from_ident("params.size");
        assert_eq!(p.root, PathRoot::Plan);
        assert_eq!(p.path, "params.size");
    }

    #[test]
    fn path_ref_context_prefix_strips() {
        let p = PathRef::from_ident("context.user.id");
        assert_eq!(p.root, PathRoot::Context);
        assert_eq!(p.path, "user.id");
    }

    #[test]
    fn bare_context_is_whole_context() {
        let p = PathRef::from_ident("context");
        assert_eq!(p.root, PathRoot::Context);
        assert_eq!(p.path, "");
    }

    #[test]
    fn context_like_plan_key_stays_plan_rooted() {
        // "contexts" is a plan key, not the context root.
        let p = PathRef::from_ident("contexts.region");
        assert_eq!(p.root, PathRoot::Plan);
        assert_eq!(p.path, "contexts.region");
    }
}
