//! # Recursive-Descent Parser
//!
//! Parses a token stream into the typed AST. The grammar:
//!
//! ```text
//! expr           := logical_call | predicate_call
//! logical_call   := ("and" | "or" | "not") "(" expr_list ")"
//! predicate_call := IDENT "(" arg_list ")"
//! arg            := STRING | NUMBER | BOOL | path_ident
//! ```
//!
//! Nested calls are only valid under logical operators; predicate arguments
//! are literals and path references. Arity for `not` (exactly one child) is
//! enforced here, so a compiled `not` node can never see the wrong number of
//! children.

use serde_json::Value;
use verdict_core::DslError;

use crate::ast::{Arg, Expr, LogicalOp, PathRef};
use crate::token::{tokenize, Spanned, Token};

/// Parse rule text into an expression tree.
///
/// Returns the first syntax error encountered. Never panics, for any input.
pub fn parse(src: &str) -> Result<Expr, DslError> {
    let tokens = tokenize(src)?;
    if tokens.is_empty() {
        return Err(DslError::Empty);
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        src_len: src.len(),
    };
    let expr = parser.parse_expr()?;
    if let Some(extra) = parser.peek() {
        return Err(DslError::Syntax {
            offset: extra.offset,
            message: "trailing input after expression".to_string(),
        });
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    src_len: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Spanned> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Spanned> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eof_error(&self, expected: &str) -> DslError {
        DslError::Syntax {
            offset: self.src_len,
            message: format!("unexpected end of input, expected {expected}"),
        }
    }

    fn expect(&mut self, want: &Token, expected: &str) -> Result<(), DslError> {
        match self.next() {
            Some(spanned) if &spanned.token == want => Ok(()),
            Some(spanned) => Err(DslError::Syntax {
                offset: spanned.offset,
                message: format!("expected {expected}"),
            }),
            None => Err(self.eof_error(expected)),
        }
    }

    fn parse_expr(&mut self) -> Result<Expr, DslError> {
        let head = self.next().ok_or_else(|| self.eof_error("an expression"))?;
        let name = match head.token {
            Token::Ident(name) => name,
            _ => {
                return Err(DslError::Syntax {
                    offset: head.offset,
                    message: "expected a predicate or operator name".to_string(),
                });
            }
        };

        self.expect(&Token::LParen, "'('")?;

        if let Some(op) = LogicalOp::from_name(&name) {
            let children = self.parse_expr_list()?;
            check_logical_arity(op, children.len())?;
            Ok(Expr::Logical { op, children })
        } else {
            let args = self.parse_arg_list()?;
            Ok(Expr::Predicate { name, args })
        }
    }

    /// Parse a comma-separated list of expressions, consuming the closing
    /// paren.
    fn parse_expr_list(&mut self) -> Result<Vec<Expr>, DslError> {
        let mut children = Vec::new();
        if matches!(self.peek().map(|s| &s.token), Some(Token::RParen)) {
            self.next();
            return Ok(children);
        }
        loop {
            children.push(self.parse_expr()?);
            match self.next() {
                Some(Spanned { token: Token::Comma, .. }) => continue,
                Some(Spanned { token: Token::RParen, .. }) => return Ok(children),
                Some(spanned) => {
                    return Err(DslError::Syntax {
                        offset: spanned.offset,
                        message: "expected ',' or ')'".to_string(),
                    });
                }
                None => return Err(self.eof_error("',' or ')'")),
            }
        }
    }

    /// Parse a comma-separated list of literal/path arguments, consuming the
    /// closing paren.
    fn parse_arg_list(&mut self) -> Result<Vec<Arg>, DslError> {
        let mut args = Vec::new();
        if matches!(self.peek().map(|s| &s.token), Some(Token::RParen)) {
            self.next();
            return Ok(args);
        }
        loop {
            args.push(self.parse_arg()?);
            match self.next() {
                Some(Spanned { token: Token::Comma, .. }) => continue,
                Some(Spanned { token: Token::RParen, .. }) => return Ok(args),
                Some(spanned) => {
                    return Err(DslError::Syntax {
                        offset: spanned.offset,
                        message: "expected ',' or ')'".to_string(),
                    });
                }
                None => return Err(self.eof_error("',' or ')'")),
            }
        }
    }

    fn parse_arg(&mut self) -> Result<Arg, DslError> {
        let spanned = self.next().ok_or_else(|| self.eof_error("an argument"))?;
        match spanned.token {
            Token::Str(s) => Ok(Arg::Literal(Value::String(s))),
            Token::Number(n) => Ok(Arg::Literal(Value::Number(n))),
            Token::True => Ok(Arg::Literal(Value::Bool(true))),
            Token::False => Ok(Arg::Literal(Value::Bool(false))),
            Token::Ident(ident) => {
                // A call here would mean a nested predicate inside a
                // predicate's argument list, which the grammar forbids.
                if matches!(self.peek().map(|s| &s.token), Some(Token::LParen)) {
                    return Err(DslError::Syntax {
                        offset: spanned.offset,
                        message: format!(
                            "nested call \"{ident}(...)\" is only valid under and/or/not"
                        ),
                    });
                }
                Ok(Arg::Path(PathRef::from_ident(&ident)))
            }
            _ => Err(DslError::Syntax {
                offset: spanned.offset,
                message: "expected a literal or path reference".to_string(),
            }),
        }
    }
}

fn check_logical_arity(op: LogicalOp, got: usize) -> Result<(), DslError> {
    match op {
        LogicalOp::Not if got != 1 => Err(DslError::Arity {
            name: "not".to_string(),
            expected: "exactly 1",
            got,
        }),
        LogicalOp::And | LogicalOp::Or if got == 0 => Err(DslError::Arity {
            name: op.as_str().to_string(),
            expected: "at least 1",
            got,
        }),
        _ => Ok(()),
    }
}
