//! # Tokenizer
//!
//! Converts rule text into a token stream. The tokenizer carries explicit
//! in-quote state, so commas and parentheses embedded in string literals are
//! never treated as separators — the defect class that string-splitting
//! argument parsers suffer from.

use verdict_core::DslError;

/// A single lexical token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A bare identifier, possibly dotted (`action`, `params.size`,
    /// `context.user.id`). Also covers predicate and operator names.
    Ident(String),
    /// A double-quoted string literal, unescaped.
    Str(String),
    /// A numeric literal.
    Number(serde_json::Number),
    /// The literal `true`.
    True,
    /// The literal `false`.
    False,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `,`
    Comma,
}

/// A token together with its byte offset in the source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    /// The token.
    pub token: Token,
    /// Byte offset of the token's first character.
    pub offset: usize,
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-'
}

/// Tokenize rule text.
///
/// Returns the full token stream or the first lexical error. Never panics,
/// for any input.
pub fn tokenize(src: &str) -> Result<Vec<Spanned>, DslError> {
    let mut tokens = Vec::new();
    let mut chars = src.char_indices().peekable();

    while let Some(&(offset, c)) = chars.peek() {
        match c {
            ' ' | '\t' | '\n' | '\r' => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Spanned { token: Token::LParen, offset });
            }
            ')' => {
                chars.next();
                tokens.push(Spanned { token: Token::RParen, offset });
            }
            ',' => {
                chars.next();
                tokens.push(Spanned { token: Token::Comma, offset });
            }
            '"' => {
                chars.next();
                let value = lex_string(src, offset, &mut chars)?;
                tokens.push(Spanned { token: Token::Str(value), offset });
            }
            '-' | '0'..='9' => {
                let number = lex_number(offset, &mut chars)?;
                tokens.push(Spanned { token: Token::Number(number), offset });
            }
            c if is_ident_start(c) => {
                let mut ident = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if is_ident_continue(c) {
                        ident.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let token = match ident.as_str() {
                    "true" => Token::True,
                    "false" => Token::False,
                    _ => Token::Ident(ident),
                };
                tokens.push(Spanned { token, offset });
            }
            other => {
                return Err(DslError::Syntax {
                    offset,
                    message: format!("unexpected character '{other}'"),
                });
            }
        }
    }

    Ok(tokens)
}

/// Lex the body of a string literal. The opening quote has been consumed.
fn lex_string(
    src: &str,
    start: usize,
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
) -> Result<String, DslError> {
    let mut value = String::new();
    loop {
        match chars.next() {
            Some((_, '"')) => return Ok(value),
            Some((offset, '\\')) => match chars.next() {
                Some((_, '"')) => value.push('"'),
                Some((_, '\\')) => value.push('\\'),
                Some((_, 'n')) => value.push('\n'),
                Some((_, 't')) => value.push('\t'),
                Some((_, 'r')) => value.push('\r'),
                Some((_, other)) => {
                    return Err(DslError::Syntax {
                        offset,
                        message: format!("unsupported escape '\\{other}'"),
                    });
                }
                None => {
                    return Err(DslError::Syntax {
                        offset: src.len(),
                        message: "unterminated escape at end of input".to_string(),
                    });
                }
            },
            Some((_, c)) => value.push(c),
            None => {
                return Err(DslError::Syntax {
                    offset: start,
                    message: "unterminated string literal".to_string(),
                });
            }
        }
    }
}

/// Lex a numeric literal (optional leading minus, decimal point allowed).
fn lex_number(
    start: usize,
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
) -> Result<serde_json::Number, DslError> {
    let mut text = String::new();
    if let Some(&(_, '-')) = chars.peek() {
        text.push('-');
        chars.next();
    }
    while let Some(&(_, c)) = chars.peek() {
        if c.is_ascii_digit() || c == '.' {
            text.push(c);
            chars.next();
        } else {
            break;
        }
    }

    if text.contains('.') {
        let parsed: f64 = text.parse().map_err(|_| DslError::Syntax {
            offset: start,
            message: format!("malformed number \"{text}\""),
        })?;
        serde_json::Number::from_f64(parsed).ok_or_else(|| DslError::Syntax {
            offset: start,
            message: format!("non-finite number \"{text}\""),
        })
    } else {
        let parsed: i64 = text.parse().map_err(|_| DslError::Syntax {
            offset: start,
            message: format!("malformed number \"{text}\""),
        })?;
        Ok(serde_json::Number::from(parsed))
    }
}
