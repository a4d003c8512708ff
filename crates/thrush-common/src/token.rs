//! Token representation shared by the lexer, parser, and combinators.

use serde::{Deserialize, Serialize};

use crate::span::Location;

/// The coarse class a token belongs to.
///
/// `Comment` is reserved but never emitted by the lexer -- comments are
/// skipped as trivia, the same way whitespace is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    Number,
    String,
    Identifier,
    Keyword,
    Operator,
    Punctuation,
    Accessor,
    Comment,
    Eof,
}

/// A single lexical token: a kind, its verbatim source text, and the
/// location it was scanned from.
///
/// Tokens are immutable once produced. Every token except `Eof` carries a
/// non-empty `value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub location: Location,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, location: Location) -> Self {
        Self {
            kind,
            value: value.into(),
            location,
        }
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

/// The fixed keyword set. Any identifier-shaped token that matches one of
/// these becomes a `Keyword` token instead of an `Identifier`.
pub const KEYWORDS: &[&str] = &[
    "if", "then", "else", "let", "in", "fn", "import", "mut", "mut!", "where", "variant", "type",
    "match", "with", "given", "is", "has", "and", "or", "implements", "constraint", "implement",
    "Float", "Number", "String", "Unit", "List", "Unknown",
];

pub fn is_keyword(text: &str) -> bool {
    KEYWORDS.contains(&text)
}

/// Operators in longest-match-first order. The lexer tries each prefix of
/// the remaining input against this list before falling back to a
/// single-character operator.
pub const OPERATORS: &[&str] = &[
    "|?", "|>", "<|", "==", "!=", "<=", ">=", "=>", "->", "+", "-", "*", "%", "/", "<", ">", "=",
    "|", "$",
];

/// Single-character operator fallback set, used when no multi-character
/// operator in [`OPERATORS`] matches.
pub const SINGLE_CHAR_OPERATORS: &[char] = &['+', '-', '*', '/', '%', '<', '>', '=', '!', '|', '$'];

/// The fixed effect-tag vocabulary function types may be annotated with.
pub const EFFECTS: &[&str] = &["log", "read", "write", "state", "time", "rand", "ffi", "async"];

pub fn is_effect(name: &str) -> bool {
    EFFECTS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_membership() {
        assert!(is_keyword("fn"));
        assert!(is_keyword("mut!"));
        assert!(!is_keyword("foo"));
    }

    #[test]
    fn effect_membership() {
        assert!(is_effect("log"));
        assert!(!is_effect("panic"));
    }
}
