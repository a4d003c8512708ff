//! Hand-assembled recursive-descent grammar.
//!
//! Precedence climbing and the brace-form lookahead need explicit control
//! flow that doesn't compress well into combinator chains, so this module is
//! small recursive-descent functions wired together with the shared
//! `PResult` helpers below. `thrush_combinators` supplies only the
//! single-token leaf matchers (`punctuation`, `operator`, `keyword`,
//! `identifier`, `number`, `string`, `accessor`) that `expect_punct` and
//! friends wrap below; its higher-order primitives (`choice`, `many`,
//! `sep_by`, `optional`, `lazy`) are general-purpose library surface this
//! grammar doesn't need, since every branch point here already knows which
//! token kind it's looking at.

mod constraints;
mod expressions;
mod items;
mod types;

pub use expressions::parse_expression;
pub use items::parse_program;
pub use types::parse_type_expression;

use thrush_combinators::ParseResult;
use thrush_common::token::{Token, TokenKind};
use thrush_common::Location;

use crate::error::ParseError;

/// A plain `Result`-based parse step: succeeds with a value and the tokens
/// left over, or fails with the furthest-reaching [`ParseError`].
pub type PResult<'a, T> = Result<(T, &'a [Token]), ParseError>;

pub(crate) fn run<'a, T>(
    result: ParseResult<'a, T>,
) -> PResult<'a, T> {
    match result {
        ParseResult::Success { value, remaining } => Ok((value, remaining)),
        ParseResult::Error { message, position } => Err(ParseError { message, position }),
    }
}

pub(crate) fn location_at(tokens: &[Token]) -> Location {
    tokens
        .first()
        .map(|t| t.location)
        .unwrap_or_else(Location::synthetic)
}

pub(crate) fn peek_is(tokens: &[Token], kind: TokenKind, value: &str) -> bool {
    tokens
        .first()
        .is_some_and(|t| t.kind == kind && t.value == value)
}

pub(crate) fn peek_kind(tokens: &[Token], kind: TokenKind) -> bool {
    tokens.first().is_some_and(|t| t.kind == kind)
}

pub(crate) fn expect_punct<'a>(tokens: &'a [Token], p: &'static str) -> PResult<'a, Token> {
    run(thrush_combinators::punctuation(p)(tokens))
}

pub(crate) fn expect_op<'a>(tokens: &'a [Token], op: &'static str) -> PResult<'a, Token> {
    run(thrush_combinators::operator(op)(tokens))
}

pub(crate) fn expect_keyword<'a>(tokens: &'a [Token], kw: &'static str) -> PResult<'a, Token> {
    run(thrush_combinators::keyword(kw)(tokens))
}

pub(crate) fn expect_identifier(tokens: &[Token]) -> PResult<'_, Token> {
    run(thrush_combinators::identifier()(tokens))
}

/// The source span covering the tokens consumed between `original` and
/// `rest` (`rest` must be a suffix of `original`).
pub(crate) fn span_consumed<'a>(original: &'a [Token], rest: &'a [Token]) -> Location {
    let consumed = original.len() - rest.len();
    if consumed == 0 {
        return location_at(original);
    }
    Location::new(original[0].location.start, original[consumed - 1].location.end)
}

/// Strip a leading/trailing quote and resolve `\x` escapes verbatim (the
/// lexer keeps strings raw; this is the one place that interprets them).
pub(crate) fn unquote(raw: &str) -> String {
    let inner = raw
        .strip_prefix(['"', '\''])
        .and_then(|s| s.strip_suffix(['"', '\'']))
        .unwrap_or(raw);
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

pub(crate) fn starts_uppercase(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_uppercase())
}
