//! Hand-rolled recursive-descent grammar over the token stream produced by
//! `thrush-lexer`. The precedence chain and brace-form lookahead are plain
//! Rust control flow; `thrush-combinators` is used only for its single-token
//! leaf matchers (`punctuation`, `operator`, `keyword`, `identifier`, ...)
//! and for the trailing end-of-input check below.
//!
//! The public surface mirrors the two external entry points a caller needs:
//! [`parse`] for a whole program, [`parse_type_expression`] for a bare type
//! annotation (used e.g. by tooling that only wants to validate a type
//! string).

pub mod ast;
pub mod error;
mod grammar;

use thrush_common::Token;

pub use ast::{Expression, Program, Type};
pub use error::ParseError;

/// Parse a full program from a token stream. `tokens` is expected to end
/// with an `Eof` token, as produced by `thrush_lexer::tokenize`; trailing
/// non-`Eof` tokens left over after a successful parse are reported as an
/// error rather than silently ignored.
pub fn parse(tokens: &[Token]) -> Result<Program, ParseError> {
    let (program, remaining) = grammar::parse_program(tokens)?;
    expect_only_eof(remaining)?;
    Ok(program)
}

/// Parse a single type expression in isolation, e.g. `List Int -> Bool`.
pub fn parse_type_expression(tokens: &[Token]) -> Result<Type, ParseError> {
    let (ty, remaining) = grammar::parse_type_expression(tokens)?;
    expect_only_eof(remaining)?;
    Ok(ty)
}

fn expect_only_eof(tokens: &[Token]) -> Result<(), ParseError> {
    match thrush_combinators::eof()(tokens) {
        thrush_combinators::ParseResult::Success { .. } => Ok(()),
        thrush_combinators::ParseResult::Error { message, position } => {
            Err(thrush_combinators::ParseErrorReport { message, position }.into())
        }
    }
}
