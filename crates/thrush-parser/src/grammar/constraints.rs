//! `given ConstraintExpr` grammar (spec §4.3 "Constraint expressions").

use thrush_common::token::TokenKind;

use super::types::parse_type_expression;
use super::{expect_identifier, expect_keyword, expect_punct, location_at, peek_is, run, PResult};
use crate::ast::{Constraint, ConstraintExpr};
use crate::error::ParseError;

fn expect_word<'a>(tokens: &'a [thrush_common::Token], word: &'static str) -> PResult<'a, thrush_common::Token> {
    match tokens.first() {
        Some(tok) if tok.kind == TokenKind::Identifier && tok.value == word => {
            Ok((tok.clone(), &tokens[1..]))
        }
        _ => Err(ParseError {
            message: format!("expected `{word}`"),
            position: location_at(tokens),
        }),
    }
}

pub fn parse_constraint_expression(tokens: &[thrush_common::Token]) -> PResult<'_, ConstraintExpr> {
    parse_or(tokens)
}

fn parse_or(tokens: &[thrush_common::Token]) -> PResult<'_, ConstraintExpr> {
    let (mut left, mut remaining) = parse_and(tokens)?;
    while peek_is(remaining, TokenKind::Keyword, "or") {
        let (_, rest) = expect_keyword(remaining, "or")?;
        let (right, rest2) = parse_and(rest)?;
        left = ConstraintExpr::Or(Box::new(left), Box::new(right));
        remaining = rest2;
    }
    Ok((left, remaining))
}

fn parse_and(tokens: &[thrush_common::Token]) -> PResult<'_, ConstraintExpr> {
    let (mut left, mut remaining) = parse_constraint_primary(tokens)?;
    while peek_is(remaining, TokenKind::Keyword, "and") {
        let (_, rest) = expect_keyword(remaining, "and")?;
        let (right, rest2) = parse_constraint_primary(rest)?;
        left = ConstraintExpr::And(Box::new(left), Box::new(right));
        remaining = rest2;
    }
    Ok((left, remaining))
}

fn parse_constraint_primary(tokens: &[thrush_common::Token]) -> PResult<'_, ConstraintExpr> {
    if peek_is(tokens, TokenKind::Punctuation, "(") {
        let (_, rest) = expect_punct(tokens, "(")?;
        let (inner, rest2) = parse_or(rest)?;
        let (_, rest3) = expect_punct(rest2, ")")?;
        return Ok((ConstraintExpr::Paren(Box::new(inner)), rest3));
    }

    let (var_tok, rest) = expect_identifier(tokens)?;
    let type_var = var_tok.value;

    if peek_is(rest, TokenKind::Keyword, "is") {
        let (_, rest2) = expect_keyword(rest, "is")?;
        let (name_tok, rest3) = expect_identifier(rest2)?;
        return Ok((
            ConstraintExpr::Leaf(Constraint::Is {
                type_var,
                name: name_tok.value,
            }),
            rest3,
        ));
    }

    if peek_is(rest, TokenKind::Keyword, "implements") {
        let (_, rest2) = expect_keyword(rest, "implements")?;
        let (name_tok, rest3) = expect_identifier(rest2)?;
        return Ok((
            ConstraintExpr::Leaf(Constraint::Implements {
                type_var,
                interface_name: name_tok.value,
            }),
            rest3,
        ));
    }

    if peek_is(rest, TokenKind::Keyword, "has") {
        let (_, rest2) = expect_keyword(rest, "has")?;
        if peek_is(rest2, TokenKind::Punctuation, "{") {
            let (record_ty, rest3) = super::types::parse_type_expression(rest2)?;
            let structure = match record_ty {
                crate::ast::Type::Record(fields) => fields,
                other => {
                    return Err(ParseError {
                        message: format!("expected a record structure, found {other:?}"),
                        position: location_at(rest2),
                    })
                }
            };
            return Ok((
                ConstraintExpr::Leaf(Constraint::HasStructure { type_var, structure }),
                rest3,
            ));
        }

        let (_, rest3) = expect_word(rest2, "field")?;
        let (field_tok, rest4) = run(thrush_combinators::string()(rest3))?;
        let field = super::unquote(&field_tok.value);
        let (_, rest5) = expect_word(rest4, "of")?;
        let (_, rest6) = expect_keyword(rest5, "type")?;
        let (field_type, rest7) = parse_type_expression(rest6)?;
        return Ok((
            ConstraintExpr::Leaf(Constraint::HasField {
                type_var,
                field,
                field_type,
            }),
            rest7,
        ));
    }

    Err(ParseError {
        message: "expected `is`, `has`, or `implements`".to_string(),
        position: location_at(rest),
    })
}
