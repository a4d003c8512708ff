//! `TypeExpr` position grammar (spec §4.3 "Types").

use thrush_common::token::TokenKind;

use super::{expect_identifier, expect_keyword, expect_punct, location_at, peek_is, peek_kind, run, PResult};
use crate::ast::{Effect, Primitive, RecordTypeField, Type};
use crate::error::ParseError;

/// Parse a full type expression: a right-associative `->` chain with
/// optional trailing effects on the outermost arrow.
pub fn parse_type_expression(tokens: &[thrush_common::Token]) -> PResult<'_, Type> {
    let (first, mut remaining) = parse_type_atom(tokens)?;
    let mut terms = vec![first];

    while peek_is(remaining, TokenKind::Operator, "->") {
        let (_, rest) = super::expect_op(remaining, "->")?;
        let (next, rest2) = parse_type_atom(rest)?;
        terms.push(next);
        remaining = rest2;
    }

    let mut effects = Vec::new();
    while peek_is(remaining, TokenKind::Operator, "!") {
        let (_, rest) = super::expect_op(remaining, "!")?;
        let (name_tok, rest2) = expect_identifier(rest)?;
        match Effect::from_name(&name_tok.value) {
            Some(effect) => effects.push(effect),
            None => {
                return Err(ParseError {
                    message: format!("Invalid effect: {}", name_tok.value),
                    position: name_tok.location,
                })
            }
        }
        remaining = rest2;
    }

    let ty = if terms.len() == 1 {
        terms.into_iter().next().unwrap()
    } else {
        let result = terms.pop().unwrap();
        Type::Function {
            params: terms,
            result: Box::new(result),
            effects,
            constraints: None,
        }
    };
    Ok((ty, remaining))
}

pub(crate) fn can_start_type_atom(tokens: &[thrush_common::Token]) -> bool {
    match tokens.first() {
        None => false,
        Some(tok) => match tok.kind {
            TokenKind::Identifier => true,
            TokenKind::Keyword => matches!(
                tok.value.as_str(),
                "List" | "Float" | "Number" | "String" | "Unit" | "Unknown"
            ),
            TokenKind::Punctuation => tok.value == "(" || tok.value == "{",
            _ => false,
        },
    }
}

fn starts_uppercase(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_uppercase())
}

pub(crate) fn parse_type_atom(tokens: &[thrush_common::Token]) -> PResult<'_, Type> {
    if let Ok((_, rest)) = expect_keyword(tokens, "Float") {
        return Ok((Type::Primitive(Primitive::Float), rest));
    }
    if let Ok((_, rest)) = expect_keyword(tokens, "Number") {
        return Ok((Type::Primitive(Primitive::Float), rest));
    }
    if let Ok((_, rest)) = expect_keyword(tokens, "String") {
        return Ok((Type::Primitive(Primitive::String), rest));
    }
    if let Ok((_, rest)) = expect_keyword(tokens, "Unit") {
        return Ok((Type::Unit, rest));
    }
    if let Ok((_, rest)) = expect_keyword(tokens, "Unknown") {
        return Ok((Type::Unknown, rest));
    }
    if let Ok((_, rest)) = expect_keyword(tokens, "List") {
        let (elem, rest2) = parse_type_atom(rest)?;
        return Ok((Type::List(Box::new(elem)), rest2));
    }
    if peek_is(tokens, TokenKind::Punctuation, "(") {
        let (_, rest) = expect_punct(tokens, "(")?;
        let (inner, rest2) = parse_type_expression(rest)?;
        let (_, rest3) = expect_punct(rest2, ")")?;
        return Ok((inner, rest3));
    }
    if peek_is(tokens, TokenKind::Punctuation, "{") {
        return parse_type_brace(tokens);
    }
    if peek_kind(tokens, TokenKind::Identifier) {
        let (tok, rest) = expect_identifier(tokens)?;
        if starts_uppercase(&tok.value) {
            let mut args = Vec::new();
            let mut remaining = rest;
            while can_start_type_atom(remaining) {
                let (arg, rest2) = parse_type_atom(remaining)?;
                args.push(arg);
                remaining = rest2;
            }
            return Ok((
                Type::Variant {
                    name: tok.value,
                    args,
                },
                remaining,
            ));
        }
        return Ok((Type::var(tok.value), rest));
    }
    Err(ParseError {
        message: "expected a type".to_string(),
        position: location_at(tokens),
    })
}

fn parse_type_brace(tokens: &[thrush_common::Token]) -> PResult<'_, Type> {
    let (_, rest) = expect_punct(tokens, "{")?;
    if peek_is(rest, TokenKind::Punctuation, "}") {
        let (_, rest2) = expect_punct(rest, "}")?;
        return Ok((Type::Unit, rest2));
    }

    let is_record = peek_kind(rest, TokenKind::Accessor)
        || (peek_kind(rest, TokenKind::Identifier) && peek_is(&rest[1..], TokenKind::Punctuation, ":"));

    if is_record {
        let (fields, rest2) = parse_record_type_fields(rest)?;
        let (_, rest3) = expect_punct(rest2, "}")?;
        Ok((Type::Record(fields), rest3))
    } else {
        let (elems, rest2) = parse_comma_types(rest)?;
        let (_, rest3) = expect_punct(rest2, "}")?;
        Ok((Type::Tuple(elems), rest3))
    }
}

fn parse_record_type_fields(tokens: &[thrush_common::Token]) -> PResult<'_, Vec<RecordTypeField>> {
    let mut fields = Vec::new();
    let mut remaining = tokens;
    loop {
        let (name, rest) = if peek_kind(remaining, TokenKind::Accessor) {
            let (tok, r) = run(thrush_combinators::accessor()(remaining))?;
            (tok.value, r)
        } else {
            let (tok, r) = expect_identifier(remaining)?;
            let (_, r2) = expect_punct(r, ":")?;
            (tok.value, r2)
        };
        let (ty, rest2) = parse_type_expression(rest)?;
        fields.push(RecordTypeField { name, ty });
        remaining = rest2;
        if peek_is(remaining, TokenKind::Punctuation, ",") {
            let (_, r) = expect_punct(remaining, ",")?;
            remaining = r;
            if peek_is(remaining, TokenKind::Punctuation, "}") {
                break;
            }
            continue;
        }
        break;
    }
    Ok((fields, remaining))
}

fn parse_comma_types(tokens: &[thrush_common::Token]) -> PResult<'_, Vec<Type>> {
    let mut elems = Vec::new();
    let mut remaining = tokens;
    loop {
        let (ty, rest) = parse_type_expression(remaining)?;
        elems.push(ty);
        remaining = rest;
        if peek_is(remaining, TokenKind::Punctuation, ",") {
            let (_, r) = expect_punct(remaining, ",")?;
            remaining = r;
            if peek_is(remaining, TokenKind::Punctuation, "}") {
                break;
            }
            continue;
        }
        break;
    }
    Ok((elems, remaining))
}
