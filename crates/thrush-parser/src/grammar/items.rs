//! Statement grammar: definitions, mutation, imports, type/variant/trait
//! declarations (spec §4.3 "Statements" and "Declarations"), plus the
//! top-level program assembly.

use thrush_common::token::TokenKind;
use thrush_common::Token;

use super::expressions::parse_expression;
use super::types::{can_start_type_atom, parse_type_atom};
use super::{
    expect_identifier, expect_keyword, expect_punct, peek_is, peek_kind, run, span_consumed,
    unquote, PResult,
};
use crate::ast::{
    ExprKind, Expression, ImplementationBinding, MethodSignature, Program, Type, UserTypeBody,
    VariantConstructor,
};

/// `name := ...`: `:=` isn't a single token in the fixed operator set, so a
/// mutation is recognised as `name` followed by adjacent `:` punctuation
/// then `=` operator.
fn looks_like_mutation(tokens: &[Token]) -> bool {
    peek_kind(tokens, TokenKind::Identifier)
        && tokens.get(1).is_some_and(|t| t.kind == TokenKind::Punctuation && t.value == ":")
        && tokens.get(2).is_some_and(|t| t.kind == TokenKind::Operator && t.value == "=")
}

fn looks_like_definition(tokens: &[Token]) -> bool {
    peek_kind(tokens, TokenKind::Identifier) && peek_is(&tokens[1..], TokenKind::Operator, "=")
}

fn looks_like_mutable_definition(tokens: &[Token]) -> bool {
    peek_is(tokens, TokenKind::Keyword, "mut") || peek_is(tokens, TokenKind::Keyword, "mut!")
}

/// One statement: a definition, mutable-definition, mutation, import,
/// type/variant/trait declaration, or (falling through) a plain expression.
pub fn parse_statement(tokens: &[Token]) -> PResult<'_, Expression> {
    if looks_like_mutable_definition(tokens) {
        return parse_mutable_definition(tokens);
    }
    if peek_is(tokens, TokenKind::Keyword, "import") {
        return parse_import(tokens);
    }
    if peek_is(tokens, TokenKind::Keyword, "variant") {
        return parse_variant_definition(tokens);
    }
    if peek_is(tokens, TokenKind::Keyword, "type") {
        return parse_user_type_definition(tokens);
    }
    if peek_is(tokens, TokenKind::Keyword, "constraint") {
        return parse_constraint_definition(tokens);
    }
    if peek_is(tokens, TokenKind::Keyword, "implement") {
        return parse_implement_definition(tokens);
    }
    if looks_like_mutation(tokens) {
        return parse_mutation(tokens);
    }
    if looks_like_definition(tokens) {
        return parse_definition(tokens);
    }
    parse_expression(tokens)
}

fn parse_definition(tokens: &[Token]) -> PResult<'_, Expression> {
    let (name_tok, rest) = expect_identifier(tokens)?;
    let (_, rest2) = super::expect_op(rest, "=")?;
    let (value, rest3) = parse_expression(rest2)?;
    let loc = span_consumed(tokens, rest3);
    Ok((
        Expression::new(
            loc,
            ExprKind::Definition {
                name: name_tok.value,
                value,
            },
        ),
        rest3,
    ))
}

fn parse_mutable_definition(tokens: &[Token]) -> PResult<'_, Expression> {
    let (_, rest) = if peek_is(tokens, TokenKind::Keyword, "mut!") {
        expect_keyword(tokens, "mut!")?
    } else {
        expect_keyword(tokens, "mut")?
    };
    let (name_tok, rest2) = expect_identifier(rest)?;
    let (_, rest3) = super::expect_op(rest2, "=")?;
    let (value, rest4) = parse_expression(rest3)?;
    let loc = span_consumed(tokens, rest4);
    Ok((
        Expression::new(
            loc,
            ExprKind::MutableDefinition {
                name: name_tok.value,
                value,
            },
        ),
        rest4,
    ))
}

fn parse_mutation(tokens: &[Token]) -> PResult<'_, Expression> {
    let (name_tok, rest) = expect_identifier(tokens)?;
    let (_, rest2) = expect_punct(rest, ":")?;
    let (_, rest3) = super::expect_op(rest2, "=")?;
    let (value, rest4) = parse_expression(rest3)?;
    let loc = span_consumed(tokens, rest4);
    Ok((
        Expression::new(
            loc,
            ExprKind::Mutation {
                name: name_tok.value,
                value,
            },
        ),
        rest4,
    ))
}

fn parse_import(tokens: &[Token]) -> PResult<'_, Expression> {
    let (_, rest) = expect_keyword(tokens, "import")?;
    let (tok, rest2) = run(thrush_combinators::string()(rest))?;
    let loc = span_consumed(tokens, rest2);
    Ok((
        Expression::new(
            loc,
            ExprKind::Import {
                path: unquote(&tok.value),
            },
        ),
        rest2,
    ))
}

fn parse_type_params(tokens: &[Token]) -> PResult<'_, Vec<String>> {
    let mut params = Vec::new();
    let mut remaining = tokens;
    while peek_kind(remaining, TokenKind::Identifier) {
        let (tok, rest) = expect_identifier(remaining)?;
        params.push(tok.value);
        remaining = rest;
    }
    Ok((params, remaining))
}

/// `variant Name params = Ctor args | Ctor args | ...`
fn parse_variant_definition(tokens: &[Token]) -> PResult<'_, Expression> {
    let (_, rest) = expect_keyword(tokens, "variant")?;
    let (name_tok, rest2) = expect_identifier(rest)?;
    let (type_params, rest3) = parse_type_params(rest2)?;
    let (_, rest4) = super::expect_op(rest3, "=")?;

    let mut constructors = Vec::new();
    let mut remaining = rest4;
    loop {
        let (ctor_tok, rest5) = expect_identifier(remaining)?;
        let mut args = Vec::new();
        let mut rest6 = rest5;
        while can_start_type_atom(rest6) {
            let (arg, rest7) = parse_type_atom(rest6)?;
            args.push(arg);
            rest6 = rest7;
        }
        constructors.push(VariantConstructor {
            name: ctor_tok.value,
            args,
        });
        remaining = rest6;
        if peek_is(remaining, TokenKind::Operator, "|") {
            let (_, rest7) = super::expect_op(remaining, "|")?;
            remaining = rest7;
            continue;
        }
        break;
    }

    let loc = span_consumed(tokens, remaining);
    Ok((
        Expression::new(
            loc,
            ExprKind::TypeDefinition {
                name: name_tok.value,
                type_params,
                constructors,
            },
        ),
        remaining,
    ))
}

/// `type Name params = <record | tuple | union body>`
fn parse_user_type_definition(tokens: &[Token]) -> PResult<'_, Expression> {
    let (_, rest) = expect_keyword(tokens, "type")?;
    let (name_tok, rest2) = expect_identifier(rest)?;
    let (params, rest3) = parse_type_params(rest2)?;
    let (_, rest4) = super::expect_op(rest3, "=")?;
    let (body, rest5) = parse_user_type_body(rest4)?;
    let loc = span_consumed(tokens, rest5);
    Ok((
        Expression::new(
            loc,
            ExprKind::UserDefinedType {
                name: name_tok.value,
                params,
                body,
            },
        ),
        rest5,
    ))
}

fn parse_user_type_body(tokens: &[Token]) -> PResult<'_, UserTypeBody> {
    let (ty, rest) = super::types::parse_type_expression(tokens)?;
    let body = match ty {
        Type::Record(fields) => {
            UserTypeBody::Record(fields.into_iter().map(|f| (f.name, f.ty)).collect())
        }
        Type::Tuple(elems) => UserTypeBody::Tuple(elems),
        Type::Union(members) => UserTypeBody::Union(members),
        other => UserTypeBody::Union(vec![other]),
    };
    Ok((body, rest))
}

/// `constraint Name a ( sig ; sig ; ... )`
fn parse_constraint_definition(tokens: &[Token]) -> PResult<'_, Expression> {
    let (_, rest) = expect_keyword(tokens, "constraint")?;
    let (name_tok, rest2) = expect_identifier(rest)?;
    let (param_tok, rest3) = expect_identifier(rest2)?;
    let (_, rest4) = expect_punct(rest3, "(")?;

    let mut signatures = Vec::new();
    let mut remaining = rest4;
    if !peek_is(remaining, TokenKind::Punctuation, ")") {
        loop {
            let (sig_name, rest5) = expect_identifier(remaining)?;
            let (type_params, rest6) = parse_type_params(rest5)?;
            let (_, rest7) = expect_punct(rest6, ":")?;
            let (ty, rest8) = super::types::parse_type_expression(rest7)?;
            signatures.push(MethodSignature {
                name: sig_name.value,
                type_params,
                ty,
            });
            remaining = rest8;
            if peek_is(remaining, TokenKind::Punctuation, ";") {
                let (_, rest9) = expect_punct(remaining, ";")?;
                remaining = rest9;
                if peek_is(remaining, TokenKind::Punctuation, ")") {
                    break;
                }
                continue;
            }
            break;
        }
    }
    let (_, rest10) = expect_punct(remaining, ")")?;
    let loc = span_consumed(tokens, rest10);
    Ok((
        Expression::new(
            loc,
            ExprKind::ConstraintDefinition {
                name: name_tok.value,
                type_param: param_tok.value,
                signatures,
            },
        ),
        rest10,
    ))
}

/// `implement Name TypeName ( name = expr ; ... )`
fn parse_implement_definition(tokens: &[Token]) -> PResult<'_, Expression> {
    let (_, rest) = expect_keyword(tokens, "implement")?;
    let (constraint_tok, rest2) = expect_identifier(rest)?;
    let (type_tok, rest3) = expect_identifier(rest2)?;
    let (_, rest4) = expect_punct(rest3, "(")?;

    let mut implementations = Vec::new();
    let mut remaining = rest4;
    if !peek_is(remaining, TokenKind::Punctuation, ")") {
        loop {
            let (name_tok, rest5) = expect_identifier(remaining)?;
            let (_, rest6) = super::expect_op(rest5, "=")?;
            let (value, rest7) = parse_expression(rest6)?;
            implementations.push(ImplementationBinding {
                name: name_tok.value,
                value,
            });
            remaining = rest7;
            if peek_is(remaining, TokenKind::Punctuation, ";") {
                let (_, rest8) = expect_punct(remaining, ";")?;
                remaining = rest8;
                if peek_is(remaining, TokenKind::Punctuation, ")") {
                    break;
                }
                continue;
            }
            break;
        }
    }
    let (_, rest9) = expect_punct(remaining, ")")?;
    let loc = span_consumed(tokens, rest9);
    Ok((
        Expression::new(
            loc,
            ExprKind::ImplementDefinition {
                constraint_name: constraint_tok.value,
                type_name: type_tok.value,
                implementations,
            },
        ),
        rest9,
    ))
}

/// The whole program is a single left-associative `binary(';', ...)` chain
/// over top-level statements.
pub fn parse_program(tokens: &[Token]) -> PResult<'_, Program> {
    let (first, mut remaining) = parse_statement(tokens)?;
    let mut expression = first;
    while peek_is(remaining, TokenKind::Punctuation, ";") {
        let (_, rest) = expect_punct(remaining, ";")?;
        remaining = rest;
        if peek_kind(remaining, TokenKind::Eof) {
            break;
        }
        let (next, rest2) = parse_statement(remaining)?;
        let loc = expression.location.merge(next.location);
        expression = Expression::new(
            loc,
            ExprKind::Binary {
                operator: ";".to_string(),
                left: expression,
                right: next,
            },
        );
        remaining = rest2;
    }
    Ok((Program { expression }, remaining))
}
