//! Expression grammar: the precedence chain and primary forms (spec §4.3
//! "Expressions" and "Brace form disambiguation").

use thrush_common::token::TokenKind;
use thrush_common::Token;

use super::constraints::parse_constraint_expression;
use super::types::parse_type_expression;
use super::{
    expect_identifier, expect_keyword, expect_op, expect_punct, location_at, peek_is, peek_kind,
    run, span_consumed, starts_uppercase, unquote, PResult,
};
use crate::ast::{ExprKind, Expression, Literal, MatchCase, Pattern, PatternKind, RecordField};
use crate::error::ParseError;

fn binary(op: &str, left: Expression, right: Expression) -> Expression {
    let loc = left.location.merge(right.location);
    Expression::new(
        loc,
        ExprKind::Binary {
            operator: op.to_string(),
            left,
            right,
        },
    )
}

/// Top-level expression entry point: the full precedence chain plus the
/// `where`/`: TypeExpr [given ...]` trailing suffixes, which apply to
/// whatever expression precedes them regardless of its own precedence.
pub fn parse_expression(tokens: &[Token]) -> PResult<'_, Expression> {
    let (expr, remaining) = parse_thrush_dollar(tokens)?;
    parse_trailing_suffixes(expr, remaining)
}

fn parse_trailing_suffixes<'a>(expr: Expression, remaining: &'a [Token]) -> PResult<'a, Expression> {
    if peek_is(remaining, TokenKind::Punctuation, ":") {
        let (_, rest) = expect_punct(remaining, ":")?;
        let (ty, rest2) = parse_type_expression(rest)?;
        if peek_is(rest2, TokenKind::Keyword, "given") {
            let (_, rest3) = expect_keyword(rest2, "given")?;
            let (constraint, rest4) = parse_constraint_expression(rest3)?;
            let loc = expr.location.merge(span_consumed(remaining, rest4));
            let node = Expression::new(
                loc,
                ExprKind::Constrained {
                    expr,
                    ty,
                    constraint,
                },
            );
            return parse_trailing_suffixes(node, rest4);
        }
        let loc = expr.location.merge(span_consumed(remaining, rest2));
        let node = Expression::new(loc, ExprKind::Typed { expr, ty });
        return parse_trailing_suffixes(node, rest2);
    }

    if peek_is(remaining, TokenKind::Keyword, "where") {
        let (_, rest) = expect_keyword(remaining, "where")?;
        let (_, rest2) = expect_punct(rest, "(")?;
        let (definitions, rest3) = parse_statement_sequence_list(rest2)?;
        let (_, rest4) = expect_punct(rest3, ")")?;
        let loc = expr.location.merge(span_consumed(remaining, rest4));
        let node = Expression::new(
            loc,
            ExprKind::Where {
                definitions,
                main: expr,
            },
        );
        return parse_trailing_suffixes(node, rest4);
    }

    Ok((expr, remaining))
}

/// A semicolon-separated list of statements, used by `where (...)` bodies.
/// Unlike a `Program`, the definitions are kept as a `Vec` rather than
/// folded into a `binary(';', ...)` chain, since `Where` carries them as an
/// ordered list directly.
fn parse_statement_sequence_list(tokens: &[Token]) -> PResult<'_, Vec<Expression>> {
    let (first, mut remaining) = super::items::parse_statement(tokens)?;
    let mut statements = vec![first];
    while peek_is(remaining, TokenKind::Punctuation, ";") {
        let (_, rest) = expect_punct(remaining, ";")?;
        remaining = rest;
        if peek_is(remaining, TokenKind::Punctuation, ")") {
            break;
        }
        match super::items::parse_statement(remaining) {
            Ok((stmt, rest2)) => {
                statements.push(stmt);
                remaining = rest2;
            }
            Err(_) => break,
        }
    }
    Ok((statements, remaining))
}

fn parse_thrush_dollar(tokens: &[Token]) -> PResult<'_, Expression> {
    let (mut left, mut remaining) = parse_pipeline(tokens)?;
    loop {
        if peek_is(remaining, TokenKind::Operator, "|") {
            let (_, rest) = expect_op(remaining, "|")?;
            let (right, rest2) = parse_pipeline(rest)?;
            left = binary("|", left, right);
            remaining = rest2;
        } else if peek_is(remaining, TokenKind::Operator, "$") {
            let (_, rest) = expect_op(remaining, "$")?;
            let (right, rest2) = parse_pipeline(rest)?;
            left = binary("$", left, right);
            remaining = rest2;
        } else {
            break;
        }
    }
    Ok((left, remaining))
}

fn parse_pipeline(tokens: &[Token]) -> PResult<'_, Expression> {
    let (first, mut remaining) = parse_comparison(tokens)?;
    let mut steps = vec![first];
    while peek_is(remaining, TokenKind::Operator, "|>") {
        let (_, rest) = expect_op(remaining, "|>")?;
        let (next, rest2) = parse_comparison(rest)?;
        steps.push(next);
        remaining = rest2;
    }
    if steps.len() == 1 {
        Ok((steps.into_iter().next().unwrap(), remaining))
    } else {
        let loc = steps[0].location.merge(steps[steps.len() - 1].location);
        Ok((Expression::new(loc, ExprKind::Pipeline { steps }), remaining))
    }
}

const COMPARISON_OPS: &[&str] = &["==", "!=", "<=", ">=", "<", ">"];

fn parse_comparison(tokens: &[Token]) -> PResult<'_, Expression> {
    let (left, remaining) = parse_additive(tokens)?;
    for op in COMPARISON_OPS {
        if peek_is(remaining, TokenKind::Operator, op) {
            let (_, rest) = expect_op(remaining, op)?;
            let (right, rest2) = parse_additive(rest)?;
            return Ok((binary(op, left, right), rest2));
        }
    }
    Ok((left, remaining))
}

fn parse_additive(tokens: &[Token]) -> PResult<'_, Expression> {
    let (mut left, mut remaining) = parse_multiplicative(tokens)?;
    loop {
        if peek_is(remaining, TokenKind::Operator, "+") {
            let (_, rest) = expect_op(remaining, "+")?;
            let (right, rest2) = parse_multiplicative(rest)?;
            left = binary("+", left, right);
            remaining = rest2;
        } else if peek_is(remaining, TokenKind::Operator, "-") {
            let (_, rest) = expect_op(remaining, "-")?;
            let (right, rest2) = parse_multiplicative(rest)?;
            left = binary("-", left, right);
            remaining = rest2;
        } else {
            break;
        }
    }
    Ok((left, remaining))
}

fn parse_multiplicative(tokens: &[Token]) -> PResult<'_, Expression> {
    let (mut left, mut remaining) = parse_unary(tokens)?;
    loop {
        if peek_is(remaining, TokenKind::Operator, "*") {
            let (_, rest) = expect_op(remaining, "*")?;
            let (right, rest2) = parse_unary(rest)?;
            left = binary("*", left, right);
            remaining = rest2;
        } else if peek_is(remaining, TokenKind::Operator, "/") {
            let (_, rest) = expect_op(remaining, "/")?;
            let (right, rest2) = parse_unary(rest)?;
            left = binary("/", left, right);
            remaining = rest2;
        } else if peek_is(remaining, TokenKind::Operator, "%") {
            let (_, rest) = expect_op(remaining, "%")?;
            let (right, rest2) = parse_unary(rest)?;
            left = binary("%", left, right);
            remaining = rest2;
        } else {
            break;
        }
    }
    Ok((left, remaining))
}

/// `-N` where `N` is a number token immediately adjacent to the `-` (no
/// intervening trivia) desugars to `binary('*', literal(-1), literal(N))`.
/// Adjacency is read off locations, since whitespace isn't preserved in the
/// token stream.
fn parse_unary(tokens: &[Token]) -> PResult<'_, Expression> {
    if peek_is(tokens, TokenKind::Operator, "-") {
        if let Some(num_tok) = tokens.get(1) {
            if num_tok.kind == TokenKind::Number && tokens[0].location.end == num_tok.location.start
            {
                let (minus, rest) = expect_op(tokens, "-")?;
                let (num, rest2) = run(thrush_combinators::number()(rest))?;
                let n: f64 = num.value.parse().unwrap_or(0.0);
                let loc = minus.location.merge(num.location);
                let neg_one = Expression::new(num.location, ExprKind::Literal(Literal::Number(-1.0)));
                let value = Expression::new(num.location, ExprKind::Literal(Literal::Number(n)));
                return Ok((binary_at(loc, "*", neg_one, value), rest2));
            }
        }
    }
    parse_application(tokens)
}

fn binary_at(loc: thrush_common::Location, op: &str, left: Expression, right: Expression) -> Expression {
    Expression::new(
        loc,
        ExprKind::Binary {
            operator: op.to_string(),
            left,
            right,
        },
    )
}

fn can_start_primary(tokens: &[Token]) -> bool {
    match tokens.first() {
        None => false,
        Some(tok) => match tok.kind {
            TokenKind::Number | TokenKind::String | TokenKind::Identifier | TokenKind::Accessor => {
                true
            }
            TokenKind::Punctuation => tok.value == "(" || tok.value == "[" || tok.value == "{",
            TokenKind::Keyword => matches!(tok.value.as_str(), "fn" | "if" | "match"),
            _ => false,
        },
    }
}

fn parse_application(tokens: &[Token]) -> PResult<'_, Expression> {
    let (func, mut remaining) = parse_primary(tokens)?;
    let mut args = Vec::new();
    while can_start_primary(remaining) {
        let (arg, rest) = parse_primary(remaining)?;
        args.push(arg);
        remaining = rest;
    }
    if args.is_empty() {
        Ok((func, remaining))
    } else {
        let loc = func.location.merge(args[args.len() - 1].location);
        Ok((Expression::new(loc, ExprKind::Application { func, args }), remaining))
    }
}

fn parse_primary(tokens: &[Token]) -> PResult<'_, Expression> {
    match tokens.first() {
        Some(tok) if tok.kind == TokenKind::Number => {
            let (t, rest) = run(thrush_combinators::number()(tokens))?;
            let n: f64 = t.value.parse().unwrap_or(0.0);
            Ok((Expression::new(t.location, ExprKind::Literal(Literal::Number(n))), rest))
        }
        Some(_) if tok_kind(tokens) == TokenKind::String => {
            let (t, rest) = run(thrush_combinators::string()(tokens))?;
            Ok((
                Expression::new(t.location, ExprKind::Literal(Literal::String(unquote(&t.value)))),
                rest,
            ))
        }
        Some(_) if tok_kind(tokens) == TokenKind::Accessor => {
            let (t, rest) = run(thrush_combinators::accessor()(tokens))?;
            let optional = t.value.ends_with('?');
            let field = t.value.trim_end_matches('?').to_string();
            Ok((Expression::new(t.location, ExprKind::Accessor { field, optional }), rest))
        }
        Some(_) if tok_kind(tokens) == TokenKind::Identifier => {
            let (t, rest) = expect_identifier(tokens)?;
            Ok((Expression::new(t.location, ExprKind::Variable(t.value)), rest))
        }
        Some(tok) if tok.kind == TokenKind::Keyword && tok.value == "fn" => parse_function(tokens),
        Some(tok) if tok.kind == TokenKind::Keyword && tok.value == "if" => parse_if(tokens),
        Some(tok) if tok.kind == TokenKind::Keyword && tok.value == "match" => parse_match(tokens),
        Some(tok) if tok.kind == TokenKind::Punctuation && tok.value == "(" => {
            parse_parenthesized(tokens)
        }
        Some(tok) if tok.kind == TokenKind::Punctuation && tok.value == "[" => parse_list(tokens),
        Some(tok) if tok.kind == TokenKind::Punctuation && tok.value == "{" => parse_brace(tokens),
        _ => Err(ParseError {
            message: "expected an expression".to_string(),
            position: location_at(tokens),
        }),
    }
}

fn tok_kind(tokens: &[Token]) -> TokenKind {
    tokens.first().map(|t| t.kind).unwrap_or(TokenKind::Eof)
}

fn parse_parenthesized(tokens: &[Token]) -> PResult<'_, Expression> {
    let (_, rest) = expect_punct(tokens, "(")?;
    let (inner, rest2) = parse_expression(rest)?;
    let (_, rest3) = expect_punct(rest2, ")")?;
    Ok((inner, rest3))
}

fn parse_comma_expressions(tokens: &[Token]) -> PResult<'_, Vec<Expression>> {
    let mut elems = Vec::new();
    let mut remaining = tokens;
    loop {
        let (e, rest) = parse_expression(remaining)?;
        elems.push(e);
        remaining = rest;
        if peek_is(remaining, TokenKind::Punctuation, ",") {
            let (_, r) = expect_punct(remaining, ",")?;
            remaining = r;
            if peek_is(remaining, TokenKind::Punctuation, "}")
                || peek_is(remaining, TokenKind::Punctuation, "]")
            {
                break;
            }
            continue;
        }
        break;
    }
    Ok((elems, remaining))
}

fn parse_list(tokens: &[Token]) -> PResult<'_, Expression> {
    let (_, rest) = expect_punct(tokens, "[")?;
    if peek_is(rest, TokenKind::Punctuation, "]") {
        let (_, rest2) = expect_punct(rest, "]")?;
        let loc = span_consumed(tokens, rest2);
        return Ok((Expression::new(loc, ExprKind::List(Vec::new())), rest2));
    }
    let (elems, rest2) = parse_comma_expressions(rest)?;
    let (_, rest3) = expect_punct(rest2, "]")?;
    let loc = span_consumed(tokens, rest3);
    Ok((Expression::new(loc, ExprKind::List(elems)), rest3))
}

fn parse_record_fields(tokens: &[Token]) -> PResult<'_, Vec<RecordField>> {
    let mut fields = Vec::new();
    let mut remaining = tokens;
    loop {
        let (acc_tok, rest) = run(thrush_combinators::accessor()(remaining))?;
        let name = acc_tok.value.trim_end_matches('?').to_string();
        let (value, rest2) = parse_expression(rest)?;
        fields.push(RecordField { name, value });
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

/// `{}` is unit; leading `@name` means a record; anything else is a tuple
/// (including a single element, which stays a genuine arity-1 tuple).
fn parse_brace(tokens: &[Token]) -> PResult<'_, Expression> {
    let (_, rest) = expect_punct(tokens, "{")?;
    if peek_is(rest, TokenKind::Punctuation, "}") {
        let (_, rest2) = expect_punct(rest, "}")?;
        let loc = span_consumed(tokens, rest2);
        return Ok((Expression::new(loc, ExprKind::Unit), rest2));
    }
    if peek_kind(rest, TokenKind::Accessor) {
        let (fields, rest2) = parse_record_fields(rest)?;
        let (_, rest3) = expect_punct(rest2, "}")?;
        let loc = span_consumed(tokens, rest3);
        return Ok((Expression::new(loc, ExprKind::Record(fields)), rest3));
    }
    let (elems, rest2) = parse_comma_expressions(rest)?;
    let (_, rest3) = expect_punct(rest2, "}")?;
    let loc = span_consumed(tokens, rest3);
    Ok((Expression::new(loc, ExprKind::Tuple(elems)), rest3))
}

/// `fn params => body`. Zero params is written `()`; a single synthetic
/// `_unit` parameter is written `{}`.
fn parse_function(tokens: &[Token]) -> PResult<'_, Expression> {
    let (_, rest) = expect_keyword(tokens, "fn")?;

    let (params, rest2) = if peek_is(rest, TokenKind::Punctuation, "(")
        && peek_is(&rest[1..], TokenKind::Punctuation, ")")
    {
        let (_, r) = expect_punct(rest, "(")?;
        let (_, r2) = expect_punct(r, ")")?;
        (Vec::new(), r2)
    } else if peek_is(rest, TokenKind::Punctuation, "{")
        && peek_is(&rest[1..], TokenKind::Punctuation, "}")
    {
        let (_, r) = expect_punct(rest, "{")?;
        let (_, r2) = expect_punct(r, "}")?;
        (vec!["_unit".to_string()], r2)
    } else {
        let mut names = Vec::new();
        let mut remaining = rest;
        while peek_kind(remaining, TokenKind::Identifier) {
            let (tok, r) = expect_identifier(remaining)?;
            names.push(tok.value);
            remaining = r;
        }
        if names.is_empty() {
            return Err(ParseError {
                message: "expected function parameters".to_string(),
                position: location_at(remaining),
            });
        }
        (names, remaining)
    };

    let (_, rest3) = expect_op(rest2, "=>")?;
    let (body, rest4) = parse_expression(rest3)?;
    let loc = span_consumed(tokens, rest4);
    Ok((Expression::new(loc, ExprKind::Function { params, body }), rest4))
}

fn parse_if(tokens: &[Token]) -> PResult<'_, Expression> {
    let (_, rest) = expect_keyword(tokens, "if")?;
    let (condition, rest2) = parse_expression(rest)?;
    let (_, rest3) = expect_keyword(rest2, "then")?;
    let (then_branch, rest4) = parse_expression(rest3)?;
    let (_, rest5) = expect_keyword(rest4, "else")?;
    let (else_branch, rest6) = parse_expression(rest5)?;
    let loc = span_consumed(tokens, rest6);
    Ok((
        Expression::new(
            loc,
            ExprKind::If {
                condition,
                then_branch,
                else_branch,
            },
        ),
        rest6,
    ))
}

fn parse_match(tokens: &[Token]) -> PResult<'_, Expression> {
    let (_, rest) = expect_keyword(tokens, "match")?;
    let (scrutinee, rest2) = parse_expression(rest)?;
    let (_, rest3) = expect_keyword(rest2, "with")?;
    let (_, rest4) = expect_punct(rest3, "(")?;

    let mut cases = Vec::new();
    let mut remaining = rest4;
    loop {
        let (pattern, r) = parse_pattern(remaining)?;
        let (_, r2) = expect_op(r, "=>")?;
        let (body, r3) = parse_expression(r2)?;
        cases.push(MatchCase { pattern, body });
        remaining = r3;
        if peek_is(remaining, TokenKind::Punctuation, ";") {
            let (_, r4) = expect_punct(remaining, ";")?;
            remaining = r4;
            if peek_is(remaining, TokenKind::Punctuation, ")") {
                break;
            }
            continue;
        }
        break;
    }
    let (_, rest5) = expect_punct(remaining, ")")?;
    let loc = span_consumed(tokens, rest5);
    Ok((Expression::new(loc, ExprKind::Match { scrutinee, cases }), rest5))
}

fn can_start_pattern_atom(tokens: &[Token]) -> bool {
    match tokens.first() {
        None => false,
        Some(tok) => match tok.kind {
            TokenKind::Number | TokenKind::String | TokenKind::Identifier => true,
            TokenKind::Punctuation => tok.value == "(" || tok.value == "_",
            _ => false,
        },
    }
}

fn parse_pattern(tokens: &[Token]) -> PResult<'_, Pattern> {
    if peek_is(tokens, TokenKind::Punctuation, "_") {
        let (tok, rest) = expect_punct(tokens, "_")?;
        return Ok((Pattern::new(tok.location, PatternKind::Wildcard), rest));
    }
    if peek_kind(tokens, TokenKind::Identifier) {
        let (tok, rest) = expect_identifier(tokens)?;
        if starts_uppercase(&tok.value) {
            let mut args = Vec::new();
            let mut remaining = rest;
            while can_start_pattern_atom(remaining) {
                let (p, r) = parse_pattern_atom(remaining)?;
                args.push(p);
                remaining = r;
            }
            let loc = span_consumed(tokens, remaining);
            return Ok((
                Pattern::new(loc, PatternKind::Constructor { name: tok.value, args }),
                remaining,
            ));
        }
        return Ok((Pattern::new(tok.location, PatternKind::Variable(tok.value)), rest));
    }
    parse_pattern_atom(tokens)
}

fn parse_pattern_atom(tokens: &[Token]) -> PResult<'_, Pattern> {
    if peek_is(tokens, TokenKind::Punctuation, "(") {
        let (_, rest) = expect_punct(tokens, "(")?;
        let (p, rest2) = parse_pattern(rest)?;
        let (_, rest3) = expect_punct(rest2, ")")?;
        return Ok((p, rest3));
    }
    if peek_is(tokens, TokenKind::Punctuation, "_") {
        let (tok, rest) = expect_punct(tokens, "_")?;
        return Ok((Pattern::new(tok.location, PatternKind::Wildcard), rest));
    }
    if peek_kind(tokens, TokenKind::Number) {
        let (tok, rest) = run(thrush_combinators::number()(tokens))?;
        let n: f64 = tok.value.parse().unwrap_or(0.0);
        return Ok((
            Pattern::new(tok.location, PatternKind::Literal(Literal::Number(n))),
            rest,
        ));
    }
    if peek_kind(tokens, TokenKind::String) {
        let (tok, rest) = run(thrush_combinators::string()(tokens))?;
        return Ok((
            Pattern::new(tok.location, PatternKind::Literal(Literal::String(unquote(&tok.value)))),
            rest,
        ));
    }
    if peek_kind(tokens, TokenKind::Identifier) {
        let (tok, rest) = expect_identifier(tokens)?;
        if starts_uppercase(&tok.value) {
            return Ok((
                Pattern::new(tok.location, PatternKind::Constructor { name: tok.value, args: Vec::new() }),
                rest,
            ));
        }
        return Ok((Pattern::new(tok.location, PatternKind::Variable(tok.value)), rest));
    }
    Err(ParseError {
        message: "expected a pattern".to_string(),
        position: location_at(tokens),
    })
}
