//! Generic parser-combinator primitives over a token slice.
//!
//! A [`Parser<T>`] is a total function from a position in a token slice to a
//! [`ParseResult`]: either a parsed `value` and the slice of tokens left
//! unconsumed, or an error carrying a message and the position it was
//! raised at. Combinators never panic; exhausting the input or finding an
//! unexpected token always produces an `Error` variant, never a Rust panic.
//!
//! The shape mirrors a classic parser-combinator toolkit (see e.g. the
//! production/wrapper primitives in parser-combinator crates this one draws
//! on): small composable pieces (`token`, `choice`, `many`, `map`, ...)
//! instead of one generated table-driven parser.

use std::rc::Rc;

use thrush_common::token::{Token, TokenKind};
use thrush_common::Location;

/// The result of attempting to run a [`Parser`] at some position in a token
/// slice.
#[derive(Debug, Clone)]
pub enum ParseResult<'a, T> {
    Success { value: T, remaining: &'a [Token] },
    Error { message: String, position: Location },
}

impl<'a, T> ParseResult<'a, T> {
    pub fn is_success(&self) -> bool {
        matches!(self, ParseResult::Success { .. })
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ParseResult<'a, U> {
        match self {
            ParseResult::Success { value, remaining } => ParseResult::Success {
                value: f(value),
                remaining,
            },
            ParseResult::Error { message, position } => ParseResult::Error { message, position },
        }
    }
}

/// A parser is a total function from a token slice to a [`ParseResult`].
/// Wrapped in `Rc` so parsers can be cloned cheaply and shared between
/// grammar rules (needed for recursive grammars built with [`lazy`]).
pub type Parser<'a, T> = Rc<dyn Fn(&'a [Token]) -> ParseResult<'a, T> + 'a>;

fn location_at(tokens: &[Token]) -> Location {
    tokens
        .first()
        .map(|t| t.location)
        .unwrap_or_else(Location::synthetic)
}

/// Build a parser from a plain closure.
pub fn parser<'a, T: 'a>(f: impl Fn(&'a [Token]) -> ParseResult<'a, T> + 'a) -> Parser<'a, T> {
    Rc::new(f)
}

/// Matches a single token satisfying `predicate`, failing with `expected`
/// as the diagnostic label otherwise.
pub fn satisfy<'a>(
    expected: &'static str,
    predicate: impl Fn(&Token) -> bool + 'a,
) -> Parser<'a, Token> {
    parser(move |tokens: &'a [Token]| match tokens.first() {
        Some(tok) if predicate(tok) => ParseResult::Success {
            value: tok.clone(),
            remaining: &tokens[1..],
        },
        Some(tok) => ParseResult::Error {
            message: format!("expected {expected}, found {:?} `{}`", tok.kind, tok.value),
            position: tok.location,
        },
        None => ParseResult::Error {
            message: format!("expected {expected}, found end of input"),
            position: location_at(tokens),
        },
    })
}

pub fn token_kind<'a>(kind: TokenKind) -> Parser<'a, Token> {
    satisfy("token", move |tok| tok.kind == kind)
}

pub fn identifier<'a>() -> Parser<'a, Token> {
    satisfy("identifier", |tok| tok.kind == TokenKind::Identifier)
}

pub fn number<'a>() -> Parser<'a, Token> {
    satisfy("number", |tok| tok.kind == TokenKind::Number)
}

pub fn string<'a>() -> Parser<'a, Token> {
    satisfy("string", |tok| tok.kind == TokenKind::String)
}

pub fn accessor<'a>() -> Parser<'a, Token> {
    satisfy("accessor", |tok| tok.kind == TokenKind::Accessor)
}

pub fn keyword<'a>(word: &'static str) -> Parser<'a, Token> {
    satisfy(word, move |tok| {
        tok.kind == TokenKind::Keyword && tok.value == word
    })
}

pub fn operator<'a>(op: &'static str) -> Parser<'a, Token> {
    satisfy(op, move |tok| {
        tok.kind == TokenKind::Operator && tok.value == op
    })
}

pub fn punctuation<'a>(p: &'static str) -> Parser<'a, Token> {
    satisfy(p, move |tok| {
        tok.kind == TokenKind::Punctuation && tok.value == p
    })
}

pub fn eof<'a>() -> Parser<'a, ()> {
    parser(|tokens: &'a [Token]| match tokens.first() {
        Some(tok) if tok.is_eof() => ParseResult::Success {
            value: (),
            remaining: tokens,
        },
        Some(tok) => ParseResult::Error {
            message: format!("expected end of input, found `{}`", tok.value),
            position: tok.location,
        },
        None => ParseResult::Success {
            value: (),
            remaining: tokens,
        },
    })
}

/// Transform a parser's output value.
pub fn map<'a, T: 'a, U: 'a>(
    p: Parser<'a, T>,
    f: impl Fn(T) -> U + 'a,
) -> Parser<'a, U> {
    parser(move |tokens: &'a [Token]| match p(tokens) {
        ParseResult::Success { value, remaining } => ParseResult::Success {
            value: f(value),
            remaining,
        },
        ParseResult::Error { message, position } => ParseResult::Error { message, position },
    })
}

/// Run `p`, then pass its value and remaining input to `f`, which produces
/// the next parser to run. The backbone of sequencing.
pub fn and_then<'a, T: 'a, U: 'a>(
    p: Parser<'a, T>,
    f: impl Fn(T) -> Parser<'a, U> + 'a,
) -> Parser<'a, U> {
    parser(move |tokens: &'a [Token]| match p(tokens) {
        ParseResult::Success { value, remaining } => f(value)(remaining),
        ParseResult::Error { message, position } => ParseResult::Error { message, position },
    })
}

/// Sequence two parsers, keeping both results as a tuple.
pub fn seq2<'a, A: 'a, B: 'a>(a: Parser<'a, A>, b: Parser<'a, B>) -> Parser<'a, (A, B)> {
    parser(move |tokens: &'a [Token]| match a(tokens) {
        ParseResult::Success {
            value: va,
            remaining,
        } => match b(remaining) {
            ParseResult::Success {
                value: vb,
                remaining,
            } => ParseResult::Success {
                value: (va, vb),
                remaining,
            },
            ParseResult::Error { message, position } => ParseResult::Error { message, position },
        },
        ParseResult::Error { message, position } => ParseResult::Error { message, position },
    })
}

/// Sequence three parsers, keeping all three results as a tuple.
pub fn seq3<'a, A: 'a, B: 'a, C: 'a>(
    a: Parser<'a, A>,
    b: Parser<'a, B>,
    c: Parser<'a, C>,
) -> Parser<'a, (A, B, C)> {
    map(seq2(seq2(a, b), c), |((va, vb), vc)| (va, vb, vc))
}

/// Sequence four parsers, keeping all four results as a tuple.
pub fn seq4<'a, A: 'a, B: 'a, C: 'a, D: 'a>(
    a: Parser<'a, A>,
    b: Parser<'a, B>,
    c: Parser<'a, C>,
    d: Parser<'a, D>,
) -> Parser<'a, (A, B, C, D)> {
    map(seq2(seq3(a, b, c), d), |((va, vb, vc), vd)| {
        (va, vb, vc, vd)
    })
}

/// Run `p`, discarding its value and returning the result of `after`.
pub fn then<'a, T: 'a, U: 'a>(p: Parser<'a, T>, after: Parser<'a, U>) -> Parser<'a, U> {
    map(seq2(p, after), |(_, u)| u)
}

/// Run `p` followed by `ignored`, keeping only `p`'s value.
pub fn skip<'a, T: 'a, U: 'a>(p: Parser<'a, T>, ignored: Parser<'a, U>) -> Parser<'a, T> {
    map(seq2(p, ignored), |(t, _)| t)
}

/// Try each alternative in order at the same position, returning the first
/// success. If all fail, report the error that got furthest through the
/// input (the one with the highest position) so diagnostics point at the
/// alternative that most nearly matched.
pub fn choice<'a, T: 'a>(alternatives: Vec<Parser<'a, T>>) -> Parser<'a, T> {
    parser(move |tokens: &'a [Token]| {
        let mut furthest: Option<(String, Location)> = None;
        for alt in &alternatives {
            match alt(tokens) {
                ok @ ParseResult::Success { .. } => return ok,
                ParseResult::Error { message, position } => {
                    let replace = match &furthest {
                        None => true,
                        Some((_, prev)) => position.start >= prev.start,
                    };
                    if replace {
                        furthest = Some((message, position));
                    }
                }
            }
        }
        let (message, position) = furthest.unwrap_or_else(|| {
            (
                "no alternatives to try".to_string(),
                location_at(tokens),
            )
        });
        ParseResult::Error { message, position }
    })
}

/// Zero or more repetitions of `p`. Never fails; an empty match yields an
/// empty `Vec` without consuming input.
pub fn many<'a, T: 'a>(p: Parser<'a, T>) -> Parser<'a, Vec<T>> {
    parser(move |tokens: &'a [Token]| {
        let mut values = Vec::new();
        let mut rest = tokens;
        loop {
            match p(rest) {
                ParseResult::Success { value, remaining } => {
                    if std::ptr::eq(remaining, rest) || remaining.len() == rest.len() {
                        // A zero-width success would loop forever; stop here.
                        values.push(value);
                        rest = remaining;
                        break;
                    }
                    values.push(value);
                    rest = remaining;
                }
                ParseResult::Error { .. } => break,
            }
        }
        ParseResult::Success {
            value: values,
            remaining: rest,
        }
    })
}

/// One or more repetitions of `p`.
pub fn many1<'a, T: 'a>(p: Parser<'a, T>) -> Parser<'a, Vec<T>> {
    let p2 = p.clone();
    parser(move |tokens: &'a [Token]| match many(p.clone())(tokens) {
        ParseResult::Success { value, remaining } if !value.is_empty() => {
            ParseResult::Success { value, remaining }
        }
        ParseResult::Success { .. } => match p2(tokens) {
            ParseResult::Error { message, position } => ParseResult::Error { message, position },
            ParseResult::Success { .. } => unreachable!("many1: many() returned empty after a success"),
        },
        ParseResult::Error { message, position } => ParseResult::Error { message, position },
    })
}

/// Optionally match `p`, succeeding with `None` and no consumed input if it
/// fails.
pub fn optional<'a, T: 'a>(p: Parser<'a, T>) -> Parser<'a, Option<T>> {
    parser(move |tokens: &'a [Token]| match p(tokens) {
        ParseResult::Success { value, remaining } => ParseResult::Success {
            value: Some(value),
            remaining,
        },
        ParseResult::Error { .. } => ParseResult::Success {
            value: None,
            remaining: tokens,
        },
    })
}

/// One or more occurrences of `item` separated by `sep`. The separators are
/// discarded; only `item` values are collected.
pub fn sep_by1<'a, T: 'a, S: 'a>(item: Parser<'a, T>, sep: Parser<'a, S>) -> Parser<'a, Vec<T>> {
    let item2 = item.clone();
    parser(move |tokens: &'a [Token]| match item(tokens) {
        ParseResult::Success {
            value: first,
            remaining,
        } => {
            let rest_parser = many(then(sep.clone(), item2.clone()));
            match rest_parser(remaining) {
                ParseResult::Success {
                    value: mut rest,
                    remaining,
                } => {
                    let mut values = vec![first];
                    values.append(&mut rest);
                    ParseResult::Success {
                        value: values,
                        remaining,
                    }
                }
                ParseResult::Error { message, position } => {
                    ParseResult::Error { message, position }
                }
            }
        }
        ParseResult::Error { message, position } => ParseResult::Error { message, position },
    })
}

/// Zero or more occurrences of `item` separated by `sep`.
pub fn sep_by<'a, T: 'a, S: 'a>(item: Parser<'a, T>, sep: Parser<'a, S>) -> Parser<'a, Vec<T>> {
    optional(sep_by1(item, sep)).pipe_map(|opt| opt.unwrap_or_default())
}

/// Small helper trait so `optional(...).pipe_map(...)` reads left-to-right
/// instead of nesting `map(optional(...), ...)`.
trait PipeMap<'a, T> {
    fn pipe_map<U: 'a>(self, f: impl Fn(T) -> U + 'a) -> Parser<'a, U>;
}

impl<'a, T: 'a> PipeMap<'a, T> for Parser<'a, T> {
    fn pipe_map<U: 'a>(self, f: impl Fn(T) -> U + 'a) -> Parser<'a, U> {
        map(self, f)
    }
}

/// Defer construction of a parser until it is run. Required to build
/// recursive grammars without infinite recursion while assembling the
/// parser graph.
pub fn lazy<'a, T: 'a>(build: impl Fn() -> Parser<'a, T> + 'a) -> Parser<'a, T> {
    parser(move |tokens: &'a [Token]| build()(tokens))
}

/// Run `p` and require that it consumes every token up to (and including)
/// the trailing `Eof`.
pub fn parse_all<'a, T: 'a>(p: Parser<'a, T>, tokens: &'a [Token]) -> Result<T, ParseErrorReport> {
    match p(tokens) {
        ParseResult::Success { value, remaining } => match eof()(remaining) {
            ParseResult::Success { .. } => Ok(value),
            ParseResult::Error { message, position } => {
                Err(ParseErrorReport { message, position })
            }
        },
        ParseResult::Error { message, position } => Err(ParseErrorReport { message, position }),
    }
}

/// An error surfaced from [`parse_all`]: a plain owned form of
/// `ParseResult::Error` suitable for returning out of a parsing entry
/// point.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseErrorReport {
    pub message: String,
    pub position: Location,
}

impl std::fmt::Display for ParseErrorReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}", self.message, self.position.start)
    }
}

impl std::error::Error for ParseErrorReport {}

#[cfg(test)]
mod tests {
    use super::*;
    use thrush_lexer::tokenize;

    fn toks(src: &str) -> Vec<Token> {
        tokenize(src)
    }

    #[test]
    fn token_kind_matches_and_advances() {
        let tokens = toks("42");
        let p = number();
        match p(&tokens) {
            ParseResult::Success { value, remaining } => {
                assert_eq!(value.value, "42");
                assert_eq!(remaining[0].kind, TokenKind::Eof);
            }
            ParseResult::Error { .. } => panic!("expected success"),
        }
    }

    #[test]
    fn token_kind_mismatch_errors_without_consuming() {
        let tokens = toks("foo");
        let p = number();
        assert!(!p(&tokens).is_success());
    }

    #[test]
    fn choice_picks_first_success() {
        let tokens = toks("foo");
        let p = choice(vec![number(), identifier()]);
        match p(&tokens) {
            ParseResult::Success { value, .. } => assert_eq!(value.value, "foo"),
            ParseResult::Error { .. } => panic!("expected success"),
        }
    }

    #[test]
    fn choice_reports_furthest_error() {
        let tokens = toks("1 2");
        // Neither alternative matches an identifier at position 0, but we
        // want the error from whichever branch consumed furthest -- here
        // both fail immediately, so the first error wins.
        let p = choice(vec![identifier(), keyword("if")]);
        match p(&tokens) {
            ParseResult::Error { message, .. } => assert!(message.contains("identifier") || message.contains("if")),
            ParseResult::Success { .. } => panic!("expected error"),
        }
    }

    #[test]
    fn many_collects_zero_or_more() {
        let tokens = toks("1 2 3 end");
        let p = many(number());
        match p(&tokens) {
            ParseResult::Success { value, remaining } => {
                assert_eq!(value.len(), 3);
                assert_eq!(remaining[0].value, "end");
            }
            ParseResult::Error { .. } => panic!("expected success"),
        }
    }

    #[test]
    fn many1_requires_at_least_one() {
        let tokens = toks("end");
        let p = many1(number());
        assert!(!p(&tokens).is_success());
    }

    #[test]
    fn optional_never_fails() {
        let tokens = toks("foo");
        let p = optional(number());
        match p(&tokens) {
            ParseResult::Success { value, remaining } => {
                assert!(value.is_none());
                assert_eq!(remaining.len(), tokens.len());
            }
            ParseResult::Error { .. } => panic!("optional must not fail"),
        }
    }

    #[test]
    fn sep_by_collects_with_separators() {
        let tokens = toks("1, 2, 3");
        let p = sep_by(number(), punctuation(","));
        match p(&tokens) {
            ParseResult::Success { value, .. } => {
                assert_eq!(value.iter().map(|t| t.value.clone()).collect::<Vec<_>>(), vec!["1", "2", "3"]);
            }
            ParseResult::Error { .. } => panic!("expected success"),
        }
    }

    #[test]
    fn sep_by_allows_zero_items() {
        let tokens = toks("end");
        let p = sep_by(number(), punctuation(","));
        match p(&tokens) {
            ParseResult::Success { value, .. } => assert!(value.is_empty()),
            ParseResult::Error { .. } => panic!("expected success"),
        }
    }

    #[test]
    fn parse_all_requires_full_consumption() {
        let tokens = toks("1 2");
        let result = parse_all(number(), &tokens);
        assert!(result.is_err());
    }

    #[test]
    fn parse_all_succeeds_on_full_consumption() {
        let tokens = toks("1");
        let result = parse_all(number(), &tokens);
        assert!(result.is_ok());
    }

    #[test]
    fn lazy_supports_recursive_grammars() {
        fn parens() -> Parser<'static, Token> {
            lazy(|| {
                choice(vec![
                    number(),
                    map(
                        seq3(punctuation("("), lazy(parens), punctuation(")")),
                        |(_, inner, _)| inner,
                    ),
                ])
            })
        }
        let tokens = toks("((42))");
        match parens()(&tokens) {
            ParseResult::Success { value, .. } => assert_eq!(value.value, "42"),
            ParseResult::Error { message, .. } => panic!("expected success, got {message}"),
        }
    }
}
