//! Single-pass scanner for the core language.
//!
//! Converts source text into a `Vec<Token>`. The lexer never fails: it
//! degrades malformed input into best-effort tokens (unterminated strings,
//! lone `@`, unrecognized punctuation) and leaves all error reporting to the
//! parser.

mod cursor;

use cursor::Cursor;
use thrush_common::span::{Location, Position};
use thrush_common::token::{is_keyword, Token, TokenKind, OPERATORS, SINGLE_CHAR_OPERATORS};

/// The Mesh-style scanner. Wraps a [`Cursor`] and implements
/// `Iterator<Item = Token>` so callers can consume tokens lazily or collect
/// them into a `Vec`.
pub struct Lexer<'src> {
    source: &'src str,
    cursor: Cursor<'src>,
    emitted_eof: bool,
    /// True immediately after a `fn` keyword and before the following `=>`,
    /// so that a bare `_` in parameter position lexes as an identifier
    /// rather than the wildcard-pattern punctuation.
    in_fn_params: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            cursor: Cursor::new(source),
            emitted_eof: false,
            in_fn_params: false,
        }
    }

    /// Tokenize the entire source into a `Vec<Token>`, always ending in
    /// exactly one `Eof` token.
    pub fn tokenize(source: &str) -> Vec<Token> {
        Lexer::new(source).collect()
    }

    fn pos(&self) -> Position {
        let (line, col) = self.cursor.line_col();
        Position::new(line, col)
    }

    fn loc_from(&self, start: Position) -> Location {
        Location::new(start, self.pos())
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.cursor.peek() {
                Some(c) if c.is_whitespace() => {
                    self.cursor.advance();
                }
                Some('#') => {
                    self.cursor.eat_while(|c| c != '\n');
                }
                _ => break,
            }
        }
    }

    fn next_token(&mut self) -> Token {
        self.skip_trivia();
        let start = self.pos();

        let Some(c) = self.cursor.peek() else {
            return Token::new(TokenKind::Eof, "", self.loc_from(start));
        };

        match c {
            '"' | '\'' => self.lex_string(c, start),
            '0'..='9' => self.lex_number(start),
            '@' => self.lex_accessor(start),
            c if is_ident_start(c) => self.lex_ident(start),
            '(' | ')' | ',' | ';' | ':' | '[' | ']' | '{' | '}' => self.lex_punct_char(start),
            '_' => self.lex_underscore(start),
            _ if is_operator_start(c) => self.lex_operator(start),
            other => {
                self.cursor.advance();
                Token::new(TokenKind::Punctuation, other.to_string(), self.loc_from(start))
            }
        }
    }

    fn lex_string(&mut self, quote: char, start: Position) -> Token {
        let mut value = String::new();
        value.push(self.cursor.advance().unwrap()); // opening quote
        loop {
            match self.cursor.peek() {
                None => break, // unterminated: return what we have, no error
                Some('\\') => {
                    value.push(self.cursor.advance().unwrap());
                    if let Some(escaped) = self.cursor.advance() {
                        value.push(escaped);
                    }
                }
                Some(c) if c == quote => {
                    value.push(self.cursor.advance().unwrap());
                    break;
                }
                Some(c) => {
                    value.push(c);
                    self.cursor.advance();
                }
            }
        }
        Token::new(TokenKind::String, value, self.loc_from(start))
    }

    fn lex_number(&mut self, start: Position) -> Token {
        let mut value = String::new();
        while let Some(c) = self.cursor.peek() {
            if c.is_ascii_digit() {
                value.push(c);
                self.cursor.advance();
            } else {
                break;
            }
        }
        // Trailing `.` with no following digit is left as separate punctuation.
        if self.cursor.peek() == Some('.') && self.cursor.peek_next().is_some_and(|c| c.is_ascii_digit())
        {
            value.push(self.cursor.advance().unwrap()); // '.'
            while let Some(c) = self.cursor.peek() {
                if c.is_ascii_digit() {
                    value.push(c);
                    self.cursor.advance();
                } else {
                    break;
                }
            }
        }
        Token::new(TokenKind::Number, value, self.loc_from(start))
    }

    fn lex_ident(&mut self, start: Position) -> Token {
        let mut value = String::new();
        value.push(self.cursor.advance().unwrap());
        while let Some(c) = self.cursor.peek() {
            if is_ident_continue(c) {
                value.push(c);
                self.cursor.advance();
            } else {
                break;
            }
        }
        // Special case: `mut!` is a single keyword.
        if value == "mut" && self.cursor.peek() == Some('!') {
            value.push(self.cursor.advance().unwrap());
        }
        let kind = if is_keyword(&value) {
            if value == "fn" {
                self.in_fn_params = true;
            }
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };
        Token::new(kind, value, self.loc_from(start))
    }

    fn lex_underscore(&mut self, start: Position) -> Token {
        self.cursor.advance();
        if self.in_fn_params {
            Token::new(TokenKind::Identifier, "_", self.loc_from(start))
        } else {
            Token::new(TokenKind::Punctuation, "_", self.loc_from(start))
        }
    }

    fn lex_accessor(&mut self, start: Position) -> Token {
        self.cursor.advance(); // '@'
        let mut name = String::new();
        while let Some(c) = self.cursor.peek() {
            if is_ident_continue(c) {
                name.push(c);
                self.cursor.advance();
            } else {
                break;
            }
        }
        if self.cursor.peek() == Some('?') {
            name.push(self.cursor.advance().unwrap());
        }
        Token::new(TokenKind::Accessor, name, self.loc_from(start))
    }

    fn lex_punct_char(&mut self, start: Position) -> Token {
        let c = self.cursor.advance().unwrap();
        Token::new(TokenKind::Punctuation, c.to_string(), self.loc_from(start))
    }

    fn lex_operator(&mut self, start: Position) -> Token {
        let remaining: String = {
            let mut iter = self.cursor_chars_from_here();
            let mut s = String::with_capacity(2);
            if let Some(c) = iter.next() {
                s.push(c);
            }
            if let Some(c) = iter.next() {
                s.push(c);
            }
            s
        };

        let matched = OPERATORS
            .iter()
            .find(|op| remaining.starts_with(*op))
            .copied();

        let text = if let Some(op) = matched {
            for _ in 0..op.chars().count() {
                self.cursor.advance();
            }
            op.to_string()
        } else {
            let c = self.cursor.advance().unwrap();
            c.to_string()
        };

        if text == "=>" {
            self.in_fn_params = false;
        }

        Token::new(TokenKind::Operator, text, self.loc_from(start))
    }

    /// A throwaway iterator over the remaining characters, used only for
    /// multi-character operator lookahead.
    fn cursor_chars_from_here(&self) -> impl Iterator<Item = char> + '_ {
        CursorPeekIter { lexer: self, n: 0 }
    }
}

/// Tiny adapter so `lex_operator` can peek up to two characters ahead
/// without threading extra lookahead methods through `Cursor`.
struct CursorPeekIter<'a, 'src> {
    lexer: &'a Lexer<'src>,
    n: usize,
}

impl Iterator for CursorPeekIter<'_, '_> {
    type Item = char;
    fn next(&mut self) -> Option<char> {
        let c = match self.n {
            0 => self.lexer.cursor.peek(),
            1 => self.lexer.cursor.peek_next(),
            _ => None,
        };
        self.n += 1;
        c
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_operator_start(c: char) -> bool {
    SINGLE_CHAR_OPERATORS.contains(&c)
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.emitted_eof {
            return None;
        }
        let token = self.next_token();
        if token.is_eof() {
            self.emitted_eof = true;
        }
        Some(token)
    }
}

/// Tokenize `source`, always returning a non-empty vector ending in `Eof`.
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::tokenize(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src).iter().map(|t| t.kind).collect()
    }

    fn values(src: &str) -> Vec<String> {
        tokenize(src).iter().map(|t| t.value.clone()).collect()
    }

    #[test]
    fn empty_source_is_just_eof() {
        let toks = tokenize("");
        assert_eq!(toks.len(), 1);
        assert_eq!(toks[0].kind, TokenKind::Eof);
    }

    #[test]
    fn always_ends_in_exactly_one_eof() {
        let toks = tokenize("let x = 1 in x");
        assert_eq!(toks.last().unwrap().kind, TokenKind::Eof);
        assert_eq!(toks.iter().filter(|t| t.kind == TokenKind::Eof).count(), 1);
    }

    #[test]
    fn whitespace_and_comments_are_skipped() {
        let toks = tokenize("  # a comment\n  42");
        assert_eq!(
            kinds("  # a comment\n  42"),
            vec![TokenKind::Number, TokenKind::Eof]
        );
        assert_eq!(toks[0].value, "42");
    }

    #[test]
    fn nbsp_is_treated_as_whitespace() {
        let toks = tokenize("1\u{00A0}+\u{00A0}2");
        assert_eq!(
            toks.iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![
                TokenKind::Number,
                TokenKind::Operator,
                TokenKind::Number,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn number_literal_and_trailing_dot() {
        assert_eq!(values("123.456"), vec!["123.456", ""]);
        let toks = tokenize("123.");
        assert_eq!(toks[0].kind, TokenKind::Number);
        assert_eq!(toks[0].value, "123");
        assert_eq!(toks[1].kind, TokenKind::Punctuation);
        assert_eq!(toks[1].value, ".");
    }

    #[test]
    fn identifiers_and_keywords() {
        assert_eq!(
            kinds("if then else foo"),
            vec![
                TokenKind::Keyword,
                TokenKind::Keyword,
                TokenKind::Keyword,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn mut_bang_is_a_single_keyword() {
        let toks = tokenize("mut! x = 1");
        assert_eq!(toks[0].kind, TokenKind::Keyword);
        assert_eq!(toks[0].value, "mut!");
    }

    #[test]
    fn string_with_escape_and_unterminated() {
        let toks = tokenize(r#""a\"b""#);
        assert_eq!(toks[0].kind, TokenKind::String);
        assert_eq!(toks[0].value, r#""a\"b""#);

        let toks = tokenize("\"abc");
        assert_eq!(toks[0].kind, TokenKind::String);
        assert_eq!(toks[0].value, "\"abc");
        assert_eq!(toks[1].kind, TokenKind::Eof);
    }

    #[test]
    fn accessor_forms() {
        let toks = tokenize("@name @age? @");
        assert_eq!(toks[0].kind, TokenKind::Accessor);
        assert_eq!(toks[0].value, "name");
        assert_eq!(toks[1].kind, TokenKind::Accessor);
        assert_eq!(toks[1].value, "age?");
        assert_eq!(toks[2].kind, TokenKind::Accessor);
        assert_eq!(toks[2].value, "");
    }

    #[test]
    fn operator_longest_match() {
        assert_eq!(values("|> | |? <| == = => ->"), vec![
            "|>", "|", "|?", "<|", "==", "=", "=>", "->", ""
        ]);
    }

    #[test]
    fn punctuation_tokens() {
        assert_eq!(
            kinds("( ) , ; : [ ] { }"),
            vec![TokenKind::Punctuation; 9]
                .into_iter()
                .chain(std::iter::once(TokenKind::Eof))
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn bare_underscore_is_punctuation_outside_fn_params() {
        let toks = tokenize("match x with (_ => 1)");
        let wildcard = toks.iter().find(|t| t.value == "_").unwrap();
        assert_eq!(wildcard.kind, TokenKind::Punctuation);
    }

    #[test]
    fn underscore_in_fn_param_position_is_identifier() {
        let toks = tokenize("fn _ => 1");
        let param = toks.iter().find(|t| t.value == "_").unwrap();
        assert_eq!(param.kind, TokenKind::Identifier);
    }

    #[test]
    fn locations_are_populated() {
        let toks = tokenize("foo\nbar");
        assert_eq!(toks[0].location.start, thrush_common::Position::new(1, 1));
        assert_eq!(toks[1].location.start, thrush_common::Position::new(2, 1));
    }

    #[test]
    fn unknown_single_char_is_punctuation() {
        let toks = tokenize("~");
        assert_eq!(toks[0].kind, TokenKind::Punctuation);
        assert_eq!(toks[0].value, "~");
    }
}
