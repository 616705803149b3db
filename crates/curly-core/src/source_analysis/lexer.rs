// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Lexical analysis for curly source code.
//!
//! This module converts source text into a stream of [`Token`]s. The lexer
//! is hand-written so it can be lossless and never fail.
//!
//! # Design Principles
//!
//! - **Error recovery**: Never panic on malformed input; emit [`TokenKind::Error`]
//! - **Lossless**: Every byte of input lands in exactly one token's text or trivia
//! - **Trailing trivia**: Same-line whitespace and a terminating `//` comment
//!   belong to the token before them; everything else leads the next token
//!
//! # Example
//!
//! ```
//! use curly_core::source_analysis::{Lexer, TokenKind};
//!
//! let tokens: Vec<_> = Lexer::new("x += 1;").collect();
//! assert_eq!(tokens.len(), 4); // x, +=, 1, ;
//! assert_eq!(tokens[1].kind(), &TokenKind::Operator("+=".into()));
//! ```

use std::iter::Peekable;
use std::str::CharIndices;

use ecow::EcoString;

use super::token::{OPERATORS, is_keyword};
use super::{Span, Token, TokenKind, Trivia};

/// A lexer that tokenizes curly source code.
///
/// The iterator yields every token except the final [`TokenKind::Eof`];
/// use [`lex_with_eof`] when the trivia at the end of the file matters.
pub struct Lexer<'src> {
    source: &'src str,
    chars: Peekable<CharIndices<'src>>,
    position: usize,
    pending_trivia: Vec<Trivia>,
    finished: bool,
}

impl std::fmt::Debug for Lexer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lexer")
            .field("position", &self.position)
            .field("remaining", &self.source.get(self.position..).unwrap_or(""))
            .finish()
    }
}

impl<'src> Lexer<'src> {
    /// Creates a new lexer for the given source text.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            position: 0,
            pending_trivia: Vec::new(),
            finished: false,
        }
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    /// Peeks `n+1` characters ahead (n=0 is the same as `peek_char`).
    fn peek_char_n(&self, n: usize) -> Option<char> {
        let mut iter = self.chars.clone();
        for _ in 0..n {
            iter.next();
        }
        iter.next().map(|(_, c)| c)
    }

    fn advance(&mut self) -> Option<char> {
        let (pos, c) = self.chars.next()?;
        self.position = pos + c.len_utf8();
        Some(c)
    }

    fn advance_while(&mut self, predicate: impl Fn(char) -> bool) {
        while self.peek_char().is_some_and(&predicate) {
            self.advance();
        }
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "source files over 4GB are not supported"
    )]
    fn current_position(&self) -> u32 {
        self.position as u32
    }

    fn span_from(&self, start: u32) -> Span {
        Span::new(start, self.current_position())
    }

    fn text_for(&self, span: Span) -> &'src str {
        &self.source[span.as_range()]
    }

    fn text_from(&self, start: u32) -> EcoString {
        EcoString::from(self.text_for(self.span_from(start)))
    }

    fn is_whitespace(c: char) -> bool {
        matches!(c, ' ' | '\t' | '\r' | '\n' | '\u{0B}' | '\u{0C}' | '\u{FEFF}')
    }

    /// Skips whitespace, comments and directives, collecting them as trivia.
    fn skip_trivia(&mut self) {
        loop {
            match self.peek_char() {
                Some(c) if Self::is_whitespace(c) => {
                    let start = self.current_position();
                    self.advance_while(Self::is_whitespace);
                    let text = self.text_from(start);
                    self.pending_trivia.push(Trivia::Whitespace(text));
                }
                Some('/') if self.peek_char_n(1) == Some('/') => self.lex_line_comment(),
                Some('/') if self.peek_char_n(1) == Some('*') => self.lex_block_comment(),
                Some('#') => {
                    let start = self.current_position();
                    self.advance_while(|c| c != '\n' && c != '\r');
                    let text = self.text_from(start);
                    self.pending_trivia.push(Trivia::Directive(text));
                }
                _ => break,
            }
        }
    }

    /// Lexes `// ...` or, with exactly three slashes, a `/// ...` doc comment.
    fn lex_line_comment(&mut self) {
        let start = self.current_position();
        let is_doc = self.peek_char_n(2) == Some('/') && self.peek_char_n(3) != Some('/');
        self.advance_while(|c| c != '\n' && c != '\r');
        let text = self.text_from(start);
        self.pending_trivia.push(if is_doc {
            Trivia::DocComment(text)
        } else {
            Trivia::LineComment(text)
        });
    }

    /// Lexes `/* ... */`. An unterminated comment runs to the end of input.
    fn lex_block_comment(&mut self) {
        let start = self.current_position();
        self.advance(); // /
        self.advance(); // *
        loop {
            match self.peek_char() {
                None => break,
                Some('*') if self.peek_char_n(1) == Some('/') => {
                    self.advance();
                    self.advance();
                    break;
                }
                _ => {
                    self.advance();
                }
            }
        }
        let text = self.text_from(start);
        self.pending_trivia.push(Trivia::BlockComment(text));
    }

    /// Collects trailing trivia: same-line whitespace, then at most one
    /// `//` comment which ends the line.
    fn collect_trailing_trivia(&mut self) {
        loop {
            match self.peek_char() {
                Some(' ' | '\t') => {
                    let start = self.current_position();
                    self.advance_while(|c| matches!(c, ' ' | '\t'));
                    let text = self.text_from(start);
                    self.pending_trivia.push(Trivia::Whitespace(text));
                }
                Some('/') if self.peek_char_n(1) == Some('/') => {
                    self.lex_line_comment();
                    break;
                }
                _ => break,
            }
        }
    }

    /// Lexes the next token, EOF included.
    fn lex_token(&mut self) -> Token {
        self.skip_trivia();
        let leading_trivia = std::mem::take(&mut self.pending_trivia);

        let start = self.current_position();
        let kind = match self.peek_char() {
            None => TokenKind::Eof,
            Some(c) => self.lex_token_kind(c, start),
        };
        let span = self.span_from(start);

        if !kind.is_eof() {
            self.collect_trailing_trivia();
        }
        let trailing_trivia = std::mem::take(&mut self.pending_trivia);

        Token::with_trivia(kind, span, leading_trivia, trailing_trivia)
    }

    fn lex_token_kind(&mut self, c: char, start: u32) -> TokenKind {
        match c {
            '0'..='9' => self.lex_number(start),
            '.' if self.peek_char_n(1).is_some_and(|d| d.is_ascii_digit()) => {
                self.lex_number(start)
            }
            '"' => self.lex_string(start),
            '\'' => self.lex_character(start),
            '@' | '$' => self.lex_prefixed(c, start),
            c if c.is_alphabetic() || c == '_' => self.lex_word(start),
            '(' => self.single(TokenKind::LeftParen),
            ')' => self.single(TokenKind::RightParen),
            '{' => self.single(TokenKind::LeftBrace),
            '}' => self.single(TokenKind::RightBrace),
            '[' => self.single(TokenKind::LeftBracket),
            ']' => self.single(TokenKind::RightBracket),
            ';' => self.single(TokenKind::Semicolon),
            ',' => self.single(TokenKind::Comma),
            _ => self.lex_operator(start),
        }
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        kind
    }

    fn lex_word(&mut self, start: u32) -> TokenKind {
        self.advance_while(|c| c.is_alphanumeric() || c == '_');
        let text = self.text_from(start);
        if is_keyword(&text) {
            TokenKind::Keyword(text)
        } else {
            TokenKind::Identifier(text)
        }
    }

    /// `@ident`, `@"verbatim"`, `$"interpolated"`, `$@"..."` and `@$"..."`.
    fn lex_prefixed(&mut self, first: char, start: u32) -> TokenKind {
        match (self.peek_char_n(1), self.peek_char_n(2)) {
            (Some('"'), _) => {
                self.advance();
                if first == '@' {
                    self.lex_verbatim_string(start)
                } else {
                    self.lex_interpolated_string(start, false)
                }
            }
            (Some('@' | '$'), Some('"')) if self.peek_char_n(1) != Some(first) => {
                self.advance();
                self.advance();
                self.lex_interpolated_string(start, true)
            }
            (Some(c), _) if first == '@' && (c.is_alphabetic() || c == '_') => {
                self.advance();
                self.advance_while(|c| c.is_alphanumeric() || c == '_');
                TokenKind::Identifier(self.text_from(start))
            }
            _ => {
                self.advance();
                TokenKind::Error(self.text_from(start))
            }
        }
    }

    fn lex_number(&mut self, start: u32) -> TokenKind {
        let mut is_float = false;
        if self.peek_char() == Some('0') && matches!(self.peek_char_n(1), Some('x' | 'X' | 'b' | 'B'))
        {
            self.advance();
            self.advance();
            self.advance_while(|c| c.is_ascii_hexdigit() || c == '_');
        } else {
            self.advance_while(|c| c.is_ascii_digit() || c == '_');
            if self.peek_char() == Some('.') && self.peek_char_n(1).is_some_and(|c| c.is_ascii_digit())
            {
                is_float = true;
                self.advance();
                self.advance_while(|c| c.is_ascii_digit() || c == '_');
            }
            if matches!(self.peek_char(), Some('e' | 'E')) {
                let digit_at = if matches!(self.peek_char_n(1), Some('+' | '-')) {
                    2
                } else {
                    1
                };
                if self.peek_char_n(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                    is_float = true;
                    for _ in 0..digit_at {
                        self.advance();
                    }
                    self.advance_while(|c| c.is_ascii_digit());
                }
            }
        }
        if matches!(self.peek_char(), Some('f' | 'F' | 'd' | 'D' | 'm' | 'M')) {
            is_float = true;
            self.advance();
        } else {
            self.advance_while(|c| matches!(c, 'u' | 'U' | 'l' | 'L'));
        }
        if self.peek_char().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.advance_while(|c| c.is_alphanumeric() || c == '_');
            return TokenKind::Error(self.text_from(start));
        }
        let text = self.text_from(start);
        if is_float {
            TokenKind::Float(text)
        } else {
            TokenKind::Integer(text)
        }
    }

    /// A regular string; an unescaped line break or end of input leaves it
    /// unterminated.
    fn lex_string(&mut self, start: u32) -> TokenKind {
        self.advance(); // opening quote
        loop {
            match self.peek_char() {
                None | Some('\n' | '\r') => return TokenKind::Error(self.text_from(start)),
                Some('\\') => {
                    self.advance();
                    if !matches!(self.peek_char(), None | Some('\n' | '\r')) {
                        self.advance();
                    }
                }
                Some('"') => {
                    self.advance();
                    return TokenKind::String(self.text_from(start));
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    /// `@"..."`: `""` escapes a quote and line breaks are allowed.
    fn lex_verbatim_string(&mut self, start: u32) -> TokenKind {
        self.advance(); // opening quote
        loop {
            match self.peek_char() {
                None => return TokenKind::Error(self.text_from(start)),
                Some('"') if self.peek_char_n(1) == Some('"') => {
                    self.advance();
                    self.advance();
                }
                Some('"') => {
                    self.advance();
                    return TokenKind::String(self.text_from(start));
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    /// `$"..."` with `{expr}` holes; `{{` and `}}` are escapes. Holes may
    /// contain nested strings and braces.
    fn lex_interpolated_string(&mut self, start: u32, verbatim: bool) -> TokenKind {
        self.advance(); // opening quote
        let mut depth = 0usize;
        loop {
            let Some(c) = self.peek_char() else {
                return TokenKind::Error(self.text_from(start));
            };
            if depth == 0 {
                match c {
                    '\n' | '\r' if !verbatim => return TokenKind::Error(self.text_from(start)),
                    '\\' if !verbatim => {
                        self.advance();
                        if !matches!(self.peek_char(), None | Some('\n' | '\r')) {
                            self.advance();
                        }
                    }
                    '"' if verbatim && self.peek_char_n(1) == Some('"') => {
                        self.advance();
                        self.advance();
                    }
                    '"' => {
                        self.advance();
                        return TokenKind::String(self.text_from(start));
                    }
                    '{' | '}' if self.peek_char_n(1) == Some(c) => {
                        self.advance();
                        self.advance();
                    }
                    '{' => {
                        depth += 1;
                        self.advance();
                    }
                    _ => {
                        self.advance();
                    }
                }
            } else {
                match c {
                    '{' => depth += 1,
                    '}' => depth -= 1,
                    '"' => {
                        let nested = self.current_position();
                        if self.lex_string(nested).is_error() {
                            return TokenKind::Error(self.text_from(start));
                        }
                        continue;
                    }
                    _ => {}
                }
                self.advance();
            }
        }
    }

    fn lex_character(&mut self, start: u32) -> TokenKind {
        self.advance(); // opening quote
        match self.peek_char() {
            Some('\\') => {
                self.advance();
                if !matches!(self.peek_char(), None | Some('\n' | '\r')) {
                    self.advance();
                }
                self.advance_while(|c| c.is_ascii_hexdigit());
            }
            Some('\n' | '\r' | '\'') | None => {}
            Some(_) => {
                self.advance();
            }
        }
        if self.peek_char() == Some('\'') {
            self.advance();
        }
        let text = self.text_from(start);
        if text.len() >= 3 && text.ends_with('\'') {
            TokenKind::Character(text)
        } else {
            TokenKind::Error(text)
        }
    }

    fn lex_operator(&mut self, start: u32) -> TokenKind {
        let rest = &self.source[self.position..];
        if let Some(op) = OPERATORS.iter().find(|op| rest.starts_with(*op)) {
            for _ in 0..op.chars().count() {
                self.advance();
            }
            return TokenKind::Operator(EcoString::from(*op));
        }
        self.advance();
        TokenKind::Error(self.text_from(start))
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let token = self.lex_token();
        if token.kind().is_eof() {
            self.finished = true;
            None
        } else {
            Some(token)
        }
    }
}

/// Lexes source into a vector of tokens, excluding EOF.
#[must_use]
pub fn lex(source: &str) -> Vec<Token> {
    Lexer::new(source).collect()
}

/// Lexes source into a vector of tokens ending with EOF.
///
/// The EOF token's leading trivia carries whatever follows the last real
/// token, so the result is a lossless cover of `source`.
#[must_use]
pub fn lex_with_eof(source: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.lex_token();
        let is_eof = token.kind().is_eof();
        tokens.push(token);
        if is_eof {
            break;
        }
    }
    tokens
}

/// Reassembles source text from tokens and their trivia.
#[must_use]
pub fn reconstruct(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        for trivia in token.leading_trivia() {
            out.push_str(trivia.as_str());
        }
        out.push_str(token.text());
        for trivia in token.trailing_trivia() {
            out.push_str(trivia.as_str());
        }
    }
    out
}
