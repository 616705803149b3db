// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Lexical error types.
//!
//! The lexer itself never fails: it emits [`TokenKind::Error`] tokens. The
//! parser classifies those tokens into [`LexError`]s when it reports them.

// Spurious warnings from miette derive macro expansion
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

use super::{Span, Token, TokenKind};

/// A lexical error recovered from an error token.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("{kind}")]
#[diagnostic(code(curly::lex))]
pub struct LexError {
    /// The kind of lexical error.
    #[source]
    pub kind: LexErrorKind,
    /// The source location of the error.
    #[label("here")]
    pub span: Span,
}

impl LexError {
    /// Creates a new lexical error.
    #[must_use]
    pub fn new(kind: LexErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Classifies an error token. Returns `None` for any other token.
    #[must_use]
    pub fn from_token(token: &Token) -> Option<Self> {
        let TokenKind::Error(text) = token.kind() else {
            return None;
        };
        let kind = if text.starts_with('"') || text.starts_with("@\"") || text.contains("$\"") {
            LexErrorKind::UnterminatedString
        } else if text.starts_with('\'') {
            LexErrorKind::InvalidCharacter
        } else if text.starts_with(|c: char| c.is_ascii_digit()) {
            LexErrorKind::InvalidNumber
        } else {
            LexErrorKind::UnexpectedCharacter(text.chars().next().unwrap_or('\0'))
        };
        Some(Self::new(kind, token.span()))
    }
}

/// The kind of lexical error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexErrorKind {
    /// An unexpected character was encountered.
    #[error("unexpected character '{0}'")]
    UnexpectedCharacter(char),

    /// A string literal was not terminated.
    #[error("unterminated string literal")]
    UnterminatedString,

    /// An invalid number literal.
    #[error("invalid number literal")]
    InvalidNumber,

    /// An empty or unterminated character literal.
    #[error("invalid character literal")]
    InvalidCharacter,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_analysis::lex;

    fn first_error(source: &str) -> LexError {
        lex(source)
            .iter()
            .find_map(LexError::from_token)
            .expect("source should contain an error token")
    }

    #[test]
    fn classifies_error_tokens() {
        assert_eq!(first_error("\"open").kind, LexErrorKind::UnterminatedString);
        assert_eq!(first_error("$\"open {x}").kind, LexErrorKind::UnterminatedString);
        assert_eq!(first_error("''").kind, LexErrorKind::InvalidCharacter);
        assert_eq!(first_error("12abc").kind, LexErrorKind::InvalidNumber);
        assert_eq!(
            first_error("a ` b").kind,
            LexErrorKind::UnexpectedCharacter('`')
        );
    }

    #[test]
    fn lex_error_display_and_span() {
        let err = first_error("x = \"open");
        assert_eq!(err.to_string(), "unterminated string literal");
        assert_eq!(err.span, Span::new(4, 9));
    }

    #[test]
    fn ordinary_tokens_are_not_errors() {
        assert!(lex("x").iter().all(|t| LexError::from_token(t).is_none()));
    }
}
