// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Lexing and parsing.
//!
//! # Lexical Analysis
//!
//! The [`Lexer`] turns source text into [`Token`]s. Every byte of the input
//! belongs to exactly one token's text or to its leading/trailing
//! [`Trivia`], so the token stream can always be turned back into the
//! original text:
//!
//! ```
//! use curly_core::source_analysis::{lex_with_eof, reconstruct};
//!
//! let source = "x = y + 1; // done\n";
//! assert_eq!(reconstruct(&lex_with_eof(source)), source);
//! ```
//!
//! # Parsing
//!
//! [`parse`] builds a [`SyntaxTree`](crate::ast::SyntaxTree) for a whole
//! file; [`parse_expression`] and [`parse_statement`] parse fragments.
//! The grammar is data: a [`ParseRegistry`] maps tokens to factories, and
//! [`parse_with`] accepts a registry extended with new node kinds.
//!
//! # Error Handling
//!
//! Neither the lexer nor the parser stops at bad input. Unlexable text
//! becomes [`TokenKind::Error`] tokens and unparseable tokens become
//! `Unrecognized` nodes; both are reported as [`Diagnostic`]s in the
//! [`ParseResult`] and as annotations on the nearest node.

mod diagnostic;
mod error;
mod lexer;
mod line_index;
mod parser;
mod span;
mod token;

// Property-based tests for the lexer
#[cfg(test)]
mod lexer_property_tests;

pub use diagnostic::{Diagnostic, DiagnosticCategory, Severity};
pub use error::{LexError, LexErrorKind};
pub use lexer::{Lexer, lex, lex_with_eof, reconstruct};
pub use line_index::{LineIndex, Position};
pub use parser::{
    Binding, Checkpoint, Factory, ParseContext, ParseFlags, ParsePoint, ParseRegistry,
    ParseResult, Parser, TokenPattern, parse, parse_expression, parse_statement, parse_with,
    standard_registry,
};
pub use span::Span;
pub use token::{KEYWORDS, OPERATORS, Token, TokenKind, Trivia, is_keyword};
