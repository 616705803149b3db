// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Token types for curly lexical analysis.
//!
//! Every token keeps its raw lexeme together with the whitespace, comments
//! and preprocessor-style directives around it. Concatenating
//! `leading + text + trailing` over a full token stream (EOF included)
//! reproduces the source byte for byte, which is what makes exact rendering
//! of the syntax tree possible.

use ecow::EcoString;

use super::Span;

/// Reserved words of the supported C-family grammar subset.
pub const KEYWORDS: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
    "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
    "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
    "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
    "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed", "short",
    "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true",
    "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using", "virtual",
    "void", "volatile", "while",
];

/// Punctuation operators, longest first so the lexer can match greedily.
///
/// `>>` and `>>=` are deliberately absent: `>` is always lexed alone and the
/// parser glues adjacent `>` tokens back together, so that nested generic
/// argument lists like `List<List<int>>` close correctly.
pub const OPERATORS: &[&str] = &[
    "<<=", "??=", "::", "?.", "??", "=>", "++", "--", "&&", "||", "==", "!=", "<=", ">=", "<<",
    "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", ".", "+", "-", "*", "/", "%", "&", "|",
    "^", "!", "~", "<", ">", "=", "?", ":",
];

/// Returns `true` if `word` is a reserved keyword.
#[must_use]
pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.binary_search(&word).is_ok()
}

/// The kind of token, carrying the raw lexeme where it varies.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// An identifier, including `@`-escaped ones: `foo`, `@class`
    Identifier(EcoString),
    /// A reserved word: `class`, `if`, `int`
    Keyword(EcoString),
    /// An integer literal, suffix included: `42`, `0xFF`, `10UL`
    Integer(EcoString),
    /// A real literal: `3.14`, `1e-3`, `2.5f`
    Float(EcoString),
    /// A string literal with its quotes: `"a"`, `@"C:\x"`, `$"{x}"`
    String(EcoString),
    /// A character literal with its quotes: `'a'`, `'\n'`
    Character(EcoString),
    /// A punctuation operator: `+`, `??`, `::`
    Operator(EcoString),
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `;`
    Semicolon,
    /// `,`
    Comma,
    /// End of input; its leading trivia holds the end of the file.
    Eof,
    /// Unlexable text, preserved for error recovery.
    Error(EcoString),
}

impl TokenKind {
    /// Returns the exact source text of this token.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Identifier(s)
            | Self::Keyword(s)
            | Self::Integer(s)
            | Self::Float(s)
            | Self::String(s)
            | Self::Character(s)
            | Self::Operator(s)
            | Self::Error(s) => s,
            Self::LeftParen => "(",
            Self::RightParen => ")",
            Self::LeftBrace => "{",
            Self::RightBrace => "}",
            Self::LeftBracket => "[",
            Self::RightBracket => "]",
            Self::Semicolon => ";",
            Self::Comma => ",",
            Self::Eof => "",
        }
    }

    /// Builds the kind a piece of canonical text would lex to.
    ///
    /// Used when the tree synthesizes tokens for nodes created by edits.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        match text {
            "(" => Self::LeftParen,
            ")" => Self::RightParen,
            "{" => Self::LeftBrace,
            "}" => Self::RightBrace,
            "[" => Self::LeftBracket,
            "]" => Self::RightBracket,
            ";" => Self::Semicolon,
            "," => Self::Comma,
            "" => Self::Eof,
            _ if is_keyword(text) => Self::Keyword(text.into()),
            _ if OPERATORS.contains(&text) || text == ">>" || text == ">>=" => {
                Self::Operator(text.into())
            }
            _ => {
                let first = text.chars().next().unwrap_or(' ');
                if first.is_ascii_digit() {
                    if text.contains(['.', 'e', 'E']) && !text.starts_with("0x") {
                        Self::Float(text.into())
                    } else {
                        Self::Integer(text.into())
                    }
                } else if first == '"' || text.starts_with("@\"") || text.starts_with("$\"") {
                    Self::String(text.into())
                } else if first == '\'' {
                    Self::Character(text.into())
                } else {
                    Self::Identifier(text.into())
                }
            }
        }
    }

    /// Returns `true` if this token is a literal value (including the
    /// `true`, `false` and `null` keywords).
    #[must_use]
    pub fn is_literal(&self) -> bool {
        match self {
            Self::Integer(_) | Self::Float(_) | Self::String(_) | Self::Character(_) => true,
            Self::Keyword(k) => matches!(k.as_str(), "true" | "false" | "null"),
            _ => false,
        }
    }

    /// Returns `true` if this token is an identifier.
    #[must_use]
    pub const fn is_identifier(&self) -> bool {
        matches!(self, Self::Identifier(_))
    }

    /// Returns `true` if this is the given keyword.
    #[must_use]
    pub fn is_keyword(&self, word: &str) -> bool {
        matches!(self, Self::Keyword(k) if k == word)
    }

    /// Returns `true` if this is the given operator.
    #[must_use]
    pub fn is_operator(&self, op: &str) -> bool {
        matches!(self, Self::Operator(o) if o == op)
    }

    /// Returns `true` if this token opens or closes a bracketed region.
    #[must_use]
    pub const fn is_delimiter(&self) -> bool {
        matches!(
            self,
            Self::LeftParen
                | Self::RightParen
                | Self::LeftBrace
                | Self::RightBrace
                | Self::LeftBracket
                | Self::RightBracket
        )
    }

    /// Returns `true` if this is the end-of-file marker.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self, Self::Eof)
    }

    /// Returns `true` if this is an error token.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Returns `true` if this token is a word (identifier, keyword or
    /// literal) that needs a space to stay separate from a following word.
    #[must_use]
    pub fn is_word(&self) -> bool {
        match self {
            Self::Identifier(_)
            | Self::Keyword(_)
            | Self::Integer(_)
            | Self::Float(_)
            | Self::Character(_) => true,
            Self::String(s) => !s.starts_with('"'),
            _ => false,
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Eof => write!(f, "end of file"),
            Self::Error(s) => write!(f, "invalid text `{s}`"),
            other => write!(f, "`{}`", other.text()),
        }
    }
}

/// Non-semantic source content attached to tokens.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Trivia {
    /// Whitespace (spaces, tabs, newlines)
    Whitespace(EcoString),
    /// `// comment`
    LineComment(EcoString),
    /// `/* comment */`
    BlockComment(EcoString),
    /// `/// doc comment`
    DocComment(EcoString),
    /// A whole-line directive such as `#region Helpers` or `#if DEBUG`
    Directive(EcoString),
}

impl Trivia {
    /// Returns the text content of this trivia.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Whitespace(s)
            | Self::LineComment(s)
            | Self::BlockComment(s)
            | Self::DocComment(s)
            | Self::Directive(s) => s,
        }
    }

    /// Returns the number of newlines in this trivia.
    #[must_use]
    pub fn newline_count(&self) -> usize {
        self.as_str().matches('\n').count()
    }

    /// Returns `true` if this is whitespace.
    #[must_use]
    pub const fn is_whitespace(&self) -> bool {
        matches!(self, Self::Whitespace(_))
    }

    /// Returns `true` if this is a comment or a directive.
    #[must_use]
    pub const fn is_comment(&self) -> bool {
        !self.is_whitespace()
    }

    /// Returns `true` if this trivia runs to the end of its line, so whatever
    /// follows it must start on a new line.
    #[must_use]
    pub const fn ends_line(&self) -> bool {
        matches!(
            self,
            Self::LineComment(_) | Self::DocComment(_) | Self::Directive(_)
        )
    }
}

/// A token with its source location and surrounding trivia.
///
/// # Examples
///
/// ```
/// use curly_core::source_analysis::{Span, Token, TokenKind};
///
/// let token = Token::new(TokenKind::Identifier("foo".into()), Span::new(0, 3));
/// assert_eq!(token.text(), "foo");
/// assert_eq!(token.span().len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    kind: TokenKind,
    span: Span,
    leading_trivia: Vec<Trivia>,
    trailing_trivia: Vec<Trivia>,
}

impl Token {
    /// Creates a new token with no trivia.
    #[must_use]
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self {
            kind,
            span,
            leading_trivia: Vec::new(),
            trailing_trivia: Vec::new(),
        }
    }

    /// Creates a new token with trivia.
    #[must_use]
    pub fn with_trivia(
        kind: TokenKind,
        span: Span,
        leading_trivia: Vec<Trivia>,
        trailing_trivia: Vec<Trivia>,
    ) -> Self {
        Self {
            kind,
            span,
            leading_trivia,
            trailing_trivia,
        }
    }

    /// Creates a trivia-free token for `text` with no source location.
    #[must_use]
    pub fn synthetic(text: &str) -> Self {
        Self::new(TokenKind::from_text(text), Span::default())
    }

    /// Returns the kind of this token.
    #[must_use]
    pub fn kind(&self) -> &TokenKind {
        &self.kind
    }

    /// Consumes the token and returns its kind.
    #[must_use]
    pub fn into_kind(self) -> TokenKind {
        self.kind
    }

    /// Returns the raw source text of the token (excluding trivia).
    #[must_use]
    pub fn text(&self) -> &str {
        self.kind.text()
    }

    /// Returns the source span of this token (excluding trivia).
    #[must_use]
    pub fn span(&self) -> Span {
        self.span
    }

    /// Returns the trivia that precedes this token.
    #[must_use]
    pub fn leading_trivia(&self) -> &[Trivia] {
        &self.leading_trivia
    }

    /// Returns the trivia that follows this token on the same line.
    #[must_use]
    pub fn trailing_trivia(&self) -> &[Trivia] {
        &self.trailing_trivia
    }

    /// Mutable access to the leading trivia.
    pub fn leading_trivia_mut(&mut self) -> &mut Vec<Trivia> {
        &mut self.leading_trivia
    }

    /// Mutable access to the trailing trivia.
    pub fn trailing_trivia_mut(&mut self) -> &mut Vec<Trivia> {
        &mut self.trailing_trivia
    }

    /// Returns `true` if this token has any leading comments.
    #[must_use]
    pub fn has_leading_comment(&self) -> bool {
        self.leading_trivia.iter().any(Trivia::is_comment)
    }

    /// Returns `true` if this token has any trailing comments.
    #[must_use]
    pub fn has_trailing_comment(&self) -> bool {
        self.trailing_trivia.iter().any(Trivia::is_comment)
    }

    /// Number of newlines in the leading trivia.
    #[must_use]
    pub fn leading_newlines(&self) -> usize {
        self.leading_trivia.iter().map(Trivia::newline_count).sum()
    }

    /// Returns `true` if the token starts a new source line.
    #[must_use]
    pub fn starts_line(&self) -> bool {
        self.leading_newlines() > 0
    }

    /// Returns `true` if at least one empty line separates this token from
    /// whatever precedes it.
    #[must_use]
    pub fn has_blank_line_before(&self) -> bool {
        self.leading_trivia
            .iter()
            .any(|t| t.is_whitespace() && t.newline_count() >= 2)
    }

    /// Returns `true` if the trailing trivia ends the line (a `//` comment).
    #[must_use]
    pub fn ends_line(&self) -> bool {
        self.trailing_trivia.iter().any(Trivia::ends_line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_table_is_sorted() {
        let mut sorted = KEYWORDS.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, KEYWORDS);
        assert!(is_keyword("namespace"));
        assert!(!is_keyword("var"));
    }

    #[test]
    fn operators_are_longest_first_within_prefix() {
        for (i, a) in OPERATORS.iter().enumerate() {
            for b in &OPERATORS[i + 1..] {
                assert!(
                    !(b.len() > a.len() && b.starts_with(a)),
                    "`{b}` must come before `{a}`"
                );
            }
        }
    }

    #[test]
    fn token_kind_text_and_display() {
        assert_eq!(TokenKind::Identifier("foo".into()).text(), "foo");
        assert_eq!(TokenKind::LeftBrace.text(), "{");
        assert_eq!(TokenKind::Eof.text(), "");
        assert_eq!(TokenKind::Operator("??".into()).to_string(), "`??`");
        assert_eq!(TokenKind::Eof.to_string(), "end of file");
    }

    #[test]
    fn from_text_classifies() {
        assert_eq!(TokenKind::from_text("class"), TokenKind::Keyword("class".into()));
        assert_eq!(TokenKind::from_text("+="), TokenKind::Operator("+=".into()));
        assert_eq!(TokenKind::from_text(">>"), TokenKind::Operator(">>".into()));
        assert_eq!(TokenKind::from_text("3.5"), TokenKind::Float("3.5".into()));
        assert_eq!(TokenKind::from_text("0x1E"), TokenKind::Integer("0x1E".into()));
        assert_eq!(TokenKind::from_text("\"s\""), TokenKind::String("\"s\"".into()));
        assert_eq!(TokenKind::from_text("Vector"), TokenKind::Identifier("Vector".into()));
        assert_eq!(TokenKind::from_text(";"), TokenKind::Semicolon);
    }

    #[test]
    fn literal_predicate_includes_keyword_literals() {
        assert!(TokenKind::Keyword("null".into()).is_literal());
        assert!(TokenKind::Integer("1".into()).is_literal());
        assert!(!TokenKind::Keyword("class".into()).is_literal());
        assert!(!TokenKind::Identifier("x".into()).is_literal());
    }

    #[test]
    fn blank_line_detection() {
        let token = Token::with_trivia(
            TokenKind::Identifier("x".into()),
            Span::new(5, 6),
            vec![
                Trivia::Whitespace("\n".into()),
                Trivia::LineComment("// c".into()),
                Trivia::Whitespace("\n    ".into()),
            ],
            Vec::new(),
        );
        assert!(token.starts_line());
        assert_eq!(token.leading_newlines(), 2);
        assert!(!token.has_blank_line_before());
        assert!(token.has_leading_comment());

        let spaced = Token::with_trivia(
            TokenKind::Identifier("y".into()),
            Span::new(9, 10),
            vec![Trivia::Whitespace("\n\n".into())],
            vec![Trivia::LineComment("// end".into())],
        );
        assert!(spaced.has_blank_line_before());
        assert!(spaced.ends_line());
    }
}
