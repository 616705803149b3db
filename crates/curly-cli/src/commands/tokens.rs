// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! `curly tokens`: dump the token stream of a file.

use camino::Utf8Path;
use curly_core::source_analysis::{LineIndex, Token, TokenKind, Trivia, lex_with_eof};
use miette::Result;

use super::read_source;

/// Prints one token per line, optionally with its trivia.
pub fn run_tokens(path: &str, with_trivia: bool) -> Result<()> {
    let source = read_source(Utf8Path::new(path))?;
    for line in token_lines(&source, with_trivia) {
        println!("{line}");
    }
    Ok(())
}

/// Lines of the token dump: `line:col  class  text`, with indented trivia
/// lines around each token when requested.
pub fn token_lines(source: &str, with_trivia: bool) -> Vec<String> {
    let index = LineIndex::new(source);
    let mut lines = Vec::new();
    for token in lex_with_eof(source) {
        if with_trivia {
            lines.extend(token.leading_trivia().iter().map(|t| trivia_line("leading", t)));
        }
        lines.push(token_line(&token, &index));
        if with_trivia {
            lines.extend(token.trailing_trivia().iter().map(|t| trivia_line("trailing", t)));
        }
    }
    lines
}

fn token_line(token: &Token, index: &LineIndex) -> String {
    let position = index.position(token.span().start()).to_string();
    let kind = token.kind();
    format!("{position:>7}  {:<10}  {:?}", class(kind), kind.text())
}

fn trivia_line(side: &str, trivia: &Trivia) -> String {
    let class = match trivia {
        Trivia::Whitespace(_) => "whitespace",
        Trivia::LineComment(_) => "comment",
        Trivia::BlockComment(_) => "block",
        Trivia::DocComment(_) => "doc",
        Trivia::Directive(_) => "directive",
    };
    format!("         {side} {class} {:?}", trivia.as_str())
}

fn class(kind: &TokenKind) -> &'static str {
    match kind {
        TokenKind::Identifier(_) => "identifier",
        TokenKind::Keyword(_) => "keyword",
        TokenKind::Integer(_) => "integer",
        TokenKind::Float(_) => "float",
        TokenKind::String(_) => "string",
        TokenKind::Character(_) => "char",
        TokenKind::Operator(_) => "operator",
        TokenKind::LeftParen
        | TokenKind::RightParen
        | TokenKind::LeftBrace
        | TokenKind::RightBrace
        | TokenKind::LeftBracket
        | TokenKind::RightBracket
        | TokenKind::Semicolon
        | TokenKind::Comma => "punct",
        TokenKind::Eof => "eof",
        TokenKind::Error(_) => "error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_listed_with_positions() {
        let lines = token_lines("int x = 1;\n", false);
        let trimmed: Vec<&str> = lines.iter().map(|l| l.trim_start()).collect();
        assert_eq!(
            trimmed,
            [
                "1:1  keyword     \"int\"",
                "1:5  identifier  \"x\"",
                "1:7  operator    \"=\"",
                "1:9  integer     \"1\"",
                "1:10  punct       \";\"",
                "2:1  eof         \"\"",
            ]
        );
    }

    #[test]
    fn trivia_is_shown_on_request() {
        let lines = token_lines("// note\nx", true);
        assert!(lines.iter().any(|l| l.contains("leading comment \"// note\"")));
        assert!(!token_lines("// note\nx", false).iter().any(|l| l.contains("note")));
    }
}
