// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Property-based tests for the lexer.
//!
//! 1. **Lexer never panics** on arbitrary input
//! 2. **Lossless**: tokens plus trivia reproduce the input byte for byte
//! 3. **Token spans are within the input and ordered**
//! 4. **EOF is always last**
//! 5. **Valid fragments produce no errors**

use proptest::prelude::*;

use super::lexer::{lex, lex_with_eof, reconstruct};

// ============================================================================
// Generators
// ============================================================================

/// Known-valid fragments that should lex without errors.
const VALID_FRAGMENTS: &[&str] = &[
    "42",
    "0x1F",
    "3.14",
    "1e10",
    "2.5f",
    "\"hello\"",
    "@\"C:\\path\"",
    "$\"{x} items\"",
    "'a'",
    "'\\n'",
    "true",
    "null",
    "x",
    "@class",
    "a ?? b",
    "x?.Length",
    "a <<= 2",
    "List<List<int>>",
    "x => x + 1",
    "/* block */ x",
    "/// doc\nclass A { }",
    "#region Things\nint x;\n#endregion",
    "global::System.Console",
];

fn valid_fragment() -> impl Strategy<Value = String> {
    prop::sample::select(VALID_FRAGMENTS).prop_map(std::string::ToString::to_string)
}

/// Source-like text built from language fragments, so the lexer sees more
/// realistic token sequences than uniform random characters give.
fn source_like() -> impl Strategy<Value = String> {
    let pieces = prop::sample::select(&[
        "class", " ", "\n", "\t", "{", "}", "(", ")", "[", "]", ";", ",", "x", "42", "3.5",
        "\"s\"", "'c'", "//c\n", "/*c*/", "+", "-", ">>", ">", "<", "?", "??", "=", "@", "$\"",
        "\"", "'", "#if X\n", ".", "::", "\r\n",
    ][..]);
    prop::collection::vec(pieces, 0..60).prop_map(|v| v.concat())
}

// ============================================================================
// Property tests
// ============================================================================

/// Default is 512 cases; override via `PROPTEST_CASES` env var for nightly runs.
fn proptest_config() -> ProptestConfig {
    let default = ProptestConfig::default();
    ProptestConfig {
        cases: default.cases.max(512),
        ..default
    }
}

proptest! {
    #![proptest_config(proptest_config())]

    /// Property 1: Lexer never panics on arbitrary string input.
    #[test]
    fn lexer_never_panics(input in "\\PC{0,500}") {
        let _tokens = lex(&input);
    }

    /// Property 2: Every byte survives lexing.
    #[test]
    fn lexing_is_lossless(input in "\\PC{0,500}") {
        let tokens = lex_with_eof(&input);
        prop_assert_eq!(reconstruct(&tokens), input);
    }

    /// Property 2b: Lossless on source-shaped input too.
    #[test]
    fn lexing_source_like_input_is_lossless(input in source_like()) {
        let tokens = lex_with_eof(&input);
        prop_assert_eq!(reconstruct(&tokens), input);
    }

    /// Property 3: Token spans are within bounds and in order.
    #[test]
    fn token_spans_ordered_and_in_bounds(input in "\\PC{0,500}") {
        let tokens = lex_with_eof(&input);
        let input_len = u32::try_from(input.len()).unwrap_or(u32::MAX);
        for token in &tokens {
            prop_assert!(token.span().start() <= token.span().end());
            prop_assert!(
                token.span().end() <= input_len,
                "span {:?} of {:?} past end {}",
                token.span(),
                token.kind(),
                input_len,
            );
        }
        for window in tokens.windows(2) {
            prop_assert!(
                window[1].span().start() >= window[0].span().end(),
                "{:?} overlaps {:?} in {:?}",
                window[0],
                window[1],
                input,
            );
        }
    }

    /// Property 4: lex_with_eof always ends with EOF.
    #[test]
    fn eof_always_last(input in "\\PC{0,500}") {
        let tokens = lex_with_eof(&input);
        prop_assert!(tokens.last().is_some_and(|t| t.kind().is_eof()));
        prop_assert_eq!(tokens.iter().filter(|t| t.kind().is_eof()).count(), 1);
    }

    /// Property 5: Known-valid fragments produce no Error tokens.
    #[test]
    fn valid_fragments_no_errors(input in valid_fragment()) {
        for token in &lex(&input) {
            prop_assert!(!token.kind().is_error(), "{:?} in {:?}", token.kind(), input);
        }
    }
}
