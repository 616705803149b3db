// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Fuzz target for parser crash safety and lossless rendering.
//!
//! Arbitrary UTF-8 is fed to the lexer, every parser entry point and the
//! renderer. The target fails if:
//! - Anything panics
//! - Exact rendering of a fresh parse differs from the input
//! - The token stream does not reproduce the input
//!
//! Seed the corpus in `fuzz/corpus/parse_arbitrary/` with real source files
//! for more realistic mutations.

#![no_main]

use curly_core::source_analysis::{
    lex_with_eof, parse, parse_expression, parse_statement, reconstruct,
};
use curly_core::unparse::{FormatOptions, RenderMode, render_tree};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Invalid UTF-8 is rejected before lexing, so it is not a parser concern.
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };

    assert_eq!(reconstruct(&lex_with_eof(source)), source);

    let result = parse(source);
    assert_eq!(render_tree(&result.tree, &RenderMode::Exact), source);
    let _ = render_tree(
        &result.tree,
        &RenderMode::Canonical(FormatOptions::default()),
    );
    let _ = render_tree(&result.tree, &RenderMode::Description);

    let expression = parse_expression(source);
    assert_eq!(render_tree(&expression.tree, &RenderMode::Exact), source);
    let statement = parse_statement(source);
    assert_eq!(render_tree(&statement.tree, &RenderMode::Exact), source);
});
