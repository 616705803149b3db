// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Property-based tests for the parser and renderer.
//!
//! 1. **Parser never panics** on arbitrary input, in every entry point
//! 2. **Exact rendering reproduces the input**, valid or not
//! 3. **Canonical formatting is idempotent** on well-formed programs
//! 4. **Canonical output parses** without new diagnostics

use proptest::prelude::*;

use super::{parse, parse_expression, parse_statement};
use crate::unparse::{FormatOptions, RenderMode, render_tree};

// ============================================================================
// Generators
// ============================================================================

const MEMBERS: &[&str] = &[
    "int x;",
    "public int X { get; set; }",
    "public int Y\n{\n    get { return y; }\n    set { y = value; }\n}",
    "void F() { return; }",
    "void G(int a, ref int b)\n{\n  if (a > b) a = b; else { b++; }\n}",
    "static T Max<T>(T a, T b) => a > b ? a : b;",
    "// note\nstring s = \"q\";",
    "/// Docs.\npublic Point(int x) { X = x; }",
    "public static Point operator +(Point a, Point b) => new Point(a.X + b.X);",
    "int[] values = { 1, 2, 3 };",
    "/* c */ double d = (double)1 / 3;",
    "void H() { for (int i = 0; i < 10; i++) { Log(i); } }",
    "void K()\n{\n    foreach (var v in list) Use(v);\n    while (x) x--;\n    do { y(); } while (z);\n}",
    "Dictionary<string, List<int>> map = new Dictionary<string, List<int>>();",
    "\n#region R\nint r;\n#endregion\n",
    "void S()\n{\n    switch (x)\n    {\n        case 1: break;\n    }\n}",
    "enum E { A, B = 2 }",
    "int? maybe = null;",
    "bool Check(object o) => o is string && !(o == null) || count-- > 0;",
    "[Obsolete]\nvoid Old() { throw new NotSupportedException(\"old\"); }",
];

const SEPARATORS: &[&str] = &[" ", "\n", "\n\n", "\n\n\n    ", "\t", "\n  // between\n"];

/// Well-formed programs assembled from member snippets with varied spacing.
fn program() -> impl Strategy<Value = String> {
    let member = (
        prop::sample::select(MEMBERS),
        prop::sample::select(SEPARATORS),
    );
    (
        prop::collection::vec(member, 0..8),
        prop::sample::select(&["class", "struct", "interface"][..]),
    )
        .prop_map(|(members, keyword)| {
            let mut source = format!("using System;\n\nnamespace N\n{{\n{keyword} C {{");
            for (member, separator) in members {
                source.push_str(separator);
                source.push_str(member);
            }
            source.push_str("\n}\n}\n");
            source
        })
}

/// Source-shaped noise: real tokens in random order.
fn token_soup() -> impl Strategy<Value = String> {
    let pieces = prop::sample::select(&[
        "class ", "namespace ", "using ", "if ", "else ", "new ", "return ", "x", "T", "42",
        "\"s\"", "{", "}", "(", ")", "[", "]", "<", ">", ";", ",", ".", "=", "+", "?", ":",
        "=>", "\n", " ", "// c\n", "/* c */", "#if X\n", "get", "set", "@",
    ][..]);
    prop::collection::vec(pieces, 0..80).prop_map(|v| v.concat())
}

fn canonical(source: &str) -> String {
    render_tree(
        &parse(source).tree,
        &RenderMode::Canonical(FormatOptions::default()),
    )
}

// ============================================================================
// Property tests
// ============================================================================

/// Default is 256 cases; override via `PROPTEST_CASES` env var for nightly runs.
fn proptest_config() -> ProptestConfig {
    let default = ProptestConfig::default();
    ProptestConfig {
        cases: default.cases.max(256),
        ..default
    }
}

proptest! {
    #![proptest_config(proptest_config())]

    /// Property 1: No entry point panics on arbitrary input.
    #[test]
    fn parser_never_panics(input in "\\PC{0,300}") {
        let _ = parse(&input);
        let _ = parse_expression(&input);
        let _ = parse_statement(&input);
    }

    /// Property 1b: ... nor on token soup, which reaches deeper into the grammar.
    #[test]
    fn parser_never_panics_on_token_soup(input in token_soup()) {
        let result = parse(&input);
        let _ = render_tree(&result.tree, &RenderMode::Canonical(FormatOptions::default()));
        let _ = render_tree(&result.tree, &RenderMode::Description);
    }

    /// Property 2: Exact rendering of a fresh parse is the input.
    #[test]
    fn exact_rendering_round_trips(input in "\\PC{0,300}") {
        let result = parse(&input);
        prop_assert_eq!(render_tree(&result.tree, &RenderMode::Exact), input);
    }

    /// Property 2b: ... for fragments too.
    #[test]
    fn exact_rendering_round_trips_fragments(input in token_soup()) {
        let expression = parse_expression(&input);
        prop_assert_eq!(render_tree(&expression.tree, &RenderMode::Exact), input.as_str());
        let statement = parse_statement(&input);
        prop_assert_eq!(render_tree(&statement.tree, &RenderMode::Exact), input);
    }

    /// Property 2c: ... and for well-formed programs.
    #[test]
    fn exact_rendering_round_trips_programs(input in program()) {
        let result = parse(&input);
        prop_assert_eq!(render_tree(&result.tree, &RenderMode::Exact), input);
    }

    /// Property 3: Formatting formatted code changes nothing.
    #[test]
    fn canonical_formatting_is_idempotent(input in program()) {
        let once = canonical(&input);
        let twice = canonical(&once);
        prop_assert_eq!(twice, once);
    }

    /// Property 4: Formatting never introduces syntax errors.
    #[test]
    fn canonical_output_parses_cleanly(input in program()) {
        let before = parse(&input).diagnostics.iter().filter(|d| d.is_error()).count();
        let once = canonical(&input);
        let after = parse(&once).diagnostics.iter().filter(|d| d.is_error()).count();
        prop_assert!(after <= before, "{} errors after formatting:\n{}", after, once);
    }
}
