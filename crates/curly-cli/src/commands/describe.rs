// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! `curly describe`: an outline of a file's declarations.

use camino::Utf8Path;
use curly_core::ast::{NodeId, NodeKind, SyntaxTree};
use curly_core::source_analysis::{LineIndex, parse};
use curly_core::unparse::{RenderMode, render};
use miette::Result;

use super::read_source;

/// Prints one line per declaration: its position, then its summary
/// indented by nesting.
pub fn run_describe(path: &str) -> Result<()> {
    let source = read_source(Utf8Path::new(path))?;
    for line in outline(&source) {
        println!("{line}");
    }
    Ok(())
}

/// Outline lines of a source text. Declarations inside broken syntax are
/// still listed.
pub fn outline(source: &str) -> Vec<String> {
    let result = parse(source);
    let tree = &result.tree;
    let Some(root) = tree.root() else {
        return Vec::new();
    };
    let index = LineIndex::new(source);
    tree.preorder(root)
        .filter(|&id| is_outlined(tree.kind(id)))
        .map(|id| {
            let position = tree
                .position(id, &index)
                .map_or_else(|| "-".to_string(), |p| p.to_string());
            let indent = "  ".repeat(depth(tree, id));
            let summary = render(tree, id, &RenderMode::Description);
            format!("{position:>7}  {indent}{summary}")
        })
        .collect()
}

fn is_outlined(kind: &NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Using { .. }
            | NodeKind::Namespace { .. }
            | NodeKind::TypeDecl(_)
            | NodeKind::Field { .. }
            | NodeKind::Method(_)
            | NodeKind::OperatorDecl { .. }
            | NodeKind::Property { .. }
            | NodeKind::EnumMember { .. }
    )
}

/// Number of enclosing namespaces and types.
fn depth(tree: &SyntaxTree, id: NodeId) -> usize {
    tree.ancestors(id)
        .filter(|&a| matches!(tree.kind(a), NodeKind::Namespace { .. } | NodeKind::TypeDecl(_)))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declarations_are_outlined_by_nesting() {
        let source = "using System;\nnamespace Shop\n{\n    class Cart\n    {\n        int count;\n        public void Add(Item item) { count++; }\n    }\n}\n";
        let lines = outline(source);
        let trimmed: Vec<&str> = lines.iter().map(|l| l.trim_start()).collect();
        assert_eq!(
            trimmed,
            [
                "1:1  using System",
                "2:1  namespace Shop",
                "4:5    class Shop.Cart",
                "6:9      field count: int",
                "7:9      method Add(Item) -> void",
            ]
        );
    }

    #[test]
    fn statements_are_not_listed() {
        let lines = outline("class A { void F() { int x = 1; if (x > 0) x--; } }");
        assert_eq!(lines.len(), 2);
    }
}
