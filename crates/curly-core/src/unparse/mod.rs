// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Turning syntax trees back into text.
//!
//! **DDD Context:** Language Service — Formatting
//!
//! Three modes share one entry point, [`render`]:
//!
//! - [`RenderMode::Exact`] writes every token of a parsed node with its
//!   original trivia, so `render(parse(src)) == src`. Nodes built or
//!   restructured after parsing have no usable layout and fall back to
//!   canonical text at the surrounding indentation.
//! - [`RenderMode::Canonical`] recomputes whitespace: Allman braces, one
//!   statement per line, normalized spacing and the parentheses precedence
//!   requires (explicit ones are kept). Comments stay with their tokens.
//! - [`RenderMode::Description`] summarizes a declaration on one line for
//!   tooling, e.g. `method Scale(double) -> Vector`.
//!
//! ```
//! use curly_core::source_analysis::parse;
//! use curly_core::unparse::{FormatOptions, RenderMode, render};
//!
//! let source = "class A{int x;  }";
//! let result = parse(source);
//! let root = result.root().unwrap();
//! assert_eq!(render(&result.tree, root, &RenderMode::Exact), source);
//! let canonical = render(&result.tree, root, &RenderMode::Canonical(FormatOptions::default()));
//! assert_eq!(canonical, "class A\n{\n    int x;\n}\n");
//! ```

mod canonical;
mod describe;
pub mod document;
mod exact;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ast::{
    Associativity, Layout, NodeId, NodeKind, OperandSlot, SyntaxTree, operators,
};

/// Canonical formatting settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    /// Spaces per nesting level.
    pub indent_width: usize,
    /// Longest run of empty lines kept between statements and members.
    pub max_blank_lines: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            indent_width: 4,
            max_blank_lines: 1,
        }
    }
}

/// How [`render`] turns a subtree into text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderMode {
    /// Original text wherever the tree still has it.
    Exact,
    /// Reformatted text.
    Canonical(FormatOptions),
    /// One-line summary.
    Description,
}

/// Rendered text with the start offset of every rendered node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    /// Byte offset in `text` where each node's first token starts.
    pub offsets: BTreeMap<NodeId, usize>,
}

impl Rendered {
    /// Offset of `id` in the rendered text.
    #[must_use]
    pub fn offset_of(&self, id: NodeId) -> Option<usize> {
        self.offsets.get(&id).copied()
    }
}

// --- Public entry points ---

/// Renders the subtree at `id`.
///
/// # Panics
///
/// Panics if `id` has been removed from `tree`.
#[must_use]
pub fn render(tree: &SyntaxTree, id: NodeId, mode: &RenderMode) -> String {
    render_with_offsets(tree, id, mode).text
}

/// Renders the whole tree; an empty tree renders as an empty string.
#[must_use]
pub fn render_tree(tree: &SyntaxTree, mode: &RenderMode) -> String {
    tree.root()
        .map(|root| render(tree, root, mode))
        .unwrap_or_default()
}

/// Renders the subtree at `id` and reports where each node starts.
///
/// Description mode reports no offsets.
///
/// # Panics
///
/// Panics if `id` has been removed from `tree`.
#[must_use]
pub fn render_with_offsets(tree: &SyntaxTree, id: NodeId, mode: &RenderMode) -> Rendered {
    let _span = tracing::trace_span!("render", node = %id).entered();
    match mode {
        RenderMode::Exact => exact::render(tree, id, &FormatOptions::default()),
        RenderMode::Canonical(options) => {
            let is_file = matches!(tree.kind(id), NodeKind::CompilationUnit);
            let doc = canonical::document(tree, id, options, is_file);
            let output = doc.render(0);
            Rendered {
                text: output.text,
                offsets: output.marks,
            }
        }
        RenderMode::Description => Rendered {
            text: describe::describe(tree, id),
            offsets: BTreeMap::new(),
        },
    }
}

// --- Shared helpers ---

/// The node's layout, if it still accounts for every child.
fn usable_layout(tree: &SyntaxTree, id: NodeId) -> Option<&Layout> {
    let node = tree.get(id)?;
    let layout = node.layout.as_ref()?;
    node.children()
        .iter()
        .enumerate()
        .all(|(slot, child)| child.is_none() || layout.has_child(slot))
        .then_some(layout)
}

/// Parenthesis pairs the node already renders around itself.
fn explicit_parens(tree: &SyntaxTree, id: NodeId) -> usize {
    match usable_layout(tree, id) {
        Some(layout) => layout.wrapping_parens(),
        None => usize::from(tree[id].format.parens),
    }
}

/// Returns `true` if operator precedence requires parentheses around `id`
/// in its current position.
fn needs_parens(tree: &SyntaxTree, id: NodeId) -> bool {
    let (Some(parent), Some(slot)) = (tree.parent(id), tree.slot_of(id)) else {
        return false;
    };
    let side = |slot| {
        if slot == 0 {
            OperandSlot::Left
        } else {
            OperandSlot::Right
        }
    };
    let (precedence, associativity, operand) = match tree.kind(parent) {
        NodeKind::Binary { op, .. } if op.is_member_access() && slot == 1 => return false,
        NodeKind::Binary { op, .. } if op.takes_type_operand() && slot == 1 => return false,
        NodeKind::Binary { op, .. } => (op.precedence(), op.associativity(), side(slot)),
        NodeKind::Unary { op, .. } if op.is_postfix() => {
            (op.precedence(), Associativity::Left, OperandSlot::Left)
        }
        NodeKind::Unary { op, .. } => (op.precedence(), Associativity::Right, OperandSlot::Right),
        NodeKind::Conditional => {
            let operand = match slot {
                0 => OperandSlot::Left,
                1 => OperandSlot::Middle,
                _ => OperandSlot::Right,
            };
            (operators::CONDITIONAL, Associativity::Right, operand)
        }
        NodeKind::Cast if slot == 1 => {
            (operators::UNARY, Associativity::Right, OperandSlot::Right)
        }
        NodeKind::Call | NodeKind::Index if slot == 0 => {
            (operators::PRIMARY, Associativity::Left, OperandSlot::Left)
        }
        _ => return false,
    };
    operators::needs_parens(tree.kind(id).precedence(), precedence, associativity, operand)
}

/// Returns `true` for nodes that sit on lines of their own: statements and
/// members directly inside a block, type, namespace or file.
fn is_line_level(tree: &SyntaxTree, id: NodeId) -> bool {
    let (Some(parent), Some(slot)) = (tree.parent(id), tree.slot_of(id)) else {
        return false;
    };
    match tree.kind(parent) {
        NodeKind::Block | NodeKind::CompilationUnit => true,
        NodeKind::Namespace { .. } => slot >= 1,
        NodeKind::TypeDecl(decl) => slot >= decl.base_count,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BinaryOperator;
    use crate::source_analysis::{parse, parse_expression};

    fn canonical() -> RenderMode {
        RenderMode::Canonical(FormatOptions::default())
    }

    #[test]
    fn format_options_deserialize_with_defaults() {
        let options: FormatOptions = toml::from_str("indent_width = 2").unwrap();
        assert_eq!(options.indent_width, 2);
        assert_eq!(options.max_blank_lines, 1);
    }

    #[test]
    fn synthesized_operands_get_required_parens() {
        let mut tree = SyntaxTree::new();
        let a = tree.name("a");
        let b = tree.name("b");
        let c = tree.name("c");
        let sum = tree.binary(BinaryOperator::Add, a, b).unwrap();
        let product = tree.binary(BinaryOperator::Multiply, sum, c).unwrap();
        tree.set_root(product).unwrap();
        assert_eq!(render(&tree, product, &canonical()), "(a + b) * c");
        assert_eq!(render(&tree, product, &RenderMode::Exact), "(a + b) * c");
    }

    #[test]
    fn associativity_decides_parens_at_equal_precedence() {
        let mut tree = SyntaxTree::new();
        let a = tree.name("a");
        let b = tree.name("b");
        let c = tree.name("c");
        let right = tree.binary(BinaryOperator::Subtract, b, c).unwrap();
        let outer = tree.binary(BinaryOperator::Subtract, a, right).unwrap();
        assert_eq!(render(&tree, outer, &canonical()), "a - (b - c)");

        let x = tree.name("x");
        let y = tree.name("y");
        let z = tree.name("z");
        let inner = tree.binary(BinaryOperator::NullCoalescing, y, z).unwrap();
        let outer = tree.binary(BinaryOperator::NullCoalescing, x, inner).unwrap();
        assert_eq!(render(&tree, outer, &canonical()), "x ?? y ?? z");
    }

    #[test]
    fn explicit_parens_are_not_doubled() {
        let result = parse_expression("(a + b) * c");
        let root = result.root().unwrap();
        assert_eq!(render(&result.tree, root, &canonical()), "(a + b) * c");
    }

    #[test]
    fn offsets_point_at_first_tokens() {
        let source = "class A\n{\n    int x;\n}\n";
        let result = parse(source);
        let tree = &result.tree;
        let root = result.root().unwrap();
        let class = tree.child(root, 0).unwrap();
        let field = tree.child(class, 0).unwrap();
        for mode in [RenderMode::Exact, canonical()] {
            let rendered = render_with_offsets(tree, root, &mode);
            assert_eq!(rendered.text, source);
            assert_eq!(rendered.offset_of(class), Some(0));
            assert_eq!(rendered.offset_of(field), Some(14));
        }
    }

    #[test]
    fn render_tree_of_an_empty_tree() {
        assert_eq!(render_tree(&SyntaxTree::new(), &RenderMode::Exact), "");
    }
}
