// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Exact reproduction.
//!
//! Layout tokens are written with their trivia exactly as parsed. A node
//! without a usable layout is rendered canonically at the indentation of
//! the line it lands on; statements and members get a line of their own.

use stacker::maybe_grow;

use super::{FormatOptions, Rendered, canonical, explicit_parens, is_line_level, needs_parens};
use crate::ast::{NodeId, NodeKind, Piece, SyntaxTree};
use crate::source_analysis::{Token, Trivia};

pub(super) fn render(tree: &SyntaxTree, id: NodeId, options: &FormatOptions) -> Rendered {
    let mut writer = Writer {
        tree,
        options,
        out: Rendered::default(),
        marks: Vec::new(),
        in_line_comment: false,
    };
    writer.framed(id, false);
    writer.flush_marks();
    writer.out
}

struct Writer<'t> {
    tree: &'t SyntaxTree,
    options: &'t FormatOptions,
    out: Rendered,
    /// Nodes whose first text has not been written yet.
    marks: Vec<NodeId>,
    /// The output ends inside a `//` comment.
    in_line_comment: bool,
}

impl Writer<'_> {
    fn node(&mut self, id: NodeId) {
        maybe_grow(32 * 1024, 256 * 1024, || self.node_inner(id));
    }

    fn node_inner(&mut self, id: NodeId) {
        let tree = self.tree;
        self.marks.push(id);
        let Some(layout) = super::usable_layout(tree, id) else {
            self.fallback(id);
            return;
        };
        for piece in layout.pieces() {
            match piece {
                Piece::Token(token) => self.token(token),
                Piece::Child(slot) => {
                    if let Some(child) = tree.child(id, *slot) {
                        self.child(child);
                    }
                }
            }
        }
    }

    fn child(&mut self, child: NodeId) {
        let parens = needs_parens(self.tree, child) && explicit_parens(self.tree, child) == 0;
        self.framed(child, parens);
    }

    /// A node with the trivia it carries from a replaced node outside any
    /// added parentheses.
    fn framed(&mut self, id: NodeId, parens: bool) {
        let tree = self.tree;
        let carried = tree.get(id).map(|node| &node.carried);
        for trivia in carried.map_or(&[][..], |c| c.leading.as_slice()) {
            self.trivia(trivia);
        }
        if parens {
            self.text("(");
        }
        self.node(id);
        if parens {
            self.text(")");
        }
        for trivia in carried.map_or(&[][..], |c| c.trailing.as_slice()) {
            self.trivia(trivia);
        }
    }

    fn token(&mut self, token: &Token) {
        for trivia in token.leading_trivia() {
            self.trivia(trivia);
        }
        self.text(token.text());
        for trivia in token.trailing_trivia() {
            self.trivia(trivia);
        }
    }

    fn trivia(&mut self, trivia: &Trivia) {
        self.out.text.push_str(trivia.as_str());
        if trivia.ends_line() {
            self.in_line_comment = true;
        } else if trivia.newline_count() > 0 {
            self.in_line_comment = false;
        }
    }

    fn text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.in_line_comment {
            let indent = self.current_indent();
            self.break_line(&indent);
        }
        self.flush_marks();
        self.out.text.push_str(text);
    }

    fn flush_marks(&mut self) {
        let offset = self.out.text.len();
        for id in self.marks.drain(..) {
            self.out.offsets.entry(id).or_insert(offset);
        }
    }

    fn break_line(&mut self, indent: &str) {
        self.out.text.push('\n');
        self.out.text.push_str(indent);
        self.in_line_comment = false;
    }

    /// Leading whitespace of the output's last line, one level deeper when
    /// the line opens a brace.
    fn current_indent(&self) -> String {
        let text = &self.out.text;
        let line = text.rfind('\n').map_or(text.as_str(), |at| &text[at + 1..]);
        let mut indent: String = line
            .chars()
            .take_while(|c| matches!(c, ' ' | '\t'))
            .collect();
        if text.trim_end().ends_with('{') {
            indent.push_str(&" ".repeat(self.options.indent_width));
        }
        indent
    }

    fn at_line_start(&self) -> bool {
        let text = &self.out.text;
        text.rfind('\n')
            .map_or(text.as_str(), |at| &text[at + 1..])
            .trim()
            .is_empty()
    }

    fn fallback(&mut self, id: NodeId) {
        let tree = self.tree;
        let indent = self.current_indent();
        if self.in_line_comment || (is_line_level(tree, id) && !self.at_line_start()) {
            self.break_line(&indent);
        }
        let is_file = matches!(tree.kind(id), NodeKind::CompilationUnit);
        let doc = canonical::document(tree, id, self.options, is_file);
        let width = isize::try_from(indent.chars().count()).unwrap_or(0);
        let output = doc.render(width);
        tracing::trace!(node = %id, "rendering synthesized node canonically");

        let base = self.out.text.len();
        let start = base + output.marks.get(&id).copied().unwrap_or(0);
        for pending in self.marks.drain(..) {
            self.out.offsets.entry(pending).or_insert(start);
        }
        for (node, offset) in output.marks {
            self.out.offsets.entry(node).or_insert(base + offset);
        }
        self.out.text.push_str(&output.text);
        if output.ends_in_line_comment {
            self.break_line(&indent);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{BinaryOperator, Modifiers, NodeKind, SyntaxTree};
    use crate::source_analysis::{parse, parse_statement};
    use crate::unparse::{RenderMode, render_tree, render_with_offsets};

    fn find(tree: &SyntaxTree, pred: impl Fn(&NodeKind) -> bool) -> crate::ast::NodeId {
        let root = tree.root().unwrap();
        tree.preorder(root).find(|&id| pred(tree.kind(id))).unwrap()
    }

    #[test]
    fn parsed_source_is_reproduced() {
        let source = "using System ;\n\nnamespace  N{ /* c */ class A { int  x=1 ; // x\n}}\n";
        assert_eq!(render_tree(&parse(source).tree, &RenderMode::Exact), source);
    }

    #[test]
    fn appended_statement_gets_its_own_line() {
        let source = "class A\n{\n    void F()\n    {\n        a();\n    }\n}\n";
        let mut tree = parse(source).tree;
        let block = find(&tree, |k| matches!(k, NodeKind::Block));
        let callee = tree.name("b");
        let call = tree.add_node(NodeKind::Call);
        tree.set_child(call, 0, Some(callee)).unwrap();
        let statement = tree.add_node(NodeKind::ExpressionStatement);
        tree.set_child(statement, 0, Some(call)).unwrap();
        tree.push_child(block, statement).unwrap();

        let expected = "class A\n{\n    void F()\n    {\n        a();\n        b();\n    }\n}\n";
        assert_eq!(render_tree(&tree, &RenderMode::Exact), expected);
    }

    #[test]
    fn member_added_to_empty_type_is_indented() {
        let mut tree = parse("class A\n{\n}\n").tree;
        let class = find(&tree, |k| matches!(k, NodeKind::TypeDecl(_)));
        let field = tree.add_node(NodeKind::Field {
            modifiers: Modifiers::default(),
        });
        let ty = tree.name("int");
        tree.set_child(field, 0, Some(ty)).unwrap();
        let declarator = tree.add_node(NodeKind::Declarator {
            name: "y".into(),
            symbol: None,
        });
        tree.push_child(field, declarator).unwrap();
        tree.push_child(class, field).unwrap();

        assert_eq!(
            render_tree(&tree, &RenderMode::Exact),
            "class A\n{\n    int y;\n}\n"
        );
    }

    #[test]
    fn replaced_operand_keeps_surrounding_text() {
        let mut tree = parse_statement("total  =  1 * 2;").tree;
        let one = find(&tree, |k| matches!(k, NodeKind::Literal { text, .. } if text == "1"));
        let a = tree.name("a");
        let b = tree.name("b");
        let sum = tree.binary(BinaryOperator::Add, a, b).unwrap();
        tree.replace(one, sum).unwrap();

        let rendered = render_with_offsets(&tree, tree.root().unwrap(), &RenderMode::Exact);
        assert_eq!(rendered.text, "total  =  (a + b) * 2;");
        assert_eq!(rendered.offset_of(sum), Some(11));
        assert_eq!(rendered.offset_of(b), Some(15));
    }

    #[test]
    fn replaced_operand_keeps_its_comment() {
        let mut tree = parse_statement("x = 1 /* one */ + 2;").tree;
        let one = find(&tree, |k| matches!(k, NodeKind::Literal { text, .. } if text == "1"));
        let y = tree.name("y");
        tree.replace(one, y).unwrap();
        assert!(!tree[y].carried.is_empty());
        assert_eq!(
            render_tree(&tree, &RenderMode::Exact),
            "x = y /* one */ + 2;"
        );
    }
}
