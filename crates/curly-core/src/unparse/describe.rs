// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! One-line summaries of declarations for documentation and tooling.

use super::{FormatOptions, canonical};
use crate::ast::{NodeId, NodeKind, SyntaxTree};

/// Longest code excerpt in a summary of a statement or expression.
const MAX_EXCERPT: usize = 60;

pub(super) fn describe(tree: &SyntaxTree, id: NodeId) -> String {
    match tree.kind(id) {
        NodeKind::CompilationUnit => {
            let members = tree.child_nodes(id).count();
            format!("compilation unit ({members} members)")
        }
        NodeKind::Using { alias, is_static } => {
            let target = slot_text(tree, id, 0).unwrap_or_default();
            match alias {
                Some(alias) => format!("using {alias} = {target}"),
                None if *is_static => format!("using static {target}"),
                None => format!("using {target}"),
            }
        }
        NodeKind::Namespace { .. } => {
            format!("namespace {}", slot_text(tree, id, 0).unwrap_or_default())
        }
        NodeKind::TypeDecl(decl) => {
            let mut text = format!(
                "{} {}{}",
                decl.kind.keyword(),
                qualified_name(tree, id),
                type_params(&decl.type_params)
            );
            let bases: Vec<String> = (0..decl.base_count)
                .filter_map(|slot| slot_text(tree, id, slot))
                .collect();
            if !bases.is_empty() {
                text.push_str(" : ");
                text.push_str(&bases.join(", "));
            }
            text
        }
        NodeKind::Method(method) if method.is_constructor => {
            format!("constructor {}({})", method.name, parameters(tree, id))
        }
        NodeKind::Method(method) => format!(
            "method {}{}({}){}",
            method.name,
            type_params(&method.type_params),
            parameters(tree, id),
            returns(tree, id)
        ),
        NodeKind::OperatorDecl { symbol_text, .. } => format!(
            "operator {symbol_text}({}){}",
            parameters(tree, id),
            returns(tree, id)
        ),
        NodeKind::Property { name, .. } => format!("property {name}{}", returns(tree, id)),
        NodeKind::Accessor { kind, .. } => format!("accessor {}", kind.word()),
        NodeKind::Field { .. } => format!("field {}", declared(tree, id)),
        NodeKind::LocalDecl { .. } => format!("local {}", declared(tree, id)),
        NodeKind::Declarator { name, .. } => {
            let owner = tree.parent(id);
            let role = match owner.map(|p| tree.kind(p)) {
                Some(NodeKind::Field { .. }) => "field",
                Some(NodeKind::LocalDecl { .. }) => "local",
                _ => "declarator",
            };
            match owner.and_then(|p| slot_text(tree, p, 0)) {
                Some(ty) => format!("{role} {name}: {ty}"),
                None => format!("{role} {name}"),
            }
        }
        NodeKind::Parameter { name, modifier } => {
            let ty = slot_text(tree, id, 0).unwrap_or_default();
            match modifier {
                Some(modifier) => format!("parameter {name}: {modifier} {ty}"),
                None => format!("parameter {name}: {ty}"),
            }
        }
        NodeKind::EnumMember { name, .. } => format!("enum member {name}"),
        kind => format!("{}: {}", kind.label(), excerpt(&flat_text(tree, id))),
    }
}

/// Canonical text of a subtree on one line.
fn flat_text(tree: &SyntaxTree, id: NodeId) -> String {
    let text = canonical::document(tree, id, &FormatOptions::default(), false).to_pretty_string();
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn excerpt(text: &str) -> String {
    if text.chars().count() <= MAX_EXCERPT {
        return text.to_owned();
    }
    let cut: String = text.chars().take(MAX_EXCERPT - 3).collect();
    format!("{}...", cut.trim_end())
}

fn slot_text(tree: &SyntaxTree, id: NodeId, slot: usize) -> Option<String> {
    tree.child(id, slot).map(|child| flat_text(tree, child))
}

fn type_params(params: &[ecow::EcoString]) -> String {
    if params.is_empty() {
        String::new()
    } else {
        format!("<{}>", params.join(", "))
    }
}

/// Name of a type prefixed by its enclosing namespaces and types.
fn qualified_name(tree: &SyntaxTree, id: NodeId) -> String {
    let mut segments = Vec::new();
    for ancestor in std::iter::once(id).chain(tree.ancestors(id)) {
        match tree.kind(ancestor) {
            NodeKind::TypeDecl(decl) => segments.push(decl.name.to_string()),
            NodeKind::Namespace { .. } => {
                if let Some(name) = tree.child(ancestor, 0).and_then(|n| tree.dotted_name(n)) {
                    segments.push(name);
                }
            }
            _ => {}
        }
    }
    segments.reverse();
    segments.join(".")
}

/// Parameter types of a method or operator.
fn parameters(tree: &SyntaxTree, id: NodeId) -> String {
    tree.variadic_children(id)
        .filter_map(|param| {
            let ty = slot_text(tree, param, 0)?;
            Some(match tree.kind(param) {
                NodeKind::Parameter {
                    modifier: Some(modifier),
                    ..
                } => format!("{modifier} {ty}"),
                _ => ty,
            })
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn returns(tree: &SyntaxTree, id: NodeId) -> String {
    slot_text(tree, id, 0).map_or_else(String::new, |ty| format!(" -> {ty}"))
}

/// `a, b: T` for a field or local declaration.
fn declared(tree: &SyntaxTree, id: NodeId) -> String {
    let names: Vec<String> = tree
        .variadic_children(id)
        .filter_map(|d| match tree.kind(d) {
            NodeKind::Declarator { name, .. } => Some(name.to_string()),
            _ => None,
        })
        .collect();
    match slot_text(tree, id, 0) {
        Some(ty) => format!("{}: {ty}", names.join(", ")),
        None => names.join(", "),
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::NodeKind;
    use crate::source_analysis::parse;
    use crate::unparse::{RenderMode, render};

    const SOURCE: &str = r"
using static System.Math;
using M = System.Math;

namespace Geometry
{
    public struct Vector<T> : IEquatable<Vector<T>>
    {
        public double X, Y;
        public Vector(double x, double y) { X = x; Y = y; }
        public double Length => Sqrt(X * X + Y * Y);
        public Vector<T> Scale(double factor) { return new Vector<T>(X * factor, Y * factor); }
        public static Vector<T> operator +(Vector<T> a, Vector<T> b) => new Vector<T>(a.X + b.X, a.Y + b.Y);
        void Move(ref double dx) { int steps = 0; }
    }

    enum Color { Red, Green }
}
";

    fn descriptions() -> Vec<String> {
        let result = parse(SOURCE);
        let tree = &result.tree;
        let root = result.root().unwrap();
        tree.preorder(root)
            .filter(|&id| {
                !matches!(
                    tree.kind(id),
                    NodeKind::Name(_) | NodeKind::Literal { .. } | NodeKind::Binary { .. }
                )
            })
            .map(|id| render(tree, id, &RenderMode::Description))
            .collect()
    }

    #[test]
    fn declarations_are_summarized() {
        let all = descriptions();
        for expected in [
            "using static System.Math",
            "using M = System.Math",
            "namespace Geometry",
            "struct Geometry.Vector<T> : IEquatable<Vector<T>>",
            "field X, Y: double",
            "field X: double",
            "constructor Vector(double, double)",
            "property Length -> double",
            "method Scale(double) -> Vector<T>",
            "operator +(Vector<T>, Vector<T>) -> Vector<T>",
            "method Move(ref double) -> void",
            "parameter dx: ref double",
            "local steps: int",
            "enum Geometry.Color",
            "enum member Green",
        ] {
            assert!(all.iter().any(|d| d == expected), "missing {expected:?} in {all:#?}");
        }
    }

    #[test]
    fn statements_show_a_short_excerpt() {
        let result = parse("class A { void F() { if (ready) { Start(); Stop(); } } }");
        let tree = &result.tree;
        let root = result.root().unwrap();
        let statement = tree
            .preorder(root)
            .find(|&id| matches!(tree.kind(id), NodeKind::If))
            .unwrap();
        assert_eq!(
            render(tree, statement, &RenderMode::Description),
            "if statement: if (ready) { Start(); Stop(); }"
        );
    }

    #[test]
    fn long_excerpts_are_cut() {
        let long = format!("class A {{ int x = {}; }}", vec!["1"; 40].join(" + "));
        let result = parse(&long);
        let tree = &result.tree;
        let root = result.root().unwrap();
        let literal = tree
            .preorder(root)
            .find(|&id| matches!(tree.kind(id), NodeKind::Binary { .. }))
            .unwrap();
        let text = render(tree, literal, &RenderMode::Description);
        assert!(text.starts_with("binary operator: 1 + 1"));
        assert!(text.ends_with("..."));
    }
}
