// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Declaration factories: using directives, namespaces, type declarations
//! and their members.
//!
//! Member parsing depends on the enclosing container. Inside a type the
//! constructor check compares against the type's name and enum bodies hold
//! enum members; at namespace level, input that is not a declaration falls
//! through to a top-level statement.

use ecow::EcoString;

use super::statements::{block, declarators, skip_statement};
use super::{Container, ParseContext, ParseFlags, ParseRegistry, Parser, TokenPattern};
use crate::ast::{
    AccessorKind, MODIFIER_WORDS, MethodDecl, Modifiers, NodeId, NodeKind, TypeDecl, TypeKind,
    operators,
};
use crate::source_analysis::{Diagnostic, TokenKind};

pub(super) fn register(registry: &mut ParseRegistry) {
    use ParseContext::Member;

    registry.register(Member, TokenPattern::text("using"), 0, parse_using);
    registry.register(Member, TokenPattern::text("global"), 0, parse_using);
    registry.register(Member, TokenPattern::text("namespace"), 0, parse_namespace);
    registry.register(Member, TokenPattern::Any, 0, parse_member);
    registry.register(Member, TokenPattern::Any, -100, parse_top_level_statement);
}

/// `using A.B;`, `using static A.B;`, `using X = A.B;`, `global using ...;`
fn parse_using(p: &mut Parser<'_>, _: Option<NodeId>, _: ParseFlags) -> Option<NodeId> {
    if p.at("global") && !p.peek_is(1, "using") {
        return None;
    }
    p.start_node(1);
    p.eat("global");
    p.advance();
    let is_static = p.eat("static");
    let alias = if p.current_kind().is_identifier() && p.peek_is(1, "=") {
        let alias = p.advance().text().into();
        p.advance();
        Some(alias)
    } else {
        None
    };
    let target = p.parse_type();
    p.attach(0, target);
    p.expect(";");
    Some(p.finish_node(NodeKind::Using { alias, is_static }))
}

/// `namespace A.B { ... }` or file-scoped `namespace A.B;`.
fn parse_namespace(p: &mut Parser<'_>, _: Option<NodeId>, _: ParseFlags) -> Option<NodeId> {
    p.start_node(1);
    p.advance();
    let name = p.parse_type();
    p.attach(0, name);
    p.push_container(Container::Namespace);
    let file_scoped = p.eat(";");
    if file_scoped {
        p.parse_items(ParseContext::Member, false);
    } else {
        p.expect("{");
        p.parse_items(ParseContext::Member, true);
        p.expect("}");
        p.eat(";");
    }
    p.pop_container();
    Some(p.finish_node(NodeKind::Namespace { file_scoped }))
}

/// Statements directly in a namespace or compilation unit.
fn parse_top_level_statement(
    p: &mut Parser<'_>,
    _: Option<NodeId>,
    _: ParseFlags,
) -> Option<NodeId> {
    match p.enclosing_container() {
        Some(Container::Type { .. }) => None,
        _ => p.parse_statement(),
    }
}

// ============================================================================
// Members
// ============================================================================

/// Consumes `[...]` attribute sections as raw tokens.
fn skip_attributes(p: &mut Parser<'_>) -> bool {
    let mut any = false;
    while p.at("[") {
        any = true;
        p.advance();
        p.skip_balanced(|t| matches!(t.kind(), TokenKind::RightBracket));
        p.expect("]");
    }
    any
}

fn modifiers(p: &mut Parser<'_>) -> Modifiers {
    let mut found = Vec::new();
    while MODIFIER_WORDS.contains(&p.current_token().text())
        && !matches!(
            p.peek_token(1).kind(),
            TokenKind::LeftParen | TokenKind::Semicolon | TokenKind::Comma
        )
        && !p.peek_is(1, "=")
        && !p.peek_is(1, ".")
    {
        found.push(EcoString::from(p.advance().text()));
    }
    Modifiers(found)
}

fn type_keyword(p: &Parser<'_>) -> Option<TypeKind> {
    let token = p.current_token();
    match token.kind() {
        TokenKind::Keyword(k) => TypeKind::from_keyword(k),
        TokenKind::Identifier(word) if word.as_str() == "record" => {
            let next = p.peek_token(1);
            (next.kind().is_identifier() || next.text() == "class" || next.text() == "struct")
                .then_some(TypeKind::Record)
        }
        _ => None,
    }
}

fn parse_member(p: &mut Parser<'_>, _: Option<NodeId>, _: ParseFlags) -> Option<NodeId> {
    let container = p.enclosing_container().cloned();
    let start = p.position();
    p.start_node(0);
    skip_attributes(p);
    let modifiers = modifiers(p);
    if let Some(kind) = type_keyword(p) {
        return Some(type_declaration(p, kind, modifiers));
    }
    let Some(Container::Type { name, kind }) = container else {
        // `new Foo();` is a statement even though `new` is also a modifier.
        if !p.at("delegate") {
            return None;
        }
        return Some(unsupported_member(p, "delegate"));
    };
    if kind == TypeKind::Enum {
        return enum_member(p);
    }
    if matches!(
        p.current_token().text(),
        "~" | "event" | "delegate" | "implicit" | "explicit"
    ) {
        let what = p.current_token().text().to_owned();
        return Some(unsupported_member(p, &what));
    }
    if p.current_token().text() == name.as_str() && p.peek_is(1, "(") {
        return Some(method(p, modifiers, true));
    }
    let Some(ty) = p.parse_type() else {
        if p.position() == start {
            return None;
        }
        return Some(unsupported_member(p, "member"));
    };
    p.attach(0, Some(ty));
    if p.at("operator") {
        return Some(operator_declaration(p, modifiers));
    }
    if p.at("this") {
        return Some(unsupported_member(p, "indexer"));
    }
    if !p.current_kind().is_identifier() {
        return Some(malformed_member(p));
    }
    if p.peek_is(1, "(") || p.peek_is(1, "<") {
        Some(method(p, modifiers, false))
    } else if p.peek_is(1, "{") || p.peek_is(1, "=>") {
        Some(property(p, modifiers))
    } else if p.peek_is(1, ".") {
        Some(unsupported_member(p, "explicit interface member"))
    } else {
        p.reserve_slots(1);
        declarators(p);
        p.expect(";");
        Some(p.finish_node(NodeKind::Field { modifiers }))
    }
}

/// Keeps a declaration form the grammar does not model as raw tokens.
fn unsupported_member(p: &mut Parser<'_>, what: &str) -> NodeId {
    let span = p.current_token().span();
    p.report(
        Diagnostic::warning(format!("{what} kept as unparsed tokens"), span)
            .with_hint("only classes, structs, interfaces, enums, records and their fields, methods, constructors, operators and properties are modelled"),
    );
    skip_statement(p);
    p.finish_node(NodeKind::Unrecognized)
}

/// A type followed by something that cannot start a member name.
fn malformed_member(p: &mut Parser<'_>) -> NodeId {
    let found = p.current_kind().to_string();
    p.error(format!("expected member name, found {found}"));
    skip_statement(p);
    p.finish_node(NodeKind::Unrecognized)
}

fn type_declaration(p: &mut Parser<'_>, kind: TypeKind, modifiers: Modifiers) -> NodeId {
    p.advance();
    if kind == TypeKind::Record && (p.at("class") || p.at("struct")) {
        p.advance();
    }
    let name = p.expect_identifier("type name").unwrap_or_default();
    let type_params = type_parameters(p);
    if kind == TypeKind::Record && p.at("(") {
        // Positional record parameters stay as tokens.
        p.advance();
        p.skip_balanced(|_| false);
        p.expect(")");
    }
    let mut base_count = 0;
    if p.eat(":") {
        loop {
            let Some(base) = p.parse_type() else {
                break;
            };
            p.push_child(base);
            base_count += 1;
            if !p.eat(",") {
                break;
            }
        }
    }
    if p.at("where") {
        p.skip_balanced(|t| matches!(t.kind(), TokenKind::LeftBrace | TokenKind::Semicolon));
    }
    if !p.eat(";") {
        p.expect("{");
        p.push_container(Container::Type {
            name: name.clone(),
            kind,
        });
        p.parse_items(ParseContext::Member, true);
        p.pop_container();
        p.expect("}");
        p.eat(";");
    }
    p.finish_node(NodeKind::TypeDecl(TypeDecl {
        kind,
        name,
        modifiers,
        type_params,
        base_count,
        symbol: None,
    }))
}

/// `<T, in U, out V>` on a declaration.
fn type_parameters(p: &mut Parser<'_>) -> Vec<EcoString> {
    let mut params = Vec::new();
    if !p.eat("<") {
        return params;
    }
    loop {
        skip_attributes(p);
        if p.at("in") || p.at("out") {
            p.advance();
        }
        match p.expect_identifier("type parameter") {
            Some(param) => params.push(param),
            None => break,
        }
        if !p.eat(",") {
            break;
        }
    }
    p.expect(">");
    params
}

fn enum_member(p: &mut Parser<'_>) -> Option<NodeId> {
    if !p.current_kind().is_identifier() {
        return None;
    }
    p.reserve_slots(1);
    let name = p.advance().text().into();
    if p.eat("=") {
        let value = p.parse_expression(operators::LOOSEST);
        p.attach(0, value);
    }
    if !p.at("}") {
        p.expect(",");
    }
    Some(p.finish_node(NodeKind::EnumMember { name, symbol: None }))
}

/// Method or constructor; the return type, if any, is already attached.
fn method(p: &mut Parser<'_>, modifiers: Modifiers, is_constructor: bool) -> NodeId {
    p.reserve_slots(2);
    let name = p.advance().text().into();
    let type_params = type_parameters(p);
    parameters(p);
    if p.at(":") || p.at("where") {
        // Constructor initializers and constraints stay as tokens.
        p.skip_balanced(|t| {
            matches!(t.kind(), TokenKind::LeftBrace | TokenKind::Semicolon) || t.text() == "=>"
        });
    }
    member_body(p);
    p.finish_node(NodeKind::Method(MethodDecl {
        name,
        modifiers,
        type_params,
        is_constructor,
        symbol: None,
    }))
}

/// `operator +(T a, T b)`; the return type is already attached.
fn operator_declaration(p: &mut Parser<'_>, modifiers: Modifiers) -> NodeId {
    p.reserve_slots(2);
    p.advance();
    let (symbol_text, width) = p.infix_text();
    for _ in 0..width {
        p.advance();
    }
    parameters(p);
    member_body(p);
    p.finish_node(NodeKind::OperatorDecl {
        symbol_text,
        modifiers,
        symbol: None,
    })
}

/// A block, `=> expr;` or `;` into slot 1 of the open node.
fn member_body(p: &mut Parser<'_>) {
    if p.at("{") {
        let body = block(p);
        p.attach(1, Some(body));
    } else if p.at("=>") {
        let body = expression_body(p);
        p.attach(1, Some(body));
    } else {
        p.expect(";");
    }
}

fn expression_body(p: &mut Parser<'_>) -> NodeId {
    p.start_node(1);
    p.advance();
    let expression = p.parse_expression(operators::LOOSEST);
    p.attach(0, expression);
    p.expect(";");
    p.finish_node(NodeKind::ExpressionBody)
}

fn parameters(p: &mut Parser<'_>) {
    if !p.expect("(") {
        return;
    }
    while !p.is_at_end() && !p.at(")") {
        let start = p.position();
        p.start_node(2);
        skip_attributes(p);
        let modifier = matches!(p.current_token().text(), "ref" | "out" | "in" | "params" | "this")
            .then(|| EcoString::from(p.advance().text()));
        let ty = p.parse_type();
        p.attach(0, ty);
        let name = p.expect_identifier("parameter name").unwrap_or_default();
        if p.eat("=") {
            let default = p.parse_expression(operators::LOOSEST);
            p.attach(1, default);
        }
        let parameter = p.finish_node(NodeKind::Parameter { name, modifier });
        p.push_child(parameter);
        if !p.eat(",") || p.position() == start {
            break;
        }
    }
    p.expect(")");
}

/// `T Name { get; set; } = init;` or `T Name => expr;`; the type is
/// already attached.
fn property(p: &mut Parser<'_>, modifiers: Modifiers) -> NodeId {
    p.reserve_slots(2);
    let name = p.advance().text().into();
    if p.at("=>") {
        p.start_node(1);
        let body = expression_body(p);
        p.attach(0, Some(body));
        let getter = p.finish_node(NodeKind::Accessor {
            kind: AccessorKind::Get,
            modifiers: Modifiers::default(),
        });
        p.push_child(getter);
        return p.finish_node(NodeKind::Property {
            name,
            modifiers,
            symbol: None,
        });
    }
    p.expect("{");
    while !p.is_at_end() && !p.at("}") {
        let Some(accessor) = accessor(p) else {
            break;
        };
        p.push_child(accessor);
    }
    p.expect("}");
    if p.eat("=") {
        let init = p.parse_expression(operators::LOOSEST);
        p.attach(1, init);
        p.expect(";");
    }
    p.finish_node(NodeKind::Property {
        name,
        modifiers,
        symbol: None,
    })
}

fn accessor(p: &mut Parser<'_>) -> Option<NodeId> {
    let start = p.position();
    p.start_node(1);
    skip_attributes(p);
    let modifiers = modifiers(p);
    let Some(kind) = AccessorKind::from_word(p.current_token().text()) else {
        let found = p.current_kind().to_string();
        p.error(format!("expected `get`, `set` or `init`, found {found}"));
        if p.position() == start {
            p.advance();
        }
        return Some(p.finish_node(NodeKind::Unrecognized));
    };
    p.advance();
    if p.at("{") {
        let body = block(p);
        p.attach(0, Some(body));
    } else if p.at("=>") {
        let body = expression_body(p);
        p.attach(0, Some(body));
    } else {
        p.expect(";");
    }
    Some(p.finish_node(NodeKind::Accessor { kind, modifiers }))
}

#[cfg(test)]
mod tests {
    use crate::ast::{NodeKind, TypeKind};
    use crate::source_analysis::parse;

    fn kinds_of_members(source: &str) -> Vec<&'static str> {
        let result = parse(source);
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
        let tree = &result.tree;
        let root = result.root().unwrap();
        let ty = tree
            .preorder(root)
            .find(|&id| matches!(tree.kind(id), NodeKind::TypeDecl(_)))
            .unwrap();
        tree.variadic_children(ty).map(|m| tree.kind(m).label()).collect()
    }

    #[test]
    fn class_members() {
        let members = kinds_of_members(
            "class Point : IEquatable<Point> {
                private int x, y;
                public Point(int x, int y) { this.x = x; }
                public int X { get => x; private set { x = value; } }
                public int Length => x + y;
                public static Point operator +(Point a, Point b) => a;
                public override string ToString() { return \"\"; }
            }",
        );
        assert_eq!(
            members,
            [
                "name",
                "field",
                "constructor",
                "property",
                "property",
                "operator",
                "method"
            ]
        );
    }

    #[test]
    fn constructor_is_recognized_by_name() {
        let result = parse("class Box { Box() { } void Box2() { } }");
        let tree = &result.tree;
        let ctors: Vec<bool> = tree
            .preorder(result.root().unwrap())
            .filter_map(|id| match tree.kind(id) {
                NodeKind::Method(m) => Some(m.is_constructor),
                _ => None,
            })
            .collect();
        assert_eq!(ctors, [true, false]);
    }

    #[test]
    fn namespaces_and_usings() {
        let result = parse(
            "using System;\nusing static System.Math;\nusing Col = System.Collections;\nnamespace A.B { enum Color { Red, Green = 2 } }",
        );
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
        let tree = &result.tree;
        let root = result.root().unwrap();
        let labels: Vec<_> = tree.variadic_children(root).map(|c| tree.kind(c).label()).collect();
        assert_eq!(labels, ["using directive", "using directive", "using directive", "namespace"]);
        let color = tree
            .preorder(root)
            .find_map(|id| match tree.kind(id) {
                NodeKind::TypeDecl(decl) => Some(decl.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(color.kind, TypeKind::Enum);
        assert_eq!(color.name, "Color");
    }

    #[test]
    fn file_scoped_namespace_takes_the_rest_of_the_file() {
        let result = parse("namespace App;\nclass A { }\nclass B { }");
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
        let tree = &result.tree;
        let ns = tree.variadic_children(result.root().unwrap()).next().unwrap();
        assert_eq!(tree.kind(ns), &NodeKind::Namespace { file_scoped: true });
        assert_eq!(tree.variadic_children(ns).count(), 2);
    }

    #[test]
    fn top_level_statements() {
        let result = parse("var x = 1;\nConsole.WriteLine(x);");
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
        let tree = &result.tree;
        let labels: Vec<_> = tree
            .variadic_children(result.root().unwrap())
            .map(|c| tree.kind(c).label())
            .collect();
        assert_eq!(labels, ["local declaration", "expression statement"]);
    }

    #[test]
    fn member_without_a_name_is_an_error() {
        let result = parse("class App { int = ; void F() { } }");
        let errors: Vec<_> = result.diagnostics.iter().filter(|d| d.is_error()).collect();
        assert_eq!(errors.len(), 1, "{:?}", result.diagnostics);
        assert!(errors[0].message.contains("expected member name"));
        let tree = &result.tree;
        let root = result.root().unwrap();
        assert!(
            tree.preorder(root)
                .any(|id| matches!(tree.kind(id), NodeKind::Method(_)))
        );
    }

    #[test]
    fn indexers_are_kept_with_a_warning() {
        let result = parse("class Grid { int this[int i] { get { return i; } } }");
        assert_eq!(result.diagnostics.len(), 1);
        assert!(!result.diagnostics[0].is_error());
    }
}
