// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Statement factories.
//!
//! Keyword statements are exact-text entries. Everything else reaches the
//! expression-or-declaration fallback: an expression that reads as a type
//! and is followed by an identifier starts a local declaration.

use super::{ParseContext, ParseFlags, ParseRegistry, Parser, TokenPattern};
use crate::ast::{Associativity, NodeId, NodeKind, operators};
use crate::source_analysis::Diagnostic;

/// Statement keywords the grammar keeps as raw tokens.
const UNSUPPORTED_STATEMENTS: &[&str] = &[
    "switch", "try", "lock", "using", "checked", "unchecked", "unsafe", "fixed", "goto",
    "case", "default", "catch", "finally", "else",
];

pub(super) fn register(registry: &mut ParseRegistry) {
    use ParseContext::Statement;

    let keywords: [(&str, super::Factory); 12] = [
        ("{", parse_block_statement),
        (";", parse_empty),
        ("if", parse_if),
        ("while", parse_while),
        ("do", parse_do),
        ("for", parse_for),
        ("foreach", parse_foreach),
        ("return", parse_return_or_throw),
        ("throw", parse_return_or_throw),
        ("break", parse_jump),
        ("continue", parse_jump),
        ("const", parse_const_local),
    ];
    for (text, factory) in keywords {
        registry.register(Statement, TokenPattern::text(text), 0, factory);
    }
    for keyword in UNSUPPORTED_STATEMENTS {
        registry.register(Statement, TokenPattern::text(keyword), -10, parse_unsupported);
    }
    registry.register(Statement, TokenPattern::Any, -100, parse_expression_or_declaration);
}

/// Parses `{ statements }` at the current `{`.
pub(super) fn block(p: &mut Parser<'_>) -> NodeId {
    p.start_node(0);
    p.expect("{");
    p.parse_items(ParseContext::Statement, true);
    p.expect("}");
    p.finish_node(NodeKind::Block)
}

fn parse_block_statement(p: &mut Parser<'_>, _: Option<NodeId>, _: ParseFlags) -> Option<NodeId> {
    Some(block(p))
}

fn parse_empty(p: &mut Parser<'_>, _: Option<NodeId>, _: ParseFlags) -> Option<NodeId> {
    p.start_node(0);
    p.advance();
    Some(p.finish_node(NodeKind::Empty))
}

/// An embedded statement, reporting when the input ends first.
fn embedded_statement(p: &mut Parser<'_>) -> Option<NodeId> {
    let statement = p.parse_statement();
    if statement.is_none() {
        let found = p.current_kind().to_string();
        p.error(format!("expected statement, found {found}"));
    }
    statement
}

fn parenthesized_condition(p: &mut Parser<'_>, slot: usize) {
    p.expect("(");
    let condition = p.parse_expression(operators::LOOSEST);
    p.attach(slot, condition);
    p.expect(")");
}

fn parse_if(p: &mut Parser<'_>, _: Option<NodeId>, _: ParseFlags) -> Option<NodeId> {
    p.start_node(3);
    p.advance();
    parenthesized_condition(p, 0);
    let then = embedded_statement(p);
    p.attach(1, then);
    if p.eat("else") {
        let otherwise = embedded_statement(p);
        p.attach(2, otherwise);
    }
    Some(p.finish_node(NodeKind::If))
}

fn parse_while(p: &mut Parser<'_>, _: Option<NodeId>, _: ParseFlags) -> Option<NodeId> {
    p.start_node(2);
    p.advance();
    parenthesized_condition(p, 0);
    let body = embedded_statement(p);
    p.attach(1, body);
    Some(p.finish_node(NodeKind::While))
}

fn parse_do(p: &mut Parser<'_>, _: Option<NodeId>, _: ParseFlags) -> Option<NodeId> {
    p.start_node(2);
    p.advance();
    let body = embedded_statement(p);
    p.attach(0, body);
    p.expect("while");
    parenthesized_condition(p, 1);
    p.expect(";");
    Some(p.finish_node(NodeKind::Do))
}

fn parse_for(p: &mut Parser<'_>, _: Option<NodeId>, _: ParseFlags) -> Option<NodeId> {
    p.start_node(3);
    p.advance();
    p.expect("(");
    if !p.at(";") {
        let init = declaration_or_expression(p);
        p.attach(0, init);
        if p.at(",") {
            p.error("only one `for` initializer expression is supported");
            p.skip_balanced(|t| t.text() == ";");
        }
    }
    p.expect(";");
    if !p.at(";") {
        let condition = p.parse_expression(operators::LOOSEST);
        p.attach(1, condition);
    }
    p.expect(";");
    while !p.is_at_end() && !p.at(")") {
        let start = p.position();
        if let Some(update) = p.parse_expression(operators::LOOSEST) {
            p.push_child(update);
        }
        if !p.eat(",") || p.position() == start {
            break;
        }
    }
    p.expect(")");
    let body = embedded_statement(p);
    p.attach(2, body);
    Some(p.finish_node(NodeKind::For))
}

fn parse_foreach(p: &mut Parser<'_>, _: Option<NodeId>, _: ParseFlags) -> Option<NodeId> {
    p.start_node(3);
    p.advance();
    p.expect("(");
    let ty = p.parse_type();
    p.attach(0, ty);
    let name = p.expect_identifier("loop variable name").unwrap_or_default();
    p.expect("in");
    let collection = p.parse_expression(operators::LOOSEST);
    p.attach(1, collection);
    p.expect(")");
    let body = embedded_statement(p);
    p.attach(2, body);
    Some(p.finish_node(NodeKind::Foreach { name }))
}

fn parse_return_or_throw(p: &mut Parser<'_>, _: Option<NodeId>, _: ParseFlags) -> Option<NodeId> {
    p.start_node(1);
    let keyword = p.advance();
    if !p.at(";") {
        let value = p.parse_expression(operators::LOOSEST);
        p.attach(0, value);
    }
    p.expect(";");
    let kind = if keyword.text() == "throw" {
        NodeKind::Throw
    } else {
        NodeKind::Return
    };
    Some(p.finish_node(kind))
}

fn parse_jump(p: &mut Parser<'_>, _: Option<NodeId>, _: ParseFlags) -> Option<NodeId> {
    p.start_node(0);
    let keyword = p.advance();
    p.expect(";");
    let kind = if keyword.text() == "break" {
        NodeKind::Break
    } else {
        NodeKind::Continue
    };
    Some(p.finish_node(kind))
}

fn parse_const_local(p: &mut Parser<'_>, _: Option<NodeId>, _: ParseFlags) -> Option<NodeId> {
    p.start_node(1);
    p.advance();
    let ty = p.parse_type();
    p.attach(0, ty);
    declarators(p);
    p.expect(";");
    Some(p.finish_node(NodeKind::LocalDecl { is_const: true }))
}

/// Keeps a statement form the grammar does not model as raw tokens: up to
/// and including the next `;`, or through the braces of its body.
fn parse_unsupported(p: &mut Parser<'_>, _: Option<NodeId>, _: ParseFlags) -> Option<NodeId> {
    let keyword = p.current_token().text().to_owned();
    let span = p.current_token().span();
    p.start_node(0);
    p.report(
        Diagnostic::warning(format!("`{keyword}` statements are kept as unparsed tokens"), span)
            .with_hint("only the statements of the supported subset are modelled"),
    );
    skip_statement(p);
    Some(p.finish_node(NodeKind::Unrecognized))
}

/// Consumes one statement's tokens: through a `;` or a closing `}` at
/// depth zero, whichever comes first.
pub(super) fn skip_statement(p: &mut Parser<'_>) {
    let mut depth = 0usize;
    while !p.is_at_end() {
        let text = p.current_token().text().to_owned();
        match text.as_str() {
            ";" if depth == 0 => {
                p.advance();
                return;
            }
            "{" | "(" | "[" => depth += 1,
            "}" | ")" | "]" => {
                if depth == 0 {
                    return;
                }
                depth -= 1;
                if depth == 0 && text == "}" {
                    p.advance();
                    // `try { } catch { }` and `else` continue the statement.
                    if !matches!(p.current_token().text(), "catch" | "finally" | "else") {
                        return;
                    }
                    continue;
                }
            }
            _ => {}
        }
        p.advance();
    }
}

// ============================================================================
// Declarations and expression statements
// ============================================================================

fn parse_expression_or_declaration(
    p: &mut Parser<'_>,
    _: Option<NodeId>,
    _: ParseFlags,
) -> Option<NodeId> {
    p.start_node(1);
    let expression =
        p.parse_operand(operators::LOOSEST, Associativity::Left, ParseFlags::STATEMENT)?;
    p.attach(0, Some(expression));
    let kind = if starts_declarators(p, expression) {
        declarators(p);
        NodeKind::LocalDecl { is_const: false }
    } else {
        check_assignment_target(p, expression);
        NodeKind::ExpressionStatement
    };
    p.expect(";");
    Some(p.finish_node(kind))
}

fn starts_declarators(p: &Parser<'_>, expression: NodeId) -> bool {
    p.current_kind().is_identifier() && p.tree().is_type_like(expression)
}

/// A predefined type such as `int` on the left of an assignment is a
/// declaration missing its variable name.
fn check_assignment_target(p: &mut Parser<'_>, expression: NodeId) {
    let tree = p.tree();
    if !tree
        .kind(expression)
        .binary_op()
        .is_some_and(|op| op.is_assignment())
    {
        return;
    }
    let Some(target) = tree.child(expression, 0) else {
        return;
    };
    if !tree.kind(target).as_name().is_some_and(|name| name.keyword) {
        return;
    }
    let Some(token) = tree.first_token(target) else {
        return;
    };
    let diagnostic = Diagnostic::error(
        format!("expected variable name after `{}`", token.text()),
        token.span(),
    );
    p.report(diagnostic);
}

/// A `for` initializer: a local declaration without its `;`, or an
/// expression.
fn declaration_or_expression(p: &mut Parser<'_>) -> Option<NodeId> {
    let expression =
        p.parse_operand(operators::LOOSEST, Associativity::Left, ParseFlags::STATEMENT)?;
    if !starts_declarators(p, expression) {
        check_assignment_target(p, expression);
        return Some(expression);
    }
    p.start_node(1);
    p.attach(0, Some(expression));
    declarators(p);
    Some(p.finish_node(NodeKind::LocalDecl { is_const: false }))
}

/// `name = init, name2` into the open declaration node.
pub(super) fn declarators(p: &mut Parser<'_>) {
    loop {
        if !p.current_kind().is_identifier() {
            let found = p.current_kind().to_string();
            p.error(format!("expected variable name, found {found}"));
            return;
        }
        p.start_node(1);
        let name = p.advance().text().into();
        if p.eat("=") {
            let init = p.parse_expression(operators::LOOSEST);
            p.attach(0, init);
        }
        let declarator = p.finish_node(NodeKind::Declarator { name, symbol: None });
        p.push_child(declarator);
        if !p.eat(",") {
            return;
        }
    }
}
