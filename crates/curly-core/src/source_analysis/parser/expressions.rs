// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Expression factories.
//!
//! Operands are built by `Prefix` entries and wait on the parser's unused
//! stack; `Infix` entries claim them. Binary operators read their
//! precedence from the operator table, so adding an operator there is
//! enough for it to parse.

use cranelift_entity::EntityRef;

use super::{ParseContext, ParseFlags, ParsePoint, ParseRegistry, Parser, TokenPattern};
use crate::ast::{
    Associativity, BinaryOperator, LiteralKind, NameRef, NodeId, NodeKind, Piece, SyntaxTree,
    UnaryOperator, operators,
};
use crate::source_analysis::{TokenKind, Trivia};

pub(super) fn register(registry: &mut ParseRegistry) {
    use ParseContext::Prefix;

    registry.register(Prefix, TokenPattern::Literal, 0, parse_literal);
    registry.add(
        ParsePoint::new(Prefix, TokenPattern::Identifier, parse_name).type_syntax(),
    );
    registry.register(Prefix, TokenPattern::text("this"), 0, parse_this_or_base);
    registry.register(Prefix, TokenPattern::text("base"), 0, parse_this_or_base);
    registry.register(Prefix, TokenPattern::text("("), 10, parse_cast);
    registry.register(Prefix, TokenPattern::text("("), 0, parse_parenthesized);
    for symbol in ["+", "-", "!", "~", "++", "--"] {
        registry.register(Prefix, TokenPattern::text(symbol), 0, parse_prefix_operator);
    }
    registry.register(Prefix, TokenPattern::text("new"), 0, parse_new);
    registry.register(Prefix, TokenPattern::text("typeof"), 0, parse_typeof);
    registry.register(Prefix, TokenPattern::text("{"), 0, parse_initializer);
    registry.register(Prefix, TokenPattern::Any, i32::MIN, parse_unrecognized_operand);

    for op in BinaryOperator::ALL {
        let point = ParsePoint::new(
            ParseContext::Infix,
            TokenPattern::text(op.symbol()),
            parse_binary,
        )
        .binding(op.precedence(), op.associativity());
        let point = if matches!(
            op,
            BinaryOperator::MemberAccess | BinaryOperator::AliasQualifier
        ) {
            point.type_syntax()
        } else {
            point
        };
        registry.add(point);
    }
    for symbol in ["++", "--"] {
        registry.register_infix(symbol, 0, operators::PRIMARY, Associativity::Left, parse_postfix);
    }
    registry.register_infix("(", 0, operators::PRIMARY, Associativity::Left, parse_call);
    registry.register_infix("[", 0, operators::PRIMARY, Associativity::Left, parse_index);
    registry.register_infix(
        "?",
        0,
        operators::CONDITIONAL,
        Associativity::Right,
        parse_conditional,
    );
}

// ============================================================================
// Operands
// ============================================================================

fn parse_literal(p: &mut Parser<'_>, _: Option<NodeId>, _: ParseFlags) -> Option<NodeId> {
    let kind = match p.current_kind() {
        TokenKind::Integer(_) => LiteralKind::Integer,
        TokenKind::Float(_) => LiteralKind::Float,
        TokenKind::String(s) if s.starts_with('$') || s.starts_with("@$") => {
            LiteralKind::InterpolatedString
        }
        TokenKind::String(_) => LiteralKind::String,
        TokenKind::Character(_) => LiteralKind::Character,
        TokenKind::Keyword(k) if k == "null" => LiteralKind::Null,
        TokenKind::Keyword(_) => LiteralKind::Boolean,
        _ => return None,
    };
    p.start_node(0);
    let token = p.advance();
    Some(p.finish_node(NodeKind::Literal {
        kind,
        text: token.text().into(),
    }))
}

fn parse_name(p: &mut Parser<'_>, _: Option<NodeId>, _: ParseFlags) -> Option<NodeId> {
    p.start_node(0);
    let token = p.advance();
    Some(p.finish_node(NodeKind::Name(NameRef::new(token.text()))))
}

fn parse_this_or_base(p: &mut Parser<'_>, _: Option<NodeId>, _: ParseFlags) -> Option<NodeId> {
    p.start_node(0);
    let token = p.advance();
    let kind = if token.text() == "this" {
        NodeKind::This
    } else {
        NodeKind::Base
    };
    Some(p.finish_node(kind))
}

/// `(T)operand`, when the parenthesized tokens form a type and the next
/// token can start a cast operand. Otherwise the parenthesized-expression
/// entry gets its turn.
fn parse_cast(p: &mut Parser<'_>, _: Option<NodeId>, flags: ParseFlags) -> Option<NodeId> {
    p.start_node(2);
    p.advance();
    let ty = p.parse_type()?;
    if !p.at(")") {
        return None;
    }
    p.attach(0, Some(ty));
    p.advance();
    if !cast_operand_follows(p, ty) {
        return None;
    }
    let operand = p.parse_operand(operators::UNARY, Associativity::Right, flags);
    p.attach(1, operand);
    Some(p.finish_node(NodeKind::Cast))
}

fn cast_operand_follows(p: &Parser<'_>, ty: NodeId) -> bool {
    let definitely_type = match p.tree().kind(ty) {
        NodeKind::Name(name) => name.keyword || name.arity > 0 || name.rank > 0 || name.nullable,
        _ => false,
    };
    let next = p.current_token();
    match next.kind() {
        TokenKind::Identifier(_)
        | TokenKind::Integer(_)
        | TokenKind::Float(_)
        | TokenKind::String(_)
        | TokenKind::Character(_)
        | TokenKind::LeftParen => true,
        TokenKind::Keyword(k) => !matches!(k.as_str(), "is" | "as" | "in"),
        TokenKind::Operator(op) => match op.as_str() {
            "!" | "~" => true,
            "+" | "-" | "++" | "--" => definitely_type,
            _ => false,
        },
        _ => false,
    }
}

/// `( expr )`: the parentheses become part of the inner node's layout.
fn parse_parenthesized(p: &mut Parser<'_>, _: Option<NodeId>, _: ParseFlags) -> Option<NodeId> {
    p.start_node(1);
    p.advance();
    match p.parse_expression(operators::LOOSEST) {
        Some(inner) => {
            p.attach(0, Some(inner));
            p.expect(")");
            Some(p.finish_parenthesized(inner))
        }
        None => {
            p.eat(")");
            Some(p.finish_node(NodeKind::Unrecognized))
        }
    }
}

fn parse_prefix_operator(
    p: &mut Parser<'_>,
    _: Option<NodeId>,
    flags: ParseFlags,
) -> Option<NodeId> {
    let op = UnaryOperator::prefix(p.current_token().text())?;
    p.start_node(1);
    p.advance();
    let operand = p.parse_operand(operators::UNARY, Associativity::Right, flags);
    p.attach(0, operand);
    Some(p.finish_node(NodeKind::Unary { op, overload: None }))
}

/// `new T(args) { init }`, `new T[n]`, `new T[] { ... }`, `new[] { ... }`
/// and target-typed `new(args)`.
fn parse_new(p: &mut Parser<'_>, _: Option<NodeId>, _: ParseFlags) -> Option<NodeId> {
    p.start_node(2);
    p.advance();
    let mut array = false;
    if p.at("[") {
        array = true;
        p.advance();
        while p.eat(",") {}
        p.expect("]");
    } else if !p.at("(") {
        let ty = p.parse_type();
        if let Some(ty) = ty
            && p.tree().kind(ty).as_name().is_some_and(|n| n.rank > 0)
        {
            array = true;
        }
        p.attach(0, ty);
    }
    if p.at("[") {
        array = true;
        argument_list(p, "[", "]");
        while p.at("[") && (p.peek_is(1, "]") || p.peek_is(1, ",")) {
            p.advance();
            while p.eat(",") {}
            p.expect("]");
        }
    } else if p.at("(") {
        argument_list(p, "(", ")");
    }
    if p.at("{") {
        let init = parse_initializer(p, None, ParseFlags::default());
        p.attach(1, init);
    }
    Some(p.finish_node(NodeKind::New { array }))
}

fn parse_typeof(p: &mut Parser<'_>, _: Option<NodeId>, _: ParseFlags) -> Option<NodeId> {
    p.start_node(1);
    p.advance();
    p.expect("(");
    let ty = p.parse_type();
    p.attach(0, ty);
    p.expect(")");
    Some(p.finish_node(NodeKind::Typeof))
}

/// `{ a, b, { c } }` collection and object initializers.
pub(super) fn parse_initializer(
    p: &mut Parser<'_>,
    _: Option<NodeId>,
    _: ParseFlags,
) -> Option<NodeId> {
    p.start_node(0);
    p.advance();
    while !p.is_at_end() && !p.at("}") {
        let start = p.position();
        if let Some(element) = p.parse_expression(operators::LOOSEST) {
            p.push_child(element);
        }
        if !p.eat(",") || p.position() == start {
            break;
        }
    }
    p.expect("}");
    Some(p.finish_node(NodeKind::Initializer))
}

/// Last resort for operand position: keeps the token as an `Unrecognized`
/// node. Closing delimiters and separators are left for the caller.
fn parse_unrecognized_operand(
    p: &mut Parser<'_>,
    _: Option<NodeId>,
    _: ParseFlags,
) -> Option<NodeId> {
    let kind = p.current_kind();
    let closes = matches!(
        kind,
        TokenKind::RightParen
            | TokenKind::RightBracket
            | TokenKind::RightBrace
            | TokenKind::Semicolon
            | TokenKind::Comma
            | TokenKind::Eof
    ) || kind.is_operator(":");
    if closes {
        return None;
    }
    if !kind.is_error() {
        let found = kind.to_string();
        p.error(format!("expected expression, found {found}"));
    }
    p.start_node(0);
    p.advance();
    Some(p.finish_node(NodeKind::Unrecognized))
}

// ============================================================================
// Infix and postfix operators
// ============================================================================

fn parse_binary(p: &mut Parser<'_>, _: Option<NodeId>, flags: ParseFlags) -> Option<NodeId> {
    let (text, width) = p.infix_text();
    let op = BinaryOperator::from_symbol(&text)?;
    let left = p.take_unused()?;
    p.start_node(2);
    p.attach(0, Some(left));
    for _ in 0..width {
        p.advance();
    }
    let right = if op.takes_type_operand() {
        p.parse_type_operand()
    } else if op.is_member_access() {
        if p.current_kind().is_identifier() {
            p.parse_operand(operators::PRIMARY, Associativity::Left, flags)
        } else {
            let found = p.current_kind().to_string();
            p.error(format!("expected member name after `{op}`, found {found}"));
            None
        }
    } else if p.at(")") {
        p.error(format!("expected right operand of `{op}` before `)`"));
        None
    } else {
        p.parse_operand(op.precedence(), op.associativity(), flags)
    };
    p.attach(1, right);
    Some(p.finish_node(NodeKind::Binary { op, overload: None }))
}

fn parse_postfix(p: &mut Parser<'_>, _: Option<NodeId>, _: ParseFlags) -> Option<NodeId> {
    let op = UnaryOperator::postfix(p.current_token().text())?;
    let operand = p.take_unused()?;
    p.start_node(1);
    p.attach(0, Some(operand));
    p.advance();
    Some(p.finish_node(NodeKind::Unary { op, overload: None }))
}

fn parse_call(p: &mut Parser<'_>, _: Option<NodeId>, _: ParseFlags) -> Option<NodeId> {
    let callee = p.take_unused()?;
    p.start_node(1);
    p.attach(0, Some(callee));
    argument_list(p, "(", ")");
    Some(p.finish_node(NodeKind::Call))
}

fn parse_index(p: &mut Parser<'_>, _: Option<NodeId>, _: ParseFlags) -> Option<NodeId> {
    let target = p.take_unused()?;
    p.start_node(1);
    p.attach(0, Some(target));
    argument_list(p, "[", "]");
    Some(p.finish_node(NodeKind::Index))
}

/// Parses `open arg, arg close` into the open node. Argument modifiers
/// (`ref`, `out`, `in`) and names (`name:`) stay as layout tokens.
pub(super) fn argument_list(p: &mut Parser<'_>, open: &str, close: &str) {
    p.expect(open);
    while !p.is_at_end() && !p.at(close) {
        let start = p.position();
        while matches!(p.current_token().text(), "ref" | "out" | "in") {
            p.advance();
        }
        if p.current_kind().is_identifier() && p.peek_is(1, ":") {
            p.advance();
            p.advance();
        }
        if let Some(argument) = p.parse_expression(operators::LOOSEST) {
            p.push_child(argument);
        }
        if !p.eat(",") || p.position() == start {
            break;
        }
    }
    p.expect(close);
}

fn parse_conditional(p: &mut Parser<'_>, _: Option<NodeId>, flags: ParseFlags) -> Option<NodeId> {
    let condition = p.take_unused()?;
    p.start_node(3);
    p.attach(0, Some(condition));
    p.advance();
    let then = p.parse_expression(operators::LOOSEST);
    p.attach(1, then);
    p.expect(":");
    let otherwise = p.parse_operand(operators::CONDITIONAL, Associativity::Right, flags);
    p.attach(2, otherwise);
    Some(p.finish_node(NodeKind::Conditional))
}

// ============================================================================
// Comment normalization
// ============================================================================

/// Moves comments around binary operator tokens onto the operand they
/// belong to: a comment after the operator goes to the right operand's
/// first token; comments on their own lines before a line-leading operator
/// go to the end of the left operand.
pub(super) fn normalize_operator_comments(tree: &mut SyntaxTree) {
    let binaries: Vec<NodeId> = (0..tree.capacity())
        .map(NodeId::new)
        .filter(|&id| {
            tree.get(id)
                .is_some_and(|n| matches!(n.kind, NodeKind::Binary { .. }) && n.layout.is_some())
        })
        .collect();
    for id in binaries {
        move_operator_comments(tree, id);
    }
}

fn operator_piece_range(tree: &SyntaxTree, id: NodeId) -> Option<(usize, usize)> {
    let pieces = tree[id].layout.as_ref()?.pieces();
    let left = pieces.iter().position(|p| matches!(p, Piece::Child(0)))?;
    let mut last = left;
    while matches!(pieces.get(last + 1), Some(Piece::Token(_))) {
        last += 1;
    }
    (last > left).then_some((left + 1, last))
}

fn move_operator_comments(tree: &mut SyntaxTree, id: NodeId) {
    let Some((first, last)) = operator_piece_range(tree, id) else {
        return;
    };
    // Trailing comment after the operator moves to the right operand.
    if let Some(right) = tree.child(id, 1) {
        let moved = match tree[id].layout.as_mut().map(|l| &mut l.pieces_mut()[last]) {
            Some(Piece::Token(token)) if token.has_trailing_comment() => {
                std::mem::take(token.trailing_trivia_mut())
            }
            _ => Vec::new(),
        };
        if !moved.is_empty() {
            match tree.first_token_mut(right) {
                Some(token) => {
                    let leading = token.leading_trivia_mut();
                    let rest = std::mem::take(leading);
                    leading.extend(moved);
                    leading.extend(rest);
                }
                None => restore_trailing(tree, id, last, moved),
            }
        }
    }
    // Comments on lines before a line-leading operator move to the left.
    let Some(left) = tree.child(id, 0) else {
        return;
    };
    let moved = match tree[id].layout.as_mut().map(|l| &mut l.pieces_mut()[first]) {
        Some(Piece::Token(token)) if token.starts_line() && token.has_leading_comment() => {
            let leading = token.leading_trivia_mut();
            let cut = leading.iter().rposition(Trivia::is_comment).map_or(0, |i| i + 1);
            leading.drain(..cut).collect::<Vec<_>>()
        }
        _ => Vec::new(),
    };
    if moved.is_empty() {
        return;
    }
    if tree.last_token(left).is_some() {
        if let Some(token) = tree.last_token_mut(left) {
            token.trailing_trivia_mut().extend(moved);
        }
    } else if let Some(Piece::Token(token)) =
        tree[id].layout.as_mut().map(|l| &mut l.pieces_mut()[first])
    {
        let leading = token.leading_trivia_mut();
        let rest = std::mem::take(leading);
        leading.extend(moved);
        leading.extend(rest);
    }
}

fn restore_trailing(tree: &mut SyntaxTree, id: NodeId, index: usize, trivia: Vec<Trivia>) {
    if let Some(Piece::Token(token)) = tree[id].layout.as_mut().map(|l| &mut l.pieces_mut()[index])
    {
        *token.trailing_trivia_mut() = trivia;
    }
}
