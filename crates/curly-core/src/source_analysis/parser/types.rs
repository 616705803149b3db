// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Type syntax: predefined type keywords and the generic argument, array
//! rank and nullable suffixes.
//!
//! Suffixes extend the `Name` node they follow instead of wrapping it, so
//! `List<int>[]` is a single `Name` with arity 1 and rank 1 whose children
//! are its type arguments. They bind tighter than every operator they
//! share a token with (`<`, `[`, `?`), and each one checks the tokens
//! ahead before claiming its operand.

use super::{ParseContext, ParseFlags, ParsePoint, ParseRegistry, Parser, TokenPattern};
use crate::ast::{Associativity, NameRef, NodeId, NodeKind};
use crate::source_analysis::TokenKind;

/// Binding precedence of type suffixes.
const TYPE_SUFFIX: u16 = 50;

/// How far ahead the generic argument check looks for the closing `>`.
const MAX_TYPE_ARGUMENT_LOOKAHEAD: usize = 64;

/// Predefined type keywords.
pub const TYPE_KEYWORDS: &[&str] = &[
    "bool", "byte", "char", "decimal", "double", "float", "int", "long", "object", "sbyte",
    "short", "string", "uint", "ulong", "ushort", "void",
];

pub(super) fn register(registry: &mut ParseRegistry) {
    for keyword in TYPE_KEYWORDS {
        registry.add(
            ParsePoint::new(
                ParseContext::Prefix,
                TokenPattern::text(keyword),
                parse_keyword_type,
            )
            .type_syntax(),
        );
    }
    for (text, factory) in [
        ("<", parse_type_arguments as super::Factory),
        ("[", parse_rank),
        ("?", parse_nullable),
    ] {
        registry.add(
            ParsePoint::new(ParseContext::Infix, TokenPattern::text(text), factory)
                .priority(10)
                .binding(TYPE_SUFFIX, Associativity::Left)
                .type_syntax(),
        );
    }
}

fn parse_keyword_type(p: &mut Parser<'_>, _: Option<NodeId>, _: ParseFlags) -> Option<NodeId> {
    p.start_node(0);
    let token = p.advance();
    Some(p.finish_node(NodeKind::Name(NameRef::keyword(token.text()))))
}

fn suffixable<'p>(p: &'p Parser<'_>) -> Option<&'p NameRef> {
    p.peek_unused().and_then(|id| p.tree().kind(id).as_name())
}

/// `<T, U>` after a name.
fn parse_type_arguments(
    p: &mut Parser<'_>,
    _: Option<NodeId>,
    flags: ParseFlags,
) -> Option<NodeId> {
    let name = suffixable(p)?;
    if name.arity > 0 || name.rank > 0 || name.nullable || name.keyword {
        return None;
    }
    if !looks_like_type_arguments(p, flags) {
        return None;
    }
    p.start_node(0);
    p.advance();
    loop {
        let argument = p.parse_type()?;
        p.push_child(argument);
        if !p.eat(",") {
            break;
        }
    }
    if !p.eat(">") {
        return None;
    }
    let target = p.take_unused()?;
    Some(p.finish_extension(target, |kind, added| {
        if let NodeKind::Name(name) = kind {
            name.arity = added;
        }
    }))
}

/// Decides whether the `<` at the current token opens a type argument list
/// rather than a comparison: the tokens up to the matching `>` must all be
/// type syntax and, outside type-only parsing, the token after it must be
/// one that can follow a generic name in an expression.
fn looks_like_type_arguments(p: &Parser<'_>, flags: ParseFlags) -> bool {
    let mut depth = 0usize;
    for n in 0..MAX_TYPE_ARGUMENT_LOOKAHEAD {
        let token = p.peek_token(n);
        match token.kind() {
            TokenKind::Operator(op) => match op.as_str() {
                "<" => depth += 1,
                ">" => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        let next = p.peek_token(n + 1).kind();
                        return flags.type_only
                            || can_follow_type_arguments(next)
                            || (flags.may_declare && next.is_identifier());
                    }
                }
                "." | "::" | "?" => {}
                _ => return false,
            },
            TokenKind::Identifier(_) | TokenKind::Comma => {}
            TokenKind::LeftBracket | TokenKind::RightBracket => {}
            TokenKind::Keyword(k) if TYPE_KEYWORDS.contains(&k.as_str()) => {}
            _ => return false,
        }
    }
    false
}

/// Tokens that may follow `>` when the `<` opened type arguments in an
/// expression. An identifier only follows at the start of a statement,
/// where it names a local: `f(a < b, c > d)` is two comparisons.
fn can_follow_type_arguments(kind: &TokenKind) -> bool {
    match kind {
        TokenKind::LeftParen
        | TokenKind::RightParen
        | TokenKind::RightBracket
        | TokenKind::RightBrace
        | TokenKind::LeftBracket
        | TokenKind::Semicolon
        | TokenKind::Comma
        | TokenKind::Eof => true,
        TokenKind::Operator(op) => matches!(
            op.as_str(),
            ":" | "." | "?" | "?." | "==" | "!=" | "|" | "^" | "&&" | "||" | "&" | ">"
        ),
        _ => false,
    }
}

/// `[]` or `[,]` after a type name.
fn parse_rank(p: &mut Parser<'_>, _: Option<NodeId>, _: ParseFlags) -> Option<NodeId> {
    suffixable(p)?;
    let mut n = 1;
    while p.peek_is(n, ",") {
        n += 1;
    }
    if !p.peek_is(n, "]") {
        return None;
    }
    p.start_node(0);
    for _ in 0..=n {
        p.advance();
    }
    let target = p.take_unused()?;
    Some(p.finish_extension(target, |kind, _| {
        if let NodeKind::Name(name) = kind {
            name.rank = name.rank.saturating_add(1);
        }
    }))
}

/// `?` after a type name. In an expression it is only a suffix when what
/// follows reads as a declaration (`T? x = ...`) or closes a type list.
/// After `is` or `as` it is a suffix unless an operand follows, as in
/// `x is int ? 1 : 2`.
fn parse_nullable(p: &mut Parser<'_>, _: Option<NodeId>, flags: ParseFlags) -> Option<NodeId> {
    let name = suffixable(p)?;
    if name.nullable {
        return None;
    }
    if flags.type_operand {
        if starts_operand(p.peek_token(1).kind()) {
            return None;
        }
    } else if !flags.type_only {
        let next = p.peek_token(1);
        let declares = next.kind().is_identifier()
            && matches!(p.peek_token(2).text(), "=" | ";" | "," | ")" | "in");
        let closes = matches!(
            next.kind(),
            TokenKind::Comma | TokenKind::RightParen | TokenKind::LeftBracket
        ) || next.kind().is_operator(">");
        if !declares && !closes {
            return None;
        }
    }
    p.start_node(0);
    p.advance();
    let target = p.take_unused()?;
    Some(p.finish_extension(target, |kind, _| {
        if let NodeKind::Name(name) = kind {
            name.nullable = true;
        }
    }))
}

fn starts_operand(kind: &TokenKind) -> bool {
    match kind {
        TokenKind::Identifier(_)
        | TokenKind::Keyword(_)
        | TokenKind::Integer(_)
        | TokenKind::Float(_)
        | TokenKind::String(_)
        | TokenKind::Character(_)
        | TokenKind::LeftParen => true,
        TokenKind::Operator(op) => matches!(op.as_str(), "!" | "~" | "-" | "+" | "++" | "--"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{BinaryOperator, NodeKind};
    use crate::source_analysis::{parse_expression, parse_statement};
    use crate::unparse::{FormatOptions, RenderMode, render_tree};

    fn canonical(source: &str) -> String {
        let result = parse_expression(source);
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
        render_tree(&result.tree, &RenderMode::Canonical(FormatOptions::default()))
    }

    #[test]
    fn generic_name_in_expression() {
        let result = parse_expression("List<int>.Empty");
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
        let tree = &result.tree;
        let root = result.root().unwrap();
        assert_eq!(tree.kind(root).binary_op(), Some(BinaryOperator::MemberAccess));
        let list = tree.child(root, 0).unwrap();
        let name = tree.kind(list).as_name().unwrap();
        assert_eq!((name.name.as_str(), name.arity), ("List", 1));
        assert_eq!(tree.variadic_children(list).count(), 1);
    }

    #[test]
    fn less_than_stays_a_comparison() {
        let result = parse_expression("a < b && c > d");
        let root = result.root().unwrap();
        assert_eq!(result.tree.kind(root).binary_op(), Some(BinaryOperator::LogicalAnd));
        let left = result.tree.child(root, 0).unwrap();
        assert_eq!(result.tree.kind(left).binary_op(), Some(BinaryOperator::LessThan));
    }

    #[test]
    fn nested_generics_close_with_two_tokens() {
        let result = parse_statement("Dictionary<string, List<int>> map = null;");
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
        let tree = &result.tree;
        let decl = result.root().unwrap();
        assert!(matches!(tree.kind(decl), NodeKind::LocalDecl { .. }));
        let ty = tree.child(decl, 0).unwrap();
        assert_eq!(tree.kind(ty).as_name().unwrap().arity, 2);
    }

    #[test]
    fn array_and_nullable_suffixes() {
        let result = parse_statement("int?[] values;");
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
        let tree = &result.tree;
        let ty = tree.child(result.root().unwrap(), 0).unwrap();
        let name = tree.kind(ty).as_name().unwrap();
        assert!(name.nullable && name.keyword);
        assert_eq!(name.rank, 1);
    }

    #[test]
    fn question_mark_is_conditional_in_expressions() {
        let result = parse_expression("a ? b : c");
        assert!(matches!(
            result.tree.kind(result.root().unwrap()),
            NodeKind::Conditional
        ));
    }

    #[test]
    fn comparisons_in_arguments_are_not_type_arguments() {
        let result = parse_expression("f(a < b, c > d)");
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
        let tree = &result.tree;
        let call = result.root().unwrap();
        let ops: Vec<_> = tree
            .variadic_children(call)
            .map(|arg| tree.kind(arg).binary_op())
            .collect();
        assert_eq!(
            ops,
            [Some(BinaryOperator::LessThan), Some(BinaryOperator::GreaterThan)]
        );
        assert_eq!(canonical("f(a < b, c > d)"), "f(a < b, c > d)");
    }

    #[test]
    fn generic_local_declaration_still_parses() {
        let result = parse_statement("List<int> xs = null;");
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
        let root = result.root().unwrap();
        assert!(matches!(result.tree.kind(root), NodeKind::LocalDecl { .. }));
    }

    #[test]
    fn conditional_after_type_test() {
        let result = parse_expression("x is int ? 1 : 2");
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
        let tree = &result.tree;
        let root = result.root().unwrap();
        assert!(matches!(tree.kind(root), NodeKind::Conditional));
        let test = tree.child(root, 0).unwrap();
        assert_eq!(tree.kind(test).binary_op(), Some(BinaryOperator::Is));
        let ty = tree.child(test, 1).unwrap();
        assert!(!tree.kind(ty).as_name().unwrap().nullable);
        assert_eq!(canonical("x is int ? 1 : 2"), "x is int ? 1 : 2");
    }

    #[test]
    fn nullable_type_after_as() {
        let result = parse_expression("x as int? ?? 0");
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
        let tree = &result.tree;
        let root = result.root().unwrap();
        assert_eq!(tree.kind(root).binary_op(), Some(BinaryOperator::NullCoalescing));
        let cast = tree.child(root, 0).unwrap();
        let ty = tree.child(cast, 1).unwrap();
        assert!(tree.kind(ty).as_name().unwrap().nullable);
    }
}
