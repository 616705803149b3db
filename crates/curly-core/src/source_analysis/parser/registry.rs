// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The parse registry: which factory builds a node for a given token.
//!
//! A [`ParseRegistry`] is an explicit value built once and passed by
//! reference to every [`Parser`]. Each grammar area registers its entry
//! points through a plain function call (see [`ParseRegistry::standard`]),
//! and extensions add their own factories the same way:
//!
//! ```
//! use curly_core::ast::NodeKind;
//! use curly_core::source_analysis::{ParseContext, ParseRegistry, TokenPattern, parse_with};
//!
//! let mut registry = ParseRegistry::standard();
//! registry.register(ParseContext::Prefix, TokenPattern::text("answer"), 10, |p, _, _| {
//!     p.start_node(0);
//!     p.advance();
//!     Some(p.finish_node(NodeKind::Custom { tag: "answer".into() }))
//! });
//!
//! let result = parse_with("x = answer;", &registry);
//! assert!(result.diagnostics.is_empty());
//! ```
//!
//! # Dispatch order
//!
//! For the current token, entries whose pattern is the token's exact text
//! are tried first, then entries matching its class (identifier, keyword,
//! literal, any). Within each group higher priority comes first, then
//! registration order. A factory that returns `None` leaves the parser
//! exactly as it found it and the next candidate is tried.

use std::collections::HashMap;

use ecow::EcoString;

use super::Parser;
use crate::ast::{Associativity, NodeId};
use crate::source_analysis::TokenKind;

/// Where in the grammar a factory applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseContext {
    /// Namespace and type bodies.
    Member,
    /// Statement position inside blocks.
    Statement,
    /// The start of an operand.
    Prefix,
    /// After a complete operand; infix and postfix operators.
    Infix,
}

/// Which tokens an entry responds to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TokenPattern {
    /// A token with exactly this text. In infix position adjacent `>`
    /// tokens are matched as `>>` and `>>=`.
    Text(EcoString),
    /// Any identifier.
    Identifier,
    /// Any reserved keyword.
    Keyword,
    /// Any literal, `true`, `false` and `null` included.
    Literal,
    /// Every token.
    Any,
}

impl TokenPattern {
    /// Pattern for an exact token text.
    #[must_use]
    pub fn text(text: &str) -> Self {
        Self::Text(text.into())
    }

    fn matches_class(&self, kind: &TokenKind) -> bool {
        match self {
            Self::Text(_) => false,
            Self::Identifier => kind.is_identifier(),
            Self::Keyword => matches!(kind, TokenKind::Keyword(_)),
            Self::Literal => kind.is_literal(),
            Self::Any => true,
        }
    }
}

/// Per-call options passed to factories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseFlags {
    /// Only type syntax is accepted: names, qualification, generic
    /// arguments, array ranks and nullable suffixes.
    pub type_only: bool,
    /// The type is the right operand of `is` or `as`, so a `?` after it
    /// may open a conditional instead of marking the type nullable.
    pub type_operand: bool,
    /// The expression starts a statement and may turn out to be the type
    /// of a local declaration, as in `List<int> xs`.
    pub may_declare: bool,
}

impl ParseFlags {
    /// Flags for parsing a type.
    pub const TYPE: Self = Self {
        type_only: true,
        type_operand: false,
        may_declare: false,
    };

    /// Flags for parsing the type operand of `is` or `as`.
    pub const TYPE_OPERAND: Self = Self {
        type_only: true,
        type_operand: true,
        may_declare: false,
    };

    /// Flags for an expression at the start of a statement.
    pub const STATEMENT: Self = Self {
        type_only: false,
        type_operand: false,
        may_declare: true,
    };
}

/// Builds a node at the parser's current token, or returns `None` to let
/// the next candidate try.
///
/// The second argument is the node under construction that encloses the
/// current position, if any. Infix factories take their left operand from
/// the parser's unused stack with [`Parser::take_unused`].
pub type Factory = fn(&mut Parser<'_>, Option<NodeId>, ParseFlags) -> Option<NodeId>;

/// Binding strength of an infix entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    /// Operator precedence (lower binds tighter).
    pub precedence: u16,
    /// Associativity at equal precedence.
    pub associativity: Associativity,
}

/// One registered entry.
#[derive(Debug, Clone)]
pub struct ParsePoint {
    /// Grammar position.
    pub context: ParseContext,
    /// Token pattern.
    pub pattern: TokenPattern,
    /// Higher priority entries are tried first.
    pub priority: i32,
    /// The factory.
    pub factory: Factory,
    /// Precedence and associativity, for infix entries.
    pub binding: Option<Binding>,
    /// Whether the entry is part of type syntax and stays active when
    /// [`ParseFlags::type_only`] is set.
    pub type_syntax: bool,
    order: usize,
}

impl ParsePoint {
    /// Creates an entry with no binding and priority zero.
    #[must_use]
    pub fn new(context: ParseContext, pattern: TokenPattern, factory: Factory) -> Self {
        Self {
            context,
            pattern,
            priority: 0,
            factory,
            binding: None,
            type_syntax: false,
            order: 0,
        }
    }

    /// Sets the priority.
    #[must_use]
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the infix binding.
    #[must_use]
    pub fn binding(mut self, precedence: u16, associativity: Associativity) -> Self {
        self.binding = Some(Binding {
            precedence,
            associativity,
        });
        self
    }

    /// Marks the entry as type syntax.
    #[must_use]
    pub fn type_syntax(mut self) -> Self {
        self.type_syntax = true;
        self
    }
}

/// The set of (pattern, priority, factory) entries driving the parser.
#[derive(Debug, Clone, Default)]
pub struct ParseRegistry {
    exact: HashMap<(ParseContext, EcoString), Vec<ParsePoint>>,
    classes: HashMap<ParseContext, Vec<ParsePoint>>,
    next_order: usize,
}

impl ParseRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in grammar: declarations, statements, expressions and
    /// types.
    #[must_use]
    pub fn standard() -> Self {
        let mut registry = Self::new();
        super::declarations::register(&mut registry);
        super::statements::register(&mut registry);
        super::expressions::register(&mut registry);
        super::types::register(&mut registry);
        tracing::trace!(entries = registry.len(), "built standard parse registry");
        registry
    }

    /// Adds an entry.
    pub fn add(&mut self, mut point: ParsePoint) -> &mut Self {
        point.order = self.next_order;
        self.next_order += 1;
        let bucket = match &point.pattern {
            TokenPattern::Text(text) => self
                .exact
                .entry((point.context, text.clone()))
                .or_default(),
            _ => self.classes.entry(point.context).or_default(),
        };
        let at = bucket.partition_point(|p| p.priority >= point.priority);
        bucket.insert(at, point);
        self
    }

    /// Registers a factory for a context and token pattern.
    pub fn register(
        &mut self,
        context: ParseContext,
        pattern: TokenPattern,
        priority: i32,
        factory: Factory,
    ) -> &mut Self {
        self.add(ParsePoint::new(context, pattern, factory).priority(priority))
    }

    /// Registers an infix factory for an operator text with its binding.
    pub fn register_infix(
        &mut self,
        text: &str,
        priority: i32,
        precedence: u16,
        associativity: Associativity,
        factory: Factory,
    ) -> &mut Self {
        self.add(
            ParsePoint::new(ParseContext::Infix, TokenPattern::text(text), factory)
                .priority(priority)
                .binding(precedence, associativity),
        )
    }

    /// Entries to try for a token, in dispatch order.
    pub fn candidates<'a>(
        &'a self,
        context: ParseContext,
        text: &str,
        kind: &'a TokenKind,
    ) -> impl Iterator<Item = &'a ParsePoint> + 'a {
        let exact = self
            .exact
            .get(&(context, EcoString::from(text)))
            .map(Vec::as_slice)
            .unwrap_or_default();
        let classes = self
            .classes
            .get(&context)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .filter(move |p| p.pattern.matches_class(kind));
        exact.iter().chain(classes)
    }

    /// Total number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.exact.values().map(Vec::len).sum::<usize>()
            + self.classes.values().map(Vec::len).sum::<usize>()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn none(_: &mut Parser<'_>, _: Option<NodeId>, _: ParseFlags) -> Option<NodeId> {
        None
    }

    fn other(_: &mut Parser<'_>, _: Option<NodeId>, _: ParseFlags) -> Option<NodeId> {
        None
    }

    #[test]
    fn exact_entries_come_before_classes() {
        let mut registry = ParseRegistry::new();
        registry.register(ParseContext::Prefix, TokenPattern::Any, 100, none);
        registry.register(ParseContext::Prefix, TokenPattern::text("x"), 0, other);
        let kind = TokenKind::Identifier("x".into());
        let order: Vec<_> = registry
            .candidates(ParseContext::Prefix, "x", &kind)
            .map(|p| p.pattern.clone())
            .collect();
        assert_eq!(order, vec![TokenPattern::text("x"), TokenPattern::Any]);
    }

    #[test]
    fn priority_then_registration_order() {
        let mut registry = ParseRegistry::new();
        registry.register(ParseContext::Infix, TokenPattern::text("<"), 0, none);
        registry.register(ParseContext::Infix, TokenPattern::text("<"), 10, other);
        registry.register(ParseContext::Infix, TokenPattern::text("<"), 0, other);
        let kind = TokenKind::Operator("<".into());
        let priorities: Vec<_> = registry
            .candidates(ParseContext::Infix, "<", &kind)
            .map(|p| (p.priority, p.order))
            .collect();
        assert_eq!(priorities, vec![(10, 1), (0, 0), (0, 2)]);
    }

    #[test]
    fn class_patterns_filter_by_kind() {
        let mut registry = ParseRegistry::new();
        registry.register(ParseContext::Prefix, TokenPattern::Literal, 0, none);
        registry.register(ParseContext::Prefix, TokenPattern::Identifier, 0, none);
        let null = TokenKind::Keyword("null".into());
        let found: Vec<_> = registry
            .candidates(ParseContext::Prefix, "null", &null)
            .map(|p| p.pattern.clone())
            .collect();
        assert_eq!(found, vec![TokenPattern::Literal]);
        assert_eq!(
            registry
                .candidates(ParseContext::Statement, "null", &null)
                .count(),
            0
        );
    }

    #[test]
    fn standard_registry_covers_every_context() {
        let registry = ParseRegistry::standard();
        let semi = TokenKind::Semicolon;
        assert!(registry.candidates(ParseContext::Statement, ";", &semi).count() >= 1);
        let plus = TokenKind::Operator("+".into());
        let infix: Vec<_> = registry
            .candidates(ParseContext::Infix, "+", &plus)
            .filter_map(|p| p.binding)
            .collect();
        assert_eq!(infix[0].precedence, 310);
        let class = TokenKind::Keyword("class".into());
        assert!(registry.candidates(ParseContext::Member, "class", &class).count() >= 1);
    }
}
