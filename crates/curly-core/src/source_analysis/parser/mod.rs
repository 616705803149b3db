// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Registry-driven recursive descent parser.
//!
//! The parser turns a token stream into a [`SyntaxTree`] whose nodes keep
//! their exact tokens, so the source can be reproduced byte for byte. It is
//! designed for tooling: it always produces a tree, reports every problem as
//! a [`Diagnostic`], and attaches each diagnostic to the nearest node.
//!
//! # Design
//!
//! - **Registry dispatch** - every node kind is built by a factory found in
//!   a [`ParseRegistry`] for the current token and [`ParseContext`]
//! - **Unused stack** - a finished operand waits on the unused stack until
//!   an infix factory claims it as its left operand, so a name can become
//!   the start of a generic type, a member chain or a declaration after the
//!   fact
//! - **Checkpoints** - a factory that returns `None` is rolled back
//!   completely: position, unused stack, diagnostics and any nodes it made
//! - **Builders** - a factory opens a node with [`Parser::start_node`],
//!   consumes tokens and attaches children, then closes it with
//!   [`Parser::finish_node`]; every consumed token lands in some node's
//!   layout
//!
//! # Precedence climbing
//!
//! While parsing the right operand of an operator with precedence `P`, a
//! following operator with precedence `P'` binds to the operand iff
//! `P' < P`, or `P' == P` and the current operator is right-associative.
//!
//! | Level | Operators | Associativity |
//! |-------|-----------|---------------|
//! | 50 | generic `<...>`, array rank `[]`, nullable `?` (type syntax) | Left |
//! | 100 | `.` `::` `?.`, call, index, postfix `++` `--` | Left |
//! | 200 | prefix operators, casts | Right |
//! | 300 - 385 | arithmetic, shifts, relational, equality, bitwise, logical | Left |
//! | 390 | `??` | Right |
//! | 400 | `?:` | Right |
//! | 500 | assignment | Right |
//!
//! # Usage
//!
//! ```
//! use curly_core::ast::{BinaryOperator, NodeKind};
//! use curly_core::source_analysis::parse_expression;
//!
//! let result = parse_expression("2 + 3 * 4");
//! let root = result.root().unwrap();
//! assert_eq!(result.tree.kind(root).binary_op(), Some(BinaryOperator::Add));
//! ```

use std::sync::LazyLock;

use ecow::EcoString;

use crate::ast::{
    Associativity, FormatFlags, Layout, NodeId, NodeKind, Piece, SyntaxTree, TypeKind, operators,
};
use crate::source_analysis::{Diagnostic, LexError, Span, Token, TokenKind, lex_with_eof};

mod declarations;
mod expressions;
mod registry;
mod statements;
mod types;

// Property-based tests
#[cfg(test)]
mod property_tests;

pub use registry::{
    Binding, Factory, ParseContext, ParseFlags, ParsePoint, ParseRegistry, TokenPattern,
};

static STANDARD: LazyLock<ParseRegistry> = LazyLock::new(ParseRegistry::standard);

/// Maximum factory nesting depth before the parser bails out.
///
/// Each nesting level uses several stack frames, and instrumented fuzzing
/// builds have larger frames. `stacker::maybe_grow` at the dispatch point
/// extends the stack on the heap if it still runs low.
const MAX_NESTING_DEPTH: usize = 128;

/// The built-in parse registry.
#[must_use]
pub fn standard_registry() -> &'static ParseRegistry {
    &STANDARD
}

/// A parsed tree and the diagnostics found while building it.
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// The tree. Its root is the compilation unit, expression or statement.
    pub tree: SyntaxTree,
    /// Lexical and syntax diagnostics in source order of discovery.
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseResult {
    /// The root node.
    #[must_use]
    pub fn root(&self) -> Option<NodeId> {
        self.tree.root()
    }

    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Parses a whole source file with the built-in grammar.
///
/// Always returns a tree rooted at a compilation unit, even for malformed
/// input.
///
/// # Examples
///
/// ```
/// use curly_core::source_analysis::parse;
///
/// let result = parse("namespace Geometry { class Point { int x; } }");
/// assert!(result.diagnostics.is_empty());
/// ```
#[must_use]
pub fn parse(source: &str) -> ParseResult {
    parse_with(source, &STANDARD)
}

/// Parses a whole source file with a custom registry.
#[must_use]
pub fn parse_with(source: &str, registry: &ParseRegistry) -> ParseResult {
    let mut parser = Parser::new(source, registry);
    let unit = parser.parse_compilation_unit();
    parser.into_result(unit)
}

/// Parses a single expression; the tree's root is the expression.
#[must_use]
pub fn parse_expression(source: &str) -> ParseResult {
    let mut parser = Parser::new(source, &STANDARD);
    let root = parser.parse_expression(operators::LOOSEST);
    let root = parser.absorb_rest(root);
    parser.into_result(root)
}

/// Parses a single statement; the tree's root is the statement.
#[must_use]
pub fn parse_statement(source: &str) -> ParseResult {
    let mut parser = Parser::new(source, &STANDARD);
    let root = parser.parse_statement();
    let root = parser.absorb_rest(root);
    parser.into_result(root)
}

/// A node being assembled.
#[derive(Debug)]
struct Builder {
    id: NodeId,
    pieces: Vec<Piece>,
    children: Vec<Option<NodeId>>,
    start_token: usize,
    diag_start: usize,
}

/// The enclosing declaration while parsing members.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum Container {
    Namespace,
    Type { name: EcoString, kind: TypeKind },
}

/// Saved parser state for rolling back a failed factory.
#[derive(Debug)]
pub struct Checkpoint {
    current: usize,
    builders: usize,
    top_pieces: usize,
    top_children: usize,
    unused: Vec<NodeId>,
    diagnostics: usize,
    nodes: usize,
    containers: usize,
}

/// The parser state.
///
/// Factories receive `&mut Parser` and use its token, builder and
/// sub-parse methods.
pub struct Parser<'r> {
    registry: &'r ParseRegistry,
    tokens: Vec<Token>,
    current: usize,
    tree: SyntaxTree,
    builders: Vec<Builder>,
    unused: Vec<NodeId>,
    diagnostics: Vec<Diagnostic>,
    /// Indices of diagnostics not yet attached to a node.
    pending: Vec<usize>,
    containers: Vec<Container>,
    nesting_depth: usize,
}

impl<'r> Parser<'r> {
    /// Creates a parser over `source`.
    #[must_use]
    pub fn new(source: &str, registry: &'r ParseRegistry) -> Self {
        Self::from_tokens(lex_with_eof(source), registry)
    }

    /// Creates a parser over an already lexed token stream ending in `Eof`.
    #[must_use]
    pub fn from_tokens(mut tokens: Vec<Token>, registry: &'r ParseRegistry) -> Self {
        if !tokens.last().is_some_and(|t| t.kind().is_eof()) {
            let end = tokens.last().map_or(0, |t| t.span().end());
            tokens.push(Token::new(TokenKind::Eof, Span::point(end)));
        }
        Self {
            registry,
            tokens,
            current: 0,
            tree: SyntaxTree::new(),
            builders: Vec::new(),
            unused: Vec::new(),
            diagnostics: Vec::new(),
            pending: Vec::new(),
            containers: Vec::new(),
            nesting_depth: 0,
        }
    }

    /// The tree built so far.
    #[must_use]
    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    /// Mutable access to the tree built so far.
    pub fn tree_mut(&mut self) -> &mut SyntaxTree {
        &mut self.tree
    }

    /// Finishes parsing, normalizing comment placement around operators.
    #[must_use]
    pub fn into_result(mut self, root: Option<NodeId>) -> ParseResult {
        expressions::normalize_operator_comments(&mut self.tree);
        if let Some(root) = root {
            // A freshly finished node is detached, so this cannot fail.
            let _ = self.tree.set_root(root);
        }
        ParseResult {
            tree: self.tree,
            diagnostics: self.diagnostics,
        }
    }

    // ========================================================================
    // Token Management
    // ========================================================================

    /// Returns the current token.
    #[must_use]
    pub fn current_token(&self) -> &Token {
        self.peek_token(0)
    }

    /// Returns the current token kind.
    #[must_use]
    pub fn current_kind(&self) -> &TokenKind {
        self.current_token().kind()
    }

    /// Returns the token `n` positions ahead, clamped to `Eof`.
    #[must_use]
    pub fn peek_token(&self, n: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.current + n).min(last)]
    }

    /// Returns `true` if the current token has exactly this text.
    #[must_use]
    pub fn at(&self, text: &str) -> bool {
        !self.is_at_end() && self.current_token().text() == text
    }

    /// Returns `true` if the token `n` ahead has exactly this text.
    #[must_use]
    pub fn peek_is(&self, n: usize, text: &str) -> bool {
        let token = self.peek_token(n);
        !token.kind().is_eof() && token.text() == text
    }

    /// Checks if we're at the end of input.
    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.current_kind().is_eof()
    }

    /// Index of the current token.
    #[must_use]
    pub fn position(&self) -> usize {
        self.current
    }

    /// Consumes the current token into the node under construction and
    /// returns a copy of it.
    pub fn advance(&mut self) -> Token {
        let token = self.current_token().clone();
        if self.current < self.tokens.len() {
            self.current += 1;
        }
        if let Some(error) = LexError::from_token(&token) {
            self.report(Diagnostic::error(error.to_string(), error.span));
        }
        if let Some(builder) = self.builders.last_mut() {
            builder.pieces.push(Piece::Token(token.clone()));
        }
        token
    }

    /// Consumes the current token if it has this text.
    pub fn eat(&mut self, text: &str) -> bool {
        if self.at(text) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consumes a token with this text, or reports that it is missing.
    pub fn expect(&mut self, text: &str) -> bool {
        if self.eat(text) {
            return true;
        }
        let found = self.current_kind().to_string();
        self.error(format!("expected `{text}`, found {found}"));
        false
    }

    /// Consumes an identifier, or reports that one is missing.
    pub fn expect_identifier(&mut self, what: &str) -> Option<EcoString> {
        if self.current_kind().is_identifier() {
            let token = self.advance();
            return Some(token.text().into());
        }
        let found = self.current_kind().to_string();
        self.error(format!("expected {what}, found {found}"));
        None
    }

    /// Text of the current token in infix position. Adjacent `>` `>` and
    /// `>` `>=` read as `>>` and `>>=`; the second value is the number of
    /// tokens the text spans.
    #[must_use]
    pub fn infix_text(&self) -> (EcoString, usize) {
        let first = self.current_token();
        if first.text() == ">" && first.trailing_trivia().is_empty() {
            let next = self.peek_token(1);
            if next.leading_trivia().is_empty() && next.span().start() == first.span().end() {
                match next.text() {
                    ">" => return (">>".into(), 2),
                    ">=" => return (">>=".into(), 2),
                    _ => {}
                }
            }
        }
        (first.text().into(), 1)
    }

    // ========================================================================
    // Diagnostics
    // ========================================================================

    /// Records a diagnostic; it is attached to the next node to finish.
    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.pending.push(self.diagnostics.len());
        self.diagnostics.push(diagnostic);
    }

    /// Reports an error at the current token.
    pub fn error(&mut self, message: impl Into<EcoString>) {
        let span = self.current_token().span();
        self.report(Diagnostic::error(message, span));
    }

    /// Diagnostics reported so far.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    // ========================================================================
    // Builders
    // ========================================================================

    /// Opens a node with `fixed` leading child slots.
    pub fn start_node(&mut self, fixed: usize) {
        let id = self.tree.add_node(NodeKind::Unrecognized);
        self.builders.push(Builder {
            id,
            pieces: Vec::new(),
            children: vec![None; fixed],
            start_token: self.current,
            diag_start: self.diagnostics.len(),
        });
    }

    /// The node under construction, passed to factories as their parent.
    #[must_use]
    pub fn enclosing(&self) -> Option<NodeId> {
        self.builders.last().map(|b| b.id)
    }

    /// Places a child in a fixed slot of the open node.
    pub fn attach(&mut self, slot: usize, child: Option<NodeId>) {
        let Some(builder) = self.builders.last_mut() else {
            return;
        };
        if builder.children.len() <= slot {
            builder.children.resize(slot + 1, None);
        }
        if let Some(child) = child {
            builder.children[slot] = Some(child);
            builder.pieces.push(Piece::Child(slot));
        }
    }

    /// Appends a variadic child to the open node.
    pub fn push_child(&mut self, child: NodeId) {
        if let Some(builder) = self.builders.last_mut() {
            let slot = builder.children.len();
            builder.children.push(Some(child));
            builder.pieces.push(Piece::Child(slot));
        }
    }

    /// Number of children the open node has so far.
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.builders.last().map_or(0, |b| b.children.len())
    }

    /// Makes sure the open node has at least `fixed` slots, so variadic
    /// children pushed afterwards land behind them.
    pub fn reserve_slots(&mut self, fixed: usize) {
        if let Some(builder) = self.builders.last_mut()
            && builder.children.len() < fixed
        {
            builder.children.resize(fixed, None);
        }
    }

    fn format_for(&self, start_token: usize) -> FormatFlags {
        let end = self.current.min(self.tokens.len());
        let first = &self.tokens[start_token.min(self.tokens.len() - 1)];
        FormatFlags {
            parens: 0,
            first_on_line: start_token == 0 || first.starts_line(),
            single_line: self
                .tokens
                .get(start_token + 1..end)
                .is_none_or(|rest| rest.iter().all(|t| !t.starts_line())),
            blank_line_before: first.has_blank_line_before(),
        }
    }

    fn pieces_span(&self, pieces: &[Piece], children: &[Option<NodeId>]) -> Span {
        pieces.iter().fold(Span::default(), |span, piece| match piece {
            Piece::Token(token) if !token.kind().is_eof() => span.merge(token.span()),
            Piece::Token(_) => span,
            Piece::Child(slot) => children
                .get(*slot)
                .copied()
                .flatten()
                .and_then(|c| self.tree.get(c))
                .map_or(span, |c| span.merge(c.span)),
        })
    }

    fn attach_pending(&mut self, id: NodeId, diag_start: usize) {
        let split = self.pending.partition_point(|&i| i < diag_start);
        for index in self.pending.split_off(split) {
            let diagnostic = self.diagnostics[index].clone();
            self.tree.annotate(id, diagnostic);
        }
    }

    /// Closes the open node with its kind and returns it.
    ///
    /// # Panics
    ///
    /// Panics if no node is open; factories must pair every `start_node`
    /// with one `finish_node`.
    pub fn finish_node(&mut self, kind: NodeKind) -> NodeId {
        let builder = self
            .builders
            .pop()
            .unwrap_or_else(|| panic!("finish_node({}) without start_node", kind.label()));
        let span = self.pieces_span(&builder.pieces, &builder.children);
        let format = self.format_for(builder.start_token);
        self.tree.fill_parsed(
            builder.id,
            kind,
            builder.children,
            Layout::new(builder.pieces),
            span,
            format,
        );
        self.attach_pending(builder.id, builder.diag_start);
        builder.id
    }

    /// Closes the open node by appending its tokens and children to the
    /// already finished node `target` (a type suffix such as `<T>` or
    /// `[]`), then lets `update` adjust the target's kind.
    pub fn finish_extension(
        &mut self,
        target: NodeId,
        update: impl FnOnce(&mut NodeKind, usize),
    ) -> NodeId {
        let Some(builder) = self.builders.pop() else {
            return target;
        };
        self.tree.discard(builder.id);
        let added = builder.children.iter().flatten().count();
        let extra = self.pieces_span(&builder.pieces, &builder.children);
        self.tree.append_parsed(target, builder.pieces, builder.children);
        let start = self.token_index(self.tree[target].span.start());
        let format = self.format_for(start);
        let node = &mut self.tree[target];
        node.span = node.span.merge(extra);
        node.format.single_line = format.single_line;
        update(&mut node.kind, added);
        self.attach_pending(target, builder.diag_start);
        target
    }

    /// Closes the open node `( inner )` by moving its parenthesis tokens
    /// into `inner`'s own layout and counting the pair.
    pub fn finish_parenthesized(&mut self, inner: NodeId) -> NodeId {
        let Some(builder) = self.builders.pop() else {
            return inner;
        };
        self.tree.discard(builder.id);
        let at = builder
            .pieces
            .iter()
            .position(|p| matches!(p, Piece::Child(_)))
            .unwrap_or(builder.pieces.len());
        let mut before = builder.pieces;
        let after = before.split_off(at);
        let after: Vec<Piece> = after
            .into_iter()
            .filter(|p| matches!(p, Piece::Token(_)))
            .collect();
        let extra = self.pieces_span(&before, &[]).merge(self.pieces_span(&after, &[]));
        let format = self.format_for(builder.start_token);
        let node = &mut self.tree[inner];
        let layout = node.layout.get_or_insert_with(Layout::default);
        let mut pieces = before;
        pieces.append(layout.pieces_mut());
        pieces.extend(after);
        *layout = Layout::new(pieces);
        node.span = node.span.merge(extra);
        node.format.parens = node.format.parens.saturating_add(1);
        node.format.first_on_line = format.first_on_line;
        node.format.blank_line_before = format.blank_line_before;
        node.format.single_line = format.single_line;
        self.attach_pending(inner, builder.diag_start);
        inner
    }

    fn token_index(&self, offset: u32) -> usize {
        self.tokens.partition_point(|t| t.span().start() < offset)
    }

    // ========================================================================
    // Unused Stack
    // ========================================================================

    /// Peeks at the most recent unclaimed operand.
    #[must_use]
    pub fn peek_unused(&self) -> Option<NodeId> {
        self.unused.last().copied()
    }

    /// Claims the most recent unclaimed operand, e.g. as the left side of
    /// an infix operator.
    pub fn take_unused(&mut self) -> Option<NodeId> {
        self.unused.pop()
    }

    // ========================================================================
    // Checkpoints
    // ========================================================================

    /// Saves the parser state.
    #[must_use]
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            current: self.current,
            builders: self.builders.len(),
            top_pieces: self.builders.last().map_or(0, |b| b.pieces.len()),
            top_children: self.builders.last().map_or(0, |b| b.children.len()),
            unused: self.unused.clone(),
            diagnostics: self.diagnostics.len(),
            nodes: self.tree.capacity(),
            containers: self.containers.len(),
        }
    }

    /// Restores a saved state, discarding every node made since.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        self.current = checkpoint.current;
        self.builders.truncate(checkpoint.builders);
        if let Some(top) = self.builders.last_mut() {
            top.pieces.truncate(checkpoint.top_pieces);
            top.children.truncate(checkpoint.top_children);
        }
        self.tree.discard_from(checkpoint.nodes);
        for &node in &checkpoint.unused {
            if self.tree.parent(node).is_none_or(|p| !self.tree.contains(p)) {
                self.tree.orphan(node);
            }
        }
        self.unused = checkpoint.unused;
        self.diagnostics.truncate(checkpoint.diagnostics);
        self.pending.retain(|&i| i < checkpoint.diagnostics);
        self.containers.truncate(checkpoint.containers);
    }

    /// Runs a factory, rolling back if it declines.
    pub fn attempt(&mut self, factory: Factory, flags: ParseFlags) -> Option<NodeId> {
        let checkpoint = self.checkpoint();
        let parent = self.enclosing();
        let result = factory(self, parent, flags);
        if result.is_none() {
            self.rollback(checkpoint);
        }
        result
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    fn enter_nesting(&mut self) -> bool {
        self.nesting_depth += 1;
        if self.nesting_depth > MAX_NESTING_DEPTH {
            self.error(format!(
                "nesting is too deep (maximum {MAX_NESTING_DEPTH} levels)"
            ));
            self.nesting_depth -= 1;
            return false;
        }
        true
    }

    fn leave_nesting(&mut self) {
        debug_assert!(self.nesting_depth > 0, "leave_nesting without enter_nesting");
        self.nesting_depth = self.nesting_depth.saturating_sub(1);
    }

    /// Tries the registry's factories for the current token in `context`.
    pub fn dispatch(&mut self, context: ParseContext, flags: ParseFlags) -> Option<NodeId> {
        // 32 KiB red zone, 256 KiB new segment.
        stacker::maybe_grow(32 * 1024, 256 * 1024, || {
            if !self.enter_nesting() {
                return None;
            }
            let registry = self.registry;
            let token = self.current_token().clone();
            let mut result = None;
            for point in registry.candidates(context, token.text(), token.kind()) {
                if flags.type_only && !point.type_syntax {
                    continue;
                }
                result = self.attempt(point.factory, flags);
                if result.is_some() {
                    break;
                }
                tracing::trace!(?context, token = %token.kind(), "factory declined");
            }
            self.leave_nesting();
            result
        })
    }

    fn parse_infix(
        &mut self,
        precedence: u16,
        associativity: Associativity,
        flags: ParseFlags,
    ) -> bool {
        let registry = self.registry;
        let (text, _) = self.infix_text();
        let kind = self.current_kind().clone();
        if kind.is_eof() {
            return false;
        }
        for point in registry.candidates(ParseContext::Infix, &text, &kind) {
            if flags.type_only && !point.type_syntax {
                continue;
            }
            let Some(binding) = point.binding else {
                continue;
            };
            let binds = binding.precedence < precedence
                || (binding.precedence == precedence && associativity == Associativity::Right);
            if !binds {
                continue;
            }
            if !self.enter_nesting() {
                return false;
            }
            let result = self.attempt(point.factory, flags);
            self.leave_nesting();
            if let Some(node) = result {
                self.unused.push(node);
                return true;
            }
        }
        false
    }

    /// Parses an operand and every following operator that binds to it
    /// under an operator of the given precedence and associativity.
    pub fn parse_operand(
        &mut self,
        precedence: u16,
        associativity: Associativity,
        flags: ParseFlags,
    ) -> Option<NodeId> {
        let base = self.unused.len();
        let Some(operand) = self.dispatch(ParseContext::Prefix, flags) else {
            let what = if flags.type_only { "type" } else { "expression" };
            let found = self.current_kind().to_string();
            self.error(format!("expected {what}, found {found}"));
            return None;
        };
        self.unused.push(operand);
        while self.parse_infix(precedence, associativity, flags) {}
        let result = self.unused.pop();
        self.unused.truncate(base);
        result
    }

    /// Parses an expression in which only operators binding tighter than
    /// `min_precedence` are accepted; pass [`operators::LOOSEST`] for a
    /// full expression.
    pub fn parse_expression(&mut self, min_precedence: u16) -> Option<NodeId> {
        self.parse_operand(min_precedence, Associativity::Left, ParseFlags::default())
    }

    /// Parses a type: a possibly qualified, generic, array or nullable name.
    pub fn parse_type(&mut self) -> Option<NodeId> {
        self.parse_operand(operators::LOOSEST, Associativity::Left, ParseFlags::TYPE)
    }

    /// Parses the type after `is` or `as`, leaving a `?` that opens a
    /// conditional to the enclosing expression.
    pub fn parse_type_operand(&mut self) -> Option<NodeId> {
        self.parse_operand(
            operators::LOOSEST,
            Associativity::Left,
            ParseFlags::TYPE_OPERAND,
        )
    }

    /// Parses one statement. Unrecognized input becomes an `Unrecognized`
    /// node; `None` only at a closing brace or the end of input.
    pub fn parse_statement(&mut self) -> Option<NodeId> {
        if self.is_at_end() || self.at("}") {
            return None;
        }
        let start = self.current;
        let node = self
            .dispatch(ParseContext::Statement, ParseFlags::default())
            .unwrap_or_else(|| self.unrecognized_token());
        if self.current == start {
            return Some(self.unrecognized_token());
        }
        Some(node)
    }

    /// Parses members or statements into the open node until a closing
    /// brace (when `stop_at_brace`) or the end of input.
    pub(super) fn parse_items(&mut self, context: ParseContext, stop_at_brace: bool) {
        while !self.is_at_end() && !(stop_at_brace && self.at("}")) {
            let start = self.current;
            let node = match context {
                ParseContext::Statement => self.parse_statement(),
                _ => self.dispatch(context, ParseFlags::default()),
            };
            match node {
                Some(node) if self.current > start => self.push_child(node),
                Some(node) => {
                    self.push_child(node);
                    let stray = self.unrecognized_token();
                    self.push_child(stray);
                }
                None => {
                    let stray = self.unrecognized_token();
                    self.push_child(stray);
                }
            }
        }
    }

    /// Wraps the current token in an `Unrecognized` node with a diagnostic.
    pub fn unrecognized_token(&mut self) -> NodeId {
        let found = self.current_kind().to_string();
        self.error(format!("unexpected {found}"));
        self.start_node(0);
        self.advance();
        self.finish_node(NodeKind::Unrecognized)
    }

    /// Consumes tokens into the open node until `stop` matches at bracket
    /// depth zero (the stop token is not consumed), keeping brackets
    /// balanced.
    pub(super) fn skip_balanced(&mut self, stop: impl Fn(&Token) -> bool) {
        let mut depth = 0usize;
        while !self.is_at_end() {
            let token = self.current_token();
            if depth == 0 && stop(token) {
                break;
            }
            match token.kind() {
                TokenKind::LeftParen | TokenKind::LeftBracket | TokenKind::LeftBrace => depth += 1,
                TokenKind::RightParen | TokenKind::RightBracket | TokenKind::RightBrace => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                }
                _ => {}
            }
            self.advance();
        }
    }

    fn parse_compilation_unit(&mut self) -> Option<NodeId> {
        self.start_node(0);
        self.containers.push(Container::Namespace);
        self.parse_items(ParseContext::Member, false);
        self.containers.pop();
        // The end-of-file token carries the trailing trivia of the file.
        self.advance();
        Some(self.finish_node(NodeKind::CompilationUnit))
    }

    /// Consumes everything left into `root` (reporting it), so exact
    /// rendering still reproduces the whole input.
    fn absorb_rest(&mut self, root: Option<NodeId>) -> Option<NodeId> {
        self.start_node(0);
        while !self.is_at_end() {
            let found = self.current_kind().to_string();
            self.error(format!("unexpected {found} after the end"));
            self.advance();
        }
        self.advance();
        Some(match root {
            Some(root) => self.finish_extension(root, |_, _| {}),
            None => self.finish_node(NodeKind::Unrecognized),
        })
    }

    pub(super) fn enclosing_container(&self) -> Option<&Container> {
        self.containers.last()
    }

    pub(super) fn push_container(&mut self, container: Container) {
        self.containers.push(container);
    }

    pub(super) fn pop_container(&mut self) {
        self.containers.pop();
    }
}
