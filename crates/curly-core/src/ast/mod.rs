// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The mutable, round-trippable syntax tree.
//!
//! **DDD Context:** Shared Kernel
//!
//! Nodes live in an arena owned by [`SyntaxTree`] and are addressed by
//! [`NodeId`]. A parent owns its children through child slots; each child
//! points back at its parent with a non-owning id. Every edit keeps the two
//! directions consistent:
//!
//! - a non-root node has exactly one parent, and that parent's slot holds it
//! - a removed node's id is never reused; lookups through it return `None`
//!
//! Parsed nodes carry a [`Layout`] (their exact tokens and trivia) so that
//! rendering can reproduce the source byte for byte. Nodes created by edits
//! have no layout and render canonically.
//!
//! # Example
//!
//! ```
//! use curly_core::ast::{BinaryOperator, NodeKind, SyntaxTree};
//!
//! let mut tree = SyntaxTree::new();
//! let a = tree.name("a");
//! let b = tree.literal("2");
//! let sum = tree.binary(BinaryOperator::Add, a, b).unwrap();
//! assert_eq!(tree.parent(a), Some(sum));
//! assert!(matches!(tree.kind(sum), NodeKind::Binary { .. }));
//! ```

mod kind;
mod layout;
mod name_ref;
pub mod operators;
mod walk;

use std::sync::atomic::{AtomicU64, Ordering};

use cranelift_entity::{PrimaryMap, entity_impl};
use thiserror::Error;

use crate::semantic_analysis::NameTable;
use crate::source_analysis::{Diagnostic, LineIndex, Position, Span, Token, TokenKind, Trivia};

pub use kind::{
    AccessorKind, LiteralKind, MODIFIER_WORDS, MethodDecl, Modifiers, NodeClass, NodeKind,
    TypeDecl, TypeKind,
};
pub use layout::{Layout, Piece};
pub use name_ref::{NameRef, RefState, Referent, arity_qualified};
pub use operators::{
    Associativity, BinaryOperator, ConstValue, ConstantFold, OperandSlot, UnaryOperator,
};
pub use walk::{Ancestors, Postorder, Preorder};

/// Handle to a node in a [`SyntaxTree`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);
entity_impl!(NodeId, "node");

/// Identity of a tree, used by the name table to remember where a
/// declaration came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreeId(u64);

impl TreeId {
    fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Formatting facts recorded at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FormatFlags {
    /// Number of explicit parenthesis pairs around the node.
    pub parens: u8,
    /// The node's first token starts a source line.
    pub first_on_line: bool,
    /// The node was written on a single line.
    pub single_line: bool,
    /// An empty line precedes the node.
    pub blank_line_before: bool,
}

/// Comments and whitespace inherited from a node this one replaced, for
/// nodes that have no tokens of their own to hold them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CarriedTrivia {
    /// Written before the node.
    pub leading: Vec<Trivia>,
    /// Written after the node.
    pub trailing: Vec<Trivia>,
}

impl CarriedTrivia {
    /// Returns `true` if there is nothing to write.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.leading.is_empty() && self.trailing.is_empty()
    }
}

/// A node of the syntax tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// The kind and its data.
    pub kind: NodeKind,
    children: Vec<Option<NodeId>>,
    parent: Option<NodeId>,
    /// Source range; empty for synthesized nodes.
    pub span: Span,
    /// Exact source layout; `None` for synthesized nodes.
    pub layout: Option<Layout>,
    /// Formatting flags.
    pub format: FormatFlags,
    /// Trivia taken over from a replaced node.
    pub carried: CarriedTrivia,
    /// Diagnostics attached to this node by parsing or resolution.
    pub annotations: Vec<Diagnostic>,
}

impl Node {
    fn synthesized(kind: NodeKind) -> Self {
        let children = vec![None; kind.fixed_slots()];
        Self {
            kind,
            children,
            parent: None,
            span: Span::default(),
            layout: None,
            format: FormatFlags::default(),
            carried: CarriedTrivia::default(),
            annotations: Vec::new(),
        }
    }

    /// Child slots, fixed slots first.
    #[must_use]
    pub fn children(&self) -> &[Option<NodeId>] {
        &self.children
    }

    /// The owning parent, if attached.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

#[derive(Debug, Clone)]
enum Slot {
    Live(Box<Node>),
    Removed,
}

/// A recoverable tree edit failure.
#[derive(Debug, Clone, PartialEq, Eq, Error, miette::Diagnostic)]
pub enum TreeError {
    /// The id refers to a removed node.
    #[error("{0} has been removed from the tree")]
    Removed(NodeId),
    /// The node already has a parent; detach it first.
    #[error("{0} is already attached to {1}")]
    AlreadyAttached(NodeId, NodeId),
    /// The edit would make a node its own ancestor.
    #[error("attaching {child} under {parent} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },
    /// The slot index does not exist on the parent.
    #[error("{parent} has no child slot {slot}")]
    NoSuchSlot { parent: NodeId, slot: usize },
    /// The node has no parent to detach from.
    #[error("{0} is not attached to a parent")]
    Detached(NodeId),
}

/// An arena of syntax nodes with a designated root.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    id: TreeId,
    nodes: PrimaryMap<NodeId, Slot>,
    root: Option<NodeId>,
}

impl Default for SyntaxTree {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Index<NodeId> for SyntaxTree {
    type Output = Node;

    /// Panics if the node has been removed.
    fn index(&self, id: NodeId) -> &Node {
        match self.get(id) {
            Some(node) => node,
            None => panic!("{id} has been removed from the tree"),
        }
    }
}

impl std::ops::IndexMut<NodeId> for SyntaxTree {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        match self.get_mut(id) {
            Some(node) => node,
            None => panic!("{id} has been removed from the tree"),
        }
    }
}

impl SyntaxTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: TreeId::fresh(),
            nodes: PrimaryMap::new(),
            root: None,
        }
    }

    /// The identity of this tree.
    #[must_use]
    pub fn id(&self) -> TreeId {
        self.id
    }

    /// The root node.
    #[must_use]
    pub fn root(&self) -> Option<NodeId> {
        self.root.filter(|&r| self.contains(r))
    }

    /// Makes a detached node the root.
    pub fn set_root(&mut self, id: NodeId) -> Result<(), TreeError> {
        let node = self.get(id).ok_or(TreeError::Removed(id))?;
        if let Some(parent) = node.parent {
            return Err(TreeError::AlreadyAttached(id, parent));
        }
        self.root = Some(id);
        Ok(())
    }

    /// Number of node ids ever allocated, removed ones included.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the node exists and has not been removed.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Looks a node up; `None` if it was removed.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        match self.nodes.get(id)? {
            Slot::Live(node) => Some(node),
            Slot::Removed => None,
        }
    }

    /// Looks a node up mutably; `None` if it was removed.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        match self.nodes.get_mut(id)? {
            Slot::Live(node) => Some(node),
            Slot::Removed => None,
        }
    }

    /// The kind of a node. Panics if the node has been removed.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self[id].kind
    }

    /// The parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.parent
    }

    /// The child in `slot`, if any.
    #[must_use]
    pub fn child(&self, id: NodeId, slot: usize) -> Option<NodeId> {
        self.get(id)?.children.get(slot).copied().flatten()
    }

    /// All present children in slot order.
    pub fn child_nodes(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|c| *c)
    }

    /// Present children after the fixed slots.
    pub fn variadic_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let skip = self.get(id).map_or(0, |n| n.kind.fixed_slots());
        self.get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
            .iter()
            .skip(skip)
            .filter_map(|c| *c)
    }

    /// The slot a node occupies in its parent.
    #[must_use]
    pub fn slot_of(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self[parent].children.iter().position(|c| *c == Some(id))
    }

    /// Ancestors from the parent up to the root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors::new(self, id)
    }

    /// Pre-order traversal of the subtree rooted at `id`.
    #[must_use]
    pub fn preorder(&self, id: NodeId) -> Preorder<'_> {
        Preorder::new(self, id)
    }

    /// Post-order traversal of the subtree rooted at `id`.
    #[must_use]
    pub fn postorder(&self, id: NodeId) -> Postorder<'_> {
        Postorder::new(self, id)
    }

    // ========================================================================
    // Construction
    // ========================================================================

    /// Adds a detached, synthesized node with empty fixed slots.
    pub fn add_node(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(Slot::Live(Box::new(Node::synthesized(kind))))
    }

    /// Turns a reserved node into a parsed one and adopts its children.
    ///
    /// The children must be detached; the parser guarantees this.
    pub(crate) fn fill_parsed(
        &mut self,
        id: NodeId,
        kind: NodeKind,
        mut children: Vec<Option<NodeId>>,
        layout: Layout,
        span: Span,
        format: FormatFlags,
    ) {
        if children.len() < kind.fixed_slots() {
            children.resize(kind.fixed_slots(), None);
        }
        for child in children.iter().filter_map(|c| *c) {
            self[child].parent = Some(id);
        }
        self.nodes[id] = Slot::Live(Box::new(Node {
            kind,
            children,
            parent: None,
            span,
            layout: Some(layout),
            format,
            carried: CarriedTrivia::default(),
            annotations: Vec::new(),
        }));
    }

    /// Appends parsed pieces and children to an existing parsed node.
    /// Child pieces in `pieces` are numbered from zero and shifted past the
    /// node's existing children.
    pub(crate) fn append_parsed(
        &mut self,
        id: NodeId,
        pieces: Vec<Piece>,
        children: Vec<Option<NodeId>>,
    ) {
        let node = &mut self[id];
        let offset = node.children.len();
        let layout = node.layout.get_or_insert_with(Layout::default);
        layout
            .pieces_mut()
            .extend(pieces.into_iter().map(|piece| match piece {
                Piece::Child(slot) => Piece::Child(slot + offset),
                token @ Piece::Token(_) => token,
            }));
        node.children.extend(children.iter().copied());
        for child in children.into_iter().flatten() {
            self[child].parent = Some(id);
        }
    }

    /// Clears a node's parent link without touching the parent. Used when
    /// the parent itself is being discarded.
    pub(crate) fn orphan(&mut self, id: NodeId) {
        if let Some(node) = self.get_mut(id) {
            node.parent = None;
        }
    }

    /// Tombstones a single node.
    pub(crate) fn discard(&mut self, id: NodeId) {
        if self.nodes.get(id).is_some() {
            self.nodes[id] = Slot::Removed;
        }
    }

    /// Tombstones nodes allocated at or after `mark`; used by the parser to
    /// roll back a failed attempt.
    pub(crate) fn discard_from(&mut self, mark: usize) {
        for index in mark..self.nodes.len() {
            let id = <NodeId as cranelift_entity::EntityRef>::new(index);
            self.nodes[id] = Slot::Removed;
        }
    }

    /// Builds a synthesized binary operator node from two detached operands.
    pub fn binary(
        &mut self,
        op: BinaryOperator,
        left: NodeId,
        right: NodeId,
    ) -> Result<NodeId, TreeError> {
        let id = self.add_node(NodeKind::Binary { op, overload: None });
        self.set_child(id, 0, Some(left))?;
        self.set_child(id, 1, Some(right))?;
        Ok(id)
    }

    /// Builds a synthesized unary operator node.
    pub fn unary(&mut self, op: UnaryOperator, operand: NodeId) -> Result<NodeId, TreeError> {
        let id = self.add_node(NodeKind::Unary { op, overload: None });
        self.set_child(id, 0, Some(operand))?;
        Ok(id)
    }

    /// Builds a synthesized name reference (a predefined type keyword when
    /// `name` is one).
    pub fn name(&mut self, name: &str) -> NodeId {
        let name_ref = if crate::source_analysis::is_keyword(name) {
            NameRef::keyword(name)
        } else {
            NameRef::new(name)
        };
        self.add_node(NodeKind::Name(name_ref))
    }

    /// Builds a synthesized literal from its source text.
    pub fn literal(&mut self, text: &str) -> NodeId {
        let kind = match TokenKind::from_text(text) {
            TokenKind::Integer(_) => LiteralKind::Integer,
            TokenKind::Float(_) => LiteralKind::Float,
            TokenKind::String(s) if s.starts_with('$') => LiteralKind::InterpolatedString,
            TokenKind::String(_) => LiteralKind::String,
            TokenKind::Character(_) => LiteralKind::Character,
            _ if text == "null" => LiteralKind::Null,
            _ => LiteralKind::Boolean,
        };
        self.add_node(NodeKind::Literal {
            kind,
            text: text.into(),
        })
    }

    // ========================================================================
    // Edits
    // ========================================================================

    fn check_attachable(&self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        let node = self.get(child).ok_or(TreeError::Removed(child))?;
        if let Some(owner) = node.parent {
            return Err(TreeError::AlreadyAttached(child, owner));
        }
        if child == parent || self.ancestors(parent).any(|a| a == child) {
            return Err(TreeError::Cycle { parent, child });
        }
        if self.root == Some(child) {
            return Err(TreeError::AlreadyAttached(child, child));
        }
        Ok(())
    }

    /// Puts `child` into `slot` of `parent`, returning the displaced child
    /// (now detached).
    ///
    /// Keeps the parent's layout when the slot already has a place in it;
    /// otherwise the parent becomes synthesized and renders canonically.
    pub fn set_child(
        &mut self,
        parent: NodeId,
        slot: usize,
        child: Option<NodeId>,
    ) -> Result<Option<NodeId>, TreeError> {
        let len = self.get(parent).ok_or(TreeError::Removed(parent))?.children.len();
        if slot >= len {
            return Err(TreeError::NoSuchSlot { parent, slot });
        }
        if let Some(child) = child {
            self.check_attachable(parent, child)?;
        }
        let node = &mut self[parent];
        let old = std::mem::replace(&mut node.children[slot], child);
        let keeps_layout = node
            .layout
            .as_ref()
            .is_some_and(|l| l.has_child(slot) && child.is_some());
        if !keeps_layout {
            node.layout = None;
        }
        if let Some(old) = old {
            self[old].parent = None;
        }
        if let Some(child) = child {
            self[child].parent = Some(parent);
        }
        Ok(old)
    }

    /// Appends `child` as a new variadic child of `parent`.
    pub fn push_child(&mut self, parent: NodeId, child: NodeId) -> Result<usize, TreeError> {
        if !self.contains(parent) {
            return Err(TreeError::Removed(parent));
        }
        self.check_attachable(parent, child)?;
        let node = &mut self[parent];
        node.children.push(Some(child));
        let slot = node.children.len() - 1;
        // Statement lists keep their layout; the new child goes before the
        // closing brace (or end of file).
        let insert_at = node.layout.as_ref().and_then(|layout| {
            let pieces = layout.pieces();
            match &node.kind {
                NodeKind::CompilationUnit => pieces
                    .iter()
                    .rposition(|p| matches!(p, Piece::Token(t) if t.kind().is_eof())),
                NodeKind::Namespace { file_scoped: true } => Some(pieces.len()),
                NodeKind::Block | NodeKind::Namespace { .. } | NodeKind::TypeDecl(_) => pieces
                    .iter()
                    .rposition(|p| matches!(p, Piece::Token(t) if t.kind() == &TokenKind::RightBrace)),
                _ => None,
            }
        });
        match (insert_at, node.layout.as_mut()) {
            (Some(at), Some(layout)) => layout.pieces_mut().insert(at, Piece::Child(slot)),
            _ => node.layout = None,
        }
        self[child].parent = Some(parent);
        Ok(slot)
    }

    /// Replaces `old` with the detached node `new` in `old`'s parent slot
    /// (or as root). `old` ends up detached.
    pub fn replace(&mut self, old: NodeId, new: NodeId) -> Result<(), TreeError> {
        if !self.contains(old) {
            return Err(TreeError::Removed(old));
        }
        if self.root == Some(old) {
            if let Some(owner) = self.get(new).ok_or(TreeError::Removed(new))?.parent {
                return Err(TreeError::AlreadyAttached(new, owner));
            }
            self.root = Some(new);
        } else {
            let parent = self.parent(old).ok_or(TreeError::Detached(old))?;
            let slot = self.slot_of(old).ok_or(TreeError::Detached(old))?;
            self.set_child(parent, slot, Some(new))?;
        }
        self.carry_trivia(old, new);
        Ok(())
    }

    /// Moves the trivia around `old` to the edges of `new`: onto its first
    /// and last tokens when it has them, otherwise into its carried trivia.
    fn carry_trivia(&mut self, old: NodeId, new: NodeId) {
        let CarriedTrivia {
            mut leading,
            trailing: carried_trailing,
        } = std::mem::take(&mut self[old].carried);
        if let Some(token) = self.first_token_mut(old) {
            leading.append(token.leading_trivia_mut());
        }
        let mut trailing = self
            .last_token_mut(old)
            .map(|token| std::mem::take(token.trailing_trivia_mut()))
            .unwrap_or_default();
        trailing.extend(carried_trailing);

        if let Some(token) = self.first_token_mut(new) {
            leading.append(token.leading_trivia_mut());
            *token.leading_trivia_mut() = leading;
        } else {
            let carried = &mut self[new].carried.leading;
            leading.append(carried);
            *carried = leading;
        }
        if let Some(token) = self.last_token_mut(new) {
            token.trailing_trivia_mut().extend(trailing);
        } else {
            self[new].carried.trailing.extend(trailing);
        }
    }

    /// Unlinks a node from its parent. Fixed slots become empty; variadic
    /// children are removed and later siblings shift down.
    pub fn detach(&mut self, id: NodeId) -> Result<(), TreeError> {
        let parent = self
            .get(id)
            .ok_or(TreeError::Removed(id))?
            .parent
            .ok_or(TreeError::Detached(id))?;
        let slot = self.slot_of(id).ok_or(TreeError::Detached(id))?;
        let node = &mut self[parent];
        let fixed = node.kind.fixed_slots();
        if slot < fixed {
            node.children[slot] = None;
            node.layout = None;
        } else {
            node.children.remove(slot);
            let statement_list = match &mut node.kind {
                NodeKind::Block | NodeKind::CompilationUnit | NodeKind::Namespace { .. } => true,
                NodeKind::TypeDecl(decl) if slot < decl.base_count => {
                    decl.base_count -= 1;
                    false
                }
                NodeKind::TypeDecl(_) => true,
                _ => false,
            };
            match node.layout.as_mut() {
                Some(layout) if statement_list => layout.remove_child(slot, true),
                _ => node.layout = None,
            }
        }
        self[id].parent = None;
        Ok(())
    }

    /// Detaches a node (if attached) and removes its whole subtree. Ids of
    /// removed nodes are never reused.
    pub fn remove(&mut self, id: NodeId) -> Result<(), TreeError> {
        if !self.contains(id) {
            return Err(TreeError::Removed(id));
        }
        if self.parent(id).is_some() {
            self.detach(id)?;
        }
        if self.root == Some(id) {
            self.root = None;
        }
        let doomed: Vec<NodeId> = self.preorder(id).collect();
        for node in doomed {
            self.nodes[node] = Slot::Removed;
        }
        Ok(())
    }

    /// Attaches a diagnostic to a node.
    pub fn annotate(&mut self, id: NodeId, diagnostic: Diagnostic) {
        if let Some(node) = self.get_mut(id) {
            node.annotations.push(diagnostic);
        }
    }

    /// All annotations in the subtree, in pre-order.
    #[must_use]
    pub fn annotations(&self, id: NodeId) -> Vec<Diagnostic> {
        self.preorder(id)
            .flat_map(|n| self[n].annotations.iter().cloned())
            .collect()
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// The first token of a node, searching children in layout order.
    #[must_use]
    pub fn first_token(&self, id: NodeId) -> Option<&Token> {
        let node = self.get(id)?;
        for piece in node.layout.as_ref()?.pieces() {
            match piece {
                Piece::Token(token) => return Some(token),
                Piece::Child(slot) => {
                    if let Some(token) = node.children.get(*slot).copied().flatten().and_then(|c| self.first_token(c)) {
                        return Some(token);
                    }
                }
            }
        }
        None
    }

    /// The last token of a node.
    #[must_use]
    pub fn last_token(&self, id: NodeId) -> Option<&Token> {
        let node = self.get(id)?;
        for piece in node.layout.as_ref()?.pieces().iter().rev() {
            match piece {
                Piece::Token(token) => return Some(token),
                Piece::Child(slot) => {
                    if let Some(token) = node.children.get(*slot).copied().flatten().and_then(|c| self.last_token(c)) {
                        return Some(token);
                    }
                }
            }
        }
        None
    }

    /// Locates the first (`last == false`) or last token of a subtree as
    /// `(node, piece index)`.
    fn edge_token(&self, id: NodeId, last: bool) -> Option<(NodeId, usize)> {
        let node = self.get(id)?;
        let pieces = node.layout.as_ref()?.pieces();
        let indices: Box<dyn Iterator<Item = usize>> = if last {
            Box::new((0..pieces.len()).rev())
        } else {
            Box::new(0..pieces.len())
        };
        for index in indices {
            match &pieces[index] {
                Piece::Token(_) => return Some((id, index)),
                Piece::Child(slot) => {
                    if let Some(found) = node
                        .children
                        .get(*slot)
                        .copied()
                        .flatten()
                        .and_then(|c| self.edge_token(c, last))
                    {
                        return Some(found);
                    }
                }
            }
        }
        None
    }

    /// Mutable access to the first token of a subtree.
    pub fn first_token_mut(&mut self, id: NodeId) -> Option<&mut Token> {
        let (node, index) = self.edge_token(id, false)?;
        self.token_at_mut(node, index)
    }

    /// Mutable access to the last token of a subtree.
    pub fn last_token_mut(&mut self, id: NodeId) -> Option<&mut Token> {
        let (node, index) = self.edge_token(id, true)?;
        self.token_at_mut(node, index)
    }

    fn token_at_mut(&mut self, id: NodeId, index: usize) -> Option<&mut Token> {
        match self.get_mut(id)?.layout.as_mut()?.pieces_mut().get_mut(index)? {
            Piece::Token(token) => Some(token),
            Piece::Child(_) => None,
        }
    }

    /// Line and column where the node starts, or `None` for synthesized
    /// nodes.
    #[must_use]
    pub fn position(&self, id: NodeId, index: &LineIndex) -> Option<Position> {
        let node = self.get(id)?;
        node.layout.as_ref()?;
        Some(index.position(node.span.start()))
    }

    /// Returns `true` if the expression is built only from literals and
    /// foldable operators.
    #[must_use]
    pub fn is_constant(&self, id: NodeId) -> bool {
        let Some(node) = self.get(id) else {
            return false;
        };
        let operands_constant = || {
            node.children.iter().all(|c| c.is_some_and(|c| self.is_constant(c)))
        };
        match &node.kind {
            NodeKind::Literal { kind, .. } => *kind != LiteralKind::InterpolatedString,
            NodeKind::Binary { op, .. } => {
                !op.is_assignment() && !op.is_member_access() && !op.takes_type_operand() && operands_constant()
            }
            NodeKind::Unary { op, .. } => !matches!(
                op,
                UnaryOperator::PreIncrement
                    | UnaryOperator::PreDecrement
                    | UnaryOperator::PostIncrement
                    | UnaryOperator::PostDecrement
            ) && operands_constant(),
            NodeKind::Conditional => operands_constant(),
            _ => false,
        }
    }

    /// Evaluates a constant expression through the operator table.
    #[must_use]
    pub fn fold_constant(&self, id: NodeId) -> Option<ConstValue> {
        if !self.is_constant(id) {
            return None;
        }
        let node = self.get(id)?;
        let operands = || -> Option<Vec<ConstValue>> {
            node.children
                .iter()
                .map(|c| self.fold_constant((*c)?))
                .collect()
        };
        match &node.kind {
            NodeKind::Literal { text, .. } => operators::literal_value(text),
            NodeKind::Binary { op, .. } => op.fold(&operands()?),
            NodeKind::Unary { op, .. } => op.fold(&operands()?),
            NodeKind::Conditional => {
                let values = operands()?;
                match values.first()? {
                    ConstValue::Bool(true) => values.get(1).cloned(),
                    ConstValue::Bool(false) => values.get(2).cloned(),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// Returns `true` if any name reference in the subtree is unresolved,
    /// counting references whose target has since been removed.
    #[must_use]
    pub fn has_unresolved(&self, id: NodeId, table: &NameTable) -> bool {
        self.preorder(id).any(|n| match self.kind(n) {
            NodeKind::Name(name) => name
                .raw_referent()
                .is_none_or(|referent| !self.is_alive(referent, table)),
            _ => false,
        })
    }

    fn is_alive(&self, referent: Referent, table: &NameTable) -> bool {
        match referent {
            Referent::Symbol(symbol) => table.symbol_exists(symbol),
            Referent::Scope(_) | Referent::Inferred => true,
            Referent::Local(local) => self.contains(local),
        }
    }

    /// The referent of a name node, reverting the reference to unresolved
    /// when its target no longer exists.
    pub fn referent(&mut self, id: NodeId, table: &NameTable) -> Option<Referent> {
        let referent = self.get(id)?.kind.as_name()?.raw_referent()?;
        if self.is_alive(referent, table) {
            Some(referent)
        } else {
            if let NodeKind::Name(name) = &mut self[id].kind {
                name.unresolve();
            }
            None
        }
    }

    /// Dotted text of a name or member-access chain, e.g. `System.Collections`.
    #[must_use]
    pub fn dotted_name(&self, id: NodeId) -> Option<String> {
        match self.kind(id) {
            NodeKind::Name(name) => Some(name.name.to_string()),
            NodeKind::Binary { op, .. } if op.is_member_access() => {
                let left = self.dotted_name(self.child(id, 0)?)?;
                let right = self.dotted_name(self.child(id, 1)?)?;
                Some(format!("{left}.{right}"))
            }
            _ => None,
        }
    }

    /// Returns `true` if the node can denote a type: a name, a qualified
    /// name, or an alias-qualified name.
    #[must_use]
    pub fn is_type_like(&self, id: NodeId) -> bool {
        match self.get(id).map(|n| &n.kind) {
            Some(NodeKind::Name(_)) => true,
            Some(NodeKind::Binary {
                op: BinaryOperator::MemberAccess | BinaryOperator::AliasQualifier,
                ..
            }) => {
                self.child(id, 0).is_some_and(|l| self.is_type_like(l))
                    && self
                        .child(id, 1)
                        .is_some_and(|r| matches!(self.kind(r), NodeKind::Name(_)))
            }
            _ => false,
        }
    }

    /// The rightmost name of a type-like expression (`C` in `A.B.C`).
    #[must_use]
    pub fn rightmost_name(&self, id: NodeId) -> Option<NodeId> {
        match self.get(id)?.kind {
            NodeKind::Name(_) => Some(id),
            NodeKind::Binary { op, .. } if op.is_member_access() => {
                self.rightmost_name(self.child(id, 1)?)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sum_tree() -> (SyntaxTree, NodeId, NodeId, NodeId) {
        let mut tree = SyntaxTree::new();
        let a = tree.name("a");
        let b = tree.literal("2");
        let sum = tree.binary(BinaryOperator::Add, a, b).unwrap();
        tree.set_root(sum).unwrap();
        (tree, sum, a, b)
    }

    #[test]
    fn builders_link_parents() {
        let (tree, sum, a, b) = sum_tree();
        assert_eq!(tree.parent(a), Some(sum));
        assert_eq!(tree.child(sum, 1), Some(b));
        assert_eq!(tree.slot_of(b), Some(1));
        assert_eq!(tree.root(), Some(sum));
    }

    #[test]
    fn rejects_double_attachment_and_cycles() {
        let (mut tree, sum, a, _) = sum_tree();
        let neg = tree.add_node(NodeKind::Unary {
            op: UnaryOperator::Negate,
            overload: None,
        });
        assert_eq!(
            tree.set_child(neg, 0, Some(a)),
            Err(TreeError::AlreadyAttached(a, sum))
        );
        tree.detach(a).unwrap();
        tree.set_child(neg, 0, Some(a)).unwrap();
        tree.set_child(sum, 0, Some(neg)).unwrap();
        assert_eq!(
            tree.set_child(neg, 0, Some(sum)),
            Err(TreeError::Cycle {
                parent: neg,
                child: sum
            })
        );
        assert!(matches!(
            tree.set_child(a, 0, Some(neg)),
            Err(TreeError::NoSuchSlot { .. } | TreeError::AlreadyAttached(..))
        ));
    }

    #[test]
    fn cycle_is_detected() {
        let mut tree = SyntaxTree::new();
        let inner = tree.add_node(NodeKind::Unary {
            op: UnaryOperator::Not,
            overload: None,
        });
        let outer = tree.add_node(NodeKind::Unary {
            op: UnaryOperator::Not,
            overload: None,
        });
        tree.set_child(outer, 0, Some(inner)).unwrap();
        tree.detach(inner).unwrap();
        tree.set_child(inner, 0, Some(outer)).unwrap();
        // outer is now under inner; putting inner under outer closes a loop
        let err = tree.set_child(outer, 0, Some(inner));
        assert!(matches!(err, Err(TreeError::Cycle { .. } | TreeError::AlreadyAttached(..))));
    }

    #[test]
    fn replace_swaps_slot_contents() {
        let (mut tree, sum, a, _) = sum_tree();
        let c = tree.name("c");
        tree.replace(a, c).unwrap();
        assert_eq!(tree.child(sum, 0), Some(c));
        assert_eq!(tree.parent(a), None);
        assert_eq!(tree.parent(c), Some(sum));
    }

    #[test]
    fn removed_ids_are_detected_and_not_reused() {
        let (mut tree, sum, a, b) = sum_tree();
        tree.remove(a).unwrap();
        assert!(!tree.contains(a));
        assert_eq!(tree.child(sum, 0), None);
        assert_eq!(tree.get(a), None);
        let fresh = tree.name("z");
        assert_ne!(fresh, a);
        assert!(tree.contains(b));
        assert_eq!(tree.remove(a), Err(TreeError::Removed(a)));
    }

    #[test]
    fn removing_root_removes_subtree() {
        let (mut tree, sum, a, b) = sum_tree();
        tree.remove(sum).unwrap();
        assert_eq!(tree.root(), None);
        assert!(!tree.contains(a));
        assert!(!tree.contains(b));
    }

    #[test]
    fn traversal_orders() {
        let (tree, sum, a, b) = sum_tree();
        assert_eq!(tree.preorder(sum).collect::<Vec<_>>(), vec![sum, a, b]);
        assert_eq!(tree.postorder(sum).collect::<Vec<_>>(), vec![a, b, sum]);
        assert_eq!(tree.ancestors(b).collect::<Vec<_>>(), vec![sum]);
    }

    #[test]
    fn constant_folding() {
        let (mut tree, sum, a, _) = sum_tree();
        assert!(!tree.is_constant(sum));
        let three = tree.literal("3");
        tree.replace(a, three).unwrap();
        assert!(tree.is_constant(sum));
        assert_eq!(tree.fold_constant(sum), Some(ConstValue::Int(5)));
    }

    #[test]
    fn unresolved_query_is_recursive() {
        let (mut tree, sum, a, _) = sum_tree();
        let table = NameTable::new();
        assert!(tree.has_unresolved(sum, &table));
        if let NodeKind::Name(name) = &mut tree[a].kind {
            name.resolve(Referent::Inferred);
        }
        assert!(!tree.has_unresolved(sum, &table));
    }

    #[test]
    fn unresolved_query_sees_removed_locals() {
        let (mut tree, sum, a, _) = sum_tree();
        let table = NameTable::new();
        let local = tree.name("decl");
        if let NodeKind::Name(name) = &mut tree[a].kind {
            name.resolve(Referent::Local(local));
        }
        assert!(!tree.has_unresolved(sum, &table));
        tree.remove(local).unwrap();
        assert!(tree.has_unresolved(sum, &table));
        assert!(tree.kind(a).as_name().unwrap().is_resolved());
    }

    #[test]
    fn stale_local_referent_reverts() {
        let (mut tree, _, a, b) = sum_tree();
        let table = NameTable::new();
        let local = tree.name("decl");
        if let NodeKind::Name(name) = &mut tree[a].kind {
            name.resolve(Referent::Local(local));
        }
        assert_eq!(tree.referent(a, &table), Some(Referent::Local(local)));
        tree.remove(local).unwrap();
        assert_eq!(tree.referent(a, &table), None);
        assert!(!tree.kind(a).as_name().unwrap().is_resolved());
        assert_eq!(tree.referent(b, &table), None);
    }
}
