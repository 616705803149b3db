// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Name resolution.
//!
//! **DDD Context:** Semantic Analysis
//!
//! The resolver binds [`NameRef`]s in a tree to entries of a shared
//! [`NameTable`]. It runs in three phases so that forward references work:
//!
//! 1. [`Phase::Declare`] creates namespaces and declares every type and
//!    member, outermost first
//! 2. [`Phase::Signatures`] resolves `using` targets, base lists and the
//!    types in member signatures
//! 3. [`Phase::Bodies`] resolves statements and expressions
//!
//! Within a phase, children are resolved before their parent, so a binary
//! operator sees the static types of its operands when it looks for a user
//! overload. Each child belongs to exactly one phase; a subtree is entered
//! only in its own phase, which keeps diagnostics from being reported twice.
//!
//! A name that cannot be bound stays unresolved. That is not an error by
//! itself: a warning is attached to the node and returned, unless the
//! lookup is quiet (operator overloads), in which case nothing is reported.
//!
//! # Lookup order
//!
//! locals and parameters (innermost first), type parameters, members of the
//! enclosing types and their bases, the enclosing namespaces up to the
//! root, `using` imports, then predefined type keywords.

use std::collections::{HashSet, VecDeque};

use ecow::EcoString;
use tracing::{debug, debug_span, trace};

use super::error::ResolveError;
use super::name_table::{Entity, Entry, NameTable, ScopeId, Symbol, SymbolId, SymbolKind};
use crate::ast::{
    AccessorKind, BinaryOperator, LiteralKind, NameRef, NodeClass, NodeId, NodeKind, Referent,
    SyntaxTree, UnaryOperator, operators,
};
use crate::source_analysis::{Diagnostic, DiagnosticCategory};

/// Resolution phases, in the order [`resolve_tree`] runs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    Declare,
    Signatures,
    Bodies,
}

impl Phase {
    /// Every phase, in order.
    pub const ALL: [Self; 3] = [Self::Declare, Self::Signatures, Self::Bodies];
}

/// What kind of entity a name is expected to denote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// A value, a type or a namespace.
    Expression,
    /// A type, or a namespace on the left of a qualified type name.
    Type,
    /// A namespace; missing namespaces are created.
    Namespace,
    /// A member of whatever the left side of `.` denotes.
    Member,
    /// A user operator declaration.
    OperatorOverload,
}

/// Options for one resolution call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveFlags {
    pub phase: Phase,
    /// Misses report nothing.
    pub quiet: bool,
}

impl ResolveFlags {
    /// Flags for a phase, not quiet.
    #[must_use]
    pub const fn phase(phase: Phase) -> Self {
        Self {
            phase,
            quiet: false,
        }
    }

    /// The same flags, quiet.
    #[must_use]
    pub const fn quiet(self) -> Self {
        Self {
            quiet: true,
            ..self
        }
    }
}

/// Runs every phase over a tree. Returns the resolution warnings, which are
/// also attached to the nodes they concern.
pub fn resolve_tree(tree: &mut SyntaxTree, table: &NameTable) -> Vec<Diagnostic> {
    Phase::ALL
        .into_iter()
        .flat_map(|phase| resolve_phase(tree, table, phase))
        .collect()
}

/// Runs one phase over a tree. A tree whose root is not a declaration
/// (a parsed expression or statement) only has a [`Phase::Bodies`].
pub fn resolve_phase(tree: &mut SyntaxTree, table: &NameTable, phase: Phase) -> Vec<Diagnostic> {
    let Some(root) = tree.root() else {
        return Vec::new();
    };
    if tree.kind(root).class() != NodeClass::Declaration && phase != Phase::Bodies {
        return Vec::new();
    }
    let _span = debug_span!("resolve", ?phase, tree = ?tree.id()).entered();
    let mut resolver = Resolver::new(tree, table);
    resolver.resolve(root, Category::Expression, ResolveFlags::phase(phase));
    let diagnostics = resolver.finish();
    debug!(warnings = diagnostics.len(), "phase complete");
    diagnostics
}

/// The static type of an expression, as far as the light type query can
/// tell.
pub fn static_type(tree: &mut SyntaxTree, table: &NameTable, node: NodeId) -> Option<SymbolId> {
    Resolver::new(tree, table).static_type(node)
}

/// Which phase a child subtree belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gate {
    /// A declaration inside a container; visited in every phase.
    Structural,
    /// Visited only in this phase.
    Region(Phase),
    /// Same phase as the parent.
    Inherit,
}

/// What the left side of a member access stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Denotation {
    Scope(ScopeId),
    Type(SymbolId),
    Value(Option<SymbolId>),
    Unknown,
}

/// Binds names in one tree against a name table.
#[derive(Debug)]
pub struct Resolver<'a> {
    tree: &'a mut SyntaxTree,
    table: &'a NameTable,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Resolver<'a> {
    /// Creates a resolver for `tree`.
    pub fn new(tree: &'a mut SyntaxTree, table: &'a NameTable) -> Self {
        Self {
            tree,
            table,
            diagnostics: Vec::new(),
        }
    }

    /// Resolves `node` and its subtree in the given phase, children before
    /// parents, and returns the node.
    pub fn resolve(&mut self, node: NodeId, category: Category, flags: ResolveFlags) -> NodeId {
        if self.tree.contains(node) {
            self.visit(node, category, flags);
        }
        node
    }

    /// Diagnostics reported so far.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consumes the resolver, returning its diagnostics.
    #[must_use]
    pub fn finish(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    fn visit(&mut self, node: NodeId, category: Category, flags: ResolveFlags) {
        // 32 KiB red zone, 256 KiB new segment.
        stacker::maybe_grow(32 * 1024, 256 * 1024, || {
            if flags.phase == Phase::Declare {
                self.declare(node);
            }
            for (slot, child) in self.child_order(node) {
                let enter = match self.gate(node, slot, child) {
                    Gate::Structural | Gate::Inherit => true,
                    Gate::Region(phase) => phase == flags.phase,
                };
                if enter && self.tree.contains(child) {
                    let category = self.child_category(node, slot, category);
                    self.visit(child, category, flags);
                }
            }
            self.complete(node, category, flags);
        });
    }

    /// Children in resolution order: slot order, except that call
    /// arguments come before the callee so overloads can be narrowed.
    fn child_order(&self, node: NodeId) -> Vec<(usize, NodeId)> {
        let mut children: Vec<(usize, NodeId)> = self.tree[node]
            .children()
            .iter()
            .enumerate()
            .filter_map(|(slot, child)| child.map(|c| (slot, c)))
            .collect();
        if matches!(self.tree.kind(node), NodeKind::Call) && !children.is_empty() {
            children.rotate_left(1);
        }
        children
    }

    fn gate(&self, parent: NodeId, slot: usize, child: NodeId) -> Gate {
        let is_declaration = matches!(
            self.tree.kind(child).class(),
            NodeClass::Declaration
        ) || matches!(self.tree.kind(child), NodeKind::Parameter { .. });
        let member_or_body = |fixed: usize| {
            if slot < fixed {
                Gate::Region(Phase::Signatures)
            } else if is_declaration {
                Gate::Structural
            } else {
                Gate::Region(Phase::Bodies)
            }
        };
        match self.tree.kind(parent) {
            NodeKind::CompilationUnit => member_or_body(0),
            NodeKind::Namespace { .. } if slot == 0 => Gate::Region(Phase::Declare),
            NodeKind::Namespace { .. } => member_or_body(0),
            NodeKind::TypeDecl(decl) => member_or_body(decl.base_count),
            NodeKind::Using { .. } => Gate::Region(Phase::Signatures),
            NodeKind::Field { .. } => member_or_body(1),
            NodeKind::Method(_) | NodeKind::OperatorDecl { .. } => match slot {
                0 => Gate::Region(Phase::Signatures),
                1 => Gate::Region(Phase::Bodies),
                _ => Gate::Structural,
            },
            NodeKind::Parameter { .. } | NodeKind::Property { .. } if slot == 0 => {
                Gate::Region(Phase::Signatures)
            }
            NodeKind::Parameter { .. }
            | NodeKind::Property { .. }
            | NodeKind::EnumMember { .. }
            | NodeKind::Accessor { .. } => Gate::Region(Phase::Bodies),
            _ => Gate::Inherit,
        }
    }

    fn child_category(&self, parent: NodeId, slot: usize, category: Category) -> Category {
        match self.tree.kind(parent) {
            NodeKind::Using { is_static: true, .. } => Category::Type,
            NodeKind::Using { .. } => Category::Namespace,
            NodeKind::Namespace { .. } if slot == 0 => Category::Namespace,
            NodeKind::TypeDecl(decl) if slot < decl.base_count => Category::Type,
            NodeKind::Field { .. }
            | NodeKind::LocalDecl { .. }
            | NodeKind::Property { .. }
            | NodeKind::Parameter { .. }
            | NodeKind::Foreach { .. }
            | NodeKind::Cast
            | NodeKind::Typeof
            | NodeKind::New { .. }
            | NodeKind::Method(_)
            | NodeKind::OperatorDecl { .. }
                if slot == 0 =>
            {
                Category::Type
            }
            NodeKind::Binary { op, .. } if op.takes_type_operand() && slot == 1 => Category::Type,
            NodeKind::Binary { op, .. } if op.is_member_access() => match (category, slot) {
                (Category::Type | Category::Namespace, _) => category,
                (_, 0) => Category::Expression,
                _ => Category::Member,
            },
            NodeKind::Name(_) => Category::Type,
            _ => Category::Expression,
        }
    }

    fn complete(&mut self, node: NodeId, category: Category, flags: ResolveFlags) {
        match self.tree.kind(node).clone() {
            NodeKind::Name(_) => self.resolve_name(node, category, flags),
            NodeKind::Binary { op, .. } => {
                let operands: Vec<NodeId> = self.tree.child_nodes(node).collect();
                self.resolve_overload(node, op.overload_name(), &operands);
            }
            NodeKind::Unary { op, .. } => {
                let operands: Vec<NodeId> = self.tree.child_nodes(node).collect();
                self.resolve_overload(node, op.overload_name(), &operands);
            }
            kind if flags.phase == Phase::Signatures => self.sign(node, &kind),
            _ => {}
        }
    }

    fn report(&mut self, node: NodeId, error: &ResolveError) {
        let diagnostic = error.to_diagnostic(self.tree[node].span);
        self.tree.annotate(node, diagnostic.clone());
        self.diagnostics.push(diagnostic);
    }

    // ========================================================================
    // Declare
    // ========================================================================

    fn alive(&self, symbol: Option<SymbolId>) -> bool {
        symbol.is_some_and(|s| self.table.symbol_exists(s))
    }

    fn declare(&mut self, node: NodeId) {
        let tree_id = self.tree.id();
        match self.tree.kind(node).clone() {
            NodeKind::Namespace { .. } => {
                let path = self.namespace_path(node);
                self.table.find_or_create_path(&path);
            }
            NodeKind::TypeDecl(decl) => {
                if self.alive(decl.symbol) {
                    return;
                }
                let scope = self.declaring_scope(node);
                let symbol = Symbol::new(decl.name.clone(), SymbolKind::Type(decl.kind))
                    .with_arity(decl.type_params.len())
                    .with_static(decl.modifiers.is_static())
                    .with_origin(tree_id, node);
                let id = self.table.declare(scope, symbol);
                if let NodeKind::TypeDecl(decl) = &mut self.tree[node].kind {
                    decl.symbol = Some(id);
                }
            }
            NodeKind::Method(method) => {
                if self.alive(method.symbol) {
                    return;
                }
                let Some(scope) = self.member_scope(node) else {
                    return;
                };
                let symbol = if method.is_constructor {
                    Symbol::new(".ctor", SymbolKind::Constructor)
                } else {
                    Symbol::new(method.name.clone(), SymbolKind::Method)
                        .with_arity(method.type_params.len())
                };
                let symbol = symbol
                    .with_static(method.modifiers.is_static())
                    .with_origin(tree_id, node);
                let id = self.table.declare(scope, symbol);
                if let NodeKind::Method(method) = &mut self.tree[node].kind {
                    method.symbol = Some(id);
                }
            }
            NodeKind::OperatorDecl {
                symbol_text,
                symbol,
                ..
            } => {
                if self.alive(symbol) {
                    return;
                }
                let arity = self.tree.variadic_children(node).count();
                let (Some(scope), Some(name)) = (
                    self.member_scope(node),
                    operators::overload_name_for(&symbol_text, arity),
                ) else {
                    return;
                };
                let symbol = Symbol::new(name, SymbolKind::Operator)
                    .with_static(true)
                    .with_origin(tree_id, node);
                let id = self.table.declare(scope, symbol);
                if let NodeKind::OperatorDecl { symbol, .. } = &mut self.tree[node].kind {
                    *symbol = Some(id);
                }
            }
            NodeKind::Property {
                name,
                modifiers,
                symbol,
            } => {
                if self.alive(symbol) {
                    return;
                }
                let Some(scope) = self.member_scope(node) else {
                    return;
                };
                let symbol = Symbol::new(name, SymbolKind::Property)
                    .with_static(modifiers.is_static())
                    .with_origin(tree_id, node);
                let id = self.table.declare(scope, symbol);
                if let NodeKind::Property { symbol, .. } = &mut self.tree[node].kind {
                    *symbol = Some(id);
                }
            }
            NodeKind::Field { modifiers } => {
                let Some(scope) = self.member_scope(node) else {
                    return;
                };
                let declarators: Vec<NodeId> = self.tree.variadic_children(node).collect();
                for declarator in declarators {
                    let NodeKind::Declarator { name, symbol } = self.tree.kind(declarator).clone()
                    else {
                        continue;
                    };
                    if self.alive(symbol) {
                        continue;
                    }
                    let symbol = Symbol::new(name, SymbolKind::Field)
                        .with_static(modifiers.is_static())
                        .with_origin(tree_id, declarator);
                    let id = self.table.declare(scope, symbol);
                    if let NodeKind::Declarator { symbol, .. } = &mut self.tree[declarator].kind {
                        *symbol = Some(id);
                    }
                }
            }
            NodeKind::EnumMember { name, symbol } => {
                if self.alive(symbol) {
                    return;
                }
                let Some(scope) = self.member_scope(node) else {
                    return;
                };
                let owner = self.enclosing_types(node).first().copied();
                let symbol = Symbol::new(name, SymbolKind::EnumMember)
                    .with_static(true)
                    .with_type(owner)
                    .with_origin(tree_id, node);
                let id = self.table.declare(scope, symbol);
                if let NodeKind::EnumMember { symbol, .. } = &mut self.tree[node].kind {
                    *symbol = Some(id);
                }
            }
            _ => {}
        }
    }

    /// The full dotted name of a namespace declaration, outer namespaces
    /// included.
    fn namespace_path(&self, namespace: NodeId) -> String {
        let mut parts: Vec<String> = std::iter::once(namespace)
            .chain(self.tree.ancestors(namespace))
            .filter(|&n| matches!(self.tree.kind(n), NodeKind::Namespace { .. }))
            .filter_map(|n| self.tree.dotted_name(self.tree.child(n, 0)?))
            .collect();
        parts.reverse();
        parts.join(".")
    }

    /// The scope a type declared at `node` belongs to.
    fn declaring_scope(&self, node: NodeId) -> ScopeId {
        for ancestor in self.tree.ancestors(node) {
            match self.tree.kind(ancestor) {
                NodeKind::TypeDecl(decl) => {
                    if let Some(members) = decl.symbol.and_then(|s| self.table.symbol(s)?.members())
                    {
                        return members;
                    }
                }
                NodeKind::Namespace { .. } => {
                    return self.table.find_or_create_path(&self.namespace_path(ancestor));
                }
                _ => {}
            }
        }
        self.table.root()
    }

    /// The member scope of the type enclosing a member declaration.
    fn member_scope(&self, node: NodeId) -> Option<ScopeId> {
        let owner = *self.enclosing_types(node).first()?;
        self.table.symbol(owner)?.members()
    }

    // ========================================================================
    // Signatures
    // ========================================================================

    fn sign(&mut self, node: NodeId, kind: &NodeKind) {
        match kind {
            NodeKind::TypeDecl(decl) => {
                let Some(id) = decl.symbol else { return };
                let nodes: Vec<NodeId> = (0..decl.base_count)
                    .filter_map(|slot| self.tree.child(node, slot))
                    .collect();
                let bases: Vec<SymbolId> = nodes
                    .into_iter()
                    .filter_map(|base| self.type_symbol(base))
                    .collect();
                self.table.update_symbol(id, |s| s.bases = bases);
            }
            NodeKind::Method(method) => {
                let Some(id) = method.symbol else { return };
                let ty = if method.is_constructor {
                    self.enclosing_types(node).first().copied()
                } else {
                    self.tree.child(node, 0).and_then(|t| self.type_symbol(t))
                };
                let params = self.parameter_types(node);
                self.table.update_symbol(id, |s| {
                    s.ty = ty;
                    s.params = params;
                });
            }
            NodeKind::OperatorDecl { symbol, .. } => {
                let Some(id) = *symbol else { return };
                let ty = self.tree.child(node, 0).and_then(|t| self.type_symbol(t));
                let params = self.parameter_types(node);
                self.table.update_symbol(id, |s| {
                    s.ty = ty;
                    s.params = params;
                });
            }
            NodeKind::Property { symbol, .. } => {
                let Some(id) = *symbol else { return };
                let ty = self.tree.child(node, 0).and_then(|t| self.type_symbol(t));
                self.table.update_symbol(id, |s| s.ty = ty);
            }
            NodeKind::Field { .. } => {
                let ty = self.tree.child(node, 0).and_then(|t| self.type_symbol(t));
                let declarators: Vec<NodeId> = self.tree.variadic_children(node).collect();
                for declarator in declarators {
                    if let NodeKind::Declarator {
                        symbol: Some(id), ..
                    } = self.tree.kind(declarator)
                    {
                        self.table.update_symbol(*id, |s| s.ty = ty);
                    }
                }
            }
            _ => {}
        }
    }

    fn parameter_types(&mut self, node: NodeId) -> Vec<Option<SymbolId>> {
        let params: Vec<NodeId> = self.tree.variadic_children(node).collect();
        params
            .into_iter()
            .map(|p| self.tree.child(p, 0).and_then(|t| self.type_symbol(t)))
            .collect()
    }

    /// The type symbol a type expression denotes. Arrays have no symbol.
    fn type_symbol(&mut self, node: NodeId) -> Option<SymbolId> {
        let name = self.tree.rightmost_name(node)?;
        if self.tree.kind(name).as_name()?.rank > 0 {
            return None;
        }
        match self.tree.referent(name, self.table)? {
            Referent::Symbol(symbol) => self
                .table
                .symbol(symbol)
                .filter(|s| s.kind.is_type())
                .map(|_| symbol),
            Referent::Scope(_) | Referent::Local(_) | Referent::Inferred => None,
        }
    }

    // ========================================================================
    // Names
    // ========================================================================

    fn resolve_name(&mut self, id: NodeId, category: Category, flags: ResolveFlags) {
        if let Some(node) = self.tree.get_mut(id) {
            node.annotations
                .retain(|d| d.category != DiagnosticCategory::Resolution);
        }
        if self.tree.referent(id, self.table).is_some() {
            return;
        }
        let Some(name) = self.tree.kind(id).as_name().cloned() else {
            return;
        };
        let call = self.call_arguments(id);
        let parent = self.tree.parent(id);
        let parent_op = parent.and_then(|p| self.tree.kind(p).binary_op());
        let result = match (parent, parent_op, self.tree.slot_of(id)) {
            (_, Some(BinaryOperator::AliasQualifier), Some(0)) if name.name == "global" => {
                Ok(Some(Referent::Scope(self.table.root())))
            }
            _ if category == Category::Namespace => self.resolve_namespace_name(id, &name),
            (Some(access), Some(op), Some(1)) if op.is_member_access() => {
                self.lookup_member(access, &name, category, call.as_deref())
            }
            _ => self.lookup_lexical(id, &name, category, call.as_deref()),
        };
        match result {
            Ok(Some(referent)) => {
                trace!(name = %name.name, ?referent, "resolved");
                if let NodeKind::Name(name) = &mut self.tree[id].kind {
                    name.resolve(referent);
                }
            }
            Ok(None) => {}
            Err(error) if flags.quiet => trace!(%error, "quiet miss"),
            Err(error) => self.report(id, &error),
        }
    }

    /// Static types of the arguments when `name` is being called.
    fn call_arguments(&mut self, name: NodeId) -> Option<Vec<Option<SymbolId>>> {
        let mut callee = name;
        if let Some(parent) = self.tree.parent(name)
            && self.tree.kind(parent).binary_op().is_some_and(BinaryOperator::is_member_access)
            && self.tree.slot_of(name) == Some(1)
        {
            callee = parent;
        }
        let call = self.tree.parent(callee)?;
        if !matches!(self.tree.kind(call), NodeKind::Call) || self.tree.slot_of(callee) != Some(0) {
            return None;
        }
        let args: Vec<NodeId> = self.tree.variadic_children(call).collect();
        Some(args.into_iter().map(|a| self.static_type(a)).collect())
    }

    fn lookup_lexical(
        &mut self,
        id: NodeId,
        name: &NameRef,
        category: Category,
        call: Option<&[Option<SymbolId>]>,
    ) -> Result<Option<Referent>, ResolveError> {
        if !name.keyword {
            if category == Category::Expression
                && name.arity == 0
                && let Some(local) = self.find_local(id, &name.name)
            {
                return Ok(Some(Referent::Local(local)));
            }
            if name.arity == 0
                && matches!(category, Category::Expression | Category::Type)
                && let Some(owner) = self.find_type_parameter(id, &name.name)
            {
                return Ok(Some(Referent::Local(owner)));
            }
            for ty in self.enclosing_types(id) {
                if let Some(found) = self.lookup_in_type(ty, name, category, call)? {
                    return Ok(Some(found));
                }
            }
            for scope in self.enclosing_namespaces(id) {
                if let Some(entry) = self.table.lookup(scope, &name.name)
                    && let Some(found) = self.choose(&entry, name, category, call)?
                {
                    return Ok(Some(found));
                }
            }
            if let Some(found) = self.lookup_in_usings(id, name, category)? {
                return Ok(Some(found));
            }
        }
        if let Some(alias) = self.table.keyword_alias(&name.name) {
            return Ok(Some(Referent::Symbol(alias)));
        }
        if category == Category::Type && name.name == "var" && name.arity == 0 {
            return Ok(Some(Referent::Inferred));
        }
        Err(ResolveError::NotFound {
            name: name.arity_name(),
        })
    }

    fn lookup_member(
        &mut self,
        access: NodeId,
        name: &NameRef,
        category: Category,
        call: Option<&[Option<SymbolId>]>,
    ) -> Result<Option<Referent>, ResolveError> {
        let Some(left) = self.tree.child(access, 0) else {
            return Ok(None);
        };
        let (found, container) = match self.denotation(left) {
            Denotation::Scope(scope) => {
                let found = match self.table.lookup(scope, &name.name) {
                    Some(entry) => self.choose(&entry, name, category, call)?,
                    None => None,
                };
                (found, self.table.scope_name(scope))
            }
            Denotation::Type(ty) | Denotation::Value(Some(ty)) => (
                self.lookup_in_type(ty, name, category, call)?,
                self.table.full_name(ty).unwrap_or_default(),
            ),
            Denotation::Value(None) | Denotation::Unknown => return Ok(None),
        };
        match found {
            Some(found) => Ok(Some(found)),
            None if container.is_empty() => Err(ResolveError::NotFound {
                name: name.arity_name(),
            }),
            None => Err(ResolveError::NoMember {
                container,
                member: name.arity_name(),
            }),
        }
    }

    /// Resolves one segment of a namespace name, creating the namespace if
    /// it does not exist yet. Inside a `using` directive an existing type
    /// wins, so aliases can name types.
    fn resolve_namespace_name(
        &mut self,
        id: NodeId,
        name: &NameRef,
    ) -> Result<Option<Referent>, ResolveError> {
        let base = match self.tree.parent(id) {
            Some(parent)
                if self.tree.kind(parent).binary_op().is_some_and(BinaryOperator::is_member_access)
                    && self.tree.slot_of(id) == Some(1) =>
            {
                let Some(left) = self.tree.child(parent, 0) else {
                    return Ok(None);
                };
                match self.denotation(left) {
                    Denotation::Scope(scope) => scope,
                    Denotation::Type(ty) => return self.lookup_in_type(ty, name, Category::Type, None),
                    Denotation::Value(_) | Denotation::Unknown => return Ok(None),
                }
            }
            _ => self.namespace_base(id),
        };
        let in_using = self
            .tree
            .ancestors(id)
            .any(|a| matches!(self.tree.kind(a), NodeKind::Using { .. }));
        if in_using
            && let Some(entry) = self.table.lookup(base, &name.name)
            && let Some(found @ Referent::Symbol(_)) =
                self.choose(&entry, name, Category::Type, None)?
        {
            return Ok(Some(found));
        }
        Ok(Some(Referent::Scope(
            self.table.find_or_create_child(base, &name.name),
        )))
    }

    /// Where the first segment of a namespace name is looked up: the root
    /// for `using` targets, otherwise the namespace around the declaration
    /// that names it.
    fn namespace_base(&self, id: NodeId) -> ScopeId {
        if self
            .tree
            .ancestors(id)
            .any(|a| matches!(self.tree.kind(a), NodeKind::Using { .. }))
        {
            return self.table.root();
        }
        let mut namespaces = self
            .tree
            .ancestors(id)
            .filter(|&a| matches!(self.tree.kind(a), NodeKind::Namespace { .. }));
        match (namespaces.next(), namespaces.next()) {
            (Some(_), Some(outer)) => self.table.find_or_create_path(&self.namespace_path(outer)),
            _ => self.table.root(),
        }
    }

    fn denotation(&mut self, id: NodeId) -> Denotation {
        match self.tree.kind(id) {
            NodeKind::Name(_) => match self.tree.referent(id, self.table) {
                Some(Referent::Scope(scope)) => Denotation::Scope(scope),
                Some(Referent::Symbol(symbol)) => match self.table.symbol(symbol) {
                    Some(s) if s.kind.is_type() => Denotation::Type(symbol),
                    Some(s) => Denotation::Value(s.ty),
                    None => Denotation::Unknown,
                },
                Some(Referent::Local(_)) => Denotation::Value(self.static_type(id)),
                Some(Referent::Inferred) | None => Denotation::Unknown,
            },
            NodeKind::Binary { op, .. } if op.is_member_access() => match self.tree.child(id, 1) {
                Some(right) => self.denotation(right),
                None => Denotation::Unknown,
            },
            _ => Denotation::Value(self.static_type(id)),
        }
    }

    /// Picks the entity an entry provides for `name` in `category`.
    fn choose(
        &self,
        entry: &Entry,
        name: &NameRef,
        category: Category,
        call: Option<&[Option<SymbolId>]>,
    ) -> Result<Option<Referent>, ResolveError> {
        let mut candidates: Vec<Entity> = entry
            .entities()
            .iter()
            .copied()
            .filter(|&e| self.fits(e, name, category))
            .collect();
        if let Some(args) = call {
            candidates = self.narrow_calls(candidates, args);
        }
        if candidates.len() > 1 && category != Category::Namespace {
            // A type or member hides a namespace of the same name.
            let symbols: Vec<Entity> = candidates
                .iter()
                .copied()
                .filter(|e| matches!(e, Entity::Symbol(_)))
                .collect();
            if !symbols.is_empty() {
                candidates = symbols;
            }
        }
        match candidates.as_slice() {
            [] => Ok(None),
            [Entity::Scope(scope)] => Ok(Some(Referent::Scope(*scope))),
            [Entity::Symbol(symbol)] => Ok(Some(Referent::Symbol(*symbol))),
            many => Err(ResolveError::Ambiguous {
                name: name.arity_name(),
                count: many.len(),
            }),
        }
    }

    fn fits(&self, entity: Entity, name: &NameRef, category: Category) -> bool {
        let symbol = match entity {
            Entity::Scope(_) => {
                return name.arity == 0 && category != Category::OperatorOverload;
            }
            Entity::Symbol(id) => match self.table.symbol(id) {
                Some(symbol) => symbol,
                None => return false,
            },
        };
        match category {
            Category::Namespace => false,
            Category::OperatorOverload => symbol.kind == SymbolKind::Operator,
            Category::Type => symbol.kind.is_type() && symbol.arity == name.arity,
            Category::Expression | Category::Member => match symbol.kind {
                SymbolKind::Type(_) => symbol.arity == name.arity,
                SymbolKind::Method => name.arity == 0 || symbol.arity == name.arity,
                SymbolKind::Constructor | SymbolKind::Operator => false,
                SymbolKind::Field | SymbolKind::Property | SymbolKind::EnumMember => {
                    name.arity == 0
                }
            },
        }
    }

    /// Narrows callable candidates by argument count, then by argument
    /// types. Non-callable candidates are kept.
    fn narrow_calls(&self, candidates: Vec<Entity>, args: &[Option<SymbolId>]) -> Vec<Entity> {
        let (callables, mut others): (Vec<Entity>, Vec<Entity>) =
            candidates.into_iter().partition(|e| match e {
                Entity::Symbol(id) => self
                    .table
                    .symbol(*id)
                    .is_some_and(|s| s.kind.is_callable()),
                Entity::Scope(_) => false,
            });
        let ids = callables
            .into_iter()
            .filter_map(|e| match e {
                Entity::Symbol(id) => Some(id),
                Entity::Scope(_) => None,
            })
            .collect();
        others.extend(
            self.narrow_signatures(ids, args)
                .into_iter()
                .map(Entity::Symbol),
        );
        others
    }

    /// Keeps the signatures that accept `args`; among several, prefers the
    /// single exact match.
    fn narrow_signatures(&self, candidates: Vec<SymbolId>, args: &[Option<SymbolId>]) -> Vec<SymbolId> {
        let signatures: Vec<(SymbolId, Symbol)> = candidates
            .into_iter()
            .filter_map(|id| Some((id, self.table.symbol(id)?)))
            .filter(|(_, s)| s.params.len() == args.len())
            .collect();
        let compatible: Vec<&(SymbolId, Symbol)> = signatures
            .iter()
            .filter(|(_, s)| {
                s.params
                    .iter()
                    .zip(args)
                    .all(|(p, a)| p.is_none() || a.is_none() || p == a)
            })
            .collect();
        if compatible.len() > 1 {
            let exact: Vec<SymbolId> = compatible
                .iter()
                .filter(|(_, s)| s.params.iter().zip(args).all(|(p, a)| p.is_some() && p == a))
                .map(|(id, _)| *id)
                .collect();
            if exact.len() == 1 {
                return exact;
            }
        }
        compatible.into_iter().map(|(id, _)| *id).collect()
    }

    /// Looks `name` up among the members of `ty` and its base types, then
    /// `object`.
    fn lookup_in_type(
        &self,
        ty: SymbolId,
        name: &NameRef,
        category: Category,
        call: Option<&[Option<SymbolId>]>,
    ) -> Result<Option<Referent>, ResolveError> {
        let mut queue = VecDeque::from([ty]);
        queue.extend(self.table.keyword_alias("object"));
        let mut seen = HashSet::new();
        while let Some(current) = queue.pop_front() {
            if !seen.insert(current) {
                continue;
            }
            let Some(symbol) = self.table.symbol(current) else {
                continue;
            };
            if let Some(members) = symbol.members()
                && let Some(entry) = self.table.lookup(members, &name.name)
                && let Some(found) = self.choose(&entry, name, category, call)?
            {
                return Ok(Some(found));
            }
            // Bases before the trailing `object`.
            for base in symbol.bases.iter().rev() {
                queue.push_front(*base);
            }
        }
        Ok(None)
    }

    fn lookup_in_usings(
        &mut self,
        id: NodeId,
        name: &NameRef,
        category: Category,
    ) -> Result<Option<Referent>, ResolveError> {
        let containers: Vec<NodeId> = self
            .tree
            .ancestors(id)
            .filter(|&a| {
                matches!(
                    self.tree.kind(a),
                    NodeKind::CompilationUnit | NodeKind::Namespace { .. }
                )
            })
            .collect();
        for container in containers {
            let usings: Vec<NodeId> = self
                .tree
                .child_nodes(container)
                .filter(|&c| matches!(self.tree.kind(c), NodeKind::Using { .. }))
                .collect();
            for using in usings {
                if id == using || self.tree.ancestors(id).any(|a| a == using) {
                    continue;
                }
                let NodeKind::Using { alias, is_static } = self.tree.kind(using).clone() else {
                    continue;
                };
                let Some(target) = self.tree.child(using, 0).and_then(|t| self.tree.rightmost_name(t))
                else {
                    continue;
                };
                let referent = self.tree.referent(target, self.table);
                match (alias, referent) {
                    (Some(alias), Some(referent)) => {
                        if alias == name.name && name.arity == 0 {
                            return Ok(Some(referent));
                        }
                    }
                    (None, Some(Referent::Symbol(ty))) if is_static => {
                        if let Some(found) = self.lookup_in_type(ty, name, category, None)? {
                            return Ok(Some(found));
                        }
                    }
                    (None, Some(Referent::Scope(scope))) => {
                        // Imports the namespace's types, not its namespaces.
                        if let Some(entry) = self.table.lookup(scope, &name.name)
                            && let Some(found @ Referent::Symbol(_)) =
                                self.choose(&entry, name, category, None)?
                        {
                            return Ok(Some(found));
                        }
                    }
                    _ => {}
                }
            }
        }
        Ok(None)
    }

    // ========================================================================
    // Lexical context
    // ========================================================================

    /// Type symbols of the enclosing type declarations, innermost first.
    fn enclosing_types(&self, id: NodeId) -> Vec<SymbolId> {
        self.tree
            .ancestors(id)
            .filter_map(|a| match self.tree.kind(a) {
                NodeKind::TypeDecl(decl) => decl.symbol,
                _ => None,
            })
            .filter(|&s| self.table.symbol_exists(s))
            .collect()
    }

    /// The enclosing namespace scopes from the innermost to the root.
    fn enclosing_namespaces(&self, id: NodeId) -> Vec<ScopeId> {
        let innermost = self
            .tree
            .ancestors(id)
            .find(|&a| matches!(self.tree.kind(a), NodeKind::Namespace { .. }))
            .and_then(|ns| self.table.find(&self.namespace_path(ns)));
        let mut scopes = Vec::new();
        let mut current = innermost.or_else(|| Some(self.table.root()));
        while let Some(scope) = current {
            scopes.push(scope);
            current = self.table.scope_parent(scope);
        }
        scopes
    }

    /// Finds the declaration of a local, parameter, `foreach` variable or
    /// accessor `value` visible at `id`.
    fn find_local(&self, id: NodeId, name: &str) -> Option<NodeId> {
        let declared_in = |decl: NodeId, before: usize| {
            self.tree
                .variadic_children(decl)
                .take_while(|&d| self.tree.slot_of(d).is_some_and(|s| s < before))
                .find(|&d| matches!(self.tree.kind(d), NodeKind::Declarator { name: n, .. } if n == name))
        };
        let mut child = id;
        for ancestor in self.tree.ancestors(id) {
            let slot = self.tree.slot_of(child).unwrap_or(usize::MAX);
            let found = match self.tree.kind(ancestor) {
                NodeKind::Block | NodeKind::CompilationUnit => self
                    .tree
                    .child_nodes(ancestor)
                    .take_while(|&s| s != child)
                    .filter(|&s| matches!(self.tree.kind(s), NodeKind::LocalDecl { .. }))
                    .find_map(|s| declared_in(s, usize::MAX)),
                NodeKind::LocalDecl { .. } => declared_in(ancestor, slot),
                NodeKind::For if slot != 0 => self
                    .tree
                    .child(ancestor, 0)
                    .filter(|&init| matches!(self.tree.kind(init), NodeKind::LocalDecl { .. }))
                    .and_then(|init| declared_in(init, usize::MAX)),
                NodeKind::Foreach { name: n } if slot == 2 && n == name => Some(ancestor),
                NodeKind::Method(_) | NodeKind::OperatorDecl { .. } => self
                    .tree
                    .variadic_children(ancestor)
                    .find(|&p| matches!(self.tree.kind(p), NodeKind::Parameter { name: n, .. } if n == name)),
                NodeKind::Accessor {
                    kind: AccessorKind::Set | AccessorKind::Init,
                    ..
                } if name == "value" => Some(ancestor),
                NodeKind::TypeDecl(_) | NodeKind::Namespace { .. } => return None,
                _ => None,
            };
            if found.is_some() {
                return found;
            }
            child = ancestor;
        }
        None
    }

    /// Finds the type or method declaring a type parameter named `name`.
    fn find_type_parameter(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.tree.ancestors(id).find(|&a| match self.tree.kind(a) {
            NodeKind::TypeDecl(decl) => decl.type_params.iter().any(|p| p == name),
            NodeKind::Method(method) => method.type_params.iter().any(|p| p == name),
            _ => false,
        })
    }

    // ========================================================================
    // Operators and static types
    // ========================================================================

    fn resolve_overload(&mut self, node: NodeId, name: Option<&'static str>, operands: &[NodeId]) {
        let found = match name {
            Some(name) => {
                let types: Vec<Option<SymbolId>> =
                    operands.iter().map(|&o| self.static_type(o)).collect();
                self.find_overload(name, &types)
            }
            None => None,
        };
        match &mut self.tree[node].kind {
            NodeKind::Binary { overload, .. } | NodeKind::Unary { overload, .. } => {
                *overload = found;
            }
            _ => {}
        }
    }

    /// Quietly looks up a user operator declaration by its overload name
    /// in the operand types. Absence is the normal case.
    fn find_overload(&self, name: &str, operand_types: &[Option<SymbolId>]) -> Option<SymbolId> {
        let reference = NameRef::new(name);
        let mut candidates = Vec::new();
        for ty in operand_types.iter().flatten() {
            let Some(members) = self.table.symbol(*ty).and_then(|s| s.members()) else {
                continue;
            };
            let Some(entry) = self.table.lookup(members, &reference.name) else {
                continue;
            };
            for entity in entry.entities() {
                if let Entity::Symbol(id) = *entity
                    && self.fits(*entity, &reference, Category::OperatorOverload)
                    && !candidates.contains(&id)
                {
                    candidates.push(id);
                }
            }
        }
        match self.narrow_signatures(candidates, operand_types).as_slice() {
            [one] => {
                trace!(operator = name, symbol = %one, "overload found");
                Some(*one)
            }
            _ => None,
        }
    }

    fn keyword_type(&self, keyword: &str) -> Option<SymbolId> {
        self.table.keyword_alias(keyword)
    }

    /// The static type of an expression: enough to pick overloads and
    /// member targets, not a type checker.
    pub fn static_type(&mut self, node: NodeId) -> Option<SymbolId> {
        stacker::maybe_grow(32 * 1024, 256 * 1024, || self.static_type_inner(node))
    }

    fn static_type_inner(&mut self, node: NodeId) -> Option<SymbolId> {
        match self.tree.get(node)?.kind.clone() {
            NodeKind::Literal { kind, text } => self.literal_type(kind, &text),
            NodeKind::Name(_) => match self.tree.referent(node, self.table)? {
                Referent::Symbol(symbol) => {
                    let symbol = self.table.symbol(symbol)?;
                    if symbol.kind.is_type() || symbol.kind.is_callable() {
                        None
                    } else {
                        symbol.ty
                    }
                }
                Referent::Local(decl) => self.local_type(decl),
                Referent::Scope(_) | Referent::Inferred => None,
            },
            NodeKind::This => self.enclosing_types(node).first().copied(),
            NodeKind::Base => {
                let ty = *self.enclosing_types(node).first()?;
                self.table.symbol(ty)?.bases.first().copied()
            }
            NodeKind::Binary { op, overload } => self.binary_type(node, op, overload),
            NodeKind::Unary { op, overload } => {
                if let Some(ty) = overload.and_then(|o| self.table.symbol(o)?.ty) {
                    return Some(ty);
                }
                if op == UnaryOperator::Not {
                    return self.keyword_type("bool");
                }
                let operand = self.tree.child(node, 0)?;
                self.static_type(operand)
            }
            NodeKind::Conditional => {
                let then = self.tree.child(node, 1);
                let otherwise = self.tree.child(node, 2);
                then.and_then(|t| self.static_type(t))
                    .or_else(|| otherwise.and_then(|o| self.static_type(o)))
            }
            NodeKind::Call => {
                let callee = self.tree.child(node, 0)?;
                let name = self.tree.rightmost_name(callee)?;
                match self.tree.referent(name, self.table)? {
                    Referent::Symbol(symbol) => {
                        let symbol = self.table.symbol(symbol)?;
                        symbol.kind.is_callable().then_some(symbol.ty).flatten()
                    }
                    _ => None,
                }
            }
            NodeKind::New { array: false } | NodeKind::Cast => {
                let ty = self.tree.child(node, 0)?;
                self.type_symbol(ty)
            }
            NodeKind::Index => {
                let target = self.tree.child(node, 0)?;
                let string = self.keyword_type("string");
                if string.is_some() && self.static_type(target) == string {
                    self.keyword_type("char")
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    fn literal_type(&self, kind: LiteralKind, text: &str) -> Option<SymbolId> {
        let keyword = match kind {
            LiteralKind::Integer => {
                let lower = text.to_ascii_lowercase();
                if lower.ends_with("ul") || lower.ends_with("lu") {
                    "ulong"
                } else if lower.ends_with('l') {
                    "long"
                } else if lower.ends_with('u') && !lower.starts_with("0x") {
                    "uint"
                } else {
                    "int"
                }
            }
            LiteralKind::Float => match text.chars().last() {
                Some('f' | 'F') => "float",
                Some('m' | 'M') => "decimal",
                _ => "double",
            },
            LiteralKind::String | LiteralKind::InterpolatedString => "string",
            LiteralKind::Character => "char",
            LiteralKind::Boolean => "bool",
            LiteralKind::Null => return None,
        };
        self.keyword_type(keyword)
    }

    /// The declared type of a local, parameter or `foreach` variable.
    fn local_type(&mut self, decl: NodeId) -> Option<SymbolId> {
        match self.tree.get(decl)?.kind.clone() {
            NodeKind::Declarator { .. } => {
                let owner = self.tree.parent(decl)?;
                let ty = self.tree.child(owner, 0)?;
                if self.is_inferred(ty) {
                    let init = self.tree.child(decl, 0)?;
                    self.static_type(init)
                } else {
                    self.type_symbol(ty)
                }
            }
            NodeKind::Parameter { .. } | NodeKind::Foreach { .. } => {
                let ty = self.tree.child(decl, 0)?;
                self.type_symbol(ty)
            }
            NodeKind::Accessor { .. } => {
                let property = self.tree.parent(decl)?;
                let ty = self.tree.child(property, 0)?;
                self.type_symbol(ty)
            }
            _ => None,
        }
    }

    fn is_inferred(&mut self, ty: NodeId) -> bool {
        matches!(self.tree.referent(ty, self.table), Some(Referent::Inferred))
    }

    fn binary_type(
        &mut self,
        node: NodeId,
        op: BinaryOperator,
        overload: Option<SymbolId>,
    ) -> Option<SymbolId> {
        if let Some(ty) = overload.and_then(|o| self.table.symbol(o)?.ty) {
            return Some(ty);
        }
        let left = self.tree.child(node, 0);
        let right = self.tree.child(node, 1);
        if op.is_member_access() {
            return right.and_then(|r| self.static_type(r));
        }
        if op.is_comparison() {
            return self.keyword_type("bool");
        }
        match op {
            BinaryOperator::As => right.and_then(|r| self.type_symbol(r)),
            BinaryOperator::NullCoalescing => left
                .and_then(|l| self.static_type(l))
                .or_else(|| right.and_then(|r| self.static_type(r))),
            _ if op.is_assignment() => left.and_then(|l| self.static_type(l)),
            BinaryOperator::LeftShift | BinaryOperator::RightShift => {
                let left = left.and_then(|l| self.static_type(l))?;
                Some(self.promote(left, left))
            }
            _ => {
                let left = left.and_then(|l| self.static_type(l));
                let right = right.and_then(|r| self.static_type(r));
                let string = self.keyword_type("string");
                if op == BinaryOperator::Add && string.is_some() && (left == string || right == string)
                {
                    return string;
                }
                match (left, right) {
                    (Some(l), Some(r)) => Some(self.promote(l, r)),
                    (one, other) => one.or(other),
                }
            }
        }
    }

    /// Binary numeric promotion over the built-in numeric types; anything
    /// else keeps the left type.
    fn promote(&self, left: SymbolId, right: SymbolId) -> SymbolId {
        const RANKS: &[&[&str]] = &[
            &["sbyte", "byte", "short", "ushort", "char", "int"],
            &["uint"],
            &["long"],
            &["ulong"],
            &["float"],
            &["double"],
            &["decimal"],
        ];
        let rank = |ty: SymbolId| {
            RANKS.iter().position(|group| {
                group
                    .iter()
                    .any(|k| self.keyword_type(k) == Some(ty))
            })
        };
        match (rank(left), rank(right)) {
            (Some(l), Some(r)) => {
                let keyword = RANKS[l.max(r)].last().copied().unwrap_or("int");
                self.keyword_type(keyword).unwrap_or(left)
            }
            _ => left,
        }
    }
}

/// Returns the name of the symbol a name node is bound to, for display.
#[must_use]
pub fn referent_name(table: &NameTable, referent: Referent) -> Option<EcoString> {
    match referent {
        Referent::Symbol(symbol) => table.full_name(symbol),
        Referent::Scope(scope) => Some(table.scope_name(scope)),
        Referent::Local(_) | Referent::Inferred => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_analysis::{parse, parse_expression};

    fn resolved(source: &str) -> (SyntaxTree, NameTable, Vec<Diagnostic>) {
        let table = NameTable::new();
        let mut tree = parse(source).tree;
        let diagnostics = resolve_tree(&mut tree, &table);
        (tree, table, diagnostics)
    }

    fn names<'t>(tree: &'t SyntaxTree, text: &'t str) -> impl Iterator<Item = NodeId> + 't {
        let root = tree.root().unwrap();
        tree.preorder(root)
            .filter(move |&n| tree.kind(n).as_name().is_some_and(|name| name.name == text))
    }

    fn referent(tree: &SyntaxTree, id: NodeId) -> Option<Referent> {
        tree.kind(id).as_name()?.raw_referent()
    }

    const GEOMETRY: &str = "\
namespace Geometry
{
    public struct Vector
    {
        public double X;
        public double Y;
        public Vector(double x, double y) { X = x; Y = y; }
        public double Length => X * X + Y * Y;
        public static Vector operator +(Vector a, Vector b) => new Vector(a.X + b.X, a.Y + b.Y);
        public Vector Scale(double factor) { return new Vector(X * factor, Y * factor); }
    }

    class Shapes
    {
        Vector Sum(Vector a, Vector b) { var c = a + b; return c.Scale(2.0); }
        double Total(Vector a) { return a.Length + a.X; }
    }
}
";

    #[test]
    fn declares_namespaces_types_and_members() {
        let (_, table, diagnostics) = resolved(GEOMETRY);
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        let Some(Entry::Single(Entity::Symbol(vector))) = table.lookup_path("Geometry.Vector")
        else {
            panic!("Vector not declared");
        };
        let members = table.symbol(vector).unwrap().members().unwrap();
        assert!(table.lookup(members, "op_Addition").is_some());
        assert!(table.lookup(members, ".ctor").is_some());
        let x = table.lookup(members, "X").unwrap().single().unwrap();
        let Entity::Symbol(x) = x else { panic!() };
        assert_eq!(table.symbol(x).unwrap().ty, table.keyword_alias("double"));
    }

    #[test]
    fn binary_operator_finds_user_overload() {
        let (tree, table, _) = resolved(GEOMETRY);
        let root = tree.root().unwrap();
        let sum = tree
            .preorder(root)
            .find(|&n| {
                matches!(
                    tree.kind(n),
                    NodeKind::Binary {
                        op: BinaryOperator::Add,
                        overload: Some(_)
                    }
                )
            })
            .expect("overloaded addition");
        let NodeKind::Binary {
            overload: Some(overload),
            ..
        } = tree.kind(sum)
        else {
            unreachable!()
        };
        assert_eq!(table.symbol(*overload).unwrap().name, "op_Addition");
    }

    #[test]
    fn builtin_operands_have_no_overload_and_no_diagnostics() {
        let table = NameTable::new();
        let mut tree = parse_expression("x == y").tree;
        let diagnostics = resolve_tree(&mut tree, &table);
        let root = tree.root().unwrap();
        assert!(matches!(
            tree.kind(root),
            NodeKind::Binary { overload: None, .. }
        ));
        // Only the operands are reported, never the missing overload.
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics.iter().all(|d| !d.message.contains("op_")));
    }

    #[test]
    fn members_resolve_through_static_types() {
        let (tree, table, _) = resolved(GEOMETRY);
        for scale in names(&tree, "Scale") {
            let Some(Referent::Symbol(symbol)) = referent(&tree, scale) else {
                panic!("Scale unresolved");
            };
            assert_eq!(table.symbol(symbol).unwrap().kind, SymbolKind::Method);
        }
        let length = names(&tree, "Length").next().unwrap();
        let Some(Referent::Symbol(property)) = referent(&tree, length) else {
            panic!("Length unresolved");
        };
        assert_eq!(table.symbol(property).unwrap().kind, SymbolKind::Property);
        assert!(!tree.has_unresolved(tree.root().unwrap(), &table));
    }

    #[test]
    fn locals_and_parameters_shadow_members() {
        let (tree, _, _) = resolved(
            "class C { int x; int F(int x) { return x; } int G() { int y = x; return y; } }",
        );
        let xs: Vec<NodeId> = names(&tree, "x").collect();
        assert_eq!(xs.len(), 2);
        assert!(matches!(referent(&tree, xs[0]), Some(Referent::Local(_))));
        assert!(matches!(referent(&tree, xs[1]), Some(Referent::Symbol(_))));
        let y = names(&tree, "y").next().unwrap();
        assert!(matches!(referent(&tree, y), Some(Referent::Local(_))));
    }

    #[test]
    fn forward_references_between_types() {
        let (_, _, diagnostics) = resolved("class A { B b; } class B : A { }");
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
    }

    #[test]
    fn undeclared_names_stay_unresolved() {
        let (tree, table, diagnostics) = resolved("class A { void F() { Missing(); } }");
        let root = tree.root().unwrap();
        assert!(tree.has_unresolved(root, &table));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("Missing"));
        let missing = names(&tree, "Missing").next().unwrap();
        assert_eq!(tree[missing].annotations.len(), 1);
    }

    #[test]
    fn usings_import_namespace_types() {
        let (tree, _, diagnostics) = resolved(
            "namespace Lib { class Widget { } }\n\
             namespace App { using Lib; class Main { Widget w; } }",
        );
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        let widget = names(&tree, "Widget").next().unwrap();
        assert!(matches!(referent(&tree, widget), Some(Referent::Symbol(_))));
    }

    #[test]
    fn using_alias_names_a_type() {
        let (_, _, diagnostics) = resolved(
            "namespace Lib { class Widget { } }\n\
             using W = Lib.Widget;\n\
             class Main { W w; }",
        );
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
    }

    #[test]
    fn generic_arity_selects_the_declaration() {
        let (tree, table, diagnostics) = resolved(
            "class Pair<T> { T first; } class Pair<T, U> { } class User { Pair<int, string> p; }",
        );
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        let pair = names(&tree, "Pair").next().unwrap();
        let Some(Referent::Symbol(symbol)) = referent(&tree, pair) else {
            panic!("Pair unresolved");
        };
        assert_eq!(table.symbol(symbol).unwrap().arity, 2);
        let t = names(&tree, "T").next().unwrap();
        assert!(matches!(referent(&tree, t), Some(Referent::Local(_))));
    }

    #[test]
    fn method_overloads_narrow_by_argument_types() {
        let (tree, table, diagnostics) = resolved(
            "class C { void F(int a) { } void F(string s) { } void G() { F(\"x\"); F(1); } }",
        );
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        let string = table.keyword_alias("string");
        let calls: Vec<SymbolId> = names(&tree, "F")
            .filter_map(|n| match referent(&tree, n) {
                Some(Referent::Symbol(s)) => Some(s),
                _ => None,
            })
            .collect();
        assert_eq!(calls.len(), 2);
        assert_eq!(table.symbol(calls[0]).unwrap().params, vec![string]);
        assert_ne!(calls[0], calls[1]);
    }

    #[test]
    fn resolution_is_idempotent() {
        let table = NameTable::new();
        let mut tree = parse("namespace N { class A { A Self() { return this; } } }").tree;
        resolve_tree(&mut tree, &table);
        let namespaces = table.namespace_count();
        let again = resolve_tree(&mut tree, &table);
        assert!(again.is_empty());
        assert_eq!(table.namespace_count(), namespaces);
        let Some(Entry::Single(_)) = table.lookup_path("N.A") else {
            panic!("A declared twice");
        };
    }

    #[test]
    fn removed_declarations_make_references_stale() {
        let table = NameTable::new();
        let mut tree = parse("class A { } class B { A a; }").tree;
        resolve_tree(&mut tree, &table);
        let a_ref = names(&tree, "A").next().unwrap();
        let Some(Referent::Symbol(a)) = referent(&tree, a_ref) else {
            panic!("A unresolved");
        };
        table.remove_symbol(a);
        assert!(tree.has_unresolved(tree.root().unwrap(), &table));
        assert_eq!(tree.referent(a_ref, &table), None);
        assert!(tree.has_unresolved(tree.root().unwrap(), &table));
    }

    #[test]
    fn static_types_of_expressions() {
        let table = NameTable::new();
        let mut tree = parse_expression("1 + 2.5").tree;
        let root = tree.root().unwrap();
        assert_eq!(static_type(&mut tree, &table, root), table.keyword_alias("double"));
        let mut tree = parse_expression("\"a\" + 1").tree;
        let root = tree.root().unwrap();
        assert_eq!(static_type(&mut tree, &table, root), table.keyword_alias("string"));
        let mut tree = parse_expression("1 < 2").tree;
        let root = tree.root().unwrap();
        assert_eq!(static_type(&mut tree, &table, root), table.keyword_alias("bool"));
    }

    #[test]
    fn accessor_value_and_foreach_variables() {
        let (tree, _, diagnostics) = resolved(
            "class C { int n; int N { get { return n; } set { n = value; } }\n\
             void F(int[] xs) { foreach (var x in xs) { n = x; } } }",
        );
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        let value = names(&tree, "value").next().unwrap();
        assert!(matches!(referent(&tree, value), Some(Referent::Local(_))));
    }
}
