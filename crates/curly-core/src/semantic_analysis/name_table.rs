// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The name table: namespaces, types and members by name.
//!
//! **DDD Context:** Semantic Analysis
//!
//! A [`NameTable`] is a handle to one root scope. Every scope maps names to
//! an [`Entry`]: a single entity, or a group of entities sharing the name
//! with different generic arities (or, for methods, different signatures).
//! The root also keeps a flat index from full dotted namespace name to
//! scope, so `find("A.B.C")` never walks segment by segment.
//!
//! All structural changes go through one mutex per root. Clone the handle
//! to share a table between parses; create a new one to isolate them.

use std::collections::HashMap;
use std::sync::Arc;

use cranelift_entity::{PrimaryMap, entity_impl};
use ecow::{EcoString, eco_format};
use parking_lot::Mutex;
use tracing::{debug, trace};

use super::builtins;
use crate::ast::{NodeId, TreeId, TypeKind, arity_qualified};

/// Handle to a scope: a namespace, a type body, or the root.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(u32);
entity_impl!(ScopeId, "scope");

/// Handle to a declared symbol. Ids of removed symbols are never reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(u32);
entity_impl!(SymbolId, "symbol");

/// Something a name can denote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    /// A namespace.
    Scope(ScopeId),
    /// A type or member.
    Symbol(SymbolId),
}

/// The value stored under one name in a scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Single(Entity),
    Group(Vec<Entity>),
}

impl Entry {
    /// The entities in this entry.
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        match self {
            Self::Single(entity) => std::slice::from_ref(entity),
            Self::Group(entities) => entities,
        }
    }

    /// Returns `true` for a group.
    #[must_use]
    pub const fn is_group(&self) -> bool {
        matches!(self, Self::Group(_))
    }

    /// The only entity, if the entry is single.
    #[must_use]
    pub const fn single(&self) -> Option<Entity> {
        match self {
            Self::Single(entity) => Some(*entity),
            Self::Group(_) => None,
        }
    }

    fn insert(&mut self, entity: Entity) {
        match self {
            Self::Single(existing) if *existing == entity => {}
            Self::Single(existing) => *self = Self::Group(vec![*existing, entity]),
            Self::Group(entities) => {
                if !entities.contains(&entity) {
                    entities.push(entity);
                }
            }
        }
    }

    /// Removes `entity`; returns `None` when nothing is left.
    fn without(self, entity: Entity) -> Option<Self> {
        match self {
            Self::Single(existing) if existing == entity => None,
            single @ Self::Single(_) => Some(single),
            Self::Group(mut entities) => {
                entities.retain(|e| *e != entity);
                match entities.len() {
                    0 => None,
                    1 => Some(Self::Single(entities[0])),
                    _ => Some(Self::Group(entities)),
                }
            }
        }
    }

    fn from_entities(mut entities: Vec<Entity>) -> Option<Self> {
        match entities.len() {
            0 => None,
            1 => entities.pop().map(Self::Single),
            _ => Some(Self::Group(entities)),
        }
    }
}

/// What kind of declaration a symbol is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Type(TypeKind),
    Method,
    Constructor,
    Field,
    Property,
    Operator,
    EnumMember,
}

impl SymbolKind {
    /// Returns `true` for type symbols.
    #[must_use]
    pub const fn is_type(self) -> bool {
        matches!(self, Self::Type(_))
    }

    /// Returns `true` for symbols invoked with an argument list.
    #[must_use]
    pub const fn is_callable(self) -> bool {
        matches!(self, Self::Method | Self::Constructor | Self::Operator)
    }

    /// Short human-readable name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Type(kind) => kind.keyword(),
            Self::Method => "method",
            Self::Constructor => "constructor",
            Self::Field => "field",
            Self::Property => "property",
            Self::Operator => "operator",
            Self::EnumMember => "enum member",
        }
    }
}

/// Where a symbol was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Origin {
    pub tree: TreeId,
    pub node: NodeId,
}

/// A declared type or member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// Bare name, without arity.
    pub name: EcoString,
    /// Generic arity.
    pub arity: usize,
    pub kind: SymbolKind,
    pub is_static: bool,
    /// Field or property type, method or operator return type.
    pub ty: Option<SymbolId>,
    /// Parameter types of methods, constructors and operators; `None` where
    /// the type is unknown.
    pub params: Vec<Option<SymbolId>>,
    /// Base types, for type symbols.
    pub bases: Vec<SymbolId>,
    /// The declaring tree node; `None` for built-ins.
    pub origin: Option<Origin>,
    scope: ScopeId,
    members: Option<ScopeId>,
}

impl Symbol {
    /// A symbol with no signature yet.
    #[must_use]
    pub fn new(name: impl Into<EcoString>, kind: SymbolKind) -> Self {
        Self {
            name: name.into(),
            arity: 0,
            kind,
            is_static: false,
            ty: None,
            params: Vec::new(),
            bases: Vec::new(),
            origin: None,
            scope: ScopeId::from_u32(0),
            members: None,
        }
    }

    #[must_use]
    pub fn with_arity(mut self, arity: usize) -> Self {
        self.arity = arity;
        self
    }

    #[must_use]
    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    #[must_use]
    pub fn with_type(mut self, ty: Option<SymbolId>) -> Self {
        self.ty = ty;
        self
    }

    #[must_use]
    pub fn with_params(mut self, params: Vec<Option<SymbolId>>) -> Self {
        self.params = params;
        self
    }

    #[must_use]
    pub fn with_origin(mut self, tree: TreeId, node: NodeId) -> Self {
        self.origin = Some(Origin { tree, node });
        self
    }

    /// The scope the symbol is declared in.
    #[must_use]
    pub const fn scope(&self) -> ScopeId {
        self.scope
    }

    /// The member scope of a type symbol.
    #[must_use]
    pub const fn members(&self) -> Option<ScopeId> {
        self.members
    }

    /// The name qualified with its arity.
    #[must_use]
    pub fn arity_name(&self) -> EcoString {
        arity_qualified(&self.name, self.arity)
    }
}

/// The kind of a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Root,
    Namespace,
    /// The member scope of a type.
    Type(SymbolId),
}

#[derive(Debug)]
struct Scope {
    name: EcoString,
    full_name: EcoString,
    kind: ScopeKind,
    parent: Option<ScopeId>,
    entries: HashMap<EcoString, Entry>,
}

#[derive(Debug)]
struct Root {
    root: ScopeId,
    scopes: PrimaryMap<ScopeId, Scope>,
    symbols: PrimaryMap<SymbolId, Option<Symbol>>,
    by_full_name: HashMap<EcoString, ScopeId>,
    keywords: HashMap<EcoString, SymbolId>,
}

/// Splits ``Name`N`` into the bare name and arity.
fn split_arity(name: &str) -> (&str, Option<usize>) {
    match name.split_once('`') {
        Some((bare, arity)) => match arity.parse() {
            Ok(arity) => (bare, Some(arity)),
            Err(_) => (name, None),
        },
        None => (name, None),
    }
}

impl Root {
    fn new() -> Self {
        let mut scopes = PrimaryMap::new();
        let root = scopes.push(Scope {
            name: EcoString::new(),
            full_name: EcoString::new(),
            kind: ScopeKind::Root,
            parent: None,
            entries: HashMap::new(),
        });
        Self {
            root,
            scopes,
            symbols: PrimaryMap::new(),
            by_full_name: HashMap::new(),
            keywords: HashMap::new(),
        }
    }

    fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id)?.as_ref()
    }

    fn arity_of(&self, entity: Entity) -> usize {
        match entity {
            Entity::Scope(_) => 0,
            Entity::Symbol(id) => self.symbol(id).map_or(0, |s| s.arity),
        }
    }

    fn qualify(&self, scope: ScopeId, name: &str) -> EcoString {
        let parent = &self.scopes[scope].full_name;
        if parent.is_empty() {
            EcoString::from(name)
        } else {
            eco_format!("{parent}.{name}")
        }
    }

    fn add(&mut self, scope: ScopeId, name: &str, entity: Entity) {
        let entries = &mut self.scopes[scope].entries;
        match entries.get_mut(name) {
            Some(entry) => entry.insert(entity),
            None => {
                entries.insert(name.into(), Entry::Single(entity));
            }
        }
    }

    fn remove(&mut self, scope: ScopeId, name: &str, entity: Entity) -> bool {
        let entries = &mut self.scopes[scope].entries;
        let Some(entry) = entries.remove(name) else {
            return false;
        };
        let found = entry.entities().contains(&entity);
        if let Some(rest) = entry.without(entity) {
            entries.insert(name.into(), rest);
        }
        found
    }

    fn child_namespace(&self, scope: ScopeId, name: &str) -> Option<ScopeId> {
        self.scopes[scope]
            .entries
            .get(name)?
            .entities()
            .iter()
            .find_map(|e| match e {
                Entity::Scope(s) => Some(*s),
                Entity::Symbol(_) => None,
            })
    }

    fn find_or_create_child(&mut self, scope: ScopeId, name: &str) -> ScopeId {
        if let Some(existing) = self.child_namespace(scope, name) {
            return existing;
        }
        let full_name = self.qualify(scope, name);
        let id = self.scopes.push(Scope {
            name: name.into(),
            full_name: full_name.clone(),
            kind: ScopeKind::Namespace,
            parent: Some(scope),
            entries: HashMap::new(),
        });
        self.add(scope, name, Entity::Scope(id));
        debug!(namespace = %full_name, "created namespace");
        self.by_full_name.insert(full_name, id);
        id
    }

    fn find_or_create_path(&mut self, path: &str) -> ScopeId {
        if path.is_empty() {
            return self.root;
        }
        if let Some(&id) = self.by_full_name.get(path) {
            return id;
        }
        path.split('.')
            .fold(self.root, |scope, segment| self.find_or_create_child(scope, segment))
    }

    fn lookup(&self, scope: ScopeId, name: &str) -> Option<Entry> {
        let (bare, arity) = split_arity(name);
        let entry = self.scopes.get(scope)?.entries.get(bare)?;
        match arity {
            None => Some(entry.clone()),
            Some(arity) => Entry::from_entities(
                entry
                    .entities()
                    .iter()
                    .copied()
                    .filter(|e| self.arity_of(*e) == arity)
                    .collect(),
            ),
        }
    }

    fn declare(&mut self, scope: ScopeId, mut symbol: Symbol) -> SymbolId {
        symbol.scope = scope;
        let name = symbol.name.clone();
        let is_type = symbol.kind.is_type();
        let full_name = self.qualify(scope, &symbol.arity_name());
        let id = self.symbols.push(Some(symbol));
        if is_type {
            let members = self.scopes.push(Scope {
                name: name.clone(),
                full_name: full_name.clone(),
                kind: ScopeKind::Type(id),
                parent: Some(scope),
                entries: HashMap::new(),
            });
            if let Some(Some(symbol)) = self.symbols.get_mut(id) {
                symbol.members = Some(members);
            }
        }
        self.add(scope, &name, Entity::Symbol(id));
        trace!(symbol = %full_name, "declared");
        id
    }

    fn remove_symbol(&mut self, id: SymbolId) -> bool {
        let Some(symbol) = self.symbols.get_mut(id).and_then(Option::take) else {
            return false;
        };
        self.remove(symbol.scope, &symbol.name, Entity::Symbol(id));
        if let Some(members) = symbol.members {
            let entries = std::mem::take(&mut self.scopes[members].entries);
            for entity in entries.values().flat_map(Entry::entities) {
                if let Entity::Symbol(member) = entity {
                    self.remove_symbol(*member);
                }
            }
        }
        self.keywords.retain(|_, target| *target != id);
        true
    }
}

/// A shareable handle to a root scope and every scope and symbol under it.
#[derive(Debug, Clone)]
pub struct NameTable {
    root: Arc<Mutex<Root>>,
}

impl Default for NameTable {
    fn default() -> Self {
        Self::new()
    }
}

impl NameTable {
    /// Creates a table holding the built-in `System` types and keyword
    /// aliases.
    #[must_use]
    pub fn new() -> Self {
        let table = Self::empty();
        builtins::register(&table);
        table
    }

    /// Creates a table with nothing in it.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            root: Arc::new(Mutex::new(Root::new())),
        }
    }

    /// Returns `true` if both handles share one root.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.root, &other.root)
    }

    /// The root scope.
    #[must_use]
    pub fn root(&self) -> ScopeId {
        self.root.lock().root
    }

    // ========================================================================
    // Scopes
    // ========================================================================

    /// Finds a namespace by its full dotted name.
    #[must_use]
    pub fn find(&self, full_name: &str) -> Option<ScopeId> {
        let root = self.root.lock();
        if full_name.is_empty() {
            return Some(root.root);
        }
        root.by_full_name.get(full_name).copied()
    }

    /// Finds the namespace `name` directly inside `scope`, creating it if
    /// needed.
    pub fn find_or_create_child(&self, scope: ScopeId, name: &str) -> ScopeId {
        self.root.lock().find_or_create_child(scope, name)
    }

    /// Finds the namespace with the given dotted path, creating every
    /// missing segment. Concurrent callers creating the same path get the
    /// same scopes.
    pub fn find_or_create_path(&self, path: &str) -> ScopeId {
        self.root.lock().find_or_create_path(path)
    }

    /// The kind of a scope.
    #[must_use]
    pub fn scope_kind(&self, scope: ScopeId) -> Option<ScopeKind> {
        self.root.lock().scopes.get(scope).map(|s| s.kind)
    }

    /// The enclosing scope; `None` for the root.
    #[must_use]
    pub fn scope_parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.root.lock().scopes.get(scope)?.parent
    }

    /// The full dotted name of a scope; empty for the root.
    #[must_use]
    pub fn scope_name(&self, scope: ScopeId) -> EcoString {
        self.root
            .lock()
            .scopes
            .get(scope)
            .map(|s| s.full_name.clone())
            .unwrap_or_default()
    }

    /// The last segment of a scope's name.
    #[must_use]
    pub fn scope_short_name(&self, scope: ScopeId) -> EcoString {
        self.root
            .lock()
            .scopes
            .get(scope)
            .map(|s| s.name.clone())
            .unwrap_or_default()
    }

    /// Number of namespaces, the root excluded.
    #[must_use]
    pub fn namespace_count(&self) -> usize {
        self.root.lock().by_full_name.len()
    }

    /// The entries of a scope, sorted by name.
    #[must_use]
    pub fn entries(&self, scope: ScopeId) -> Vec<(EcoString, Entry)> {
        let root = self.root.lock();
        let mut entries: Vec<_> = root
            .scopes
            .get(scope)
            .map(|s| s.entries.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    // ========================================================================
    // Entries
    // ========================================================================

    /// Looks `name` up directly in `scope`. An arity-qualified name
    /// (``Pair`2``) selects the matching members of a group.
    #[must_use]
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<Entry> {
        self.root.lock().lookup(scope, name)
    }

    /// Looks up a dotted path such as ``System.Collections.List`1``.
    #[must_use]
    pub fn lookup_path(&self, path: &str) -> Option<Entry> {
        let root = self.root.lock();
        match path.rsplit_once('.') {
            Some((prefix, name)) => {
                let scope = *root.by_full_name.get(prefix)?;
                root.lookup(scope, name)
            }
            None => root.lookup(root.root, path),
        }
    }

    /// Adds `entity` under `name`, turning an existing entry into a group.
    pub fn add(&self, scope: ScopeId, name: &str, entity: Entity) {
        self.root.lock().add(scope, name, entity);
    }

    /// Removes `entity` from `name`, collapsing a group left with one
    /// member. Returns `false` if it was not there.
    pub fn remove(&self, scope: ScopeId, name: &str, entity: Entity) -> bool {
        self.root.lock().remove(scope, name, entity)
    }

    // ========================================================================
    // Symbols
    // ========================================================================

    /// Declares a symbol in `scope`. Type symbols get a member scope.
    pub fn declare(&self, scope: ScopeId, symbol: Symbol) -> SymbolId {
        self.root.lock().declare(scope, symbol)
    }

    /// A copy of a live symbol.
    #[must_use]
    pub fn symbol(&self, id: SymbolId) -> Option<Symbol> {
        self.root.lock().symbol(id).cloned()
    }

    /// Returns `true` if the symbol has not been removed.
    #[must_use]
    pub fn symbol_exists(&self, id: SymbolId) -> bool {
        self.root.lock().symbol(id).is_some()
    }

    /// Edits a live symbol in place. Returns `false` if it was removed.
    pub fn update_symbol(&self, id: SymbolId, edit: impl FnOnce(&mut Symbol)) -> bool {
        match self.root.lock().symbols.get_mut(id) {
            Some(Some(symbol)) => {
                edit(symbol);
                true
            }
            _ => false,
        }
    }

    /// Removes a symbol and, for a type, all of its members.
    pub fn remove_symbol(&self, id: SymbolId) -> bool {
        self.root.lock().remove_symbol(id)
    }

    /// Removes every symbol declared by the given tree. Returns how many
    /// top-level removals were made.
    pub fn remove_declarations_of(&self, tree: TreeId) -> usize {
        let mut root = self.root.lock();
        let doomed: Vec<SymbolId> = root
            .symbols
            .iter()
            .filter_map(|(id, s)| {
                s.as_ref()
                    .and_then(|s| s.origin)
                    .filter(|o| o.tree == tree)
                    .map(|_| id)
            })
            .collect();
        let removed = doomed
            .into_iter()
            .filter(|&id| root.remove_symbol(id))
            .count();
        if removed > 0 {
            debug!(?tree, removed, "removed declarations");
        }
        removed
    }

    /// The full name of a symbol, e.g. ``Geometry.Vector`1.Length``.
    #[must_use]
    pub fn full_name(&self, id: SymbolId) -> Option<EcoString> {
        let root = self.root.lock();
        let symbol = root.symbol(id)?;
        Some(root.qualify(symbol.scope, &symbol.arity_name()))
    }

    /// The type symbol whose member scope is `scope`.
    #[must_use]
    pub fn scope_owner(&self, scope: ScopeId) -> Option<SymbolId> {
        match self.scope_kind(scope)? {
            ScopeKind::Type(owner) => Some(owner),
            ScopeKind::Root | ScopeKind::Namespace => None,
        }
    }

    // ========================================================================
    // Keyword aliases
    // ========================================================================

    /// Makes a predefined type keyword denote a type.
    pub fn alias_keyword(&self, keyword: &str, target: SymbolId) {
        self.root.lock().keywords.insert(keyword.into(), target);
    }

    /// The type a predefined type keyword denotes.
    #[must_use]
    pub fn keyword_alias(&self, keyword: &str) -> Option<SymbolId> {
        self.root.lock().keywords.get(keyword).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(arity: usize) -> Symbol {
        Symbol::new("Pair", SymbolKind::Type(TypeKind::Class)).with_arity(arity)
    }

    #[test]
    fn paths_are_created_once_and_indexed() {
        let table = NameTable::empty();
        let abc = table.find_or_create_path("A.B.C");
        assert_eq!(table.find("A.B.C"), Some(abc));
        assert_eq!(table.find_or_create_path("A.B.C"), abc);
        assert_eq!(table.namespace_count(), 3);
        let ab = table.find("A.B").unwrap();
        assert_eq!(table.scope_parent(abc), Some(ab));
        assert_eq!(table.scope_name(abc), "A.B.C");
        assert_eq!(table.scope_short_name(abc), "C");
        assert_eq!(table.find("A.B.D"), None);
    }

    #[test]
    fn same_name_different_arity_forms_a_group() {
        let table = NameTable::empty();
        let ns = table.find_or_create_path("Util");
        let one = table.declare(ns, pair(1));
        let two = table.declare(ns, pair(2));

        let bare = table.lookup(ns, "Pair").unwrap();
        assert!(bare.is_group());
        assert_eq!(bare.entities(), &[Entity::Symbol(one), Entity::Symbol(two)]);
        assert_eq!(
            table.lookup(ns, "Pair`2"),
            Some(Entry::Single(Entity::Symbol(two)))
        );
        assert_eq!(table.lookup(ns, "Pair`3"), None);
        assert_eq!(
            table.lookup_path("Util.Pair`1"),
            Some(Entry::Single(Entity::Symbol(one)))
        );
    }

    #[test]
    fn removal_collapses_groups() {
        let table = NameTable::empty();
        let root = table.root();
        let one = table.declare(root, pair(1));
        let two = table.declare(root, pair(2));
        assert!(table.remove_symbol(one));
        assert_eq!(
            table.lookup(root, "Pair"),
            Some(Entry::Single(Entity::Symbol(two)))
        );
        assert!(!table.symbol_exists(one));
        assert!(!table.remove_symbol(one));
        assert!(table.remove(root, "Pair", Entity::Symbol(two)));
        assert_eq!(table.lookup(root, "Pair"), None);
    }

    #[test]
    fn removing_a_type_removes_its_members() {
        let table = NameTable::empty();
        let point = Symbol::new("Point", SymbolKind::Type(TypeKind::Struct));
        let ty = table.declare(table.root(), point);
        let members = table.symbol(ty).unwrap().members().unwrap();
        let x = table.declare(members, Symbol::new("X", SymbolKind::Field));
        assert_eq!(table.scope_owner(members), Some(ty));
        assert_eq!(table.full_name(x).as_deref(), Some("Point.X"));
        table.remove_symbol(ty);
        assert!(!table.symbol_exists(x));
        assert!(table.entries(members).is_empty());
    }

    #[test]
    fn declarations_are_removed_per_tree() {
        let table = NameTable::empty();
        let a = crate::ast::SyntaxTree::new();
        let b = crate::ast::SyntaxTree::new();
        let node = <NodeId as cranelift_entity::EntityRef>::new(0);
        let root = table.root();
        let class = |name: &str, tree: &crate::ast::SyntaxTree| {
            Symbol::new(name, SymbolKind::Type(TypeKind::Class)).with_origin(tree.id(), node)
        };
        let from_a = table.declare(root, class("A", &a));
        let from_b = table.declare(root, class("B", &b));
        assert_eq!(table.remove_declarations_of(a.id()), 1);
        assert!(!table.symbol_exists(from_a));
        assert!(table.symbol_exists(from_b));
    }

    #[test]
    fn namespace_and_type_may_share_a_name() {
        let table = NameTable::empty();
        let root = table.root();
        let ty = table.declare(root, Symbol::new("Data", SymbolKind::Type(TypeKind::Class)));
        let ns = table.find_or_create_child(root, "Data");
        let entry = table.lookup(root, "Data").unwrap();
        assert_eq!(entry.entities(), &[Entity::Symbol(ty), Entity::Scope(ns)]);
        assert_eq!(table.find_or_create_child(root, "Data"), ns);
    }

    #[test]
    fn handles_share_one_root() {
        let table = NameTable::empty();
        let shared = table.clone();
        shared.find_or_create_path("Shared");
        assert!(table.find("Shared").is_some());
        assert!(table.ptr_eq(&shared));
        assert!(!table.ptr_eq(&NameTable::empty()));
    }

    #[test]
    fn builtins_and_keyword_aliases() {
        let table = NameTable::new();
        let int = table.keyword_alias("int").unwrap();
        assert_eq!(table.full_name(int).as_deref(), Some("System.Int32"));
        assert!(table.lookup_path("System.String").is_some());
    }
}
