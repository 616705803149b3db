// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Semantic analysis: the name table and name resolution.
//!
//! **DDD Context:** Semantic Analysis
//!
//! A [`NameTable`] holds namespaces, types and members; the resolver binds
//! the name references of a [`SyntaxTree`](crate::ast::SyntaxTree) to it.
//! Trees that share a table see each other's declarations, so a project's
//! files are resolved against one table:
//!
//! ```
//! use curly_core::semantic_analysis::{NameTable, resolve_tree};
//! use curly_core::source_analysis::parse;
//!
//! let table = NameTable::new();
//! let mut lib = parse("namespace Lib { public class Widget { } }").tree;
//! let mut app = parse("using Lib; class App { Widget w; }").tree;
//! assert!(resolve_tree(&mut lib, &table).is_empty());
//! assert!(resolve_tree(&mut app, &table).is_empty());
//! ```
//!
//! Misses are warnings, never errors: an unresolved name renders like any
//! other.

mod builtins;
mod error;
mod name_table;
mod resolver;

pub use builtins::{KEYWORD_ALIASES, SYSTEM_TYPES};
pub use error::ResolveError;
pub use name_table::{
    Entity, Entry, NameTable, Origin, ScopeId, ScopeKind, Symbol, SymbolId, SymbolKind,
};
pub use resolver::{
    Category, Phase, ResolveFlags, Resolver, referent_name, resolve_phase, resolve_tree,
    static_type,
};
