// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Name references and their resolution state.

use ecow::EcoString;

use super::NodeId;
use crate::semantic_analysis::{ScopeId, SymbolId};

/// What a resolved name denotes. Every variant is a non-owning handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Referent {
    /// A type or member in the name table.
    Symbol(SymbolId),
    /// A namespace in the name table.
    Scope(ScopeId),
    /// A local variable, parameter or `foreach` variable in the same tree.
    Local(NodeId),
    /// `var`: the type is inferred from the initializer.
    Inferred,
}

/// Resolution state of a name reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RefState {
    /// Only the name is known.
    #[default]
    Unresolved,
    /// Bound to a declaration.
    Resolved(Referent),
}

/// A reference to another entity by name.
///
/// Generic arity is the number of type-argument children of the owning
/// node; `rank` counts `[]` suffixes and `nullable` records a `?` suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NameRef {
    /// The name without any `@` escape.
    pub name: EcoString,
    /// Number of generic type arguments.
    pub arity: usize,
    /// Number of array rank suffixes.
    pub rank: u8,
    /// Whether a nullable `?` suffix follows.
    pub nullable: bool,
    /// Whether the name is a predefined type keyword such as `int`.
    pub keyword: bool,
    state: RefState,
}

impl NameRef {
    /// Creates an unresolved reference.
    #[must_use]
    pub fn new(name: impl Into<EcoString>) -> Self {
        let name: EcoString = name.into();
        let name = match name.strip_prefix('@') {
            Some(bare) => EcoString::from(bare),
            None => name,
        };
        Self {
            name,
            arity: 0,
            rank: 0,
            nullable: false,
            keyword: false,
            state: RefState::Unresolved,
        }
    }

    /// Creates an unresolved reference to a predefined type keyword.
    #[must_use]
    pub fn keyword(word: impl Into<EcoString>) -> Self {
        Self {
            keyword: true,
            ..Self::new(word)
        }
    }

    /// The name qualified with its arity, e.g. ``Pair`2``.
    #[must_use]
    pub fn arity_name(&self) -> EcoString {
        arity_qualified(&self.name, self.arity)
    }

    /// The raw resolution state, without staleness checks.
    #[must_use]
    pub const fn state(&self) -> RefState {
        self.state
    }

    /// Returns `true` if the reference is bound.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self.state, RefState::Resolved(_))
    }

    /// The raw referent, without staleness checks. Prefer
    /// [`SyntaxTree::referent`](super::SyntaxTree::referent), which reverts
    /// stale references.
    #[must_use]
    pub const fn raw_referent(&self) -> Option<Referent> {
        match self.state {
            RefState::Resolved(r) => Some(r),
            RefState::Unresolved => None,
        }
    }

    /// Binds the reference. Rebinding to the same referent is a no-op.
    pub fn resolve(&mut self, referent: Referent) {
        self.state = RefState::Resolved(referent);
    }

    /// Returns the reference to the unresolved state.
    pub fn unresolve(&mut self) {
        self.state = RefState::Unresolved;
    }
}

impl std::fmt::Display for NameRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)?;
        if self.nullable {
            f.write_str("?")?;
        }
        for _ in 0..self.rank {
            f.write_str("[]")?;
        }
        Ok(())
    }
}

/// Qualifies `name` with a generic arity: ``Name`N``, or `name` itself
/// when the arity is zero.
#[must_use]
pub fn arity_qualified(name: &str, arity: usize) -> EcoString {
    if arity == 0 {
        EcoString::from(name)
    } else {
        ecow::eco_format!("{name}`{arity}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_verbatim_prefix() {
        assert_eq!(NameRef::new("@class").name, "class");
        assert_eq!(NameRef::new("x").name, "x");
    }

    #[test]
    fn arity_names() {
        let mut pair = NameRef::new("Pair");
        assert_eq!(pair.arity_name(), "Pair");
        pair.arity = 2;
        assert_eq!(pair.arity_name(), "Pair`2");
    }

    #[test]
    fn lifecycle() {
        let mut name = NameRef::new("x");
        assert!(!name.is_resolved());
        name.resolve(Referent::Inferred);
        name.resolve(Referent::Inferred);
        assert_eq!(name.raw_referent(), Some(Referent::Inferred));
        name.unresolve();
        assert_eq!(name.state(), RefState::Unresolved);
    }

    #[test]
    fn display_includes_suffixes() {
        let mut name = NameRef::keyword("int");
        name.nullable = true;
        name.rank = 1;
        assert_eq!(name.to_string(), "int?[]");
    }
}
