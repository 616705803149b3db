// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Name resolution error types.

use ecow::EcoString;
use thiserror::Error;

use crate::source_analysis::{Diagnostic, DiagnosticCategory, Span};

/// Why a name could not be bound.
///
/// A miss is not fatal: the reference stays unresolved. Non-quiet misses
/// become warnings through [`ResolveError::to_diagnostic`].
#[derive(Debug, Clone, PartialEq, Eq, Error, miette::Diagnostic)]
pub enum ResolveError {
    /// Nothing with this name is visible.
    #[error("cannot find `{name}` in this scope")]
    NotFound { name: EcoString },

    /// The container was found but has no such member.
    #[error("`{container}` has no member `{member}`")]
    NoMember {
        container: EcoString,
        member: EcoString,
    },

    /// More than one declaration matches and none is preferred.
    #[error("`{name}` is ambiguous between {count} declarations")]
    Ambiguous { name: EcoString, count: usize },
}

impl ResolveError {
    /// The warning reported for this miss.
    #[must_use]
    pub fn to_diagnostic(&self, span: Span) -> Diagnostic {
        let diagnostic =
            Diagnostic::warning(self.to_string(), span).with_category(DiagnosticCategory::Resolution);
        match self {
            Self::NotFound { .. } => {
                diagnostic.with_hint("check the spelling or add a `using` directive")
            }
            Self::Ambiguous { .. } => {
                diagnostic.with_hint("qualify the name or give the generic arity explicitly")
            }
            Self::NoMember { .. } => diagnostic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostics_are_resolution_warnings() {
        let error = ResolveError::NotFound { name: "Foo".into() };
        let diagnostic = error.to_diagnostic(Span::new(3, 6));
        assert!(!diagnostic.is_error());
        assert_eq!(diagnostic.category, DiagnosticCategory::Resolution);
        assert_eq!(diagnostic.message, "cannot find `Foo` in this scope");
        assert!(diagnostic.hint.is_some());
    }
}
