// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Diagnostics produced while parsing and resolving.

use ecow::EcoString;

use super::Span;

/// A diagnostic message with its source location.
///
/// Diagnostics are values, not errors: a pass always completes and returns
/// the diagnostics it found alongside its result. The same values are
/// attached to the nearest syntax node as annotations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The severity of the diagnostic.
    pub severity: Severity,
    /// The message.
    pub message: EcoString,
    /// The source location.
    pub span: Span,
    /// Optional hint for how to fix the issue.
    pub hint: Option<EcoString>,
    /// The pass that produced the diagnostic.
    pub category: DiagnosticCategory,
}

impl Diagnostic {
    /// Creates a new error diagnostic.
    #[must_use]
    pub fn error(message: impl Into<EcoString>, span: Span) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            span,
            hint: None,
            category: DiagnosticCategory::Syntax,
        }
    }

    /// Creates a new warning diagnostic.
    #[must_use]
    pub fn warning(message: impl Into<EcoString>, span: Span) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            span,
            hint: None,
            category: DiagnosticCategory::Syntax,
        }
    }

    /// Attaches a hint.
    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<EcoString>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Sets the category.
    #[must_use]
    pub fn with_category(mut self, category: DiagnosticCategory) -> Self {
        self.category = category;
        self
    }

    /// Returns `true` for errors.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    /// Malformed input; the tree contains placeholders.
    Error,
    /// Suspicious but well-formed input, e.g. an unresolved name.
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => f.write_str("error"),
            Self::Warning => f.write_str("warning"),
        }
    }
}

/// Which pass produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    /// Lexing and parsing.
    Syntax,
    /// Name resolution.
    Resolution,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors() {
        let err = Diagnostic::error("expected `;`", Span::new(1, 2)).with_hint("add a semicolon");
        assert!(err.is_error());
        assert_eq!(err.hint.as_deref(), Some("add a semicolon"));
        assert_eq!(err.to_string(), "error: expected `;`");

        let warn = Diagnostic::warning("unresolved name `Foo`", Span::default())
            .with_category(DiagnosticCategory::Resolution);
        assert!(!warn.is_error());
        assert_eq!(warn.category, DiagnosticCategory::Resolution);
    }
}
