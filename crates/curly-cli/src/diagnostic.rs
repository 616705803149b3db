// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Rendering of core diagnostics with miette.
//!
//! Converts curly-core diagnostics into miette reports that show the
//! offending source line with a labelled span and, when present, a hint.
//! Severity and code follow the core diagnostic, so warnings render as
//! warnings.

use std::fmt::Display;

use curly_core::source_analysis::{Diagnostic as CoreDiagnostic, DiagnosticCategory, Severity};
use miette::{Diagnostic, LabeledSpan, NamedSource, SourceCode, SourceSpan};

/// A parse or resolution diagnostic with its source.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct SourceDiagnostic {
    pub severity: Severity,
    pub category: DiagnosticCategory,
    pub message: String,
    pub src: NamedSource<String>,
    pub span: SourceSpan,
    pub label: &'static str,
    pub hint: Option<String>,
}

impl SourceDiagnostic {
    /// Creates a diagnostic from a curly-core diagnostic.
    pub fn from_core_diagnostic(
        diagnostic: &CoreDiagnostic,
        source_path: &str,
        source: &str,
    ) -> Self {
        let label = match diagnostic.severity {
            Severity::Error => "error here",
            Severity::Warning => "warning here",
        };
        Self {
            severity: diagnostic.severity,
            category: diagnostic.category,
            message: diagnostic.message.to_string(),
            src: NamedSource::new(source_path, source.to_string()),
            span: diagnostic.span.into(),
            label,
            hint: diagnostic.hint.as_ref().map(ToString::to_string),
        }
    }
}

impl Diagnostic for SourceDiagnostic {
    fn code<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        let code = match self.category {
            DiagnosticCategory::Syntax => "curly::syntax",
            DiagnosticCategory::Resolution => "curly::resolve",
        };
        Some(Box::new(code))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(match self.severity {
            Severity::Error => miette::Severity::Error,
            Severity::Warning => miette::Severity::Warning,
        })
    }

    fn help<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        self.hint
            .as_ref()
            .map(|hint| Box::new(hint) as Box<dyn Display + 'a>)
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        Some(&self.src)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        Some(Box::new(std::iter::once(LabeledSpan::new_with_span(
            Some(self.label.to_string()),
            self.span,
        ))))
    }
}

/// Prints every diagnostic of a file to stderr. Returns the number of
/// errors and warnings.
pub fn report(diagnostics: &[CoreDiagnostic], source_path: &str, source: &str) -> (usize, usize) {
    let mut errors = 0;
    let mut warnings = 0;
    for diagnostic in diagnostics {
        match diagnostic.severity {
            Severity::Error => errors += 1,
            Severity::Warning => warnings += 1,
        }
        let report = miette::Report::new(SourceDiagnostic::from_core_diagnostic(
            diagnostic,
            source_path,
            source,
        ));
        eprintln!("{report:?}");
    }
    (errors, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use curly_core::source_analysis::Span;

    #[test]
    fn error_keeps_span_and_message() {
        let core = CoreDiagnostic::error("expected `;`", Span::new(10, 11));
        let diag = SourceDiagnostic::from_core_diagnostic(&core, "a.cs", "int x = 1 }");

        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.message, "expected `;`");
        assert_eq!(diag.span.offset(), 10);
        assert_eq!(diag.span.len(), 1);
        assert_eq!(diag.label, "error here");
        assert_eq!(diag.severity(), Some(miette::Severity::Error));
        assert_eq!(diag.code().unwrap().to_string(), "curly::syntax");
        assert!(diag.help().is_none());
    }

    #[test]
    fn warning_carries_its_hint_and_category() {
        let core = CoreDiagnostic::warning("unresolved name `Foo`", Span::new(0, 3))
            .with_hint("is a `using` directive missing?")
            .with_category(DiagnosticCategory::Resolution);
        let diag = SourceDiagnostic::from_core_diagnostic(&core, "a.cs", "Foo f;");

        assert_eq!(diag.label, "warning here");
        assert_eq!(diag.severity(), Some(miette::Severity::Warning));
        assert_eq!(diag.code().unwrap().to_string(), "curly::resolve");
        assert_eq!(
            diag.help().unwrap().to_string(),
            "is a `using` directive missing?"
        );
    }

    #[test]
    fn zero_length_span_at_end() {
        let core = CoreDiagnostic::error("unexpected end of file", Span::new(9, 9));
        let diag = SourceDiagnostic::from_core_diagnostic(&core, "a.cs", "class A {");
        assert_eq!(diag.span.offset(), 9);
        assert_eq!(diag.span.len(), 0);
        assert_eq!(diag.labels().unwrap().count(), 1);
    }

    #[test]
    fn report_counts_by_severity() {
        let diagnostics = [
            CoreDiagnostic::error("bad", Span::new(0, 1)),
            CoreDiagnostic::warning("odd", Span::new(1, 2)),
            CoreDiagnostic::warning("odd", Span::new(2, 3)),
        ];
        assert_eq!(report(&diagnostics, "a.cs", "abc"), (1, 2));
    }
}
