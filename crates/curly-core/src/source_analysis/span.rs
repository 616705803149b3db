// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Source location tracking.
//!
//! Tokens and syntax nodes carry a `Span` giving the byte range they were
//! parsed from. Nodes created by tree edits have the default (empty) span.

use std::ops::Range;

/// A half-open byte range `[start, end)` into a source text.
///
/// # Examples
///
/// ```
/// use curly_core::source_analysis::Span;
///
/// let span = Span::new(4, 9);
/// assert_eq!(span.len(), 5);
/// assert_eq!(span.text("let value = 1;"), "value");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Span {
    start: u32,
    end: u32,
}

impl Span {
    /// Creates a span from start and end byte offsets.
    #[must_use]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Creates an empty span at `offset`.
    #[must_use]
    pub const fn point(offset: u32) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Returns the start byte offset.
    #[must_use]
    pub const fn start(self) -> u32 {
        self.start
    }

    /// Returns the end byte offset (exclusive).
    #[must_use]
    pub const fn end(self) -> u32 {
        self.end
    }

    /// Returns the length of the span in bytes.
    #[must_use]
    pub const fn len(self) -> u32 {
        self.end - self.start
    }

    /// Returns true if the span covers no bytes.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// Returns true if `other` lies entirely within `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Returns true if `offset` lies within `[start, end)`.
    #[must_use]
    pub const fn contains_offset(self, offset: u32) -> bool {
        self.start <= offset && offset < self.end
    }

    /// Smallest span covering both `self` and `other`.
    ///
    /// An empty default span is treated as "no location" and does not widen
    /// the other operand.
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        if self.start == 0 && self.end == 0 {
            return other;
        }
        if other.start == 0 && other.end == 0 {
            return self;
        }
        let start = if self.start < other.start {
            self.start
        } else {
            other.start
        };
        let end = if self.end > other.end {
            self.end
        } else {
            other.end
        };
        Self { start, end }
    }

    /// Converts to a `Range<usize>` for slicing source text.
    #[must_use]
    pub const fn as_range(self) -> Range<usize> {
        self.start as usize..self.end as usize
    }

    /// Returns the slice of `source` covered by this span, or `""` when the
    /// span does not fit the text (e.g. a span from a different file).
    #[must_use]
    pub fn text(self, source: &str) -> &str {
        source.get(self.as_range()).unwrap_or("")
    }
}

impl From<Range<u32>> for Span {
    fn from(range: Range<u32>) -> Self {
        Self::new(range.start, range.end)
    }
}

impl From<Range<usize>> for Span {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "source files over 4GB are not supported"
    )]
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start as u32, range.end as u32)
    }
}

impl From<Span> for Range<usize> {
    fn from(span: Span) -> Self {
        span.as_range()
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        (span.start as usize, span.len() as usize).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors() {
        let span = Span::new(3, 10);
        assert_eq!(span.start(), 3);
        assert_eq!(span.end(), 10);
        assert_eq!(span.len(), 7);
        assert!(!span.is_empty());
        assert!(Span::point(4).is_empty());
    }

    #[test]
    fn merge_ignores_default_span() {
        let a = Span::new(5, 10);
        assert_eq!(a.merge(Span::default()), a);
        assert_eq!(Span::default().merge(a), a);
        assert_eq!(a.merge(Span::new(12, 20)), Span::new(5, 20));
    }

    #[test]
    fn contains_and_offsets() {
        let outer = Span::new(0, 10);
        assert!(outer.contains(Span::new(2, 4)));
        assert!(!outer.contains(Span::new(8, 12)));
        assert!(outer.contains_offset(9));
        assert!(!outer.contains_offset(10));
    }

    #[test]
    fn text_slices_source() {
        let source = "int x = 42;";
        assert_eq!(Span::new(8, 10).text(source), "42");
        assert_eq!(Span::new(8, 100).text(source), "");
    }

    #[test]
    fn converts_to_miette_span() {
        let span: miette::SourceSpan = Span::new(4, 6).into();
        assert_eq!(span.offset(), 4);
        assert_eq!(span.len(), 2);
    }
}
