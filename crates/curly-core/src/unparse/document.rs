// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Wadler-Lindig document tree for canonical source rendering.
//!
//! **DDD Context:** Language Service — Formatting
//!
//! Renderers return `Document` values that are laid out in a final pass,
//! instead of writing to a string buffer with manual indentation tracking.
//! Two additions serve source formatting: [`Document::LineSuffix`] holds
//! text (a trailing `//` comment) back until the next line break, and
//! [`Document::Mark`] records where a node's text starts in the output.
//!
//! # Example
//!
//! ```
//! use curly_core::unparse::document::{Document, line, nest};
//! use curly_core::docvec;
//!
//! let doc = docvec![
//!     "class Point",
//!     line(),
//!     "{",
//!     nest(4, docvec![line(), "int x;"]),
//!     line(),
//!     "}",
//! ];
//! assert_eq!(doc.to_pretty_string(), "class Point\n{\n    int x;\n}");
//! ```

use std::collections::BTreeMap;

use crate::ast::NodeId;

/// A pretty-printable document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Document<'a> {
    /// A borrowed string.
    Str(&'a str),
    /// An owned string.
    String(String),
    /// A newline followed by the current indentation. Indentation is only
    /// written once text follows, so empty lines carry no spaces.
    Line,
    /// Increase indentation for nested content.
    Nest(isize, Box<Document<'a>>),
    /// A sequence of documents.
    Vec(Vec<Document<'a>>),
    /// Text emitted just before the next line break (or at the end).
    LineSuffix(Box<Document<'a>>),
    /// Records the output offset of the next text for a node.
    Mark(NodeId),
    /// Empty document.
    Nil,
}

/// Coerce a value into a `Document`.
pub trait Documentable<'a> {
    fn to_doc(self) -> Document<'a>;
}

impl<'a> Documentable<'a> for &'a str {
    fn to_doc(self) -> Document<'a> {
        Document::Str(self)
    }
}

impl<'a> Documentable<'a> for String {
    fn to_doc(self) -> Document<'a> {
        Document::String(self)
    }
}

impl<'a> Documentable<'a> for Document<'a> {
    fn to_doc(self) -> Document<'a> {
        self
    }
}

impl<'a> Documentable<'a> for Vec<Document<'a>> {
    fn to_doc(self) -> Document<'a> {
        Document::Vec(self)
    }
}

impl<'a> Documentable<'a> for usize {
    fn to_doc(self) -> Document<'a> {
        Document::String(self.to_string())
    }
}

/// Join multiple documents together in a vector.
///
/// ```
/// use curly_core::docvec;
///
/// let doc = docvec!["int", " ", "x"];
/// assert_eq!(doc.to_pretty_string(), "int x");
/// ```
#[macro_export]
macro_rules! docvec {
    () => {
        $crate::unparse::document::Document::Vec(Vec::new())
    };

    ($first:expr $(,)?) => {
        $crate::unparse::document::Document::Vec(
            vec![$crate::unparse::document::Documentable::to_doc($first)]
        )
    };

    ($first:expr, $($rest:expr),+ $(,)?) => {
        match $crate::unparse::document::Documentable::to_doc($first) {
            $crate::unparse::document::Document::Vec(mut vec) => {
                $(
                    vec.push($crate::unparse::document::Documentable::to_doc($rest));
                )*
                $crate::unparse::document::Document::Vec(vec)
            },
            first => {
                $crate::unparse::document::Document::Vec(
                    vec![first, $($crate::unparse::document::Documentable::to_doc($rest)),+]
                )
            }
        }
    };
}

/// Creates a `Line` document.
#[must_use]
pub fn line() -> Document<'static> {
    Document::Line
}

/// Creates a `Nil` document.
#[must_use]
pub fn nil() -> Document<'static> {
    Document::Nil
}

/// Creates a `Nest` document.
#[must_use]
pub fn nest(indent: isize, doc: Document<'_>) -> Document<'_> {
    Document::Nest(indent, Box::new(doc))
}

/// Creates a `LineSuffix` document.
#[must_use]
pub fn line_suffix(doc: Document<'_>) -> Document<'_> {
    Document::LineSuffix(Box::new(doc))
}

/// Joins documents with a separator between each pair.
#[must_use]
pub fn join<'a>(
    docs: impl IntoIterator<Item = Document<'a>>,
    separator: &Document<'a>,
) -> Document<'a> {
    let mut result = Vec::new();
    for doc in docs {
        if !result.is_empty() {
            result.push(separator.clone());
        }
        result.push(doc);
    }
    if result.is_empty() {
        Document::Nil
    } else {
        Document::Vec(result)
    }
}

/// Concatenates documents without any separator.
#[must_use]
pub fn concat<'a>(docs: impl IntoIterator<Item = Document<'a>>) -> Document<'a> {
    Document::Vec(docs.into_iter().collect())
}

// --- Rendering ---

/// Output of [`Document::render`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Output {
    pub text: String,
    /// Offset of the text following each [`Document::Mark`].
    pub marks: BTreeMap<NodeId, usize>,
    /// The text ends with a line suffix, so whatever follows needs a new line.
    pub ends_in_line_comment: bool,
}

#[derive(Default)]
struct Renderer<'d, 'a> {
    out: Output,
    pending_indent: Option<isize>,
    pending_marks: Vec<NodeId>,
    suffixes: Vec<&'d Document<'a>>,
}

impl Document<'_> {
    /// Renders the document to a string.
    #[must_use]
    pub fn to_pretty_string(&self) -> String {
        self.render(0).text
    }

    /// Renders the document with every line (after the first) starting at
    /// `base_indent` plus its nesting.
    #[must_use]
    pub fn render(&self, base_indent: isize) -> Output {
        let mut renderer = Renderer::default();
        renderer.walk(self, base_indent);
        renderer.out.ends_in_line_comment = !renderer.suffixes.is_empty();
        renderer.flush_suffixes(base_indent);
        renderer.finish_marks();
        renderer.out
    }
}

impl<'d, 'a> Renderer<'d, 'a> {
    fn walk(&mut self, doc: &'d Document<'a>, indent: isize) {
        match doc {
            Document::Str(s) => self.text(s),
            Document::String(s) => self.text(s),
            Document::Nil => {}
            Document::Line => {
                self.flush_suffixes(indent);
                self.out.text.push('\n');
                self.pending_indent = Some(indent);
            }
            Document::Nest(extra, doc) => self.walk(doc, indent + extra),
            Document::Vec(docs) => {
                for doc in docs {
                    self.walk(doc, indent);
                }
            }
            Document::LineSuffix(doc) => self.suffixes.push(doc.as_ref()),
            Document::Mark(id) => self.pending_marks.push(*id),
        }
    }

    fn text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(indent) = self.pending_indent.take() {
            write_indent(&mut self.out.text, indent);
        }
        self.finish_marks();
        self.out.text.push_str(text);
    }

    fn finish_marks(&mut self) {
        let offset = self.out.text.len();
        for id in self.pending_marks.drain(..) {
            self.out.marks.entry(id).or_insert(offset);
        }
    }

    fn flush_suffixes(&mut self, indent: isize) {
        for doc in std::mem::take(&mut self.suffixes) {
            // A suffix never starts a line of its own.
            self.pending_indent = None;
            self.walk(doc, indent);
        }
    }
}

fn write_indent(output: &mut String, indent: isize) {
    for _ in 0..indent {
        output.push(' ');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cranelift_entity::EntityRef;

    #[test]
    fn str_document() {
        let doc = Document::Str("hello");
        assert_eq!(doc.to_pretty_string(), "hello");
    }

    #[test]
    fn nil_document() {
        assert_eq!(Document::Nil.to_pretty_string(), "");
    }

    #[test]
    fn line_document() {
        let doc = Document::Vec(vec![Document::Str("a"), Document::Line, Document::Str("b")]);
        assert_eq!(doc.to_pretty_string(), "a\nb");
    }

    #[test]
    fn nest_document() {
        let doc = docvec!["{", nest(4, docvec![line(), "body;"]), line(), "}"];
        assert_eq!(doc.to_pretty_string(), "{\n    body;\n}");
    }

    #[test]
    fn empty_lines_have_no_indentation() {
        let doc = nest(4, docvec!["a;", line(), line(), "b;"]);
        assert_eq!(doc.to_pretty_string(), "a;\n\n    b;");
    }

    #[test]
    fn docvec_macro_empty() {
        assert_eq!(docvec![].to_pretty_string(), "");
    }

    #[test]
    fn docvec_flattens_leading_vec() {
        let doc = docvec![docvec!["a", "b"], "c"];
        assert!(matches!(&doc, Document::Vec(v) if v.len() == 3));
        assert_eq!(doc.to_pretty_string(), "abc");
    }

    #[test]
    fn join_documents() {
        let doc = join(["a".to_doc(), "b".to_doc(), "c".to_doc()], &", ".to_doc());
        assert_eq!(doc.to_pretty_string(), "a, b, c");
        assert_eq!(join(Vec::new(), &", ".to_doc()), Document::Nil);
    }

    #[test]
    fn concat_documents() {
        let doc = concat(["x".to_doc(), 42usize.to_doc()]);
        assert_eq!(doc.to_pretty_string(), "x42");
    }

    #[test]
    fn line_suffix_waits_for_the_line_break() {
        let doc = docvec!["f(", line_suffix(" // why".to_doc()), "x);", line(), "g();"];
        assert_eq!(doc.to_pretty_string(), "f(x); // why\ng();");
    }

    #[test]
    fn line_suffix_is_flushed_at_the_end() {
        let doc = docvec!["x;", line_suffix(" // end".to_doc())];
        let output = doc.render(0);
        assert_eq!(output.text, "x; // end");
        assert!(output.ends_in_line_comment);
        assert!(!docvec!["x;"].render(0).ends_in_line_comment);
    }

    #[test]
    fn marks_record_the_offset_of_the_next_text() {
        let id = NodeId::new(7);
        let doc = docvec!["ab", nest(2, docvec![line(), Document::Mark(id), "cd"])];
        let output = doc.render(0);
        assert_eq!(output.text, "ab\n  cd");
        assert_eq!(output.marks.get(&id), Some(&5));
    }

    #[test]
    fn base_indent_applies_after_the_first_line() {
        let doc = docvec!["a", line(), "b"];
        assert_eq!(doc.render(4).text, "a\n    b");
    }
}
