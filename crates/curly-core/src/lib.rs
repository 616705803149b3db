// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Curly language core.
//!
//! This crate turns source text of a curly-brace object-oriented language
//! into an editable syntax tree and back:
//! - Lexical analysis (lossless tokens with trivia)
//! - Parsing through an extensible registry of token factories
//! - Name resolution against a shareable table of namespaces and types
//! - Rendering, either exactly as written or canonically formatted
//!
//! ```
//! use curly_core::semantic_analysis::{NameTable, resolve_tree};
//! use curly_core::source_analysis::parse;
//! use curly_core::unparse::{RenderMode, render_tree};
//!
//! let source = "class Point { int x; }\n";
//! let mut tree = parse(source).tree;
//! assert!(resolve_tree(&mut tree, &NameTable::new()).is_empty());
//! assert_eq!(render_tree(&tree, &RenderMode::Exact), source);
//! ```

pub mod ast;
pub mod project;
pub mod semantic_analysis;
pub mod source_analysis;
pub mod unparse;

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::ast::{NodeId, NodeKind, SyntaxTree};
    pub use crate::project::Project;
    pub use crate::semantic_analysis::{NameTable, resolve_tree};
    pub use crate::source_analysis::{Diagnostic, Span, parse};
    pub use crate::unparse::{FormatOptions, RenderMode, render, render_tree};
}
