// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! A set of source files resolved against one name table.
//!
//! **DDD Context:** Language Service
//!
//! Every file's declarations are registered as soon as it is added, so
//! [`Project::resolve_all`] can bind references across files regardless of
//! the order they were added in.
//!
//! ```
//! use camino::Utf8PathBuf;
//! use curly_core::project::Project;
//!
//! let mut project = Project::new();
//! let app = Utf8PathBuf::from("app.cs");
//! project.update_file(app.clone(), "using Lib; class App { Widget w; }".to_string());
//! project.update_file("lib.cs".into(), "namespace Lib { class Widget { } }".to_string());
//! project.resolve_all();
//! assert!(!project.has_unresolved(&app));
//! ```

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, instrument};

use crate::ast::SyntaxTree;
use crate::semantic_analysis::{NameTable, Phase, resolve_phase};
use crate::source_analysis::{Diagnostic, parse};

/// Parsed files sharing one [`NameTable`].
#[derive(Debug)]
pub struct Project {
    table: NameTable,
    files: BTreeMap<Utf8PathBuf, FileData>,
}

#[derive(Debug)]
struct FileData {
    source: String,
    tree: SyntaxTree,
    /// Lexical and syntax diagnostics.
    parse: Vec<Diagnostic>,
    /// Warnings from registering the file's declarations.
    declare: Vec<Diagnostic>,
    /// Warnings from the last [`Project::resolve_all`].
    resolve: Vec<Diagnostic>,
}

impl Default for Project {
    fn default() -> Self {
        Self::new()
    }
}

impl Project {
    /// Creates an empty project with the built-in types.
    #[must_use]
    pub fn new() -> Self {
        Self::with_table(NameTable::new())
    }

    /// Creates an empty project over an existing table, for example one
    /// shared with another project.
    #[must_use]
    pub fn with_table(table: NameTable) -> Self {
        Self {
            table,
            files: BTreeMap::new(),
        }
    }

    /// The shared name table.
    #[must_use]
    pub fn table(&self) -> &NameTable {
        &self.table
    }

    /// Adds or replaces a file: parses it and registers its declarations,
    /// after dropping whatever an earlier version declared.
    #[instrument(skip_all, fields(file = %file, bytes = source.len()))]
    pub fn update_file(&mut self, file: Utf8PathBuf, source: String) {
        self.forget(&file);
        let result = parse(&source);
        let mut tree = result.tree;
        let declare = resolve_phase(&mut tree, &self.table, Phase::Declare);
        debug!(
            errors = result.diagnostics.len(),
            warnings = declare.len(),
            "file parsed"
        );
        self.files.insert(
            file,
            FileData {
                source,
                tree,
                parse: result.diagnostics,
                declare,
                resolve: Vec::new(),
            },
        );
    }

    /// Removes a file and its declarations. Returns `false` if the file was
    /// not part of the project.
    pub fn remove_file(&mut self, file: &Utf8Path) -> bool {
        self.forget(file)
    }

    fn forget(&mut self, file: &Utf8Path) -> bool {
        match self.files.remove(file) {
            Some(old) => {
                self.table.remove_declarations_of(old.tree.id());
                true
            }
            None => false,
        }
    }

    /// Resolves signatures, then bodies, of every file. Returns the number
    /// of resolution warnings.
    #[instrument(skip_all, fields(files = self.files.len()))]
    pub fn resolve_all(&mut self) -> usize {
        for data in self.files.values_mut() {
            data.resolve = resolve_phase(&mut data.tree, &self.table, Phase::Signatures);
        }
        for data in self.files.values_mut() {
            let bodies = resolve_phase(&mut data.tree, &self.table, Phase::Bodies);
            data.resolve.extend(bodies);
        }
        let warnings = self.files.values().map(|data| data.resolve.len()).sum();
        debug!(warnings, "project resolved");
        warnings
    }

    /// Paths of all files, sorted.
    pub fn files(&self) -> impl Iterator<Item = &Utf8Path> {
        self.files.keys().map(Utf8PathBuf::as_path)
    }

    /// The file's source text.
    #[must_use]
    pub fn source(&self, file: &Utf8Path) -> Option<&str> {
        self.files.get(file).map(|data| data.source.as_str())
    }

    /// The file's syntax tree.
    #[must_use]
    pub fn tree(&self, file: &Utf8Path) -> Option<&SyntaxTree> {
        self.files.get(file).map(|data| &data.tree)
    }

    /// Mutable access to a file's tree, for edits before the next
    /// [`resolve_all`](Self::resolve_all).
    pub fn tree_mut(&mut self, file: &Utf8Path) -> Option<&mut SyntaxTree> {
        self.files.get_mut(file).map(|data| &mut data.tree)
    }

    /// Parse and resolution diagnostics of a file, parse diagnostics first.
    #[must_use]
    pub fn diagnostics(&self, file: &Utf8Path) -> Vec<Diagnostic> {
        self.files
            .get(file)
            .map(|data| {
                data.parse
                    .iter()
                    .chain(&data.declare)
                    .chain(&data.resolve)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns `true` if any name in the file is unresolved, including names
    /// whose declaration was removed by a later update. Unknown files have
    /// nothing unresolved.
    #[must_use]
    pub fn has_unresolved(&self, file: &Utf8Path) -> bool {
        self.files.get(file).is_some_and(|data| {
            data.tree
                .root()
                .is_some_and(|root| data.tree.has_unresolved(root, &self.table))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(name: &str) -> Utf8PathBuf {
        Utf8PathBuf::from(name)
    }

    #[test]
    fn references_resolve_across_files_in_any_order() {
        let mut project = Project::new();
        project.update_file(path("app.cs"), "using Shapes; class App { Circle c; }".into());
        project.update_file(path("shapes.cs"), "namespace Shapes { class Circle { } }".into());
        assert_eq!(project.resolve_all(), 0);
        assert!(!project.has_unresolved(&path("app.cs")));
        assert!(project.diagnostics(&path("app.cs")).is_empty());
    }

    #[test]
    fn updating_a_file_replaces_its_declarations() {
        let mut project = Project::new();
        project.update_file(path("shapes.cs"), "namespace Shapes { class Circle { } }".into());
        project.update_file(path("app.cs"), "using Shapes; class App { Circle c; }".into());
        project.resolve_all();
        assert!(project.table().lookup_path("Shapes.Circle").is_some());

        project.update_file(path("shapes.cs"), "namespace Shapes { class Square { } }".into());
        assert!(project.table().lookup_path("Shapes.Circle").is_none());
        assert!(project.has_unresolved(&path("app.cs")));
        assert!(project.resolve_all() > 0);
        assert!(project.has_unresolved(&path("app.cs")));
    }

    #[test]
    fn removing_a_file_drops_it() {
        let mut project = Project::new();
        project.update_file(path("a.cs"), "class A { }".into());
        assert!(project.remove_file(&path("a.cs")));
        assert!(!project.remove_file(&path("a.cs")));
        assert!(project.table().lookup_path("A").is_none());
        assert_eq!(project.files().count(), 0);
    }

    #[test]
    fn parse_errors_are_reported_first() {
        let mut project = Project::new();
        project.update_file(path("bad.cs"), "class A { int x = ; Missing m; }".into());
        project.resolve_all();
        let diagnostics = project.diagnostics(&path("bad.cs"));
        assert!(diagnostics.len() >= 2);
        assert!(diagnostics[0].is_error());
        assert!(diagnostics.iter().any(|d| !d.is_error()));
    }

    #[test]
    fn unknown_files_have_no_diagnostics() {
        let project = Project::new();
        assert!(project.diagnostics(&path("nope.cs")).is_empty());
        assert!(!project.has_unresolved(&path("nope.cs")));
        assert!(project.source(&path("nope.cs")).is_none());
    }
}
