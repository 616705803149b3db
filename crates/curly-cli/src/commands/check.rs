// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! `curly check`: parse and resolve files together, reporting diagnostics.
//!
//! **DDD Context:** Language Service — Diagnostics
//!
//! All files share one name table, so a type declared in one file resolves
//! in every other. Syntax errors fail the command; unresolved names are
//! warnings unless `--deny-warnings` is given.

use curly_core::project::Project;
use miette::Result;
use tracing::instrument;

use super::{collect_source_files, read_source};
use crate::diagnostic;

/// Totals of a check run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckSummary {
    pub files: usize,
    pub errors: usize,
    pub warnings: usize,
}

/// Checks the given paths and prints every diagnostic to stderr.
pub fn run_check(paths: &[String], deny_warnings: bool) -> Result<()> {
    let summary = check_paths(paths)?;
    eprintln!(
        "checked {} file(s): {} error(s), {} warning(s)",
        summary.files, summary.errors, summary.warnings
    );
    if summary.errors > 0 {
        miette::bail!("check failed with {} error(s)", summary.errors);
    }
    if deny_warnings && summary.warnings > 0 {
        miette::bail!("check failed with {} warning(s)", summary.warnings);
    }
    Ok(())
}

/// Loads every file into one [`Project`], resolves it and reports.
#[instrument(skip_all, fields(paths = paths.len()))]
pub fn check_paths(paths: &[String]) -> Result<CheckSummary> {
    let files = collect_source_files(paths)?;
    let mut project = Project::new();
    for file in &files {
        project.update_file(file.clone(), read_source(file)?);
    }
    project.resolve_all();

    let mut summary = CheckSummary {
        files: files.len(),
        ..CheckSummary::default()
    };
    for file in &files {
        let source = project.source(file).unwrap_or_default();
        let (errors, warnings) =
            diagnostic::report(&project.diagnostics(file), file.as_str(), source);
        summary.errors += errors;
        summary.warnings += warnings;
    }
    Ok(summary)
}
