// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! `curly fmt` and `curly fmt --check`: canonical formatting of source files.
//!
//! **DDD Context:** Language Service — Formatting
//!
//! `curly fmt <path>...` parses each file, renders it canonically and writes
//! the result back in place. Files that are already formatted are left
//! untouched.
//!
//! With `--check` nothing is written: a unified diff is printed for every
//! file that would change, and the command fails if any file would change or
//! could not be checked.

use camino::{Utf8Path, Utf8PathBuf};
use curly_core::source_analysis::parse;
use curly_core::unparse::{FormatOptions, RenderMode, render_tree};
use miette::{IntoDiagnostic, Result};
use similar::TextDiff;
use tracing::{debug, info};

use super::{FormatOverrides, collect_source_files, format_options, read_source};

/// Formats (or checks the formatting of) the given paths.
///
/// Each file uses the nearest `curly.toml` above it, with `overrides`
/// applied on top. Files with syntax errors are skipped with a warning, since
/// formatting recovered placeholders could change their meaning.
pub fn run_fmt(paths: &[String], check_only: bool, overrides: FormatOverrides) -> Result<()> {
    let files = collect_source_files(paths)?;

    let mut changed: Vec<Utf8PathBuf> = Vec::new();
    let mut skipped: Vec<Utf8PathBuf> = Vec::new();

    for file in &files {
        let original = read_source(file)?;
        let options = format_options(file, overrides)?;
        let Some(formatted) = format_source(&original, &options) else {
            eprintln!("warning: skipping '{file}' (has syntax errors)");
            skipped.push(file.clone());
            continue;
        };
        if formatted == original {
            debug!(file = %file, "already formatted");
            continue;
        }
        changed.push(file.clone());

        if check_only {
            print_unified_diff(file, &original, &formatted);
        } else {
            std::fs::write(file, &formatted)
                .into_diagnostic()
                .map_err(|e| miette::miette!("Failed to write '{}': {e}", file))?;
            info!(file = %file, "formatted");
        }
    }

    if check_only {
        let mut parts: Vec<String> = Vec::new();
        if !changed.is_empty() {
            parts.push(format!("{} would be reformatted", plural(changed.len())));
        }
        if !skipped.is_empty() {
            parts.push(format!(
                "{} could not be checked (syntax errors)",
                plural(skipped.len())
            ));
        }
        if !parts.is_empty() {
            miette::bail!("{}", parts.join("; "));
        }
    }

    Ok(())
}

/// Canonical text of a source file, or `None` if it has syntax errors.
/// The result always ends with a newline unless it is empty.
pub fn format_source(source: &str, options: &FormatOptions) -> Option<String> {
    let result = parse(source);
    if result.has_errors() {
        return None;
    }
    let formatted = render_tree(&result.tree, &RenderMode::Canonical(*options));
    Some(if formatted.is_empty() || formatted.ends_with('\n') {
        formatted
    } else {
        format!("{formatted}\n")
    })
}

fn plural(count: usize) -> String {
    if count == 1 {
        "1 file".to_string()
    } else {
        format!("{count} files")
    }
}

/// Output goes to stdout so it can be captured and piped.
fn print_unified_diff(path: &Utf8Path, original: &str, formatted: &str) {
    let diff = TextDiff::from_lines(original, formatted);
    print!(
        "{}",
        diff.unified_diff()
            .header(&format!("a/{path}"), &format!("b/{path}"))
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const MESSY: &str = "class A{int x=1;void F(){x++;}}";

    fn utf8(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap()
    }

    #[test]
    fn format_source_is_stable() {
        let options = FormatOptions::default();
        let once = format_source(MESSY, &options).unwrap();
        assert!(once.ends_with('\n'));
        assert_eq!(format_source(&once, &options).unwrap(), once);
    }

    #[test]
    fn syntax_errors_are_not_formatted() {
        assert!(format_source("class A { int = ; }", &FormatOptions::default()).is_none());
    }

    #[test]
    fn fmt_rewrites_files_in_place() {
        let temp = TempDir::new().unwrap();
        let file = utf8(&temp).join("a.cs");
        fs::write(&file, MESSY).unwrap();

        run_fmt(&[file.to_string()], false, FormatOverrides::default()).unwrap();
        let written = fs::read_to_string(&file).unwrap();
        assert_eq!(
            Some(written.clone()),
            format_source(MESSY, &FormatOptions::default())
        );

        run_fmt(&[file.to_string()], true, FormatOverrides::default()).unwrap();
        assert_eq!(fs::read_to_string(&file).unwrap(), written);
    }

    #[test]
    fn check_fails_without_writing() {
        let temp = TempDir::new().unwrap();
        let file = utf8(&temp).join("a.cs");
        fs::write(&file, MESSY).unwrap();

        let err = run_fmt(&[file.to_string()], true, FormatOverrides::default()).unwrap_err();
        assert!(err.to_string().contains("1 file would be reformatted"));
        assert_eq!(fs::read_to_string(&file).unwrap(), MESSY);
    }

    #[test]
    fn check_reports_unparsable_files() {
        let temp = TempDir::new().unwrap();
        let file = utf8(&temp).join("bad.cs");
        fs::write(&file, "class {").unwrap();

        let err = run_fmt(&[file.to_string()], true, FormatOverrides::default()).unwrap_err();
        assert!(err.to_string().contains("could not be checked"));
    }

    #[test]
    fn configuration_sets_indentation() {
        let temp = TempDir::new().unwrap();
        let root = utf8(&temp);
        fs::write(root.join("curly.toml"), "[format]\nindent_width = 2\n").unwrap();
        let file = root.join("a.cs");
        fs::write(&file, "class A { int x; }").unwrap();

        run_fmt(&[root.to_string()], false, FormatOverrides::default()).unwrap();
        assert_eq!(fs::read_to_string(&file).unwrap(), "class A\n{\n  int x;\n}\n");
    }
}
