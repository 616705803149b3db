// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Subcommands and the file handling they share.

pub mod check;
pub mod describe;
pub mod fmt;
pub mod tokens;

use std::collections::HashSet;
use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use curly_core::unparse::FormatOptions;
use miette::{Context, IntoDiagnostic, Result};

use crate::config::Config;

/// Extension of source files collected from directories.
pub const SOURCE_EXTENSION: &str = "cs";

/// Format settings given on the command line; they override `curly.toml`.
#[derive(Debug, Clone, Copy, Default, clap::Args)]
pub struct FormatOverrides {
    /// Spaces per indentation level
    #[arg(long)]
    pub indent_width: Option<usize>,

    /// Longest run of blank lines to keep
    #[arg(long)]
    pub max_blank_lines: Option<usize>,
}

impl FormatOverrides {
    /// Applies the overrides on top of configured options.
    #[must_use]
    pub fn apply(self, mut options: FormatOptions) -> FormatOptions {
        if let Some(width) = self.indent_width {
            options.indent_width = width;
        }
        if let Some(max) = self.max_blank_lines {
            options.max_blank_lines = max;
        }
        options
    }
}

/// Format options for a target path: its nearest `curly.toml`, then the
/// command-line overrides.
pub fn format_options(path: &Utf8Path, overrides: FormatOverrides) -> Result<FormatOptions> {
    let config = Config::discover(path)?;
    Ok(overrides.apply(config.format))
}

/// Expands files and directories into source files, in a stable order and
/// without duplicates. Explicitly named files are accepted whatever their
/// extension.
pub fn collect_source_files(paths: &[String]) -> Result<Vec<Utf8PathBuf>> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();
    for path in paths {
        let path = Utf8PathBuf::from(path);
        if path.is_file() {
            if seen.insert(path.clone()) {
                files.push(path);
            }
        } else if path.is_dir() {
            let mut found = Vec::new();
            collect_recursive(&path, &mut found)?;
            found.sort();
            files.extend(found.into_iter().filter(|f| seen.insert(f.clone())));
        } else {
            miette::bail!("Path '{}' does not exist", path);
        }
    }
    if files.is_empty() {
        miette::bail!("No .{SOURCE_EXTENSION} source files found");
    }
    Ok(files)
}

/// Symlinks are skipped to avoid cycles.
fn collect_recursive(dir: &Utf8Path, files: &mut Vec<Utf8PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read directory '{dir}'"))?
    {
        let entry = entry.into_diagnostic()?;
        let file_type = entry.file_type().into_diagnostic()?;
        if file_type.is_symlink() {
            continue;
        }
        let entry_path = Utf8PathBuf::from_path_buf(entry.path())
            .map_err(|_| miette::miette!("Non-UTF-8 path in '{dir}'"))?;
        if file_type.is_dir() {
            collect_recursive(&entry_path, files)?;
        } else if file_type.is_file() && entry_path.extension() == Some(SOURCE_EXTENSION) {
            files.push(entry_path);
        }
    }
    Ok(())
}

/// Reads a source file.
pub fn read_source(file: &Utf8Path) -> Result<String> {
    fs::read_to_string(file)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read '{file}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn utf8(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap()
    }

    #[test]
    fn directories_are_walked_in_order() {
        let temp = TempDir::new().unwrap();
        let root = utf8(&temp);
        fs::create_dir_all(root.join("b")).unwrap();
        fs::write(root.join("b/z.cs"), "").unwrap();
        fs::write(root.join("a.cs"), "").unwrap();
        fs::write(root.join("notes.txt"), "").unwrap();

        let files = collect_source_files(&[root.to_string()]).unwrap();
        assert_eq!(files, [root.join("a.cs"), root.join("b/z.cs")]);
    }

    #[test]
    fn files_are_not_repeated() {
        let temp = TempDir::new().unwrap();
        let root = utf8(&temp);
        fs::write(root.join("a.cs"), "").unwrap();
        let file = root.join("a.cs").to_string();

        let files = collect_source_files(&[file.clone(), root.to_string(), file]).unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn missing_paths_and_empty_directories_fail() {
        let temp = TempDir::new().unwrap();
        let root = utf8(&temp);
        assert!(collect_source_files(&[root.join("nope").to_string()]).is_err());
        assert!(collect_source_files(&[root.to_string()]).is_err());
    }

    #[test]
    fn overrides_win_over_configuration() {
        let temp = TempDir::new().unwrap();
        let root = utf8(&temp);
        fs::write(
            root.join("curly.toml"),
            "[format]\nindent_width = 2\nmax_blank_lines = 3\n",
        )
        .unwrap();
        let overrides = FormatOverrides {
            indent_width: Some(8),
            max_blank_lines: None,
        };
        let options = format_options(&root, overrides).unwrap();
        assert_eq!(options.indent_width, 8);
        assert_eq!(options.max_blank_lines, 3);
    }
}
