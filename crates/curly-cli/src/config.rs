// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! `curly.toml` discovery and parsing.
//!
//! The configuration file is looked up from the target path upwards; the
//! innermost `curly.toml` wins. Every section and key is optional:
//!
//! ```toml
//! [format]
//! indent_width = 2
//! max_blank_lines = 1
//! ```

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use curly_core::unparse::FormatOptions;
use serde::Deserialize;
use tracing::debug;

/// Name of the configuration file.
pub const CONFIG_FILE: &str = "curly.toml";

/// Errors reading a configuration file.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ConfigError {
    #[error("failed to read '{path}'")]
    #[diagnostic(code(curly::config::read))]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse '{path}'")]
    #[diagnostic(
        code(curly::config::parse),
        help("see the `[format]` keys: indent_width, max_blank_lines")
    )]
    Parse {
        path: Utf8PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Parsed `curly.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// The `[format]` section.
    pub format: FormatOptions,
}

impl Config {
    /// Parses a configuration file.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    /// Loads the nearest `curly.toml` at or above `start`, or the defaults
    /// when there is none.
    pub fn discover(start: &Utf8Path) -> Result<Self, ConfigError> {
        match find_config(start) {
            Some(path) => {
                debug!(config = %path, "using configuration");
                Self::load(&path)
            }
            None => {
                debug!(dir = %start, "no configuration found, using defaults");
                Ok(Self::default())
            }
        }
    }
}

/// The nearest `curly.toml` at or above `start`. A file path starts the
/// search in its directory.
pub fn find_config(start: &Utf8Path) -> Option<Utf8PathBuf> {
    let mut current = if start.is_file() {
        start.parent()?.to_owned()
    } else {
        start.to_owned()
    };
    loop {
        let candidate = current.join(CONFIG_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn utf8(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap()
    }

    #[test]
    fn nearest_config_wins() {
        let temp = TempDir::new().unwrap();
        let root = utf8(&temp);
        let nested = root.join("a/b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(root.join(CONFIG_FILE), "[format]\nindent_width = 8\n").unwrap();
        fs::write(root.join("a").join(CONFIG_FILE), "[format]\nindent_width = 2\n").unwrap();

        assert_eq!(find_config(&nested), Some(root.join("a").join(CONFIG_FILE)));
        let config = Config::discover(&nested).unwrap();
        assert_eq!(config.format.indent_width, 2);
        assert_eq!(config.format.max_blank_lines, 1);
    }

    #[test]
    fn file_paths_search_from_their_directory() {
        let temp = TempDir::new().unwrap();
        let root = utf8(&temp);
        fs::write(root.join(CONFIG_FILE), "[format]\nmax_blank_lines = 0\n").unwrap();
        let file = root.join("main.cs");
        fs::write(&file, "class A { }\n").unwrap();

        let config = Config::discover(&file).unwrap();
        assert_eq!(config.format.max_blank_lines, 0);
        assert_eq!(config.format.indent_width, 4);
    }

    #[test]
    fn empty_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let path = utf8(&temp).join(CONFIG_FILE);
        fs::write(&path, "").unwrap();
        assert_eq!(Config::load(&path).unwrap(), Config::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let temp = TempDir::new().unwrap();
        let path = utf8(&temp).join(CONFIG_FILE);
        fs::write(&path, "[formatting]\nindent_width = 2\n").unwrap();
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains(CONFIG_FILE));
    }

    #[test]
    fn wrong_types_are_rejected() {
        let temp = TempDir::new().unwrap();
        let path = utf8(&temp).join(CONFIG_FILE);
        fs::write(&path, "[format]\nindent_width = \"wide\"\n").unwrap();
        assert!(matches!(
            Config::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let temp = TempDir::new().unwrap();
        let path = utf8(&temp).join(CONFIG_FILE);
        assert!(matches!(Config::load(&path), Err(ConfigError::Read { .. })));
    }
}
