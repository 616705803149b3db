// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Curly command-line interface.
//!
//! This is the main entry point for the `curly` command.

use clap::{Parser, Subcommand};
use curly_cli::commands::{self, FormatOverrides};
use miette::Result;
use tracing_subscriber::EnvFilter;

/// Curly: format, check and inspect curly-brace source files
#[derive(Debug, Parser)]
#[command(name = "curly")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). `CURLY_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Format source files in place
    Fmt {
        /// Files or directories to format
        #[arg(default_value = ".")]
        paths: Vec<String>,

        /// Print a diff instead of writing, and fail if anything would change
        #[arg(long)]
        check: bool,

        #[command(flatten)]
        overrides: FormatOverrides,
    },

    /// Parse and resolve source files, reporting diagnostics
    Check {
        /// Files or directories to check
        #[arg(default_value = ".")]
        paths: Vec<String>,

        /// Treat warnings as errors
        #[arg(long)]
        deny_warnings: bool,
    },

    /// Print a one-line summary of every declaration
    Describe {
        /// File to describe
        path: String,
    },

    /// Print the token stream of a file
    Tokens {
        /// File to tokenize
        path: String,

        /// Also print leading and trailing trivia
        #[arg(long)]
        trivia: bool,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Fmt {
            paths,
            check,
            overrides,
        } => commands::fmt::run_fmt(&paths, check, overrides),
        Command::Check {
            paths,
            deny_warnings,
        } => commands::check::run_check(&paths, deny_warnings),
        Command::Describe { path } => commands::describe::run_describe(&path),
        Command::Tokens { path, trivia } => commands::tokens::run_tokens(&path, trivia),
    };

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("{e:?}");
            std::process::exit(1);
        }
    }
}

/// Logs go to stderr so formatted output on stdout stays clean.
fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_env("CURLY_LOG")
        .unwrap_or_else(|_| EnvFilter::new(directive_for_verbosity(verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn directive_for_verbosity(v: u8) -> &'static str {
    match v {
        0 => "curly_cli=warn,curly_core=warn",
        1 => "curly_cli=debug,curly_core=debug",
        _ => "curly_cli=trace,curly_core=trace",
    }
}
