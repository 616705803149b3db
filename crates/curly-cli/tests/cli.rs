// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Tests that run the `curly` binary against temporary directories.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn curly(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_curly"))
        .args(args)
        .current_dir(dir)
        .env_remove("CURLY_LOG")
        .output()
        .expect("failed to run curly")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn fmt_check_prints_a_diff_and_fails() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("a.cs"), "class A{int x;}").unwrap();

    let output = curly(temp.path(), &["fmt", "--check"]);
    assert!(!output.status.success());
    let diff = stdout(&output);
    assert!(diff.contains("-class A{int x;}"), "{diff}");
    assert!(diff.contains("+class A"), "{diff}");
    assert!(stderr(&output).contains("would be reformatted"));
    assert_eq!(
        fs::read_to_string(temp.path().join("a.cs")).unwrap(),
        "class A{int x;}"
    );
}

#[test]
fn fmt_then_check_passes() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("a.cs"), "class A{int x;}").unwrap();

    assert!(curly(temp.path(), &["fmt", "--indent-width", "2"]).status.success());
    assert_eq!(
        fs::read_to_string(temp.path().join("a.cs")).unwrap(),
        "class A\n{\n  int x;\n}\n"
    );
    assert!(
        curly(temp.path(), &["fmt", "--check", "--indent-width", "2"])
            .status
            .success()
    );
}

#[test]
fn check_reports_unresolved_names_as_warnings() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("a.cs"), "class A { Missing m; }").unwrap();

    let output = curly(temp.path(), &["check"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stderr(&output).contains("Missing"));

    let denied = curly(temp.path(), &["check", "--deny-warnings"]);
    assert!(!denied.status.success());
}

#[test]
fn check_fails_on_syntax_errors() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("a.cs"), "class A { int = ; }").unwrap();
    let output = curly(temp.path(), &["check", "a.cs"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("a.cs"));
}

#[test]
fn describe_outlines_declarations() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("a.cs"),
        "namespace N { class A { void F(int x) { } } }",
    )
    .unwrap();
    let output = curly(temp.path(), &["describe", "a.cs"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("class N.A"), "{text}");
    assert!(text.contains("method F(int) -> void"), "{text}");
}

#[test]
fn tokens_lists_the_stream() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("a.cs"), "x = 1;").unwrap();
    let output = curly(temp.path(), &["tokens", "a.cs"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).lines().count(), 5);
}

#[test]
fn missing_files_fail_cleanly() {
    let temp = TempDir::new().unwrap();
    let output = curly(temp.path(), &["describe", "nope.cs"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("nope.cs"));
}
