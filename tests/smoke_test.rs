//! Smoke tests for the Epicgrid CLI.
//!
//! These tests verify basic CLI functionality without contacting Jira:
//! - `epicgrid --version` outputs version info
//! - `epicgrid --help` outputs help text
//! - bad flags are rejected before any request is made

use assert_cmd::Command;
use predicates::prelude::*;

/// Get a Command for the epicgrid binary.
fn epicgrid() -> Command {
    Command::new(env!("CARGO_BIN_EXE_epicgrid"))
}

#[test]
fn test_version_flag() {
    epicgrid()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("epicgrid"))
        .stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn test_help_flag() {
    epicgrid()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Options:"))
        .stdout(predicate::str::contains("--showBlockers"))
        .stdout(predicate::str::contains("--showDone"))
        .stdout(predicate::str::contains("--outFileName"));
}

#[test]
fn test_help_flag_short() {
    epicgrid()
        .arg("-h")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"));
}

#[test]
fn test_invalid_flag() {
    epicgrid()
        .arg("--no-such-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_toggle_rejects_non_binary_value() {
    epicgrid()
        .args(["-d", "yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected 0 or 1"));
}

#[test]
fn test_unknown_format_rejected() {
    epicgrid()
        .args(["--format", "csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}
