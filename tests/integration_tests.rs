//! Integration tests for the lightcmd CLI
//!
//! These tests exercise the bundled lightweight commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to get a lightcmd command isolated from the user's configuration
fn lightcmd() -> Command {
    let mut cmd = Command::cargo_bin("lightcmd").unwrap();
    cmd.env_remove("LIGHTCMD_CONFIG")
        .env_remove("LIGHTCMD_LOG")
        .env_remove("LIGHTCMD_UNRECOGNIZED_OPTIONS")
        .env_remove("RUST_LOG");
    cmd
}

// ============================================================================
// Help and routing
// ============================================================================

#[test]
fn test_help_lists_commands() {
    lightcmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("greet"))
        .stdout(predicate::str::contains("echo"))
        .stdout(predicate::str::contains("Greet someone by name"));
}

#[test]
fn test_version() {
    lightcmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_command_help_shows_options() {
    lightcmd()
        .args(["greet", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--name <name>"))
        .stdout(predicate::str::contains("shout the greeting"));
}

#[test]
fn test_no_command_fails() {
    lightcmd().assert().failure();
}

#[test]
fn test_unknown_command_fails() {
    lightcmd()
        .arg("wave")
        .assert()
        .failure()
        .stderr(predicate::str::contains("wave"));
}

// ============================================================================
// greet
// ============================================================================

#[test]
fn test_greet_positional() {
    lightcmd()
        .args(["greet", "Ada"])
        .assert()
        .success()
        .stdout("Hello, Ada!\n");
}

#[test]
fn test_greet_name_key() {
    lightcmd()
        .args(["greet", "--name", "Ada"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Hello, Ada!"));
}

#[test]
fn test_greet_shortcut_and_loud_flag() {
    lightcmd()
        .args(["-g", "-l", "Ada"])
        .assert()
        .success()
        .stdout("HELLO, ADA!\n");
}

#[test]
fn test_greet_negative_name_value() {
    lightcmd()
        .args(["greet", "-n", "-5"])
        .assert()
        .success()
        .stdout("Hello, -5!\n");
}

#[test]
fn test_greet_unrecognized_option_fails() {
    lightcmd()
        .args(["greet", "--bogus", "Ada"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Unrecognized options: --bogus"));
}

#[test]
fn test_greet_printing_policy_from_env() {
    lightcmd()
        .env("LIGHTCMD_UNRECOGNIZED_OPTIONS", "print_none")
        .args(["greet", "--bogus"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Unrecognized options").not());
}

#[test]
fn test_greet_policy_from_config_file() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("config.yaml");
    fs::write(&path, "fail_on_unrecognized_options: false\n").unwrap();

    lightcmd()
        .env("LIGHTCMD_CONFIG", &path)
        .args(["greet", "--bogus", "Ada"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Unrecognized options: --bogus"))
        .stdout(predicate::str::contains("Hello, Ada!"));
}

// ============================================================================
// echo
// ============================================================================

#[test]
fn test_echo_words() {
    lightcmd()
        .args(["echo", "hello", "world"])
        .assert()
        .success()
        .stdout("hello world\n");
}

#[test]
fn test_echo_tolerates_unrecognized_options() {
    lightcmd()
        .args(["echo", "hello", "--bogus", "world", "-u"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Unrecognized options: --bogus"))
        .stdout(predicate::str::contains("HELLO WORLD"));
}

#[test]
fn test_echo_repeat() {
    lightcmd()
        .args(["echo", "hi", "--repeat", "3"])
        .assert()
        .success()
        .stdout("hi\nhi\nhi\n");
}

#[test]
fn test_echo_bad_repeat_is_a_failure_result() {
    lightcmd()
        .args(["echo", "hi", "--repeat", "x"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid repeat count 'x'"));
}

#[test]
fn test_echo_negative_repeat_is_a_failure_result() {
    lightcmd()
        .args(["echo", "hi", "--repeat", "-1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid repeat count '-1'"));
}

#[test]
fn test_echo_negative_number_words() {
    lightcmd()
        .args(["echo", "-5", "-2.5"])
        .assert()
        .success()
        .stdout("-5 -2.5\n");
}

#[test]
fn test_echo_repeat_does_not_swallow_unrecognized_option() {
    lightcmd()
        .args(["echo", "hi", "-r", "--bogus", "2"])
        .assert()
        .success()
        .stdout("Unrecognized options: --bogus\nhi\nhi\n");
}

#[test]
fn test_echo_requires_words() {
    lightcmd().arg("echo").assert().failure();
}
