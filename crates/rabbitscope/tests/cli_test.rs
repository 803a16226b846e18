#![allow(clippy::unwrap_used)]
// Surface tests for the `rabbitscope` binary.

use assert_cmd::Command;
use predicates::prelude::*;

fn rabbitscope() -> Command {
    Command::cargo_bin("rabbitscope").unwrap()
}

#[test]
fn help_lists_both_subcommands() {
    rabbitscope()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("tui"));
}

#[test]
fn no_arguments_is_a_usage_error() {
    rabbitscope().assert().failure().code(2);
}

#[test]
fn generate_rejects_an_unparseable_uri() {
    rabbitscope()
        .args(["generate", "--uri", "::not-a-uri::", "--out", "/dev/null"])
        .assert()
        .failure()
        .code(7)
        .stderr(predicate::str::contains("connect"));
}

#[test]
fn generate_fails_with_connection_exit_code_when_broker_is_down() {
    // Port 1 is essentially never listening; connection is refused
    // immediately without leaving the machine.
    rabbitscope()
        .args([
            "generate",
            "--uri",
            "http://127.0.0.1:1",
            "--out",
            "/dev/null",
        ])
        .assert()
        .failure()
        .code(7);
}

#[test]
fn tui_rejects_a_malformed_refresh_interval() {
    rabbitscope()
        .args(["tui", "--refresh-interval", "soon"])
        .assert()
        .failure()
        .code(2);
}
