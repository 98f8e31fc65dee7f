//! Admin CLI contract tests
//!
//! Help output, exit codes, and the fail-fast guarantee: local parse and
//! resolution errors exit 1 before any control-channel traffic.

use assert_cmd::Command;
use predicates::prelude::*;

fn execaudit() -> Command {
    Command::cargo_bin("execaudit").unwrap()
}

#[test]
fn help_lists_the_admin_surface() {
    execaudit()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("on|off"))
        .stdout(predicate::str::contains("--disable"))
        .stdout(predicate::str::contains("--enable"))
        .stdout(predicate::str::contains("--users"))
        .stdout(predicate::str::contains("Log options:"))
        .stdout(predicate::str::contains("tste"));
}

#[test]
fn version_flag_succeeds() {
    execaudit()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("execaudit"));
}

#[test]
fn unknown_log_option_fails_before_any_control_call() {
    // The socket path does not exist; a connect attempt would produce a
    // different error than the parse failure we expect here.
    execaudit()
        .args(["-e", "bogus", "-s", "/nonexistent/execaudit.sock"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unrecognized log option 'bogus'"));
}

#[test]
fn unresolvable_user_fails_before_any_control_call() {
    execaudit()
        .args(["-u", "no-such-user-zz9", "-s", "/nonexistent/execaudit.sock"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cannot resolve 'no-such-user-zz9'"));
}

#[test]
fn invalid_state_keyword_fails() {
    execaudit()
        .args(["maybe", "-s", "/nonexistent/execaudit.sock"])
        .assert()
        .code(1);
}

#[test]
fn unreachable_daemon_reports_protocol_error() {
    execaudit()
        .args(["-s", "/nonexistent/execaudit.sock"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to read policy"));
}
