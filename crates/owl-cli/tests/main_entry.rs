//! Integration tests for the `owl` binary entry point.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::str::contains;

#[test]
fn help_lists_the_keyword_flag() {
    let mut command = cargo_bin_cmd!("owl");
    command.arg("--help");
    command.assert().success().stdout(contains("--kw"));
}

#[test]
fn missing_method_is_a_usage_error() {
    let mut command = cargo_bin_cmd!("owl");
    command.assert().code(2).stderr(contains("METHOD"));
}

#[test]
fn malformed_keywords_are_rejected() {
    let mut command = cargo_bin_cmd!("owl");
    command.args(["--port", "1", "echo", "--kw", "owner"]);
    command
        .assert()
        .failure()
        .stderr(contains("NAME=VALUE"));
}
