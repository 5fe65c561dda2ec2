//! Help output specs

use crate::prelude::*;

#[test]
fn help_lists_commands() {
    let store = Store::empty();
    store
        .oplog()
        .args(&["--help"])
        .passes()
        .stdout_has("log")
        .stdout_has("ack")
        .stdout_has("pending")
        .stdout_has("history")
        .stdout_has("gc")
        .stdout_has("replay");
}

#[test]
fn log_help_describes_plan_flag() {
    let store = Store::empty();
    store
        .oplog()
        .args(&["log", "--help"])
        .passes()
        .stdout_has("--plan")
        .stdout_has("--timestamp");
}

#[test]
fn version_flag_prints_binary_name() {
    use assert_cmd::Command;
    use predicates::prelude::*;

    Command::cargo_bin("oplog")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("oplog "));
}
