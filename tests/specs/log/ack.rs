//! Acknowledgment specs

use crate::prelude::*;

#[test]
fn acked_operation_leaves_pending() {
    let store = Store::empty();
    store.log("a", "p1", 1);
    store.log("b", "p1", 2);
    store.log("c", "p1", 3);

    store
        .oplog()
        .args(&["ack", "b"])
        .passes()
        .stdout_has("b applied at");

    let run = store
        .oplog()
        .args(&["--format", "json", "pending", "p1"])
        .passes();
    assert_eq!(run.json_ids(), vec!["a", "c"]);
}

#[test]
fn unknown_ack_is_not_an_error() {
    let store = Store::empty();
    store.log("a", "p1", 1);

    store
        .oplog()
        .args(&["ack", "ghost"])
        .passes()
        .stdout_eq("ghost not found\n");

    store.oplog().args(&["pending", "p1"]).passes().stdout_has("a");
}

#[test]
fn ack_many_reports_each() {
    let store = Store::empty();
    store.log("a", "p1", 1);
    store.log("b", "p1", 2);

    let run = store
        .oplog()
        .args(&["--format", "json", "ack", "a", "b", "zzz"])
        .passes();
    let json = run.json();
    assert_eq!(json[0]["found"], true);
    assert_eq!(json[1]["found"], true);
    assert_eq!(json[2]["found"], false);

    store
        .oplog()
        .args(&["pending", "p1"])
        .passes()
        .stdout_eq("No pending operations\n");
}

#[test]
fn show_reports_applied_state() {
    let store = Store::empty();
    store.log("a", "p1", 1);
    store
        .oplog()
        .args(&["show", "a"])
        .passes()
        .stdout_has("Applied: no");

    store.oplog().args(&["ack", "a"]).passes();

    let run = store
        .oplog()
        .args(&["--format", "json", "show", "a"])
        .passes();
    assert_eq!(run.json()["applied"], true);
}
