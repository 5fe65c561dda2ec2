//! Removal specs

use crate::prelude::*;

#[test]
fn remove_single_operation() {
    let store = Store::empty();
    store.log("a", "p1", 1);
    store.log("b", "p1", 2);

    store
        .oplog()
        .args(&["remove", "a"])
        .passes()
        .stdout_eq("Removed a\n");
    store
        .oplog()
        .args(&["remove", "a"])
        .passes()
        .stdout_eq("a not found\n");

    let run = store
        .oplog()
        .args(&["--format", "json", "history", "p1"])
        .passes();
    assert_eq!(run.json_ids(), vec!["b"]);
}

#[test]
fn clear_removes_whole_plan() {
    let store = Store::empty();
    store.log("a", "p1", 1);
    store.log("b", "p1", 2);
    store.log("c", "p2", 3);

    store
        .oplog()
        .args(&["clear", "p1"])
        .passes()
        .stdout_eq("Removed 2 operations from p1\n");

    store.oplog().args(&["plans"]).passes().stdout_eq("p2\n");
}
