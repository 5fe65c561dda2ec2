//! Replay specs

use crate::prelude::*;

#[test]
fn replay_summarizes_history_by_type() {
    let store = Store::empty();
    for (id, op_type, ts) in [("a", "add_item", "1"), ("b", "add_item", "2"), ("c", "rename", "3")] {
        store
            .oplog()
            .args(&["log", op_type, "--id", id, "--plan", "trip", "--timestamp", ts])
            .passes();
    }
    store.oplog().args(&["ack", "a"]).passes();

    store
        .oplog()
        .args(&["replay", "trip"])
        .passes()
        .stdout_has("Plan trip: 3 operations (2 pending)")
        .stdout_has("Span: 1 .. 3");

    let run = store
        .oplog()
        .args(&["--format", "json", "replay", "trip"])
        .passes();
    let json = run.json();
    assert_eq!(json["by_type"]["add_item"], 2);
    assert_eq!(json["by_type"]["rename"], 1);
    assert_eq!(json["skipped"].as_array().unwrap().len(), 0);
}

#[test]
fn replay_is_repeatable() {
    let store = Store::empty();
    store.log("a", "trip", 1);
    store.log("b", "trip", 2);

    let first = store
        .oplog()
        .args(&["--format", "json", "replay", "trip"])
        .passes();
    let second = store
        .oplog()
        .args(&["--format", "json", "replay", "trip"])
        .passes();
    similar_asserts::assert_eq!(first.stdout(), second.stdout());
}

#[test]
fn replay_skips_blank_types() {
    let store = Store::empty();
    store.log("a", "trip", 1);
    store
        .oplog()
        .args(&["log", " ", "--id", "blank", "--plan", "trip", "--timestamp", "2"])
        .passes();

    store
        .oplog()
        .args(&["replay", "trip"])
        .passes()
        .stdout_has("Plan trip: 1 operations")
        .stdout_has("Skipped: blank");
}
