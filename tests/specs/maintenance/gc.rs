//! Garbage collection and compaction specs

use crate::prelude::*;

fn log_and_ack(store: &Store, count: i64) {
    for i in 0..count {
        let id = format!("op-{i}");
        store.log(&id, "p1", i);
        store.oplog().args(&["ack", &id]).passes();
    }
}

#[test]
fn gc_keeps_most_recent_applied() {
    let store = Store::empty();
    log_and_ack(&store, 5);
    store.log("pending", "p1", 0);

    store
        .oplog()
        .args(&["gc", "--retention", "2"])
        .passes()
        .stdout_has("Removed 3 applied operations from 1 plans");

    let run = store
        .oplog()
        .args(&["--format", "json", "history", "p1"])
        .passes();
    assert_eq!(run.json_ids(), vec!["pending", "op-3", "op-4"]);
}

#[test]
fn gc_under_retention_is_a_no_op() {
    let store = Store::empty();
    log_and_ack(&store, 2);

    let run = store
        .oplog()
        .args(&["--format", "json", "gc"])
        .passes();
    assert_eq!(run.json()["removed"], 0);
}

#[test]
fn stats_counts_pending_and_applied() {
    let store = Store::empty();
    log_and_ack(&store, 2);
    store.log("x", "p2", 1);

    store
        .oplog()
        .args(&["stats"])
        .passes()
        .stdout_has("Operations: 3 (1 pending, 2 applied)");

    let run = store
        .oplog()
        .args(&["--format", "json", "stats"])
        .passes();
    let json = run.json();
    assert_eq!(json["plans"]["p1"]["applied"], 2);
    assert_eq!(json["plans"]["p2"]["pending"], 1);
}

#[test]
fn compact_drops_dead_entries() {
    let store = Store::empty();
    log_and_ack(&store, 3);
    store.oplog().args(&["remove", "op-0"]).passes();

    store
        .oplog()
        .args(&["compact"])
        .passes()
        .stdout_has("Compacted:");

    let run = store
        .oplog()
        .args(&["--format", "json", "stats"])
        .passes();
    assert_eq!(run.json()["dead_entries"], 0);

    let run = store
        .oplog()
        .args(&["--format", "json", "history", "p1"])
        .passes();
    assert_eq!(run.json_ids(), vec!["op-1", "op-2"]);
}
