//! Durability and recovery specs

use crate::prelude::*;
use std::io::Write;

fn append_garbage(store: &Store) {
    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .open(store.path().join("oplog.jsonl"))
        .unwrap();
    file.write_all(br#"{"sequence":99,"timest"#).unwrap();
}

#[test]
fn log_file_is_created_with_schema_header() {
    let store = Store::empty();
    store.log("a", "p1", 1);

    let log = store.read("oplog.jsonl");
    let first = log.lines().next().unwrap();
    assert!(first.contains(r#""kind":"schema""#), "{first}");
    assert_eq!(log.lines().count(), 2);
}

#[test]
fn repair_on_intact_log() {
    let store = Store::empty();
    store.log("a", "p1", 1);

    store
        .oplog()
        .args(&["repair"])
        .passes()
        .stdout_eq("Log is intact\n");
}

#[test]
fn repair_truncates_torn_tail() {
    let store = Store::empty();
    store.log("a", "p1", 1);
    append_garbage(&store);

    store
        .oplog()
        .args(&["repair"])
        .passes()
        .stdout_has("Truncated");

    let run = store
        .oplog()
        .args(&["--format", "json", "history", "p1"])
        .passes();
    assert_eq!(run.json_ids(), vec!["a"]);
}

#[test]
fn torn_tail_is_ignored_on_open() {
    let store = Store::empty();
    store.log("a", "p1", 1);
    append_garbage(&store);

    store.log("b", "p1", 2);

    let run = store
        .oplog()
        .args(&["--format", "json", "history", "p1"])
        .passes();
    assert_eq!(run.json_ids(), vec!["a", "b"]);

    for line in store.read("oplog.jsonl").lines() {
        serde_json::from_str::<serde_json::Value>(line).unwrap();
    }
}
