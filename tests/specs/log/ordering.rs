//! Ordering specs
//!
//! History and pending queries return operations by timestamp, whatever
//! order they were logged in.

use crate::prelude::*;

#[test]
fn history_sorted_by_timestamp() {
    let store = Store::empty();
    store.log("late", "p1", 300);
    store.log("early", "p1", 100);
    store.log("middle", "p1", 200);

    let run = store
        .oplog()
        .args(&["--format", "json", "history", "p1"])
        .passes();
    assert_eq!(run.json_ids(), vec!["early", "middle", "late"]);
}

#[test]
fn equal_timestamps_keep_log_order() {
    let store = Store::empty();
    store.log("second-logged", "p1", 100);
    store.log("third-logged", "p1", 100);
    store.log("first", "p1", 50);

    let run = store
        .oplog()
        .args(&["--format", "json", "history", "p1"])
        .passes();
    assert_eq!(run.json_ids(), vec!["first", "second-logged", "third-logged"]);
}

#[test]
fn history_is_scoped_to_plan() {
    let store = Store::empty();
    store.log("a", "p1", 1);
    store.log("b", "p2", 2);

    let run = store
        .oplog()
        .args(&["--format", "json", "history", "p1"])
        .passes();
    assert_eq!(run.json_ids(), vec!["a"]);
    store
        .oplog()
        .args(&["history", "p1"])
        .passes()
        .stdout_has("p1")
        .stdout_lacks("p2");
}

#[test]
fn empty_history_message() {
    let store = Store::empty();
    store
        .oplog()
        .args(&["history", "nothing"])
        .passes()
        .stdout_eq("No operations\n");
}

#[test]
fn plan_taken_from_payload() {
    let store = Store::empty();
    store
        .oplog()
        .args(&["log", "rename", "--id", "op-1", "--payload", r#"{"planId":"trip"}"#])
        .passes()
        .stdout_has("Plan: trip");

    store.oplog().args(&["plans"]).passes().stdout_eq("trip\n");
}

#[test]
fn relog_overwrites_existing_id() {
    let store = Store::empty();
    store.log("a", "p1", 1);
    store
        .oplog()
        .args(&["log", "update", "--id", "a", "--plan", "p1", "--timestamp", "1", "--payload", r#"{"v":2}"#])
        .passes();

    let run = store
        .oplog()
        .args(&["--format", "json", "history", "p1"])
        .passes();
    let json = run.json();
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["payload"]["v"], 2);
}

#[test]
fn dir_from_environment() {
    let store = Store::empty();
    store
        .oplog_bare()
        .env("OPLOG_DIR", store.path())
        .args(&["log", "update", "--id", "a", "--plan", "p1"])
        .passes();

    let run = store
        .oplog()
        .args(&["--format", "json", "history", "p1"])
        .passes();
    assert_eq!(run.json_ids(), vec!["a"]);
}

#[test]
fn dir_from_config_file() {
    let store = Store::empty();
    let data = store.path().join("data");
    store.file(
        "oplog.toml",
        &format!("dir = {:?}\n", data.to_str().unwrap()),
    );
    let config = store.path().join("oplog.toml");

    store
        .oplog_bare()
        .args(&["--config", config.to_str().unwrap(), "log", "update", "--id", "a", "--plan", "p1"])
        .passes();

    assert!(data.join("oplog.jsonl").is_file());
}

#[test]
fn id_is_generated_when_omitted() {
    let store = Store::empty();
    let run = store
        .oplog()
        .args(&["--format", "json", "log", "update", "--plan", "p1"])
        .passes();
    let id = run.json()["id"].as_str().unwrap().to_string();
    assert_eq!(id.len(), 36, "{id}");

    store
        .oplog()
        .args(&["show", &id])
        .passes()
        .stdout_has("Plan: p1");
}
