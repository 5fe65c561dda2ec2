//! Error reporting specs

use crate::prelude::*;
use std::ffi::OsStr;

#[test]
fn unknown_command_fails() {
    let store = Store::empty();
    store.oplog().args(&["frobnicate"]).fails();
}

#[test]
fn show_missing_operation_fails() {
    let store = Store::empty();
    store
        .oplog()
        .args(&["show", "nope"])
        .fails()
        .stderr_has("operation not found: nope");
}

#[test]
fn operation_without_plan_is_rejected() {
    let store = Store::empty();
    store
        .oplog()
        .args(&["log", "update", "--id", "op-1"])
        .fails()
        .stderr_has("no plan id");
}

#[test]
fn invalid_payload_is_rejected() {
    let store = Store::empty();
    store
        .oplog()
        .args(&["log", "update", "--id", "op-1", "--plan", "p", "--payload", "{not json"])
        .fails()
        .stderr_has("--payload is not valid JSON");
}

#[test]
fn unusable_directory_reports_storage_unavailable() {
    let store = Store::empty();
    store.file("blocker", "plain file");
    let dir = store.path().join("blocker").join("oplog");

    store
        .oplog_bare()
        .args_os(&[OsStr::new("--dir"), dir.as_os_str()])
        .args(&["history", "p"])
        .fails()
        .stderr_has("storage unavailable");
}

#[test]
fn zero_retention_is_rejected() {
    let store = Store::empty();
    store
        .oplog()
        .args(&["gc", "--retention", "0"])
        .fails()
        .stderr_has("retention must be at least 1");
}
