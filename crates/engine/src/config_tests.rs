// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[test]
fn defaults_match_documented_policy() {
    let config = OpLogConfig::default();
    assert_eq!(config.retention, 1000);
    assert_eq!(config.gc_interval, Duration::from_secs(300));
    assert!(config.gc_enabled);
    assert!(config.dir.ends_with("oplog"));
    assert!(config.validate().is_ok());
}

#[test]
fn builder_methods_override_fields() {
    let config = OpLogConfig::new("/tmp/plans")
        .with_gc_interval(Duration::from_secs(1))
        .with_retention(10)
        .with_compaction_threshold(5)
        .with_machine_id("laptop")
        .without_gc();

    assert_eq!(config.dir, PathBuf::from("/tmp/plans"));
    assert_eq!(config.gc_interval, Duration::from_secs(1));
    assert_eq!(config.retention, 10);
    assert!(!config.gc_enabled);

    let store = config.store_config();
    assert_eq!(store.compaction_threshold, 5);
    assert_eq!(store.machine_id, "laptop");
}

#[test]
fn toml_overrides_selected_fields() {
    let config = OpLogConfig::from_toml_str(
        r#"
        dir = "/data/oplog"
        gc_interval = "90s"
        retention = 250
        "#,
    )
    .unwrap();

    assert_eq!(config.dir, PathBuf::from("/data/oplog"));
    assert_eq!(config.gc_interval, Duration::from_secs(90));
    assert_eq!(config.retention, 250);
    assert_eq!(
        config.compaction_threshold,
        OpLogConfig::default().compaction_threshold
    );
}

#[parameterized(
    zero_interval = { r#"gc_interval = "0s""# },
    zero_retention = { "retention = 0" },
    unknown_field = { "retain = 5" },
    bad_duration = { r#"gc_interval = "soon""# },
)]
fn invalid_toml_is_rejected(source: &str) {
    assert!(OpLogConfig::from_toml_str(source).is_err());
}

#[test]
fn load_reads_file_and_reports_missing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("oplog.toml");
    std::fs::write(&path, "retention = 42\n").unwrap();

    assert_eq!(OpLogConfig::load(&path).unwrap().retention, 42);

    let missing = OpLogConfig::load(&dir.path().join("nope.toml"));
    assert!(matches!(missing, Err(ConfigError::Io { .. })));
}

#[test]
fn random_machine_id_when_unset() {
    let config = OpLogConfig::new("/tmp/x");
    assert_ne!(
        config.store_config().machine_id,
        config.store_config().machine_id
    );
}
