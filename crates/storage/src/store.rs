// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WAL-backed operation store with crash recovery
//!
//! `OpStore` owns one log directory. Opening replays the log into an
//! [`OperationIndex`]; every mutation is appended (and fsync'd) before the index
//! changes. Dead entries are dropped by rewriting the log.

use crate::index::{AckOutcome, OperationIndex, PlanStats};
use crate::wal::{Record, WalReader, WalWriter, SCHEMA_VERSION};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use oplog_core::{Operation, OperationId, PlanId};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Log file name inside the store directory
pub const WAL_FILE: &str = "oplog.jsonl";

/// Lock file name inside the store directory
pub const LOCK_FILE: &str = "oplog.lock";

/// Errors from OpStore operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("WAL read error: {0}")]
    WalRead(#[from] crate::wal::WalReadError),
    #[error("store at {} is held by another process", path.display())]
    Locked { path: PathBuf },
    #[error("log schema version {found} is newer than supported version {supported}")]
    IncompatibleSchema { found: u32, supported: u32 },
}

/// Configuration for OpStore
#[derive(Debug, Clone)]
pub struct OpStoreConfig {
    /// Dead entries tolerated before the log is rewritten
    pub compaction_threshold: u64,
    /// Written into every entry
    pub machine_id: String,
}

impl Default for OpStoreConfig {
    fn default() -> Self {
        Self {
            compaction_threshold: 10_000,
            machine_id: uuid::Uuid::new_v4().to_string(),
        }
    }
}

/// Result of a compaction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CompactionResult {
    pub entries_removed: u64,
    pub entries_kept: u64,
    pub bytes_reclaimed: u64,
}

/// Result of a garbage-collection pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GcReport {
    /// Applied records deleted
    pub removed: usize,
    /// Plans that exceeded retention
    pub plans_trimmed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compaction: Option<CompactionResult>,
}

/// Store-wide counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LogStats {
    pub total: usize,
    pub pending: usize,
    pub applied: usize,
    pub wal_entries: u64,
    pub dead_entries: u64,
    pub plans: BTreeMap<PlanId, PlanStats>,
}

/// Durable operation store
pub struct OpStore {
    config: OpStoreConfig,
    dir: PathBuf,
    wal_path: PathBuf,
    writer: WalWriter,
    index: OperationIndex,
    /// Valid entries currently in the log file
    wal_entries: u64,
    // Exclusive advisory lock; released on drop
    _lock: File,
    #[cfg(any(test, feature = "test-support"))]
    fail_appends: bool,
}

impl OpStore {
    /// Open or create a store in the given directory
    ///
    /// Creates the log with a schema header, upgrades headerless logs, and
    /// truncates a torn tail left by a crash.
    pub fn open(dir: &Path, config: OpStoreConfig) -> Result<Self, StoreError> {
        std::fs::create_dir_all(dir)?;
        let lock = acquire_lock(dir)?;

        let wal_path = dir.join(WAL_FILE);
        let replay = replay_log(&wal_path)?;

        // A newer log may hold records this build cannot parse; leave it untouched
        if let Some(found) = replay.schema {
            check_schema(found)?;
        }

        if replay.corrupted {
            let removed = truncate_at(&wal_path, replay.last_valid_position)?;
            tracing::warn!(
                path = %wal_path.display(),
                bytes_removed = removed,
                "truncated torn or corrupt tail of operation log"
            );
        }

        let mut store = Self {
            writer: WalWriter::open(&wal_path, &config.machine_id)?,
            config,
            dir: dir.to_path_buf(),
            wal_path,
            index: replay.index,
            wal_entries: replay.entries,
            _lock: lock,
            #[cfg(any(test, feature = "test-support"))]
            fail_appends: false,
        };

        match replay.schema {
            None if replay.entries == 0 => {
                store.append(Record::Schema {
                    version: SCHEMA_VERSION,
                })?;
                tracing::info!(path = %store.dir.display(), "created operation log");
            }
            Some(SCHEMA_VERSION) => {}
            found => {
                store.compact()?;
                tracing::info!(
                    from = ?found,
                    to = SCHEMA_VERSION,
                    "upgraded operation log schema"
                );
            }
        }

        tracing::debug!(
            records = store.index.len(),
            wal_entries = store.wal_entries,
            "operation log opened"
        );
        Ok(store)
    }

    /// Open with default configuration
    pub fn open_default(dir: &Path) -> Result<Self, StoreError> {
        Self::open(dir, OpStoreConfig::default())
    }

    /// Truncate a log at its first corrupt entry. Returns bytes removed.
    ///
    /// Takes the store lock, so it fails while another process has the store open.
    pub fn repair(dir: &Path) -> Result<u64, StoreError> {
        let wal_path = dir.join(WAL_FILE);
        if !wal_path.exists() {
            return Ok(0);
        }
        let _lock = acquire_lock(dir)?;

        let reader = WalReader::open_or_empty(&wal_path);
        if let Some(Ok(entry)) = reader.entries()?.next() {
            if let Record::Schema { version } = entry.record {
                check_schema(version)?;
            }
        }

        let validation = reader.validate()?;
        if let Some(corruption) = &validation.corruption {
            tracing::warn!(
                line = corruption.line,
                reason = %corruption.reason,
                "operation log corruption found during repair"
            );
            return truncate_at(&wal_path, validation.last_valid_position);
        }
        Ok(0)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    // === Writes ===

    /// Insert or overwrite a record by id
    pub fn log(&mut self, op: Operation) -> Result<Operation, StoreError> {
        self.append(Record::Put {
            operation: op.clone(),
        })?;
        if self.index.put(op.clone()).is_some() {
            tracing::debug!(id = %op.id, plan_id = %op.plan_id, "operation re-logged");
        }
        Ok(op)
    }

    /// Mark a record as server-acknowledged
    ///
    /// Returns None when the id is unknown. Re-acknowledging writes nothing.
    pub fn mark_applied(
        &mut self,
        id: &OperationId,
        at: DateTime<Utc>,
    ) -> Result<Option<Operation>, StoreError> {
        match self.index.get(id) {
            None => return Ok(None),
            Some(op) if op.applied => return Ok(Some(op.clone())),
            Some(_) => {}
        }

        self.append(Record::Applied {
            id: id.clone(),
            applied_at: at,
        })?;
        match self.index.mark_applied(id, at) {
            AckOutcome::Applied(op) | AckOutcome::AlreadyApplied(op) => Ok(Some(op)),
            AckOutcome::NotFound => Ok(None),
        }
    }

    /// Delete one record regardless of state
    pub fn remove(&mut self, id: &OperationId) -> Result<bool, StoreError> {
        if !self.index.contains(id) {
            return Ok(false);
        }
        self.append(Record::Remove {
            ids: vec![id.clone()],
        })?;
        self.index.remove(id);
        self.maybe_compact()?;
        Ok(true)
    }

    /// Delete every record of a plan. Returns how many were removed.
    pub fn clear_plan(&mut self, plan_id: &PlanId) -> Result<usize, StoreError> {
        if self.index.plan_stats(plan_id).total == 0 {
            return Ok(0);
        }
        self.append(Record::ClearPlan {
            plan_id: plan_id.clone(),
        })?;
        let removed = self.index.clear_plan(plan_id).len();
        self.maybe_compact()?;
        Ok(removed)
    }

    // === Reads ===

    pub fn get(&self, id: &OperationId) -> Option<&Operation> {
        self.index.get(id)
    }

    /// Full history of a plan, ascending by timestamp
    pub fn history(&self, plan_id: &PlanId) -> Vec<Operation> {
        self.index.history(plan_id)
    }

    /// Unacknowledged operations of a plan, ascending by timestamp
    pub fn unapplied(&self, plan_id: &PlanId) -> Vec<Operation> {
        self.index.unapplied(plan_id)
    }

    pub fn plans(&self) -> Vec<PlanId> {
        self.index.plans()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn stats(&self) -> LogStats {
        let plans: BTreeMap<_, _> = self
            .index
            .plans()
            .into_iter()
            .map(|plan_id| {
                let stats = self.index.plan_stats(&plan_id);
                (plan_id, stats)
            })
            .collect();

        LogStats {
            total: plans.values().map(|s| s.total).sum(),
            pending: plans.values().map(|s| s.pending).sum(),
            applied: plans.values().map(|s| s.applied).sum(),
            wal_entries: self.wal_entries,
            dead_entries: self.dead_entries(),
            plans,
        }
    }

    // === Maintenance ===

    /// Delete the oldest applied records of every plan holding more than
    /// `retention` of them. Pending records are never touched.
    pub fn collect_garbage(&mut self, retention: usize) -> Result<GcReport, StoreError> {
        let candidates = self.index.gc_candidates(retention);
        if candidates.is_empty() {
            return Ok(GcReport::default());
        }

        let plans_trimmed = candidates.len();
        let ids: Vec<OperationId> = candidates.into_values().flatten().collect();
        let removed = ids.len();

        self.append(Record::Remove { ids: ids.clone() })?;
        for id in &ids {
            self.index.remove(id);
        }

        let compaction = self.compact()?;
        tracing::info!(removed, plans_trimmed, retention, "operation log garbage collected");

        Ok(GcReport {
            removed,
            plans_trimmed,
            compaction: Some(compaction),
        })
    }

    /// Entries in the log that no longer contribute to the index
    pub fn dead_entries(&self) -> u64 {
        // The schema header is always live
        self.wal_entries
            .saturating_sub(self.index.len() as u64 + 1)
    }

    /// Rewrite the log as a schema header plus one put per live record
    ///
    /// Writes to a temporary file and renames it over the log, so a crash
    /// leaves either the old or the new log intact.
    pub fn compact(&mut self) -> Result<CompactionResult, StoreError> {
        let old_size = file_len(&self.wal_path);
        let old_entries = self.wal_entries;

        let temp_path = self.wal_path.with_extension("jsonl.compact.tmp");
        let _ = std::fs::remove_file(&temp_path);
        let kept = {
            let mut temp = WalWriter::open(&temp_path, &self.config.machine_id)?;
            let header = Record::Schema {
                version: SCHEMA_VERSION,
            };
            let puts = self.index.in_log_order().into_iter().map(|op| Record::Put {
                operation: op.clone(),
            });
            temp.append_all(std::iter::once(header).chain(puts))?
        };

        std::fs::rename(&temp_path, &self.wal_path)?;
        File::open(&self.dir)?.sync_all()?;
        self.writer = WalWriter::open(&self.wal_path, &self.config.machine_id)?;
        self.wal_entries = kept;

        let result = CompactionResult {
            entries_removed: old_entries.saturating_sub(kept),
            entries_kept: kept,
            bytes_reclaimed: old_size.saturating_sub(file_len(&self.wal_path)),
        };
        tracing::info!(
            entries_removed = result.entries_removed,
            entries_kept = result.entries_kept,
            bytes_reclaimed = result.bytes_reclaimed,
            "operation log compacted"
        );
        Ok(result)
    }

    pub fn should_compact(&self) -> bool {
        self.dead_entries() > self.config.compaction_threshold
    }

    pub fn maybe_compact(&mut self) -> Result<Option<CompactionResult>, StoreError> {
        if self.should_compact() {
            Ok(Some(self.compact()?))
        } else {
            Ok(None)
        }
    }

    /// Make every later append fail with an IO error
    #[cfg(any(test, feature = "test-support"))]
    pub fn fail_appends(&mut self, fail: bool) {
        self.fail_appends = fail;
    }

    // === Internal ===

    fn append(&mut self, record: Record) -> Result<u64, StoreError> {
        #[cfg(any(test, feature = "test-support"))]
        if self.fail_appends {
            return Err(StoreError::Io(std::io::Error::other("injected append failure")));
        }
        let sequence = self.writer.append(record)?;
        self.wal_entries += 1;
        Ok(sequence)
    }
}

/// State recovered from replaying a log file
struct Replay {
    index: OperationIndex,
    schema: Option<u32>,
    entries: u64,
    last_valid_position: u64,
    corrupted: bool,
}

fn replay_log(wal_path: &Path) -> Result<Replay, StoreError> {
    let mut index = OperationIndex::new();
    let mut schema = None;
    let mut entries = 0u64;
    let mut corrupted = false;

    let mut iter = WalReader::open_or_empty(wal_path).entries()?;
    for result in iter.by_ref() {
        match result {
            Ok(entry) => {
                if let Record::Schema { version } = entry.record {
                    if entries == 0 {
                        schema = Some(version);
                    }
                }
                index.apply(&entry.record);
                entries += 1;
            }
            Err(e) => {
                tracing::warn!(error = %e, "stopping operation log replay at invalid entry");
                corrupted = true;
                break;
            }
        }
    }

    Ok(Replay {
        index,
        schema,
        entries,
        last_valid_position: iter.last_valid_position(),
        corrupted,
    })
}

fn check_schema(found: u32) -> Result<(), StoreError> {
    if found > SCHEMA_VERSION {
        return Err(StoreError::IncompatibleSchema {
            found,
            supported: SCHEMA_VERSION,
        });
    }
    Ok(())
}

fn acquire_lock(dir: &Path) -> Result<File, StoreError> {
    let path = dir.join(LOCK_FILE);
    let mut file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&path)?;

    if file.try_lock_exclusive().is_err() {
        tracing::warn!(path = %path.display(), "operation log is locked by another process");
        return Err(StoreError::Locked {
            path: dir.to_path_buf(),
        });
    }

    // Record the holder for diagnostics
    file.set_len(0)?;
    writeln!(file, "{}", std::process::id())?;
    Ok(file)
}

fn truncate_at(wal_path: &Path, position: u64) -> Result<u64, StoreError> {
    let old_size = file_len(wal_path);
    if position >= old_size {
        return Ok(0);
    }
    let file = OpenOptions::new().write(true).open(wal_path)?;
    file.set_len(position)?;
    file.sync_all()?;
    tracing::info!(position, "operation log truncated at last valid entry");
    Ok(old_size - position)
}

fn file_len(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
