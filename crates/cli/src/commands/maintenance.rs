// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Maintenance commands: gc, stats, compact, repair

use crate::output::{self, OutputFormat};
use clap::Args;
use oplog_engine::{CompactionResult, GcReport, LogStats, OpLog};
use oplog_storage::OpStore;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct GcArgs {
    /// Applied operations to keep per plan (default: configured retention)
    #[arg(long)]
    pub retention: Option<usize>,
}

#[derive(Serialize)]
#[serde(transparent)]
struct GcView(GcReport);

impl fmt::Display for GcView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Removed {} applied operations from {} plans",
            self.0.removed, self.0.plans_trimmed
        )?;
        if let Some(compaction) = &self.0.compaction {
            write!(f, "\n{}", CompactionView(*compaction))?;
        }
        Ok(())
    }
}

pub async fn gc(log: &OpLog, format: OutputFormat) -> anyhow::Result<()> {
    let report = log.collect_garbage().await?;
    output::print(&GcView(report), format);
    Ok(())
}

#[derive(Serialize)]
#[serde(transparent)]
struct StatsView(LogStats);

impl fmt::Display for StatsView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.0;
        writeln!(
            f,
            "Operations: {} ({} pending, {} applied)",
            s.total, s.pending, s.applied
        )?;
        write!(
            f,
            "Log entries: {} ({} dead)",
            s.wal_entries, s.dead_entries
        )?;
        if !s.plans.is_empty() {
            write!(f, "\n\n{:<24} {:>8} {:>8} {:>8}", "PLAN", "TOTAL", "PENDING", "APPLIED")?;
            for (plan, stats) in &s.plans {
                write!(
                    f,
                    "\n{:<24} {:>8} {:>8} {:>8}",
                    plan, stats.total, stats.pending, stats.applied
                )?;
            }
        }
        Ok(())
    }
}

pub async fn stats(log: &OpLog, format: OutputFormat) -> anyhow::Result<()> {
    let stats = log.stats().await?;
    output::print(&StatsView(stats), format);
    Ok(())
}

#[derive(Serialize)]
#[serde(transparent)]
struct CompactionView(CompactionResult);

impl fmt::Display for CompactionView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Compacted: {} entries removed, {} kept, {} bytes reclaimed",
            self.0.entries_removed, self.0.entries_kept, self.0.bytes_reclaimed
        )
    }
}

pub async fn compact(log: &OpLog, format: OutputFormat) -> anyhow::Result<()> {
    let result = log.compact().await?;
    output::print(&CompactionView(result), format);
    Ok(())
}

#[derive(Serialize)]
struct Repaired {
    dir: PathBuf,
    bytes_removed: u64,
}

impl fmt::Display for Repaired {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bytes_removed == 0 {
            write!(f, "Log is intact")
        } else {
            write!(f, "Truncated {} bytes of corrupt log", self.bytes_removed)
        }
    }
}

pub fn repair(dir: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let bytes_removed = OpStore::repair(dir)?;
    output::print(
        &Repaired {
            dir: dir.to_path_buf(),
            bytes_removed,
        },
        format,
    );
    Ok(())
}
