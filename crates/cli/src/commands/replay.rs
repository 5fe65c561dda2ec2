// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Replay a plan's history into a summary of what it contains

use super::query::PlanArgs;
use crate::output::{self, OutputFormat};
use oplog_engine::{ApplyError, OpLog, Operation, OperationId, PlanId};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Counts folded from history
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub operations: usize,
    pub pending: usize,
    pub by_type: BTreeMap<String, usize>,
    pub first_timestamp: Option<i64>,
    pub last_timestamp: Option<i64>,
}

/// Applier for [`Summary`]; rejects operations with an empty type
pub fn summarize_step(state: &Summary, op: &Operation) -> Result<Summary, ApplyError> {
    if op.op_type.trim().is_empty() {
        return Err(ApplyError::UnsupportedType(op.op_type.clone()));
    }

    let mut next = state.clone();
    next.operations += 1;
    if op.is_pending() {
        next.pending += 1;
    }
    *next.by_type.entry(op.op_type.clone()).or_default() += 1;
    next.first_timestamp = Some(next.first_timestamp.map_or(op.timestamp, |t| t.min(op.timestamp)));
    next.last_timestamp = Some(next.last_timestamp.map_or(op.timestamp, |t| t.max(op.timestamp)));
    Ok(next)
}

#[derive(Serialize)]
struct ReplayView {
    plan_id: PlanId,
    #[serde(flatten)]
    summary: Summary,
    skipped: Vec<OperationId>,
}

impl fmt::Display for ReplayView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.summary;
        write!(
            f,
            "Plan {}: {} operations ({} pending)",
            self.plan_id, s.operations, s.pending
        )?;
        if let (Some(first), Some(last)) = (s.first_timestamp, s.last_timestamp) {
            write!(f, "\n  Span: {} .. {}", first, last)?;
        }
        for (op_type, count) in &s.by_type {
            write!(f, "\n  {:<16} {}", op_type, count)?;
        }
        if !self.skipped.is_empty() {
            let skipped: Vec<_> = self.skipped.iter().map(|id| id.as_str()).collect();
            write!(f, "\n  Skipped: {}", skipped.join(", "))?;
        }
        Ok(())
    }
}

pub async fn summarize(log: &OpLog, args: PlanArgs, format: OutputFormat) -> anyhow::Result<()> {
    let plan_id = args.plan_id();
    let replayed = log
        .replay(&plan_id, Summary::default(), &summarize_step)
        .await?;
    output::print(
        &ReplayView {
            plan_id,
            summary: replayed.state,
            skipped: replayed.skipped,
        },
        format,
    );
    Ok(())
}

#[cfg(test)]
#[path = "replay_tests.rs"]
mod tests;
