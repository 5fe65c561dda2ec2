// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output formatting for CLI commands

use clap::ValueEnum;
use oplog_core::Operation;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Print output in the specified format
pub fn print<T: Serialize + fmt::Display>(value: &T, format: OutputFormat) {
    match format {
        OutputFormat::Text => println!("{}", value),
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(value) {
                println!("{}", json);
            }
        }
    }
}

/// Print a list of items, or `empty` in text mode when there are none
pub fn print_list<T: Serialize + fmt::Display>(items: &[T], format: OutputFormat, empty: &str) {
    match format {
        OutputFormat::Text if items.is_empty() => println!("{}", empty),
        OutputFormat::Text => {
            for item in items {
                println!("{}", item);
            }
        }
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(items) {
                println!("{}", json);
            }
        }
    }
}

/// One operation as a table row; serializes as the full record
#[derive(Serialize)]
#[serde(transparent)]
pub struct OperationRow(pub Operation);

impl fmt::Display for OperationRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = &self.0;
        write!(
            f,
            "{:<24} {:>14} {:<8} {:<12} {}",
            truncate(op.id.as_str(), 24),
            op.timestamp,
            if op.applied { "applied" } else { "pending" },
            truncate(&op.op_type, 12),
            op.plan_id
        )
    }
}

pub fn rows(ops: Vec<Operation>) -> Vec<OperationRow> {
    ops.into_iter().map(OperationRow).collect()
}

/// Multi-line detail view of one operation
#[derive(Serialize)]
#[serde(transparent)]
pub struct OperationDetail(pub Operation);

impl fmt::Display for OperationDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = &self.0;
        writeln!(f, "Operation: {}", op.id)?;
        writeln!(f, "  Type: {}", op.op_type)?;
        writeln!(f, "  Plan: {}", op.plan_id)?;
        writeln!(f, "  Timestamp: {}", op.timestamp)?;
        if let Some(session) = &op.session_id {
            writeln!(f, "  Session: {}", session)?;
        }
        writeln!(f, "  Logged: {}", op.logged_at.to_rfc3339())?;
        match op.applied_at {
            Some(at) => writeln!(f, "  Applied: {}", at.to_rfc3339())?,
            None => writeln!(f, "  Applied: no")?,
        }
        if !op.vector_clock.is_empty() {
            writeln!(f, "  Vector clock: {}", op.vector_clock.value())?;
        }
        write!(f, "  Payload: {}", op.payload.value())
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
