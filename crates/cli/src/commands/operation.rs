// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Write commands: log, ack, remove

use crate::output::{self, OperationDetail, OutputFormat};
use anyhow::Context;
use clap::Args;
use oplog_engine::{NewOperation, OpLog, OperationId};
use serde::Serialize;
use std::fmt;

#[derive(Args)]
pub struct LogArgs {
    /// Operation type
    #[arg(value_name = "TYPE")]
    pub op_type: String,
    /// Operation id; a fresh UUID when omitted. Reusing an id overwrites.
    #[arg(long)]
    pub id: Option<String>,
    /// Plan id; taken from the payload's planId when omitted
    #[arg(long)]
    pub plan: Option<String>,
    /// JSON payload
    #[arg(long, default_value = "{}")]
    pub payload: String,
    /// Originating session
    #[arg(long)]
    pub session: Option<String>,
    /// Logical timestamp in milliseconds (default: now)
    #[arg(long)]
    pub timestamp: Option<i64>,
    /// Opaque JSON causality token
    #[arg(long)]
    pub vector_clock: Option<String>,
}

#[derive(Args)]
pub struct AckArgs {
    /// Operation ids
    #[arg(required = true)]
    pub ids: Vec<String>,
}

#[derive(Args)]
pub struct RemoveArgs {
    /// Operation id
    pub id: String,
}

impl LogArgs {
    fn into_new_operation(self) -> anyhow::Result<NewOperation> {
        let payload: serde_json::Value =
            serde_json::from_str(&self.payload).context("--payload is not valid JSON")?;
        let id = match self.id {
            Some(id) => OperationId::new(id),
            None => OperationId::generate(),
        };
        let mut new = NewOperation::new(id, self.op_type).payload(payload);
        if let Some(plan) = self.plan {
            new = new.plan(plan);
        }
        if let Some(session) = self.session {
            new = new.session(session);
        }
        if let Some(timestamp) = self.timestamp {
            new = new.timestamp(timestamp);
        }
        if let Some(clock) = self.vector_clock {
            let clock: serde_json::Value =
                serde_json::from_str(&clock).context("--vector-clock is not valid JSON")?;
            new = new.vector_clock(clock);
        }
        Ok(new)
    }
}

pub async fn log(log: &OpLog, args: LogArgs, format: OutputFormat) -> anyhow::Result<()> {
    let op = log.log_operation(args.into_new_operation()?).await?;
    output::print(&OperationDetail(op), format);
    Ok(())
}

#[derive(Serialize)]
struct AckResult {
    id: OperationId,
    found: bool,
    applied_at: Option<String>,
}

impl fmt::Display for AckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.applied_at {
            Some(at) => write!(f, "{} applied at {}", self.id, at),
            None => write!(f, "{} not found", self.id),
        }
    }
}

pub async fn ack(log: &OpLog, args: AckArgs, format: OutputFormat) -> anyhow::Result<()> {
    let mut results = Vec::with_capacity(args.ids.len());
    for id in args.ids {
        let id = OperationId::new(id);
        let acked = log.mark_applied(&id).await?;
        results.push(AckResult {
            found: acked.is_some(),
            applied_at: acked.and_then(|op| op.applied_at).map(|at| at.to_rfc3339()),
            id,
        });
    }
    output::print_list(&results, format, "");
    Ok(())
}

#[derive(Serialize)]
struct Removed {
    id: OperationId,
    removed: bool,
}

impl fmt::Display for Removed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.removed {
            write!(f, "Removed {}", self.id)
        } else {
            write!(f, "{} not found", self.id)
        }
    }
}

pub async fn remove(log: &OpLog, args: RemoveArgs, format: OutputFormat) -> anyhow::Result<()> {
    let id = OperationId::new(args.id);
    let removed = log.remove(&id).await?;
    output::print(&Removed { id, removed }, format);
    Ok(())
}
