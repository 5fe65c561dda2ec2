// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-plan commands: pending, history, show, plans, clear

use crate::output::{self, OperationDetail, OutputFormat};
use clap::Args;
use oplog_engine::{OpLog, OperationId, PlanId};
use serde::Serialize;
use std::fmt;

#[derive(Args)]
pub struct PlanArgs {
    /// Plan id
    pub plan: String,
}

impl PlanArgs {
    pub fn plan_id(&self) -> PlanId {
        PlanId::new(self.plan.as_str())
    }
}

#[derive(Args)]
pub struct ShowArgs {
    /// Operation id
    pub id: String,
}

pub async fn pending(log: &OpLog, args: PlanArgs, format: OutputFormat) -> anyhow::Result<()> {
    let ops = log.unapplied(&args.plan_id()).await?;
    output::print_list(&output::rows(ops), format, "No pending operations");
    Ok(())
}

pub async fn history(log: &OpLog, args: PlanArgs, format: OutputFormat) -> anyhow::Result<()> {
    let ops = log.history(&args.plan_id()).await?;
    output::print_list(&output::rows(ops), format, "No operations");
    Ok(())
}

pub async fn show(log: &OpLog, args: ShowArgs, format: OutputFormat) -> anyhow::Result<()> {
    let id = OperationId::new(args.id);
    match log.get(&id).await? {
        Some(op) => {
            output::print(&OperationDetail(op), format);
            Ok(())
        }
        None => anyhow::bail!("operation not found: {}", id),
    }
}

#[derive(Serialize)]
#[serde(transparent)]
struct PlanRow(PlanId);

impl fmt::Display for PlanRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub async fn plans(log: &OpLog, format: OutputFormat) -> anyhow::Result<()> {
    let plans: Vec<_> = log.plans().await?.into_iter().map(PlanRow).collect();
    output::print_list(&plans, format, "No plans");
    Ok(())
}

#[derive(Serialize)]
struct Cleared {
    plan_id: PlanId,
    removed: usize,
}

impl fmt::Display for Cleared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Removed {} operations from {}", self.removed, self.plan_id)
    }
}

pub async fn clear(log: &OpLog, args: PlanArgs, format: OutputFormat) -> anyhow::Result<()> {
    let plan_id = args.plan_id();
    let removed = log.clear_plan(&plan_id).await?;
    output::print(&Cleared { plan_id, removed }, format);
    Ok(())
}
