// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! oplog - inspect and maintain a plan operation log

mod commands;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::{maintenance, operation, query, replay};
use oplog_engine::{OpLog, OpLogConfig};
use output::OutputFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "oplog",
    version,
    about = "Plan operation log - durable offline edits and history"
)]
struct Cli {
    /// Store directory (default: $OPLOG_DIR, then the config file, then the local data dir)
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record an operation
    Log(operation::LogArgs),
    /// Mark operations as acknowledged by the server
    Ack(operation::AckArgs),
    /// Pending operations of a plan, oldest first
    Pending(query::PlanArgs),
    /// Full history of a plan, oldest first
    History(query::PlanArgs),
    /// Show one operation
    Show(query::ShowArgs),
    /// List known plans
    Plans,
    /// Delete one operation
    Remove(operation::RemoveArgs),
    /// Delete every operation of a plan
    Clear(query::PlanArgs),
    /// Trim applied history beyond the retention bound
    Gc(maintenance::GcArgs),
    /// Record counts per plan
    Stats,
    /// Rewrite the log without dead entries
    Compact,
    /// Truncate a corrupted log at its last valid entry
    Repair,
    /// Fold a plan's history into a per-type summary
    Replay(query::PlanArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    tracing::debug!(dir = %config.dir.display(), "using operation log directory");

    // The store opens lazily, so `repair` sees the directory unlocked
    let log = OpLog::new(config);
    let result = run(&log, cli.command, cli.format).await;
    log.shutdown().await?;
    result
}

async fn run(log: &OpLog, command: Commands, format: OutputFormat) -> Result<()> {
    match command {
        Commands::Log(args) => operation::log(log, args, format).await,
        Commands::Ack(args) => operation::ack(log, args, format).await,
        Commands::Remove(args) => operation::remove(log, args, format).await,
        Commands::Pending(args) => query::pending(log, args, format).await,
        Commands::History(args) => query::history(log, args, format).await,
        Commands::Show(args) => query::show(log, args, format).await,
        Commands::Plans => query::plans(log, format).await,
        Commands::Clear(args) => query::clear(log, args, format).await,
        Commands::Replay(args) => replay::summarize(log, args, format).await,
        Commands::Gc(_) => maintenance::gc(log, format).await,
        Commands::Stats => maintenance::stats(log, format).await,
        Commands::Compact => maintenance::compact(log, format).await,
        Commands::Repair => maintenance::repair(&log.config().dir, format),
    }
}

/// Config file, then `OPLOG_DIR`, then `--dir`
fn resolve_config(cli: &Cli) -> Result<OpLogConfig> {
    let base = match &cli.config {
        Some(path) => OpLogConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => OpLogConfig::default(),
    };
    let mut config = base.with_env_overrides();
    if let Some(dir) = &cli.dir {
        config.dir = dir.clone();
    }
    if let Commands::Gc(maintenance::GcArgs {
        retention: Some(retention),
    }) = &cli.command
    {
        config = config.with_retention(*retention);
        config.validate()?;
    }
    // A one-shot command has no use for the background collector
    Ok(config.without_gc())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
