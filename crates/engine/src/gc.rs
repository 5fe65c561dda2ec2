// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Background garbage collection
//!
//! One task per handle, started after the store first opens. A failed pass is
//! logged and retried on the next tick.

use crate::error::OpLogError;
use crate::handle::{with_store, SharedStore};
use oplog_storage::GcReport;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

/// Handle to the periodic collector
pub(crate) struct GcTask {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl GcTask {
    pub(crate) fn spawn(store: SharedStore, every: Duration, retention: usize) -> Self {
        let (shutdown, mut shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut timer = interval(every);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

            // Skip initial immediate tick
            timer.tick().await;

            loop {
                tokio::select! {
                    _ = timer.tick() => {
                        match collect(&store, retention).await {
                            Ok(report) if report.removed > 0 => {
                                tracing::debug!(removed = report.removed, "scheduled gc pass");
                            }
                            Ok(_) => {}
                            Err(OpLogError::ShutDown) => break,
                            Err(e) => {
                                tracing::warn!(error = %e, "gc pass failed, retrying next interval");
                            }
                        }
                    }
                    _ = shutdown_rx.changed() => break,
                }
            }
            tracing::debug!("gc task stopped");
        });

        tracing::info!(interval = ?every, retention, "gc task started");
        Self { shutdown, handle }
    }

    /// Signal the task and wait for an in-flight pass to finish
    pub(crate) async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.handle.await {
            tracing::warn!(error = %e, "gc task ended abnormally");
        }
    }
}

pub(crate) async fn collect(store: &SharedStore, retention: usize) -> Result<GcReport, OpLogError> {
    with_store(store, move |s| Ok(s.collect_garbage(retention)?)).await
}
