// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Async operation log handle
//!
//! `OpLog` is cheap to clone and is meant to be built once and handed to every
//! consumer. The store opens lazily on first use; concurrent first callers
//! wait on one open attempt and share it if it succeeds. File I/O runs on the
//! blocking pool.

use crate::config::OpLogConfig;
use crate::error::OpLogError;
use crate::gc::{self, GcTask};
use crate::replay::{replay, Replayed};
use oplog_core::{Applier, Clock, NewOperation, Operation, OperationId, PlanId, SystemClock};
use oplog_storage::{CompactionResult, GcReport, LogStats, OpStore};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OnceCell;

/// Store shared between the handle and the gc task; `None` once shut down
pub(crate) type SharedStore = Arc<Mutex<Option<OpStore>>>;

/// Run `f` against the open store on the blocking pool
pub(crate) async fn with_store<T, F>(store: &SharedStore, f: F) -> Result<T, OpLogError>
where
    F: FnOnce(&mut OpStore) -> Result<T, OpLogError> + Send + 'static,
    T: Send + 'static,
{
    let store = Arc::clone(store);
    tokio::task::spawn_blocking(move || {
        let mut guard = store
            .lock()
            .map_err(|_| OpLogError::Task("operation store lock poisoned".to_string()))?;
        let store = guard.as_mut().ok_or(OpLogError::ShutDown)?;
        f(store)
    })
    .await?
}

struct Inner<C> {
    config: OpLogConfig,
    clock: C,
    store: OnceCell<SharedStore>,
    gc: Mutex<Option<GcTask>>,
    closed: AtomicBool,
}

/// Handle to the durable operation log
#[derive(Clone)]
pub struct OpLog<C: Clock = SystemClock> {
    inner: Arc<Inner<C>>,
}

impl OpLog<SystemClock> {
    pub fn new(config: OpLogConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> OpLog<C> {
    pub fn with_clock(config: OpLogConfig, clock: C) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                clock,
                store: OnceCell::new(),
                gc: Mutex::new(None),
                closed: AtomicBool::new(false),
            }),
        }
    }

    pub fn config(&self) -> &OpLogConfig {
        &self.inner.config
    }

    pub fn dir(&self) -> &Path {
        &self.inner.config.dir
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.store.initialized() && !self.inner.closed.load(Ordering::SeqCst)
    }

    /// Open the store, creating or upgrading it as needed
    ///
    /// Idempotent. A failure is not cached or shared: callers that were waiting
    /// on a failed attempt each retry the open in turn.
    pub async fn initialize(&self) -> Result<(), OpLogError> {
        self.store().await.map(|_| ())
    }

    // === Writes ===

    /// Persist a new operation before it is sent anywhere
    ///
    /// Re-logging an existing id overwrites the record and makes it pending again.
    pub async fn log_operation(&self, new: NewOperation) -> Result<Operation, OpLogError> {
        let op = Operation::from_new(new, self.inner.clock.now())?;
        let store = self.store().await?;

        let (id, plan_id) = (op.id.clone(), op.plan_id.clone());
        with_store(store, move |s| {
            s.log(op).map_err(|source| {
                tracing::error!(%id, %plan_id, error = %source, "failed to persist operation");
                OpLogError::WriteFailed {
                    id,
                    plan_id,
                    source,
                }
            })
        })
        .await
    }

    /// Record server acknowledgment
    ///
    /// Returns `None` for an unknown id. An already-applied record comes back
    /// unchanged.
    pub async fn mark_applied(&self, id: &OperationId) -> Result<Option<Operation>, OpLogError> {
        let store = self.store().await?;
        let id = id.clone();
        let now = self.inner.clock.now();

        with_store(store, move |s| {
            let plan_id = match s.get(&id) {
                Some(op) => op.plan_id.clone(),
                None => return Ok(None),
            };
            s.mark_applied(&id, now).map_err(|source| {
                tracing::error!(%id, %plan_id, error = %source, "failed to persist acknowledgment");
                OpLogError::WriteFailed {
                    id,
                    plan_id,
                    source,
                }
            })
        })
        .await
    }

    /// Delete one record in any state. Returns false if it was not there.
    pub async fn remove(&self, id: &OperationId) -> Result<bool, OpLogError> {
        let store = self.store().await?;
        let id = id.clone();
        with_store(store, move |s| Ok(s.remove(&id)?)).await
    }

    /// Delete every record of a plan
    pub async fn clear_plan(&self, plan_id: &PlanId) -> Result<usize, OpLogError> {
        let store = self.store().await?;
        let plan_id = plan_id.clone();
        with_store(store, move |s| Ok(s.clear_plan(&plan_id)?)).await
    }

    // === Reads ===

    /// Pending operations of a plan in timestamp order, for resend
    pub async fn unapplied(&self, plan_id: &PlanId) -> Result<Vec<Operation>, OpLogError> {
        let store = self.store().await?;
        let plan_id = plan_id.clone();
        with_store(store, move |s| Ok(s.unapplied(&plan_id))).await
    }

    /// Every recorded operation of a plan in timestamp order
    pub async fn history(&self, plan_id: &PlanId) -> Result<Vec<Operation>, OpLogError> {
        let store = self.store().await?;
        let plan_id = plan_id.clone();
        with_store(store, move |s| Ok(s.history(&plan_id))).await
    }

    pub async fn get(&self, id: &OperationId) -> Result<Option<Operation>, OpLogError> {
        let store = self.store().await?;
        let id = id.clone();
        with_store(store, move |s| Ok(s.get(&id).cloned())).await
    }

    pub async fn plans(&self) -> Result<Vec<PlanId>, OpLogError> {
        let store = self.store().await?;
        with_store(store, |s| Ok(s.plans())).await
    }

    pub async fn stats(&self) -> Result<LogStats, OpLogError> {
        let store = self.store().await?;
        with_store(store, |s| Ok(s.stats())).await
    }

    /// Fold a plan's history into `initial`, skipping steps the applier rejects
    pub async fn replay<S, A>(
        &self,
        plan_id: &PlanId,
        initial: S,
        applier: &A,
    ) -> Result<Replayed<S>, OpLogError>
    where
        A: Applier<S> + ?Sized,
    {
        let history = self.history(plan_id).await?;
        let replayed = replay(&history, initial, applier);
        tracing::debug!(
            %plan_id,
            operations = history.len(),
            skipped = replayed.skipped.len(),
            "replayed plan history"
        );
        Ok(replayed)
    }

    // === Maintenance ===

    /// Run one garbage-collection pass now
    pub async fn collect_garbage(&self) -> Result<GcReport, OpLogError> {
        let store = self.store().await?;
        gc::collect(store, self.inner.config.retention).await
    }

    pub async fn compact(&self) -> Result<CompactionResult, OpLogError> {
        let store = self.store().await?;
        with_store(store, |s| Ok(s.compact()?)).await
    }

    /// Stop background gc and release the store
    ///
    /// Every later call on any clone of this handle fails with `ShutDown`.
    pub async fn shutdown(&self) -> Result<(), OpLogError> {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let task = self
            .inner
            .gc
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task {
            task.stop().await;
        }

        if let Some(store) = self.inner.store.get() {
            let store = Arc::clone(store);
            // Dropping the store releases the file lock
            tokio::task::spawn_blocking(move || {
                store.lock().unwrap_or_else(PoisonError::into_inner).take();
            })
            .await?;
        }

        tracing::info!(dir = %self.dir().display(), "operation log shut down");
        Ok(())
    }

    // === Internal ===

    async fn store(&self) -> Result<&SharedStore, OpLogError> {
        if self.inner.closed.load(Ordering::SeqCst) {
            return Err(OpLogError::ShutDown);
        }
        self.inner.store.get_or_try_init(|| self.open()).await
    }

    async fn open(&self) -> Result<SharedStore, OpLogError> {
        let config = &self.inner.config;
        config.validate()?;
        let dir = config.dir.clone();
        let store_config = config.store_config();

        let opened = tokio::task::spawn_blocking({
            let dir = dir.clone();
            move || OpStore::open(&dir, store_config)
        })
        .await?;

        let store = match opened {
            Ok(store) => store,
            Err(e) => {
                tracing::warn!(
                    dir = %dir.display(),
                    error = %e,
                    "operation log unavailable, offline queuing disabled"
                );
                return Err(OpLogError::StorageUnavailable {
                    path: dir,
                    reason: e.to_string(),
                });
            }
        };

        if self.inner.closed.load(Ordering::SeqCst) {
            return Err(OpLogError::ShutDown);
        }

        let shared: SharedStore = Arc::new(Mutex::new(Some(store)));
        if config.gc_enabled {
            let task = GcTask::spawn(Arc::clone(&shared), config.gc_interval, config.retention);
            *self.inner.gc.lock().unwrap_or_else(PoisonError::into_inner) = Some(task);
        }

        tracing::info!(dir = %dir.display(), "operation log initialized");
        Ok(shared)
    }
}

#[cfg(test)]
#[path = "handle_tests.rs"]
mod tests;
