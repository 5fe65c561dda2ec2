// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the operation log handle

use crate::config::ConfigError;
use oplog_core::{OperationError, OperationId, PlanId};
use oplog_storage::StoreError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by [`OpLog`](crate::OpLog)
#[derive(Debug, Error)]
pub enum OpLogError {
    /// No durable storage; offline queuing should be disabled
    #[error("operation log storage unavailable at {}: {reason}", path.display())]
    StorageUnavailable { path: PathBuf, reason: String },
    #[error("failed to persist operation {id} for plan {plan_id}: {source}")]
    WriteFailed {
        id: OperationId,
        plan_id: PlanId,
        #[source]
        source: StoreError,
    },
    #[error("invalid operation: {0}")]
    InvalidOperation(#[from] OperationError),
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
    #[error("operation log has been shut down")]
    ShutDown,
    #[error("storage task failed: {0}")]
    Task(String),
}

impl From<tokio::task::JoinError> for OpLogError {
    fn from(e: tokio::task::JoinError) -> Self {
        OpLogError::Task(e.to_string())
    }
}
