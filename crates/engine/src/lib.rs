// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! oplog-engine: async operation log for offline plan editing
//!
//! Local mutations are persisted through [`OpLog::log_operation`] before they
//! are sent. The network layer drains [`OpLog::unapplied`] on reconnect and
//! confirms each one with [`OpLog::mark_applied`]. On reload, [`OpLog::replay`]
//! rebuilds UI state from history.

mod config;
mod error;
mod gc;
mod handle;
mod replay;

pub use config::{
    default_dir, ConfigError, OpLogConfig, DEFAULT_GC_INTERVAL, DEFAULT_RETENTION, DIR_ENV,
};
pub use error::OpLogError;
pub use handle::OpLog;
pub use replay::{replay, Replayed};

pub use oplog_core::{
    Applier, ApplyError, Clock, NewOperation, Operation, OperationId, Payload, PlanId,
    SystemClock, VectorClock,
};
pub use oplog_storage::{CompactionResult, GcReport, LogStats, PlanStats};
