// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! oplog-storage: durable storage for the plan operation log

pub mod index;
pub mod store;
pub mod wal;

pub use index::{AckOutcome, OperationIndex, PlanStats};
pub use store::{
    CompactionResult, GcReport, LogStats, OpStore, OpStoreConfig, StoreError, LOCK_FILE, WAL_FILE,
};
pub use wal::{Record, WalEntry, WalReadError, WalReader, WalWriter, SCHEMA_VERSION};
