// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Records persisted in the operation log
//!
//! Every change to the store is one record. The materialized index is the
//! fold of all records in file order.

use chrono::{DateTime, Utc};
use oplog_core::{Operation, OperationId, PlanId};
use serde::{Deserialize, Serialize};

/// Current on-disk schema version
pub const SCHEMA_VERSION: u32 = 1;

/// A single state change in the log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    /// Header written as the first entry of every log
    Schema { version: u32 },
    /// Insert or overwrite an operation by id
    Put { operation: Operation },
    /// Server acknowledged an operation
    Applied {
        id: OperationId,
        applied_at: DateTime<Utc>,
    },
    /// Delete specific operations (manual removal or GC)
    Remove { ids: Vec<OperationId> },
    /// Delete every operation of a plan
    ClearPlan { plan_id: PlanId },
}
