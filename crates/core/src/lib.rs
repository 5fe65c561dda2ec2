// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! oplog-core: record types for the plan operation log
//!
//! This crate provides:
//! - The operation record and the caller-facing `NewOperation` input
//! - Opaque payload and vector-clock carriers
//! - Clock abstraction and operation id generation
//! - The `Applier` capability used by replay

pub mod apply;
pub mod clock;
pub mod id;
pub mod operation;

pub use apply::{Applier, ApplyError};
pub use clock::{Clock, FakeClock, SystemClock};
pub use operation::{
    NewOperation, Operation, OperationError, OperationId, Payload, PlanId, VectorClock,
};
