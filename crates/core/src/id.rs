// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operation id generation
//!
//! The editing layer must hand the log a globally unique id for every logical
//! change. Re-using an id is how a client resubmits the same change, so only
//! brand-new changes should get a generated one.

use crate::operation::OperationId;
use uuid::Uuid;

impl OperationId {
    /// A fresh random (v4 UUID) id
    pub fn generate() -> Self {
        Self::new(Uuid::new_v4().to_string())
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
