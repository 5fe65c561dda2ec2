// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rebuild derived state by folding a plan's history through an applier

use oplog_core::{Applier, Operation, OperationId};

/// Final state of a replay plus the operations that could not be applied
#[derive(Debug, Clone, PartialEq)]
pub struct Replayed<S> {
    pub state: S,
    /// Ids of failed steps, in history order
    pub skipped: Vec<OperationId>,
}

impl<S> Replayed<S> {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Fold `history` into `initial` in order
///
/// A step the applier rejects is skipped and the previous state carries on.
pub fn replay<'a, S, A, I>(history: I, initial: S, applier: &A) -> Replayed<S>
where
    A: Applier<S> + ?Sized,
    I: IntoIterator<Item = &'a Operation>,
{
    let mut state = initial;
    let mut skipped = Vec::new();

    for op in history {
        match applier.apply(&state, op) {
            Ok(next) => state = next,
            Err(e) => {
                tracing::warn!(
                    id = %op.id,
                    plan_id = %op.plan_id,
                    op_type = %op.op_type,
                    error = %e,
                    "skipping operation that failed to replay"
                );
                skipped.push(op.id.clone());
            }
        }
    }

    Replayed { state, skipped }
}

#[cfg(test)]
#[path = "replay_tests.rs"]
mod tests;
