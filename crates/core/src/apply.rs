// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Applier capability for rebuilding derived state from history
//!
//! The UI state layer owns the meaning of each operation type. Replay hands it
//! one operation at a time and keeps whatever state it returns.

use crate::operation::Operation;
use thiserror::Error;

/// A reducer step that could not be applied
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApplyError {
    #[error("unsupported operation type: {0}")]
    UnsupportedType(String),
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
    #[error("{0}")]
    Rejected(String),
}

/// Folds one operation into a state value
pub trait Applier<S> {
    fn apply(&self, state: &S, op: &Operation) -> Result<S, ApplyError>;
}

impl<S, F> Applier<S> for F
where
    F: Fn(&S, &Operation) -> Result<S, ApplyError>,
{
    fn apply(&self, state: &S, op: &Operation) -> Result<S, ApplyError> {
        self(state, op)
    }
}

#[cfg(test)]
#[path = "apply_tests.rs"]
mod tests;
