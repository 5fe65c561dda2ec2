// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operation records
//!
//! An operation is a local mutation of a plan, recorded before it is sent to
//! the server. The log stores the payload and the causality token verbatim;
//! neither is ever interpreted here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Payload keys checked, in order, when an operation carries no explicit plan id
const PAYLOAD_PLAN_KEYS: [&str; 2] = ["planId", "plan_id"];

/// Errors building an operation record from caller input
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OperationError {
    #[error("operation id must not be empty")]
    EmptyId,
    #[error("operation {id} has no plan id and its payload names none")]
    MissingPlanId { id: OperationId },
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// Caller-assigned, globally unique operation id
    OperationId
);

string_id!(
    /// Partition key: every query is scoped to one plan
    PlanId
);

/// Opaque structured mutation data
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(serde_json::Value);

impl Payload {
    pub fn value(&self) -> &serde_json::Value {
        &self.0
    }

    /// Plan id embedded in the payload, if the editing layer put one there
    pub fn plan_id(&self) -> Option<PlanId> {
        PAYLOAD_PLAN_KEYS
            .iter()
            .find_map(|key| self.0.get(key).and_then(|v| v.as_str()))
            .filter(|s| !s.is_empty())
            .map(PlanId::from)
    }
}

impl From<serde_json::Value> for Payload {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

/// Opaque causality token owned by the collaborative-editing layer
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VectorClock(serde_json::Value);

impl VectorClock {
    pub fn value(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_null()
    }
}

impl From<serde_json::Value> for VectorClock {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

/// Operation as supplied by the editing layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOperation {
    pub id: OperationId,
    #[serde(rename = "type")]
    pub op_type: String,
    #[serde(default)]
    pub payload: Payload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<PlanId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "VectorClock::is_empty")]
    pub vector_clock: VectorClock,
    /// Logical creation time in milliseconds; defaults to wall-clock at log time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl NewOperation {
    pub fn new(id: impl Into<OperationId>, op_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            op_type: op_type.into(),
            payload: Payload::default(),
            plan_id: None,
            session_id: None,
            vector_clock: VectorClock::default(),
            timestamp: None,
        }
    }

    pub fn plan(mut self, plan_id: impl Into<PlanId>) -> Self {
        self.plan_id = Some(plan_id.into());
        self
    }

    pub fn payload(mut self, payload: impl Into<Payload>) -> Self {
        self.payload = payload.into();
        self
    }

    pub fn session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn vector_clock(mut self, clock: impl Into<VectorClock>) -> Self {
        self.vector_clock = clock.into();
        self
    }

    pub fn timestamp(mut self, millis: i64) -> Self {
        self.timestamp = Some(millis);
        self
    }

    /// Explicit plan id, falling back to the one named in the payload
    pub fn resolve_plan_id(&self) -> Result<PlanId, OperationError> {
        self.plan_id
            .clone()
            .filter(|p| !p.as_str().is_empty())
            .or_else(|| self.payload.plan_id())
            .ok_or_else(|| OperationError::MissingPlanId {
                id: self.id.clone(),
            })
    }
}

/// A logged operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub id: OperationId,
    #[serde(rename = "type")]
    pub op_type: String,
    pub payload: Payload,
    pub plan_id: PlanId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "VectorClock::is_empty")]
    pub vector_clock: VectorClock,
    pub timestamp: i64,
    pub applied: bool,
    pub logged_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_at: Option<DateTime<Utc>>,
}

impl Operation {
    /// Build an unapplied record from caller input at `now`
    pub fn from_new(new: NewOperation, now: DateTime<Utc>) -> Result<Self, OperationError> {
        if new.id.as_str().is_empty() {
            return Err(OperationError::EmptyId);
        }
        let plan_id = new.resolve_plan_id()?;

        Ok(Self {
            id: new.id,
            op_type: new.op_type,
            payload: new.payload,
            plan_id,
            session_id: new.session_id,
            vector_clock: new.vector_clock,
            timestamp: new.timestamp.unwrap_or_else(|| now.timestamp_millis()),
            applied: false,
            logged_at: now,
            applied_at: None,
        })
    }

    /// Record server acknowledgment. Returns false if already applied.
    pub fn mark_applied(&mut self, at: DateTime<Utc>) -> bool {
        if self.applied {
            return false;
        }
        self.applied = true;
        self.applied_at = Some(at);
        true
    }

    pub fn is_pending(&self) -> bool {
        !self.applied
    }
}

#[cfg(test)]
#[path = "operation_tests.rs"]
mod tests;
