// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized operation index
//!
//! Built by folding WAL records. Records are keyed by id; each plan keeps three
//! ordered sets keyed by `(timestamp, log order)`: all records, pending ones and
//! applied ones. The per-plan pending/applied split is the `(plan, applied)`
//! index, and set order is the timestamp index.

use crate::wal::Record;
use chrono::{DateTime, Utc};
use oplog_core::{Operation, OperationId, PlanId};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Position of a record within its plan: timestamp first, then log order
type OrderKey = (i64, u64, OperationId);

#[derive(Debug, Clone)]
struct Slot {
    op: Operation,
    /// Assigned on first insert and kept across overwrites
    order: u64,
}

impl Slot {
    fn key(&self) -> OrderKey {
        (self.op.timestamp, self.order, self.op.id.clone())
    }
}

#[derive(Debug, Default, Clone)]
struct PlanIndex {
    all: BTreeSet<OrderKey>,
    pending: BTreeSet<OrderKey>,
    applied: BTreeSet<OrderKey>,
}

impl PlanIndex {
    fn insert(&mut self, key: OrderKey, applied: bool) {
        self.all.insert(key.clone());
        if applied {
            self.applied.insert(key);
        } else {
            self.pending.insert(key);
        }
    }

    fn remove(&mut self, key: &OrderKey) {
        self.all.remove(key);
        self.pending.remove(key);
        self.applied.remove(key);
    }

    fn is_empty(&self) -> bool {
        self.all.is_empty()
    }
}

/// Outcome of acknowledging an operation
#[derive(Debug, Clone, PartialEq)]
pub enum AckOutcome {
    /// Flag flipped; holds the updated record
    Applied(Operation),
    /// Already applied earlier; holds the record unchanged
    AlreadyApplied(Operation),
    NotFound,
}

/// Per-plan record counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlanStats {
    pub total: usize,
    pub pending: usize,
    pub applied: usize,
}

/// In-memory view of every live operation
#[derive(Debug, Default, Clone)]
pub struct OperationIndex {
    records: HashMap<OperationId, Slot>,
    plans: HashMap<PlanId, PlanIndex>,
    next_order: u64,
}

impl OperationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one WAL record into the index
    pub fn apply(&mut self, record: &Record) {
        match record {
            Record::Schema { .. } => {}
            Record::Put { operation } => {
                self.put(operation.clone());
            }
            Record::Applied { id, applied_at } => {
                self.mark_applied(id, *applied_at);
            }
            Record::Remove { ids } => {
                for id in ids {
                    self.remove(id);
                }
            }
            Record::ClearPlan { plan_id } => {
                self.clear_plan(plan_id);
            }
        }
    }

    /// Insert or overwrite by id. Returns the previous record, if any.
    pub fn put(&mut self, op: Operation) -> Option<Operation> {
        let (order, previous) = match self.records.remove(&op.id) {
            Some(old) => {
                self.unlink(&old);
                (old.order, Some(old.op))
            }
            None => {
                let order = self.next_order;
                self.next_order += 1;
                (order, None)
            }
        };

        let slot = Slot { op, order };
        self.plans
            .entry(slot.op.plan_id.clone())
            .or_default()
            .insert(slot.key(), slot.op.applied);
        self.records.insert(slot.op.id.clone(), slot);
        previous
    }

    pub fn mark_applied(&mut self, id: &OperationId, at: DateTime<Utc>) -> AckOutcome {
        let Some(slot) = self.records.get_mut(id) else {
            return AckOutcome::NotFound;
        };
        if !slot.op.mark_applied(at) {
            return AckOutcome::AlreadyApplied(slot.op.clone());
        }

        let key = slot.key();
        if let Some(plan) = self.plans.get_mut(&slot.op.plan_id) {
            plan.pending.remove(&key);
            plan.applied.insert(key);
        }
        AckOutcome::Applied(slot.op.clone())
    }

    pub fn remove(&mut self, id: &OperationId) -> Option<Operation> {
        let slot = self.records.remove(id)?;
        self.unlink(&slot);
        Some(slot.op)
    }

    /// Remove every record of a plan, returning the removed ids in order
    pub fn clear_plan(&mut self, plan_id: &PlanId) -> Vec<OperationId> {
        let Some(plan) = self.plans.remove(plan_id) else {
            return Vec::new();
        };
        plan.all
            .into_iter()
            .map(|(_, _, id)| {
                self.records.remove(&id);
                id
            })
            .collect()
    }

    fn unlink(&mut self, slot: &Slot) {
        let plan_id = &slot.op.plan_id;
        if let Some(plan) = self.plans.get_mut(plan_id) {
            plan.remove(&slot.key());
            if plan.is_empty() {
                self.plans.remove(plan_id);
            }
        }
    }

    pub fn get(&self, id: &OperationId) -> Option<&Operation> {
        self.records.get(id).map(|slot| &slot.op)
    }

    pub fn contains(&self, id: &OperationId) -> bool {
        self.records.contains_key(id)
    }

    /// Full history of a plan, ascending by timestamp
    pub fn history(&self, plan_id: &PlanId) -> Vec<Operation> {
        self.collect_keys(plan_id, |plan| &plan.all)
    }

    /// Pending operations of a plan, ascending by timestamp
    pub fn unapplied(&self, plan_id: &PlanId) -> Vec<Operation> {
        self.collect_keys(plan_id, |plan| &plan.pending)
    }

    fn collect_keys<F>(&self, plan_id: &PlanId, select: F) -> Vec<Operation>
    where
        F: Fn(&PlanIndex) -> &BTreeSet<OrderKey>,
    {
        self.plans
            .get(plan_id)
            .map(|plan| {
                select(plan)
                    .iter()
                    .filter_map(|(_, _, id)| self.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Known plan ids, sorted
    pub fn plans(&self) -> Vec<PlanId> {
        let mut plans: Vec<_> = self.plans.keys().cloned().collect();
        plans.sort();
        plans
    }

    /// Oldest applied ids beyond `retention` per plan
    ///
    /// Pending records are never candidates.
    pub fn gc_candidates(&self, retention: usize) -> BTreeMap<PlanId, Vec<OperationId>> {
        self.plans
            .iter()
            .filter(|(_, plan)| plan.applied.len() > retention)
            .map(|(plan_id, plan)| {
                let excess = plan.applied.len() - retention;
                let ids = plan
                    .applied
                    .iter()
                    .take(excess)
                    .map(|(_, _, id)| id.clone())
                    .collect();
                (plan_id.clone(), ids)
            })
            .collect()
    }

    pub fn plan_stats(&self, plan_id: &PlanId) -> PlanStats {
        self.plans
            .get(plan_id)
            .map(|plan| PlanStats {
                total: plan.all.len(),
                pending: plan.pending.len(),
                applied: plan.applied.len(),
            })
            .unwrap_or_default()
    }

    /// Every live record in log order, for compaction
    pub fn in_log_order(&self) -> Vec<&Operation> {
        let mut slots: Vec<_> = self.records.values().collect();
        slots.sort_by_key(|slot| slot.order);
        slots.into_iter().map(|slot| &slot.op).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
#[path = "index_tests.rs"]
mod tests;
