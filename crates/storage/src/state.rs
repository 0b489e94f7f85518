// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized state rebuilt from event replay.

use crate::event::ControlSignal;
use adx_core::{QueueFamily, QueueName, UnitState, WorkUnit, WorkUnitId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet, VecDeque};

/// A time-bounded claim on master-worker duties, renewed by the holder while
/// it remains alive. Any other process sees the lease as free once
/// `expires_at_ms` has passed, even if the holder never explicitly released it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lease {
    pub holder: String,
    pub expires_at_ms: u64,
}

impl Lease {
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at_ms
    }
}

/// The full in-memory materialization of the work store.
///
/// `queues` holds only the FIFO order of pending unit ids per queue; the
/// unit records themselves (including their current state) live in `units`,
/// so a unit is never duplicated between "queued" and the lifecycle
/// registries — its membership in those is purely a view over `state`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkStoreState {
    pub queues: BTreeMap<QueueName, VecDeque<WorkUnitId>>,
    pub units: BTreeMap<WorkUnitId, WorkUnit>,
    pub active_users: HashSet<String>,
    pub lease: Option<Lease>,
    pub control_signals: BTreeMap<String, ControlSignal>,
    /// Round-robin cursor per queue family: index into the sorted list of
    /// queue names currently holding work, so repeated pops rotate evenly.
    #[serde(default)]
    pub rr_cursor: BTreeMap<QueueFamily, usize>,
}

impl WorkStoreState {
    pub fn push(&mut self, queue: QueueName, unit: WorkUnit) {
        self.queues.entry(queue).or_default().push_back(unit.id.clone());
        self.units.insert(unit.id.clone(), unit);
    }

    pub fn pop_fifo(&mut self, queue: &QueueName) -> Option<WorkUnit> {
        let id = self.queues.get_mut(queue)?.pop_front()?;
        self.units.get(&id).cloned()
    }

    /// Pop the next unit from whichever of `queue_names` is next in rotation,
    /// skipping empty queues. Advances the family's cursor by exactly one
    /// queue slot regardless of how many were skipped, so an empty queue
    /// that fills back up is revisited on its natural turn.
    pub fn pop_round_robin(&mut self, family: QueueFamily) -> Option<(QueueName, WorkUnit)> {
        let names: Vec<QueueName> = self
            .queues
            .iter()
            .filter(|(name, q)| name.family() == family && !q.is_empty())
            .map(|(name, _)| name.clone())
            .collect();
        if names.is_empty() {
            return None;
        }
        let cursor = *self.rr_cursor.get(&family).unwrap_or(&0);
        let idx = cursor % names.len();
        let queue = names[idx].clone();
        self.rr_cursor.insert(family, idx + 1);
        let id = self.queues.get_mut(&queue)?.pop_front()?;
        let unit = self.units.get(&id).cloned()?;
        Some((queue, unit))
    }

    pub fn remove(&mut self, id: &WorkUnitId) {
        self.units.remove(id);
        for q in self.queues.values_mut() {
            q.retain(|qid| qid != id);
        }
    }

    pub fn transition(&mut self, id: &WorkUnitId, next: UnitState, at_epoch_ms: u64) -> bool {
        match self.units.get_mut(id) {
            Some(unit) => unit.transition(next, at_epoch_ms),
            None => false,
        }
    }

    pub fn list_by_state(&self, state: UnitState) -> Vec<WorkUnit> {
        self.units
            .values()
            .filter(|u| u.state == state)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
