// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Caller-facing status lookup and cancellation.

use adx_adapters::ContainerRuntime;
use adx_core::{Clock, EngineError, UnitMeta, UnitState, WorkUnit, WorkUnitId};
use adx_storage::WorkStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The projection a caller is allowed to see of one work unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitStatus {
    pub id: WorkUnitId,
    pub enqueued_at_ms: u64,
    pub started_at_ms: Option<u64>,
    pub ended_at_ms: Option<u64>,
    pub state: UnitState,
    pub meta: UnitMeta,
    pub result: Option<String>,
    pub exc_info: Option<String>,
}

impl From<WorkUnit> for UnitStatus {
    fn from(unit: WorkUnit) -> Self {
        Self {
            id: unit.id,
            enqueued_at_ms: unit.enqueued_at_ms,
            started_at_ms: unit.started_at_ms,
            ended_at_ms: unit.ended_at_ms,
            state: unit.state,
            result: unit.meta.result.clone(),
            exc_info: unit.meta.exc_info.clone(),
            meta: unit.meta,
        }
    }
}

/// Read/cancel surface over the Work Store, scoped to one caller's units.
pub struct StatusApi<S, C, K> {
    store: Arc<S>,
    runtime: Arc<C>,
    clock: K,
}

impl<S, C, K> StatusApi<S, C, K>
where
    S: WorkStore,
    C: ContainerRuntime,
    K: Clock,
{
    pub fn new(store: Arc<S>, runtime: Arc<C>, clock: K) -> Self {
        Self { store, runtime, clock }
    }

    /// Fails with `NotFound` if the unit does not exist or belongs to a
    /// different user; never distinguishes the two to the caller.
    pub async fn status(&self, user_id: &str, unit_id: &WorkUnitId) -> Result<UnitStatus, EngineError> {
        self.authorized(user_id, unit_id).await.map(UnitStatus::from)
    }

    /// Every unit owned by `user_id`, across both queue families and every
    /// lifecycle state.
    pub async fn all_statuses(&self, user_id: &str) -> Result<Vec<UnitStatus>, EngineError> {
        let all = self.store.list_all().await?;
        Ok(all
            .into_iter()
            .filter(|u| u.user_id == user_id)
            .map(UnitStatus::from)
            .collect())
    }

    /// Cancel a unit: drop it from the pending queue if it never started,
    /// otherwise signal its worker and kill its container. Never propagates
    /// an error; any step failing is logged and reported as `false`.
    pub async fn cancel(&self, user_id: &str, unit_id: &WorkUnitId) -> bool {
        let unit = match self.authorized(user_id, unit_id).await {
            Ok(unit) => unit,
            Err(e) => {
                tracing::warn!(%unit_id, error = %e, "cancel: not authorized or not found");
                return false;
            }
        };

        if unit.state == UnitState::Queued {
            if !self.transition_and_remove(unit_id).await {
                return false;
            }
        } else {
            // Record the cancellation before touching the container: a
            // worker re-reads unit state right after dequeue (closing the
            // pick-up/container-create race), so this transition must land
            // before `kill_container` runs, not after it. `can_transition_to`
            // rejects a unit that already reached a terminal state, so one
            // that finished/failed/stopped moments before this call correctly
            // fails to cancel rather than being overwritten.
            match self.store.transition(unit_id, UnitState::Canceled, self.clock.epoch_ms()).await {
                Ok(true) => {}
                Ok(false) => {
                    tracing::warn!(%unit_id, "cancel: unit reached a terminal state before it could be canceled");
                    return false;
                }
                Err(e) => {
                    tracing::warn!(%unit_id, error = %e, "cancel: failed to record cancellation");
                    return false;
                }
            }
            // The control channel addresses workers by worker name, and no
            // per-unit worker binding is tracked once a unit is dequeued;
            // killing its container (named after the unit id) is what
            // actually stops it, and is always correctly targeted. Best
            // effort: the container may not exist yet if the worker hasn't
            // created it, or may already have exited on its own; either way
            // the transition above is the authoritative cancellation record.
            self.kill_container(unit_id).await;
        }
        true
    }

    /// Fetch a unit and verify it belongs to `user_id`, collapsing both
    /// "missing" and "owned by someone else" into the same `NotFound`.
    async fn authorized(&self, user_id: &str, unit_id: &WorkUnitId) -> Result<WorkUnit, EngineError> {
        match self.store.get(unit_id).await? {
            Some(unit) if unit.user_id == user_id => Ok(unit),
            _ => Err(EngineError::NotFound),
        }
    }

    async fn transition_and_remove(&self, unit_id: &WorkUnitId) -> bool {
        match self.store.transition(unit_id, UnitState::Canceled, self.clock.epoch_ms()).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(%unit_id, "cancel: unit was no longer queued by the time of transition");
                return false;
            }
            Err(e) => {
                tracing::warn!(%unit_id, error = %e, "cancel: failed to transition to canceled");
                return false;
            }
        }
        if let Err(e) = self.store.remove(unit_id).await {
            tracing::warn!(%unit_id, error = %e, "cancel: failed to remove from pending set");
            return false;
        }
        true
    }

    /// Kill, never stop: a graceful stop can hang indefinitely on a wedged
    /// process, and cancellation must not block on that.
    async fn kill_container(&self, unit_id: &WorkUnitId) -> bool {
        let name = unit_id.as_str();
        match self.runtime.get_by_name(name).await {
            Ok(Some(_)) => {}
            Ok(None) => return true,
            Err(e) => {
                tracing::warn!(%unit_id, error = %e, "cancel: failed to look up container");
                return false;
            }
        }
        if let Err(e) = self.runtime.kill(name).await {
            tracing::warn!(%unit_id, error = %e, "cancel: failed to kill container");
            return false;
        }
        if let Err(e) = self.runtime.remove(name).await {
            tracing::warn!(%unit_id, error = %e, "cancel: failed to remove container");
            return false;
        }
        true
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
