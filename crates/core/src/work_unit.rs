// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Work unit identifier and state machine.

use crate::queue::QueueFamily;
use crate::target::TargetDescriptor;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

crate::define_id! {
    /// Unique identifier for a work unit.
    ///
    /// Format: `<action_slug>_<rand8>_<chunk_idx>`, stable and human-readable,
    /// unique per dispatch batch.
    #[derive(Default)]
    pub struct WorkUnitId;
}

/// Lifecycle state of a work unit. Forward-only: no variant here is ever
/// reachable from a "later" variant once left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitState {
    Queued,
    Started,
    Finished,
    Failed,
    Canceled,
    Stopped,
}

impl UnitState {
    /// Terminal states: finished, failed, canceled, stopped.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            UnitState::Finished | UnitState::Failed | UnitState::Canceled | UnitState::Stopped
        )
    }

    /// True if `next` is a legal transition from `self`. Encodes the
    /// `queued -> started -> {finished|failed|canceled|stopped}` machine from
    /// the state diagram, plus the direct `queued -> canceled` cancellation
    /// path (a pending unit can be canceled before a worker ever picks it up).
    pub fn can_transition_to(self, next: UnitState) -> bool {
        use UnitState::*;
        matches!(
            (self, next),
            (Queued, Started)
                | (Queued, Canceled)
                | (Started, Finished)
                | (Started, Failed)
                | (Started, Canceled)
                | (Started, Stopped)
        )
    }
}

impl std::fmt::Display for UnitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            UnitState::Queued => "queued",
            UnitState::Started => "started",
            UnitState::Finished => "finished",
            UnitState::Failed => "failed",
            UnitState::Canceled => "canceled",
            UnitState::Stopped => "stopped",
        };
        write!(f, "{s}")
    }
}

/// One entry in a unit's audit history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitEvent {
    pub state: UnitState,
    pub at_epoch_ms: u64,
}

/// Mutable metadata bag attached to a work unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitMeta {
    pub action_name: String,
    /// Pretty-printed parameters, for display only.
    pub parameters: String,
    pub target: TargetDescriptor,
    pub progress: String,
    pub errors: Vec<String>,
    /// Caller-visible result (the script's final stdout line, or the
    /// structured side-channel value when the script wrote one).
    pub result: Option<String>,
    /// Populated when the unit reaches `failed`/`stopped`.
    pub exc_info: Option<String>,
}

/// Spec for the container a work unit will run as.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerSpec {
    pub image: String,
    pub command: Vec<String>,
    pub name: String,
    pub env: HashMap<String, String>,
    /// Host-path -> (container-path, read_only) bind mounts.
    pub binds: Vec<VolumeBind>,
    pub gpu: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeBind {
    pub host_path: String,
    pub container_path: String,
    pub read_only: bool,
}

/// The atomic schedulable record the engine executes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkUnit {
    pub id: WorkUnitId,
    pub user_id: String,
    pub queue_family: QueueFamily,
    pub spec: ContainerSpec,
    pub gpu_requested: bool,
    /// 0 means no watchdog.
    pub watchdog_timeout_secs: u64,
    /// Hard upper bound on total runtime (e.g. 72h), enforced by the store.
    pub job_timeout_secs: u64,
    /// How long a terminal record is retained before purge.
    pub retention_secs: u64,
    /// Whether this unit runs inside a pre-existing container (`exec_run`)
    /// rather than creating a fresh one.
    pub exec_run: bool,
    pub replace_plugin_data: bool,
    pub state: UnitState,
    pub meta: UnitMeta,
    pub history: Vec<UnitEvent>,
    pub enqueued_at_ms: u64,
    pub started_at_ms: Option<u64>,
    pub ended_at_ms: Option<u64>,
}

impl WorkUnit {
    /// Transition to `next`, recording a history entry. Returns `false`
    /// (no-op) if the transition is not legal from the current state —
    /// callers must treat that as a bug, never silently retry.
    pub fn transition(&mut self, next: UnitState, now_ms: u64) -> bool {
        if !self.state.can_transition_to(next) {
            return false;
        }
        self.state = next;
        match next {
            UnitState::Started => self.started_at_ms = Some(now_ms),
            _ if next.is_terminal() => self.ended_at_ms = Some(now_ms),
            _ => {}
        }
        self.history.push(UnitEvent {
            state: next,
            at_epoch_ms: now_ms,
        });
        true
    }
}

#[cfg(test)]
#[path = "work_unit_tests.rs"]
mod tests;
