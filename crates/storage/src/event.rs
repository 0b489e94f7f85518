// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The event log's unit of record.
//!
//! Every mutation the work store makes goes through one of these variants
//! first, so the WAL and the in-memory state can never disagree about what
//! happened.

use adx_core::{QueueName, UnitState, WorkUnit, WorkUnitId};
use serde::{Deserialize, Serialize};

/// A control-channel signal delivered to a named worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlSignal {
    /// Finish the current unit, then exit the poll loop without taking more work.
    Stop,
    /// Exit immediately; the current unit is left in `started` for requeue.
    Shutdown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum WorkStoreEvent {
    Push {
        queue: QueueName,
        unit: Box<WorkUnit>,
    },
    Pop {
        queue: QueueName,
        id: WorkUnitId,
    },
    Transition {
        id: WorkUnitId,
        next: UnitState,
        at_epoch_ms: u64,
    },
    UpdateProgress {
        id: WorkUnitId,
        progress: String,
    },
    AppendError {
        id: WorkUnitId,
        message: String,
    },
    SetResult {
        id: WorkUnitId,
        result: Option<String>,
    },
    SetExcInfo {
        id: WorkUnitId,
        exc_info: Option<String>,
    },
    Remove {
        id: WorkUnitId,
    },
    AcquireLease {
        holder: String,
        expires_at_ms: u64,
    },
    RenewLease {
        holder: String,
        expires_at_ms: u64,
    },
    ReleaseLease {
        holder: String,
    },
    SetControlSignal {
        worker_name: String,
        signal: ControlSignal,
    },
    ClearControlSignal {
        worker_name: String,
    },
    RegisterActiveUser {
        user_id: String,
    },
    UnregisterActiveUser {
        user_id: String,
    },
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
