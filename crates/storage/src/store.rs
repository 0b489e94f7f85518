// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The work store: the durable source of truth for queued, running, and
//! finished work units, plus the coordination primitives (master lease,
//! control channel, active-user registry) the engine builds on top of it.

use crate::checkpoint::Checkpointer;
use crate::event::{ControlSignal, WorkStoreEvent};
use crate::snapshot::Snapshot;
use crate::state::{Lease, WorkStoreState};
use crate::wal::Wal;
use adx_core::{EngineError, QueueFamily, QueueName, UnitState, WorkUnit, WorkUnitId};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::PathBuf;

/// The durable work queue, lifecycle registry, and coordination store.
///
/// A unit's lifecycle state (`Queued`, `Started`, ...) lives directly on the
/// [`WorkUnit`] record; querying "all pending units" or "all failed units"
/// is a filter over [`WorkStore::list_by_state`] rather than a separately
/// maintained set, so a unit can never be a member of two registries at once.
#[async_trait]
pub trait WorkStore: Send + Sync {
    async fn push(&self, queue: QueueName, unit: WorkUnit) -> Result<(), EngineError>;

    async fn pop_fifo(&self, queue: &QueueName) -> Result<Option<WorkUnit>, EngineError>;

    /// Pop the next unit across all queues of `family`, rotating fairly
    /// between users so no single user's backlog starves the others.
    async fn pop_round_robin(
        &self,
        family: QueueFamily,
    ) -> Result<Option<(QueueName, WorkUnit)>, EngineError>;

    async fn remove(&self, id: &WorkUnitId) -> Result<(), EngineError>;

    async fn get(&self, id: &WorkUnitId) -> Result<Option<WorkUnit>, EngineError>;

    /// Returns `false` (no-op) if `next` is not a legal transition from the
    /// unit's current state.
    async fn transition(
        &self,
        id: &WorkUnitId,
        next: UnitState,
        now_ms: u64,
    ) -> Result<bool, EngineError>;

    async fn update_progress(&self, id: &WorkUnitId, progress: String) -> Result<(), EngineError>;

    async fn append_error(&self, id: &WorkUnitId, message: String) -> Result<(), EngineError>;

    async fn set_result(&self, id: &WorkUnitId, result: Option<String>) -> Result<(), EngineError>;

    async fn set_exc_info(
        &self,
        id: &WorkUnitId,
        exc_info: Option<String>,
    ) -> Result<(), EngineError>;

    async fn list_by_state(&self, state: UnitState) -> Result<Vec<WorkUnit>, EngineError>;

    async fn list_all(&self) -> Result<Vec<WorkUnit>, EngineError>;

    /// Acquire the master lease if it is free or expired. Returns `true` iff
    /// the caller now holds it.
    async fn try_acquire_lease(
        &self,
        holder: &str,
        ttl_ms: u64,
        now_ms: u64,
    ) -> Result<bool, EngineError>;

    /// Extend the lease. Returns `false` if `holder` does not currently hold it.
    async fn renew_lease(
        &self,
        holder: &str,
        ttl_ms: u64,
        now_ms: u64,
    ) -> Result<bool, EngineError>;

    /// Release the lease if `holder` currently holds it; otherwise a no-op.
    async fn release_lease(&self, holder: &str) -> Result<(), EngineError>;

    async fn is_leader(&self, holder: &str, now_ms: u64) -> Result<bool, EngineError>;

    async fn signal_stop(&self, worker_name: &str) -> Result<(), EngineError>;

    async fn signal_shutdown(&self, worker_name: &str) -> Result<(), EngineError>;

    /// Consume and clear any pending control signal for `worker_name`.
    async fn take_control_signal(
        &self,
        worker_name: &str,
    ) -> Result<Option<ControlSignal>, EngineError>;

    async fn register_active_user(&self, user_id: &str) -> Result<(), EngineError>;

    async fn unregister_active_user(&self, user_id: &str) -> Result<(), EngineError>;

    async fn active_users(&self) -> Result<Vec<String>, EngineError>;

    /// Force a durable snapshot and truncate the journal. A no-op for
    /// purely in-memory instances.
    async fn checkpoint(&self) -> Result<(), EngineError>;
}

struct Journal {
    wal: Wal,
    checkpointer: Checkpointer,
}

struct Inner {
    state: WorkStoreState,
    journal: Option<Journal>,
}

/// The bundled [`WorkStore`] implementation: state lives in memory, guarded
/// by a single mutex, with every mutation optionally mirrored to a JSONL
/// journal and periodic zstd snapshot for crash recovery.
pub struct InMemoryWorkStore {
    inner: Mutex<Inner>,
}

impl InMemoryWorkStore {
    /// An ephemeral store with no backing journal, for tests and
    /// single-process scripting.
    pub fn in_memory() -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: WorkStoreState::default(),
                journal: None,
            }),
        }
    }

    /// Open (or create) a journaled store rooted at `dir`, replaying the
    /// latest snapshot plus any subsequent WAL entries.
    pub fn open(dir: PathBuf) -> Result<Self, EngineError> {
        let snapshot_path = dir.join("snapshot.zst");
        let wal_path = dir.join("events.jsonl");

        let snapshot = Snapshot::load(&snapshot_path)
            .map_err(|e| EngineError::InfrastructureError(e.to_string()))?;
        let (mut state, processed_seq) = match snapshot {
            Some(s) => (s.state, s.seq),
            None => (WorkStoreState::default(), 0),
        };

        let wal = Wal::open(&wal_path, processed_seq)
            .map_err(|e| EngineError::InfrastructureError(e.to_string()))?;
        for entry in wal
            .entries_after(processed_seq)
            .map_err(|e| EngineError::InfrastructureError(e.to_string()))?
        {
            apply_event(&mut state, entry.event);
        }

        let checkpointer = Checkpointer::new(snapshot_path);

        Ok(Self {
            inner: Mutex::new(Inner {
                state,
                journal: Some(Journal { wal, checkpointer }),
            }),
        })
    }

    fn record(&self, inner: &mut Inner, event: WorkStoreEvent) -> Result<(), EngineError> {
        apply_event(&mut inner.state, event.clone());
        if let Some(journal) = inner.journal.as_mut() {
            let seq = journal
                .wal
                .append(&event)
                .map_err(|e| EngineError::InfrastructureError(e.to_string()))?;
            journal
                .wal
                .flush()
                .map_err(|e| EngineError::InfrastructureError(e.to_string()))?;
            journal.wal.mark_processed(seq);
        }
        Ok(())
    }
}

fn apply_event(state: &mut WorkStoreState, event: WorkStoreEvent) {
    match event {
        WorkStoreEvent::Push { queue, unit } => state.push(queue, *unit),
        WorkStoreEvent::Pop { queue, id } => {
            if let Some(q) = state.queues.get_mut(&queue) {
                q.retain(|qid| qid != &id);
            }
        }
        WorkStoreEvent::Transition {
            id,
            next,
            at_epoch_ms,
        } => {
            state.transition(&id, next, at_epoch_ms);
        }
        WorkStoreEvent::UpdateProgress { id, progress } => {
            if let Some(u) = state.units.get_mut(&id) {
                u.meta.progress = progress;
            }
        }
        WorkStoreEvent::AppendError { id, message } => {
            if let Some(u) = state.units.get_mut(&id) {
                u.meta.errors.push(message);
            }
        }
        WorkStoreEvent::SetResult { id, result } => {
            if let Some(u) = state.units.get_mut(&id) {
                u.meta.result = result;
            }
        }
        WorkStoreEvent::SetExcInfo { id, exc_info } => {
            if let Some(u) = state.units.get_mut(&id) {
                u.meta.exc_info = exc_info;
            }
        }
        WorkStoreEvent::Remove { id } => state.remove(&id),
        WorkStoreEvent::AcquireLease {
            holder,
            expires_at_ms,
        }
        | WorkStoreEvent::RenewLease {
            holder,
            expires_at_ms,
        } => {
            state.lease = Some(Lease {
                holder,
                expires_at_ms,
            });
        }
        WorkStoreEvent::ReleaseLease { holder } => {
            if state.lease.as_ref().map(|l| l.holder.as_str()) == Some(holder.as_str()) {
                state.lease = None;
            }
        }
        WorkStoreEvent::SetControlSignal {
            worker_name,
            signal,
        } => {
            state.control_signals.insert(worker_name, signal);
        }
        WorkStoreEvent::ClearControlSignal { worker_name } => {
            state.control_signals.remove(&worker_name);
        }
        WorkStoreEvent::RegisterActiveUser { user_id } => {
            state.active_users.insert(user_id);
        }
        WorkStoreEvent::UnregisterActiveUser { user_id } => {
            state.active_users.remove(&user_id);
        }
    }
}

#[async_trait]
impl WorkStore for InMemoryWorkStore {
    async fn push(&self, queue: QueueName, unit: WorkUnit) -> Result<(), EngineError> {
        let mut inner = self.inner.lock();
        self.record(
            &mut inner,
            WorkStoreEvent::Push {
                queue,
                unit: Box::new(unit),
            },
        )
    }

    async fn pop_fifo(&self, queue: &QueueName) -> Result<Option<WorkUnit>, EngineError> {
        let mut inner = self.inner.lock();
        let Some(unit) = inner.state.pop_fifo(queue) else {
            return Ok(None);
        };
        self.record(
            &mut inner,
            WorkStoreEvent::Pop {
                queue: queue.clone(),
                id: unit.id.clone(),
            },
        )?;
        Ok(Some(unit))
    }

    async fn pop_round_robin(
        &self,
        family: QueueFamily,
    ) -> Result<Option<(QueueName, WorkUnit)>, EngineError> {
        let mut inner = self.inner.lock();
        let Some((queue, unit)) = inner.state.pop_round_robin(family) else {
            return Ok(None);
        };
        self.record(
            &mut inner,
            WorkStoreEvent::Pop {
                queue: queue.clone(),
                id: unit.id.clone(),
            },
        )?;
        Ok(Some((queue, unit)))
    }

    async fn remove(&self, id: &WorkUnitId) -> Result<(), EngineError> {
        let mut inner = self.inner.lock();
        self.record(&mut inner, WorkStoreEvent::Remove { id: id.clone() })
    }

    async fn get(&self, id: &WorkUnitId) -> Result<Option<WorkUnit>, EngineError> {
        Ok(self.inner.lock().state.units.get(id).cloned())
    }

    async fn transition(
        &self,
        id: &WorkUnitId,
        next: UnitState,
        now_ms: u64,
    ) -> Result<bool, EngineError> {
        let mut inner = self.inner.lock();
        let Some(unit) = inner.state.units.get(id) else {
            return Err(EngineError::NotFound);
        };
        if !unit.state.can_transition_to(next) {
            return Ok(false);
        }
        self.record(
            &mut inner,
            WorkStoreEvent::Transition {
                id: id.clone(),
                next,
                at_epoch_ms: now_ms,
            },
        )?;
        Ok(true)
    }

    async fn update_progress(&self, id: &WorkUnitId, progress: String) -> Result<(), EngineError> {
        let mut inner = self.inner.lock();
        if !inner.state.units.contains_key(id) {
            return Err(EngineError::NotFound);
        }
        self.record(
            &mut inner,
            WorkStoreEvent::UpdateProgress {
                id: id.clone(),
                progress,
            },
        )
    }

    async fn append_error(&self, id: &WorkUnitId, message: String) -> Result<(), EngineError> {
        let mut inner = self.inner.lock();
        if !inner.state.units.contains_key(id) {
            return Err(EngineError::NotFound);
        }
        self.record(
            &mut inner,
            WorkStoreEvent::AppendError {
                id: id.clone(),
                message,
            },
        )
    }

    async fn set_result(&self, id: &WorkUnitId, result: Option<String>) -> Result<(), EngineError> {
        let mut inner = self.inner.lock();
        if !inner.state.units.contains_key(id) {
            return Err(EngineError::NotFound);
        }
        self.record(
            &mut inner,
            WorkStoreEvent::SetResult {
                id: id.clone(),
                result,
            },
        )
    }

    async fn set_exc_info(
        &self,
        id: &WorkUnitId,
        exc_info: Option<String>,
    ) -> Result<(), EngineError> {
        let mut inner = self.inner.lock();
        if !inner.state.units.contains_key(id) {
            return Err(EngineError::NotFound);
        }
        self.record(
            &mut inner,
            WorkStoreEvent::SetExcInfo {
                id: id.clone(),
                exc_info,
            },
        )
    }

    async fn list_by_state(&self, state: UnitState) -> Result<Vec<WorkUnit>, EngineError> {
        Ok(self.inner.lock().state.list_by_state(state))
    }

    async fn list_all(&self) -> Result<Vec<WorkUnit>, EngineError> {
        Ok(self.inner.lock().state.units.values().cloned().collect())
    }

    async fn try_acquire_lease(
        &self,
        holder: &str,
        ttl_ms: u64,
        now_ms: u64,
    ) -> Result<bool, EngineError> {
        let mut inner = self.inner.lock();
        let free = match &inner.state.lease {
            None => true,
            Some(l) => l.holder == holder || l.is_expired(now_ms),
        };
        if !free {
            return Ok(false);
        }
        self.record(
            &mut inner,
            WorkStoreEvent::AcquireLease {
                holder: holder.to_string(),
                expires_at_ms: now_ms + ttl_ms,
            },
        )?;
        Ok(true)
    }

    async fn renew_lease(
        &self,
        holder: &str,
        ttl_ms: u64,
        now_ms: u64,
    ) -> Result<bool, EngineError> {
        let mut inner = self.inner.lock();
        let holds_it = matches!(&inner.state.lease, Some(l) if l.holder == holder);
        if !holds_it {
            return Ok(false);
        }
        self.record(
            &mut inner,
            WorkStoreEvent::RenewLease {
                holder: holder.to_string(),
                expires_at_ms: now_ms + ttl_ms,
            },
        )?;
        Ok(true)
    }

    async fn release_lease(&self, holder: &str) -> Result<(), EngineError> {
        let mut inner = self.inner.lock();
        self.record(
            &mut inner,
            WorkStoreEvent::ReleaseLease {
                holder: holder.to_string(),
            },
        )
    }

    async fn is_leader(&self, holder: &str, now_ms: u64) -> Result<bool, EngineError> {
        let inner = self.inner.lock();
        Ok(matches!(&inner.state.lease, Some(l) if l.holder == holder && !l.is_expired(now_ms)))
    }

    async fn signal_stop(&self, worker_name: &str) -> Result<(), EngineError> {
        let mut inner = self.inner.lock();
        self.record(
            &mut inner,
            WorkStoreEvent::SetControlSignal {
                worker_name: worker_name.to_string(),
                signal: ControlSignal::Stop,
            },
        )
    }

    async fn signal_shutdown(&self, worker_name: &str) -> Result<(), EngineError> {
        let mut inner = self.inner.lock();
        self.record(
            &mut inner,
            WorkStoreEvent::SetControlSignal {
                worker_name: worker_name.to_string(),
                signal: ControlSignal::Shutdown,
            },
        )
    }

    async fn take_control_signal(
        &self,
        worker_name: &str,
    ) -> Result<Option<ControlSignal>, EngineError> {
        let mut inner = self.inner.lock();
        let Some(signal) = inner.state.control_signals.get(worker_name).copied() else {
            return Ok(None);
        };
        self.record(
            &mut inner,
            WorkStoreEvent::ClearControlSignal {
                worker_name: worker_name.to_string(),
            },
        )?;
        Ok(Some(signal))
    }

    async fn register_active_user(&self, user_id: &str) -> Result<(), EngineError> {
        let mut inner = self.inner.lock();
        self.record(
            &mut inner,
            WorkStoreEvent::RegisterActiveUser {
                user_id: user_id.to_string(),
            },
        )
    }

    async fn unregister_active_user(&self, user_id: &str) -> Result<(), EngineError> {
        let mut inner = self.inner.lock();
        self.record(
            &mut inner,
            WorkStoreEvent::UnregisterActiveUser {
                user_id: user_id.to_string(),
            },
        )
    }

    async fn active_users(&self) -> Result<Vec<String>, EngineError> {
        Ok(self
            .inner
            .lock()
            .state
            .active_users
            .iter()
            .cloned()
            .collect())
    }

    async fn checkpoint(&self) -> Result<(), EngineError> {
        let mut inner = self.inner.lock();
        let Some(journal) = inner.journal.as_mut() else {
            return Ok(());
        };
        let seq = journal.wal.processed_seq();
        let result = journal
            .checkpointer
            .checkpoint_sync(seq, &inner.state)
            .map_err(|e| EngineError::InfrastructureError(e.to_string()))?;
        journal
            .wal
            .truncate_before(result.seq)
            .map_err(|e| EngineError::InfrastructureError(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
