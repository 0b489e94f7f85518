// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Durable storage for the Action Dispatch & Execution Engine.

mod checkpoint;
mod event;
mod migration;
mod snapshot;
mod state;
mod store;
mod wal;

pub use checkpoint::{load_snapshot, CheckpointError, CheckpointHandle, CheckpointResult, Checkpointer};
pub use event::{ControlSignal, WorkStoreEvent};
pub use snapshot::{Snapshot, SnapshotError, CURRENT_SNAPSHOT_VERSION};
pub use state::{Lease, WorkStoreState};
pub use store::{InMemoryWorkStore, WorkStore};
pub use wal::{Wal, WalEntry, WalError};

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
