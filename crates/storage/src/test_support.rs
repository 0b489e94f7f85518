// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test fixtures for use across crates.

use crate::store::InMemoryWorkStore;
use std::sync::Arc;

pub fn in_memory_store() -> Arc<InMemoryWorkStore> {
    Arc::new(InMemoryWorkStore::in_memory())
}
