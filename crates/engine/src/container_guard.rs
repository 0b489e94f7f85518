// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! RAII guard over a container's lifetime: whatever exit path the worker
//! protocol takes, the container is removed exactly once.

use adx_adapters::ContainerRuntime;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Holds a container name under `runtime`'s ownership until [`Self::finish`]
/// is called, or until dropped — whichever comes first. `Drop` issues a
/// best-effort `remove` on a fresh tokio task if the worker protocol
/// unwound (panic, early return, cancellation) before cleaning up itself.
pub struct ContainerGuard<C: ContainerRuntime> {
    runtime: Arc<C>,
    name: String,
    cleaned_up: AtomicBool,
}

impl<C: ContainerRuntime> ContainerGuard<C> {
    pub fn new(runtime: Arc<C>, name: impl Into<String>) -> Self {
        Self {
            runtime,
            name: name.into(),
            cleaned_up: AtomicBool::new(false),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Remove the container now, marking cleanup done so `Drop` is a no-op.
    pub async fn finish(&self) {
        if self.cleaned_up.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Err(e) = self.runtime.remove(&self.name).await {
            tracing::warn!(container = %self.name, error = %e, "cleanup remove failed");
        }
    }
}

impl<C: ContainerRuntime> Drop for ContainerGuard<C> {
    fn drop(&mut self) {
        if self.cleaned_up.swap(true, Ordering::SeqCst) {
            return;
        }
        let runtime = Arc::clone(&self.runtime);
        let name = self.name.clone();
        tokio::spawn(async move {
            if let Err(e) = runtime.remove(&name).await {
                tracing::warn!(container = %name, error = %e, "drop-path cleanup remove failed");
            }
        });
    }
}

#[cfg(test)]
#[path = "container_guard_tests.rs"]
mod tests;
