// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake container runtime for deterministic testing.

use super::{ContainerError, ContainerHandle, ContainerRuntime, ContainerStatus};
use adx_core::ContainerSpec;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub enum ContainerCall {
    Create { name: String },
    Exec { name: String, command: Vec<String> },
    Stop { name: String },
    Kill { name: String },
    Remove { name: String },
}

struct FakeContainer {
    status: ContainerStatus,
    exit_code: Option<i32>,
    logs: String,
}

struct FakeState {
    containers: HashMap<String, FakeContainer>,
    calls: Vec<ContainerCall>,
    create_error: Option<ContainerError>,
}

/// Drives [`ContainerRuntime`] entirely in memory, with every state change
/// under direct test control instead of docker's own wall-clock timing.
#[derive(Clone)]
pub struct FakeContainerRuntime {
    inner: Arc<Mutex<FakeState>>,
}

impl Default for FakeContainerRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeContainerRuntime {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeState {
                containers: HashMap::new(),
                calls: Vec::new(),
                create_error: None,
            })),
        }
    }

    pub fn calls(&self) -> Vec<ContainerCall> {
        self.inner.lock().calls.clone()
    }

    pub fn set_create_error(&self, error: ContainerError) {
        self.inner.lock().create_error = Some(error);
    }

    /// Move a container straight to `Exited` with the given exit code, as
    /// if the script inside it had just finished.
    pub fn finish(&self, name: &str, exit_code: i32) {
        if let Some(c) = self.inner.lock().containers.get_mut(name) {
            c.status = ContainerStatus::Exited;
            c.exit_code = Some(exit_code);
        }
    }

    pub fn set_logs(&self, name: &str, logs: impl Into<String>) {
        if let Some(c) = self.inner.lock().containers.get_mut(name) {
            c.logs = logs.into();
        }
    }

    pub fn is_running(&self, name: &str) -> bool {
        matches!(
            self.inner.lock().containers.get(name).map(|c| c.status),
            Some(ContainerStatus::Running)
        )
    }
}

#[async_trait]
impl ContainerRuntime for FakeContainerRuntime {
    async fn create_and_start(
        &self,
        spec: &ContainerSpec,
    ) -> Result<ContainerHandle, ContainerError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ContainerCall::Create {
            name: spec.name.clone(),
        });
        if let Some(error) = inner.create_error.take() {
            return Err(error);
        }
        inner.containers.insert(
            spec.name.clone(),
            FakeContainer {
                status: ContainerStatus::Running,
                exit_code: None,
                logs: String::new(),
            },
        );
        Ok(ContainerHandle {
            name: spec.name.clone(),
            container_id: format!("fake-{}", spec.name),
        })
    }

    async fn exec(&self, name: &str, command: &[String]) -> Result<(), ContainerError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ContainerCall::Exec {
            name: name.to_string(),
            command: command.to_vec(),
        });
        if !inner.containers.contains_key(name) {
            return Err(ContainerError::NotFound(name.to_string()));
        }
        Ok(())
    }

    async fn status(&self, name: &str) -> Result<ContainerStatus, ContainerError> {
        Ok(self
            .inner
            .lock()
            .containers
            .get(name)
            .map(|c| c.status)
            .unwrap_or(ContainerStatus::NotFound))
    }

    async fn exit_code(&self, name: &str) -> Result<Option<i32>, ContainerError> {
        self.inner
            .lock()
            .containers
            .get(name)
            .map(|c| c.exit_code)
            .ok_or_else(|| ContainerError::NotFound(name.to_string()))
    }

    async fn logs(&self, name: &str, tail_lines: usize) -> Result<String, ContainerError> {
        let inner = self.inner.lock();
        let c = inner
            .containers
            .get(name)
            .ok_or_else(|| ContainerError::NotFound(name.to_string()))?;
        Ok(c.logs
            .lines()
            .rev()
            .take(tail_lines)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect::<Vec<_>>()
            .join("\n"))
    }

    async fn stop(&self, name: &str) -> Result<(), ContainerError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ContainerCall::Stop {
            name: name.to_string(),
        });
        match inner.containers.get_mut(name) {
            Some(c) => {
                c.status = ContainerStatus::Exited;
                Ok(())
            }
            None => Err(ContainerError::NotFound(name.to_string())),
        }
    }

    async fn kill(&self, name: &str) -> Result<(), ContainerError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ContainerCall::Kill {
            name: name.to_string(),
        });
        if let Some(c) = inner.containers.get_mut(name) {
            c.status = ContainerStatus::Exited;
        }
        Ok(())
    }

    async fn remove(&self, name: &str) -> Result<(), ContainerError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ContainerCall::Remove {
            name: name.to_string(),
        });
        inner.containers.remove(name);
        Ok(())
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<ContainerHandle>, ContainerError> {
        Ok(self
            .inner
            .lock()
            .containers
            .get(name)
            .map(|_| ContainerHandle {
                name: name.to_string(),
                container_id: format!("fake-{name}"),
            }))
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
