// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Container runtime adapter.
//!
//! `ContainerRuntime` abstracts the one thing the worker runtime needs from
//! Docker: create a container from a [`ContainerSpec`], poll it, read its
//! tail, and tear it down. The bundled [`DockerCliRuntime`] shells out to
//! the `docker` binary; [`FakeContainerRuntime`] drives the same trait
//! deterministically for tests.

mod docker;

#[cfg(any(test, feature = "test-support"))]
mod fake;

pub use docker::DockerCliRuntime;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{ContainerCall, FakeContainerRuntime};

use adx_core::ContainerSpec;
use async_trait::async_trait;
use thiserror::Error;

/// Handle returned once a container has been created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerHandle {
    pub name: String,
    pub container_id: String,
}

/// Coarse container status, as reported by `docker inspect`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerStatus {
    Running,
    Exited,
    /// No container with that name exists (already removed, or never created).
    NotFound,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContainerError {
    #[error("container not found: {0}")]
    NotFound(String),
    #[error("create failed: {0}")]
    CreateFailed(String),
    #[error("exec failed: {0}")]
    ExecFailed(String),
    #[error("stop failed: {0}")]
    StopFailed(String),
    #[error("inspect failed: {0}")]
    InspectFailed(String),
}

/// Adapter for managing the lifecycle of a single container per work unit.
#[async_trait]
pub trait ContainerRuntime: Send + Sync + 'static {
    /// Create and start a detached container from `spec`.
    async fn create_and_start(
        &self,
        spec: &ContainerSpec,
    ) -> Result<ContainerHandle, ContainerError>;

    /// Run `command` inside an already-running container (the `exec_run` path).
    async fn exec(&self, name: &str, command: &[String]) -> Result<(), ContainerError>;

    async fn status(&self, name: &str) -> Result<ContainerStatus, ContainerError>;

    /// The container's exit code, if it has exited.
    async fn exit_code(&self, name: &str) -> Result<Option<i32>, ContainerError>;

    /// The last `tail_lines` lines of combined stdout/stderr.
    async fn logs(&self, name: &str, tail_lines: usize) -> Result<String, ContainerError>;

    /// Graceful stop (SIGTERM, then SIGKILL after docker's own grace period).
    async fn stop(&self, name: &str) -> Result<(), ContainerError>;

    /// Immediate stop (SIGKILL).
    async fn kill(&self, name: &str) -> Result<(), ContainerError>;

    /// Remove the container. Idempotent: a missing container is not an error.
    async fn remove(&self, name: &str) -> Result<(), ContainerError>;

    async fn get_by_name(&self, name: &str) -> Result<Option<ContainerHandle>, ContainerError>;
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
