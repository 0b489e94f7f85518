// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `docker` CLI-backed [`ContainerRuntime`].

use super::{ContainerError, ContainerHandle, ContainerRuntime, ContainerStatus};
use crate::subprocess::{
    run_with_timeout, DOCKER_CREATE_TIMEOUT, DOCKER_EXEC_TIMEOUT, DOCKER_INSPECT_TIMEOUT,
    DOCKER_TEARDOWN_TIMEOUT,
};
use adx_core::ContainerSpec;
use async_trait::async_trait;
use tokio::process::Command;

/// Shells out to the `docker` binary on `$PATH`.
#[derive(Debug, Clone, Default)]
pub struct DockerCliRuntime;

impl DockerCliRuntime {
    pub fn new() -> Self {
        Self
    }
}

fn stderr_tail(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).trim().to_string()
}

#[async_trait]
impl ContainerRuntime for DockerCliRuntime {
    async fn create_and_start(
        &self,
        spec: &ContainerSpec,
    ) -> Result<ContainerHandle, ContainerError> {
        let mut cmd = Command::new("docker");
        cmd.arg("run").arg("-d").arg("--name").arg(&spec.name);

        for (key, value) in &spec.env {
            cmd.arg("-e").arg(format!("{key}={value}"));
        }
        for bind in &spec.binds {
            let mode = if bind.read_only { ":ro" } else { "" };
            cmd.arg("-v").arg(format!(
                "{}:{}{}",
                bind.host_path, bind.container_path, mode
            ));
        }
        if spec.gpu {
            cmd.arg("--gpus").arg("all");
        }
        cmd.arg(&spec.image);
        cmd.args(&spec.command);

        let output = run_with_timeout(cmd, DOCKER_CREATE_TIMEOUT, "docker run")
            .await
            .map_err(ContainerError::CreateFailed)?;
        if !output.status.success() {
            return Err(ContainerError::CreateFailed(stderr_tail(&output)));
        }

        let container_id = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(ContainerHandle {
            name: spec.name.clone(),
            container_id,
        })
    }

    async fn exec(&self, name: &str, command: &[String]) -> Result<(), ContainerError> {
        let mut cmd = Command::new("docker");
        cmd.arg("exec").arg(name).args(command);
        let output = run_with_timeout(cmd, DOCKER_EXEC_TIMEOUT, "docker exec")
            .await
            .map_err(ContainerError::ExecFailed)?;
        if !output.status.success() {
            return Err(ContainerError::ExecFailed(stderr_tail(&output)));
        }
        Ok(())
    }

    async fn status(&self, name: &str) -> Result<ContainerStatus, ContainerError> {
        let mut cmd = Command::new("docker");
        cmd.arg("inspect")
            .arg("--format")
            .arg("{{.State.Status}}")
            .arg(name);
        let output = run_with_timeout(cmd, DOCKER_INSPECT_TIMEOUT, "docker inspect")
            .await
            .map_err(ContainerError::InspectFailed)?;
        if !output.status.success() {
            return Ok(ContainerStatus::NotFound);
        }
        let status = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(match status.as_str() {
            "running" => ContainerStatus::Running,
            _ => ContainerStatus::Exited,
        })
    }

    async fn exit_code(&self, name: &str) -> Result<Option<i32>, ContainerError> {
        let mut cmd = Command::new("docker");
        cmd.arg("inspect")
            .arg("--format")
            .arg("{{.State.ExitCode}}")
            .arg(name);
        let output = run_with_timeout(cmd, DOCKER_INSPECT_TIMEOUT, "docker inspect")
            .await
            .map_err(ContainerError::InspectFailed)?;
        if !output.status.success() {
            return Err(ContainerError::NotFound(name.to_string()));
        }
        let raw = String::from_utf8_lossy(&output.stdout).trim().to_string();
        raw.parse::<i32>()
            .map(Some)
            .map_err(|e| ContainerError::InspectFailed(e.to_string()))
    }

    async fn logs(&self, name: &str, tail_lines: usize) -> Result<String, ContainerError> {
        let mut cmd = Command::new("docker");
        cmd.arg("logs")
            .arg("--tail")
            .arg(tail_lines.to_string())
            .arg(name);
        let output = run_with_timeout(cmd, DOCKER_INSPECT_TIMEOUT, "docker logs")
            .await
            .map_err(ContainerError::InspectFailed)?;
        if !output.status.success() {
            return Err(ContainerError::NotFound(name.to_string()));
        }
        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(combined)
    }

    async fn stop(&self, name: &str) -> Result<(), ContainerError> {
        let mut cmd = Command::new("docker");
        cmd.arg("stop").arg(name);
        let output = run_with_timeout(cmd, DOCKER_TEARDOWN_TIMEOUT, "docker stop")
            .await
            .map_err(ContainerError::StopFailed)?;
        if !output.status.success() {
            return Err(ContainerError::StopFailed(stderr_tail(&output)));
        }
        Ok(())
    }

    async fn kill(&self, name: &str) -> Result<(), ContainerError> {
        let mut cmd = Command::new("docker");
        cmd.arg("kill").arg(name);
        let output = run_with_timeout(cmd, DOCKER_TEARDOWN_TIMEOUT, "docker kill")
            .await
            .map_err(ContainerError::StopFailed)?;
        if !output.status.success() {
            // A container that already exited is not a failure to kill.
            let stderr = stderr_tail(&output);
            if stderr.contains("is not running") {
                return Ok(());
            }
            return Err(ContainerError::StopFailed(stderr));
        }
        Ok(())
    }

    async fn remove(&self, name: &str) -> Result<(), ContainerError> {
        let mut cmd = Command::new("docker");
        cmd.arg("rm").arg("-f").arg(name);
        // docker rm -f on an already-missing container exits non-zero but
        // that is exactly the caller's desired end state: no container.
        let _ = run_with_timeout(cmd, DOCKER_TEARDOWN_TIMEOUT, "docker rm")
            .await
            .map_err(ContainerError::StopFailed)?;
        Ok(())
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<ContainerHandle>, ContainerError> {
        match self.status(name).await? {
            ContainerStatus::NotFound => Ok(None),
            _ => Ok(Some(ContainerHandle {
                name: name.to_string(),
                container_id: name.to_string(),
            })),
        }
    }
}

#[cfg(test)]
#[path = "docker_tests.rs"]
mod tests;
