// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-unit execution protocol: resolve GPU usage, compose the container
//! spec, run or exec, watch for completion, collect the result, clean up.

use crate::container_guard::ContainerGuard;
use crate::watchdog::{wait_for_completion, WaitOutcome};
use crate::worker_logger::WorkerLogger;
use adx_adapters::ContainerRuntime;
use adx_core::{Clock, ContainerSpec, EngineError, UnitState, VolumeBind, WorkUnit};
use adx_storage::WorkStore;
use std::collections::HashMap;
use std::sync::Arc;

/// Binds and environment the worker injects into every container,
/// regardless of what the caller requested.
#[derive(Debug, Clone)]
pub struct WorkerRuntimeConfig {
    pub host_library_path: String,
    pub container_library_path: String,
    pub host_script_path: String,
    pub container_script_path: String,
    pub host_model_cache_path: String,
    pub container_model_cache_path: String,
    /// Server-wide policy; effective GPU use is `unit.gpu_requested && this`.
    pub server_allows_gpu: bool,
}

/// Library/runtime invariants always win over caller-supplied overrides of
/// the same key, per the invocation contract. `USE_GPU` is resolved here
/// from the unit's actual effective GPU use, overriding whatever value the
/// Dispatcher wrote at submit time from the requested (not yet
/// policy-checked) flag.
fn compose_environment(caller_env: &HashMap<String, String>, effective_gpu: bool) -> HashMap<String, String> {
    let mut env = caller_env.clone();
    env.insert("USE_GPU".to_string(), effective_gpu.to_string());
    env
}

fn compose_container_spec(unit: &WorkUnit, config: &WorkerRuntimeConfig) -> ContainerSpec {
    let effective_gpu = unit.gpu_requested && config.server_allows_gpu;
    let mut binds = unit.spec.binds.clone();
    binds.push(VolumeBind {
        host_path: config.host_library_path.clone(),
        container_path: config.container_library_path.clone(),
        read_only: false,
    });
    binds.push(VolumeBind {
        host_path: config.host_script_path.clone(),
        container_path: config.container_script_path.clone(),
        read_only: true,
    });
    binds.push(VolumeBind {
        host_path: config.host_model_cache_path.clone(),
        container_path: config.container_model_cache_path.clone(),
        read_only: false,
    });

    ContainerSpec {
        image: unit.spec.image.clone(),
        command: unit.spec.command.clone(),
        name: unit.spec.name.clone(),
        env: compose_environment(&unit.spec.env, effective_gpu),
        binds,
        gpu: effective_gpu,
    }
}

fn tail_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}

/// Non-zero exit: `ExecutionFailed` carrying up to the last 5 log lines.
/// Zero exit: the trimmed-trailing-blank last line, the script's contract
/// for its caller-visible outcome.
async fn collect_result<C: ContainerRuntime>(runtime: &C, name: &str) -> Result<String, EngineError> {
    let exit_code = runtime
        .exit_code(name)
        .await
        .map_err(|e| EngineError::InfrastructureError(e.to_string()))?;
    let logs = runtime.logs(name, 10_000).await.unwrap_or_default();
    match exit_code {
        Some(0) => {
            let mut lines: Vec<&str> = logs.lines().collect();
            if lines.last().map(|l| l.trim().is_empty()).unwrap_or(false) {
                lines.pop();
            }
            Ok(lines.last().map(|s| s.to_string()).unwrap_or_default())
        }
        _ => Err(EngineError::ExecutionFailed(tail_lines(&logs, 5))),
    }
}

async fn run_unit<C, K>(
    unit: &WorkUnit,
    spec: &ContainerSpec,
    runtime: &Arc<C>,
    clock: &K,
    logger: &WorkerLogger,
    worker_name: &str,
) -> Result<String, EngineError>
where
    C: ContainerRuntime,
    K: Clock,
{
    if unit.exec_run {
        runtime
            .exec(&spec.name, &spec.command)
            .await
            .map_err(|e| EngineError::InfrastructureError(e.to_string()))?;
        return collect_result(runtime.as_ref(), &spec.name).await;
    }

    runtime
        .create_and_start(spec)
        .await
        .map_err(|e| EngineError::InfrastructureError(e.to_string()))?;
    logger.append(worker_name, &format!("created container {}", spec.name));
    let guard = ContainerGuard::new(Arc::clone(runtime), spec.name.clone());

    let wait_result = wait_for_completion(runtime.as_ref(), clock, &spec.name, unit.watchdog_timeout_secs).await;

    let outcome = match wait_result {
        Ok(outcome) => outcome,
        Err(e) => {
            guard.finish().await;
            return Err(EngineError::InfrastructureError(e.to_string()));
        }
    };

    let result = match outcome {
        WaitOutcome::TimedOut => {
            logger.append(worker_name, &format!("watchdog fired for {}", spec.name));
            let logs = runtime.logs(&spec.name, 10_000).await.unwrap_or_default();
            Err(EngineError::TimedOut(tail_lines(&logs, 5)))
        }
        WaitOutcome::Exited => collect_result(runtime.as_ref(), &spec.name).await,
    };

    guard.finish().await;
    logger.append(worker_name, &format!("cleaned up {}", spec.name));
    result
}

/// Execute one dequeued unit end to end: transition to `started`, run it,
/// record the outcome, transition to its terminal state. Never returns an
/// error for a failed/timed-out *unit* — only for a store/infrastructure
/// failure the caller's worker loop should log and move past.
pub async fn process_unit<S, C, K>(
    unit: WorkUnit,
    store: &S,
    runtime: &Arc<C>,
    config: &WorkerRuntimeConfig,
    clock: &K,
    logger: &WorkerLogger,
    worker_name: &str,
) -> Result<(), EngineError>
where
    S: WorkStore,
    C: ContainerRuntime,
    K: Clock,
{
    store.transition(&unit.id, UnitState::Started, clock.epoch_ms()).await?;
    logger.append(worker_name, &format!("dequeued unit {}", unit.id));

    // A cancel can land between dequeue and here; re-read the unit to close
    // that race rather than creating a container for work already canceled.
    if store.get(&unit.id).await?.map(|u| u.state) != Some(UnitState::Started) {
        logger.append(worker_name, &format!("unit {} canceled before container creation", unit.id));
        return Ok(());
    }

    let spec = compose_container_spec(&unit, config);
    let outcome = run_unit(&unit, &spec, runtime, clock, logger, worker_name).await;

    match outcome {
        Ok(stdout_tail) => {
            // Prefer a result the script wrote to the metadata side channel
            // over the recomputed stdout-tail convention.
            let side_channel = store
                .get(&unit.id)
                .await?
                .and_then(|u| u.meta.result.filter(|r| !r.is_empty()));
            store
                .set_result(&unit.id, Some(side_channel.unwrap_or(stdout_tail)))
                .await?;
            store.transition(&unit.id, UnitState::Finished, clock.epoch_ms()).await?;
        }
        Err(EngineError::TimedOut(tail)) => {
            store.set_exc_info(&unit.id, Some(tail)).await?;
            store.transition(&unit.id, UnitState::Stopped, clock.epoch_ms()).await?;
        }
        Err(e) => {
            // A cancel landing while the container runs surfaces here too:
            // the kill leaves a non-zero exit code that `collect_result`
            // reports as a plain `ExecutionFailed`. Only record it as a
            // failure if the unit is still `started` in the store; if a
            // cancel already moved it to `canceled`, that transition is the
            // true outcome and this error is just the killed process's exit
            // code.
            if store.get(&unit.id).await?.map(|u| u.state) == Some(UnitState::Started) {
                store.set_exc_info(&unit.id, Some(e.to_string())).await?;
                store.transition(&unit.id, UnitState::Failed, clock.epoch_ms()).await?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "worker_runtime_tests.rs"]
mod tests;
