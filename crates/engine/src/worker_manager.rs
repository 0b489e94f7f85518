// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Owns the pool of long-lived worker tasks draining the Work Store's
//! queues: N CPU workers per active user, a shared round-robin GPU pool.

use crate::worker_logger::WorkerLogger;
use crate::worker_runtime::{self, WorkerRuntimeConfig};
use adx_adapters::ContainerRuntime;
use adx_core::{Clock, EngineError, QueueFamily, QueueName};
use adx_storage::{ControlSignal, WorkStore};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Pool sizing policy, read once at startup.
#[derive(Debug, Clone, Copy)]
pub struct WorkerManagerConfig {
    pub num_user_cpu_workers: usize,
    pub num_gpu_workers: usize,
    pub gpu_enabled: bool,
}

/// Empty-queue backoff: how long an idle worker sleeps before polling again.
const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(500);

struct Tracked {
    cpu: HashMap<String, Vec<(String, JoinHandle<()>)>>,
    gpu: Vec<(String, JoinHandle<()>)>,
}

/// Maintains "for every active user there exist N CPU workers draining that
/// user's CPU queue, and a shared pool of M GPU workers drains all users'
/// GPU queues in round-robin".
pub struct WorkerManager<S, C, K> {
    store: Arc<S>,
    runtime: Arc<C>,
    clock: K,
    config: WorkerManagerConfig,
    runtime_config: WorkerRuntimeConfig,
    logger: Arc<WorkerLogger>,
    tracked: Mutex<Tracked>,
    gpu_generation: AtomicU64,
}

impl<S, C, K> WorkerManager<S, C, K>
where
    S: WorkStore + 'static,
    C: ContainerRuntime,
    K: Clock,
{
    pub fn new(
        store: Arc<S>,
        runtime: Arc<C>,
        clock: K,
        config: WorkerManagerConfig,
        runtime_config: WorkerRuntimeConfig,
        logger: Arc<WorkerLogger>,
    ) -> Self {
        Self {
            store,
            runtime,
            clock,
            config,
            runtime_config,
            logger,
            tracked: Mutex::new(Tracked {
                cpu: HashMap::new(),
                gpu: Vec::new(),
            }),
            gpu_generation: AtomicU64::new(0),
        }
    }

    /// Reads the active-users registry from the Work Store and brings the
    /// worker pool up to the configured shape for each of them, plus the
    /// shared GPU pool if GPU use is enabled server-wide.
    pub async fn init(&self) -> Result<(), EngineError> {
        let users = self.store.active_users().await?;
        for user_id in users {
            self.spawn_cpu_workers(&user_id).await;
        }
        if self.config.gpu_enabled {
            self.spawn_gpu_workers(None).await;
        }
        Ok(())
    }

    pub fn get_user_queues(&self, user_id: &str) -> (QueueName, Option<QueueName>) {
        let cpu = QueueName::for_user(user_id, QueueFamily::Cpu);
        let gpu = self
            .config
            .gpu_enabled
            .then(|| QueueName::for_user(user_id, QueueFamily::Gpu));
        (cpu, gpu)
    }

    /// Idempotent: spawns up to `num_user_cpu_workers` minus the count of
    /// already-running workers listening on `user_id`'s CPU queue.
    pub async fn spawn_cpu_workers(&self, user_id: &str) {
        let to_spawn = {
            let mut tracked = self.tracked.lock();
            let workers = tracked.cpu.entry(user_id.to_string()).or_default();
            workers.retain(|(_, handle)| !handle.is_finished());
            self.config.num_user_cpu_workers.saturating_sub(workers.len())
        };
        if to_spawn == 0 {
            return;
        }

        let queue = QueueName::for_user(user_id, QueueFamily::Cpu);
        let mut spawned = Vec::with_capacity(to_spawn);
        for i in 0..to_spawn {
            let name = format!("{user_id}-cpu-{i}");
            tracing::info!(user_id, worker = %name, "spawning cpu worker");
            let handle = tokio::spawn(cpu_worker_loop(
                Arc::clone(&self.store),
                Arc::clone(&self.runtime),
                self.clock.clone(),
                self.runtime_config.clone(),
                Arc::clone(&self.logger),
                queue.clone(),
                name.clone(),
            ));
            spawned.push((name, handle));
        }

        let mut tracked = self.tracked.lock();
        tracked.cpu.entry(user_id.to_string()).or_default().extend(spawned);
    }

    /// Requests graceful shutdown of every existing GPU worker, then spawns
    /// a fresh generation subscribed to the shared round-robin GPU queue.
    ///
    /// `user_ids` is accepted for parity with the documented contract but
    /// unused: the Work Store's round-robin pop already spans every active
    /// user's GPU queue, so there is no per-user GPU subscription to narrow.
    pub async fn spawn_gpu_workers(&self, _user_ids: Option<Vec<String>>) {
        let old_names: Vec<String> = {
            let tracked = self.tracked.lock();
            tracked.gpu.iter().map(|(name, _)| name.clone()).collect()
        };
        for name in &old_names {
            if let Err(e) = self.store.signal_shutdown(name).await {
                tracing::warn!(worker = %name, error = %e, "failed to signal gpu worker shutdown");
            }
        }

        let generation = self.gpu_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let mut spawned = Vec::with_capacity(self.config.num_gpu_workers);
        for i in 0..self.config.num_gpu_workers {
            let name = format!("gpu-{generation}-{i}");
            tracing::info!(worker = %name, generation, "spawning gpu worker");
            let handle = tokio::spawn(gpu_worker_loop(
                Arc::clone(&self.store),
                Arc::clone(&self.runtime),
                self.clock.clone(),
                self.runtime_config.clone(),
                Arc::clone(&self.logger),
                name.clone(),
            ));
            spawned.push((name, handle));
        }

        let mut tracked = self.tracked.lock();
        tracked.gpu = spawned;
    }

    /// Registers a new active user and brings its CPU pool up immediately.
    /// Worker spawn failures never block the caller (login/registration).
    pub async fn register_user(&self, user_id: &str) -> Result<(), EngineError> {
        self.store.register_active_user(user_id).await?;
        self.spawn_cpu_workers(user_id).await;
        Ok(())
    }

    /// Deregisters a user and asks its CPU workers to stop after their
    /// current unit; does not forcibly abort in-flight work.
    pub async fn deregister_user(&self, user_id: &str) -> Result<(), EngineError> {
        self.store.unregister_active_user(user_id).await?;
        let names: Vec<String> = {
            let mut tracked = self.tracked.lock();
            tracked.cpu.remove(user_id).map(|w| w.into_iter().map(|(n, _)| n).collect()).unwrap_or_default()
        };
        for name in names {
            if let Err(e) = self.store.signal_stop(&name).await {
                tracing::warn!(worker = %name, error = %e, "failed to signal cpu worker stop");
            }
        }
        Ok(())
    }
}

/// Returns `true` once a control signal asks this worker to stop taking
/// more work (after finishing whatever it currently holds) or shut down.
async fn should_exit<S: WorkStore + 'static>(store: &S, worker_name: &str) -> bool {
    match store.take_control_signal(worker_name).await {
        Ok(Some(ControlSignal::Stop)) | Ok(Some(ControlSignal::Shutdown)) => {
            tracing::info!(worker = %worker_name, "worker loop exiting on control signal");
            true
        }
        Ok(None) => false,
        Err(e) => {
            tracing::warn!(worker = %worker_name, error = %e, "failed to read control signal");
            false
        }
    }
}

async fn run_one<S, C, K>(
    store: &S,
    runtime: &Arc<C>,
    clock: &K,
    runtime_config: &WorkerRuntimeConfig,
    logger: &WorkerLogger,
    worker_name: &str,
    unit: Option<adx_core::WorkUnit>,
) where
    S: WorkStore + 'static,
    C: ContainerRuntime,
    K: Clock,
{
    match unit {
        Some(unit) => {
            if let Err(e) =
                worker_runtime::process_unit(unit, store, runtime, runtime_config, clock, logger, worker_name).await
            {
                tracing::warn!(worker = %worker_name, error = %e, "unit processing failed");
            }
        }
        None => tokio::time::sleep(IDLE_POLL_INTERVAL).await,
    }
}

/// Drains one user's CPU queue FIFO until told to stop.
async fn cpu_worker_loop<S, C, K>(
    store: Arc<S>,
    runtime: Arc<C>,
    clock: K,
    runtime_config: WorkerRuntimeConfig,
    logger: Arc<WorkerLogger>,
    queue: QueueName,
    worker_name: String,
) where
    S: WorkStore + 'static,
    C: ContainerRuntime,
    K: Clock,
{
    loop {
        if should_exit(store.as_ref(), &worker_name).await {
            return;
        }
        let dequeued = match store.pop_fifo(&queue).await {
            Ok(unit) => unit,
            Err(e) => {
                tracing::warn!(worker = %worker_name, error = %e, "failed to dequeue");
                None
            }
        };
        run_one(store.as_ref(), &runtime, &clock, &runtime_config, &logger, &worker_name, dequeued).await;
    }
}

/// Drains the shared round-robin GPU queue across all users until told to
/// stop. Required so one heavy user cannot starve the others.
async fn gpu_worker_loop<S, C, K>(
    store: Arc<S>,
    runtime: Arc<C>,
    clock: K,
    runtime_config: WorkerRuntimeConfig,
    logger: Arc<WorkerLogger>,
    worker_name: String,
) where
    S: WorkStore + 'static,
    C: ContainerRuntime,
    K: Clock,
{
    loop {
        if should_exit(store.as_ref(), &worker_name).await {
            return;
        }
        let dequeued = match store.pop_round_robin(QueueFamily::Gpu).await {
            Ok(unit) => unit.map(|(_, u)| u),
            Err(e) => {
                tracing::warn!(worker = %worker_name, error = %e, "failed to dequeue");
                None
            }
        };
        run_one(store.as_ref(), &runtime, &clock, &runtime_config, &logger, &worker_name, dequeued).await;
    }
}

#[cfg(test)]
#[path = "worker_manager_tests.rs"]
mod tests;
