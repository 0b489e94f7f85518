// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon process wiring: config, IPC protocol, and the long-running
//! listener that bridges Unix-socket requests onto the engine.

pub mod config;
pub mod listener;
pub mod protocol;

use adx_adapters::{DockerCliRuntime, FakeMediaLibrary};
use adx_core::{EngineError, SystemClock, UuidIdGen};
use adx_engine::dispatcher::DispatcherConfig;
use adx_engine::{Dispatcher, StatusApi, SubmitRequest, WorkerLogger, WorkerManager, WorkerManagerConfig, WorkerRuntimeConfig};
use adx_storage::{InMemoryWorkStore, WorkStore};
use config::Config;
use protocol::{Request, Response};
use std::collections::HashMap;
use std::sync::Arc;

pub type Store = InMemoryWorkStore;
pub type Runtime = DockerCliRuntime;
pub type Library = FakeMediaLibrary;

/// The daemon's single entry point for every IPC request: owns the
/// dispatcher, worker pools, and status/cancellation surface, all wired
/// against one shared Work Store instance.
pub struct Daemon {
    store: Arc<Store>,
    dispatcher: Dispatcher<Store, Library, SystemClock, UuidIdGen>,
    worker_manager: Arc<WorkerManager<Store, Runtime, SystemClock>>,
    status_api: StatusApi<Store, Runtime, SystemClock>,
}

impl Daemon {
    pub fn new(config: &Config, store: Arc<Store>) -> Self {
        let runtime = Arc::new(DockerCliRuntime::new());
        let library = Arc::new(FakeMediaLibrary::new());
        let logger = Arc::new(WorkerLogger::new(config.state_dir.join("logs")));

        let dispatcher = Dispatcher::new(
            store.clone(),
            library,
            SystemClock,
            UuidIdGen,
            DispatcherConfig {
                chunk_actions: config.chunk_actions,
                use_gpu: config.use_gpu,
                default_job_timeout_secs: config.default_job_timeout_secs,
                default_retention_secs: config.default_retention_secs,
                static_env: static_env(config),
            },
        );

        let worker_manager = Arc::new(WorkerManager::new(
            store.clone(),
            runtime.clone(),
            SystemClock,
            WorkerManagerConfig {
                num_user_cpu_workers: config.num_user_cpu_workers,
                num_gpu_workers: config.num_gpu_workers,
                gpu_enabled: config.gpu_enabled,
            },
            WorkerRuntimeConfig {
                host_library_path: config.host_library_path.display().to_string(),
                container_library_path: config.container_library_path.display().to_string(),
                host_script_path: config.host_script_path.display().to_string(),
                container_script_path: config.container_script_path.display().to_string(),
                host_model_cache_path: config.host_model_cache_path.display().to_string(),
                container_model_cache_path: config.container_model_cache_path.display().to_string(),
                server_allows_gpu: config.gpu_enabled,
            },
            logger,
        ));

        let status_api = StatusApi::new(store.clone(), runtime, SystemClock);

        Self { store, dispatcher, worker_manager, status_api }
    }

    /// Bring every already-registered active user's worker pools up. Call
    /// once at startup, after winning the master lease.
    pub async fn init(&self) -> Result<(), EngineError> {
        self.worker_manager.init().await
    }

    /// Force a durable snapshot of the Work Store. Called on a timer and on
    /// graceful shutdown.
    pub async fn checkpoint(&self) -> Result<(), EngineError> {
        self.store.checkpoint().await
    }

    /// Handle one decoded IPC request, never panicking: every engine error
    /// is turned into a `Response::Error`.
    pub async fn handle(&self, request: Request) -> Response {
        match request {
            Request::Ping => Response::Pong { version: protocol::wire::PROTOCOL_VERSION.to_string() },
            Request::Submit {
                user_id,
                image,
                script_path,
                plugins,
                action_name,
                target_id,
                target_required,
                gpu,
                exec_run,
                run_without_target,
                max_track_duration,
                max_chunk_duration,
                env,
                watchdog_timeout_secs,
                replace_plugin_data,
                params,
            } => {
                let req = SubmitRequest {
                    user_id,
                    image,
                    script_path,
                    plugins,
                    action_name,
                    target_id,
                    target_required,
                    gpu,
                    exec_run,
                    run_without_target,
                    max_track_duration,
                    max_chunk_duration,
                    env,
                    watchdog_timeout_secs,
                    replace_plugin_data,
                    params,
                };
                match self.dispatcher.submit(req).await {
                    Ok(unit_id) => Response::Submitted { unit_id },
                    Err(e) => Response::from_engine_error(e),
                }
            }
            Request::Status { user_id, unit_id } => match self.status_api.status(&user_id, &unit_id).await {
                Ok(status) => Response::Status(status),
                Err(e) => Response::from_engine_error(e),
            },
            Request::AllStatuses { user_id } => match self.status_api.all_statuses(&user_id).await {
                Ok(statuses) => Response::AllStatuses(statuses),
                Err(e) => Response::from_engine_error(e),
            },
            Request::Cancel { user_id, unit_id } => {
                let ok = self.status_api.cancel(&user_id, &unit_id).await;
                Response::Canceled { ok }
            }
            Request::RegisterUser { user_id } => match self.worker_manager.register_user(&user_id).await {
                Ok(()) => Response::Registered,
                Err(e) => Response::from_engine_error(e),
            },
            Request::DeregisterUser { user_id } => match self.worker_manager.deregister_user(&user_id).await {
                Ok(()) => Response::Deregistered,
                Err(e) => Response::from_engine_error(e),
            },
        }
    }
}

/// Server-wide environment every submitted unit carries, independent of the
/// per-submission dynamic keys (`USER_ID`, `PLUGINS`, ...).
fn static_env(config: &Config) -> HashMap<String, String> {
    let mut env = HashMap::new();
    env.insert("LIBRARY_PATH".to_string(), config.container_library_path.display().to_string());
    env.insert("LOG_LEVEL".to_string(), config.log_level.clone());
    env.insert("REDIS_HOST".to_string(), config.redis_host.clone());
    env.insert("REDIS_PORT".to_string(), config.redis_port.to_string());
    env.insert("REDIS_DB".to_string(), config.redis_db.to_string());
    if !config.redis_user.is_empty() {
        env.insert("REDIS_USER".to_string(), config.redis_user.clone());
    }
    if !config.redis_password.is_empty() {
        env.insert("REDIS_PASSWORD".to_string(), config.redis_password.clone());
    }
    env
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
