// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test fixtures for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::dispatcher::{DispatcherConfig, SubmitRequest};
use crate::worker_manager::WorkerManagerConfig;
use crate::worker_runtime::WorkerRuntimeConfig;
use adx_core::ParamMap;
use std::collections::HashMap;

pub fn dispatcher_config() -> DispatcherConfig {
    DispatcherConfig {
        chunk_actions: true,
        use_gpu: true,
        default_job_timeout_secs: 72 * 3600,
        default_retention_secs: 172_800,
        static_env: HashMap::new(),
    }
}

pub fn worker_manager_config() -> WorkerManagerConfig {
    WorkerManagerConfig {
        num_user_cpu_workers: 3,
        num_gpu_workers: 1,
        gpu_enabled: true,
    }
}

pub fn worker_runtime_config() -> WorkerRuntimeConfig {
    WorkerRuntimeConfig {
        host_library_path: "/data/library".to_string(),
        container_library_path: "/library".to_string(),
        host_script_path: "/data/scripts".to_string(),
        container_script_path: "/scripts".to_string(),
        host_model_cache_path: "/data/model-cache".to_string(),
        container_model_cache_path: "/model-cache".to_string(),
        server_allows_gpu: true,
    }
}

pub fn submit_request(user_id: &str, action_name: &str) -> SubmitRequest {
    SubmitRequest {
        user_id: user_id.to_string(),
        image: "nendo/quantize".to_string(),
        script_path: "/scripts/run.py".to_string(),
        plugins: Vec::new(),
        action_name: action_name.to_string(),
        target_id: String::new(),
        target_required: false,
        gpu: false,
        exec_run: false,
        run_without_target: false,
        max_track_duration: 0.0,
        max_chunk_duration: 0.0,
        env: HashMap::new(),
        watchdog_timeout_secs: 0,
        replace_plugin_data: false,
        params: ParamMap::new(),
    }
}
