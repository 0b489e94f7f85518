// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! IPC request/response envelope exchanged over the daemon's Unix socket.

pub mod wire;

use adx_core::{ParamMap, WorkUnitId};
use adx_engine::UnitStatus;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One caller-initiated IPC call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    /// Liveness check; answered without touching the engine at all.
    Ping,
    Submit {
        user_id: String,
        image: String,
        script_path: String,
        plugins: Vec<String>,
        action_name: String,
        target_id: String,
        target_required: bool,
        gpu: bool,
        exec_run: bool,
        run_without_target: bool,
        max_track_duration: f64,
        max_chunk_duration: f64,
        env: HashMap<String, String>,
        watchdog_timeout_secs: u64,
        replace_plugin_data: bool,
        params: ParamMap,
    },
    Status {
        user_id: String,
        unit_id: WorkUnitId,
    },
    AllStatuses {
        user_id: String,
    },
    Cancel {
        user_id: String,
        unit_id: WorkUnitId,
    },
    RegisterUser {
        user_id: String,
    },
    DeregisterUser {
        user_id: String,
    },
}

/// The daemon's reply to one `Request`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Response {
    Pong { version: String },
    Submitted { unit_id: WorkUnitId },
    Status(UnitStatus),
    AllStatuses(Vec<UnitStatus>),
    Canceled { ok: bool },
    Registered,
    Deregistered,
    Error { message: String },
}

impl Response {
    pub fn from_engine_error(err: adx_core::EngineError) -> Self {
        Response::Error { message: err.to_string() }
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
