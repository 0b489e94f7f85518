// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test fixtures for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::queue::QueueFamily;
use crate::target::TrackInfo;
use crate::work_unit::{ContainerSpec, UnitMeta, UnitState, WorkUnit, WorkUnitId};
use std::collections::HashMap;

pub fn track(id: &str, title: &str, duration_secs: f64) -> TrackInfo {
    TrackInfo {
        id: id.to_string(),
        title: title.to_string(),
        duration_secs: Some(duration_secs),
    }
}

pub fn container_spec(image: &str, name: &str) -> ContainerSpec {
    ContainerSpec {
        image: image.to_string(),
        command: vec!["run.py".to_string()],
        name: name.to_string(),
        env: HashMap::new(),
        binds: Vec::new(),
        gpu: false,
    }
}

pub fn work_unit(id: &str, user_id: &str, family: QueueFamily) -> WorkUnit {
    WorkUnit {
        id: WorkUnitId::new(id),
        user_id: user_id.to_string(),
        queue_family: family,
        spec: container_spec("nendo/test", id),
        gpu_requested: family == QueueFamily::Gpu,
        watchdog_timeout_secs: 0,
        job_timeout_secs: 72 * 3600,
        retention_secs: 172_800,
        exec_run: false,
        replace_plugin_data: false,
        state: UnitState::Queued,
        meta: UnitMeta::default(),
        history: Vec::new(),
        enqueued_at_ms: 0,
        started_at_ms: None,
        ended_at_ms: None,
    }
}
