// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The request-time component: resolve a caller's target, plan chunks,
//! assemble work units, and enqueue them.

use crate::chunk_plan::plan_chunks;
use crate::command_encoding::compose_command;
use adx_adapters::{CollectionKind, LibraryError, MediaLibrary};
use adx_core::{
    Clock, EngineError, IdGen, ParamMap, QueueFamily, QueueName, TargetDescriptor, TargetShape, TargetType, UnitMeta,
    UnitState, WorkUnit, WorkUnitId,
};
use adx_storage::WorkStore;
use std::collections::HashMap;
use std::sync::Arc;

/// Server-wide policy the Dispatcher applies to every submission.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Master switch for the chunk planner (`chunk_actions`).
    pub chunk_actions: bool,
    /// Master switch for GPU use; when false every `gpu=true` request is
    /// coerced onto the CPU queue.
    pub use_gpu: bool,
    pub default_job_timeout_secs: u64,
    pub default_retention_secs: u64,
    /// Library/runtime environment the engine injects into every unit
    /// (`LIBRARY_PLUGIN`, `LIBRARY_PATH`, `LOG_LEVEL`, postgres coordinates,
    /// audio-import flags, ...), on top of which the dynamic per-submission
    /// keys (`USER_ID`, `PLUGINS`, `USE_GPU`, `REPLACE_PLUGIN_DATA`) are set.
    pub static_env: HashMap<String, String>,
}

/// One caller-initiated action submission.
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    pub user_id: String,
    pub image: String,
    pub script_path: String,
    pub plugins: Vec<String>,
    pub action_name: String,
    pub target_id: String,
    /// Some actions cannot run without an explicit target; an empty
    /// `target_id` on one of these is `InvalidTarget`, not a whole-library
    /// fallback.
    pub target_required: bool,
    pub gpu: bool,
    pub exec_run: bool,
    pub run_without_target: bool,
    pub max_track_duration: f64,
    pub max_chunk_duration: f64,
    pub env: HashMap<String, String>,
    pub watchdog_timeout_secs: u64,
    pub replace_plugin_data: bool,
    pub params: ParamMap,
}

/// One unit's resolved target before container-spec assembly.
struct PlannedUnit {
    target_id: String,
}

pub struct Dispatcher<S, L, K, G> {
    store: Arc<S>,
    library: Arc<L>,
    clock: K,
    id_gen: G,
    config: DispatcherConfig,
}

impl<S, L, K, G> Dispatcher<S, L, K, G>
where
    S: WorkStore,
    L: MediaLibrary,
    K: Clock,
    G: IdGen,
{
    pub fn new(store: Arc<S>, library: Arc<L>, clock: K, id_gen: G, config: DispatcherConfig) -> Self {
        Self {
            store,
            library,
            clock,
            id_gen,
            config,
        }
    }

    /// Translate a caller's action request into one or more work units,
    /// enqueue them, and return the last unit's id as the batch handle.
    pub async fn submit(&self, req: SubmitRequest) -> Result<WorkUnitId, EngineError> {
        if req.target_required && !req.run_without_target && req.target_id.trim().is_empty() {
            return Err(EngineError::InvalidTarget(
                "this action requires an explicit target".to_string(),
            ));
        }

        let shape = self.resolve_shape(&req).await?;
        let use_gpu_queue = req.gpu && self.config.use_gpu;
        let family = if use_gpu_queue { QueueFamily::Gpu } else { QueueFamily::Cpu };
        let target_type = target_type_of(&shape, req.run_without_target);

        let (planned, skipped) = if self.config.chunk_actions && !req.run_without_target && use_gpu_queue {
            self.plan_and_materialize_chunks(&req, &shape).await?
        } else {
            self.single_chunk(&req, &shape).await?
        };

        let rand8 = adx_core::rand8(&self.id_gen);
        let slug = slugify(&req.action_name);
        let pretty_params = serde_json::to_string_pretty(&req.params).unwrap_or_default();
        let env = self.compose_env(&req, use_gpu_queue);
        let queue = QueueName::for_user(&req.user_id, family);

        let mut ids = Vec::with_capacity(planned.len());
        for (i, unit_plan) in planned.iter().enumerate() {
            let job_id = format!("{slug}_{rand8}_{i}");
            let command = compose_command(&req.script_path, &req.user_id, &job_id, &unit_plan.target_id, &req.params);

            let spec = adx_core::ContainerSpec {
                image: req.image.clone(),
                command,
                name: job_id.clone(),
                env: env.clone(),
                binds: Vec::new(),
                gpu: use_gpu_queue,
            };

            let unit = WorkUnit {
                id: WorkUnitId::new(job_id.clone()),
                user_id: req.user_id.clone(),
                queue_family: family,
                spec,
                gpu_requested: use_gpu_queue,
                watchdog_timeout_secs: req.watchdog_timeout_secs,
                job_timeout_secs: self.config.default_job_timeout_secs,
                retention_secs: self.config.default_retention_secs,
                exec_run: req.exec_run,
                replace_plugin_data: req.replace_plugin_data,
                state: UnitState::Queued,
                meta: UnitMeta {
                    action_name: req.action_name.clone(),
                    parameters: pretty_params.clone(),
                    target: TargetDescriptor {
                        target_type,
                        target_id: unit_plan.target_id.clone(),
                    },
                    progress: String::new(),
                    errors: skipped
                        .iter()
                        .map(|title| format!("skipped (exceeds max track duration): {title}"))
                        .collect(),
                    result: None,
                    exc_info: None,
                },
                history: Vec::new(),
                enqueued_at_ms: self.clock.epoch_ms(),
                started_at_ms: None,
                ended_at_ms: None,
            };

            ids.push(unit.id.clone());
            self.store.push(queue.clone(), unit).await?;
        }

        // `single_chunk` always plans exactly one unit, and `plan_chunks`
        // guarantees at least one (possibly empty) chunk even when the
        // target has zero usable tracks, so `planned` is never empty here.
        Ok(ids.into_iter().next_back().expect("at least one unit is always planned"))
    }

    async fn resolve_shape(&self, req: &SubmitRequest) -> Result<TargetShape, EngineError> {
        if req.run_without_target {
            return Ok(TargetShape::None);
        }
        self.library
            .resolve_target(&req.target_id)
            .await
            .map_err(library_error)
    }

    /// Non-chunking path: exactly one unit, carrying `[target]` if a track,
    /// the collection itself (no copy) if a collection, a fresh temp
    /// collection of every library track if neither, or an empty target id
    /// if `run_without_target`.
    async fn single_chunk(
        &self,
        req: &SubmitRequest,
        shape: &TargetShape,
    ) -> Result<(Vec<PlannedUnit>, Vec<String>), EngineError> {
        let target_id = match shape {
            TargetShape::None => String::new(),
            TargetShape::Track(track) => track.id.clone(),
            TargetShape::Collection { id, .. } => id.clone(),
            TargetShape::WholeLibrary(tracks) => {
                let track_ids: Vec<String> = tracks.iter().map(|t| t.id.clone()).collect();
                self.library
                    .add_collection(&format!("{}-target", req.action_name), &req.user_id, track_ids, CollectionKind::Temp)
                    .await
                    .map_err(library_error)?
                    .id
            }
        };
        Ok((vec![PlannedUnit { target_id }], Vec::new()))
    }

    /// Chunking path: plan chunk boundaries purely in memory, then
    /// materialize each as a real temp collection. If any creation fails,
    /// every collection already created for this submission is removed
    /// before the error propagates (no partial enqueue).
    async fn plan_and_materialize_chunks(
        &self,
        req: &SubmitRequest,
        shape: &TargetShape,
    ) -> Result<(Vec<PlannedUnit>, Vec<String>), EngineError> {
        let plan = plan_chunks(shape, req.max_track_duration, req.max_chunk_duration, &self.id_gen);

        let mut created = Vec::with_capacity(plan.chunks.len());
        for (i, chunk) in plan.chunks.iter().enumerate() {
            let name = format!("{}-chunk-{i}", req.action_name);
            match self
                .library
                .add_collection(&name, &req.user_id, chunk.track_ids.clone(), CollectionKind::Temp)
                .await
            {
                Ok(info) => created.push(PlannedUnit { target_id: info.id }),
                Err(e) => {
                    for already in &created {
                        let _ = self.library.remove_collection(&already.target_id).await;
                    }
                    return Err(library_error(e));
                }
            }
        }
        Ok((created, plan.skipped))
    }

    fn compose_env(&self, req: &SubmitRequest, use_gpu_queue: bool) -> HashMap<String, String> {
        let mut env = req.env.clone();
        for (k, v) in &self.config.static_env {
            env.insert(k.clone(), v.clone());
        }
        env.insert("USER_ID".to_string(), req.user_id.clone());
        env.insert(
            "PLUGINS".to_string(),
            serde_json::to_string(&req.plugins).unwrap_or_else(|_| "[]".to_string()),
        );
        env.insert("REPLACE_PLUGIN_DATA".to_string(), req.replace_plugin_data.to_string());
        env.insert("USE_GPU".to_string(), use_gpu_queue.to_string());
        env
    }
}

fn target_type_of(shape: &TargetShape, run_without_target: bool) -> TargetType {
    if run_without_target {
        return TargetType::None;
    }
    match shape {
        TargetShape::Track(_) => TargetType::Track,
        TargetShape::Collection { .. } | TargetShape::WholeLibrary(_) => TargetType::Collection,
        TargetShape::None => TargetType::None,
    }
}

fn library_error(e: LibraryError) -> EngineError {
    EngineError::InfrastructureError(e.to_string())
}

fn slugify(name: &str) -> String {
    let slug: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    if slug.is_empty() {
        "action".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
