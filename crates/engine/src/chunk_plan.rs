// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Chunk planning: partition a resolved target into duration-bounded
//! temporary collections so one long input cannot monopolize GPU workers.
//!
//! Branches once on [`TargetShape`]; every branch produces the same
//! [`ChunkPlan`] output shape instead of the original's three-deep
//! `isinstance` nesting.

use adx_core::{ChunkCollection, ChunkPlan, IdGen, TargetShape, TrackInfo};

/// A non-positive bound means "no cap".
fn duration_of(track: &TrackInfo) -> f64 {
    track.duration_secs.unwrap_or(0.0)
}

fn exceeds(bound: f64, value: f64) -> bool {
    bound > 0.0 && value > bound
}

/// Plan chunks for a resolved target.
///
/// - A single track becomes one temp collection, or is skipped entirely if
///   it exceeds `max_track_duration`.
/// - A collection or the whole library is packed greedily in library order:
///   a track joins the current chunk while the running sum stays within
///   `max_chunk_duration`; otherwise a new chunk opens. Tracks exceeding
///   `max_track_duration` are excluded and recorded in `skipped` rather than
///   opening a chunk of their own.
/// - Every target produces at least one chunk, even an empty one, the same
///   way the original always materializes a (possibly empty) chunk
///   collection up front: a target with zero usable tracks (empty
///   collection/library, a lone track past `max_track_duration`, or no
///   target at all) still yields exactly one chunk with no tracks in it,
///   rather than an empty plan.
pub fn plan_chunks(
    shape: &TargetShape,
    max_track_duration: f64,
    max_chunk_duration: f64,
    id_gen: &impl IdGen,
) -> ChunkPlan {
    let mut plan = match shape {
        TargetShape::Track(track) => {
            let mut plan = ChunkPlan::default();
            if exceeds(max_track_duration, duration_of(track)) {
                plan.skipped.push(track.title.clone());
            } else {
                plan.chunks.push(ChunkCollection {
                    id: format!("chunk_{}", adx_core::rand8(id_gen)),
                    track_ids: vec![track.id.clone()],
                });
            }
            plan
        }
        TargetShape::Collection { tracks, .. } | TargetShape::WholeLibrary(tracks) => {
            pack_tracks(tracks, max_track_duration, max_chunk_duration, id_gen)
        }
        TargetShape::None => ChunkPlan::default(),
    };
    if plan.chunks.is_empty() {
        plan.chunks.push(ChunkCollection {
            id: format!("chunk_{}", adx_core::rand8(id_gen)),
            track_ids: Vec::new(),
        });
    }
    plan
}

fn pack_tracks(
    tracks: &[TrackInfo],
    max_track_duration: f64,
    max_chunk_duration: f64,
    id_gen: &impl IdGen,
) -> ChunkPlan {
    let mut plan = ChunkPlan::default();
    let mut current = ChunkCollection {
        id: format!("chunk_{}", adx_core::rand8(id_gen)),
        track_ids: Vec::new(),
    };
    let mut current_sum = 0.0;

    for track in tracks {
        let duration = duration_of(track);
        if exceeds(max_track_duration, duration) {
            plan.skipped.push(track.title.clone());
            continue;
        }
        if !current.track_ids.is_empty() && exceeds(max_chunk_duration, current_sum + duration) {
            plan.chunks.push(current);
            current = ChunkCollection {
                id: format!("chunk_{}", adx_core::rand8(id_gen)),
                track_ids: Vec::new(),
            };
            current_sum = 0.0;
        }
        current.track_ids.push(track.id.clone());
        current_sum += duration;
    }
    if !current.track_ids.is_empty() {
        plan.chunks.push(current);
    }
    plan
}

#[cfg(test)]
#[path = "chunk_plan_tests.rs"]
mod tests;
