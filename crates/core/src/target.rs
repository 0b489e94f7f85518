// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Target resolution and chunk planning data types.
//!
//! The original source nests `isinstance(track_or_collection, ...)` checks
//! three levels deep across the track / collection / no-target cases. Here
//! the three cases are resolved once into a [`TargetShape`] variant; every
//! downstream planning function branches on it exactly once and produces
//! the same [`ChunkPlan`] output shape.

use serde::{Deserialize, Serialize};

/// Minimal track metadata the planner needs: identity and duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackInfo {
    pub id: String,
    pub title: String,
    /// Duration in seconds, if known without decoding the signal.
    pub duration_secs: Option<f64>,
}

/// What the caller's `target_id` resolved to in the media library.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetShape {
    /// A single track.
    Track(TrackInfo),
    /// An existing collection and its tracks (library order).
    Collection { id: String, tracks: Vec<TrackInfo> },
    /// No target resolved: either `target_id` was empty/unknown, or the
    /// action targets the whole library.
    WholeLibrary(Vec<TrackInfo>),
    /// No target at all (`run_without_target=true`).
    None,
}

/// `{target_type, target_id}` attached to every work unit for UI surfacing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TargetDescriptor {
    pub target_type: TargetType,
    pub target_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    Track,
    Collection,
    #[default]
    None,
}

impl TargetDescriptor {
    pub fn none() -> Self {
        Self {
            target_type: TargetType::None,
            target_id: String::new(),
        }
    }
}

/// One temporary chunk collection produced by the planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkCollection {
    pub id: String,
    pub track_ids: Vec<String>,
}

/// The planner's output: an ordered list of chunk collections plus any
/// tracks excluded for exceeding `max_track_duration`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkPlan {
    pub chunks: Vec<ChunkCollection>,
    pub skipped: Vec<String>,
}

#[cfg(test)]
#[path = "target_tests.rs"]
mod tests;
