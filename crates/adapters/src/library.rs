// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Media library adapter: the Dispatcher's only view onto tracks and
//! collections. Everything else about the library (search, embeddings,
//! upload/transcode) lives outside this crate's concern.

#[cfg(any(test, feature = "test-support"))]
mod fake;

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeMediaLibrary, LibraryCall};

use adx_core::{TargetShape, TrackInfo};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Copy)]
pub enum CollectionKind {
    Temp,
    Permanent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollectionInfo {
    pub id: String,
    pub name: String,
    pub kind: CollectionKind,
    pub track_ids: Vec<String>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LibraryError {
    #[error("track not found: {0}")]
    TrackNotFound(String),
    #[error("collection not found: {0}")]
    CollectionNotFound(String),
    #[error("collection creation failed: {0}")]
    CreateFailed(String),
}

/// Narrow view the Dispatcher needs for target resolution and chunk
/// planning. Search, embeddings, upload, and transcoding are out of scope.
#[async_trait]
pub trait MediaLibrary: Send + Sync + 'static {
    async fn get_track(&self, id: &str) -> Result<Option<TrackInfo>, LibraryError>;

    async fn get_collection(&self, id: &str) -> Result<Option<CollectionInfo>, LibraryError>;

    async fn add_collection(
        &self,
        name: &str,
        user_id: &str,
        track_ids: Vec<String>,
        kind: CollectionKind,
    ) -> Result<CollectionInfo, LibraryError>;

    async fn add_track_to_collection(
        &self,
        collection_id: &str,
        track_id: &str,
    ) -> Result<(), LibraryError>;

    async fn remove_collection(&self, id: &str) -> Result<(), LibraryError>;

    /// Resolve a caller-supplied `target_id` into the shape the chunk
    /// planner branches on. An empty or unknown id and a `none` target both
    /// resolve to the whole library in library order.
    async fn resolve_target(&self, target_id: &str) -> Result<TargetShape, LibraryError> {
        if target_id.is_empty() {
            return Ok(TargetShape::WholeLibrary(self.list_tracks().await?));
        }
        if let Some(track) = self.get_track(target_id).await? {
            return Ok(TargetShape::Track(track));
        }
        if let Some(collection) = self.get_collection(target_id).await? {
            let mut tracks = Vec::with_capacity(collection.track_ids.len());
            for track_id in &collection.track_ids {
                if let Some(track) = self.get_track(track_id).await? {
                    tracks.push(track);
                }
            }
            return Ok(TargetShape::Collection {
                id: collection.id,
                tracks,
            });
        }
        Ok(TargetShape::WholeLibrary(self.list_tracks().await?))
    }

    /// All tracks in library order; backs whole-library and empty-target
    /// chunk planning.
    async fn list_tracks(&self) -> Result<Vec<TrackInfo>, LibraryError>;
}

#[cfg(test)]
#[path = "library_tests.rs"]
mod tests;
