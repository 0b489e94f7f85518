// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory media library for deterministic testing.

use super::{CollectionInfo, CollectionKind, LibraryError, MediaLibrary};
use adx_core::TrackInfo;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub enum LibraryCall {
    GetTrack { id: String },
    GetCollection { id: String },
    AddCollection { name: String, user_id: String },
    AddTrackToCollection { collection_id: String, track_id: String },
    RemoveCollection { id: String },
}

struct FakeState {
    tracks: HashMap<String, TrackInfo>,
    track_order: Vec<String>,
    collections: HashMap<String, CollectionInfo>,
    calls: Vec<LibraryCall>,
    add_collection_error: Option<LibraryError>,
}

/// Holds tracks and collections entirely in memory, with library order
/// tracked separately from the map so `list_tracks` is deterministic.
#[derive(Clone)]
pub struct FakeMediaLibrary {
    inner: Arc<Mutex<FakeState>>,
    next_collection_id: Arc<AtomicU64>,
}

impl Default for FakeMediaLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeMediaLibrary {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeState {
                tracks: HashMap::new(),
                track_order: Vec::new(),
                collections: HashMap::new(),
                calls: Vec::new(),
                add_collection_error: None,
            })),
            next_collection_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn seed_track(&self, track: TrackInfo) {
        let mut inner = self.inner.lock();
        if !inner.tracks.contains_key(&track.id) {
            inner.track_order.push(track.id.clone());
        }
        inner.tracks.insert(track.id.clone(), track);
    }

    pub fn seed_collection(&self, collection: CollectionInfo) {
        self.inner
            .lock()
            .collections
            .insert(collection.id.clone(), collection);
    }

    pub fn calls(&self) -> Vec<LibraryCall> {
        self.inner.lock().calls.clone()
    }

    pub fn set_add_collection_error(&self, error: LibraryError) {
        self.inner.lock().add_collection_error = Some(error);
    }

    pub fn collection_exists(&self, id: &str) -> bool {
        self.inner.lock().collections.contains_key(id)
    }
}

#[async_trait]
impl MediaLibrary for FakeMediaLibrary {
    async fn get_track(&self, id: &str) -> Result<Option<TrackInfo>, LibraryError> {
        let mut inner = self.inner.lock();
        inner.calls.push(LibraryCall::GetTrack { id: id.to_string() });
        Ok(inner.tracks.get(id).cloned())
    }

    async fn get_collection(&self, id: &str) -> Result<Option<CollectionInfo>, LibraryError> {
        let mut inner = self.inner.lock();
        inner
            .calls
            .push(LibraryCall::GetCollection { id: id.to_string() });
        Ok(inner.collections.get(id).cloned())
    }

    async fn add_collection(
        &self,
        name: &str,
        user_id: &str,
        track_ids: Vec<String>,
        kind: CollectionKind,
    ) -> Result<CollectionInfo, LibraryError> {
        let mut inner = self.inner.lock();
        inner.calls.push(LibraryCall::AddCollection {
            name: name.to_string(),
            user_id: user_id.to_string(),
        });
        if let Some(error) = inner.add_collection_error.take() {
            return Err(error);
        }
        let id = format!(
            "coll-{}",
            self.next_collection_id.fetch_add(1, Ordering::Relaxed)
        );
        let info = CollectionInfo {
            id: id.clone(),
            name: name.to_string(),
            kind,
            track_ids,
        };
        inner.collections.insert(id, info.clone());
        Ok(info)
    }

    async fn add_track_to_collection(
        &self,
        collection_id: &str,
        track_id: &str,
    ) -> Result<(), LibraryError> {
        let mut inner = self.inner.lock();
        inner.calls.push(LibraryCall::AddTrackToCollection {
            collection_id: collection_id.to_string(),
            track_id: track_id.to_string(),
        });
        match inner.collections.get_mut(collection_id) {
            Some(collection) => {
                collection.track_ids.push(track_id.to_string());
                Ok(())
            }
            None => Err(LibraryError::CollectionNotFound(collection_id.to_string())),
        }
    }

    async fn remove_collection(&self, id: &str) -> Result<(), LibraryError> {
        let mut inner = self.inner.lock();
        inner.calls.push(LibraryCall::RemoveCollection { id: id.to_string() });
        inner
            .collections
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| LibraryError::CollectionNotFound(id.to_string()))
    }

    async fn list_tracks(&self) -> Result<Vec<TrackInfo>, LibraryError> {
        let inner = self.inner.lock();
        Ok(inner
            .track_order
            .iter()
            .filter_map(|id| inner.tracks.get(id).cloned())
            .collect())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
