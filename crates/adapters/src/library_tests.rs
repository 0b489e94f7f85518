// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use adx_core::TrackInfo;

fn track(id: &str, duration: f64) -> TrackInfo {
    TrackInfo {
        id: id.to_string(),
        title: format!("title-{id}"),
        duration_secs: Some(duration),
    }
}

#[tokio::test]
async fn resolve_target_of_empty_id_is_whole_library() {
    let lib = FakeMediaLibrary::new();
    lib.seed_track(track("t1", 10.0));
    lib.seed_track(track("t2", 20.0));

    let shape = lib.resolve_target("").await.unwrap();
    match shape {
        TargetShape::WholeLibrary(tracks) => {
            assert_eq!(tracks.len(), 2);
            assert_eq!(tracks[0].id, "t1");
        }
        other => panic!("expected WholeLibrary, got {other:?}"),
    }
}

#[tokio::test]
async fn resolve_target_of_known_track_id_is_track_shape() {
    let lib = FakeMediaLibrary::new();
    lib.seed_track(track("t1", 10.0));

    let shape = lib.resolve_target("t1").await.unwrap();
    assert_eq!(shape, TargetShape::Track(track("t1", 10.0)));
}

#[tokio::test]
async fn resolve_target_of_known_collection_id_resolves_its_tracks() {
    let lib = FakeMediaLibrary::new();
    lib.seed_track(track("t1", 10.0));
    lib.seed_track(track("t2", 20.0));
    lib.seed_collection(CollectionInfo {
        id: "coll-1".to_string(),
        name: "mix".to_string(),
        kind: CollectionKind::Permanent,
        track_ids: vec!["t1".to_string(), "t2".to_string()],
    });

    let shape = lib.resolve_target("coll-1").await.unwrap();
    match shape {
        TargetShape::Collection { id, tracks } => {
            assert_eq!(id, "coll-1");
            assert_eq!(tracks.len(), 2);
        }
        other => panic!("expected Collection, got {other:?}"),
    }
}

#[tokio::test]
async fn resolve_target_of_unknown_id_falls_back_to_whole_library() {
    let lib = FakeMediaLibrary::new();
    lib.seed_track(track("t1", 10.0));

    let shape = lib.resolve_target("ghost").await.unwrap();
    assert!(matches!(shape, TargetShape::WholeLibrary(_)));
}

#[tokio::test]
async fn add_collection_failure_leaves_no_collection_behind() {
    let lib = FakeMediaLibrary::new();
    lib.set_add_collection_error(LibraryError::CreateFailed("disk full".to_string()));

    let err = lib
        .add_collection("temp-chunk-0", "user-1", vec!["t1".to_string()], CollectionKind::Temp)
        .await
        .unwrap_err();
    assert_eq!(err, LibraryError::CreateFailed("disk full".to_string()));
    assert!(!lib.collection_exists("coll-1"));
}
