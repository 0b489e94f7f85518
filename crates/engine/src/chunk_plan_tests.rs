// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use adx_core::{SequentialIdGen, TrackInfo};
use yare::parameterized;

fn track(id: &str, duration: f64) -> TrackInfo {
    TrackInfo {
        id: id.to_string(),
        title: format!("title-{id}"),
        duration_secs: Some(duration),
    }
}

#[test]
fn single_track_under_cap_becomes_one_chunk() {
    let shape = TargetShape::Track(track("t1", 100.0));
    let plan = plan_chunks(&shape, 200.0, 0.0, &SequentialIdGen::new("x"));
    assert_eq!(plan.chunks.len(), 1);
    assert_eq!(plan.chunks[0].track_ids, vec!["t1".to_string()]);
    assert!(plan.skipped.is_empty());
}

#[test]
fn single_track_over_cap_is_skipped_not_chunked() {
    let shape = TargetShape::Track(track("t1", 500.0));
    let plan = plan_chunks(&shape, 200.0, 0.0, &SequentialIdGen::new("x"));
    // Skipped rather than chunked, but a plan always materializes at least
    // one (here empty) chunk so callers never have to special-case zero.
    assert_eq!(plan.chunks.len(), 1);
    assert!(plan.chunks[0].track_ids.is_empty());
    assert_eq!(plan.skipped, vec!["title-t1".to_string()]);
}

#[test]
fn no_target_still_produces_one_empty_chunk() {
    let plan = plan_chunks(&TargetShape::None, 0.0, 0.0, &SequentialIdGen::new("x"));
    assert_eq!(plan.chunks.len(), 1);
    assert!(plan.chunks[0].track_ids.is_empty());
    assert!(plan.skipped.is_empty());
}

#[test]
fn whole_library_with_every_track_over_cap_still_produces_one_empty_chunk() {
    let tracks = vec![track("t1", 500.0), track("t2", 600.0)];
    let shape = TargetShape::WholeLibrary(tracks);
    let plan = plan_chunks(&shape, 200.0, 100.0, &SequentialIdGen::new("x"));
    assert_eq!(plan.chunks.len(), 1);
    assert!(plan.chunks[0].track_ids.is_empty());
    assert_eq!(plan.skipped, vec!["title-t1".to_string(), "title-t2".to_string()]);
}

#[parameterized(
    no_caps = { vec![100.0, 100.0, 100.0], 0.0, 0.0, vec![3], Vec::<usize>::new() },
    packs_greedily_under_chunk_cap = { vec![40.0, 40.0, 40.0], 0.0, 100.0, vec![2, 1], Vec::new() },
    opens_new_chunk_on_overflow = { vec![60.0, 60.0], 0.0, 100.0, vec![1, 1], Vec::new() },
    skips_over_long_tracks_inline = { vec![50.0, 500.0, 50.0], 200.0, 1000.0, vec![2], vec![1] },
)]
fn pack_tracks_cases(
    durations: Vec<f64>,
    max_track: f64,
    max_chunk: f64,
    expected_chunk_sizes: Vec<usize>,
    expected_skipped_indices: Vec<usize>,
) {
    let tracks: Vec<TrackInfo> = durations
        .iter()
        .enumerate()
        .map(|(i, d)| track(&format!("t{i}"), *d))
        .collect();
    let shape = TargetShape::WholeLibrary(tracks.clone());
    let plan = plan_chunks(&shape, max_track, max_chunk, &SequentialIdGen::new("x"));

    let sizes: Vec<usize> = plan.chunks.iter().map(|c| c.track_ids.len()).collect();
    assert_eq!(sizes, expected_chunk_sizes);

    let expected_skipped: Vec<String> = expected_skipped_indices
        .iter()
        .map(|i| tracks[*i].title.clone())
        .collect();
    assert_eq!(plan.skipped, expected_skipped);
}

#[test]
fn every_eligible_track_appears_in_exactly_one_chunk() {
    let tracks: Vec<TrackInfo> = (0..10).map(|i| track(&format!("t{i}"), 30.0)).collect();
    let shape = TargetShape::Collection {
        id: "coll-1".to_string(),
        tracks: tracks.clone(),
    };
    let plan = plan_chunks(&shape, 0.0, 100.0, &SequentialIdGen::new("x"));

    let mut seen: Vec<&str> = plan
        .chunks
        .iter()
        .flat_map(|c| c.track_ids.iter().map(|s| s.as_str()))
        .collect();
    seen.sort();
    let mut expected: Vec<&str> = tracks.iter().map(|t| t.id.as_str()).collect();
    expected.sort();
    assert_eq!(seen, expected);
}
