// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use adx_core::{QueueFamily, QueueName};
use tempfile::tempdir;

fn sample_state() -> WorkStoreState {
    let mut state = WorkStoreState::default();
    state.push(
        QueueName::for_user("alice", QueueFamily::Cpu),
        adx_core::test_support::work_unit("a", "alice", QueueFamily::Cpu),
    );
    state
}

#[test]
fn checkpoint_sync_writes_a_loadable_snapshot() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.zst");
    let checkpointer = Checkpointer::new(path.clone());

    let result = checkpointer.checkpoint_sync(7, &sample_state()).unwrap();
    assert_eq!(result.seq, 7);
    assert!(result.size_bytes > 0);

    let loaded = load_snapshot(&path).unwrap().unwrap();
    assert_eq!(loaded.seq, 7);
    assert_eq!(loaded.state.units.len(), 1);
}

#[test]
fn background_checkpoint_completes_and_is_loadable() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.zst");
    let checkpointer = Checkpointer::new(path.clone());

    let handle = checkpointer.start(3, &sample_state());
    let result = handle.wait().unwrap();
    assert_eq!(result.seq, 3);

    let loaded = load_snapshot(&path).unwrap().unwrap();
    assert_eq!(loaded.seq, 3);
}

#[test]
fn written_file_has_zstd_magic_bytes() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.zst");
    Checkpointer::new(path.clone())
        .checkpoint_sync(1, &sample_state())
        .unwrap();

    let data = std::fs::read(&path).unwrap();
    assert_eq!(&data[0..4], &[0x28, 0xB5, 0x2F, 0xFD]);
}
