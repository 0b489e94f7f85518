// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use adx_daemon::config::Config;
use adx_daemon::listener::Listener;
use adx_daemon::Daemon;
use adx_storage::InMemoryWorkStore;
use std::sync::Arc;
use tokio::net::UnixListener;

/// Spawns a real daemon bound to a socket under a fresh temp dir. The
/// `TempDir` must be kept alive by the caller for as long as the socket
/// is in use; dropping it removes the directory (and the socket file).
async fn spawn_test_daemon() -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let socket_path = dir.path().join("adxd.sock");

    let config = Config::default();
    let store = Arc::new(InMemoryWorkStore::in_memory());
    let daemon = Arc::new(Daemon::new(&config, store));

    let unix_listener = UnixListener::bind(&socket_path).unwrap();
    tokio::spawn(Listener::new(unix_listener, daemon).run());
    tokio::task::yield_now().await;

    (dir, socket_path)
}

#[tokio::test]
async fn ping_reaches_a_running_daemon() {
    let (_dir, socket_path) = spawn_test_daemon().await;
    ping(&socket_path).await.unwrap();
}

#[tokio::test]
async fn submit_then_status_round_trips_over_the_socket() {
    let (_dir, socket_path) = spawn_test_daemon().await;

    submit(
        &socket_path,
        "user-1".to_string(),
        "nendo/quantize".to_string(),
        "/scripts/run.py".to_string(),
        Vec::new(),
        "quantize".to_string(),
        String::new(),
        false,
        false,
        false,
        true,
        0.0,
        0.0,
        0,
        false,
        ParamMap::new(),
    )
    .await
    .unwrap();

    all_statuses(&socket_path, "user-1".to_string()).await.unwrap();
}

#[tokio::test]
async fn status_for_an_unknown_unit_is_a_client_error() {
    let (_dir, socket_path) = spawn_test_daemon().await;
    let err = status(&socket_path, "user-1".to_string(), "missing".to_string()).await.unwrap_err();
    assert!(err.to_string().contains("not found"));
}
