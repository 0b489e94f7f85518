// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use adx_core::{ContainerSpec, VolumeBind};
use std::collections::HashMap;

fn spec(name: &str) -> ContainerSpec {
    ContainerSpec {
        image: "alpine:3.19".to_string(),
        command: vec!["sleep".to_string(), "5".to_string()],
        name: name.to_string(),
        env: HashMap::new(),
        binds: Vec::new(),
        gpu: false,
    }
}

// These exercise the real `docker` binary and are skipped by default;
// run with `cargo test -- --ignored` on a host with a docker daemon.

#[tokio::test]
#[ignore]
async fn create_status_and_remove_round_trip() {
    let runtime = DockerCliRuntime::new();
    let name = "adx-adapters-test-roundtrip";
    let _ = runtime.remove(name).await;

    let handle = runtime.create_and_start(&spec(name)).await.unwrap();
    assert_eq!(handle.name, name);
    assert_eq!(runtime.status(name).await.unwrap(), ContainerStatus::Running);

    runtime.kill(name).await.unwrap();
    runtime.remove(name).await.unwrap();
    assert_eq!(runtime.status(name).await.unwrap(), ContainerStatus::NotFound);
}

#[tokio::test]
#[ignore]
async fn volume_bind_syntax_is_accepted_by_docker() {
    let runtime = DockerCliRuntime::new();
    let name = "adx-adapters-test-binds";
    let _ = runtime.remove(name).await;

    let mut s = spec(name);
    s.binds.push(VolumeBind {
        host_path: "/tmp".to_string(),
        container_path: "/data".to_string(),
        read_only: true,
    });
    let result = runtime.create_and_start(&s).await;
    assert!(result.is_ok());
    runtime.remove(name).await.unwrap();
}

#[tokio::test]
async fn status_of_unknown_container_is_not_found() {
    let runtime = DockerCliRuntime::new();
    // Even without a docker daemon, an unrecognized name/missing binary both
    // surface as NotFound rather than a hard error, since callers treat
    // both the same way (nothing to clean up).
    let status = runtime.status("adx-definitely-absent-container").await;
    assert!(matches!(status, Ok(ContainerStatus::NotFound) | Err(_)));
}
