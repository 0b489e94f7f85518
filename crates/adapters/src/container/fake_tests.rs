// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use adx_core::ContainerSpec;
use std::collections::HashMap;

fn spec(name: &str) -> ContainerSpec {
    ContainerSpec {
        image: "nendo/quantize".to_string(),
        command: vec!["run.py".to_string()],
        name: name.to_string(),
        env: HashMap::new(),
        binds: Vec::new(),
        gpu: false,
    }
}

#[tokio::test]
async fn create_then_status_reports_running() {
    let runtime = FakeContainerRuntime::new();
    runtime.create_and_start(&spec("job-1")).await.unwrap();
    assert_eq!(runtime.status("job-1").await.unwrap(), ContainerStatus::Running);
    assert!(runtime.is_running("job-1"));
}

#[tokio::test]
async fn finish_transitions_to_exited_with_code() {
    let runtime = FakeContainerRuntime::new();
    runtime.create_and_start(&spec("job-1")).await.unwrap();
    runtime.finish("job-1", 0);
    assert_eq!(runtime.status("job-1").await.unwrap(), ContainerStatus::Exited);
    assert_eq!(runtime.exit_code("job-1").await.unwrap(), Some(0));
}

#[tokio::test]
async fn remove_makes_it_not_found() {
    let runtime = FakeContainerRuntime::new();
    runtime.create_and_start(&spec("job-1")).await.unwrap();
    runtime.remove("job-1").await.unwrap();
    assert_eq!(runtime.status("job-1").await.unwrap(), ContainerStatus::NotFound);
    assert!(runtime.get_by_name("job-1").await.unwrap().is_none());
}

#[tokio::test]
async fn create_error_is_returned_exactly_once() {
    let runtime = FakeContainerRuntime::new();
    runtime.set_create_error(ContainerError::CreateFailed("no space left".into()));
    let err = runtime.create_and_start(&spec("job-1")).await.unwrap_err();
    assert_eq!(err, ContainerError::CreateFailed("no space left".into()));
    // Second attempt succeeds: the injected error was one-shot.
    runtime.create_and_start(&spec("job-1")).await.unwrap();
}

#[tokio::test]
async fn logs_returns_only_the_requested_tail() {
    let runtime = FakeContainerRuntime::new();
    runtime.create_and_start(&spec("job-1")).await.unwrap();
    runtime.set_logs("job-1", "line1\nline2\nline3\nline4");
    let tail = runtime.logs("job-1", 2).await.unwrap();
    assert_eq!(tail, "line3\nline4");
}

#[tokio::test]
async fn exec_against_unknown_container_is_not_found() {
    let runtime = FakeContainerRuntime::new();
    let err = runtime.exec("ghost", &["echo".to_string()]).await.unwrap_err();
    assert_eq!(err, ContainerError::NotFound("ghost".to_string()));
}

#[tokio::test]
async fn calls_are_recorded_in_order() {
    let runtime = FakeContainerRuntime::new();
    runtime.create_and_start(&spec("job-1")).await.unwrap();
    runtime.stop("job-1").await.unwrap();
    runtime.remove("job-1").await.unwrap();

    let calls = runtime.calls();
    assert_eq!(calls.len(), 3);
    assert!(matches!(calls[0], ContainerCall::Create { .. }));
    assert!(matches!(calls[1], ContainerCall::Stop { .. }));
    assert!(matches!(calls[2], ContainerCall::Remove { .. }));
}
