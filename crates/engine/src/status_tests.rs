// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use adx_adapters::{ContainerCall, FakeContainerRuntime};
use adx_core::{ContainerSpec, FakeClock, QueueFamily, QueueName, TargetDescriptor, TargetType};
use adx_storage::test_support::in_memory_store;
use std::collections::HashMap;

fn unit(id: &str, user_id: &str, state: UnitState) -> WorkUnit {
    WorkUnit {
        id: WorkUnitId::new(id.to_string()),
        user_id: user_id.to_string(),
        queue_family: QueueFamily::Cpu,
        spec: ContainerSpec {
            image: "nendo/quantize".to_string(),
            command: vec!["run".to_string()],
            name: id.to_string(),
            env: HashMap::new(),
            binds: Vec::new(),
            gpu: false,
        },
        gpu_requested: false,
        watchdog_timeout_secs: 0,
        job_timeout_secs: 3600,
        retention_secs: 3600,
        exec_run: false,
        replace_plugin_data: false,
        state,
        meta: UnitMeta {
            action_name: "quantize".to_string(),
            parameters: String::new(),
            target: TargetDescriptor {
                target_type: TargetType::Track,
                target_id: "t1".to_string(),
            },
            progress: String::new(),
            errors: Vec::new(),
            result: None,
            exc_info: None,
        },
        history: Vec::new(),
        enqueued_at_ms: 0,
        started_at_ms: None,
        ended_at_ms: None,
    }
}

#[tokio::test]
async fn status_returns_not_found_for_a_unit_owned_by_another_user() {
    let store = in_memory_store();
    store
        .push(QueueName::for_user("user-1", QueueFamily::Cpu), unit("job-1", "user-1", UnitState::Queued))
        .await
        .unwrap();
    let api = StatusApi::new(store, Arc::new(FakeContainerRuntime::new()), FakeClock::new());

    let err = api.status("user-2", &WorkUnitId::new("job-1".to_string())).await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound));
}

#[tokio::test]
async fn status_returns_the_full_projection_for_the_owning_user() {
    let store = in_memory_store();
    store
        .push(QueueName::for_user("user-1", QueueFamily::Cpu), unit("job-1", "user-1", UnitState::Finished))
        .await
        .unwrap();
    store.set_result(&WorkUnitId::new("job-1".to_string()), Some("ok".to_string())).await.unwrap();
    let api = StatusApi::new(store, Arc::new(FakeContainerRuntime::new()), FakeClock::new());

    let status = api.status("user-1", &WorkUnitId::new("job-1".to_string())).await.unwrap();
    assert_eq!(status.state, UnitState::Finished);
    assert_eq!(status.result, Some("ok".to_string()));
}

#[tokio::test]
async fn all_statuses_only_returns_units_owned_by_the_caller() {
    let store = in_memory_store();
    store
        .push(QueueName::for_user("user-1", QueueFamily::Cpu), unit("job-1", "user-1", UnitState::Queued))
        .await
        .unwrap();
    store
        .push(QueueName::for_user("user-2", QueueFamily::Cpu), unit("job-2", "user-2", UnitState::Queued))
        .await
        .unwrap();
    let api = StatusApi::new(store, Arc::new(FakeContainerRuntime::new()), FakeClock::new());

    let statuses = api.all_statuses("user-1").await.unwrap();
    assert_eq!(statuses.len(), 1);
    assert_eq!(statuses[0].id.as_str(), "job-1");
}

#[tokio::test]
async fn cancel_on_a_queued_unit_removes_it_without_touching_any_container() {
    let store = in_memory_store();
    store
        .push(QueueName::for_user("user-1", QueueFamily::Cpu), unit("job-1", "user-1", UnitState::Queued))
        .await
        .unwrap();
    let runtime = Arc::new(FakeContainerRuntime::new());
    let api = StatusApi::new(store.clone(), runtime.clone(), FakeClock::new());

    let ok = api.cancel("user-1", &WorkUnitId::new("job-1".to_string())).await;
    assert!(ok);
    assert!(store.get(&WorkUnitId::new("job-1".to_string())).await.unwrap().is_none());
    assert!(runtime.calls().is_empty());
}

#[tokio::test]
async fn cancel_on_a_started_unit_kills_and_removes_its_container() {
    let store = in_memory_store();
    store
        .push(QueueName::for_user("user-1", QueueFamily::Cpu), unit("job-1", "user-1", UnitState::Started))
        .await
        .unwrap();
    let runtime = Arc::new(FakeContainerRuntime::new());
    runtime
        .create_and_start(&ContainerSpec {
            image: "nendo/quantize".to_string(),
            command: vec!["run".to_string()],
            name: "job-1".to_string(),
            env: HashMap::new(),
            binds: Vec::new(),
            gpu: false,
        })
        .await
        .unwrap();
    let api = StatusApi::new(store, runtime.clone(), FakeClock::new());

    let ok = api.cancel("user-1", &WorkUnitId::new("job-1".to_string())).await;
    assert!(ok);
    let calls = runtime.calls();
    assert!(calls.iter().any(|c| matches!(c, ContainerCall::Kill { name } if name == "job-1")));
    assert!(calls.iter().any(|c| matches!(c, ContainerCall::Remove { name } if name == "job-1")));
    assert!(!calls.iter().any(|c| matches!(c, ContainerCall::Stop { .. })));
    let stored = store.get(&WorkUnitId::new("job-1".to_string())).await.unwrap().unwrap();
    assert_eq!(stored.state, UnitState::Canceled);
}

#[tokio::test]
async fn cancel_on_a_started_unit_with_no_container_is_a_harmless_success() {
    let store = in_memory_store();
    store
        .push(QueueName::for_user("user-1", QueueFamily::Cpu), unit("job-1", "user-1", UnitState::Started))
        .await
        .unwrap();
    let runtime = Arc::new(FakeContainerRuntime::new());
    let api = StatusApi::new(store.clone(), runtime, FakeClock::new());

    let ok = api.cancel("user-1", &WorkUnitId::new("job-1".to_string())).await;
    assert!(ok);
    // Recorded immediately, even though the worker hasn't created the
    // container yet: this is what lets `process_unit`'s re-check abort
    // before ever starting it.
    let stored = store.get(&WorkUnitId::new("job-1".to_string())).await.unwrap().unwrap();
    assert_eq!(stored.state, UnitState::Canceled);
}

#[tokio::test]
async fn cancel_on_an_already_finished_unit_fails_without_overwriting_its_state() {
    let store = in_memory_store();
    store
        .push(QueueName::for_user("user-1", QueueFamily::Cpu), unit("job-1", "user-1", UnitState::Finished))
        .await
        .unwrap();
    let api = StatusApi::new(store.clone(), Arc::new(FakeContainerRuntime::new()), FakeClock::new());

    let ok = api.cancel("user-1", &WorkUnitId::new("job-1".to_string())).await;
    assert!(!ok);
    let stored = store.get(&WorkUnitId::new("job-1".to_string())).await.unwrap().unwrap();
    assert_eq!(stored.state, UnitState::Finished);
}

#[tokio::test]
async fn cancel_refuses_a_unit_owned_by_another_user() {
    let store = in_memory_store();
    store
        .push(QueueName::for_user("user-1", QueueFamily::Cpu), unit("job-1", "user-1", UnitState::Queued))
        .await
        .unwrap();
    let api = StatusApi::new(store.clone(), Arc::new(FakeContainerRuntime::new()), FakeClock::new());

    let ok = api.cancel("user-2", &WorkUnitId::new("job-1".to_string())).await;
    assert!(!ok);
    assert!(store.get(&WorkUnitId::new("job-1".to_string())).await.unwrap().is_some());
}
