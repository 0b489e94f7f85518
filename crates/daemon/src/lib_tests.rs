// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use adx_core::ParamMap;
use protocol::Request;
use std::collections::HashMap;

fn daemon() -> Daemon {
    let config = Config::default();
    let store = Arc::new(InMemoryWorkStore::in_memory());
    Daemon::new(&config, store)
}

fn submit_request(user_id: &str) -> Request {
    Request::Submit {
        user_id: user_id.to_string(),
        image: "nendo/quantize".to_string(),
        script_path: "/scripts/run.py".to_string(),
        plugins: Vec::new(),
        action_name: "quantize".to_string(),
        target_id: String::new(),
        target_required: false,
        gpu: false,
        exec_run: false,
        run_without_target: true,
        max_track_duration: 0.0,
        max_chunk_duration: 0.0,
        env: HashMap::new(),
        watchdog_timeout_secs: 0,
        replace_plugin_data: false,
        params: ParamMap::new(),
    }
}

#[tokio::test]
async fn submit_then_status_round_trips_through_the_handler() {
    let daemon = daemon();

    let unit_id = match daemon.handle(submit_request("user-1")).await {
        Response::Submitted { unit_id } => unit_id,
        other => panic!("unexpected response: {other:?}"),
    };

    let statuses = match daemon.handle(Request::AllStatuses { user_id: "user-1".to_string() }).await {
        Response::AllStatuses(statuses) => statuses,
        other => panic!("unexpected response: {other:?}"),
    };
    assert_eq!(statuses.len(), 1);
    assert_eq!(statuses[0].id, unit_id);
}

#[tokio::test]
async fn cancel_on_a_freshly_queued_unit_succeeds() {
    let daemon = daemon();

    let unit_id = match daemon.handle(submit_request("user-1")).await {
        Response::Submitted { unit_id } => unit_id,
        other => panic!("unexpected response: {other:?}"),
    };

    let ok = match daemon.handle(Request::Cancel { user_id: "user-1".to_string(), unit_id: unit_id.clone() }).await {
        Response::Canceled { ok } => ok,
        other => panic!("unexpected response: {other:?}"),
    };
    assert!(ok);

    let err = match daemon.handle(Request::Status { user_id: "user-1".to_string(), unit_id }).await {
        Response::Error { .. } => true,
        _ => false,
    };
    assert!(err);
}

#[tokio::test]
async fn status_for_an_unknown_unit_reports_an_error_response() {
    let daemon = daemon();
    let resp = daemon
        .handle(Request::Status { user_id: "user-1".to_string(), unit_id: adx_core::WorkUnitId::new("missing".to_string()) })
        .await;
    assert!(matches!(resp, Response::Error { .. }));
}

#[tokio::test]
async fn register_and_deregister_user_both_succeed() {
    let daemon = daemon();
    let resp = daemon.handle(Request::RegisterUser { user_id: "user-1".to_string() }).await;
    assert!(matches!(resp, Response::Registered));
    let resp = daemon.handle(Request::DeregisterUser { user_id: "user-1".to_string() }).await;
    assert!(matches!(resp, Response::Deregistered));
}
