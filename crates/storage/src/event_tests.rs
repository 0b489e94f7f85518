// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use adx_core::QueueFamily;

#[test]
fn push_event_round_trips_through_json() {
    let unit = adx_core::test_support::work_unit("quantize_ab12cd34_0", "alice", QueueFamily::Cpu);
    let event = WorkStoreEvent::Push {
        queue: QueueName::for_user("alice", QueueFamily::Cpu),
        unit: Box::new(unit),
    };
    let json = serde_json::to_string(&event).unwrap();
    let back: WorkStoreEvent = serde_json::from_str(&json).unwrap();
    match back {
        WorkStoreEvent::Push { queue, unit } => {
            assert_eq!(queue.as_str(), "alice");
            assert_eq!(unit.id.as_str(), "quantize_ab12cd34_0");
        }
        other => panic!("unexpected variant: {other:?}"),
    }
}

#[test]
fn control_signal_serializes_snake_case() {
    assert_eq!(
        serde_json::to_string(&ControlSignal::Stop).unwrap(),
        "\"stop\""
    );
    assert_eq!(
        serde_json::to_string(&ControlSignal::Shutdown).unwrap(),
        "\"shutdown\""
    );
}
