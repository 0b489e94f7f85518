// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::HashMap;

fn unit() -> WorkUnit {
    WorkUnit {
        id: WorkUnitId::new("quantize_ab12cd34_0"),
        user_id: "alice".into(),
        queue_family: QueueFamily::Cpu,
        spec: ContainerSpec {
            image: "nendo/quantize".into(),
            command: vec!["run.py".into()],
            name: "quantize_ab12cd34_0".into(),
            env: HashMap::new(),
            binds: Vec::new(),
            gpu: false,
        },
        gpu_requested: false,
        watchdog_timeout_secs: 0,
        job_timeout_secs: 72 * 3600,
        retention_secs: 172_800,
        exec_run: false,
        replace_plugin_data: false,
        state: UnitState::Queued,
        meta: UnitMeta::default(),
        history: Vec::new(),
        enqueued_at_ms: 1000,
        started_at_ms: None,
        ended_at_ms: None,
    }
}

#[test]
fn no_backward_transitions() {
    assert!(UnitState::Queued.can_transition_to(UnitState::Started));
    assert!(!UnitState::Finished.can_transition_to(UnitState::Started));
    assert!(!UnitState::Started.can_transition_to(UnitState::Queued));
    assert!(!UnitState::Canceled.can_transition_to(UnitState::Started));
}

#[test]
fn terminal_states_are_exactly_the_four_named() {
    for s in [UnitState::Queued, UnitState::Started] {
        assert!(!s.is_terminal());
    }
    for s in [
        UnitState::Finished,
        UnitState::Failed,
        UnitState::Canceled,
        UnitState::Stopped,
    ] {
        assert!(s.is_terminal());
    }
}

#[test]
fn transition_records_history_and_timestamps() {
    let mut u = unit();
    assert!(u.transition(UnitState::Started, 2000));
    assert_eq!(u.started_at_ms, Some(2000));
    assert!(u.transition(UnitState::Finished, 3000));
    assert_eq!(u.ended_at_ms, Some(3000));
    assert_eq!(u.history.len(), 2);
    assert_eq!(u.history[0].state, UnitState::Started);
    assert_eq!(u.history[1].state, UnitState::Finished);
}

#[test]
fn illegal_transition_is_rejected_and_state_unchanged() {
    let mut u = unit();
    assert!(!u.transition(UnitState::Finished, 2000));
    assert_eq!(u.state, UnitState::Queued);
    assert!(u.history.is_empty());
}

#[test]
fn queued_unit_can_be_canceled_directly() {
    let mut u = unit();
    assert!(u.transition(UnitState::Canceled, 2000));
    assert_eq!(u.state, UnitState::Canceled);
}
