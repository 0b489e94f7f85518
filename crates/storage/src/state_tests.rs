// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use adx_core::QueueFamily;

fn unit(id: &str, user: &str, family: QueueFamily) -> WorkUnit {
    adx_core::test_support::work_unit(id, user, family)
}

#[test]
fn push_then_pop_fifo_preserves_arrival_order() {
    let mut state = WorkStoreState::default();
    let q = QueueName::for_user("alice", QueueFamily::Cpu);
    state.push(q.clone(), unit("a", "alice", QueueFamily::Cpu));
    state.push(q.clone(), unit("b", "alice", QueueFamily::Cpu));

    let first = state.pop_fifo(&q).unwrap();
    let second = state.pop_fifo(&q).unwrap();
    assert_eq!(first.id.as_str(), "a");
    assert_eq!(second.id.as_str(), "b");
    assert!(state.pop_fifo(&q).is_none());
}

#[test]
fn round_robin_rotates_across_user_queues_without_starvation() {
    let mut state = WorkStoreState::default();
    for user in ["alice", "bob", "carol"] {
        let q = QueueName::for_user(user, QueueFamily::Gpu);
        state.push(q, unit(&format!("{user}-job"), user, QueueFamily::Gpu));
    }
    // alice enqueues a second job; round robin must still give bob and carol
    // their turn before alice gets a second pick.
    state.push(
        QueueName::for_user("alice", QueueFamily::Gpu),
        unit("alice-job-2", "alice", QueueFamily::Gpu),
    );

    let mut order = Vec::new();
    while let Some((_, u)) = state.pop_round_robin(QueueFamily::Gpu) {
        order.push(u.id.as_str().to_string());
    }
    assert_eq!(order, vec!["alice-job", "bob-job", "carol-job", "alice-job-2"]);
}

#[test]
fn round_robin_skips_empty_queues_without_getting_stuck() {
    let mut state = WorkStoreState::default();
    let alice = QueueName::for_user("alice", QueueFamily::Gpu);
    let bob = QueueName::for_user("bob", QueueFamily::Gpu);
    state.push(alice.clone(), unit("a1", "alice", QueueFamily::Gpu));
    state.push(bob.clone(), unit("b1", "bob", QueueFamily::Gpu));

    let (q, _) = state.pop_round_robin(QueueFamily::Gpu).unwrap();
    assert_eq!(q, alice);
    let (q, _) = state.pop_round_robin(QueueFamily::Gpu).unwrap();
    assert_eq!(q, bob);
    assert!(state.pop_round_robin(QueueFamily::Gpu).is_none());
}

#[test]
fn remove_drops_unit_from_every_queue_it_might_be_in() {
    let mut state = WorkStoreState::default();
    let q = QueueName::for_user("alice", QueueFamily::Cpu);
    let id = WorkUnitId::new("a");
    state.push(q.clone(), unit("a", "alice", QueueFamily::Cpu));
    state.remove(&id);
    assert!(state.units.get(&id).is_none());
    assert!(state.pop_fifo(&q).is_none());
}

#[test]
fn list_by_state_reflects_transitions() {
    let mut state = WorkStoreState::default();
    let q = QueueName::for_user("alice", QueueFamily::Cpu);
    state.push(q, unit("a", "alice", QueueFamily::Cpu));
    let id = WorkUnitId::new("a");

    assert_eq!(state.list_by_state(UnitState::Queued).len(), 1);
    assert!(state.transition(&id, UnitState::Started, 100));
    assert_eq!(state.list_by_state(UnitState::Queued).len(), 0);
    assert_eq!(state.list_by_state(UnitState::Started).len(), 1);
}

#[test]
fn lease_expiry_is_time_relative_not_sticky() {
    let lease = Lease {
        holder: "host-a".into(),
        expires_at_ms: 1_000,
    };
    assert!(!lease.is_expired(999));
    assert!(lease.is_expired(1_000));
    assert!(lease.is_expired(2_000));
}
