// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn cpu_queue_name_is_bare_user_id() {
    let q = QueueName::for_user("alice", QueueFamily::Cpu);
    assert_eq!(q.as_str(), "alice");
    assert_eq!(q.family(), QueueFamily::Cpu);
    assert_eq!(q.user_id(), "alice");
}

#[test]
fn gpu_queue_name_has_suffix() {
    let q = QueueName::for_user("alice", QueueFamily::Gpu);
    assert_eq!(q.as_str(), "alice-gpu");
    assert_eq!(q.family(), QueueFamily::Gpu);
    assert_eq!(q.user_id(), "alice");
}
