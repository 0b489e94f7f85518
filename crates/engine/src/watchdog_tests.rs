// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use adx_adapters::FakeContainerRuntime;
use adx_core::{ContainerSpec, FakeClock};
use std::collections::HashMap;

fn spec(name: &str) -> ContainerSpec {
    ContainerSpec {
        image: "nendo/test".to_string(),
        command: vec!["run.py".to_string()],
        name: name.to_string(),
        env: HashMap::new(),
        binds: Vec::new(),
        gpu: false,
    }
}

#[tokio::test(start_paused = true)]
async fn exits_cleanly_when_container_finishes_before_timeout() {
    let runtime = FakeContainerRuntime::new();
    runtime.create_and_start(&spec("job-1")).await.unwrap();
    runtime.finish("job-1", 0);
    let clock = FakeClock::new();

    let outcome = wait_for_completion(&runtime, &clock, "job-1", 60).await.unwrap();
    assert_eq!(outcome, WaitOutcome::Exited);
}

#[tokio::test(start_paused = true)]
async fn stops_the_container_when_watchdog_fires() {
    let runtime = FakeContainerRuntime::new();
    runtime.create_and_start(&spec("job-1")).await.unwrap();
    let clock = FakeClock::new();
    // Container never finishes on its own; advance the fake clock past the
    // watchdog bound so the next poll observes a timeout.
    clock.advance(10_000);

    let outcome = wait_for_completion(&runtime, &clock, "job-1", 5).await.unwrap();
    assert_eq!(outcome, WaitOutcome::TimedOut);
    assert!(!runtime.is_running("job-1"));
}

#[tokio::test(start_paused = true)]
async fn zero_timeout_disables_the_watchdog() {
    let runtime = FakeContainerRuntime::new();
    runtime.create_and_start(&spec("job-1")).await.unwrap();
    let clock = FakeClock::new();
    clock.advance(1_000_000);
    runtime.finish("job-1", 0);

    let outcome = wait_for_completion(&runtime, &clock, "job-1", 0).await.unwrap();
    assert_eq!(outcome, WaitOutcome::Exited);
}
