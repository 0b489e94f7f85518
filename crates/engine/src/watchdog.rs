// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run-mode completion polling: wait for a container to exit, stopping it
//! if a watchdog timeout fires first.

use adx_adapters::{ContainerError, ContainerRuntime, ContainerStatus};
use adx_core::Clock;
use std::time::Duration;

/// Poll interval for the run-mode completion loop. Accuracy of a watchdog
/// timeout is therefore "±1 poll interval", not tighter.
pub const WATCHDOG_POLL_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Exited,
    TimedOut,
}

/// Block until `name` exits or `watchdog_timeout_secs` elapses (0 disables
/// the watchdog: wait forever). On timeout, stops the container and returns
/// `TimedOut` without waiting further.
pub async fn wait_for_completion<C, K>(
    runtime: &C,
    clock: &K,
    name: &str,
    watchdog_timeout_secs: u64,
) -> Result<WaitOutcome, ContainerError>
where
    C: ContainerRuntime,
    K: Clock,
{
    let start = clock.now();
    loop {
        tokio::time::sleep(WATCHDOG_POLL_INTERVAL).await;

        if watchdog_timeout_secs > 0 {
            let elapsed = clock.now().saturating_duration_since(start);
            if elapsed > Duration::from_secs(watchdog_timeout_secs) {
                runtime.stop(name).await?;
                return Ok(WaitOutcome::TimedOut);
            }
        }

        if runtime.status(name).await? == ContainerStatus::Exited {
            return Ok(WaitOutcome::Exited);
        }
    }
}

#[cfg(test)]
#[path = "watchdog_tests.rs"]
mod tests;
