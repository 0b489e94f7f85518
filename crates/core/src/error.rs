// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine-level error kinds shared by the dispatcher, worker runtime, and
//! status/cancellation API.

use thiserror::Error;

/// Errors surfaced across the Action Dispatch & Execution Engine boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Caller passed an unsupported parameter type, or an empty target on a
    /// mandatory-target action.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Target resolution failed (empty/unknown target where one is required).
    #[error("invalid target: {0}")]
    InvalidTarget(String),

    /// Per-user quota exceeded (checked upstream of the engine; surfaced here
    /// only when asked to run on behalf of the caller).
    #[error("storage limit exceeded: {0}")]
    StorageLimitExceeded(String),

    /// The Work Store or Container Runtime was unreachable or refused an
    /// operation.
    #[error("infrastructure error: {0}")]
    InfrastructureError(String),

    /// The script exited non-zero; carries the trailing log tail.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// The watchdog fired before the container exited; carries the last log
    /// tail observed.
    #[error("timed out waiting for completion: {0}")]
    TimedOut(String),

    /// The unit id was not found in any of the caller's registries. Never
    /// leaks whether the id exists under a different owner.
    #[error("not found")]
    NotFound,
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
