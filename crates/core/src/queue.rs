// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Queue naming and dequeue strategy.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which queue family a work unit belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueFamily {
    Cpu,
    Gpu,
}

impl fmt::Display for QueueFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueFamily::Cpu => write!(f, "cpu"),
            QueueFamily::Gpu => write!(f, "gpu"),
        }
    }
}

/// A queue name, invariantly `<user_id>` for CPU or `<user_id>-gpu` for GPU.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QueueName(pub String);

impl QueueName {
    pub fn for_user(user_id: &str, family: QueueFamily) -> Self {
        match family {
            QueueFamily::Cpu => Self(user_id.to_string()),
            QueueFamily::Gpu => Self(format!("{user_id}-gpu")),
        }
    }

    /// The user id this queue belongs to, stripping the `-gpu` suffix if present.
    pub fn user_id(&self) -> &str {
        self.0.strip_suffix("-gpu").unwrap_or(&self.0)
    }

    pub fn family(&self) -> QueueFamily {
        if self.0.ends_with("-gpu") {
            QueueFamily::Gpu
        } else {
            QueueFamily::Cpu
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueueName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a shared queue set is drained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DequeueStrategy {
    /// Strict arrival order within a single queue.
    Fifo,
    /// One item per queue in rotation, so no single queue can starve the
    /// others (required for GPU queue fairness across users).
    RoundRobin,
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
