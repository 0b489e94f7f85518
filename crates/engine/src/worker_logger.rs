// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only logger for per-worker activity: dequeue, container-create,
//! watchdog-fire, and cleanup events.
//!
//! Writes human-readable timestamped lines to `<log_dir>/worker/<name>.log`.
//! Format: `2026-01-30T08:14:09Z [worker] message`.

use chrono::Utc;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct WorkerLogger {
    log_dir: PathBuf,
}

impl WorkerLogger {
    pub fn new(log_dir: PathBuf) -> Self {
        Self { log_dir }
    }

    fn path_for(&self, worker_name: &str) -> PathBuf {
        self.log_dir.join("worker").join(format!("{worker_name}.log"))
    }

    /// Append a log line for `worker_name`. Failures are logged via
    /// `tracing` but never propagate: a broken log file must not stop a
    /// worker from draining its queue.
    pub fn append(&self, worker_name: &str, message: &str) {
        let path = self.path_for(worker_name);
        if let Err(e) = self.write_line(&path, message) {
            tracing::warn!(worker_name, error = %e, "failed to write worker log");
        }
    }

    fn write_line(&self, path: &Path, message: &str) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{} [worker] {}", Utc::now().format("%Y-%m-%dT%H:%M:%SZ"), message)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "worker_logger_tests.rs"]
mod tests;
