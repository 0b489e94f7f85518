// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Snapshot persistence for crash recovery.
//!
//! Snapshots store the complete materialized state at a point in time,
//! identified by the WAL sequence number. Recovery loads the snapshot and
//! replays WAL entries after that sequence.

use crate::state::WorkStoreState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

pub const CURRENT_SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("compression error: {0}")]
    Compress(String),
}

/// A snapshot of the materialized state at a point in time, zstd-compressed
/// on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub seq: u64,
    pub state: WorkStoreState,
    pub created_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(seq: u64, state: WorkStoreState) -> Self {
        Self {
            version: CURRENT_SNAPSHOT_VERSION,
            seq,
            state,
            created_at: Utc::now(),
        }
    }

    /// Save the snapshot atomically: compress, write to `.tmp`, fsync, rename.
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json_bytes = serde_json::to_vec(self)?;
        let compressed = zstd::encode_all(json_bytes.as_slice(), 3)
            .map_err(|e| SnapshotError::Compress(e.to_string()))?;

        let tmp_path = path.with_extension("tmp");
        {
            let mut file = File::create(&tmp_path)?;
            file.write_all(&compressed)?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, path)?;
        Ok(())
    }

    /// Load a snapshot if it exists.
    ///
    /// Corrupt snapshots are moved to a `.bak` file so the daemon can
    /// recover via full WAL replay instead.
    pub fn load(path: &Path) -> Result<Option<Self>, SnapshotError> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = fs::read(path)?;
        let decoded = match zstd::decode_all(raw.as_slice()) {
            Ok(bytes) => bytes,
            Err(e) => {
                return Self::quarantine_and_restart(path, &e.to_string());
            }
        };

        let value: serde_json::Value = match serde_json::from_slice(&decoded) {
            Ok(v) => v,
            Err(e) => return Self::quarantine_and_restart(path, &e.to_string()),
        };

        let registry = crate::migration::MigrationRegistry::new();
        let migrated = match registry.migrate_to(value, CURRENT_SNAPSHOT_VERSION) {
            Ok(v) => v,
            Err(e) => return Self::quarantine_and_restart(path, &e.to_string()),
        };

        match serde_json::from_value::<Snapshot>(migrated) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(e) => Self::quarantine_and_restart(path, &e.to_string()),
        }
    }

    fn quarantine_and_restart(path: &Path, reason: &str) -> Result<Option<Self>, SnapshotError> {
        let bak_path = rotate_bak_path(path);
        warn!(
            error = reason,
            path = %path.display(),
            bak = %bak_path.display(),
            "corrupt snapshot, moving to .bak and starting fresh",
        );
        fs::rename(path, &bak_path)?;
        Ok(None)
    }
}

const MAX_BAK_FILES: u32 = 3;

/// Pick the next `.bak` / `.bak.N` path, rotating older backups out.
pub(crate) fn rotate_bak_path(path: &Path) -> PathBuf {
    let bak = |n: u32| {
        if n == 1 {
            path.with_extension("bak")
        } else {
            path.with_extension(format!("bak.{n}"))
        }
    };

    let oldest = bak(MAX_BAK_FILES);
    if oldest.exists() {
        let _ = fs::remove_file(&oldest);
    }

    for n in (1..MAX_BAK_FILES).rev() {
        let src = bak(n);
        if src.exists() {
            let _ = fs::rename(&src, bak(n + 1));
        }
    }

    bak(1)
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
