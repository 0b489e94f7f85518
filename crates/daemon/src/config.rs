// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration: on-disk `config.toml`, falling back to field
//! defaults for anything unset.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("failed to parse {path}: {source}")]
    Parse { path: PathBuf, source: toml::de::Error },
    #[error("no home directory could be determined")]
    NoHomeDir,
}

/// Everything the daemon needs to run: pool sizing, container/bind paths,
/// IPC/state locations, and the external coordinates scripts are given
/// (but the engine itself never dials).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root directory for the journaled Work Store (`snapshot.zst`,
    /// `events.jsonl` live directly under it).
    pub state_dir: PathBuf,
    pub socket_path: PathBuf,
    pub log_path: PathBuf,
    pub log_level: String,

    pub num_user_cpu_workers: usize,
    pub num_gpu_workers: usize,
    pub gpu_enabled: bool,
    pub chunk_actions: bool,
    pub use_gpu: bool,
    pub default_job_timeout_secs: u64,
    pub default_retention_secs: u64,
    pub default_watchdog_timeout_secs: u64,

    pub docker_network_name: String,
    pub host_library_path: PathBuf,
    pub container_library_path: PathBuf,
    pub host_script_path: PathBuf,
    pub container_script_path: PathBuf,
    pub host_model_cache_path: PathBuf,
    pub container_model_cache_path: PathBuf,

    /// Documents the Work Store's intended external coordinates; the
    /// bundled `WorkStore` is the in-memory journaled store, not a real
    /// redis client, so these are carried as config only.
    pub redis_host: String,
    pub redis_port: u16,
    pub redis_db: u32,
    pub redis_user: String,
    pub redis_password: String,

    pub master_lease_ttl_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        let state_dir = default_state_dir();
        Self {
            socket_path: state_dir.join("adxd.sock"),
            log_path: state_dir.join("adxd.log"),
            log_level: "info".to_string(),
            state_dir,

            num_user_cpu_workers: 3,
            num_gpu_workers: 1,
            gpu_enabled: true,
            chunk_actions: true,
            use_gpu: true,
            default_job_timeout_secs: 72 * 3600,
            default_retention_secs: 172_800,
            default_watchdog_timeout_secs: 3600,

            docker_network_name: "nendo-internal".to_string(),
            host_library_path: PathBuf::from("/data/library"),
            container_library_path: PathBuf::from("/library"),
            host_script_path: PathBuf::from("/data/scripts"),
            container_script_path: PathBuf::from("/scripts"),
            host_model_cache_path: PathBuf::from("/data/model-cache"),
            container_model_cache_path: PathBuf::from("/model-cache"),

            redis_host: "localhost".to_string(),
            redis_port: 6379,
            redis_db: 0,
            redis_user: String::new(),
            redis_password: String::new(),

            master_lease_ttl_ms: 30_000,
        }
    }
}

fn default_state_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".local/share/adx")
}

impl Config {
    /// Reads `$ADX_CONFIG` if set, else `~/.config/adx/config.toml`;
    /// missing file is not an error, every field just takes its default.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path()?;
        match std::fs::read_to_string(&path) {
            Ok(contents) => toml::from_str(&contents).map_err(|source| ConfigError::Parse { path, source }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read { path, source }),
        }
    }
}

fn config_path() -> Result<PathBuf, ConfigError> {
    if let Some(p) = std::env::var_os("ADX_CONFIG") {
        return Ok(PathBuf::from(p));
    }
    let home = std::env::var_os("HOME").ok_or(ConfigError::NoHomeDir)?;
    Ok(Path::new(&home).join(".config/adx/config.toml"))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
