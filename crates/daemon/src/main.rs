// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ADX Daemon (adxd)
//!
//! Background process that owns the Work Store, the worker pools, and the
//! Unix-socket IPC surface the `adx` CLI talks to.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use std::sync::Arc;
use std::time::Duration;

use adx_daemon::config::Config;
use adx_daemon::listener::Listener;
use adx_daemon::Daemon;
use adx_storage::{InMemoryWorkStore, WorkStore};
use tokio::net::UnixListener;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("adxd {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("adxd {}", env!("CARGO_PKG_VERSION"));
                println!("ADX daemon - owns the Work Store and worker pools");
                println!();
                println!("USAGE:");
                println!("    adxd");
                println!();
                println!("The daemon is typically started by the `adx` CLI and should not");
                println!("be invoked directly. It listens on a Unix socket for commands.");
                println!();
                println!("OPTIONS:");
                println!("    -h, --help       Print help information");
                println!("    -v, --version    Print version information");
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: adxd [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let config = Config::load()?;
    std::fs::create_dir_all(&config.state_dir)?;
    rotate_log_if_needed(&config.log_path);
    let _log_guard = setup_logging(&config)?;

    info!("starting adxd");

    let store = Arc::new(InMemoryWorkStore::open(config.state_dir.clone())?);

    let holder = format!("{}-{}", hostname(), std::process::id());
    acquire_master_lease(&store, &holder, config.master_lease_ttl_ms).await?;

    let daemon = Arc::new(Daemon::new(&config, store.clone()));
    daemon.init().await?;

    let _ = std::fs::remove_file(&config.socket_path);
    let unix_listener = UnixListener::bind(&config.socket_path)?;
    info!(socket = %config.socket_path.display(), "listening");
    tokio::spawn(Listener::new(unix_listener, daemon.clone()).run());

    spawn_lease_renewal(store.clone(), holder.clone(), config.master_lease_ttl_ms);
    spawn_checkpoint(store.clone());

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    println!("READY");

    tokio::select! {
        _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
        _ = sigint.recv() => info!("received SIGINT, shutting down"),
    }

    if let Err(e) = store.checkpoint().await {
        error!(error = %e, "final checkpoint failed");
    }
    store.release_lease(&holder).await?;
    let _ = std::fs::remove_file(&config.socket_path);
    info!("adxd stopped");
    Ok(())
}

fn hostname() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "adxd".to_string())
}

/// Block until the master lease is acquired, retrying on a short interval.
/// Only one daemon instance may run the worker pools for a given state dir
/// at a time; others park here until the lease frees up.
async fn acquire_master_lease(
    store: &InMemoryWorkStore,
    holder: &str,
    ttl_ms: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        let now_ms = adx_core::Clock::epoch_ms(&adx_core::SystemClock);
        if store.try_acquire_lease(holder, ttl_ms, now_ms).await? {
            info!(holder, "acquired master lease");
            return Ok(());
        }
        tokio::time::sleep(Duration::from_millis(ttl_ms / 4)).await;
    }
}

const LEASE_RENEWAL_INTERVAL_FRACTION: u64 = 3;

fn spawn_lease_renewal(store: Arc<InMemoryWorkStore>, holder: String, ttl_ms: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(ttl_ms / LEASE_RENEWAL_INTERVAL_FRACTION));
        loop {
            interval.tick().await;
            let now_ms = adx_core::Clock::epoch_ms(&adx_core::SystemClock);
            match store.renew_lease(&holder, ttl_ms, now_ms).await {
                Ok(true) => {}
                Ok(false) => error!(holder = %holder, "lost master lease, another instance may now be active"),
                Err(e) => error!(error = %e, "failed to renew master lease"),
            }
        }
    });
}

const CHECKPOINT_INTERVAL: Duration = Duration::from_secs(60);

fn spawn_checkpoint(store: Arc<InMemoryWorkStore>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CHECKPOINT_INTERVAL);
        loop {
            interval.tick().await;
            if let Err(e) = store.checkpoint().await {
                error!(error = %e, "periodic checkpoint failed");
            }
        }
    });
}

const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;
const MAX_ROTATED_LOGS: u32 = 3;

/// Rotate the daemon log file if it exceeds [`MAX_LOG_SIZE`]. Best-effort:
/// rotation failures are silently ignored so the daemon still starts.
fn rotate_log_if_needed(log_path: &std::path::Path) {
    let size = match std::fs::metadata(log_path) {
        Ok(m) => m.len(),
        Err(_) => return,
    };
    if size < MAX_LOG_SIZE {
        return;
    }

    let log_str = log_path.display().to_string();
    for i in (1..MAX_ROTATED_LOGS).rev() {
        let from = format!("{log_str}.{i}");
        let to = format!("{log_str}.{}", i + 1);
        let _ = std::fs::rename(&from, &to);
    }
    let _ = std::fs::rename(log_path, format!("{log_str}.1"));
}

fn setup_logging(config: &Config) -> Result<tracing_appender::non_blocking::WorkerGuard, std::io::Error> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let parent = config.log_path.parent().unwrap_or_else(|| std::path::Path::new("."));
    let file_name = config.log_path.file_name().unwrap_or_else(|| std::ffi::OsStr::new("adxd.log"));
    let file_appender = tracing_appender::rolling::never(parent, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));

    tracing_subscriber::registry().with(filter).with(fmt::layer().with_writer(non_blocking)).init();

    Ok(guard)
}
