// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `adx`: the operator/caller-facing CLI for `adxd`.

use adx::commands;
use adx_core::decode_params;
use adx_daemon::config::Config;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "adx", about = "Submit and track actions run by adxd")]
struct Cli {
    /// Path to the daemon's Unix socket; defaults to the value in
    /// `~/.config/adx/config.toml` (or `$ADX_CONFIG`).
    #[arg(long, global = true)]
    socket: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check that adxd is reachable.
    Ping,
    /// Submit an action for execution.
    Submit {
        #[arg(long)]
        user: String,
        #[arg(long)]
        image: String,
        #[arg(long)]
        script: String,
        #[arg(long = "plugin")]
        plugins: Vec<String>,
        #[arg(long)]
        action: String,
        #[arg(long, default_value = "")]
        target: String,
        #[arg(long)]
        target_required: bool,
        #[arg(long)]
        gpu: bool,
        #[arg(long)]
        exec_run: bool,
        #[arg(long)]
        run_without_target: bool,
        #[arg(long, default_value_t = 0.0)]
        max_track_duration: f64,
        #[arg(long, default_value_t = 0.0)]
        max_chunk_duration: f64,
        #[arg(long, default_value_t = 0)]
        watchdog_timeout_secs: u64,
        #[arg(long)]
        replace_plugin_data: bool,
        /// Action-specific parameters, `--key=value` or bare `--flag`.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        params: Vec<String>,
    },
    /// Look up one unit's status.
    Status {
        #[arg(long)]
        user: String,
        #[arg(long)]
        unit: String,
    },
    /// List every unit owned by a user.
    AllStatuses {
        #[arg(long)]
        user: String,
    },
    /// Cancel a unit.
    Cancel {
        #[arg(long)]
        user: String,
        #[arg(long)]
        unit: String,
    },
    /// Register a user as active, bringing its CPU worker pool up.
    RegisterUser {
        #[arg(long)]
        user: String,
    },
    /// Deregister a user, asking its CPU workers to stop after their
    /// current unit.
    DeregisterUser {
        #[arg(long)]
        user: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let socket_path = match cli.socket {
        Some(path) => path,
        None => Config::load()?.socket_path,
    };

    match cli.command {
        Command::Ping => commands::ping(&socket_path).await,
        Command::Submit {
            user,
            image,
            script,
            plugins,
            action,
            target,
            target_required,
            gpu,
            exec_run,
            run_without_target,
            max_track_duration,
            max_chunk_duration,
            watchdog_timeout_secs,
            replace_plugin_data,
            params,
        } => {
            let params = decode_params(&params);
            commands::submit(
                &socket_path,
                user,
                image,
                script,
                plugins,
                action,
                target,
                target_required,
                gpu,
                exec_run,
                run_without_target,
                max_track_duration,
                max_chunk_duration,
                watchdog_timeout_secs,
                replace_plugin_data,
                params,
            )
            .await
        }
        Command::Status { user, unit } => commands::status(&socket_path, user, unit).await,
        Command::AllStatuses { user } => commands::all_statuses(&socket_path, user).await,
        Command::Cancel { user, unit } => commands::cancel(&socket_path, user, unit).await,
        Command::RegisterUser { user } => commands::register_user(&socket_path, user).await,
        Command::DeregisterUser { user } => commands::deregister_user(&socket_path, user).await,
    }
}
