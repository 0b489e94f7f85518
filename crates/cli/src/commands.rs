// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command handlers: translate parsed CLI args into one IPC call and print
//! the result.

use crate::client;
use adx_core::{ParamMap, WorkUnitId};
use adx_daemon::protocol::{Request, Response};
use adx_engine::UnitStatus;
use anyhow::{bail, Result};
use std::collections::HashMap;
use std::path::Path;

#[allow(clippy::too_many_arguments)]
pub async fn submit(
    socket_path: &Path,
    user_id: String,
    image: String,
    script_path: String,
    plugins: Vec<String>,
    action_name: String,
    target_id: String,
    target_required: bool,
    gpu: bool,
    exec_run: bool,
    run_without_target: bool,
    max_track_duration: f64,
    max_chunk_duration: f64,
    watchdog_timeout_secs: u64,
    replace_plugin_data: bool,
    params: ParamMap,
) -> Result<()> {
    let request = Request::Submit {
        user_id,
        image,
        script_path,
        plugins,
        action_name,
        target_id,
        target_required,
        gpu,
        exec_run,
        run_without_target,
        max_track_duration,
        max_chunk_duration,
        env: HashMap::new(),
        watchdog_timeout_secs,
        replace_plugin_data,
        params,
    };
    match client::call(socket_path, request).await? {
        Response::Submitted { unit_id } => {
            println!("{}", unit_id.as_str());
            Ok(())
        }
        other => bail!("unexpected response: {other:?}"),
    }
}

pub async fn status(socket_path: &Path, user_id: String, unit_id: String) -> Result<()> {
    let request = Request::Status { user_id, unit_id: WorkUnitId::new(unit_id) };
    match client::call(socket_path, request).await? {
        Response::Status(status) => {
            print_status(&status);
            Ok(())
        }
        other => bail!("unexpected response: {other:?}"),
    }
}

pub async fn all_statuses(socket_path: &Path, user_id: String) -> Result<()> {
    let request = Request::AllStatuses { user_id };
    match client::call(socket_path, request).await? {
        Response::AllStatuses(statuses) => {
            for status in &statuses {
                print_status(status);
            }
            Ok(())
        }
        other => bail!("unexpected response: {other:?}"),
    }
}

pub async fn cancel(socket_path: &Path, user_id: String, unit_id: String) -> Result<()> {
    let request = Request::Cancel { user_id, unit_id: WorkUnitId::new(unit_id) };
    match client::call(socket_path, request).await? {
        Response::Canceled { ok } => {
            println!("{ok}");
            Ok(())
        }
        other => bail!("unexpected response: {other:?}"),
    }
}

pub async fn register_user(socket_path: &Path, user_id: String) -> Result<()> {
    let request = Request::RegisterUser { user_id };
    match client::call(socket_path, request).await? {
        Response::Registered => Ok(()),
        other => bail!("unexpected response: {other:?}"),
    }
}

pub async fn deregister_user(socket_path: &Path, user_id: String) -> Result<()> {
    let request = Request::DeregisterUser { user_id };
    match client::call(socket_path, request).await? {
        Response::Deregistered => Ok(()),
        other => bail!("unexpected response: {other:?}"),
    }
}

pub async fn ping(socket_path: &Path) -> Result<()> {
    match client::call(socket_path, Request::Ping).await? {
        Response::Pong { version } => {
            println!("adxd {version}");
            Ok(())
        }
        other => bail!("unexpected response: {other:?}"),
    }
}

fn print_status(status: &UnitStatus) {
    println!(
        "{}\t{:?}\t{}",
        status.id.as_str(),
        status.state,
        status.result.as_deref().unwrap_or("-")
    );
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
