// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Assembles the in-container command vector: `run <script> --user_id …
//! --job_id <slug> --target_id <chunk> [--<k>=<v>…]`.

use adx_core::{encode_params, ParamMap};

/// Build the full command vector for one work unit.
///
/// The three positional identifiers come first in a fixed order, followed
/// by caller-supplied `script_kwargs` in key order via [`encode_params`].
pub fn compose_command(
    script_path: &str,
    user_id: &str,
    job_id: &str,
    target_id: &str,
    params: &ParamMap,
) -> Vec<String> {
    let mut command = vec!["run".to_string(), script_path.to_string()];
    command.push(format!("--user_id={user_id}"));
    command.push(format!("--job_id={job_id}"));
    command.push(format!("--target_id={target_id}"));
    command.extend(encode_params(params));
    command
}

#[cfg(test)]
#[path = "command_encoding_tests.rs"]
mod tests;
