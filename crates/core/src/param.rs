// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Action parameter values.
//!
//! The original server built a shell command by inspecting Python runtime
//! types (`isinstance(value, bool)`, `isinstance(value, list)`, ...). A
//! statically typed rewrite cannot inspect types at runtime, so parameters
//! are expressed as this tagged variant instead: encoding is total (every
//! variant has exactly one command-line shape) and parsing is its exact
//! inverse modulo the booleans-as-flags convention (a present `--k` flag
//! with no value decodes back to `Bool(true)`; `Bool(false)` never appears
//! on the command line at all, so it cannot round-trip from a parsed
//! command alone).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One action parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamValue {
    Bool(bool),
    String(String),
    Number(f64),
    Id(String),
    List(Vec<String>),
}

impl ParamValue {
    /// Append this value's command-line representation for key `key` to `out`.
    ///
    /// - `Bool(true)` → `--key`; `Bool(false)` → nothing (omitted).
    /// - `String`/`Id` → `--key=value` (quoting is the caller's concern once
    ///   the vector is joined; each element here is already a single token).
    /// - `Number` → `--key=<value>` using the shortest round-tripping form.
    /// - `List` → `--key` followed by each element as its own token.
    pub fn encode(&self, key: &str, out: &mut Vec<String>) {
        match self {
            ParamValue::Bool(true) => out.push(format!("--{key}")),
            ParamValue::Bool(false) => {}
            ParamValue::String(s) => out.push(format!("--{key}={s}")),
            ParamValue::Id(s) => out.push(format!("--{key}={s}")),
            ParamValue::Number(n) => out.push(format!("--{key}={}", format_number(*n))),
            ParamValue::List(items) => {
                out.push(format!("--{key}"));
                out.extend(items.iter().cloned());
            }
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// An ordered parameter map, encoding/decoding as a whole so round-trip
/// tests can compare maps directly.
pub type ParamMap = BTreeMap<String, ParamValue>;

/// Encode a parameter map into a command-line argument vector, in key order.
pub fn encode_params(params: &ParamMap) -> Vec<String> {
    let mut out = Vec::new();
    for (key, value) in params {
        value.encode(key, &mut out);
    }
    out
}

/// Parse a previously encoded argument vector back into a parameter map.
///
/// Booleans-as-flags asymmetry: a bare `--key` with no recognizable value
/// decodes to `Bool(true)`. There is no way to distinguish an omitted
/// `Bool(false)` from a parameter that was never set, so `decode_params`
/// cannot resurrect `Bool(false)` entries — callers that need the full
/// original map should keep it rather than relying on a round trip through
/// the command line.
pub fn decode_params(args: &[String]) -> ParamMap {
    let mut out = ParamMap::new();
    let mut i = 0;
    while i < args.len() {
        let arg = &args[i];
        let Some(rest) = arg.strip_prefix("--") else {
            i += 1;
            continue;
        };
        if let Some((key, value)) = rest.split_once('=') {
            out.insert(key.to_string(), parse_scalar(value));
            i += 1;
            continue;
        }
        // Bare `--key`: either a boolean flag or the head of a list, decided
        // by whether subsequent tokens are themselves flags.
        let key = rest.to_string();
        let mut items = Vec::new();
        let mut j = i + 1;
        while j < args.len() && !args[j].starts_with("--") {
            items.push(args[j].clone());
            j += 1;
        }
        if items.is_empty() {
            out.insert(key, ParamValue::Bool(true));
        } else {
            out.insert(key, ParamValue::List(items));
        }
        i = j;
    }
    out
}

fn parse_scalar(value: &str) -> ParamValue {
    if let Ok(n) = value.parse::<f64>() {
        return ParamValue::Number(n);
    }
    ParamValue::String(value.to_string())
}

#[cfg(test)]
#[path = "param_tests.rs"]
mod tests;
