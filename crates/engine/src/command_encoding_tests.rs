// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use adx_core::ParamValue;

#[test]
fn fixed_identifiers_come_before_script_kwargs() {
    let mut params = ParamMap::new();
    params.insert("normalize".to_string(), ParamValue::Bool(true));
    params.insert("gain_db".to_string(), ParamValue::Number(-3.0));

    let command = compose_command(
        "/scripts/quantize.py",
        "user-1",
        "quantize_ab12cd34_0",
        "coll-1",
        &params,
    );

    assert_eq!(
        command,
        vec![
            "run".to_string(),
            "/scripts/quantize.py".to_string(),
            "--user_id=user-1".to_string(),
            "--job_id=quantize_ab12cd34_0".to_string(),
            "--target_id=coll-1".to_string(),
            "--gain_db=-3".to_string(),
            "--normalize".to_string(),
        ]
    );
}

#[test]
fn empty_params_still_carries_the_three_identifiers() {
    let command = compose_command("/scripts/noop.py", "user-1", "job-1", "", &ParamMap::new());
    assert_eq!(
        command,
        vec![
            "run".to_string(),
            "/scripts/noop.py".to_string(),
            "--user_id=user-1".to_string(),
            "--job_id=job-1".to_string(),
            "--target_id=".to_string(),
        ]
    );
}
