// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn container_error_messages_are_stable() {
    assert_eq!(
        ContainerError::NotFound("job-1".into()).to_string(),
        "container not found: job-1"
    );
    assert_eq!(
        ContainerError::CreateFailed("disk full".into()).to_string(),
        "create failed: disk full"
    );
}
