// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn not_found_never_leaks_detail() {
    // NotFound must carry no payload, so it cannot be made to describe *why*
    // a unit wasn't found (which queue it's actually on, whose it is, etc).
    assert_eq!(EngineError::NotFound.to_string(), "not found");
}

#[test]
fn display_messages_are_stable() {
    assert_eq!(
        EngineError::InvalidArgument("bad type".into()).to_string(),
        "invalid argument: bad type"
    );
    assert_eq!(
        EngineError::TimedOut("...tail".into()).to_string(),
        "timed out waiting for completion: ...tail"
    );
}
