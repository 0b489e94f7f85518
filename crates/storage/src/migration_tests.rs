// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

#[test]
fn migrate_to_same_version_is_a_no_op() {
    let registry = MigrationRegistry::new();
    let snapshot = json!({"v": 1, "seq": 5});
    let migrated = registry.migrate_to(snapshot.clone(), 1).unwrap();
    assert_eq!(migrated, snapshot);
}

#[test]
fn migrate_to_older_target_than_current_is_rejected() {
    let registry = MigrationRegistry::new();
    let snapshot = json!({"v": 3, "seq": 5});
    let err = registry.migrate_to(snapshot, 1).unwrap_err();
    assert!(matches!(err, MigrationError::TooNew(3, 1)));
}

#[test]
fn missing_version_field_defaults_to_one() {
    let registry = MigrationRegistry::new();
    let snapshot = json!({"seq": 5});
    let migrated = registry.migrate_to(snapshot.clone(), 1).unwrap();
    assert_eq!(migrated, snapshot);
}

#[test]
fn no_registered_path_to_a_future_version_fails() {
    let registry = MigrationRegistry::new();
    let snapshot = json!({"v": 1, "seq": 5});
    let err = registry.migrate_to(snapshot, 2).unwrap_err();
    assert!(matches!(err, MigrationError::NoPath(1, 2)));
}
