// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn each_rank_resolves_its_own_position() {
    let assignment = JobAssignment::from_json(r#"["201","202"]"#).unwrap();
    assert_eq!(assignment.len(), 2);
    assert_eq!(assignment.resolve(0).unwrap(), "201");
    assert_eq!(assignment.resolve(1).unwrap(), "202");
}

#[yare::parameterized(
    just_past = { 2 },
    far_past  = { 1000 },
)]
fn rank_beyond_list_resolves_nothing(rank: usize) {
    let assignment = JobAssignment::from_json(r#"["201","202"]"#).unwrap();
    assert!(assignment.resolve(rank).is_none());
}

#[test]
fn integer_ids_are_accepted() {
    let assignment = JobAssignment::from_json("[4001, \"4002\", 4003]").unwrap();
    assert_eq!(assignment.resolve(0).unwrap(), "4001");
    assert_eq!(assignment.resolve(1).unwrap(), "4002");
    assert_eq!(assignment.resolve(2).unwrap(), "4003");
}

#[test]
fn non_array_is_rejected() {
    assert!(JobAssignment::from_json(r#"{"0": "201"}"#).is_err());
}

#[test]
fn missing_file_keeps_os_error_number() {
    let dir = tempfile::tempdir().unwrap();
    let err = JobAssignment::load(&dir.path().join("worker_pandaids.json")).unwrap_err();
    assert_eq!(err.raw_os_error(), Some(2));
}

#[test]
fn malformed_file_has_no_os_error_number() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("worker_pandaids.json");
    std::fs::write(&path, "not json").unwrap();
    let err = JobAssignment::load(&path).unwrap_err();
    assert!(matches!(err, AssignmentError::Json { .. }));
    assert_eq!(err.raw_os_error(), None);
}
