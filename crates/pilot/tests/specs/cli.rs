// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command-line surface.

use crate::prelude::*;

#[test]
fn help_shows_usage() {
    let out = cli().arg("--help").output().unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("--rank"));
}

#[test]
fn version_shows_version() {
    let out = cli().arg("--version").output().unwrap();
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("0.2"));
}

#[test]
fn invalid_config_exits_two_before_touching_jobs() {
    let launch = Launch::with_jobs(&["4001"]).with_scratch();
    launch.file("pilot.toml", "shell = 42\n");

    launch
        .pilot()
        .exits_with(2)
        .stderr_has("loading configuration");

    assert!(!launch.exists("4001/worker_attributes.json"));
}
