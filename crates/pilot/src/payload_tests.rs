// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use rp_core::{FakeClock, JobState};

fn config() -> PilotConfig {
    PilotConfig {
        setup: Vec::new(),
        ..PilotConfig::default()
    }
}

#[test]
fn command_applies_setup_and_fixes() {
    let mut config = config();
    config.setup = vec!["export A=1".to_string(), " ".to_string()];
    let job = JobDescriptor::for_test(
        "4001",
        "Sim_tf.py",
        r#"--inputEVNTFile=EVNT.root --preExec=f(x) --DBRelease="all:current""#,
    );

    let command = build_command(&config, Path::new("/tmp/scratch/4001"), &job);

    assert_eq!(
        command,
        r#"export A=1; Sim_tf.py --inputEVNTFile=/tmp/scratch/4001/EVNT.root "--preExec=f(x)""#
    );
}

#[test]
fn successful_payload_finishes_job() {
    let dir = tempfile::tempdir().unwrap();
    let mut job = JobDescriptor::for_test("4001", "true", "");
    let mut report = WorkReport::new("node01", "DEBUG");

    run(
        &config(),
        dir.path(),
        "echo hello; echo oops >&2",
        &mut job,
        &mut report,
        &FakeClock::new(),
    );

    assert_eq!(job.state, JobState::Finished);
    assert_eq!(job.exit_code, Some(0));
    assert_eq!(report.status(), Some("finished"));
    assert_eq!(report.get("transExitCode"), Some(&serde_json::json!(0)));
    assert_eq!(
        report.get("endTime"),
        Some(&serde_json::json!("2023-11-14 22:13:20"))
    );
    assert!(report.get("cpuConsumptionTime").is_some());
    assert_eq!(
        std::fs::read_to_string(dir.path().join("payload_stdout.txt")).unwrap(),
        "hello\n"
    );
    assert_eq!(
        std::fs::read_to_string(dir.path().join("payload_stderr.txt")).unwrap(),
        "oops\n"
    );
}

#[test]
fn failing_payload_is_recorded_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let mut job = JobDescriptor::for_test("4001", "false", "");
    let mut report = WorkReport::new("node01", "DEBUG");

    run(&config(), dir.path(), "exit 65", &mut job, &mut report, &FakeClock::new());

    assert_eq!(job.state, JobState::Failed);
    assert_eq!(report.status(), Some("failed"));
    assert_eq!(report.get("transExitCode"), Some(&serde_json::json!(65)));
}

#[test]
fn missing_interpreter_records_launch_failure() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config();
    config.shell = "/nonexistent/shell".to_string();
    let mut job = JobDescriptor::for_test("4001", "true", "");
    let mut report = WorkReport::new("node01", "DEBUG");

    run(&config, dir.path(), "true", &mut job, &mut report, &FakeClock::new());

    assert_eq!(job.exit_code, Some(LAUNCH_FAILURE_EXIT_CODE));
    assert_eq!(report.status(), Some("failed"));
    assert!(report.get("exitMsg").is_some());
}

#[test]
fn payload_runs_in_workdir() {
    let dir = tempfile::tempdir().unwrap();
    let mut job = JobDescriptor::for_test("4001", "pwd", "");
    let mut report = WorkReport::new("node01", "DEBUG");

    run(&config(), dir.path(), "touch made_here", &mut job, &mut report, &FakeClock::new());

    assert!(dir.path().join("made_here").exists());
}
