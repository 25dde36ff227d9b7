// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fatal exits and failures folded into the job status.

use crate::prelude::*;

#[test]
fn rank_beyond_job_list_exits_one_and_stages_nothing() {
    let launch = Launch::with_jobs(&["4001", "4002", "4003"]).with_scratch();

    launch
        .pilot()
        .rank(5)
        .exits_with(1)
        .stderr_has("no job for rank 5");

    for id in ["4001", "4002", "4003"] {
        assert!(!launch.exists(&format!("{id}/worker_attributes.json")));
    }
    assert_eq!(std::fs::read_dir(launch.scratch()).unwrap().count(), 0);
}

#[test]
fn unreadable_job_list_exits_with_os_error() {
    let launch = Launch::with_jobs(&["4001"]);

    launch
        .pilot()
        .args(["missing.json"])
        .exits_with(2)
        .stderr_has("missing.json");

    assert_eq!(launch.json("worker_attributes.json")["jobStatus"], "failed");
}

#[test]
fn staging_copy_failure_exits_1103() {
    let launch = Launch::with_jobs(&["4001"]).with_scratch();
    std::fs::remove_file(launch.path("shared/ALLP200.db")).unwrap();

    launch.pilot().exits_with(1103).stderr_has("copy to scratch failed");

    let report = launch.report("4001");
    assert_eq!(report["jobStatus"], "failed");
    assert_eq!(report["pilotErrorCode"], 1103);
    assert!(report["exitMsg"].as_str().unwrap().contains("ALLP200.db"));
    assert!(!launch.exists("4001/event_status.dump.json"));
}

#[test]
fn payload_failure_is_recorded_and_pipeline_completes() {
    let launch = Launch::with_jobs(&["4001"]).with_scratch();
    launch.file("4001/make_outputs.sh", "echo partial > athena.log\nexit 3\n");

    launch.pilot().passes();

    let report = launch.report("4001");
    assert_eq!(report["jobStatus"], "failed");
    assert_eq!(report["transExitCode"], 3);
    assert!(report.get("pilotErrorCode").is_none());
    let declared = launch.json("4001/event_status.dump.json");
    assert_eq!(declared["4001"].as_array().unwrap().len(), 1);
    assert_eq!(declared["4001"][0]["type"], "log");
}

#[test]
fn packaging_failure_twice_fails_job_and_skips_stage_out() {
    let launch = Launch::with_jobs(&["4001"]).with_scratch();
    launch.job(
        "4001",
        json!({
            "transformation": "sh",
            "jobPars": "make_outputs.sh",
            "inputFiles": {"make_outputs.sh": {}},
            "outputFiles": {"HITS.pool.root": {}},
            "logFile": "not-created/log.job.tgz"
        }),
    );

    launch
        .pilot()
        .passes()
        .stdout_has("attempt 1/2")
        .stderr_has("after 2 attempts");

    let report = launch.report("4001");
    assert_eq!(report["jobStatus"], "failed");
    assert_eq!(report["pilotErrorCode"], 1164);
    assert!(!launch.exists("4001/event_status.dump.json"));
}

#[test]
fn missing_declared_output_fails_successful_payload() {
    let launch = Launch::with_jobs(&["4001"]).with_scratch();
    let mut job = standard_job();
    job["outputFiles"]["EVNT_Merge.pool.root"] = json!({"guid": "M-GUID"});
    launch.job("4001", job);

    launch.pilot().passes();

    let report = launch.report("4001");
    assert_eq!(report["transExitCode"], 0);
    assert_eq!(report["jobStatus"], "failed");
    let declared = launch.json("4001/event_status.dump.json");
    let names: Vec<&str> = declared["4001"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["path"].as_str().unwrap().rsplit('/').next().unwrap())
        .collect();
    assert_eq!(names, vec!["HITS.pool.root", "log.job.tgz"]);
}

#[test]
fn catalog_without_the_job_exits_one() {
    let launch = Launch::with_jobs(&["4001"]).with_scratch();
    launch.file("4001/HPCJobs.json", r#"{"9999": {"transformation": "true"}}"#);

    launch.pilot().exits_with(1).stderr_has("4001");

    assert_eq!(launch.report("4001")["jobStatus"], "failed");
}
