// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Complete runs that end with a stage-out declaration.

use crate::prelude::*;

#[test]
fn scratch_run_stages_executes_packs_and_declares() {
    let launch = Launch::with_jobs(&["4001", "4002", "4003"]).with_scratch();

    launch
        .pilot()
        .rank(1)
        .passes()
        .stdout_has("rank 1 of 3 runs job 4002")
        .stdout_lacks("DBRelease")
        .stderr_lacks("ERROR");

    let report = launch.report("4002");
    assert_eq!(report["jobStatus"], "finished");
    assert_eq!(report["transExitCode"], 0);
    assert_eq!(report["nEvents"], 25);
    assert_eq!(report["nInputFiles"], 1);
    assert_eq!(report["cpuConsumptionUnit"], "AMD Opteron");
    assert_eq!(report["node"], "nid00042");
    assert_eq!(report["messageLevel"], "DEBUG");
    assert_eq!(
        report["jobMetrics"],
        "coreCount=16 nEvents=25 dbTime=1.5 dbData=2048"
    );
    assert!(report.get("outputFiles").is_none());

    let declared = launch.json("4002/event_status.dump.json");
    similar_asserts::assert_eq!(
        declared,
        json!({"4002": [
            {
                "type": "output",
                "path": launch.path("4002/HITS.pool.root"),
                "fsize": 5,
                "guid": "HITS-GUID"
            },
            {
                "type": "log",
                "path": launch.path("4002/log.job.tgz"),
                "fsize": std::fs::metadata(launch.path("4002/log.job.tgz")).unwrap().len()
            }
        ]})
    );

    assert_eq!(
        std::fs::read_to_string(launch.scratch().join("sqlite200/ALLP200.db")).unwrap(),
        "conditions"
    );
    assert!(launch.scratch().join("tmp").is_dir());
    assert!(!launch.exists("scratch/4002/poolcond"));
    assert_eq!(
        launch.json("4002/jobReport.json")["executor"][0]["logfileReport"],
        json!({})
    );
    assert!(!launch.exists("4001/worker_attributes.json"));
    assert!(!launch.exists("4003/worker_attributes.json"));
}

#[test]
fn rank_comes_from_launcher_environment() {
    let launch = Launch::with_jobs(&["4001", "4002", "4003"]).with_scratch();

    launch.pilot().env("PMI_RANK", "2").passes();

    assert_eq!(launch.report("4003")["jobStatus"], "finished");
    assert!(!launch.exists("4001/worker_attributes.json"));
}

#[test]
fn rank_defaults_to_zero() {
    let launch = Launch::with_jobs(&["4001", "4002"]).with_scratch();

    launch.pilot().passes();

    assert_eq!(launch.report("4001")["jobStatus"], "finished");
}

#[test]
fn numeric_job_ids_and_positional_assignment() {
    let launch = Launch::with_jobs(&["7"]).with_scratch();
    launch.file("ids/batch.json", "[7]");

    launch.pilot().args(["ids/batch.json"]).passes();

    assert_eq!(launch.report("7")["jobStatus"], "finished");
}

#[test]
fn without_scratch_the_job_runs_in_its_comm_point() {
    let launch = Launch::with_jobs(&["4001"]);

    launch.pilot().passes();

    let report = launch.report("4001");
    assert_eq!(report["jobStatus"], "finished");
    assert_eq!(
        report["workdir"],
        launch.path("4001").display().to_string()
    );
    assert!(launch.exists("4001/HPCJobs.json"));
    assert!(launch.exists("4001/log.job.tgz"));
    assert!(!launch.exists("4001/athena.log"));
    assert!(!launch.exists("scratch"));
}

#[test]
fn core_count_override_is_reported() {
    let launch = Launch::with_jobs(&["4001"]).with_scratch();

    launch.pilot().env("ATHENA_PROC_NUMBER", "8").passes();

    let report = launch.report("4001");
    assert_eq!(report["core_count"], 8);
    assert!(report["jobMetrics"]
        .as_str()
        .unwrap()
        .starts_with("coreCount=8 "));
}
