// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures: a launch directory laid out the way the batch job
//! leaves it, and a fluent wrapper around the binary.

pub use serde_json::{json, Value};
pub use std::path::{Path, PathBuf};

/// Payload script that produces one output, a log and a summary.
pub const MAKE_OUTPUTS: &str = r#"echo "tmp is $TMPDIR"
echo payload-log > athena.log
echo hits > HITS.pool.root
cat > jobReport.json <<'END'
{"exitCode": 0,
 "resource": {"transform": {"processedEvents": 25, "cpuTimeTotal": 12},
              "machine": {"node": "nid00042", "model_name": "AMD Opteron"},
              "dbTimeTotal": 1.5, "dbDataTotal": 2048},
 "files": {"output": [{"subFiles": [{"name": "HITS.pool.root", "file_guid": "HITS-GUID", "nentries": 25}]}],
           "input": [{"subFiles": [{"name": "EVNT.pool.root"}]}]},
 "executor": [{"logfileReport": {"countSummary": {"ERROR": 0}}}]}
END
"#;

const RANK_VARS: &[&str] = &[
    "RP_RANK",
    "PMI_RANK",
    "PMIX_RANK",
    "OMPI_COMM_WORLD_RANK",
    "SLURM_PROCID",
    "ALPS_APP_PE",
];

pub struct Launch {
    dir: tempfile::TempDir,
}

impl Launch {
    /// Launch directory with a job-id list and a site config, no jobs yet.
    pub fn empty(job_ids: &[&str]) -> Self {
        let launch = Self {
            dir: tempfile::tempdir().unwrap(),
        };
        launch.file("worker_pandaids.json", &json!(job_ids).to_string());
        launch.file("shared/ALLP200.db", "conditions");
        launch.file(
            "pilot.toml",
            &format!(
                r#"shell = "/bin/sh"
setup = ["export TMPDIR={scratch}/tmp"]

[[reference_files]]
source = "{shared}/ALLP200.db"
dest = "sqlite200/ALLP200.db"

[reference_tree]
target = "{shared}/nfs_db_files"
link_name = "poolcond"
"#,
                scratch = launch.scratch().display(),
                shared = launch.path("shared").display(),
            ),
        );
        launch
    }

    /// Launch directory where every job runs the standard payload.
    pub fn with_jobs(job_ids: &[&str]) -> Self {
        let launch = Self::empty(job_ids);
        for id in job_ids {
            launch.job(id, standard_job());
            launch.file(&format!("{id}/make_outputs.sh"), MAKE_OUTPUTS);
        }
        launch
    }

    pub fn with_scratch(self) -> Self {
        std::fs::create_dir_all(self.scratch()).unwrap();
        self
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    pub fn scratch(&self) -> PathBuf {
        self.path("scratch")
    }

    pub fn file(&self, rel: &str, content: &str) {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    /// Communication point for `id` with a one-job catalog.
    pub fn job(&self, id: &str, descriptor: Value) {
        let mut catalog = serde_json::Map::new();
        catalog.insert(id.to_string(), descriptor);
        self.file(&format!("{id}/HPCJobs.json"), &Value::Object(catalog).to_string());
    }

    pub fn exists(&self, rel: &str) -> bool {
        std::fs::symlink_metadata(self.path(rel)).is_ok()
    }

    pub fn json(&self, rel: &str) -> Value {
        let text = std::fs::read_to_string(self.path(rel))
            .unwrap_or_else(|e| panic!("cannot read {rel}: {e}"));
        serde_json::from_str(&text).unwrap()
    }

    pub fn report(&self, id: &str) -> Value {
        self.json(&format!("{id}/worker_attributes.json"))
    }

    /// `rankpilot` run from the launch directory with the site config.
    pub fn pilot(&self) -> Run {
        let mut cmd = cli();
        cmd.current_dir(self.dir.path())
            .args(["--config", "pilot.toml"])
            .env("RP_SCRATCH_DIR", self.scratch())
            .env("RP_PACK_RETRY_DELAY_MS", "0")
            .env("RP_LOG", "debug")
            .env_remove("ATHENA_PROC_NUMBER");
        for var in RANK_VARS {
            cmd.env_remove(var);
        }
        Run { cmd }
    }
}

pub fn standard_job() -> Value {
    json!({
        "transformation": "sh",
        "jobPars": "make_outputs.sh --DBRelease=\"all:current\"",
        "inputFiles": {"make_outputs.sh": {}},
        "outputFiles": {"HITS.pool.root": {}, "log.job.tgz": {}},
        "logFile": "log.job.tgz"
    })
}

/// The binary with a clean environment for rank discovery.
pub fn cli() -> assert_cmd::Command {
    assert_cmd::Command::new(env!("CARGO_BIN_EXE_rankpilot"))
}

pub struct Run {
    cmd: assert_cmd::Command,
}

impl Run {
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        self.cmd.args(args);
        self
    }

    pub fn rank(self, rank: usize) -> Self {
        self.args(["--rank".to_string(), rank.to_string()])
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.cmd.env(key, value);
        self
    }

    pub fn passes(self) -> Output {
        self.exits_with(0)
    }

    pub fn exits_with(mut self, code: i32) -> Output {
        let output = self.cmd.output().unwrap();
        let out = Output {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        assert_eq!(
            output.status.code(),
            Some(code),
            "unexpected exit status\nstdout:\n{}\nstderr:\n{}",
            out.stdout,
            out.stderr
        );
        out
    }
}

pub struct Output {
    pub stdout: String,
    pub stderr: String,
}

impl Output {
    pub fn stdout_has(self, needle: &str) -> Self {
        assert!(
            self.stdout.contains(needle),
            "stdout missing {needle:?}:\n{}",
            self.stdout
        );
        self
    }

    pub fn stdout_lacks(self, needle: &str) -> Self {
        assert!(
            !self.stdout.contains(needle),
            "stdout unexpectedly has {needle:?}:\n{}",
            self.stdout
        );
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        assert!(
            self.stderr.contains(needle),
            "stderr missing {needle:?}:\n{}",
            self.stderr
        );
        self
    }

    pub fn stderr_lacks(self, needle: &str) -> Self {
        assert!(
            !self.stderr.contains(needle),
            "stderr unexpectedly has {needle:?}:\n{}",
            self.stderr
        );
        self
    }
}
