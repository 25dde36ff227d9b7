// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pilot configuration: site layout from an optional TOML file, with
//! environment overrides applied on top.

use crate::env;
use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

const RELEASE_AREA: &str = "/ccs/proj/csc108/AtlasReleases/21.0.15";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Fixed file names exchanged with the outer system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileNames {
    pub assignment: String,
    pub catalog: String,
    pub work_report: String,
    pub stage_out: String,
    pub payload_summary: String,
    pub stdout: String,
    pub stderr: String,
}

impl Default for FileNames {
    fn default() -> Self {
        Self {
            assignment: "worker_pandaids.json".to_string(),
            catalog: "HPCJobs.json".to_string(),
            work_report: "worker_attributes.json".to_string(),
            stage_out: "event_status.dump.json".to_string(),
            payload_summary: "jobReport.json".to_string(),
            stdout: "payload_stdout.txt".to_string(),
            stderr: "payload_stderr.txt".to_string(),
        }
    }
}

/// Shared reference-data file copied into the fast local area. `dest` is
/// relative to the scratch root and identical for every rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReferenceFile {
    pub source: PathBuf,
    pub dest: PathBuf,
}

/// Shared reference-data tree exposed inside the job directory via a link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReferenceTree {
    pub target: PathBuf,
    pub link_name: String,
}

/// Command-line fixes applied to the payload parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CommandFixes {
    pub input_flag: String,
    pub stripped_tokens: Vec<String>,
}

impl Default for CommandFixes {
    fn default() -> Self {
        Self {
            input_flag: rp_shell::DEFAULT_INPUT_FLAG.to_string(),
            stripped_tokens: rp_shell::DEFAULT_STRIPPED_TOKENS
                .iter()
                .map(|t| t.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PilotConfig {
    /// Fast local area; staging is skipped when it does not exist.
    pub scratch_dir: PathBuf,
    /// Interpreter for the payload command.
    pub shell: String,
    /// Environment-setup statements prefixed to the payload command.
    pub setup: Vec<String>,
    /// Search-path entries under this prefix are hidden from the payload.
    pub shared_prefix: String,
    pub reference_files: Vec<ReferenceFile>,
    pub reference_tree: Option<ReferenceTree>,
    pub files: FileNames,
    pub command: CommandFixes,
    pub pack_retry: RetryPolicy,
}

impl Default for PilotConfig {
    fn default() -> Self {
        Self {
            scratch_dir: PathBuf::from("/tmp/scratch/"),
            shell: "/bin/bash".to_string(),
            setup: default_setup(),
            shared_prefix: "/lustre/".to_string(),
            reference_files: vec![
                ReferenceFile {
                    source: PathBuf::from(format!(
                        "{RELEASE_AREA}/DBRelease/current/sqlite200/ALLP200.db"
                    )),
                    dest: PathBuf::from("sqlite200/ALLP200.db"),
                },
                ReferenceFile {
                    source: PathBuf::from(format!(
                        "{RELEASE_AREA}/DBRelease/current/geomDB/geomDB_sqlite"
                    )),
                    dest: PathBuf::from("geomDB/geomDB_sqlite"),
                },
            ],
            reference_tree: Some(ReferenceTree {
                target: PathBuf::from(format!("{RELEASE_AREA}/nfs_db_files")),
                link_name: "poolcond".to_string(),
            }),
            files: FileNames::default(),
            command: CommandFixes::default(),
            pack_retry: RetryPolicy::default(),
        }
    }
}

fn default_setup() -> Vec<String> {
    [
        "source /ccs/proj/csc108/athena_grid_env/setup.sh",
        "source $MODULESHOME/init/bash",
        "tmp_dirname=/tmp/scratch",
        "tmp_dirname+=\"/tmp\"",
        "export TEMP=$tmp_dirname",
        "export TMPDIR=$TEMP",
        "export TMP=$TEMP",
        "export LD_LIBRARY_PATH=/ccs/proj/csc108/AtlasReleases/ldpatch:$LD_LIBRARY_PATH",
        "export ATHENA_PROC_NUMBER=16",
        "export G4ATLAS_SKIPFILEPEEK=1",
        "export PANDA_RESOURCE=\"ORNL_Titan_MCORE\"",
        "export ROOT_TTREECACHE_SIZE=1",
        "export RUCIO_APPID=\"simul\"",
        "export RUCIO_ACCOUNT=\"pilot\"",
        "export CORAL_DBLOOKUP_PATH=/ccs/proj/csc108/AtlasReleases/21.0.15/nfs_db_files",
        "export CORAL_AUTH_PATH=$SW_INSTALL_AREA/DBRelease/current/XMLConfig",
        "export DATAPATH=$SW_INSTALL_AREA/DBRelease/current:$DATAPATH",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl PilotConfig {
    /// Load from `path` (or defaults) and apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    fn apply_env(&mut self) {
        if let Some(dir) = env::scratch_dir() {
            self.scratch_dir = dir;
        }
        if let Some(prefix) = env::shared_prefix() {
            self.shared_prefix = prefix;
        }
        if let Some(delay) = env::pack_retry_delay() {
            self.pack_retry.delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
