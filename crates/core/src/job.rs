// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job identifier, descriptor and state machine.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

crate::define_id! {
    /// Identifier of the job a rank is responsible for.
    ///
    /// Assigned upstream; also names the job's communication point
    /// directory and keys the job catalog and stage-out declaration.
    pub struct JobId;
}

/// Lifecycle of the single job owned by this rank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    #[default]
    Init,
    Running,
    Finished,
    Failed,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Finished | JobState::Failed)
    }
}

crate::simple_display! {
    JobState {
        Init => "init",
        Running => "running",
        Finished => "finished",
        Failed => "failed",
    }
}

/// Errors loading the job catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read job catalog {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed job catalog {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("job {0} is not described in the job catalog")]
    UnknownJob(JobId),
}

/// A declared input file: where it lives on the shared filesystem and,
/// once staged, where the payload reads it from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    pub local_path: PathBuf,
    pub staged_path: Option<PathBuf>,
}

/// A declared output file; `guid` is known upfront for some jobs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputFile {
    #[serde(default)]
    pub guid: Option<String>,
}

/// Catalog entry as written by the upstream job producer.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogEntry {
    #[serde(alias = "transformation")]
    script: String,
    #[serde(default, alias = "jobPars")]
    parameters: String,
    #[serde(default)]
    input_files: IndexMap<String, serde_json::Value>,
    #[serde(default)]
    output_files: IndexMap<String, OutputFile>,
    #[serde(default)]
    log_file: Option<String>,
}

/// JSON object mapping job id to descriptor (`HPCJobs.json`).
#[derive(Debug, Clone, Default)]
pub struct JobCatalog {
    entries: IndexMap<String, CatalogEntry>,
}

impl JobCatalog {
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| CatalogError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        Ok(Self {
            entries: serde_json::from_str(text)?,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build the descriptor for `job_id`, resolving input files against the
    /// communication point.
    pub fn descriptor(
        &self,
        job_id: &JobId,
        comm_point: &Path,
    ) -> Result<JobDescriptor, CatalogError> {
        let entry = self
            .entries
            .get(job_id.as_str())
            .ok_or_else(|| CatalogError::UnknownJob(job_id.clone()))?;

        let input_files = entry
            .input_files
            .keys()
            .map(|name| {
                (
                    name.clone(),
                    InputFile {
                        local_path: comm_point.join(name),
                        staged_path: None,
                    },
                )
            })
            .collect();

        Ok(JobDescriptor {
            job_id: job_id.clone(),
            script: entry.script.clone(),
            parameters: entry.parameters.clone(),
            input_files,
            output_files: entry.output_files.clone(),
            log_file: entry.log_file.clone(),
            state: JobState::Init,
            start_time: None,
            end_time: None,
            exit_code: None,
        })
    }
}

/// The job this rank executes. Mutated in place as the pipeline advances;
/// its fields feed the work report but it is never written out itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDescriptor {
    pub job_id: JobId,
    pub script: String,
    pub parameters: String,
    pub input_files: IndexMap<String, InputFile>,
    pub output_files: IndexMap<String, OutputFile>,
    pub log_file: Option<String>,
    pub state: JobState,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub exit_code: Option<i32>,
}

impl JobDescriptor {
    /// Record where each input will be copied to inside `dir`.
    pub fn stage_inputs_into(&mut self, dir: &Path) {
        for (name, input) in self.input_files.iter_mut() {
            input.staged_path = Some(dir.join(name));
        }
    }

    pub fn mark_running(&mut self, start_time: String) {
        self.state = JobState::Running;
        self.start_time = Some(start_time);
    }

    /// Record payload completion: `finished` on exit code 0, else `failed`.
    pub fn complete(&mut self, exit_code: i32, end_time: String) {
        self.exit_code = Some(exit_code);
        self.end_time = Some(end_time);
        self.state = if exit_code == 0 {
            JobState::Finished
        } else {
            JobState::Failed
        };
    }

    pub fn fail(&mut self) {
        self.state = JobState::Failed;
    }

    pub fn is_log_file(&self, name: &str) -> bool {
        self.log_file.as_deref() == Some(name)
    }

    /// Declared outputs that the payload produces (the log archive excluded).
    pub fn payload_outputs(&self) -> impl Iterator<Item = &str> {
        self.output_files
            .keys()
            .map(String::as_str)
            .filter(|name| !self.is_log_file(name))
    }

    /// Every file expected on disk at stage-out: declared outputs, then the
    /// log archive if it was not already declared among them.
    pub fn stage_out_files(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.output_files.keys().map(String::as_str).collect();
        if let Some(log) = self.log_file.as_deref() {
            if !self.output_files.contains_key(log) {
                names.push(log);
            }
        }
        names
    }

    pub fn output_guid(&self, name: &str) -> Option<&str> {
        self.output_files
            .get(name)
            .and_then(|f| f.guid.as_deref())
    }
}

#[cfg(any(test, feature = "test-support"))]
impl JobDescriptor {
    /// Minimal descriptor for tests.
    pub fn for_test(job_id: &str, script: &str, parameters: &str) -> Self {
        Self {
            job_id: JobId::new(job_id),
            script: script.to_string(),
            parameters: parameters.to_string(),
            input_files: IndexMap::new(),
            output_files: IndexMap::new(),
            log_file: None,
            state: JobState::Init,
            start_time: None,
            end_time: None,
            exit_code: None,
        }
    }

    pub fn with_output(mut self, name: &str, guid: Option<&str>) -> Self {
        self.output_files.insert(
            name.to_string(),
            OutputFile {
                guid: guid.map(str::to_string),
            },
        );
        self
    }

    pub fn with_log_file(mut self, name: &str) -> Self {
        self.log_file = Some(name.to_string());
        self
    }

    pub fn with_input(mut self, name: &str, comm_point: &Path) -> Self {
        self.input_files.insert(
            name.to_string(),
            InputFile {
                local_path: comm_point.join(name),
                staged_path: None,
            },
        );
        self
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
