// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The work report: the JSON status record polled by the outer system.
//!
//! Attributes are an open map because payload summaries contribute keys
//! (memory statistics) that are not known ahead of time. The per-output
//! file map is kept beside the attributes and never serialized.

use crate::extract::{OutputFileInfo, PayloadReport};
use crate::job::JobState;
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::path::Path;

/// `jobStatus` before the job descriptor has been loaded.
pub const STATUS_STARTING: &str = "starting";

/// Work-report attribute keys.
pub mod keys {
    pub const JOB_STATUS: &str = "jobStatus";
    pub const MESSAGE_LEVEL: &str = "messageLevel";
    pub const CPU_CONVERSION_FACTOR: &str = "cpuConversionFactor";
    pub const NODE: &str = "node";
    pub const WORKDIR: &str = "workdir";
    pub const END_TIME: &str = "endTime";
    pub const CPU_CONSUMPTION_TIME: &str = "cpuConsumptionTime";
    pub const TRANS_EXIT_CODE: &str = "transExitCode";
    pub const PILOT_ERROR_CODE: &str = "pilotErrorCode";
    pub const EXIT_MSG: &str = "exitMsg";
    pub const TIMESTAMP: &str = "timestamp";
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkReport {
    attributes: Map<String, Value>,
    output_files: IndexMap<String, OutputFileInfo>,
}

impl WorkReport {
    /// Defaults published before anything is known about the job.
    pub fn new(node: &str, message_level: &str) -> Self {
        let mut report = Self::default();
        report.set(keys::JOB_STATUS, STATUS_STARTING);
        report.set(keys::MESSAGE_LEVEL, message_level);
        report.set(keys::CPU_CONVERSION_FACTOR, 1.0);
        report.set(keys::NODE, node);
        report
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.attributes.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn set_status(&mut self, state: JobState) {
        self.set(keys::JOB_STATUS, state.to_string());
    }

    pub fn status(&self) -> Option<&str> {
        self.get(keys::JOB_STATUS).and_then(Value::as_str)
    }

    pub fn set_workdir(&mut self, path: &Path) {
        self.set(keys::WORKDIR, path.display().to_string());
    }

    /// Mark the job failed with a wrapper error code and optional message.
    pub fn set_error(&mut self, code: i64, message: Option<String>) {
        self.set_status(JobState::Failed);
        self.set(keys::PILOT_ERROR_CODE, code);
        if let Some(message) = message {
            self.set(keys::EXIT_MSG, message);
        }
    }

    /// Fold extracted payload attributes in, later keys overwriting earlier ones.
    pub fn merge(&mut self, payload: PayloadReport) {
        self.attributes.extend(payload.attributes);
        self.output_files.extend(payload.output_files);
    }

    pub fn output_files(&self) -> &IndexMap<String, OutputFileInfo> {
        &self.output_files
    }

    pub fn output_guid(&self, name: &str) -> Option<&str> {
        self.output_files
            .get(name)
            .and_then(|info| info.guid.as_deref())
    }

    pub fn stamp(&mut self, timestamp: String) {
        self.set(keys::TIMESTAMP, timestamp);
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl Serialize for WorkReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.attributes.serialize(serializer)
    }
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
