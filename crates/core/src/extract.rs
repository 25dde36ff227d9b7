// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Best-effort flattening of the payload's structured summary
//! (`jobReport.json`) into work-report attributes.
//!
//! Nothing here fails: a missing or wrong-typed field simply leaves the
//! corresponding attribute unset.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Core count assumed when the environment does not override it.
pub const DEFAULT_CORE_COUNT: u32 = 16;

/// Follow a `/`-delimited path through nested objects.
///
/// Every segment but the last must name an object; the last may name any
/// value. Returns `None` on the first missing or wrong-typed segment.
pub fn walk<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let (parents, leaf) = match path.rsplit_once('/') {
        Some((parents, leaf)) => (Some(parents), leaf),
        None => (None, path),
    };
    let mut node = root.as_object()?;
    if let Some(parents) = parents {
        for key in parents.split('/') {
            node = node.get(key)?.as_object()?;
        }
    }
    node.get(leaf)
}

/// Copy the value at `path` into `dst[key]`; no-op unless the whole path
/// resolves.
pub fn copy_path(src: &Value, path: &str, dst: &mut Map<String, Value>, key: &str) {
    if let Some(value) = walk(src, path) {
        dst.insert(key.to_string(), value.clone());
    }
}

/// Per-output-file facts reported by the payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputFileInfo {
    pub guid: Option<String>,
    pub nentries: Option<Value>,
    pub size: Option<Value>,
}

/// Attributes extracted from one payload summary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PayloadReport {
    pub attributes: Map<String, Value>,
    pub output_files: IndexMap<String, OutputFileInfo>,
}

impl PayloadReport {
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.output_files.is_empty()
    }
}

const SCALAR_FIELDS: &[(&str, &str)] = &[
    ("resource/transform/processedEvents", "nEvents"),
    ("resource/transform/cpuTimeTotal", "cpuConsumptionTime"),
    ("resource/machine/node", "node"),
    ("resource/machine/model_name", "cpuConsumptionUnit"),
    ("resource/dbTimeTotal", "dbTime"),
    ("resource/dbDataTotal", "dbData"),
    ("exitCode", "transExitCode"),
    ("exitMsg", "exeErrorDiag"),
];

/// Extract work-report attributes from a payload summary.
///
/// `core_override` is the core count forced by the environment, if any;
/// it is recorded as `core_count` and feeds the `jobMetrics` string.
pub fn extract(summary: Option<&Value>, core_override: Option<u32>) -> PayloadReport {
    let Some(summary) = summary.filter(|s| s.as_object().is_some_and(|m| !m.is_empty())) else {
        return PayloadReport::default();
    };

    let mut attributes = Map::new();
    attributes.insert("nEvents".to_string(), Value::from(0));
    if let Some(cores) = core_override {
        attributes.insert("core_count".to_string(), Value::from(cores));
    }
    for (path, key) in SCALAR_FIELDS {
        copy_path(summary, path, &mut attributes, key);
    }

    let output_files = output_subfiles(summary);

    for (key, total) in memory_totals(summary) {
        attributes.insert(key, total.into_value());
    }

    if let Some(count) = input_subfile_count(summary) {
        attributes.insert("nInputFiles".to_string(), Value::from(count));
    }

    let metrics = format!(
        "coreCount={} nEvents={} dbTime={} dbData={}",
        core_override.unwrap_or(DEFAULT_CORE_COUNT),
        metric_text(attributes.get("nEvents")),
        metric_text(attributes.get("dbTime")),
        metric_text(attributes.get("dbData")),
    );
    attributes.insert("jobMetrics".to_string(), Value::String(metrics));

    PayloadReport {
        attributes,
        output_files,
    }
}

fn metric_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// `files/output[*].subFiles[*]` flattened by file name.
fn output_subfiles(summary: &Value) -> IndexMap<String, OutputFileInfo> {
    let mut files = IndexMap::new();
    let Some(groups) = walk(summary, "files/output").and_then(Value::as_array) else {
        return files;
    };
    let subfiles = groups
        .iter()
        .filter_map(|group| group.get("subFiles").and_then(Value::as_array))
        .flatten();
    for subfile in subfiles {
        let Some(name) = subfile.get("name").and_then(Value::as_str) else {
            continue;
        };
        files.insert(
            name.to_string(),
            OutputFileInfo {
                guid: subfile
                    .get("file_guid")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                nentries: subfile.get("nentries").cloned(),
                size: subfile.get("file_size").cloned(),
            },
        );
    }
    files
}

/// Running sum that stays integral until a fractional value shows up.
#[derive(Debug, Clone, Copy)]
enum Total {
    Int(i64),
    Float(f64),
}

impl Total {
    fn add(self, n: &Number) -> Self {
        match (self, n.as_i64()) {
            (Total::Int(acc), Some(v)) => match acc.checked_add(v) {
                Some(sum) => Total::Int(sum),
                None => Total::Float(acc as f64 + v as f64),
            },
            (Total::Int(acc), None) => Total::Float(acc as f64 + n.as_f64().unwrap_or(0.0)),
            (Total::Float(acc), _) => Total::Float(acc + n.as_f64().unwrap_or(0.0)),
        }
    }

    fn into_value(self) -> Value {
        match self {
            Total::Int(v) => Value::from(v),
            Total::Float(v) => Number::from_f64(v).map(Value::Number).unwrap_or(Value::Null),
        }
    }
}

/// `resource/executor/*/memory/{Avg,Max}/*` summed by statistic name.
fn memory_totals(summary: &Value) -> IndexMap<String, Total> {
    let mut totals: IndexMap<String, Total> = IndexMap::new();
    let Some(executors) = walk(summary, "resource/executor").and_then(Value::as_object) else {
        return totals;
    };
    for executor in executors.values() {
        let Some(memory) = executor.get("memory").and_then(Value::as_object) else {
            continue;
        };
        for section in ["Avg", "Max"] {
            let Some(stats) = memory.get(section).and_then(Value::as_object) else {
                continue;
            };
            for (key, value) in stats {
                let Value::Number(n) = value else {
                    continue;
                };
                let total = totals.entry(key.clone()).or_insert(Total::Int(0));
                *total = total.add(n);
            }
        }
    }
    totals
}

/// Number of input subfiles across all `files/input` groups.
fn input_subfile_count(summary: &Value) -> Option<usize> {
    let groups = walk(summary, "files/input")?.as_array()?;
    Some(
        groups
            .iter()
            .filter_map(|group| group.get("subFiles").and_then(Value::as_array))
            .map(Vec::len)
            .sum(),
    )
}

#[cfg(test)]
#[path = "extract_tests.rs"]
mod tests;
