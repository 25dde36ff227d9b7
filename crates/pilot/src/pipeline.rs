// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-rank pipeline: bootstrap, staging, payload, report extraction,
//! cleanup, log packaging and stage-out declaration, strictly in order.

use crate::bootstrap::{Bootstrap, BootstrapError};
use crate::config::PilotConfig;
use crate::exit::{PipelineExit, PACKAGING_ERROR_CODE, STAGING_ERROR_CODE};
use crate::publish::publish;
use crate::retry::with_retry;
use crate::staging::{self, Workspace};
use crate::{cleanup, env, packager, payload, stageout, summary};
use rp_core::{extract, keys, utc_timestamp, Clock, JobDescriptor, JobState, WorkReport};
use std::path::{Path, PathBuf};

pub struct Pipeline<C: Clock> {
    config: PilotConfig,
    clock: C,
    rank: usize,
    launch_dir: PathBuf,
    assignment: PathBuf,
    node: String,
    message_level: String,
}

impl<C: Clock> Pipeline<C> {
    pub fn new(config: PilotConfig, clock: C, rank: usize, launch_dir: impl Into<PathBuf>) -> Self {
        let assignment = PathBuf::from(&config.files.assignment);
        Self {
            config,
            clock,
            rank,
            launch_dir: launch_dir.into(),
            assignment,
            node: env::hostname(),
            message_level: "DEBUG".to_string(),
        }
    }

    /// Job-id list to read instead of the configured one.
    pub fn assignment(mut self, path: impl Into<PathBuf>) -> Self {
        self.assignment = path.into();
        self
    }

    pub fn node(mut self, node: impl Into<String>) -> Self {
        self.node = node.into();
        self
    }

    pub fn message_level(mut self, level: impl Into<String>) -> Self {
        self.message_level = level.into();
        self
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Run to completion. The returned exit still has to be finished, which
    /// publishes the final report.
    pub fn run(&self) -> PipelineExit {
        match self.run_inner() {
            Ok(exit) | Err(exit) => exit,
        }
    }

    fn run_inner(&self) -> Result<PipelineExit, PipelineExit> {
        let files = &self.config.files;
        let mut report = WorkReport::new(&self.node, &self.message_level);

        let boot = Bootstrap::resolve(&self.launch_dir, &self.assignment, self.rank)
            .map_err(|e| self.bootstrap_failed(e, report.clone()))?;
        let report_path = boot.comm_file(&files.work_report);
        report.set_workdir(&boot.comm_point);
        self.checkpoint(&mut report, &report_path);

        let mut job = match boot.load_job(&files.catalog) {
            Ok(job) => job,
            Err(e) => {
                tracing::error!("{}", e);
                report.set_status(JobState::Failed);
                report.set(keys::EXIT_MSG, e.to_string());
                return Err(PipelineExit::fatal(e.exit_code(), report, report_path));
            }
        };

        let mut workspace = match staging::prepare(&self.config, &boot.comm_point, &mut job) {
            Ok(workspace) => workspace,
            Err(e) => {
                tracing::error!("copy to scratch failed, execution terminated: {}", e);
                report.set_error(i64::from(STAGING_ERROR_CODE), Some(e.to_string()));
                return Err(PipelineExit::fatal(STAGING_ERROR_CODE, report, report_path));
            }
        };
        report.set_workdir(workspace.workdir());

        let command = payload::build_command(&self.config, workspace.workdir(), &job);
        job.mark_running(utc_timestamp(&self.clock.utc_now()));
        report.set_status(job.state);
        self.checkpoint(&mut report, &report_path);

        payload::run(
            &self.config,
            workspace.workdir(),
            &command,
            &mut job,
            &mut report,
            &self.clock,
        );
        self.checkpoint(&mut report, &report_path);

        self.collect_summary(&workspace, &boot, &mut report)
            .map_err(|report| PipelineExit::fatal(STAGING_ERROR_CODE, report, report_path.clone()))?;

        workspace.release_reference_link();

        if !self.pack(&workspace, &mut job) {
            report.set_error(i64::from(PACKAGING_ERROR_CODE), None);
            return Err(PipelineExit::ok(report, report_path));
        }

        stageout::copy_back(&workspace, &job);
        let declaration = stageout::declare(&mut job, &report, &boot.comm_point);
        if let Err(e) = stageout::write_declaration(&declaration, &boot.comm_file(&files.stage_out)) {
            tracing::error!("{}", e);
        }

        report.set_status(job.state);
        tracing::info!("job {} done: {}", job.job_id, job.state);
        Ok(PipelineExit::ok(report, report_path))
    }

    fn bootstrap_failed(&self, e: BootstrapError, mut report: WorkReport) -> PipelineExit {
        tracing::error!("{}", e);
        match e {
            BootstrapError::Assignment(_) => {
                report.set_status(JobState::Failed);
                let path = self.launch_dir.join(&self.config.files.work_report);
                PipelineExit::fatal(e.exit_code(), report, path)
            }
            _ => PipelineExit::bare(e.exit_code()),
        }
    }

    /// Merge the payload summary into `report` and hand a shrunk copy to the
    /// communication point. A failed copy gives back the report to publish.
    fn collect_summary(
        &self,
        workspace: &Workspace,
        boot: &Bootstrap,
        report: &mut WorkReport,
    ) -> Result<(), WorkReport> {
        let name = &self.config.files.payload_summary;
        let src = workspace.workdir().join(name);
        if !src.exists() {
            tracing::info!("no payload summary in {}", workspace.workdir().display());
            return Ok(());
        }

        let parsed = summary::load_summary(&src);
        report.merge(extract(parsed.as_ref(), env::core_count()));

        if let Err(e) = summary::copy_summary(&src, &boot.comm_file(name)) {
            tracing::error!("job report copy failed, execution terminated: {}", e);
            report.set_error(i64::from(STAGING_ERROR_CODE), Some(e.to_string()));
            return Err(report.clone());
        }
        Ok(())
    }

    /// Clean the workdir and archive what remains. Returns `false` when the
    /// archive could not be written.
    fn pack(&self, workspace: &Workspace, job: &mut JobDescriptor) -> bool {
        let files = &self.config.files;
        let workdir = workspace.workdir();

        let mut keep: Vec<&str> = job.payload_outputs().collect();
        if job.log_file.as_ref().is_some_and(|log| !job.output_files.contains_key(log)) {
            tracing::info!("log file was not declared");
        }
        keep.push(&files.work_report);
        keep.push(&files.stage_out);
        if !workspace.is_scratch() {
            keep.push(&files.catalog);
            keep.push(&files.payload_summary);
        }

        tracing::info!("cleanup of working directory");
        let started = self.clock.now();
        cleanup::clean(workdir, &keep);
        tracing::info!(
            "cleanup took: {} sec.",
            rp_core::format_secs(self.clock.now().duration_since(started))
        );

        let Some(log_file) = job.log_file.clone() else {
            tracing::info!("no log file for job {}, skipping log packing", job.job_id);
            return true;
        };

        let packed = with_retry(&self.config.pack_retry, "packing of logs", |_| {
            packager::pack_logs(workdir, &keep, &log_file)
        });
        match packed {
            Ok(pack) => {
                pack.remove_sources(workdir);
                true
            }
            Err(_) => {
                tracing::info!("continued I/O error during packing of logs, job will be failed");
                job.fail();
                false
            }
        }
    }

    fn checkpoint(&self, report: &mut WorkReport, path: &Path) {
        if let Err(e) = publish(report, path, &self.clock) {
            tracing::error!("{}", e);
        }
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
