// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Payload execution and recording of its outcome.

use crate::config::PilotConfig;
use rp_core::{format_secs, keys, utc_timestamp, Clock, JobDescriptor, WorkReport};
use rp_shell::{filtered_search_paths, PayloadCommand, PayloadLauncher};
use std::path::Path;
use std::time::Duration;

/// Recorded when the payload could not be started at all.
pub const LAUNCH_FAILURE_EXIT_CODE: i32 = 127;

/// Shell command for `job`, with site setup and parameter fixes applied.
pub fn build_command(config: &PilotConfig, workdir: &Path, job: &JobDescriptor) -> String {
    PayloadCommand::new(job.script.as_str(), job.parameters.as_str())
        .setup(config.setup.iter().map(String::as_str))
        .workdir(workdir)
        .input_flag(config.command.input_flag.as_str())
        .stripped_tokens(config.command.stripped_tokens.iter().map(String::as_str))
        .render()
}

/// Run `command` in `workdir` and fold the outcome into `job` and `report`.
///
/// A payload that fails, or cannot be started, is recorded; it never stops
/// the pipeline.
pub fn run(
    config: &PilotConfig,
    workdir: &Path,
    command: &str,
    job: &mut JobDescriptor,
    report: &mut WorkReport,
    clock: &impl Clock,
) {
    let _span = tracing::info_span!("payload", job_id = %job.job_id).entered();
    tracing::debug!("going to launch: {}", command);
    tracing::debug!("current work directory: {}", workdir.display());

    let launcher = PayloadLauncher::new(config.shell.as_str())
        .cwd(workdir)
        .stdout(workdir.join(&config.files.stdout))
        .stderr(workdir.join(&config.files.stderr))
        .envs(filtered_search_paths(&config.shared_prefix));

    let started_at = clock.local_now();
    let (exit_code, cpu_time, wall_time) = match launcher.run(command) {
        Ok(outcome) => (outcome.exit_code, outcome.cpu_time, outcome.wall_time),
        Err(e) => {
            tracing::error!("payload launch failed: {}", e);
            report.set(keys::EXIT_MSG, e.to_string());
            (LAUNCH_FAILURE_EXIT_CODE, Duration::ZERO, Duration::ZERO)
        }
    };
    let ended_at = clock.local_now();

    job.complete(exit_code, utc_timestamp(&clock.utc_now()));
    report.set(keys::END_TIME, job.end_time.clone().unwrap_or_default());
    report.set_status(job.state);
    report.set(keys::CPU_CONSUMPTION_TIME, cpu_time.as_secs_f64());
    report.set(keys::TRANS_EXIT_CODE, exit_code);

    tracing::info!("payload exit code: {} JobID: {}", exit_code, job.job_id);
    tracing::info!(
        "CPU consumption time: {} JobID: {}",
        format_secs(cpu_time),
        job.job_id
    );
    tracing::info!("start time: {} JobID: {}", started_at.to_rfc2822(), job.job_id);
    tracing::info!("end time: {} JobID: {}", ended_at.to_rfc2822(), job.job_id);
    tracing::info!(
        "execution time: {} sec. JobID: {}",
        format_secs(wall_time),
        job.job_id
    );
    tracing::debug!(
        "job report start time: {}",
        job.start_time.as_deref().unwrap_or("")
    );
    tracing::debug!(
        "job report end time: {}",
        job.end_time.as_deref().unwrap_or("")
    );
}

#[cfg(test)]
#[path = "payload_tests.rs"]
mod tests;
