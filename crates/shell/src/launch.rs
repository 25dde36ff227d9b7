// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Blocking payload execution with wall-clock and CPU accounting.

use std::fs::File;
use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use nix::sys::resource::{getrusage, UsageWho};
use nix::sys::time::TimeVal;

use crate::error::LaunchError;

/// What happened when the payload ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchOutcome {
    /// Process exit code; `128 + signal` when killed by a signal.
    pub exit_code: i32,
    /// Wall-clock duration from spawn to exit.
    pub wall_time: Duration,
    /// User plus system CPU time consumed by the payload and its children.
    pub cpu_time: Duration,
}

impl LaunchOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs one shell command to completion. No timeout is imposed; the batch
/// allocation's wall-clock limit is the only bound.
#[derive(Debug, Clone)]
pub struct PayloadLauncher {
    shell: String,
    cwd: Option<PathBuf>,
    stdout: Option<PathBuf>,
    stderr: Option<PathBuf>,
    env: Vec<(String, String)>,
}

impl PayloadLauncher {
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
            cwd: None,
            stdout: None,
            stderr: None,
            env: Vec::new(),
        }
    }

    pub fn cwd(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    /// File receiving the payload's stdout (truncated).
    pub fn stdout(mut self, path: impl AsRef<Path>) -> Self {
        self.stdout = Some(path.as_ref().to_path_buf());
        self
    }

    /// File receiving the payload's stderr (truncated).
    pub fn stderr(mut self, path: impl AsRef<Path>) -> Self {
        self.stderr = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Run `command` through the shell and wait for it.
    pub fn run(&self, command: &str) -> Result<LaunchOutcome, LaunchError> {
        let mut cmd = Command::new(&self.shell);
        cmd.arg("-c").arg(command).stdin(Stdio::null());
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }
        if let Some(path) = &self.stdout {
            cmd.stdout(open_capture(path)?);
        }
        if let Some(path) = &self.stderr {
            cmd.stderr(open_capture(path)?);
        }
        cmd.envs(self.env.iter().map(|(k, v)| (k, v)));

        let cpu_before = children_cpu();
        let started = Instant::now();
        let mut child = cmd.spawn().map_err(|source| LaunchError::SpawnFailed {
            shell: self.shell.clone(),
            source,
        })?;
        tracing::debug!(pid = child.id(), "payload started");

        let status = child.wait().map_err(LaunchError::WaitFailed)?;
        let wall_time = started.elapsed();
        let cpu_time = children_cpu().saturating_sub(cpu_before);

        Ok(LaunchOutcome {
            exit_code: exit_code(status),
            wall_time,
            cpu_time,
        })
    }
}

fn open_capture(path: &Path) -> Result<File, LaunchError> {
    File::create(path).map_err(|source| LaunchError::RedirectFailed {
        path: path.to_path_buf(),
        source,
    })
}

fn exit_code(status: ExitStatus) -> i32 {
    status
        .code()
        .or_else(|| status.signal().map(|sig| 128 + sig))
        .unwrap_or(-1)
}

/// Accumulated CPU time of reaped children of this process.
fn children_cpu() -> Duration {
    match getrusage(UsageWho::RUSAGE_CHILDREN) {
        Ok(usage) => timeval(usage.user_time()) + timeval(usage.system_time()),
        Err(e) => {
            tracing::warn!("getrusage failed, CPU time unavailable: {}", e);
            Duration::ZERO
        }
    }
}

fn timeval(tv: TimeVal) -> Duration {
    let secs = u64::try_from(tv.tv_sec()).unwrap_or(0);
    let micros = u32::try_from(tv.tv_usec()).unwrap_or(0);
    Duration::new(secs, micros.saturating_mul(1_000))
}

#[cfg(test)]
#[path = "launch_tests.rs"]
mod tests;
