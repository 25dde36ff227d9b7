// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One-time tracing setup for the pilot process.

use std::io::IsTerminal;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Every record goes to stdout; errors are
/// duplicated on stderr so the batch system's error stream shows them.
///
/// Returns the `messageLevel` recorded in the work report.
pub fn init(filter: &str) -> String {
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("debug"));
    let writer = std::io::stderr
        .with_max_level(Level::ERROR)
        .and(std::io::stdout);

    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(writer)
        .with_target(false)
        .with_ansi(std::io::stdout().is_terminal())
        .try_init();
    if let Err(e) = installed {
        eprintln!("rankpilot: logging already initialized: {e}");
    }

    message_level(filter)
}

/// Upper-case level name for the report, taken from the filter's default
/// directive (`"info,rp_shell=trace"` gives `INFO`).
pub fn message_level(filter: &str) -> String {
    filter
        .split(',')
        .map(str::trim)
        .find(|d| !d.contains('='))
        .and_then(|d| d.parse::<Level>().ok())
        .unwrap_or(Level::DEBUG)
        .as_str()
        .to_string()
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
