// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `rankpilot` command line.

use clap::Parser;
use std::path::PathBuf;

/// Run the job assigned to this rank of the batch allocation.
#[derive(Debug, Parser)]
#[command(name = "rankpilot", version)]
pub struct Cli {
    /// Job-id-by-rank list (default: worker_pandaids.json in the launch directory)
    pub assignment: Option<PathBuf>,

    /// This process's rank (default: from the MPI launcher's environment, else 0)
    #[arg(long)]
    pub rank: Option<usize>,

    /// Site configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
