// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! rankpilot: run one rank's job end to end.

use anyhow::{Context, Result};
use clap::Parser;
use rp_core::SystemClock;
use rp_pilot::{env, logging, Cli, Pipeline, PilotConfig};

/// Exit code when the pilot cannot even be configured.
const USAGE_EXIT_CODE: i32 = 2;

fn main() {
    let cli = Cli::parse();
    let message_level = logging::init(&env::log_filter());

    let code = match run(cli, message_level) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            USAGE_EXIT_CODE
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli, message_level: String) -> Result<i32> {
    let config = PilotConfig::load(cli.config.as_deref()).context("loading configuration")?;
    let launch_dir = std::env::current_dir().context("resolving launch directory")?;
    let rank = cli.rank.or_else(env::rank).unwrap_or(0);

    let _span = tracing::info_span!("rank", rank).entered();
    tracing::info!("rankpilot starting in {}", launch_dir.display());

    let clock = SystemClock;
    let mut pipeline = Pipeline::new(config, clock.clone(), rank, launch_dir)
        .message_level(message_level);
    if let Some(assignment) = cli.assignment {
        pipeline = pipeline.assignment(assignment);
    }

    let code = pipeline.run().finish(&clock);
    tracing::info!("exit code {}", code);
    Ok(code)
}
