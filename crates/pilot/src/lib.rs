// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rp-pilot: the per-rank job pipeline behind the `rankpilot` binary

pub mod bootstrap;
pub mod cleanup;
pub mod cli;
pub mod config;
pub mod env;
pub mod exit;
pub mod logging;
pub mod packager;
pub mod payload;
pub mod pipeline;
pub mod publish;
pub mod retry;
pub mod stageout;
pub mod staging;
pub mod summary;

pub use bootstrap::{Bootstrap, BootstrapError};
pub use cli::Cli;
pub use config::{ConfigError, PilotConfig};
pub use exit::PipelineExit;
pub use pipeline::Pipeline;
pub use retry::{with_retry, RetryPolicy};
pub use staging::{StagingError, Workspace};
