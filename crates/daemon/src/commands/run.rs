// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `quayd run --branch <branch>` - Run the pipeline once

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Args;
use quay_core::BuildConfiguration;
use quay_daemon::lifecycle::{Config, ProcessLock};
use quay_daemon::logging::setup_stderr_logging;
use quay_daemon::make_coordinator;

use super::load_config;

#[derive(Args)]
pub struct RunArgs {
    /// Branch to check out, build and deploy
    #[arg(long)]
    pub branch: String,

    /// Build configuration (Debug or Release); defaults to the config file's
    #[arg(long)]
    pub configuration: Option<BuildConfiguration>,
}

pub async fn handle(args: RunArgs, config_path: &Path) -> Result<()> {
    setup_stderr_logging();
    let deploy = load_config(config_path)?;
    let config = Config::for_config_file(config_path)?;

    // Same lock as the daemon: never race a running quayd on the working copy
    let lock = ProcessLock::acquire(&config).context("cannot run while quayd is serving")?;

    let configuration = args.configuration.unwrap_or(deploy.build.configuration);
    let request = deploy.request_with(&args.branch, configuration)?;
    let outcome = make_coordinator(&deploy).run_pipeline(&request).await;
    lock.release();

    println!("{}", serde_json::to_string_pretty(&outcome)?);

    if let Some(stage) = &outcome.failed_stage {
        bail!("pipeline failed at stage {}", stage);
    }
    Ok(())
}
