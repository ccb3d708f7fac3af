// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `quayd rollback` - Restore the previous deployment

use std::path::Path;

use anyhow::{bail, Context, Result};
use quay_core::SwapStrategy;
use quay_daemon::lifecycle::{Config, ProcessLock};
use quay_daemon::logging::setup_stderr_logging;
use quay_engine::DeploymentSwapper;

use super::load_config;

pub async fn handle(config_path: &Path) -> Result<()> {
    setup_stderr_logging();
    let deploy = load_config(config_path)?;
    if deploy.deploy.strategy != SwapStrategy::Staged {
        bail!("rollback needs deploy.strategy = \"staged\"; replace keeps no previous release");
    }

    let config = Config::for_config_file(config_path)?;
    let lock = ProcessLock::acquire(&config).context("cannot roll back while quayd is serving")?;

    let target = deploy.deployment_target();
    let result = DeploymentSwapper::new(SwapStrategy::Staged)
        .rollback(&target)
        .await;
    lock.release();
    result?;

    println!("rolled back {}", target.path().display());
    Ok(())
}
