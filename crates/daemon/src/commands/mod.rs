// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

pub mod check;
pub mod rollback;
pub mod run;
pub mod serve;

use anyhow::{Context, Result};
use quay_core::DeployConfig;
use std::path::Path;

/// Load and validate the config, naming the file on failure
pub fn load_config(path: &Path) -> Result<DeployConfig> {
    DeployConfig::load(path).with_context(|| format!("invalid config {}", path.display()))
}
