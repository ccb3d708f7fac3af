// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `quayd check` - Validate the config and show what a run would do

use std::path::Path;

use anyhow::Result;
use quay_engine::PipelineSettings;

use super::load_config;

pub fn handle(config_path: &Path) -> Result<()> {
    let deploy = load_config(config_path)?;
    let settings = PipelineSettings::from(&deploy);

    let branches = if deploy.repository.branches.is_empty() {
        "(all)".to_string()
    } else {
        deploy.repository.branches.join(", ")
    };

    println!("repository:    {}", deploy.repository.url);
    println!("working copy:  {}", deploy.repository.local_path.display());
    println!("branches:      {}", branches);
    println!("configuration: {}", deploy.build.configuration);
    println!("publish:       {}", deploy.resolved_publish_dir().display());
    println!(
        "deploy:        {} ({:?})",
        deploy.deploy.path.display(),
        deploy.deploy.strategy
    );
    println!("listen:        {}", deploy.server.listen);

    // Stages do not depend on the branch
    let sample = deploy
        .repository
        .branches
        .first()
        .map(String::as_str)
        .unwrap_or("main");
    let request = deploy.request_for(sample)?;
    println!("stages:");
    for stage in settings.stages(&request) {
        println!("  {:<9} {}", stage.name, stage.command_line());
    }

    Ok(())
}
