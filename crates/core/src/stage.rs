// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stage definitions
//!
//! Stages are data: a name, a program, an argument vector, and the directory
//! to run in. The sequencer never builds command strings.

use crate::outcome::stage_names;
use crate::process::render_command_line;
use crate::request::BuildConfiguration;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// One external command in the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub name: String,
    pub command: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    /// Kill the command if it runs longer than this
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,
}

impl Stage {
    pub fn new(
        name: impl Into<String>,
        command: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
        working_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            args: args.into_iter().map(Into::into).collect(),
            working_dir: working_dir.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Render the command line for logs and error messages
    pub fn command_line(&self) -> String {
        render_command_line(&self.command, &self.args)
    }
}

/// The fixed build → test → coverage → publish sequence
pub fn canonical_stages(
    toolchain: &str,
    working_copy: &Path,
    publish_dir: &Path,
    configuration: BuildConfiguration,
    timeout: Option<Duration>,
) -> Vec<Stage> {
    let wc = working_copy.display().to_string();
    let wc = wc.as_str();
    let output = publish_dir.display().to_string();
    let cfg = configuration.as_str();

    vec![
        Stage::new(
            stage_names::BUILD,
            toolchain,
            ["build", wc, "--configuration", cfg],
            working_copy,
        ),
        Stage::new(
            stage_names::TEST,
            toolchain,
            ["test", wc, "--configuration", cfg, "--no-build"],
            working_copy,
        ),
        Stage::new(
            stage_names::COVERAGE,
            toolchain,
            ["test", wc, "--configuration", cfg, "--collect", "Code Coverage"],
            working_copy,
        ),
        Stage::new(
            stage_names::PUBLISH,
            toolchain,
            ["publish", wc, "--configuration", cfg, "--output", output.as_str()],
            working_copy,
        ),
    ]
    .into_iter()
    .map(|stage| stage.with_timeout(timeout))
    .collect()
}

#[cfg(test)]
#[path = "stage_tests.rs"]
mod tests;
