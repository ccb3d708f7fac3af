// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline outcome
//!
//! The single result shape every run ends in, whichever component failed.

use serde::{Deserialize, Serialize};

/// Names used in `PipelineOutcome::failed_stage`
pub mod stage_names {
    pub const SYNC: &str = "sync";
    pub const PREPARE: &str = "prepare";
    pub const BUILD: &str = "build";
    pub const TEST: &str = "test";
    pub const COVERAGE: &str = "coverage";
    pub const PUBLISH: &str = "publish";
    pub const DEPLOY: &str = "deploy";
}

/// Terminal value of a pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineOutcome {
    pub succeeded: bool,
    pub failed_stage: Option<String>,
    pub message: String,
}

impl PipelineOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            succeeded: true,
            failed_stage: None,
            message: message.into(),
        }
    }

    pub fn failure(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            failed_stage: Some(stage.into()),
            message: message.into(),
        }
    }
}
