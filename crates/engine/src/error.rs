// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for a pipeline run

use crate::deploy::DeploymentError;
use crate::sequencer::StageFailure;
use crate::sync::SyncError;
use quay_core::{stage_names, PipelineOutcome};
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can end a run early
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("sync failed: {0}")]
    Sync(#[from] SyncError),
    #[error("could not clear stale publish output {path}: {source}")]
    Prepare {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Stage(#[from] StageFailure),
    #[error("deploy failed: {0}")]
    Deploy(#[from] DeploymentError),
}

impl PipelineError {
    /// Stage name reported in the outcome
    pub fn failed_stage(&self) -> &str {
        match self {
            PipelineError::Sync(_) => stage_names::SYNC,
            PipelineError::Prepare { .. } => stage_names::PREPARE,
            PipelineError::Stage(failure) => &failure.stage,
            PipelineError::Deploy(_) => stage_names::DEPLOY,
        }
    }
}

impl From<PipelineError> for PipelineOutcome {
    fn from(err: PipelineError) -> Self {
        let message = match &err {
            PipelineError::Stage(failure) => failure.message(),
            other => other.to_string(),
        };
        PipelineOutcome::failure(err.failed_stage(), message)
    }
}
