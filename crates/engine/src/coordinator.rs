// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline coordinator
//!
//! Runs sync, build stages and the deployment swap for one request, and
//! folds every failure into a [`PipelineOutcome`].

use crate::deploy::{DeploymentSwapper, SwapReport};
use crate::error::PipelineError;
use crate::lock::PathLocks;
use crate::sequencer::StageSequencer;
use crate::sync::{SourceSynchronizer, SyncAction};
use quay_adapters::{ProcessRunner, RepoAdapter};
use quay_core::{
    canonical_stages, DeployConfig, DeploymentTarget, PipelineOutcome, PipelineRequest, Stage,
    SwapStrategy,
};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::Instrument;
use uuid::Uuid;

/// Build and deploy settings shared by every run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    pub toolchain: String,
    /// Publish output, relative to the working copy unless absolute
    pub publish_dir: PathBuf,
    pub stage_timeout: Option<Duration>,
    pub target: DeploymentTarget,
    pub strategy: SwapStrategy,
}

impl From<&DeployConfig> for PipelineSettings {
    fn from(config: &DeployConfig) -> Self {
        Self {
            toolchain: config.build.toolchain.clone(),
            publish_dir: config.build.publish_dir.clone(),
            stage_timeout: config.build.stage_timeout,
            target: config.deployment_target(),
            strategy: config.deploy.strategy,
        }
    }
}

impl PipelineSettings {
    pub fn publish_output(&self, request: &PipelineRequest) -> PathBuf {
        request.local_path().join(&self.publish_dir)
    }

    pub fn stages(&self, request: &PipelineRequest) -> Vec<Stage> {
        canonical_stages(
            &self.toolchain,
            request.local_path(),
            &self.publish_output(request),
            request.build_configuration(),
            self.stage_timeout,
        )
    }
}

/// What a successful run did
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub sync: SyncAction,
    pub stages: usize,
    pub swap: SwapReport,
}

/// Drives one request through the whole pipeline
#[derive(Clone)]
pub struct PipelineCoordinator<R, P> {
    sync: SourceSynchronizer<R>,
    sequencer: StageSequencer<P>,
    swapper: DeploymentSwapper,
    settings: PipelineSettings,
    locks: PathLocks,
}

impl<R, P> PipelineCoordinator<R, P>
where
    R: RepoAdapter,
    P: ProcessRunner,
{
    pub fn new(repo: R, runner: P, settings: PipelineSettings) -> Self {
        Self {
            sync: SourceSynchronizer::new(repo),
            sequencer: StageSequencer::new(runner),
            swapper: DeploymentSwapper::new(settings.strategy),
            settings,
            locks: PathLocks::new(),
        }
    }

    /// Share single-flight locks with other coordinators
    pub fn with_locks(mut self, locks: PathLocks) -> Self {
        self.locks = locks;
        self
    }

    /// Run the pipeline under a fresh run id
    pub async fn run_pipeline(&self, request: &PipelineRequest) -> PipelineOutcome {
        self.run(Uuid::new_v4(), request).await
    }

    /// Run the pipeline for `request`. Never fails: errors become a
    /// failed outcome naming the stage.
    pub async fn run(&self, run_id: Uuid, request: &PipelineRequest) -> PipelineOutcome {
        let span = tracing::info_span!(
            "pipeline",
            %run_id,
            branch = request.branch(),
            local_path = %request.local_path().display(),
        );

        async {
            let _guard = self
                .locks
                .acquire([request.local_path(), self.settings.target.path()])
                .await;

            tracing::info!(
                configuration = %request.build_configuration(),
                "pipeline started"
            );
            let start = Instant::now();
            let result = self.try_run(request).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match result {
                Ok(summary) => {
                    tracing::info!(
                        elapsed_ms,
                        sync = ?summary.sync,
                        stages = summary.stages,
                        files = summary.swap.files_copied,
                        "pipeline succeeded"
                    );
                    PipelineOutcome::success(format!(
                        "deployed {} to {} ({} files)",
                        request.branch(),
                        self.settings.target.path().display(),
                        summary.swap.files_copied
                    ))
                }
                Err(e) => {
                    tracing::error!(
                        elapsed_ms,
                        failed_stage = e.failed_stage(),
                        error = %e,
                        "pipeline failed"
                    );
                    e.into()
                }
            }
        }
        .instrument(span)
        .await
    }

    /// The pipeline with typed errors; callers must hold the path locks
    async fn try_run(&self, request: &PipelineRequest) -> Result<RunSummary, PipelineError> {
        let sync = self
            .sync
            .sync(request.repository_url(), request.local_path(), request.branch())
            .await?;

        let publish_output = self.settings.publish_output(request);
        clear_publish_output(&publish_output).await?;

        let stages = self.settings.stages(request);
        let reports = self.sequencer.try_run(&stages).await?;

        let swap = self
            .swapper
            .swap(&publish_output, &self.settings.target)
            .await?;

        Ok(RunSummary {
            sync,
            stages: reports.len(),
            swap,
        })
    }
}

/// Remove output left by an earlier publish so it cannot leak into this one
async fn clear_publish_output(path: &Path) -> Result<(), PipelineError> {
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "cleared stale publish output");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(PipelineError::Prepare {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
