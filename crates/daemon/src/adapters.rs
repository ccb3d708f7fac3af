// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Concrete adapter stack used by the daemon and one-shot commands

use quay_adapters::{GitAdapter, SystemProcessRunner, TracedProcessRunner, TracedRepoAdapter};
use quay_core::DeployConfig;
use quay_engine::{PipelineCoordinator, PipelineQueue, PipelineSettings};

/// Process runner with tracing
pub type DaemonRunner = TracedProcessRunner<SystemProcessRunner>;

/// Git over the traced process runner, itself traced
pub type DaemonRepo = TracedRepoAdapter<GitAdapter<DaemonRunner>>;

pub type DaemonCoordinator = PipelineCoordinator<DaemonRepo, DaemonRunner>;
pub type DaemonQueue = PipelineQueue<DaemonRepo, DaemonRunner>;

/// Wire the real adapters for `config`
pub fn make_coordinator(config: &DeployConfig) -> DaemonCoordinator {
    let runner = TracedProcessRunner::new(SystemProcessRunner::new());
    let git = GitAdapter::new(runner.clone()).with_timeout(config.repository.sync_timeout);
    PipelineCoordinator::new(
        TracedRepoAdapter::new(git),
        runner,
        PipelineSettings::from(config),
    )
}
