// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ordered, fail-fast stage execution

use quay_adapters::{ProcessError, ProcessRunner};
use quay_core::{PipelineOutcome, Stage};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::Instrument;

/// Trailing stderr lines carried into a failure message
pub const STDERR_TAIL_LINES: usize = 20;

/// A stage that ran to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub name: String,
    pub elapsed: Duration,
}

/// The first stage that failed, plus everything that ran before it
#[derive(Debug, Error)]
#[error("stage {stage} failed: {source}")]
pub struct StageFailure {
    pub stage: String,
    #[source]
    pub source: ProcessError,
    pub completed: Vec<StageReport>,
}

impl StageFailure {
    /// Error text followed by the tail of the failing command's stderr
    pub fn message(&self) -> String {
        let mut message = self.source.to_string();
        if let Some(result) = self.source.result() {
            let tail = result.stderr_tail(STDERR_TAIL_LINES);
            if !tail.is_empty() {
                message.push('\n');
                message.push_str(&tail.join("\n"));
            }
        }
        message
    }
}

/// Runs stages strictly in order, stopping at the first failure
#[derive(Clone)]
pub struct StageSequencer<P> {
    runner: P,
}

impl<P: ProcessRunner> StageSequencer<P> {
    pub fn new(runner: P) -> Self {
        Self { runner }
    }

    pub async fn try_run(&self, stages: &[Stage]) -> Result<Vec<StageReport>, StageFailure> {
        let mut completed = Vec::with_capacity(stages.len());

        for stage in stages {
            let span = tracing::info_span!("stage", name = %stage.name);
            let start = Instant::now();
            let result = async {
                tracing::info!(cmd = %stage.command_line(), "running stage");
                self.runner
                    .run(&stage.command, &stage.args, &stage.working_dir, stage.timeout)
                    .await
            }
            .instrument(span.clone())
            .await;
            let elapsed = start.elapsed();

            match result {
                Ok(_) => {
                    span.in_scope(|| {
                        tracing::info!(elapsed_ms = elapsed.as_millis() as u64, "stage succeeded")
                    });
                    completed.push(StageReport {
                        name: stage.name.clone(),
                        elapsed,
                    });
                }
                Err(source) => {
                    span.in_scope(|| {
                        tracing::error!(
                            elapsed_ms = elapsed.as_millis() as u64,
                            error = %source,
                            "stage failed"
                        )
                    });
                    return Err(StageFailure {
                        stage: stage.name.clone(),
                        source,
                        completed,
                    });
                }
            }
        }

        Ok(completed)
    }

    /// Run `stages` and fold the result into an outcome
    pub async fn run_stages(&self, stages: &[Stage]) -> PipelineOutcome {
        match self.try_run(stages).await {
            Ok(reports) => PipelineOutcome::success(format!("{} stages succeeded", reports.len())),
            Err(failure) => PipelineOutcome::failure(&failure.stage, failure.message()),
        }
    }
}

#[cfg(test)]
#[path = "sequencer_tests.rs"]
mod tests;
