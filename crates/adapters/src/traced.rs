// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::process::{ProcessError, ProcessRunner};
use crate::repo::{RepoAdapter, RepoError};
use async_trait::async_trait;
use quay_core::{render_command_line, ProcessResult};
use std::path::Path;
use std::time::Duration;
use tracing::Instrument;

/// Wrapper that adds tracing to any ProcessRunner
#[derive(Clone)]
pub struct TracedProcessRunner<P> {
    inner: P,
}

impl<P> TracedProcessRunner<P> {
    pub fn new(inner: P) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<P: ProcessRunner> ProcessRunner for TracedProcessRunner<P> {
    async fn run(
        &self,
        command: &str,
        args: &[String],
        working_dir: &Path,
        timeout: Option<Duration>,
    ) -> Result<ProcessResult, ProcessError> {
        let span = tracing::info_span!("process.run", command, cwd = %working_dir.display());

        async {
            tracing::info!(cmd = %render_command_line(command, args), ?timeout, "starting");

            // Precondition: working directory must exist
            if !working_dir.is_dir() {
                tracing::error!("working directory does not exist");
                return Err(ProcessError::Spawn {
                    command: command.to_string(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        format!("working directory does not exist: {}", working_dir.display()),
                    ),
                });
            }

            let start = std::time::Instant::now();
            let result = self.inner.run(command, args, working_dir, timeout).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(r) => tracing::info!(
                    elapsed_ms,
                    stdout_lines = r.stdout_lines.len(),
                    stderr_lines = r.stderr_lines.len(),
                    "process exited"
                ),
                Err(e) => tracing::error!(
                    elapsed_ms,
                    exit_code = e.exit_code(),
                    error = %e,
                    "process failed"
                ),
            }

            result
        }
        .instrument(span)
        .await
    }
}

/// Wrapper that adds tracing to any RepoAdapter
#[derive(Clone)]
pub struct TracedRepoAdapter<R> {
    inner: R,
}

impl<R> TracedRepoAdapter<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<R: RepoAdapter> RepoAdapter for TracedRepoAdapter<R> {
    async fn clone_repo(&self, url: &str, path: &Path) -> Result<(), RepoError> {
        let span = tracing::info_span!("repo.clone", url, path = %path.display());

        async {
            tracing::info!("cloning");

            // Precondition: clone destination must not exist yet
            if path.exists() {
                tracing::error!("destination already exists");
                return Err(RepoError::CommandFailed(format!(
                    "destination already exists: {}",
                    path.display()
                )));
            }

            let start = std::time::Instant::now();
            let result = self.inner.clone_repo(url, path).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(()) => tracing::info!(elapsed_ms, "cloned"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "clone failed"),
            }

            result
        }
        .instrument(span)
        .await
    }

    async fn checkout(&self, path: &Path, branch: &str) -> Result<(), RepoError> {
        let span = tracing::info_span!("repo.checkout", branch, path = %path.display());

        async {
            let result = self.inner.checkout(path, branch).await;
            match &result {
                Ok(()) => tracing::info!("checked out"),
                Err(e) => tracing::error!(error = %e, "checkout failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn current_branch(&self, path: &Path) -> Result<Option<String>, RepoError> {
        let result = self.inner.current_branch(path).await;
        tracing::trace!(
            path = %path.display(),
            branch = ?result.as_ref().ok(),
            "read current branch"
        );
        result
    }

    async fn pull(&self, path: &Path, remote: &str) -> Result<(), RepoError> {
        let span = tracing::info_span!("repo.pull", remote, path = %path.display());

        async {
            tracing::info!("pulling");

            let start = std::time::Instant::now();
            let result = self.inner.pull(path, remote).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(()) => tracing::info!(elapsed_ms, "pulled"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "pull failed"),
            }

            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
