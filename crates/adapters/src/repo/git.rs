// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Git repository adapter

use super::{RepoAdapter, RepoError};
use crate::process::ProcessRunner;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

/// Git-based repository adapter driving the `git` binary
#[derive(Clone)]
pub struct GitAdapter<P> {
    runner: P,
    timeout: Option<Duration>,
}

impl<P: ProcessRunner> GitAdapter<P> {
    pub fn new(runner: P) -> Self {
        Self {
            runner,
            timeout: None,
        }
    }

    /// Bound every git invocation (network operations can hang)
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    async fn git(
        &self,
        operation: &'static str,
        args: &[&str],
        cwd: &Path,
    ) -> Result<Vec<String>, RepoError> {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        self.runner
            .run("git", &args, cwd, self.timeout)
            .await
            .map(|result| result.stdout_lines)
            .map_err(|source| RepoError::Git { operation, source })
    }
}

#[async_trait]
impl<P: ProcessRunner> RepoAdapter for GitAdapter<P> {
    async fn clone_repo(&self, url: &str, path: &Path) -> Result<(), RepoError> {
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| RepoError::Io {
                path: parent.to_path_buf(),
                source,
            })?;

        // Relative to `parent`, since that is where git runs
        let dest = path.file_name().map(Path::new).unwrap_or(path);
        let dest = dest.to_string_lossy();
        self.git("clone", &["clone", "--", url, &dest], parent)
            .await?;
        Ok(())
    }

    async fn checkout(&self, path: &Path, branch: &str) -> Result<(), RepoError> {
        self.git("checkout", &["checkout", branch, "--"], path)
            .await?;
        Ok(())
    }

    async fn current_branch(&self, path: &Path) -> Result<Option<String>, RepoError> {
        let stdout = self
            .git("rev-parse", &["rev-parse", "--abbrev-ref", "HEAD"], path)
            .await?;

        let branch = stdout.first().map(|line| line.trim()).unwrap_or_default();
        match branch {
            "" => Err(RepoError::CommandFailed(format!(
                "git rev-parse printed no branch for {}",
                path.display()
            ))),
            "HEAD" => Ok(None),
            name => Ok(Some(name.to_string())),
        }
    }

    async fn pull(&self, path: &Path, remote: &str) -> Result<(), RepoError> {
        self.git("pull", &["pull", "--ff-only", remote], path)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "git_tests.rs"]
mod tests;
