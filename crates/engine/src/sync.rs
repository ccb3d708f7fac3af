// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Working copy synchronization
//!
//! Brings the local working copy to the latest commit of the requested
//! branch: clone when missing, otherwise switch branches if needed and
//! fast-forward from the remote.

use quay_adapters::{RepoAdapter, RepoError};
use std::path::Path;
use thiserror::Error;

/// Remote every pull fetches from
pub const DEFAULT_REMOTE: &str = "origin";

/// Errors from synchronizing the working copy
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("clone of {url} failed: {source}")]
    Clone {
        url: String,
        #[source]
        source: RepoError,
    },
    #[error("could not read the checked-out branch: {0}")]
    Inspect(#[source] RepoError),
    #[error("checkout of branch {branch} failed: {source}")]
    Checkout {
        branch: String,
        #[source]
        source: RepoError,
    },
    #[error("pull failed: {0}")]
    Pull(#[source] RepoError),
}

/// Observed state of the working copy before a sync
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingCopyState {
    pub exists: bool,
    /// `None` when missing or on a detached HEAD
    pub current_branch: Option<String>,
}

/// What a sync did to the working copy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    /// Fresh clone followed by a checkout of the branch
    Cloned,
    /// Existing working copy pulled. `switched_from` is set when a checkout
    /// happened first, holding the previous branch (`HEAD` when detached).
    Updated { switched_from: Option<String> },
}

/// Synchronizes the working copy with the remote branch
#[derive(Clone)]
pub struct SourceSynchronizer<R> {
    repo: R,
    remote: String,
}

impl<R: RepoAdapter> SourceSynchronizer<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            remote: DEFAULT_REMOTE.to_string(),
        }
    }

    pub async fn inspect(&self, local_path: &Path) -> Result<WorkingCopyState, SyncError> {
        if !local_path.exists() {
            return Ok(WorkingCopyState {
                exists: false,
                current_branch: None,
            });
        }

        let current_branch = self
            .repo
            .current_branch(local_path)
            .await
            .map_err(SyncError::Inspect)?;
        Ok(WorkingCopyState {
            exists: true,
            current_branch,
        })
    }

    /// Ensure `local_path` holds the latest `branch` of `repository_url`.
    ///
    /// Never retries; the first failing git operation aborts the sync.
    pub async fn sync(
        &self,
        repository_url: &str,
        local_path: &Path,
        branch: &str,
    ) -> Result<SyncAction, SyncError> {
        let state = self.inspect(local_path).await?;

        if !state.exists {
            tracing::info!(url = repository_url, "working copy missing, cloning");
            self.repo
                .clone_repo(repository_url, local_path)
                .await
                .map_err(|source| SyncError::Clone {
                    url: repository_url.to_string(),
                    source,
                })?;
            self.checkout(local_path, branch).await?;
            return Ok(SyncAction::Cloned);
        }

        let switched_from = match state.current_branch {
            Some(current) if current == branch => None,
            current => {
                let from = current.unwrap_or_else(|| "HEAD".to_string());
                tracing::info!(from = %from, to = branch, "switching branch");
                self.checkout(local_path, branch).await?;
                Some(from)
            }
        };

        self.repo
            .pull(local_path, &self.remote)
            .await
            .map_err(SyncError::Pull)?;

        Ok(SyncAction::Updated { switched_from })
    }

    async fn checkout(&self, local_path: &Path, branch: &str) -> Result<(), SyncError> {
        self.repo
            .checkout(local_path, branch)
            .await
            .map_err(|source| SyncError::Checkout {
                branch: branch.to_string(),
                source,
            })
    }
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
