// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Working copy management adapters

mod git;

pub use git::GitAdapter;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeRepoAdapter, RepoCall, RepoOp};

use crate::process::ProcessError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from repo operations
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("git {operation} failed: {source}")]
    Git {
        operation: &'static str,
        #[source]
        source: ProcessError,
    },
    #[error("failed to prepare {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("command failed: {0}")]
    CommandFailed(String),
}

/// Adapter for working copy operations
#[async_trait]
pub trait RepoAdapter: Clone + Send + Sync + 'static {
    /// Clone `url` into `path`, which must not exist yet
    async fn clone_repo(&self, url: &str, path: &Path) -> Result<(), RepoError>;

    /// Check out an existing branch in the working copy
    async fn checkout(&self, path: &Path, branch: &str) -> Result<(), RepoError>;

    /// Name of the checked-out branch, `None` for a detached HEAD
    async fn current_branch(&self, path: &Path) -> Result<Option<String>, RepoError>;

    /// Fast-forward the checked-out branch from `remote`
    async fn pull(&self, path: &Path, remote: &str) -> Result<(), RepoError>;
}
