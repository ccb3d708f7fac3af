// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake repository adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{RepoAdapter, RepoError};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Recorded repo call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoCall {
    Clone { url: String, path: PathBuf },
    Checkout { path: PathBuf, branch: String },
    CurrentBranch { path: PathBuf },
    Pull { path: PathBuf, remote: String },
}

/// Operation kinds that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepoOp {
    Clone,
    Checkout,
    CurrentBranch,
    Pull,
}

#[derive(Default)]
struct FakeRepoState {
    /// Checked-out branch per working copy, `None` when detached
    heads: HashMap<PathBuf, Option<String>>,
    failing: HashSet<RepoOp>,
    calls: Vec<RepoCall>,
}

/// Fake repository adapter for testing
///
/// Cloning creates the working copy directory on disk so callers that probe
/// the filesystem see it, but nothing is fetched.
#[derive(Clone)]
pub struct FakeRepoAdapter {
    state: Arc<Mutex<FakeRepoState>>,
    default_branch: String,
}

impl Default for FakeRepoAdapter {
    fn default() -> Self {
        Self {
            state: Arc::default(),
            default_branch: "main".to_string(),
        }
    }
}

impl FakeRepoAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Branch a fresh clone starts on
    pub fn with_default_branch(mut self, branch: impl Into<String>) -> Self {
        self.default_branch = branch.into();
        self
    }

    /// Pretend `path` is a working copy with `branch` checked out
    pub fn with_working_copy(self, path: impl Into<PathBuf>, branch: Option<&str>) -> Self {
        self.lock()
            .heads
            .insert(path.into(), branch.map(str::to_string));
        self
    }

    /// Make every call of the given kind fail
    pub fn fail_on(self, op: RepoOp) -> Self {
        self.lock().failing.insert(op);
        self
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<RepoCall> {
        self.lock().calls.clone()
    }

    /// Branch currently checked out in `path`
    pub fn branch_of(&self, path: &Path) -> Option<String> {
        self.lock().heads.get(path).cloned().flatten()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeRepoState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record `call`, failing if its kind was scripted to fail
    fn record(&self, op: RepoOp, call: RepoCall) -> Result<(), RepoError> {
        let mut state = self.lock();
        state.calls.push(call);
        if state.failing.contains(&op) {
            return Err(RepoError::CommandFailed(format!(
                "simulated {:?} failure",
                op
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl RepoAdapter for FakeRepoAdapter {
    async fn clone_repo(&self, url: &str, path: &Path) -> Result<(), RepoError> {
        self.record(
            RepoOp::Clone,
            RepoCall::Clone {
                url: url.to_string(),
                path: path.to_path_buf(),
            },
        )?;

        std::fs::create_dir_all(path).map_err(|source| RepoError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.lock()
            .heads
            .insert(path.to_path_buf(), Some(self.default_branch.clone()));
        Ok(())
    }

    async fn checkout(&self, path: &Path, branch: &str) -> Result<(), RepoError> {
        self.record(
            RepoOp::Checkout,
            RepoCall::Checkout {
                path: path.to_path_buf(),
                branch: branch.to_string(),
            },
        )?;

        self.lock()
            .heads
            .insert(path.to_path_buf(), Some(branch.to_string()));
        Ok(())
    }

    async fn current_branch(&self, path: &Path) -> Result<Option<String>, RepoError> {
        self.record(
            RepoOp::CurrentBranch,
            RepoCall::CurrentBranch {
                path: path.to_path_buf(),
            },
        )?;

        match self.lock().heads.get(path) {
            Some(head) => Ok(head.clone()),
            None => Err(RepoError::CommandFailed(format!(
                "not a working copy: {}",
                path.display()
            ))),
        }
    }

    async fn pull(&self, path: &Path, remote: &str) -> Result<(), RepoError> {
        self.record(
            RepoOp::Pull,
            RepoCall::Pull {
                path: path.to_path_buf(),
                remote: remote.to_string(),
            },
        )
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
