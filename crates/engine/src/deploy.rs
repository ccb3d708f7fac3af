// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deployment swap
//!
//! Replaces the live directory with the freshly published build. The
//! filesystem work is blocking and runs on the blocking thread pool.

use quay_core::{DeploymentTarget, SwapStrategy};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from swapping a deployment
#[derive(Debug, Error)]
pub enum DeploymentError {
    #[error("publish output not found: {0}")]
    MissingPublishOutput(PathBuf),
    #[error("failed to {op} {path}: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("no previous deployment retained for {0}")]
    NoPreviousDeployment(PathBuf),
    #[error("deployment task panicked: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// What a swap did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapReport {
    pub strategy: SwapStrategy,
    pub files_copied: usize,
    /// Whether the replaced release was kept for rollback
    pub previous_retained: bool,
}

/// Swaps published builds into the deployment target
#[derive(Debug, Clone, Copy, Default)]
pub struct DeploymentSwapper {
    strategy: SwapStrategy,
}

impl DeploymentSwapper {
    pub fn new(strategy: SwapStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> SwapStrategy {
        self.strategy
    }

    /// Make `target` an exact mirror of `publish_output`.
    ///
    /// Fails before touching the target when the publish output is missing.
    pub async fn swap(
        &self,
        publish_output: &Path,
        target: &DeploymentTarget,
    ) -> Result<SwapReport, DeploymentError> {
        let strategy = self.strategy;
        let publish_output = publish_output.to_path_buf();
        let target = target.clone();

        let report = tokio::task::spawn_blocking(move || match strategy {
            SwapStrategy::Staged => staged_swap(&publish_output, &target),
            SwapStrategy::Replace => replace_swap(&publish_output, &target),
        })
        .await??;

        tracing::info!(
            strategy = ?report.strategy,
            files = report.files_copied,
            previous_retained = report.previous_retained,
            "deployment swapped"
        );
        Ok(report)
    }

    /// Exchange the live release with the retained previous one
    pub async fn rollback(&self, target: &DeploymentTarget) -> Result<(), DeploymentError> {
        let target = target.clone();
        tokio::task::spawn_blocking(move || rollback_blocking(&target)).await??;
        tracing::info!("rolled back to previous deployment");
        Ok(())
    }
}

fn io_err(op: &'static str, path: &Path) -> impl FnOnce(io::Error) -> DeploymentError {
    let path = path.to_path_buf();
    move |source| DeploymentError::Io { op, path, source }
}

fn ensure_publish_output(publish_output: &Path) -> Result<(), DeploymentError> {
    if publish_output.is_dir() {
        Ok(())
    } else {
        Err(DeploymentError::MissingPublishOutput(
            publish_output.to_path_buf(),
        ))
    }
}

/// Assemble the release beside the target, then rename it into place
fn staged_swap(
    publish_output: &Path,
    target: &DeploymentTarget,
) -> Result<SwapReport, DeploymentError> {
    ensure_publish_output(publish_output)?;

    let live = target.path();
    let staging = target.staging_path();
    let previous = target.previous_path();

    if let Some(parent) = live.parent() {
        fs::create_dir_all(parent).map_err(io_err("create", parent))?;
    }
    // Leftover from an interrupted swap
    if staging.exists() {
        fs::remove_dir_all(&staging).map_err(io_err("remove", &staging))?;
    }

    let files_copied = match copy_tree(publish_output, &staging) {
        Ok(n) => n,
        Err(e) => {
            let _ = fs::remove_dir_all(&staging);
            return Err(e);
        }
    };

    let previous_retained = live.exists();
    if previous_retained {
        if previous.exists() {
            fs::remove_dir_all(&previous).map_err(io_err("remove", &previous))?;
        }
        fs::rename(live, &previous).map_err(io_err("retire", live))?;
    }

    if let Err(source) = fs::rename(&staging, live) {
        // Put the old release back so the target is never left empty
        if previous_retained {
            if let Err(e) = fs::rename(&previous, live) {
                tracing::error!(error = %e, "failed to restore previous deployment");
            }
        }
        return Err(DeploymentError::Io {
            op: "activate",
            path: live.to_path_buf(),
            source,
        });
    }

    Ok(SwapReport {
        strategy: SwapStrategy::Staged,
        files_copied,
        previous_retained,
    })
}

/// Clear the target in place and copy the release into it.
///
/// Not transactional: a failure part way leaves the target incomplete.
fn replace_swap(
    publish_output: &Path,
    target: &DeploymentTarget,
) -> Result<SwapReport, DeploymentError> {
    ensure_publish_output(publish_output)?;

    let live = target.path();
    if live.exists() {
        for entry in fs::read_dir(live).map_err(io_err("read", live))? {
            let entry = entry.map_err(io_err("read", live))?;
            let path = entry.path();
            if entry.file_type().map_err(io_err("stat", &path))?.is_file() {
                fs::remove_file(&path).map_err(io_err("remove", &path))?;
            }
        }
        fs::remove_dir_all(live).map_err(io_err("remove", live))?;
    }
    fs::create_dir_all(live).map_err(io_err("create", live))?;

    let files_copied = copy_tree(publish_output, live)?;

    Ok(SwapReport {
        strategy: SwapStrategy::Replace,
        files_copied,
        previous_retained: false,
    })
}

fn rollback_blocking(target: &DeploymentTarget) -> Result<(), DeploymentError> {
    exchange_with_previous(target, |from, to| fs::rename(from, to))
}

/// Swap live and previous through the staging path using `rename`
fn exchange_with_previous<F>(target: &DeploymentTarget, rename: F) -> Result<(), DeploymentError>
where
    F: Fn(&Path, &Path) -> io::Result<()>,
{
    let live = target.path();
    let previous = target.previous_path();
    if !previous.is_dir() {
        return Err(DeploymentError::NoPreviousDeployment(live.to_path_buf()));
    }

    // live -> staging, previous -> live, staging -> previous
    let parked = target.staging_path();
    if parked.exists() {
        fs::remove_dir_all(&parked).map_err(io_err("remove", &parked))?;
    }
    let had_live = live.exists();
    if had_live {
        rename(live, &parked).map_err(io_err("park", live))?;
    }
    if let Err(source) = rename(&previous, live) {
        // Put the parked release back so the target is never left empty
        if had_live {
            if let Err(e) = rename(&parked, live) {
                tracing::error!(error = %e, "failed to restore live deployment");
            }
        }
        return Err(DeploymentError::Io {
            op: "restore",
            path: previous,
            source,
        });
    }
    if had_live {
        rename(&parked, &previous).map_err(io_err("retire", &parked))?;
    }
    Ok(())
}

/// Recursively copy `src` into `dst`, overwriting existing entries.
///
/// Symlinks are recreated as links, never followed. Returns the number of
/// files and links copied.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<usize, DeploymentError> {
    fs::create_dir_all(dst).map_err(io_err("create", dst))?;

    let mut copied = 0;
    for entry in fs::read_dir(src).map_err(io_err("read", src))? {
        let entry = entry.map_err(io_err("read", src))?;
        let from = entry.path();
        let to = dst.join(entry.file_name());
        let file_type = entry.file_type().map_err(io_err("stat", &from))?;

        if file_type.is_symlink() {
            let link = fs::read_link(&from).map_err(io_err("read link", &from))?;
            remove_existing(&to)?;
            std::os::unix::fs::symlink(&link, &to).map_err(io_err("link", &to))?;
            copied += 1;
        } else if file_type.is_dir() {
            copied += copy_tree(&from, &to)?;
        } else {
            // A link at the destination would be written through
            if fs::symlink_metadata(&to).is_ok_and(|m| m.file_type().is_symlink()) {
                remove_existing(&to)?;
            }
            fs::copy(&from, &to).map_err(io_err("copy", &from))?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Remove whatever sits at `path` without following links
fn remove_existing(path: &Path) -> Result<(), DeploymentError> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path).map_err(io_err("remove", path)),
        Ok(_) => fs::remove_file(path).map_err(io_err("remove", path)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(DeploymentError::Io {
            op: "stat",
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

#[cfg(test)]
#[path = "deploy_tests.rs"]
mod tests;
