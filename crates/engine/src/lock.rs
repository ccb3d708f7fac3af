// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-path single-flight locks

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Keyed async mutexes, one per filesystem path
#[derive(Clone, Default)]
pub struct PathLocks {
    locks: Arc<Mutex<HashMap<PathBuf, Arc<AsyncMutex<()>>>>>,
}

/// Holds every lock taken by one `acquire` call until dropped
#[must_use = "the paths are unlocked as soon as the guard is dropped"]
pub struct PathGuard {
    _guards: Vec<OwnedMutexGuard<()>>,
}

impl PathLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock all `paths`, waiting for any holder to release them.
    ///
    /// Paths are locked in sorted order with duplicates removed, so callers
    /// asking for overlapping sets never deadlock.
    pub async fn acquire<I, P>(&self, paths: I) -> PathGuard
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut keys: Vec<PathBuf> = paths
            .into_iter()
            .map(|p| p.as_ref().to_path_buf())
            .collect();
        keys.sort();
        keys.dedup();

        let mut guards = Vec::with_capacity(keys.len());
        for key in keys {
            let lock = self.lock_for(key);
            guards.push(lock.lock_owned().await);
        }
        PathGuard { _guards: guards }
    }

    /// Whether `path` is currently held
    pub fn is_locked(&self, path: &Path) -> bool {
        let locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks
            .get(path)
            .is_some_and(|lock| lock.try_lock().is_err())
    }

    fn lock_for(&self, key: PathBuf) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(locks.entry(key).or_default())
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
