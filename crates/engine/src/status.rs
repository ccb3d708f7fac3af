// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status board of queued, running and finished runs

use chrono::{DateTime, Utc};
use quay_core::{BuildConfiguration, PipelineOutcome, PipelineRequest};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// One run as shown on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunRecord {
    pub run_id: Uuid,
    pub branch: String,
    pub configuration: BuildConfiguration,
    pub submitted_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub outcome: Option<PipelineOutcome>,
}

impl RunRecord {
    pub fn new(run_id: Uuid, request: &PipelineRequest) -> Self {
        Self {
            run_id,
            branch: request.branch().to_string(),
            configuration: request.build_configuration(),
            submitted_at: Utc::now(),
            started_at: None,
            finished_at: None,
            outcome: None,
        }
    }
}

/// Runs for one working copy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PathStatus {
    pub running: Option<RunRecord>,
    pub pending: Option<RunRecord>,
    pub last: Option<RunRecord>,
}

/// Point-in-time copy of the board
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    pub working_copies: BTreeMap<PathBuf, PathStatus>,
    pub succeeded: u64,
    pub failed: u64,
    pub superseded: u64,
}

impl StatusSnapshot {
    pub fn is_idle(&self) -> bool {
        self.working_copies
            .values()
            .all(|s| s.running.is_none() && s.pending.is_none())
    }
}

/// Shared, cloneable status board
#[derive(Clone, Default)]
pub struct StatusBoard {
    inner: Arc<Mutex<StatusSnapshot>>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        self.lock().clone()
    }

    pub(crate) fn started(&self, local_path: &Path, mut record: RunRecord) {
        record.started_at = Some(Utc::now());
        self.entry(local_path, |status| status.running = Some(record));
    }

    /// Put `record` in the pending slot, returning the run it displaced
    pub(crate) fn queued(&self, local_path: &Path, record: RunRecord) -> Option<Uuid> {
        let mut snapshot = self.lock();
        let status = snapshot
            .working_copies
            .entry(local_path.to_path_buf())
            .or_default();
        let replaced = status.pending.replace(record).map(|r| r.run_id);
        if replaced.is_some() {
            snapshot.superseded += 1;
        }
        replaced
    }

    /// Move the pending run, if any, into the running slot
    pub(crate) fn promote(&self, local_path: &Path) -> Option<Uuid> {
        let mut snapshot = self.lock();
        let status = snapshot.working_copies.get_mut(local_path)?;
        let mut record = status.pending.take()?;
        record.started_at = Some(Utc::now());
        let run_id = record.run_id;
        status.running = Some(record);
        Some(run_id)
    }

    pub(crate) fn finished(&self, local_path: &Path, outcome: PipelineOutcome) {
        let mut snapshot = self.lock();
        if outcome.succeeded {
            snapshot.succeeded += 1;
        } else {
            snapshot.failed += 1;
        }
        let status = snapshot
            .working_copies
            .entry(local_path.to_path_buf())
            .or_default();
        if let Some(mut record) = status.running.take() {
            record.finished_at = Some(Utc::now());
            record.outcome = Some(outcome);
            status.last = Some(record);
        }
    }

    fn entry(&self, local_path: &Path, f: impl FnOnce(&mut PathStatus)) {
        let mut snapshot = self.lock();
        f(snapshot
            .working_copies
            .entry(local_path.to_path_buf())
            .or_default());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StatusSnapshot> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
