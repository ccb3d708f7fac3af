// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coalescing work queue in front of the coordinator
//!
//! Each working copy has one lane: a running pipeline plus a single pending
//! slot. A newer submission replaces whatever is pending, since only the
//! latest push matters once the earlier one has not started yet.

use crate::coordinator::PipelineCoordinator;
use crate::status::{RunRecord, StatusBoard, StatusSnapshot};
use quay_adapters::{ProcessRunner, RepoAdapter};
use quay_core::PipelineRequest;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use uuid::Uuid;

/// How a submission was accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// Nothing was running for the working copy; the run started now
    Started { run_id: Uuid },
    /// Waiting behind the running pipeline
    Queued { run_id: Uuid },
    /// Waiting behind the running pipeline, displacing an older pending run
    Superseded { run_id: Uuid, replaced: Uuid },
}

impl Submission {
    pub fn run_id(&self) -> Uuid {
        match self {
            Submission::Started { run_id }
            | Submission::Queued { run_id }
            | Submission::Superseded { run_id, .. } => *run_id,
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            Submission::Started { .. } => "started",
            Submission::Queued { .. } => "queued",
            Submission::Superseded { .. } => "superseded",
        }
    }
}

#[derive(Default)]
struct Lane {
    pending: Option<(Uuid, PipelineRequest)>,
}

struct Shared<R, P> {
    coordinator: PipelineCoordinator<R, P>,
    board: StatusBoard,
    /// Lanes with a running pipeline, keyed by working copy
    lanes: Mutex<HashMap<PathBuf, Lane>>,
    idle: Notify,
}

/// Accepts requests without waiting for them to run
pub struct PipelineQueue<R, P> {
    shared: Arc<Shared<R, P>>,
}

impl<R, P> Clone for PipelineQueue<R, P> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<R, P> PipelineQueue<R, P>
where
    R: RepoAdapter,
    P: ProcessRunner,
{
    pub fn new(coordinator: PipelineCoordinator<R, P>) -> Self {
        Self {
            shared: Arc::new(Shared {
                coordinator,
                board: StatusBoard::new(),
                lanes: Mutex::new(HashMap::new()),
                idle: Notify::new(),
            }),
        }
    }

    /// Start `request` now, or park it in its lane's pending slot.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&self, request: PipelineRequest) -> Submission {
        let run_id = Uuid::new_v4();
        let key = request.local_path().to_path_buf();
        let record = RunRecord::new(run_id, &request);

        let mut lanes = self.shared.lock_lanes();
        if let Some(lane) = lanes.get_mut(&key) {
            let replaced = lane.pending.replace((run_id, request)).map(|(id, _)| id);
            self.shared.board.queued(&key, record);
            tracing::info!(%run_id, local_path = %key.display(), ?replaced, "run queued");
            return match replaced {
                Some(replaced) => Submission::Superseded { run_id, replaced },
                None => Submission::Queued { run_id },
            };
        }

        lanes.insert(key.clone(), Lane::default());
        self.shared.board.started(&key, record);
        drop(lanes);

        let shared = Arc::clone(&self.shared);
        tokio::spawn(shared.drive(key, run_id, request));
        Submission::Started { run_id }
    }

    pub fn status(&self) -> StatusSnapshot {
        self.shared.board.snapshot()
    }

    pub fn is_idle(&self) -> bool {
        self.shared.lock_lanes().is_empty()
    }

    /// Resolve once nothing is running or pending
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.shared.idle.notified();
            if self.is_idle() {
                return;
            }
            notified.await;
        }
    }
}

impl<R, P> Shared<R, P>
where
    R: RepoAdapter,
    P: ProcessRunner,
{
    fn lock_lanes(&self) -> std::sync::MutexGuard<'_, HashMap<PathBuf, Lane>> {
        self.lanes.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Run the lane for `key` until its pending slot is empty
    async fn drive(self: Arc<Self>, key: PathBuf, mut run_id: Uuid, mut request: PipelineRequest) {
        loop {
            let outcome = self.coordinator.run(run_id, &request).await;

            let next = {
                let mut lanes = self.lock_lanes();
                self.board.finished(&key, outcome);
                let next = lanes.get_mut(&key).and_then(|lane| lane.pending.take());
                if next.is_some() {
                    self.board.promote(&key);
                } else {
                    lanes.remove(&key);
                }
                next.ok_or(lanes.is_empty())
            };

            match next {
                Ok((id, req)) => {
                    run_id = id;
                    request = req;
                }
                Err(all_idle) => {
                    if all_idle {
                        self.idle.notify_waiters();
                    }
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
