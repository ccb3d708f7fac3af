// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Quay pipeline engine

mod coordinator;
mod deploy;
mod error;
mod lock;
mod queue;
mod sequencer;
mod status;
mod sync;

pub use coordinator::{PipelineCoordinator, PipelineSettings, RunSummary};
pub use deploy::{copy_tree, DeploymentError, DeploymentSwapper, SwapReport};
pub use error::PipelineError;
pub use lock::{PathGuard, PathLocks};
pub use queue::{PipelineQueue, Submission};
pub use sequencer::{StageFailure, StageReport, StageSequencer, STDERR_TAIL_LINES};
pub use status::{PathStatus, RunRecord, StatusBoard, StatusSnapshot};
pub use sync::{SourceSynchronizer, SyncAction, SyncError, WorkingCopyState, DEFAULT_REMOTE};
