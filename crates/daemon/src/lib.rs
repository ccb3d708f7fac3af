// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Quay daemon: webhook listener, lifecycle and logging

pub mod adapters;
pub mod lifecycle;
pub mod logging;
pub mod server;

pub use adapters::{make_coordinator, DaemonCoordinator, DaemonQueue};
pub use lifecycle::{Config, DaemonState, LifecycleError};
pub use server::{router, AppState, ServerError};
