// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! quay-core: data model for the Quay deployment orchestrator
//!
//! This crate provides:
//! - The immutable pipeline request and its build configuration
//! - Declarative stage definitions and the canonical stage list
//! - Process results and pipeline outcomes
//! - Push-notification parsing and TOML configuration

pub mod config;
pub mod outcome;
pub mod process;
pub mod push;
pub mod request;
pub mod stage;
pub mod target;

pub use config::{
    BuildSection, ConfigError, DeployConfig, DeploySection, RepositorySection, ServerSection,
    SwapStrategy,
};
pub use outcome::{stage_names, PipelineOutcome};
pub use process::{render_command_line, OutputStream, ProcessResult};
pub use push::{PushError, PushNotification};
pub use request::{BuildConfiguration, PipelineRequest, RequestError};
pub use stage::{canonical_stages, Stage};
pub use target::DeploymentTarget;
