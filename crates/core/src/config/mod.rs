// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration modules

mod deploy;

pub use deploy::{
    BuildSection, ConfigError, DeployConfig, DeploySection, RepositorySection, ServerSection,
    SwapStrategy,
};
