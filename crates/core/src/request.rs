// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline request
//!
//! One request is built per push notification and never changes afterwards.
//! Branch names reach git as plain arguments, so they are validated here.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Errors from building a request
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("repository url is empty")]
    EmptyRepositoryUrl,
    #[error("branch name is empty")]
    EmptyBranch,
    #[error("invalid branch name {0:?}")]
    InvalidBranch(String),
    #[error("unknown build configuration {0:?} (expected Debug or Release)")]
    UnknownConfiguration(String),
}

/// Toolchain build configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildConfiguration {
    Debug,
    #[default]
    Release,
}

impl BuildConfiguration {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildConfiguration::Debug => "Debug",
            BuildConfiguration::Release => "Release",
        }
    }
}

impl fmt::Display for BuildConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildConfiguration {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(BuildConfiguration::Debug),
            "release" => Ok(BuildConfiguration::Release),
            _ => Err(RequestError::UnknownConfiguration(s.to_string())),
        }
    }
}

/// A resolved request to run the pipeline once
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineRequest {
    repository_url: String,
    local_path: PathBuf,
    branch: String,
    build_configuration: BuildConfiguration,
}

impl PipelineRequest {
    pub fn new(
        repository_url: impl Into<String>,
        local_path: impl Into<PathBuf>,
        branch: impl Into<String>,
        build_configuration: BuildConfiguration,
    ) -> Result<Self, RequestError> {
        let repository_url = repository_url.into();
        if repository_url.trim().is_empty() {
            return Err(RequestError::EmptyRepositoryUrl);
        }

        let branch = branch.into();
        validate_branch(&branch)?;

        Ok(Self {
            repository_url,
            local_path: local_path.into(),
            branch,
            build_configuration,
        })
    }

    pub fn repository_url(&self) -> &str {
        &self.repository_url
    }

    pub fn local_path(&self) -> &Path {
        &self.local_path
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    pub fn build_configuration(&self) -> BuildConfiguration {
        self.build_configuration
    }
}

/// Check that a branch name is safe to hand to git as an argument.
///
/// This is a subset of `git check-ref-format --branch`: it rejects names git
/// would refuse anyway plus anything that could be read as an option.
pub fn validate_branch(branch: &str) -> Result<(), RequestError> {
    if branch.is_empty() {
        return Err(RequestError::EmptyBranch);
    }

    let invalid = branch.starts_with('-')
        || branch.starts_with('/')
        || branch.ends_with('/')
        || branch.ends_with('.')
        || branch.ends_with(".lock")
        || branch.contains("..")
        || branch.contains("@{")
        || branch.contains("//")
        || branch
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || "~^:?*[\\".contains(c));

    if invalid {
        return Err(RequestError::InvalidBranch(branch.to_string()));
    }
    Ok(())
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
