// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deployment configuration
//!
//! Loaded from a TOML file. Relative `local_path` and `deploy.path` resolve
//! against the directory holding the file; `build.publish_dir` resolves
//! against the working copy.

use crate::request::{validate_branch, BuildConfiguration, PipelineRequest, RequestError};
use crate::target::DeploymentTarget;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors from loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// How the deployment directory is replaced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwapStrategy {
    /// Assemble next to the target, then rename into place
    #[default]
    Staged,
    /// Delete the target and copy over it
    Replace,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepositorySection {
    pub url: String,
    /// `owner/name` a webhook must report, when set
    #[serde(default)]
    pub full_name: Option<String>,
    pub local_path: PathBuf,
    /// Branches that trigger a run; empty means every branch
    #[serde(default)]
    pub branches: Vec<String>,
    #[serde(default, with = "humantime_serde")]
    pub sync_timeout: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildSection {
    #[serde(default)]
    pub configuration: BuildConfiguration,
    #[serde(default = "default_toolchain")]
    pub toolchain: String,
    #[serde(default, with = "humantime_serde")]
    pub stage_timeout: Option<Duration>,
    #[serde(default = "default_publish_dir")]
    pub publish_dir: PathBuf,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            configuration: BuildConfiguration::default(),
            toolchain: default_toolchain(),
            stage_timeout: None,
            publish_dir: default_publish_dir(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeploySection {
    pub path: PathBuf,
    #[serde(default)]
    pub strategy: SwapStrategy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

/// Complete orchestrator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeployConfig {
    pub repository: RepositorySection,
    #[serde(default)]
    pub build: BuildSection,
    pub deploy: DeploySection,
    #[serde(default)]
    pub server: ServerSection,
}

fn default_toolchain() -> String {
    "dotnet".to_string()
}

fn default_publish_dir() -> PathBuf {
    PathBuf::from("publish")
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

impl DeployConfig {
    /// Read, resolve, and validate a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let mut config = Self::parse(&content)?;
        config.resolve_paths(base);
        config.validate()?;
        Ok(config)
    }

    /// Parse TOML without resolving paths or validating
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Anchor relative paths at `base`
    pub fn resolve_paths(&mut self, base: &Path) {
        if self.repository.local_path.is_relative() {
            self.repository.local_path = base.join(&self.repository.local_path);
        }
        if self.deploy.path.is_relative() {
            self.deploy.path = base.join(&self.deploy.path);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.repository.url.trim().is_empty() {
            return Err(ConfigError::Invalid("repository.url is empty".to_string()));
        }
        for branch in &self.repository.branches {
            validate_branch(branch).map_err(|e| {
                ConfigError::Invalid(format!("repository.branches: {}", e))
            })?;
        }
        if self.build.toolchain.trim().is_empty() {
            return Err(ConfigError::Invalid("build.toolchain is empty".to_string()));
        }
        if self.repository.sync_timeout == Some(Duration::ZERO) {
            return Err(ConfigError::Invalid(
                "repository.sync_timeout must be greater than 0".to_string(),
            ));
        }
        if self.build.stage_timeout == Some(Duration::ZERO) {
            return Err(ConfigError::Invalid(
                "build.stage_timeout must be greater than 0".to_string(),
            ));
        }

        // The publish dir is removed before every build
        if self
            .build
            .publish_dir
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(ConfigError::Invalid(format!(
                "build.publish_dir {} must not contain '..'",
                self.build.publish_dir.display()
            )));
        }

        let working_copy = &normalize(&self.repository.local_path);
        let publish = normalize(&self.resolved_publish_dir());
        let deploy = &normalize(&self.deploy.path);

        if overlaps(deploy, working_copy) {
            return Err(ConfigError::Invalid(format!(
                "deploy.path {} overlaps the working copy {}",
                deploy.display(),
                working_copy.display()
            )));
        }
        if overlaps(deploy, &publish) {
            return Err(ConfigError::Invalid(format!(
                "deploy.path {} overlaps the publish directory {}",
                deploy.display(),
                publish.display()
            )));
        }
        if working_copy.starts_with(&publish) {
            return Err(ConfigError::Invalid(format!(
                "build.publish_dir {} must not be the working copy or one of its parents",
                publish.display()
            )));
        }

        Ok(())
    }

    /// Publish output directory, anchored at the working copy
    pub fn resolved_publish_dir(&self) -> PathBuf {
        self.repository.local_path.join(&self.build.publish_dir)
    }

    pub fn deployment_target(&self) -> DeploymentTarget {
        DeploymentTarget::new(&self.deploy.path)
    }

    /// Whether a push to `branch` should trigger a run
    pub fn accepts_branch(&self, branch: &str) -> bool {
        self.repository.branches.is_empty()
            || self.repository.branches.iter().any(|b| b == branch)
    }

    /// Whether a push from repository `full_name` should trigger a run
    pub fn accepts_repository(&self, full_name: &str) -> bool {
        match &self.repository.full_name {
            Some(expected) => expected.eq_ignore_ascii_case(full_name),
            None => true,
        }
    }

    /// Build a request for `branch` with the configured build configuration
    pub fn request_for(&self, branch: &str) -> Result<PipelineRequest, RequestError> {
        self.request_with(branch, self.build.configuration)
    }

    pub fn request_with(
        &self,
        branch: &str,
        configuration: BuildConfiguration,
    ) -> Result<PipelineRequest, RequestError> {
        PipelineRequest::new(
            &self.repository.url,
            &self.repository.local_path,
            branch,
            configuration,
        )
    }
}

/// Drop `.` components and fold `..` into its parent without touching disk
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() && !out.has_root() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// True when either path is equal to or nested inside the other
fn overlaps(a: &Path, b: &Path) -> bool {
    a.starts_with(b) || b.starts_with(a)
}

#[cfg(test)]
#[path = "deploy_tests.rs"]
mod tests;
