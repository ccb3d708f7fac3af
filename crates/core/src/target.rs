// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deployment target

use serde::Serialize;
use std::path::{Path, PathBuf};

/// The live directory serving the deployed build
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DeploymentTarget {
    path: PathBuf,
}

impl DeploymentTarget {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory name used to derive the staging and previous siblings
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "deploy".to_string())
    }

    /// Sibling directory a new release is assembled in
    pub fn staging_path(&self) -> PathBuf {
        self.sibling(&format!(".{}.staging", self.file_name()))
    }

    /// Sibling directory holding the release replaced by the last swap
    pub fn previous_path(&self) -> PathBuf {
        self.sibling(&format!(".{}.previous", self.file_name()))
    }

    fn sibling(&self, name: &str) -> PathBuf {
        match self.path.parent() {
            Some(parent) => parent.join(name),
            None => PathBuf::from(name),
        }
    }
}
