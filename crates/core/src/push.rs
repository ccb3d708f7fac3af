// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Push notification parsing
//!
//! Accepts the JSON body of a repository push webhook (GitHub / Gitea style).
//! Form-encoded deliveries carry the same JSON in a `payload` field; the HTTP
//! layer decodes the form and hands the field to [`PushNotification::from_json`].
//!
//! Branch normalization is explicit: only `refs/heads/<name>` refs name a
//! branch. Tags and other refs are reported as non-branch pushes.

use serde::Deserialize;
use thiserror::Error;

const BRANCH_PREFIX: &str = "refs/heads/";
const TAG_PREFIX: &str = "refs/tags/";

/// Errors from parsing a push payload
#[derive(Debug, Error)]
pub enum PushError {
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("payload is missing {0}")]
    MissingField(&'static str),
}

#[derive(Debug, Deserialize)]
struct RawPush {
    #[serde(rename = "ref")]
    git_ref: Option<String>,
    after: Option<String>,
    #[serde(default)]
    deleted: bool,
    repository: Option<RawRepository>,
}

#[derive(Debug, Deserialize)]
struct RawRepository {
    full_name: Option<String>,
    clone_url: Option<String>,
}

/// The parts of a push notification the orchestrator acts on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushNotification {
    pub git_ref: String,
    pub repository: String,
    pub clone_url: Option<String>,
    pub after: Option<String>,
    pub deleted: bool,
}

impl PushNotification {
    /// Parse a JSON push payload
    pub fn from_json(body: &[u8]) -> Result<Self, PushError> {
        let raw: RawPush = serde_json::from_slice(body)?;

        let git_ref = non_empty(raw.git_ref).ok_or(PushError::MissingField("ref"))?;
        let repository = raw.repository.ok_or(PushError::MissingField("repository"))?;
        let full_name =
            non_empty(repository.full_name).ok_or(PushError::MissingField("repository.full_name"))?;

        Ok(Self {
            git_ref,
            repository: full_name,
            clone_url: non_empty(repository.clone_url),
            after: non_empty(raw.after),
            deleted: raw.deleted,
        })
    }

    /// Branch name for `refs/heads/*` refs
    pub fn branch(&self) -> Option<&str> {
        branch_from_ref(&self.git_ref)
    }

    pub fn is_tag(&self) -> bool {
        self.git_ref.starts_with(TAG_PREFIX)
    }

    /// Abbreviated head commit, when the payload carried one
    pub fn short_sha(&self) -> Option<&str> {
        self.after
            .as_deref()
            .map(|sha| sha.get(..8).unwrap_or(sha))
    }
}

/// Strip the `refs/heads/` prefix from a fully qualified ref
pub fn branch_from_ref(git_ref: &str) -> Option<&str> {
    git_ref
        .strip_prefix(BRANCH_PREFIX)
        .filter(|branch| !branch.is_empty())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
#[path = "push_tests.rs"]
mod tests;
