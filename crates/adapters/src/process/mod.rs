// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! External process execution

mod system;

pub use system::SystemProcessRunner;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeProcessRunner, ProcessCall};

use async_trait::async_trait;
use quay_core::{render_command_line, OutputStream, ProcessResult};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors from running an external command
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{}` exited with code {exit_code}", render_command_line(.command, .args))]
    Exited {
        command: String,
        args: Vec<String>,
        exit_code: i32,
        result: ProcessResult,
    },
    #[error("`{}` timed out after {timeout:?}", render_command_line(.command, .args))]
    TimedOut {
        command: String,
        args: Vec<String>,
        timeout: Duration,
    },
    #[error("failed to read output of `{command}`: {source}")]
    Output {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

impl ProcessError {
    /// Captured output, when the process ran to completion
    pub fn result(&self) -> Option<&ProcessResult> {
        match self {
            ProcessError::Exited { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ProcessError::Exited { exit_code, .. } => Some(*exit_code),
            _ => None,
        }
    }
}

/// Receives output lines while a process is still running
pub trait OutputObserver: Send + Sync {
    fn on_line(&self, command: &str, stream: OutputStream, line: &str);
}

/// Forwards process output to the tracing subscriber
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl OutputObserver for TracingObserver {
    fn on_line(&self, command: &str, stream: OutputStream, line: &str) {
        match stream {
            OutputStream::Stdout => tracing::info!(target: "quay::output", command, "{}", line),
            OutputStream::Stderr => tracing::warn!(target: "quay::output", command, "{}", line),
        }
    }
}

/// Runs one external command to completion
#[async_trait]
pub trait ProcessRunner: Clone + Send + Sync + 'static {
    /// Run `command` with `args` in `working_dir`.
    ///
    /// Blocks until the process exits (or `timeout` expires, which kills it).
    /// A nonzero exit code is an error carrying the captured output.
    async fn run(
        &self,
        command: &str,
        args: &[String],
        working_dir: &Path,
        timeout: Option<Duration>,
    ) -> Result<ProcessResult, ProcessError>;
}
