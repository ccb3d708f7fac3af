// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tokio child-process runner

use super::{OutputObserver, ProcessError, ProcessRunner, TracingObserver};
use async_trait::async_trait;
use quay_core::{OutputStream, ProcessResult};
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

/// Runs commands as child processes of the daemon
#[derive(Clone)]
pub struct SystemProcessRunner {
    observer: Arc<dyn OutputObserver>,
}

impl SystemProcessRunner {
    pub fn new() -> Self {
        Self::with_observer(Arc::new(TracingObserver))
    }

    pub fn with_observer(observer: Arc<dyn OutputObserver>) -> Self {
        Self { observer }
    }
}

impl Default for SystemProcessRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessRunner for SystemProcessRunner {
    async fn run(
        &self,
        command: &str,
        args: &[String],
        working_dir: &Path,
        timeout: Option<Duration>,
    ) -> Result<ProcessResult, ProcessError> {
        let mut child = Command::new(command)
            .args(args)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ProcessError::Spawn {
                command: command.to_string(),
                source,
            })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let observer = self.observer.as_ref();

        let completion = async {
            let (stdout_lines, stderr_lines, status) = tokio::join!(
                read_lines(stdout, command, OutputStream::Stdout, observer),
                read_lines(stderr, command, OutputStream::Stderr, observer),
                child.wait(),
            );
            Ok::<_, std::io::Error>((stdout_lines?, stderr_lines?, status?))
        };

        let completed = match timeout {
            Some(limit) => tokio::time::timeout(limit, completion).await.ok(),
            None => Some(completion.await),
        };

        let Some(completed) = completed else {
            // Timed out: the completion future is gone, so the child is ours again
            if let Err(e) = child.kill().await {
                tracing::warn!(command, error = %e, "failed to kill timed out process");
            }
            return Err(ProcessError::TimedOut {
                command: command.to_string(),
                args: args.to_vec(),
                timeout: timeout.unwrap_or_default(),
            });
        };

        let (stdout_lines, stderr_lines, status) =
            completed.map_err(|source| ProcessError::Output {
                command: command.to_string(),
                source,
            })?;

        // Killed by a signal: no exit code
        let exit_code = status.code().unwrap_or(-1);
        let result = ProcessResult {
            exit_code,
            stdout_lines,
            stderr_lines,
        };

        if exit_code != 0 {
            return Err(ProcessError::Exited {
                command: command.to_string(),
                args: args.to_vec(),
                exit_code,
                result,
            });
        }

        Ok(result)
    }
}

/// Read a stream line by line, reporting each line as it arrives.
///
/// Invalid UTF-8 is replaced rather than treated as an error.
async fn read_lines<R>(
    reader: Option<R>,
    command: &str,
    stream: OutputStream,
    observer: &dyn OutputObserver,
) -> std::io::Result<Vec<String>>
where
    R: AsyncRead + Unpin,
{
    let mut lines = Vec::new();
    let Some(reader) = reader else {
        return Ok(lines);
    };

    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf)
            .trim_end_matches(&['\r', '\n'][..])
            .to_string();
        observer.on_line(command, stream, &line);
        lines.push(line);
    }

    Ok(lines)
}

#[cfg(test)]
#[path = "system_tests.rs"]
mod tests;
