// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake process runner for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{ProcessError, ProcessRunner};
use async_trait::async_trait;
use quay_core::{render_command_line, ProcessResult};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Recorded process invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessCall {
    pub command: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    pub timeout: Option<Duration>,
}

impl ProcessCall {
    pub fn command_line(&self) -> String {
        render_command_line(&self.command, &self.args)
    }
}

type Effect = Arc<dyn Fn(&ProcessCall) + Send + Sync>;

#[derive(Clone)]
enum Behavior {
    Fail(i32),
    TimeOut,
    Stdout(Vec<String>),
    Effect(Effect),
}

/// A behavior applied to calls whose command line contains `pattern`
#[derive(Clone)]
struct Rule {
    pattern: String,
    behavior: Behavior,
}

/// Fake process runner for testing
///
/// Every call succeeds with empty output unless a rule matches its command
/// line. Rules are substring matches on the rendered command line.
#[derive(Clone, Default)]
pub struct FakeProcessRunner {
    calls: Arc<Mutex<Vec<ProcessCall>>>,
    rules: Arc<Mutex<Vec<Rule>>>,
    delay: Option<Duration>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl FakeProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exit with `exit_code` when the command line contains `pattern`
    pub fn fail_on(self, pattern: impl Into<String>, exit_code: i32) -> Self {
        self.push_rule(pattern, Behavior::Fail(exit_code))
    }

    /// Report a timeout when the command line contains `pattern`
    pub fn time_out_on(self, pattern: impl Into<String>) -> Self {
        self.push_rule(pattern, Behavior::TimeOut)
    }

    /// Produce `lines` on stdout when the command line contains `pattern`
    pub fn stdout_on<I, S>(self, pattern: impl Into<String>, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lines = lines.into_iter().map(Into::into).collect();
        self.push_rule(pattern, Behavior::Stdout(lines))
    }

    /// Run `effect` when the command line contains `pattern`
    pub fn on_run<F>(self, pattern: impl Into<String>, effect: F) -> Self
    where
        F: Fn(&ProcessCall) + Send + Sync + 'static,
    {
        self.push_rule(pattern, Behavior::Effect(Arc::new(effect)))
    }

    /// Hold every call open for `delay` before completing
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<ProcessCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Recorded calls rendered as command lines
    pub fn command_lines(&self) -> Vec<String> {
        self.calls().iter().map(ProcessCall::command_line).collect()
    }

    /// Highest number of calls that were running at the same time
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn push_rule(self, pattern: impl Into<String>, behavior: Behavior) -> Self {
        self.rules
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Rule {
                pattern: pattern.into(),
                behavior,
            });
        self
    }

    fn matching(&self, line: &str) -> Vec<Behavior> {
        self.rules
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|rule| line.contains(&rule.pattern))
            .map(|rule| rule.behavior.clone())
            .collect()
    }
}

#[async_trait]
impl ProcessRunner for FakeProcessRunner {
    async fn run(
        &self,
        command: &str,
        args: &[String],
        working_dir: &Path,
        timeout: Option<Duration>,
    ) -> Result<ProcessResult, ProcessError> {
        let call = ProcessCall {
            command: command.to_string(),
            args: args.to_vec(),
            working_dir: working_dir.to_path_buf(),
            timeout,
        };
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call.clone());

        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let mut result = ProcessResult::default();
        let mut error = None;
        for behavior in self.matching(&call.command_line()) {
            match behavior {
                Behavior::Effect(effect) => effect(&call),
                Behavior::Stdout(lines) => result.stdout_lines.extend(lines),
                Behavior::Fail(exit_code) if error.is_none() => {
                    error = Some(ProcessError::Exited {
                        command: call.command.clone(),
                        args: call.args.clone(),
                        exit_code,
                        result: ProcessResult {
                            exit_code,
                            stdout_lines: Vec::new(),
                            stderr_lines: vec![format!("simulated failure: {}", call.command_line())],
                        },
                    });
                }
                Behavior::TimeOut if error.is_none() => {
                    error = Some(ProcessError::TimedOut {
                        command: call.command.clone(),
                        args: call.args.clone(),
                        timeout: timeout.unwrap_or_default(),
                    });
                }
                Behavior::Fail(_) | Behavior::TimeOut => {}
            }
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match error {
            Some(e) => Err(e),
            None => Ok(result),
        }
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
