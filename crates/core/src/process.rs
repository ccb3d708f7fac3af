// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Results of external process runs

use serde::Serialize;
use std::fmt;

/// Which output stream a line came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStream {
    Stdout,
    Stderr,
}

impl fmt::Display for OutputStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputStream::Stdout => f.write_str("stdout"),
            OutputStream::Stderr => f.write_str("stderr"),
        }
    }
}

/// Render a command and its arguments for logs and error messages.
///
/// Arguments containing whitespace are shown quoted; nothing is ever passed
/// through a shell.
pub fn render_command_line(command: &str, args: &[String]) -> String {
    let mut line = command.to_string();
    for arg in args {
        line.push(' ');
        if arg.is_empty() || arg.contains(char::is_whitespace) {
            line.push('"');
            line.push_str(arg);
            line.push('"');
        } else {
            line.push_str(arg);
        }
    }
    line
}

/// Captured result of one finished process
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ProcessResult {
    pub exit_code: i32,
    pub stdout_lines: Vec<String>,
    pub stderr_lines: Vec<String>,
}

impl ProcessResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Last `n` stderr lines, oldest first
    pub fn stderr_tail(&self, n: usize) -> &[String] {
        let start = self.stderr_lines.len().saturating_sub(n);
        &self.stderr_lines[start..]
    }
}
