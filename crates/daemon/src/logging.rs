// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Logging setup for `quayd`

use std::io::Write;
use std::path::Path;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::lifecycle::LifecycleError;

/// Startup marker prefix written to log before anything else.
/// Full format: "--- quayd: starting (pid: 12345) ---"
pub const STARTUP_MARKER_PREFIX: &str = "--- quayd: starting (pid: ";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Write startup marker to log file (appends to existing log)
pub fn write_startup_marker(log_path: &Path) -> Result<(), LifecycleError> {
    // Create log directory if needed
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;
    writeln!(file, "{}{}) ---", STARTUP_MARKER_PREFIX, std::process::id())?;

    Ok(())
}

/// Write startup error synchronously to log file.
/// The non-blocking writer may not flush before the process exits.
pub fn write_startup_error(log_path: &Path, error: &LifecycleError) {
    let Ok(mut file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
    else {
        return;
    };
    let _ = writeln!(file, "ERROR Failed to start daemon: {}", error);
}

/// Log to stderr and to `log_path` for the long-running daemon.
///
/// The returned guard flushes the file writer when dropped.
pub fn setup_daemon_logging(
    log_path: &Path,
) -> Result<tracing_appender::non_blocking::WorkerGuard, LifecycleError> {
    let dir = log_path.parent().ok_or(LifecycleError::NoStateDir)?;
    let file_name = log_path.file_name().ok_or(LifecycleError::NoStateDir)?;
    std::fs::create_dir_all(dir)?;

    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
        .init();

    Ok(guard)
}

/// Log to stderr only, for one-shot commands
pub fn setup_stderr_logging() {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
