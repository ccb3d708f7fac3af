// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `quayd serve` - Run the webhook daemon

use std::future::Future;
use std::path::Path;

use anyhow::Result;
use quay_daemon::lifecycle::{self, Config};
use quay_daemon::logging::{setup_daemon_logging, write_startup_error, write_startup_marker};
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

use super::load_config;

pub async fn handle(config_path: &Path) -> Result<()> {
    let deploy = load_config(config_path)?;
    let config = Config::for_config_file(config_path)?;

    // Write startup marker to log (before tracing setup)
    write_startup_marker(&config.log_path)?;

    // Set up logging
    let log_guard = setup_daemon_logging(&config.log_path)?;

    info!("Starting quayd for config: {}", config.config_path.display());

    let daemon = match lifecycle::startup(&config, &deploy).await {
        Ok(d) => d,
        Err(e) => {
            // Write error synchronously (tracing is non-blocking and may not flush in time)
            write_startup_error(&config.log_path, &e);
            error!("Failed to start daemon: {}", e);
            drop(log_guard);
            return Err(e.into());
        }
    };

    // Handlers go in before READY so an early SIGTERM still shuts down cleanly
    let shutdown = shutdown_signal()?;

    info!("Daemon ready, listening on {}", daemon.local_addr()?);

    // Signal ready for a parent process waiting on startup
    println!("READY");

    daemon.serve(shutdown).await?;

    info!("Daemon stopped");
    drop(log_guard);
    Ok(())
}

/// Resolves on the first SIGTERM or SIGINT
fn shutdown_signal() -> std::io::Result<impl Future<Output = ()> + Send + 'static> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    Ok(async move {
        tokio::select! {
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
            _ = sigint.recv() => info!("Received SIGINT, shutting down..."),
        }
    })
}
