// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup, serving, shutdown.

use std::fs::{File, OpenOptions};
use std::future::Future;
use std::io::Write;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use quay_core::DeployConfig;
use quay_engine::PipelineQueue;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::adapters::{make_coordinator, DaemonQueue};
use crate::server::{router, AppState};

/// Daemon file layout, derived from the config file location
#[derive(Debug, Clone)]
pub struct Config {
    /// Canonical path of the TOML config
    pub config_path: PathBuf,
    /// Per-config state directory
    pub state_dir: PathBuf,
    /// Path to lock/PID file
    pub lock_path: PathBuf,
    /// Path to version file
    pub version_path: PathBuf,
    /// Path to daemon log file
    pub log_path: PathBuf,
}

impl Config {
    /// Layout under the default state root
    pub fn for_config_file(config_path: &Path) -> Result<Self, LifecycleError> {
        Self::with_state_root(config_path, &state_root()?)
    }

    /// Layout under an explicit state root
    pub fn with_state_root(config_path: &Path, state_root: &Path) -> Result<Self, LifecycleError> {
        let canonical = config_path
            .canonicalize()
            .map_err(|e| LifecycleError::ConfigNotFound(config_path.to_path_buf(), e))?;

        let state_dir = state_root.join(config_hash(&canonical));

        Ok(Self {
            config_path: canonical,
            lock_path: state_dir.join("quayd.pid"),
            version_path: state_dir.join("quayd.version"),
            log_path: state_dir.join("quayd.log"),
            state_dir,
        })
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Config not found at {0}: {1}")]
    ConfigNotFound(PathBuf, std::io::Error),

    #[error("Could not determine state directory")]
    NoStateDir,

    #[error("Failed to acquire lock: another quayd is using this config?")]
    LockFailed(#[source] std::io::Error),

    #[error("Failed to bind {0}: {1}")]
    BindFailed(SocketAddr, std::io::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Exclusive hold on the PID file, released when dropped
pub struct ProcessLock {
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    file: File,
    path: PathBuf,
}

impl ProcessLock {
    /// Take the lock for `config`, writing our PID into it
    pub fn acquire(config: &Config) -> Result<Self, LifecycleError> {
        std::fs::create_dir_all(&config.state_dir)?;

        // Open without truncating: the file may belong to a live daemon
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&config.lock_path)?;
        file.try_lock_exclusive()
            .map_err(LifecycleError::LockFailed)?;

        file.set_len(0)?;
        writeln!(file, "{}", std::process::id())?;

        Ok(Self {
            file,
            path: config.lock_path.clone(),
        })
    }

    /// Remove the PID file; the lock itself goes with the handle
    pub fn release(self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!("Failed to remove PID file: {}", e);
        }
    }
}

/// Daemon state during operation
pub struct DaemonState {
    pub config: Config,
    lock: ProcessLock,
    listener: TcpListener,
    deploy: DeployConfig,
    queue: DaemonQueue,
}

impl DaemonState {
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn queue(&self) -> &DaemonQueue {
        &self.queue
    }

    /// Serve webhooks until `shutdown` resolves, then drain the queue
    pub async fn serve<F>(self, shutdown: F) -> Result<(), LifecycleError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let DaemonState {
            config,
            lock,
            listener,
            deploy,
            queue,
        } = self;

        let app = router(AppState::new(deploy, queue.clone()));
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Stopped accepting webhooks, waiting for runs to finish...");
        queue.wait_idle().await;

        shutdown_files(&config, lock);
        info!("Daemon shutdown complete");
        Ok(())
    }
}

/// Start the daemon
pub async fn startup(config: &Config, deploy: &DeployConfig) -> Result<DaemonState, LifecycleError> {
    match startup_inner(config, deploy).await {
        Ok(state) => Ok(state),
        Err(e) => {
            // Clean up any resources created before failure
            cleanup_on_failure(config);
            Err(e)
        }
    }
}

/// Inner startup logic - cleanup_on_failure called if this fails
async fn startup_inner(
    config: &Config,
    deploy: &DeployConfig,
) -> Result<DaemonState, LifecycleError> {
    // 1. Acquire lock file FIRST - prevents races
    let lock = ProcessLock::acquire(config)?;

    // 2. Write version file
    std::fs::write(&config.version_path, env!("CARGO_PKG_VERSION"))?;

    // 3. Wire the pipeline
    let queue = PipelineQueue::new(make_coordinator(deploy));

    // 4. Bind (LAST - only after all setup passes)
    let listen = deploy.server.listen;
    let listener = TcpListener::bind(listen)
        .await
        .map_err(|e| LifecycleError::BindFailed(listen, e))?;

    info!(
        "Daemon started for config: {}",
        config.config_path.display()
    );

    Ok(DaemonState {
        config: config.clone(),
        lock,
        listener,
        deploy: deploy.clone(),
        queue,
    })
}

/// Remove PID and version files on clean exit
fn shutdown_files(config: &Config, lock: ProcessLock) {
    if config.version_path.exists() {
        if let Err(e) = std::fs::remove_file(&config.version_path) {
            warn!("Failed to remove version file: {}", e);
        }
    }
    lock.release();
}

/// Clean up resources on startup failure
fn cleanup_on_failure(config: &Config) {
    // The PID file is only ours if nobody holds its lock
    if let Ok(file) = OpenOptions::new().write(true).open(&config.lock_path) {
        if file.try_lock_exclusive().is_err() {
            return;
        }
    }

    if config.version_path.exists() {
        let _ = std::fs::remove_file(&config.version_path);
    }
    if config.lock_path.exists() {
        let _ = std::fs::remove_file(&config.lock_path);
    }
}

/// Get the state root for quay
fn state_root() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("QUAY_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }

    // Use XDG_STATE_HOME or default to ~/.local/state
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("quay"));
    }

    let home = std::env::var("HOME").map_err(|_| LifecycleError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/quay"))
}

/// Compute config hash for a unique state directory
fn config_hash(path: &Path) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.to_string_lossy().as_bytes());
    let result = hasher.finalize();
    // Take first 16 chars of hex digest
    hex_encode(&result[..8])
}

// Hex encoding helper
fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
