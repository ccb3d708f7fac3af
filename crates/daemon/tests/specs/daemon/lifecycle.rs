// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle specs
//!
//! Verify `quayd serve` startup files, single-instance locking, and
//! shutdown on SIGTERM.

use std::io::{BufRead, BufReader};
use std::process::{Child, Command, Stdio};

use crate::prelude::*;

/// A `quayd serve` child that is killed if the test bails early
struct Daemon(Child);

impl Daemon {
    fn start(temp: &Project) -> (Self, String) {
        let mut child = Command::new(quayd_bin())
            .arg("serve")
            .current_dir(temp.path())
            .env("QUAY_STATE_DIR", temp.state_path())
            .env_remove("QUAY_CONFIG")
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .unwrap();

        let mut line = String::new();
        let stdout = child.stdout.take().unwrap();
        BufReader::new(stdout).read_line(&mut line).unwrap();
        (Self(child), line)
    }

    fn terminate(mut self) -> std::process::ExitStatus {
        let pid = self.0.id().to_string();
        let status = Command::new("kill").args(["-TERM", &pid]).status().unwrap();
        assert!(status.success());
        self.0.wait().unwrap()
    }
}

impl Drop for Daemon {
    fn drop(&mut self) {
        let _ = self.0.kill();
        let _ = self.0.wait();
    }
}

#[test]
fn serve_reports_ready_and_writes_state_files() {
    let temp = Project::deployable();
    let (daemon, ready) = Daemon::start(&temp);

    assert_eq!(ready.trim(), "READY");
    let state_dir = temp.state_dir().unwrap();
    let pid = std::fs::read_to_string(state_dir.join("quayd.pid")).unwrap();
    assert_eq!(pid.trim(), daemon.0.id().to_string());
    assert!(state_dir.join("quayd.version").exists());

    let log = std::fs::read_to_string(state_dir.join("quayd.log")).unwrap();
    assert!(log.contains("--- quayd: starting (pid: "));

    let status = daemon.terminate();
    assert!(status.success());
}

#[test]
fn sigterm_removes_state_files() {
    let temp = Project::deployable();
    let (daemon, _) = Daemon::start(&temp);
    let state_dir = temp.state_dir().unwrap();

    daemon.terminate();

    assert!(!state_dir.join("quayd.pid").exists());
    assert!(!state_dir.join("quayd.version").exists());
}

#[test]
fn second_daemon_for_same_config_fails() {
    let temp = Project::deployable();
    let (daemon, _) = Daemon::start(&temp);

    temp.quayd()
        .args(&["serve"])
        .fails()
        .stderr_has("Failed to acquire lock");

    // The running daemon still owns its PID file
    let state_dir = temp.state_dir().unwrap();
    assert!(wait_for(SPEC_WAIT_MAX_MS, || state_dir.join("quayd.pid").exists()));
    daemon.terminate();
}

#[test]
fn run_is_refused_while_serving() {
    let temp = Project::deployable();
    let (daemon, _) = Daemon::start(&temp);

    temp.quayd()
        .args(&["run", "--branch", "main"])
        .fails()
        .stderr_has("cannot run while quayd is serving");

    daemon.terminate();
}
