// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for the quayd specs

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::{Duration, Instant};

use tempfile::TempDir;

/// Upper bound for polling waits
pub const SPEC_WAIT_MAX_MS: u64 = 5000;

/// Fake toolchain: logs its arguments and, on `publish`, copies the
/// working copy's `app.txt` into the `--output` directory.
pub const FAKE_TOOLCHAIN: &str = r#"#!/bin/sh
echo "$@" >> "$(dirname "$0")/toolchain.log"
verb="$1"
wc="$2"
if [ -n "$QUAY_FAIL_VERB" ] && [ "$QUAY_FAIL_VERB" = "$verb" ]; then
    echo "fake $verb failed" >&2
    exit 1
fi
if [ "$verb" = "publish" ]; then
    while [ $# -gt 0 ]; do
        if [ "$1" = "--output" ]; then out="$2"; fi
        shift
    done
    mkdir -p "$out"
    cp "$wc/app.txt" "$out/app.txt"
fi
"#;

/// Poll `check` until it holds or `max_ms` passes
pub fn wait_for(max_ms: u64, mut check: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_millis(max_ms);
    while Instant::now() < deadline {
        if check() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    check()
}

/// Run git in `dir`, panicking on failure
pub fn git(dir: &Path, args: &[&str]) {
    let output = std::process::Command::new("git")
        .args(["-c", "user.name=Quay Specs", "-c", "user.email=specs@example.com"])
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

/// A scratch directory holding a config, an origin repo, and the
/// daemon's isolated state root
pub struct Project {
    dir: TempDir,
    state: TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
            state: TempDir::new().unwrap(),
        }
    }

    /// Project with an origin repo on `main`, a fake toolchain, and a config
    /// that deploys to `www/`
    pub fn deployable() -> Self {
        let project = Self::empty();
        project.origin_init("v1");
        project.toolchain();
        project.config("");
        project
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn state_path(&self) -> &Path {
        self.state.path()
    }

    pub fn origin_path(&self) -> PathBuf {
        self.path().join("origin")
    }

    pub fn www_path(&self) -> PathBuf {
        self.path().join("www")
    }

    /// Write a file relative to the project root
    pub fn file(&self, rel: &str, content: &str) {
        let path = self.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.path().join(rel)).unwrap()
    }

    /// Create the origin repository on `main` with `app.txt` = `content`
    pub fn origin_init(&self, content: &str) {
        let origin = self.origin_path();
        std::fs::create_dir_all(&origin).unwrap();
        git(&origin, &["init", "-q"]);
        git(&origin, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        self.origin_commit(content);
    }

    /// Commit a new `app.txt` to the origin's current branch
    pub fn origin_commit(&self, content: &str) {
        let origin = self.origin_path();
        std::fs::write(origin.join("app.txt"), content).unwrap();
        git(&origin, &["add", "app.txt"]);
        git(&origin, &["commit", "-q", "-m", content]);
    }

    /// Install the fake toolchain at `bin/fake-dotnet`
    pub fn toolchain(&self) {
        self.file("bin/fake-dotnet", FAKE_TOOLCHAIN);
        let path = self.path().join("bin/fake-dotnet");
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
    }

    /// Write `quay.toml`; `extra` lands at the end of the file
    pub fn config(&self, extra: &str) {
        let toml = format!(
            r#"[repository]
url = "{origin}"
local_path = "wc"
branches = ["main"]

[build]
toolchain = "{toolchain}"

[deploy]
path = "www"
{extra}
[server]
listen = "127.0.0.1:0"
"#,
            origin = self.origin_path().display(),
            toolchain = self.path().join("bin/fake-dotnet").display(),
            extra = extra,
        );
        self.file("quay.toml", &toml);
    }

    /// Toolchain invocations so far, one per line
    pub fn toolchain_log(&self) -> String {
        std::fs::read_to_string(self.path().join("bin/toolchain.log")).unwrap_or_default()
    }

    /// The per-config state directory created by the daemon
    pub fn state_dir(&self) -> Option<PathBuf> {
        std::fs::read_dir(self.state_path())
            .ok()?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .find(|p| p.is_dir())
    }

    /// `quayd` running in the project root with isolated state
    pub fn quayd(&self) -> CliBuilder {
        CliBuilder::new(self.path(), self.state_path())
    }
}

pub fn quayd_bin() -> &'static str {
    env!("CARGO_BIN_EXE_quayd")
}

pub struct CliBuilder {
    cmd: assert_cmd::Command,
}

impl CliBuilder {
    fn new(cwd: &Path, state: &Path) -> Self {
        let mut cmd = assert_cmd::Command::new(quayd_bin());
        cmd.current_dir(cwd)
            .env("QUAY_STATE_DIR", state)
            .env_remove("QUAY_CONFIG")
            .env("RUST_LOG", "info")
            .timeout(Duration::from_secs(60));
        Self { cmd }
    }

    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: impl AsRef<std::ffi::OsStr>) -> Self {
        self.cmd.env(key, value);
        self
    }

    /// Run and require exit code 0
    pub fn passes(mut self) -> RunAssert {
        let output = self.cmd.output().unwrap();
        let run = RunAssert { output };
        assert!(
            run.output.status.success(),
            "expected success\nstdout:\n{}\nstderr:\n{}",
            run.stdout(),
            run.stderr()
        );
        run
    }

    /// Run and require a nonzero exit code
    pub fn fails(mut self) -> RunAssert {
        let output = self.cmd.output().unwrap();
        let run = RunAssert { output };
        assert!(
            !run.output.status.success(),
            "expected failure\nstdout:\n{}\nstderr:\n{}",
            run.stdout(),
            run.stderr()
        );
        run
    }
}

pub struct RunAssert {
    output: Output,
}

impl RunAssert {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn stdout_has(self, needle: &str) -> Self {
        let stdout = self.stdout();
        assert!(stdout.contains(needle), "stdout lacks {:?}:\n{}", needle, stdout);
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        let stderr = self.stderr();
        assert!(stderr.contains(needle), "stderr lacks {:?}:\n{}", needle, stderr);
        self
    }

    pub fn stdout_eq(self, expected: &str) -> Self {
        similar_asserts::assert_eq!(self.stdout(), expected);
        self
    }

    /// Parse stdout as JSON
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.output.stdout).unwrap()
    }
}
