// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::process::FakeProcessRunner;
use std::path::PathBuf;
use tempfile::TempDir;

#[tokio::test]
async fn clone_runs_from_parent_directory() {
    let dir = TempDir::new().unwrap();
    let parent = dir.path().join("nested");
    let runner = FakeProcessRunner::new();
    let git = GitAdapter::new(runner.clone());

    git.clone_repo("https://example.com/app.git", &parent.join("app"))
        .await
        .unwrap();

    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].command_line(),
        "git clone -- https://example.com/app.git app"
    );
    assert_eq!(calls[0].working_dir, parent);
    assert!(parent.is_dir(), "parent directory should be created");
}

#[tokio::test]
async fn checkout_separates_branch_from_paths() {
    let runner = FakeProcessRunner::new();
    let git = GitAdapter::new(runner.clone());

    git.checkout(Path::new("/srv/wc"), "feature/login")
        .await
        .unwrap();

    assert_eq!(runner.command_lines(), vec!["git checkout feature/login --"]);
    assert_eq!(runner.calls()[0].working_dir, PathBuf::from("/srv/wc"));
}

#[tokio::test]
async fn current_branch_reads_abbrev_ref() {
    let runner = FakeProcessRunner::new().stdout_on("rev-parse", ["main"]);
    let git = GitAdapter::new(runner.clone());

    let branch = git.current_branch(Path::new("/srv/wc")).await.unwrap();

    assert_eq!(branch.as_deref(), Some("main"));
    assert_eq!(
        runner.command_lines(),
        vec!["git rev-parse --abbrev-ref HEAD"]
    );
}

#[tokio::test]
async fn detached_head_has_no_branch() {
    let runner = FakeProcessRunner::new().stdout_on("rev-parse", ["HEAD"]);
    let git = GitAdapter::new(runner);

    let branch = git.current_branch(Path::new("/srv/wc")).await.unwrap();

    assert_eq!(branch, None);
}

#[tokio::test]
async fn empty_rev_parse_output_is_an_error() {
    let git = GitAdapter::new(FakeProcessRunner::new());

    let err = git.current_branch(Path::new("/srv/wc")).await.unwrap_err();

    assert!(matches!(err, RepoError::CommandFailed(_)));
}

#[tokio::test]
async fn pull_is_fast_forward_only_with_timeout() {
    let runner = FakeProcessRunner::new();
    let git = GitAdapter::new(runner.clone()).with_timeout(Some(Duration::from_secs(30)));

    git.pull(Path::new("/srv/wc"), "origin").await.unwrap();

    let calls = runner.calls();
    assert_eq!(calls[0].command_line(), "git pull --ff-only origin");
    assert_eq!(calls[0].timeout, Some(Duration::from_secs(30)));
}

#[tokio::test]
async fn git_failure_names_the_operation() {
    let runner = FakeProcessRunner::new().fail_on("git pull", 1);
    let git = GitAdapter::new(runner);

    let err = git.pull(Path::new("/srv/wc"), "origin").await.unwrap_err();

    assert!(matches!(err, RepoError::Git { operation: "pull", .. }));
    assert!(err.to_string().starts_with("git pull failed"));
}
