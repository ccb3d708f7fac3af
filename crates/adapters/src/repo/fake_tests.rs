// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::TempDir;

#[tokio::test]
async fn fake_clone_creates_working_copy_on_default_branch() {
    let dir = TempDir::new().unwrap();
    let wc = dir.path().join("wc");
    let adapter = FakeRepoAdapter::new().with_default_branch("trunk");

    adapter.clone_repo("https://example.com/r.git", &wc).await.unwrap();

    assert!(wc.is_dir());
    assert_eq!(adapter.branch_of(&wc).as_deref(), Some("trunk"));
    assert_eq!(
        adapter.current_branch(&wc).await.unwrap().as_deref(),
        Some("trunk")
    );
}

#[tokio::test]
async fn fake_checkout_switches_branch() {
    let adapter = FakeRepoAdapter::new().with_working_copy("/srv/wc", Some("main"));

    adapter.checkout(Path::new("/srv/wc"), "dev").await.unwrap();

    assert_eq!(adapter.branch_of(Path::new("/srv/wc")).as_deref(), Some("dev"));
    assert_eq!(
        adapter.calls(),
        vec![RepoCall::Checkout {
            path: PathBuf::from("/srv/wc"),
            branch: "dev".to_string(),
        }]
    );
}

#[tokio::test]
async fn fake_reports_detached_head() {
    let adapter = FakeRepoAdapter::new().with_working_copy("/srv/wc", None);

    let head = adapter.current_branch(Path::new("/srv/wc")).await.unwrap();

    assert_eq!(head, None);
}

#[tokio::test]
async fn fake_unknown_path_is_not_a_working_copy() {
    let adapter = FakeRepoAdapter::new();

    let result = adapter.current_branch(Path::new("/nowhere")).await;

    assert!(matches!(result, Err(RepoError::CommandFailed(_))));
}

#[tokio::test]
async fn fake_injected_failure_is_still_recorded() {
    let adapter = FakeRepoAdapter::new()
        .with_working_copy("/srv/wc", Some("main"))
        .fail_on(RepoOp::Pull);

    let result = adapter.pull(Path::new("/srv/wc"), "origin").await;

    assert!(result.is_err());
    assert_eq!(adapter.calls().len(), 1);
}
