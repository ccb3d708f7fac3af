// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `quayd run` specs
//!
//! Verify a one-shot pipeline run against a real git origin and a fake
//! toolchain.

use crate::prelude::*;

#[test]
fn run_clones_builds_and_deploys() {
    let temp = Project::deployable();

    let run = temp.quayd().args(&["run", "--branch", "main"]).passes();
    let outcome = run.json();

    assert_eq!(outcome["succeeded"], true);
    assert!(outcome["failed_stage"].is_null());
    assert_eq!(temp.read("www/app.txt"), "v1");
    assert_eq!(temp.read("wc/app.txt"), "v1");

    let verbs: Vec<String> = temp
        .toolchain_log()
        .lines()
        .map(|l| l.split(' ').next().unwrap_or("").to_string())
        .collect();
    similar_asserts::assert_eq!(verbs, vec!["build", "test", "test", "publish"]);
}

#[test]
fn rerun_without_new_commits_redeploys_the_same_release() {
    let temp = Project::deployable();
    let first = temp.quayd().args(&["run", "--branch", "main"]).passes().json();

    let second = temp.quayd().args(&["run", "--branch", "main"]).passes().json();

    assert_eq!(first["succeeded"], true);
    assert_eq!(second["succeeded"], true);
    assert_eq!(temp.read("www/app.txt"), "v1");
    assert_eq!(temp.read(".www.previous/app.txt"), "v1");
    let live: Vec<_> = std::fs::read_dir(temp.www_path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(live, vec![std::ffi::OsString::from("app.txt")]);
    assert_eq!(temp.toolchain_log().lines().count(), 8);
}

#[test]
fn second_run_pulls_new_commits() {
    let temp = Project::deployable();
    temp.quayd().args(&["run", "--branch", "main"]).passes();

    temp.origin_commit("v2");
    temp.quayd().args(&["run", "--branch", "main"]).passes();

    assert_eq!(temp.read("www/app.txt"), "v2");
    assert_eq!(temp.read(".www.previous/app.txt"), "v1");
}

#[test]
fn run_uses_requested_configuration_for_every_stage() {
    let temp = Project::deployable();

    temp.quayd()
        .args(&["run", "--branch", "main", "--configuration", "debug"])
        .passes();

    let log = temp.toolchain_log();
    assert_eq!(log.lines().count(), 4);
    assert!(log.lines().all(|l| l.contains("--configuration Debug")));
}

#[test]
fn failing_stage_stops_the_run_and_keeps_live_deployment() {
    let temp = Project::deployable();
    temp.quayd().args(&["run", "--branch", "main"]).passes();
    temp.origin_commit("v2");

    let run = temp
        .quayd()
        .env("QUAY_FAIL_VERB", "build")
        .args(&["run", "--branch", "main"])
        .fails()
        .stderr_has("pipeline failed at stage build");
    let outcome = run.json();

    assert_eq!(outcome["succeeded"], false);
    assert_eq!(outcome["failed_stage"], "build");
    assert!(outcome["message"]
        .as_str()
        .unwrap()
        .contains("fake build failed"));
    assert_eq!(temp.read("www/app.txt"), "v1");
}

#[test]
fn unknown_branch_fails_at_sync() {
    let temp = Project::deployable();

    let run = temp
        .quayd()
        .args(&["run", "--branch", "no-such-branch"])
        .fails();

    assert_eq!(run.json()["failed_stage"], "sync");
    assert!(!temp.www_path().exists());
}

#[test]
fn invalid_branch_is_rejected_before_running() {
    let temp = Project::deployable();

    temp.quayd()
        .args(&["run", "--branch=--upload-pack=evil"])
        .fails();

    assert!(!temp.path().join("wc").exists());
}
