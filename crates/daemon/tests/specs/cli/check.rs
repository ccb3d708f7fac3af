// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `quayd check` specs
//!
//! Verify config validation and the resolved layout report.

use crate::prelude::*;

#[test]
fn check_prints_layout_and_stages() {
    let temp = Project::deployable();

    let run = temp.quayd().args(&["check"]).passes();
    let stdout = run.stdout();

    assert!(stdout.contains(&format!("repository:    {}", temp.origin_path().display())));
    assert!(stdout.contains(&format!("deploy:        {} (Staged)", temp.www_path().display())));
    assert!(stdout.contains("configuration: Release"));
    assert!(stdout.contains("branches:      main"));

    let stages: Vec<&str> = stdout
        .lines()
        .skip_while(|l| *l != "stages:")
        .skip(1)
        .map(|l| l.split_whitespace().next().unwrap_or(""))
        .collect();
    similar_asserts::assert_eq!(stages, vec!["build", "test", "coverage", "publish"]);
}

#[test]
fn check_reads_config_from_env() {
    let temp = Project::deployable();
    std::fs::rename(temp.path().join("quay.toml"), temp.path().join("other.toml")).unwrap();

    temp.quayd()
        .env("QUAY_CONFIG", temp.path().join("other.toml"))
        .args(&["check"])
        .passes()
        .stdout_has("stages:");
}

#[test]
fn check_fails_without_config() {
    let temp = Project::empty();

    temp.quayd()
        .args(&["check"])
        .fails()
        .stderr_has("quay.toml");
}

#[test]
fn check_rejects_unknown_keys() {
    let temp = Project::deployable();
    temp.file(
        "quay.toml",
        "[repository]\nurl = \"x\"\nlocal_path = \"wc\"\nbogus = 1\n\n[deploy]\npath = \"www\"\n",
    );

    temp.quayd()
        .args(&["check"])
        .fails()
        .stderr_has("bogus");
}

#[test]
fn check_rejects_deploy_inside_working_copy() {
    let temp = Project::deployable();
    temp.file(
        "quay.toml",
        "[repository]\nurl = \"x\"\nlocal_path = \"wc\"\n\n[deploy]\npath = \"wc/site\"\n",
    );

    temp.quayd()
        .args(&["check"])
        .fails()
        .stderr_has("overlaps the working copy");
}

#[test]
fn check_rejects_publish_dir_above_working_copy() {
    let temp = Project::deployable();
    temp.file(
        "quay.toml",
        "[repository]\nurl = \"x\"\nlocal_path = \"wc\"\n\n[build]\npublish_dir = \"..\"\n\n[deploy]\npath = \"www\"\n",
    );

    temp.quayd()
        .args(&["check"])
        .fails()
        .stderr_has("must not contain '..'");
}
