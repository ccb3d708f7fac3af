// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `quayd rollback` specs

use crate::prelude::*;

#[test]
fn rollback_restores_previous_release() {
    let temp = Project::deployable();
    temp.quayd().args(&["run", "--branch", "main"]).passes();
    temp.origin_commit("v2");
    temp.quayd().args(&["run", "--branch", "main"]).passes();

    temp.quayd()
        .args(&["rollback"])
        .passes()
        .stdout_has("rolled back");

    assert_eq!(temp.read("www/app.txt"), "v1");
    // The rolled-back release becomes the new previous one
    assert_eq!(temp.read(".www.previous/app.txt"), "v2");
}

#[test]
fn rollback_without_previous_release_fails() {
    let temp = Project::deployable();
    temp.quayd().args(&["run", "--branch", "main"]).passes();

    temp.quayd().args(&["rollback"]).fails();

    assert_eq!(temp.read("www/app.txt"), "v1");
}

#[test]
fn rollback_refuses_replace_strategy() {
    let temp = Project::empty();
    temp.origin_init("v1");
    temp.toolchain();
    temp.config("strategy = \"replace\"\n");

    temp.quayd()
        .args(&["rollback"])
        .fails()
        .stderr_has("staged");
}
