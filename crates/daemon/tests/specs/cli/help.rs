// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Help output specs

use crate::prelude::*;

#[test]
fn help_lists_subcommands() {
    let temp = Project::empty();

    temp.quayd()
        .args(&["--help"])
        .passes()
        .stdout_has("serve")
        .stdout_has("run")
        .stdout_has("check")
        .stdout_has("rollback");
}

#[test]
fn run_help_shows_branch_flag() {
    let temp = Project::empty();

    temp.quayd()
        .args(&["run", "--help"])
        .passes()
        .stdout_has("--branch")
        .stdout_has("--configuration");
}

#[test]
fn unknown_subcommand_fails() {
    let temp = Project::empty();

    temp.quayd()
        .args(&["deploy-everything"])
        .fails()
        .stderr_has("unrecognized subcommand");
}
