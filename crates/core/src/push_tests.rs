// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

const GITHUB_PUSH: &str = r#"{
  "ref": "refs/heads/feature/login",
  "before": "0000000000000000000000000000000000000000",
  "after": "5d1f9a3c0b7e4e0f9c7d2c7a1b8e3f4a5b6c7d8e",
  "deleted": false,
  "repository": {
    "full_name": "acme/storefront",
    "clone_url": "https://github.com/acme/storefront.git"
  },
  "pusher": { "name": "dev" }
}"#;

#[test]
fn parses_github_push() {
    let push = PushNotification::from_json(GITHUB_PUSH.as_bytes()).unwrap();

    assert_eq!(push.git_ref, "refs/heads/feature/login");
    assert_eq!(push.repository, "acme/storefront");
    assert_eq!(
        push.clone_url.as_deref(),
        Some("https://github.com/acme/storefront.git")
    );
    assert_eq!(push.branch(), Some("feature/login"));
    assert_eq!(push.short_sha(), Some("5d1f9a3c"));
    assert!(!push.deleted);
    assert!(!push.is_tag());
}

#[test]
fn tag_push_has_no_branch() {
    let body = r#"{"ref":"refs/tags/v1.0.0","repository":{"full_name":"acme/storefront"}}"#;
    let push = PushNotification::from_json(body.as_bytes()).unwrap();

    assert!(push.is_tag());
    assert_eq!(push.branch(), None);
}

#[test]
fn deleted_branch_is_flagged() {
    let body = r#"{"ref":"refs/heads/old","deleted":true,"repository":{"full_name":"a/b"}}"#;
    let push = PushNotification::from_json(body.as_bytes()).unwrap();

    assert!(push.deleted);
    assert_eq!(push.branch(), Some("old"));
}

#[test]
fn missing_ref_is_reported() {
    let body = r#"{"repository":{"full_name":"a/b"}}"#;
    let err = PushNotification::from_json(body.as_bytes()).unwrap_err();
    assert!(matches!(err, PushError::MissingField("ref")));
}

#[test]
fn empty_repository_name_is_reported() {
    let body = r#"{"ref":"refs/heads/main","repository":{"full_name":""}}"#;
    let err = PushNotification::from_json(body.as_bytes()).unwrap_err();
    assert!(matches!(err, PushError::MissingField("repository.full_name")));
}

#[test]
fn garbage_is_invalid_json() {
    let err = PushNotification::from_json(b"payload=%7B").unwrap_err();
    assert!(matches!(err, PushError::InvalidJson(_)));
}

#[parameterized(
    simple = { "refs/heads/main", Some("main") },
    nested = { "refs/heads/release/2.0", Some("release/2.0") },
    prefix_only = { "refs/heads/", None },
    tag = { "refs/tags/v1", None },
    pull = { "refs/pull/4/head", None },
    bare_name = { "main", None },
    heads_inside_name = { "refs/heads/refs/heads/x", Some("refs/heads/x") },
)]
fn branch_normalization(git_ref: &str, expected: Option<&str>) {
    assert_eq!(branch_from_ref(git_ref), expected);
}
