//! End-to-end tests for the binary's argument and environment handling.
//!
//! These exercise everything up to the first network call; nothing here
//! talks to GitHub or JIRA.

use assert_cmd::Command;
use predicates::prelude::*;

fn tattle() -> Command {
    let mut cmd = Command::cargo_bin("tattle").unwrap();
    cmd.env_remove("GITHUB_USER").env_remove("GITHUB_PASS");
    cmd
}

#[test]
fn missing_credentials_abort_before_anything_else() {
    tattle()
        .args(["--config-path", "config.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "GitHub authentication environment variables do not exist.",
        ))
        .stderr(predicate::str::contains("[GITHUB_USER], [GITHUB_PASS]"));
}

#[test]
fn empty_credentials_count_as_missing() {
    tattle()
        .env("GITHUB_USER", "someone")
        .env("GITHUB_PASS", "")
        .args(["--config-path", "config.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "GitHub authentication environment variables do not exist.",
        ));
}

#[test]
fn unreadable_config_path_names_the_path() {
    tattle()
        .env("GITHUB_USER", "someone")
        .env("GITHUB_PASS", "hunter2")
        .args(["--config-path", "/no/such/config.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("/no/such/config.yaml"));
}

#[test]
fn config_path_flag_is_required() {
    tattle()
        .assert()
        .failure()
        .stderr(predicate::str::contains("--config-path"));
}

#[test]
fn short_flag_is_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "query_config:\n  data_type: tag\n  github_org: acme\n").unwrap();

    // Parsing succeeds with `-c`; the run then fails on the unsupported
    // data type, before any network activity.
    tattle()
        .env("GITHUB_USER", "someone")
        .env("GITHUB_PASS", "hunter2")
        .args(["-c", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("tag"));
}
