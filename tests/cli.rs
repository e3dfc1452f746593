use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

fn scanwatch() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("scanwatch"));
    // Start from a clean CI environment so host state doesn't leak in.
    for var in [
        "GITHUB_REPOSITORY",
        "GITHUB_SHA",
        "GITHUB_EVENT_NAME",
        "GITHUB_REF",
        "GITHUB_HEAD_REF",
        "GITHUB_EVENT_PATH",
        "GITHUB_OUTPUT",
        "GITHUB_TOKEN",
        "ACTIONS_RUNTIME_URL",
        "ACTIONS_RUNTIME_TOKEN",
        "GITHUB_RUN_ID",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn unsupported_event_exits_cleanly_with_warning() {
    scanwatch()
        .env("GITHUB_REPOSITORY", "octo/repo")
        .env("GITHUB_SHA", "abc123")
        .env("GITHUB_EVENT_NAME", "schedule")
        .assert()
        .success()
        .stderr(predicate::str::contains("push"));
}

#[test]
fn missing_repository_env_fails() {
    scanwatch()
        .env("GITHUB_EVENT_NAME", "push")
        .assert()
        .failure()
        .stderr(predicate::str::contains("GITHUB_REPOSITORY"));
}

#[test]
fn missing_sha_env_fails() {
    scanwatch()
        .env("GITHUB_REPOSITORY", "octo/repo")
        .env("GITHUB_EVENT_NAME", "push")
        .env("GITHUB_REF", "refs/heads/main")
        .assert()
        .failure()
        .stderr(predicate::str::contains("GITHUB_SHA"));
}

#[test]
fn help_lists_poll_tunables() {
    scanwatch()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--poll-delay"))
        .stdout(predicate::str::contains("--staging-dir"));
}
