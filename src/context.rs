//! CI run context: repository identity resolved from the host environment
//!
//! Everything here is read once at startup and carried as an explicit value;
//! no component re-derives identity from ambient state.

use std::env;
use std::path::Path;

use log::debug;
use serde_json::Value;

use crate::client::ScanKey;
use crate::error::{Error, Result};

/// Events the gate accepts. Anything else warns and ends the run cleanly.
pub const SUPPORTED_EVENTS: &[&str] = &["push", "pull_request", "release"];

/// Identity and trigger of the current CI run
#[derive(Debug, Clone)]
pub struct RunContext {
    pub owner: String,
    pub repo: String,
    pub sha: String,
    pub event_name: String,
    pub branch: Option<String>,
}

impl RunContext {
    /// Resolve the context from the standard CI environment variables.
    pub fn from_env() -> Result<Self> {
        let repository = env::var("GITHUB_REPOSITORY")
            .map_err(|_| Error::Context("GITHUB_REPOSITORY is not set".to_string()))?;
        let (owner, repo) = split_repository(&repository)?;

        let event_name = env::var("GITHUB_EVENT_NAME").unwrap_or_default();
        let git_ref = env::var("GITHUB_REF").ok();
        let head_ref = env::var("GITHUB_HEAD_REF").ok();
        let branch = branch_name(&event_name, git_ref.as_deref(), head_ref.as_deref());

        let default_sha = env::var("GITHUB_SHA")
            .map_err(|_| Error::Context("GITHUB_SHA is not set".to_string()))?;
        let sha = if event_name == "pull_request" {
            // PR runs report the merge commit in GITHUB_SHA; the scan is keyed
            // by the PR head, which lives in the event payload.
            env::var("GITHUB_EVENT_PATH")
                .ok()
                .and_then(|path| pr_head_sha(Path::new(&path)))
                .unwrap_or(default_sha)
        } else {
            default_sha
        };

        Ok(Self {
            owner,
            repo,
            sha,
            event_name,
            branch,
        })
    }

    pub fn is_supported_event(&self) -> bool {
        SUPPORTED_EVENTS.contains(&self.event_name.as_str())
    }

    /// The scan job key for this run.
    pub fn scan_key(&self) -> ScanKey {
        ScanKey::new(
            self.owner.clone(),
            self.repo.clone(),
            self.sha.clone(),
            self.branch.clone(),
        )
    }
}

fn split_repository(repository: &str) -> Result<(String, String)> {
    match repository.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(Error::Context(format!(
            "GITHUB_REPOSITORY is not in owner/repo form: {}",
            repository
        ))),
    }
}

/// Derive the branch name from the event and refs.
///
/// Pull requests use the head ref; other events strip the `refs/heads/`
/// prefix from the ref. Absent or empty values yield `None`.
pub fn branch_name(
    event_name: &str,
    git_ref: Option<&str>,
    head_ref: Option<&str>,
) -> Option<String> {
    let raw = if event_name == "pull_request" {
        head_ref
    } else {
        git_ref.map(|r| r.strip_prefix("refs/heads/").unwrap_or(r))
    };

    raw.filter(|s| !s.is_empty()).map(|s| s.to_string())
}

fn pr_head_sha(event_path: &Path) -> Option<String> {
    let contents = std::fs::read_to_string(event_path).ok()?;
    let payload: Value = serde_json::from_str(&contents).ok()?;
    let sha = payload
        .pointer("/pull_request/head/sha")?
        .as_str()?
        .to_string();
    debug!("Using pull request head SHA {}", sha);
    Some(sha)
}
