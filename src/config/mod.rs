//! Run configuration for scanwatch

use std::path::PathBuf;
use std::time::Duration;

use crate::cli::Cli;
use crate::client::deepbits::DEFAULT_API_BASE;
use crate::client::github::DEFAULT_GITHUB_API;

/// Default staging directory name, relative to the working directory
pub const STAGING_DIR: &str = "SCAN_RESULTS";

/// Default base URL for the human-facing scan report pages
pub const DEFAULT_TOOLS_BASE: &str = "https://tools.deepbits.com/github";

/// Poll timing: fixed inter-attempt delay plus a wall-clock deadline.
///
/// Always passed explicitly into the poll loop so tests can shrink both to
/// zero without touching process state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay between poll attempts
    pub delay: Duration,
    /// Total wall-clock budget for polling
    pub deadline: Duration,
}

impl RetryPolicy {
    pub fn new(delay: Duration, deadline: Duration) -> Self {
        Self { delay, deadline }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(60),
            deadline: Duration::from_secs(3 * 60 * 60),
        }
    }
}

/// Resolved run settings
#[derive(Debug, Clone)]
pub struct Settings {
    /// Scan platform API base URL
    pub api_base: String,
    /// Base URL for report-page links in published outputs
    pub tools_base: String,
    /// Source-control host API base URL (visibility check)
    pub github_api: String,
    /// Directory where artifacts are staged before upload
    pub staging_dir: PathBuf,
    /// Host access token, when the CI run supplies one
    pub token: Option<String>,
    /// Poll timing
    pub retry: RetryPolicy,
}

impl Settings {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            api_base: cli.api_url.clone(),
            tools_base: cli.tools_url.clone(),
            github_api: cli.github_api_url.clone(),
            staging_dir: PathBuf::from(&cli.staging_dir),
            token: cli.token.clone(),
            retry: RetryPolicy::new(
                Duration::from_secs(cli.poll_delay),
                Duration::from_secs(cli.poll_timeout),
            ),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            tools_base: DEFAULT_TOOLS_BASE.to_string(),
            github_api: DEFAULT_GITHUB_API.to_string(),
            staging_dir: PathBuf::from(STAGING_DIR),
            token: None,
            retry: RetryPolicy::default(),
        }
    }
}
