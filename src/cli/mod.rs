//! CLI definition

use clap::Parser;

use crate::client::deepbits::DEFAULT_API_BASE;
use crate::client::github::DEFAULT_GITHUB_API;
use crate::config::{DEFAULT_TOOLS_BASE, STAGING_DIR};

/// Wait for the remote scan of the current commit and stage its results as
/// CI artifacts
#[derive(Parser, Debug)]
#[command(name = "scanwatch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Host access token for the repository visibility check
    #[arg(long, env = "GITHUB_TOKEN", hide_env = true)]
    pub token: Option<String>,

    /// Scan platform API base URL
    #[arg(long, env = "SCANWATCH_API_URL", default_value = DEFAULT_API_BASE, hide_env = true)]
    pub api_url: String,

    /// Base URL for report-page links
    #[arg(long, env = "SCANWATCH_TOOLS_URL", default_value = DEFAULT_TOOLS_BASE, hide_env = true)]
    pub tools_url: String,

    /// Source-control host API base URL
    #[arg(long, env = "SCANWATCH_GITHUB_API", default_value = DEFAULT_GITHUB_API, hide_env = true)]
    pub github_api_url: String,

    /// Directory to stage result artifacts in
    #[arg(long, env = "SCANWATCH_STAGING_DIR", default_value = STAGING_DIR, hide_env = true)]
    pub staging_dir: String,

    /// Seconds to wait between poll attempts
    #[arg(long, env = "SCANWATCH_POLL_DELAY", default_value_t = 60, hide_env = true)]
    pub poll_delay: u64,

    /// Total seconds to wait for the scan before giving up
    #[arg(long, env = "SCANWATCH_POLL_TIMEOUT", default_value_t = 3 * 60 * 60, hide_env = true)]
    pub poll_timeout: u64,

    /// Enable debug logging
    #[arg(long, env = "SCANWATCH_DEBUG", hide_env = true)]
    pub debug: bool,
}
