//! Named outputs and info lines for the hosting CI system

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use log::info;

use crate::client::ScanKey;
use crate::error::Result;

/// Records named key/value outputs for later workflow steps.
///
/// Outputs go to the file named by `GITHUB_OUTPUT`; without one (local runs,
/// tests) they degrade to log lines only.
pub struct OutputSink {
    path: Option<PathBuf>,
}

impl OutputSink {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn from_env() -> Self {
        Self::new(std::env::var("GITHUB_OUTPUT").ok().map(PathBuf::from))
    }

    /// Record one named output and log it.
    pub fn set_output(&self, name: &str, value: &str) -> Result<()> {
        if let Some(path) = &self.path {
            let mut file = OpenOptions::new().create(true).append(true).open(path)?;
            writeln!(file, "{}={}", name, value)?;
        }
        info!("{}: {}", name, value);
        Ok(())
    }
}

/// Publish the three fixed report links for this scan.
pub fn publish_links(
    sink: &OutputSink,
    key: &ScanKey,
    api_base: &str,
    tools_base: &str,
) -> Result<()> {
    let links = [
        ("SCAN_REPO", format!("{}/{}/{}", tools_base, key.owner, key.repo)),
        (
            "SCAN_COMMIT",
            format!("{}/{}/{}/{}", tools_base, key.owner, key.repo, key.sha),
        ),
        (
            "SCAN_BADGE",
            format!("{}/gh/{}/{}/badge", api_base, key.owner, key.repo),
        ),
    ];

    for (name, value) in &links {
        sink.set_output(name, value)?;
    }
    Ok(())
}
