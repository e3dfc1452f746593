//! Scan platform API client

use async_trait::async_trait;

use crate::error::Result;

pub mod deepbits;
pub mod github;
#[cfg(test)]
pub mod mock;
pub mod models;

pub use deepbits::DeepbitsClient;
#[cfg(test)]
#[allow(unused_imports)]
pub use mock::MockScanClient;
#[allow(unused_imports)]
pub use models::{CommitRecord, SbomArchive, ScanKey, ScanRecord, ScanSummary};

/// Single round-trip classification of a scan job's state.
///
/// Pending, not-registered and fatal were historically told apart by sniffing
/// error shapes; here the client returns a closed outcome so the poll loop's
/// branching is exhaustive. Fatal transport/server errors stay in the `Err`
/// channel and are propagated unchanged.
#[derive(Debug, Clone)]
pub enum StatusProbe {
    /// The scan finished; this record is the final result.
    Complete(ScanRecord),
    /// The job is known but still running. Carries the latest partial record
    /// when the remote returned one.
    Pending(Option<ScanRecord>),
    /// The remote has not indexed this repo/commit yet. Retry later.
    NotRegistered,
}

/// Scan platform API surface used by the run
#[async_trait]
pub trait ScanApi: Send + Sync {
    /// Fetch the current status of the scan job for `key`. One network call,
    /// no retries at this layer.
    async fn fetch_status(&self, key: &ScanKey) -> Result<StatusProbe>;

    /// Download the SBOM archive for a completed scan result.
    ///
    /// Fails with [`ApiError::ArchiveNotFound`](crate::error::ApiError) when
    /// no archive exists for this result, which callers treat as a valid
    /// outcome.
    async fn download_sbom(&self, key: &ScanKey, result_id: &str) -> Result<SbomArchive>;
}
