//! Mock scan platform client for testing
//!
//! Scripts a sequence of status probes so poll-loop tests can assert exact
//! call counts without a network.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::models::{SbomArchive, ScanKey};
use super::{ScanApi, StatusProbe};
use crate::error::{ApiError, Error, Result};

/// Scripted mock client.
///
/// Each `fetch_status` call consumes the next scripted outcome; when the
/// script runs out, the configured fallback probe (if any) repeats forever.
pub struct MockScanClient {
    probes: Arc<Mutex<VecDeque<Result<StatusProbe>>>>,
    fallback: Arc<Mutex<Option<StatusProbe>>>,
    archive: Arc<Mutex<Option<SbomArchive>>>,
    call_count: Arc<Mutex<CallCounts>>,
}

/// Tracks API call counts for test verification
#[derive(Default, Debug, Clone)]
pub struct CallCounts {
    pub fetch_status: usize,
    pub download_sbom: usize,
}

impl Default for MockScanClient {
    fn default() -> Self {
        Self {
            probes: Arc::new(Mutex::new(VecDeque::new())),
            fallback: Arc::new(Mutex::new(None)),
            archive: Arc::new(Mutex::new(None)),
            call_count: Arc::new(Mutex::new(CallCounts::default())),
        }
    }
}

impl MockScanClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a probe outcome for the next unscripted call.
    pub async fn with_probe(self, probe: StatusProbe) -> Self {
        self.probes.lock().await.push_back(Ok(probe));
        self
    }

    /// Queue an error outcome for the next unscripted call.
    pub async fn with_error(self, error: ApiError) -> Self {
        self.probes.lock().await.push_back(Err(error.into()));
        self
    }

    /// Probe to repeat once the script is exhausted.
    pub async fn with_fallback(self, probe: StatusProbe) -> Self {
        *self.fallback.lock().await = Some(probe);
        self
    }

    /// Archive to return from `download_sbom`. Without one, downloads fail
    /// with `ArchiveNotFound`.
    pub async fn with_archive(self, archive: SbomArchive) -> Self {
        *self.archive.lock().await = Some(archive);
        self
    }

    /// Get the call counts for verification in tests.
    pub async fn call_counts(&self) -> CallCounts {
        self.call_count.lock().await.clone()
    }
}

#[async_trait]
impl ScanApi for MockScanClient {
    async fn fetch_status(&self, _key: &ScanKey) -> Result<StatusProbe> {
        self.call_count.lock().await.fetch_status += 1;

        if let Some(outcome) = self.probes.lock().await.pop_front() {
            return outcome;
        }

        match self.fallback.lock().await.clone() {
            Some(probe) => Ok(probe),
            None => Err(Error::Other("mock probe script exhausted".to_string())),
        }
    }

    async fn download_sbom(&self, _key: &ScanKey, _result_id: &str) -> Result<SbomArchive> {
        self.call_count.lock().await.download_sbom += 1;

        match self.archive.lock().await.clone() {
            Some(archive) => Ok(archive),
            None => Err(ApiError::ArchiveNotFound.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::models::ScanRecord;

    fn key() -> ScanKey {
        ScanKey::new("octo", "repo", "abc123", None)
    }

    #[tokio::test]
    async fn test_scripted_probes_in_order() {
        let mock = MockScanClient::new()
            .with_probe(StatusProbe::NotRegistered)
            .await
            .with_probe(StatusProbe::Complete(ScanRecord::default()))
            .await;

        assert!(matches!(
            mock.fetch_status(&key()).await.unwrap(),
            StatusProbe::NotRegistered
        ));
        assert!(matches!(
            mock.fetch_status(&key()).await.unwrap(),
            StatusProbe::Complete(_)
        ));

        let counts = mock.call_counts().await;
        assert_eq!(counts.fetch_status, 2);
    }

    #[tokio::test]
    async fn test_fallback_repeats() {
        let mock = MockScanClient::new()
            .with_fallback(StatusProbe::Pending(None))
            .await;

        for _ in 0..3 {
            assert!(matches!(
                mock.fetch_status(&key()).await.unwrap(),
                StatusProbe::Pending(None)
            ));
        }
    }

    #[tokio::test]
    async fn test_download_without_archive_is_not_found() {
        let mock = MockScanClient::new();
        let err = mock.download_sbom(&key(), "r1").await.unwrap_err();
        assert!(matches!(err, Error::Api(ApiError::ArchiveNotFound)));
    }
}
