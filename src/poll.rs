//! Poll-until-complete loop for the remote scan job

use log::{debug, info, warn};
use tokio::time::{sleep, Instant};

use crate::client::{ScanApi, ScanKey, ScanRecord, StatusProbe};
use crate::config::RetryPolicy;
use crate::error::Result;

/// Outcome of a polling run.
///
/// A hit deadline is a normal terminal state, not an error: the report then
/// carries the last observed record (possibly none) with `timed_out` set.
#[derive(Debug, Clone, Default)]
pub struct PollReport {
    pub record: Option<ScanRecord>,
    pub timed_out: bool,
}

/// Poll the scan status until the job completes or `policy.deadline` elapses.
///
/// Pending and not-yet-registered outcomes both back off for `policy.delay`
/// and retry; from this side both just mean "try again later". Any other
/// failure aborts immediately and propagates unchanged. The deadline is
/// checked before each attempt, so a slow final call can overshoot the budget
/// by at most one round trip.
pub async fn await_completion(
    api: &dyn ScanApi,
    key: &ScanKey,
    policy: &RetryPolicy,
) -> Result<PollReport> {
    let start = Instant::now();
    let mut last_seen: Option<ScanRecord> = None;

    while start.elapsed() < policy.deadline {
        match api.fetch_status(key).await? {
            StatusProbe::Complete(record) => {
                info!("Scan finished");
                return Ok(PollReport {
                    record: Some(record),
                    timed_out: false,
                });
            }
            StatusProbe::Pending(record) => {
                info!("Scan in progress");
                if record.is_some() {
                    last_seen = record;
                }
            }
            StatusProbe::NotRegistered => {
                debug!("Repo/commit not added yet");
            }
        }
        sleep(policy.delay).await;
    }

    warn!(
        "Scan timed out after {:?}; continuing with last known result",
        policy.deadline
    );
    Ok(PollReport {
        record: last_seen,
        timed_out: true,
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::client::MockScanClient;
    use crate::error::{ApiError, Error};

    fn key() -> ScanKey {
        ScanKey::new("octo", "repo", "abc123", None)
    }

    fn zero_delay(deadline: Duration) -> RetryPolicy {
        RetryPolicy::new(Duration::ZERO, deadline)
    }

    fn finished_record(id: &str) -> ScanRecord {
        ScanRecord {
            id: Some(id.to_string()),
            scan_end_at: Some(chrono::Utc::now()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_completion_short_circuits_retries() {
        let mock = MockScanClient::new()
            .with_probe(StatusProbe::Complete(finished_record("r1")))
            .await;

        let report = await_completion(&mock, &key(), &zero_delay(Duration::from_secs(60)))
            .await
            .unwrap();

        assert!(!report.timed_out);
        assert_eq!(report.record.unwrap().id.as_deref(), Some("r1"));
        assert_eq!(mock.call_counts().await.fetch_status, 1);
    }

    #[tokio::test]
    async fn test_retries_through_not_registered() {
        let mock = MockScanClient::new()
            .with_probe(StatusProbe::NotRegistered)
            .await
            .with_probe(StatusProbe::NotRegistered)
            .await
            .with_probe(StatusProbe::Complete(finished_record("r1")))
            .await;

        let report = await_completion(&mock, &key(), &zero_delay(Duration::from_secs(60)))
            .await
            .unwrap();

        assert!(!report.timed_out);
        assert!(report.record.unwrap().is_finished());
        assert_eq!(mock.call_counts().await.fetch_status, 3);
    }

    #[tokio::test]
    async fn test_timeout_returns_last_known_record() {
        let pending = ScanRecord {
            id: Some("partial".to_string()),
            ..Default::default()
        };
        let mock = MockScanClient::new()
            .with_fallback(StatusProbe::Pending(Some(pending)))
            .await;

        let report = await_completion(&mock, &key(), &zero_delay(Duration::from_millis(20)))
            .await
            .unwrap();

        assert!(report.timed_out);
        let record = report.record.unwrap();
        assert_eq!(record.id.as_deref(), Some("partial"));
        assert!(!record.is_finished());
    }

    #[tokio::test]
    async fn test_timeout_with_nothing_observed() {
        let mock = MockScanClient::new()
            .with_fallback(StatusProbe::NotRegistered)
            .await;

        let report = await_completion(&mock, &key(), &zero_delay(Duration::from_millis(20)))
            .await
            .unwrap();

        assert!(report.timed_out);
        assert!(report.record.is_none());
    }

    #[tokio::test]
    async fn test_fatal_error_propagates_without_retry() {
        let mock = MockScanClient::new()
            .with_error(ApiError::ServerError("boom".to_string()))
            .await
            .with_fallback(StatusProbe::Pending(None))
            .await;

        let err = await_completion(&mock, &key(), &zero_delay(Duration::from_secs(60)))
            .await
            .unwrap_err();

        match err {
            Error::Api(ApiError::ServerError(msg)) => assert_eq!(msg, "boom"),
            other => panic!("Expected ServerError, got {:?}", other),
        }
        assert_eq!(mock.call_counts().await.fetch_status, 1);
    }

    #[tokio::test]
    async fn test_pending_keeps_latest_partial_record() {
        let first = ScanRecord {
            id: Some("old".to_string()),
            ..Default::default()
        };
        let second = ScanRecord {
            id: Some("new".to_string()),
            ..Default::default()
        };
        let mock = MockScanClient::new()
            .with_probe(StatusProbe::Pending(Some(first)))
            .await
            .with_probe(StatusProbe::Pending(Some(second)))
            .await
            .with_fallback(StatusProbe::Pending(None))
            .await;

        let report = await_completion(&mock, &key(), &zero_delay(Duration::from_millis(20)))
            .await
            .unwrap();

        assert!(report.timed_out);
        assert_eq!(report.record.unwrap().id.as_deref(), Some("new"));
    }
}
