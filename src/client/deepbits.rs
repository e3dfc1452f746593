//! Deepbits scan platform client implementation

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client as HttpClient, StatusCode};

use super::models::{CommitRecord, SbomArchive, ScanKey};
use super::{ScanApi, StatusProbe};
use crate::error::{ApiError, Result};

/// Default scan platform API base URL
pub const DEFAULT_API_BASE: &str = "https://api.deepbits.com";

/// Per-request timeout. The poll loop owns the long wait; individual calls
/// must not hang.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the scan platform
pub struct DeepbitsClient {
    http: HttpClient,
    base_url: String,
}

impl DeepbitsClient {
    /// Create a new client against the given API base URL
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl ScanApi for DeepbitsClient {
    async fn fetch_status(&self, key: &ScanKey) -> Result<StatusProbe> {
        let url = format!("{}{}", self.base_url, key.status_path());
        let response = self
            .http
            .get(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(ApiError::from)?;

        let status = response.status();
        match status {
            status if status.is_success() => {
                let record = response.json::<CommitRecord>().await.map_err(|e| {
                    ApiError::InvalidResponse(format!("Failed to parse status response: {}", e))
                })?;
                Ok(classify(record))
            }
            StatusCode::NOT_FOUND => Ok(StatusProbe::NotRegistered),
            status if status.is_server_error() => {
                let error_msg = response
                    .text()
                    .await
                    .unwrap_or_else(|_| format!("Server error: {}", status));
                Err(ApiError::ServerError(error_msg).into())
            }
            status => Err(ApiError::Unexpected(status.to_string()).into()),
        }
    }

    async fn download_sbom(&self, key: &ScanKey, result_id: &str) -> Result<SbomArchive> {
        let url = format!("{}{}", self.base_url, key.sbom_path(result_id));
        let response = self
            .http
            .get(&url)
            .header("x-public-tool", "true")
            .send()
            .await
            .map_err(ApiError::from)?;

        let status = response.status();
        match status {
            status if status.is_success() => {
                let file_name = response
                    .headers()
                    .get(header::CONTENT_DISPOSITION)
                    .and_then(|v| v.to_str().ok())
                    .and_then(parse_attachment_filename)
                    .ok_or_else(|| {
                        ApiError::MalformedResponse(
                            "content-disposition header missing or unparsable".to_string(),
                        )
                    })?;

                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| ApiError::Network(e.to_string()))?
                    .to_vec();

                Ok(SbomArchive { file_name, bytes })
            }
            StatusCode::NOT_FOUND => Err(ApiError::ArchiveNotFound.into()),
            status if status.is_server_error() => {
                let error_msg = response
                    .text()
                    .await
                    .unwrap_or_else(|_| format!("Server error: {}", status));
                Err(ApiError::ServerError(error_msg).into())
            }
            status => Err(ApiError::Unexpected(status.to_string()).into()),
        }
    }
}

/// Map a 2xx commit record onto the closed probe outcome.
fn classify(record: CommitRecord) -> StatusProbe {
    match record.scan_result {
        Some(scan) if scan.is_finished() => StatusProbe::Complete(scan),
        other => StatusProbe::Pending(other),
    }
}

/// Extract the filename from a `content-disposition` attachment header.
///
/// Accepts `attachment; filename="report.zip"` and the unquoted variant.
/// Returns `None` when no non-empty filename parameter is present.
fn parse_attachment_filename(header: &str) -> Option<String> {
    for part in header.split(';') {
        let part = part.trim();
        if let Some(value) = part.strip_prefix("filename=") {
            let name = value.trim().trim_matches('"').trim();
            if !name.is_empty() {
                return Some(name.to_string());
            }
        }
    }
    None
}
