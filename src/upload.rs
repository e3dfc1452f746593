//! Artifact upload through the CI artifact facility

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::warn;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::json;

use crate::error::{ApiError, Error, Result};

/// Facility response: the items that failed to upload, if any.
#[derive(Debug, Clone, Default)]
pub struct UploadResponse {
    pub failed_items: Vec<String>,
}

/// Overall upload result. Partial failure is data, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadOutcome {
    pub success: bool,
}

/// Seam over the host CI's artifact-upload facility
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Upload `files` into the named artifact container. `root` is the base
    /// path file names are reported relative to. One failed file must not
    /// abort the rest.
    async fn upload_artifact(
        &self,
        container: &str,
        files: &[PathBuf],
        root: &Path,
    ) -> Result<UploadResponse>;
}

/// Upload the staged file list and fold the facility's failed-item list into
/// a boolean outcome. Partial failure logs a warning and reports
/// `success: false` without failing the run.
pub async fn upload(
    sink: &dyn ArtifactSink,
    container: &str,
    files: &[PathBuf],
    root: &Path,
) -> Result<UploadOutcome> {
    let response = sink.upload_artifact(container, files, root).await?;

    if !response.failed_items.is_empty() {
        warn!(
            "{} artifact file(s) failed to upload: {}",
            response.failed_items.len(),
            response.failed_items.join(", ")
        );
    }

    Ok(UploadOutcome {
        success: response.failed_items.is_empty(),
    })
}

/// API version spoken by the Actions runner artifact service
const API_VERSION: &str = "6.0-preview";

/// Client for the GitHub Actions runner artifact service.
///
/// Protocol: create a file container for the artifact, PUT each file's bytes
/// into it, then finalize with the total size. Per-file failures are
/// collected instead of aborting the batch.
pub struct ActionsArtifactClient {
    http: HttpClient,
    runtime_url: String,
    runtime_token: String,
    run_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContainerResponse {
    file_container_resource_url: String,
}

impl ActionsArtifactClient {
    pub fn new(
        runtime_url: impl Into<String>,
        runtime_token: impl Into<String>,
        run_id: impl Into<String>,
    ) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http,
            runtime_url: runtime_url.into().trim_end_matches('/').to_string(),
            runtime_token: runtime_token.into(),
            run_id: run_id.into(),
        })
    }

    /// Build a client from the runner-provided environment.
    pub fn from_env() -> Result<Self> {
        let runtime_url = std::env::var("ACTIONS_RUNTIME_URL")
            .map_err(|_| Error::Context("ACTIONS_RUNTIME_URL is not set".to_string()))?;
        let runtime_token = std::env::var("ACTIONS_RUNTIME_TOKEN")
            .map_err(|_| Error::Context("ACTIONS_RUNTIME_TOKEN is not set".to_string()))?;
        let run_id = std::env::var("GITHUB_RUN_ID")
            .map_err(|_| Error::Context("GITHUB_RUN_ID is not set".to_string()))?;

        Self::new(runtime_url, runtime_token, run_id)
    }

    fn artifacts_url(&self) -> String {
        format!(
            "{}/_apis/pipelines/workflows/{}/artifacts",
            self.runtime_url, self.run_id
        )
    }

    async fn create_container(&self, container: &str) -> Result<String> {
        let response = self
            .http
            .post(self.artifacts_url())
            .query(&[("api-version", API_VERSION)])
            .bearer_auth(&self.runtime_token)
            .json(&json!({ "type": "actions_storage", "name": container }))
            .send()
            .await
            .map_err(ApiError::from)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_msg = response
                .text()
                .await
                .unwrap_or_else(|_| format!("Failed to create artifact container: {}", status));
            return Err(ApiError::ServerError(error_msg).into());
        }

        let container_response = response.json::<ContainerResponse>().await.map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse container response: {}", e))
        })?;

        Ok(container_response.file_container_resource_url)
    }

    async fn put_file(&self, resource_url: &str, item_path: &str, bytes: Vec<u8>) -> Result<()> {
        let total = bytes.len();
        let content_range = if total == 0 {
            "bytes 0-0/0".to_string()
        } else {
            format!("bytes 0-{}/{}", total - 1, total)
        };

        let response = self
            .http
            .put(resource_url)
            .query(&[("itemPath", item_path)])
            .bearer_auth(&self.runtime_token)
            .header("Content-Type", "application/octet-stream")
            .header("Content-Range", content_range)
            .body(bytes)
            .send()
            .await
            .map_err(ApiError::from)?;

        if !response.status().is_success() {
            return Err(ApiError::ServerError(format!(
                "Upload of {} failed with status {}",
                item_path,
                response.status()
            ))
            .into());
        }
        Ok(())
    }

    async fn finalize(&self, container: &str, total_size: usize) -> Result<()> {
        let response = self
            .http
            .patch(self.artifacts_url())
            .query(&[("api-version", API_VERSION), ("artifactName", container)])
            .bearer_auth(&self.runtime_token)
            .json(&json!({ "size": total_size }))
            .send()
            .await
            .map_err(ApiError::from)?;

        if !response.status().is_success() {
            return Err(ApiError::ServerError(format!(
                "Failed to finalize artifact: {}",
                response.status()
            ))
            .into());
        }
        Ok(())
    }
}

#[async_trait]
impl ArtifactSink for ActionsArtifactClient {
    async fn upload_artifact(
        &self,
        container: &str,
        files: &[PathBuf],
        root: &Path,
    ) -> Result<UploadResponse> {
        let resource_url = self.create_container(container).await?;

        let mut failed_items = Vec::new();
        let mut total_size = 0usize;

        for file in files {
            let relative = file.strip_prefix(root).unwrap_or(file);
            let item_path = format!("{}/{}", container, relative.display());

            let bytes = match std::fs::read(file) {
                Ok(bytes) => bytes,
                Err(err) => {
                    warn!("Failed to read {}: {}", file.display(), err);
                    failed_items.push(item_path);
                    continue;
                }
            };
            let size = bytes.len();

            match self.put_file(&resource_url, &item_path, bytes).await {
                Ok(()) => total_size += size,
                Err(err) => {
                    warn!("Failed to upload {}: {}", item_path, err);
                    failed_items.push(item_path);
                }
            }
        }

        self.finalize(container, total_size).await?;

        Ok(UploadResponse { failed_items })
    }
}
