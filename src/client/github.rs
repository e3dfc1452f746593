//! Repository visibility check against the source-control host API

use std::time::Duration;

use reqwest::{Client as HttpClient, StatusCode};
use serde::Deserialize;

use crate::error::{ApiError, Result};

/// Default GitHub REST API base URL
pub const DEFAULT_GITHUB_API: &str = "https://api.github.com";

#[derive(Debug, Deserialize)]
struct RepoInfo {
    private: bool,
}

/// Check whether `owner/repo` is a public repository.
///
/// The token is optional: anonymous requests resolve public repositories,
/// which are the only ones this tool supports. A 404 from the host means the
/// repository is not visible to the caller and is reported as not public.
pub async fn is_repo_public(
    api_base: &str,
    token: Option<&str>,
    owner: &str,
    repo: &str,
) -> Result<bool> {
    let http = HttpClient::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| ApiError::Network(e.to_string()))?;

    let url = format!("{}/repos/{}/{}", api_base, owner, repo);
    let mut request = http
        .get(&url)
        .header("User-Agent", concat!("scanwatch/", env!("CARGO_PKG_VERSION")))
        .header("Accept", "application/vnd.github+json");

    if let Some(token) = token {
        request = request.header("Authorization", format!("Bearer {}", token));
    }

    let response = request.send().await.map_err(ApiError::from)?;

    let status = response.status();
    match status {
        status if status.is_success() => {
            let info = response.json::<RepoInfo>().await.map_err(|e| {
                ApiError::InvalidResponse(format!("Failed to parse repository info: {}", e))
            })?;
            Ok(!info.private)
        }
        StatusCode::NOT_FOUND => Ok(false),
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
