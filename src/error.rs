//! Error types for scanwatch

use thiserror::Error;

/// Result type alias for scanwatch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
#[derive(Debug, Error)]
#[allow(dead_code)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CI context error: {0}")]
    Context(String),

    #[error("Private repositories are not supported.")]
    PrivateRepository,

    #[error("Operation failed: {0}")]
    Other(String),
}

/// Errors from the scan platform and artifact-service APIs
#[derive(Debug, Error)]
#[allow(dead_code)]
pub enum ApiError {
    /// The remote has no record yet for this commit. Always retryable.
    #[error("Repo/commit not registered with the scan platform yet")]
    NotRegistered,

    /// No downloadable archive exists for this scan result. Non-fatal.
    #[error("No SBOM archive found for this scan result")]
    ArchiveNotFound,

    #[error("Malformed response from server: {0}")]
    MalformedResponse(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    #[error("Unexpected status code: {0}")]
    Unexpected(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Network("Request timed out".to_string())
        } else if err.is_connect() {
            ApiError::Network("Failed to connect to API".to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl ApiError {
    /// Whether the caller may proceed without the resource (absence of an
    /// archive is a valid outcome, not a failure).
    #[allow(dead_code)]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ApiError::NotRegistered | ApiError::ArchiveNotFound)
    }
}
