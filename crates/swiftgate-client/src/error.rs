//! Client error types

use reqwest::StatusCode;
use swiftgate_core::CoreError;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, ClientError>;

/// Object storage client errors
///
/// Transport and backend failures are always reclassified into the operation
/// kind that was attempted; a raw `reqwest::Error` never escapes an operation.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Configuration precondition (e.g. no active configuration)
    #[error(transparent)]
    Config(#[from] CoreError),

    /// Object not found
    #[error("object not found: {container}/{object}")]
    ObjectNotFound { container: String, object: String },

    /// Container not found
    #[error("container not found: {0}")]
    ContainerNotFound(String),

    /// Upload failed
    #[error("failed to upload object: {message}")]
    UploadFailed { status: Option<u16>, message: String },

    /// Download failed
    #[error("failed to download object: {message}")]
    DownloadFailed { status: Option<u16>, message: String },

    /// Delete failed
    #[error("failed to delete object: {message}")]
    DeleteFailed { status: Option<u16>, message: String },

    /// Listing failed
    #[error("failed to list: {message}")]
    ListFailed { status: Option<u16>, message: String },

    /// Container creation failed
    #[error("failed to create container: {message}")]
    CreateContainerFailed { status: Option<u16>, message: String },

    /// The HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(reqwest::Error),
}

impl ClientError {
    /// Upstream HTTP status, when the backend answered
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::UploadFailed { status, .. }
            | Self::DownloadFailed { status, .. }
            | Self::DeleteFailed { status, .. }
            | Self::ListFailed { status, .. }
            | Self::CreateContainerFailed { status, .. } => *status,
            _ => None,
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ObjectNotFound { .. } | Self::ContainerNotFound(_))
    }

    pub(crate) fn upload(failure: BackendFailure) -> Self {
        Self::UploadFailed { status: failure.status(), message: failure.message() }
    }

    pub(crate) fn download(failure: BackendFailure) -> Self {
        Self::DownloadFailed { status: failure.status(), message: failure.message() }
    }

    pub(crate) fn delete(failure: BackendFailure) -> Self {
        Self::DeleteFailed { status: failure.status(), message: failure.message() }
    }

    pub(crate) fn list(failure: BackendFailure) -> Self {
        Self::ListFailed { status: failure.status(), message: failure.message() }
    }

    pub(crate) fn create_container(failure: BackendFailure) -> Self {
        Self::CreateContainerFailed { status: failure.status(), message: failure.message() }
    }
}

/// Why a single backend exchange failed
#[derive(Debug)]
pub(crate) enum BackendFailure {
    /// No usable response (connect error, timeout, invalid request)
    Transport(reqwest::Error),
    /// Non-2xx response with its body
    Status(StatusCode, String),
    /// 2xx response whose body could not be read or parsed
    Body(String),
}

impl BackendFailure {
    pub(crate) fn status(&self) -> Option<u16> {
        match self {
            Self::Status(status, _) => Some(status.as_u16()),
            _ => None,
        }
    }

    pub(crate) fn is_not_found(&self) -> bool {
        matches!(self, Self::Status(status, _) if *status == StatusCode::NOT_FOUND)
    }

    pub(crate) fn message(&self) -> String {
        match self {
            Self::Transport(e) if e.is_timeout() => format!("request timed out: {}", e),
            Self::Transport(e) => e.to_string(),
            Self::Status(status, body) if body.trim().is_empty() => status.to_string(),
            Self::Status(status, body) => format!("{}: {}", status, body.trim()),
            Self::Body(message) => message.clone(),
        }
    }
}
