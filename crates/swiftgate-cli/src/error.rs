//! Error types and gateway error codes

use crate::auth::CredentialError;
use crate::middleware::current_request_id;
use axum::{
    extract::multipart::MultipartRejection,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use swiftgate_client::ClientError;
use swiftgate_core::CoreError;
use thiserror::Error;

/// Response header carrying the request id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Gateway error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidCredentialFormat,
    MalformedCredential,
    CredentialExpired,
    BackendTokenMissing,
    ProjectIdMissing,
    NoActiveConfig,
    ConfigNotFound,
    DuplicateName,
    SigningKeyNotConfigured,
    InvalidConfig,
    InvalidArgument,
    ObjectNotFound,
    ContainerNotFound,
    UploadFailed,
    DownloadFailed,
    DeleteFailed,
    ListFailed,
    CreateContainerFailed,
    SlowDown,
    InternalError,
}

impl ErrorCode {
    /// Get the error code string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidCredentialFormat => "InvalidCredentialFormat",
            Self::MalformedCredential => "MalformedCredential",
            Self::CredentialExpired => "CredentialExpired",
            Self::BackendTokenMissing => "BackendTokenMissing",
            Self::ProjectIdMissing => "ProjectIdMissing",
            Self::NoActiveConfig => "NoActiveConfig",
            Self::ConfigNotFound => "ConfigNotFound",
            Self::DuplicateName => "DuplicateName",
            Self::SigningKeyNotConfigured => "SigningKeyNotConfigured",
            Self::InvalidConfig => "InvalidConfig",
            Self::InvalidArgument => "InvalidArgument",
            Self::ObjectNotFound => "ObjectNotFound",
            Self::ContainerNotFound => "ContainerNotFound",
            Self::UploadFailed => "UploadFailed",
            Self::DownloadFailed => "DownloadFailed",
            Self::DeleteFailed => "DeleteFailed",
            Self::ListFailed => "ListFailed",
            Self::CreateContainerFailed => "CreateContainerFailed",
            Self::SlowDown => "SlowDown",
            Self::InternalError => "InternalError",
        }
    }

    /// Get the HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidCredentialFormat
            | Self::MalformedCredential
            | Self::CredentialExpired
            | Self::BackendTokenMissing
            | Self::ProjectIdMissing => StatusCode::UNAUTHORIZED,
            Self::NoActiveConfig
            | Self::ConfigNotFound
            | Self::ObjectNotFound
            | Self::ContainerNotFound => StatusCode::NOT_FOUND,
            Self::DuplicateName
            | Self::SigningKeyNotConfigured
            | Self::InvalidConfig
            | Self::InvalidArgument => StatusCode::BAD_REQUEST,
            Self::UploadFailed
            | Self::DownloadFailed
            | Self::DeleteFailed
            | Self::ListFailed
            | Self::CreateContainerFailed => StatusCode::BAD_GATEWAY,
            Self::SlowDown => StatusCode::TOO_MANY_REQUESTS,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// API error type
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{message}")]
    Gateway { code: ErrorCode, message: String },

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Gateway {
            code,
            message: message.into(),
        }
    }

    /// Caller-facing validation failure
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidArgument, message)
    }

    /// Get the error code
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Gateway { code, .. } => *code,
            Self::Credential(e) => match e {
                CredentialError::InvalidFormat => ErrorCode::InvalidCredentialFormat,
                CredentialError::Malformed(_) => ErrorCode::MalformedCredential,
                CredentialError::Expired => ErrorCode::CredentialExpired,
                CredentialError::BackendTokenMissing => ErrorCode::BackendTokenMissing,
                CredentialError::ProjectIdMissing => ErrorCode::ProjectIdMissing,
            },
            Self::Core(e) => core_code(e),
            Self::Client(e) => match e {
                ClientError::Config(core) => core_code(core),
                ClientError::ObjectNotFound { .. } => ErrorCode::ObjectNotFound,
                ClientError::ContainerNotFound(_) => ErrorCode::ContainerNotFound,
                ClientError::UploadFailed { .. } => ErrorCode::UploadFailed,
                ClientError::DownloadFailed { .. } => ErrorCode::DownloadFailed,
                ClientError::DeleteFailed { .. } => ErrorCode::DeleteFailed,
                ClientError::ListFailed { .. } => ErrorCode::ListFailed,
                ClientError::CreateContainerFailed { .. } => ErrorCode::CreateContainerFailed,
                ClientError::ClientBuild(_) => ErrorCode::InternalError,
            },
            Self::Internal(_) => ErrorCode::InternalError,
        }
    }
}

// Extractor rejections are caller mistakes and get the regular error body

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::invalid_argument(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::invalid_argument(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::invalid_argument(rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::invalid_argument(rejection.body_text())
    }
}

fn core_code(error: &CoreError) -> ErrorCode {
    match error {
        CoreError::NoActiveConfig => ErrorCode::NoActiveConfig,
        CoreError::ConfigNotFound(_) => ErrorCode::ConfigNotFound,
        CoreError::DuplicateName(_) => ErrorCode::DuplicateName,
        CoreError::SigningKeyNotConfigured => ErrorCode::SigningKeyNotConfigured,
        CoreError::InvalidConfig(_) => ErrorCode::InvalidConfig,
        CoreError::Store(_) => ErrorCode::InternalError,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.error_code();
        let status = code.status_code();
        let request_id = current_request_id().unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        if status.is_server_error() {
            tracing::error!(code = code.as_str(), error = %self, "Request failed");
        } else {
            tracing::debug!(code = code.as_str(), error = %self, "Request rejected");
        }

        let body = json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "requestId": request_id,
            }
        });

        let mut response = (status, Json(body)).into_response();
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_errors_are_unauthorized() {
        for e in [
            CredentialError::InvalidFormat,
            CredentialError::Malformed("bad".into()),
            CredentialError::Expired,
            CredentialError::BackendTokenMissing,
            CredentialError::ProjectIdMissing,
        ] {
            assert_eq!(ApiError::from(e).error_code().status_code(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn test_config_error_statuses() {
        let status = |e: CoreError| ApiError::from(e).error_code().status_code();
        assert_eq!(status(CoreError::NoActiveConfig), StatusCode::NOT_FOUND);
        assert_eq!(status(CoreError::ConfigNotFound("x".into())), StatusCode::NOT_FOUND);
        assert_eq!(status(CoreError::DuplicateName("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status(CoreError::SigningKeyNotConfigured), StatusCode::BAD_REQUEST);
        assert_eq!(status(CoreError::Store("down".into())), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_client_error_statuses() {
        let no_config = ApiError::from(ClientError::Config(CoreError::NoActiveConfig));
        assert_eq!(no_config.error_code(), ErrorCode::NoActiveConfig);

        let missing = ApiError::from(ClientError::ObjectNotFound {
            container: "c".into(),
            object: "o".into(),
        });
        assert_eq!(missing.error_code().status_code(), StatusCode::NOT_FOUND);

        let failed = ApiError::from(ClientError::UploadFailed {
            status: Some(503),
            message: "503 Service Unavailable".into(),
        });
        assert_eq!(failed.error_code(), ErrorCode::UploadFailed);
        assert_eq!(failed.error_code().status_code(), StatusCode::BAD_GATEWAY);
        assert!(failed.to_string().contains("503"));
    }

    #[test]
    fn test_error_response_carries_request_id() {
        let response = ApiError::invalid_argument("limit out of range").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    }
}
