//! Request orchestration
//!
//! [`Gateway`] is what the HTTP handlers talk to. For each call it validates
//! the caller's arguments and extracts the forwarded backend token. It then
//! hands the work to the object storage client or the temp URL issuer. All
//! local checks happen before any backend round-trip.

use crate::auth::TokenExtractor;
use crate::{ApiError, ErrorCode};
use axum::http::{HeaderName, HeaderValue};
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;
use swiftgate_client::{ConnectionStatus, DownloadedObject, ObjectStorageClient, UploadResult};
use swiftgate_core::metadata::object_meta_header;
use swiftgate_core::{
    ConfigResolver, ContainerInfo, ObjectMetadata, SignedUrlIssuer, TempUrlGrant, TempUrlMethod,
    MAX_TTL_SECS, MIN_TTL_SECS,
};
use tracing::info;

/// Smallest listing page the gateway accepts
pub const MIN_LIST_LIMIT: i64 = 1;
/// Largest listing page the gateway accepts
pub const MAX_LIST_LIMIT: i64 = 10_000;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// An upload as received from the caller
#[derive(Clone, Debug, Default)]
pub struct UploadRequest {
    pub container: String,
    pub object_name: String,
    /// `None` when the request carried no file part
    pub data: Option<Bytes>,
    pub content_type: Option<String>,
    pub metadata: Option<HashMap<String, String>>,
}

/// A completed upload
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadOutcome {
    pub container: String,
    pub object_name: String,
    pub size: usize,
    pub content_type: String,
    pub result: UploadResult,
}

/// A temp URL request as received from the caller
#[derive(Clone, Debug, Default)]
pub struct TempUrlRequest {
    pub container: String,
    pub object_name: String,
    pub expires_in_seconds: i64,
    pub method: Option<String>,
}

/// Composes credential extraction, configuration resolution and backend calls
#[derive(Clone)]
pub struct Gateway {
    extractor: TokenExtractor,
    resolver: Arc<ConfigResolver>,
    client: ObjectStorageClient,
    issuer: SignedUrlIssuer,
}

impl Gateway {
    /// The client must share `resolver` so that both see the same configurations
    pub fn new(resolver: Arc<ConfigResolver>, client: ObjectStorageClient) -> Self {
        Self {
            extractor: TokenExtractor::new(),
            resolver,
            client,
            issuer: SignedUrlIssuer::new(),
        }
    }

    pub fn resolver(&self) -> &Arc<ConfigResolver> {
        &self.resolver
    }

    pub fn extractor(&self) -> &TokenExtractor {
        &self.extractor
    }

    fn token(&self, auth_header: Option<&str>) -> Result<String, ApiError> {
        Ok(self.extractor.extract_token(auth_header.unwrap_or_default())?)
    }

    pub async fn upload(
        &self,
        auth_header: Option<&str>,
        request: UploadRequest,
    ) -> Result<UploadOutcome, ApiError> {
        let data = request
            .data
            .ok_or_else(|| ApiError::invalid_argument("File is required"))?;
        validate_container(&request.container)?;
        validate_object_name(&request.object_name)?;
        validate_metadata(request.metadata.as_ref())?;
        let token = self.token(auth_header)?;

        let content_type = request
            .content_type
            .filter(|ct| !ct.trim().is_empty())
            .unwrap_or_else(|| guess_content_type(&request.object_name));
        let size = data.len();

        info!("Uploading object: {}/{}", request.container, request.object_name);
        let result = self
            .client
            .upload(
                &token,
                &request.container,
                &request.object_name,
                data,
                &content_type,
                request.metadata.as_ref(),
            )
            .await?;

        Ok(UploadOutcome {
            container: request.container,
            object_name: request.object_name,
            size,
            content_type,
            result,
        })
    }

    pub async fn download(
        &self,
        auth_header: Option<&str>,
        container: &str,
        object_name: &str,
    ) -> Result<DownloadedObject, ApiError> {
        validate_container(container)?;
        validate_object_name(object_name)?;
        let token = self.token(auth_header)?;

        info!("Downloading object: {}/{}", container, object_name);
        Ok(self.client.download(&token, container, object_name).await?)
    }

    pub async fn stat(
        &self,
        auth_header: Option<&str>,
        container: &str,
        object_name: &str,
    ) -> Result<ObjectMetadata, ApiError> {
        validate_container(container)?;
        validate_object_name(object_name)?;
        let token = self.token(auth_header)?;

        Ok(self.client.stat(&token, container, object_name).await?)
    }

    pub async fn delete(
        &self,
        auth_header: Option<&str>,
        container: &str,
        object_name: &str,
    ) -> Result<(), ApiError> {
        validate_container(container)?;
        validate_object_name(object_name)?;
        let token = self.token(auth_header)?;

        info!("Deleting object: {}/{}", container, object_name);
        Ok(self.client.delete(&token, container, object_name).await?)
    }

    pub async fn list(
        &self,
        auth_header: Option<&str>,
        container: &str,
        prefix: Option<&str>,
        limit: Option<i64>,
    ) -> Result<Vec<ObjectMetadata>, ApiError> {
        validate_container(container)?;
        let limit = validate_limit(limit)?;
        let token = self.token(auth_header)?;

        Ok(self.client.list(&token, container, prefix, limit).await?)
    }

    pub async fn create_container(
        &self,
        auth_header: Option<&str>,
        name: &str,
        is_public: bool,
    ) -> Result<(), ApiError> {
        validate_container(name)?;
        let token = self.token(auth_header)?;

        info!("Creating container: {} (public: {})", name, is_public);
        Ok(self.client.create_container(&token, name, is_public).await?)
    }

    pub async fn list_containers(&self, auth_header: Option<&str>) -> Result<Vec<ContainerInfo>, ApiError> {
        let token = self.token(auth_header)?;
        Ok(self.client.list_containers(&token).await?)
    }

    /// Issue a temp URL; no caller credential is involved
    pub async fn temp_url(&self, request: TempUrlRequest) -> Result<TempUrlGrant, ApiError> {
        validate_container(&request.container)?;
        validate_object_name(&request.object_name)?;
        let ttl = validate_ttl(request.expires_in_seconds)?;
        let method = parse_method(request.method.as_deref())?;

        let config = self.resolver.resolve_active().await?;
        info!(
            "Generating temp URL for: {}/{} ({} {}s)",
            request.container, request.object_name, method, ttl
        );
        Ok(self
            .issuer
            .issue(&config, &request.container, &request.object_name, ttl, method)?)
    }

    /// Probe the backend; only credential problems are raised
    pub async fn check_connection(&self, auth_header: Option<&str>) -> Result<ConnectionStatus, ApiError> {
        let token = self.token(auth_header)?;
        Ok(self.client.check_connection(&token).await)
    }
}

fn guess_content_type(object_name: &str) -> String {
    mime_guess::from_path(object_name)
        .first_raw()
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .to_string()
}

fn validate_container(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::invalid_argument("container name must not be empty"));
    }
    if name.contains('/') {
        return Err(ApiError::invalid_argument("container name must not contain '/'"));
    }
    if is_dot_segment(name) {
        return Err(ApiError::invalid_argument("container name must not be '.' or '..'"));
    }
    Ok(())
}

fn validate_object_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::invalid_argument("object name must not be empty"));
    }
    // URL parsers collapse these, which would address a different object or container
    if name.split('/').any(is_dot_segment) {
        return Err(ApiError::invalid_argument(
            "object name must not contain '.' or '..' path segments",
        ));
    }
    Ok(())
}

fn is_dot_segment(segment: &str) -> bool {
    matches!(segment, "." | "..")
}

/// Every metadata pair must be sendable as an `X-Object-Meta-*` header
fn validate_metadata(metadata: Option<&HashMap<String, String>>) -> Result<(), ApiError> {
    for (key, value) in metadata.into_iter().flatten() {
        if key.is_empty() || HeaderName::from_bytes(object_meta_header(key).as_bytes()).is_err() {
            return Err(ApiError::invalid_argument(format!(
                "metadata key '{}' is not a valid header name",
                key
            )));
        }
        if HeaderValue::from_str(value).is_err() {
            return Err(ApiError::invalid_argument(format!(
                "metadata value for '{}' is not a valid header value",
                key
            )));
        }
    }
    Ok(())
}

fn validate_ttl(secs: i64) -> Result<u64, ApiError> {
    u64::try_from(secs)
        .ok()
        .filter(|ttl| (MIN_TTL_SECS..=MAX_TTL_SECS).contains(ttl))
        .ok_or_else(|| {
            ApiError::invalid_argument(format!(
                "expiresInSeconds must be between {} and {}",
                MIN_TTL_SECS, MAX_TTL_SECS
            ))
        })
}

fn validate_limit(limit: Option<i64>) -> Result<Option<u32>, ApiError> {
    match limit {
        None => Ok(None),
        Some(n) if (MIN_LIST_LIMIT..=MAX_LIST_LIMIT).contains(&n) => Ok(u32::try_from(n).ok()),
        Some(_) => Err(ApiError::invalid_argument(format!(
            "limit must be between {} and {}",
            MIN_LIST_LIMIT, MAX_LIST_LIMIT
        ))),
    }
}

fn parse_method(method: Option<&str>) -> Result<TempUrlMethod, ApiError> {
    match method.map(str::trim).filter(|m| !m.is_empty()) {
        None => Ok(TempUrlMethod::default()),
        Some(m) => m
            .parse()
            .map_err(|e: String| ApiError::new(ErrorCode::InvalidArgument, e)),
    }
}
