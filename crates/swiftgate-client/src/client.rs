//! Swift object storage client

use crate::error::BackendFailure;
use crate::types::{SwiftContainerEntry, SwiftObjectEntry};
use crate::{ClientConfig, ClientError, ConnectionStatus, DownloadedObject, Result, UploadResult};
use bytes::Bytes;
use reqwest::{header, Client, RequestBuilder, Response};
use std::collections::HashMap;
use std::sync::Arc;
use swiftgate_core::metadata::{object_meta_header, parse_timestamp, strip_object_meta_prefix};
use swiftgate_core::{ConfigResolver, ContainerInfo, ObjectMetadata};
use tracing::{debug, info, instrument, warn};

/// Header carrying the forwarded backend token
pub const X_AUTH_TOKEN: &str = "X-Auth-Token";
/// Container ACL header
pub const X_CONTAINER_READ: &str = "X-Container-Read";
/// ACL granting anonymous read and listing
pub const PUBLIC_READ_ACL: &str = ".r:*,.rlistings";

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Performs object and container operations against the active Swift backend
///
/// Every operation resolves the active configuration first, then issues one
/// request authenticated with the caller's forwarded token. The HTTP client
/// (and its connection pool) is created once and shared across calls.
#[derive(Clone)]
pub struct ObjectStorageClient {
    http: Client,
    resolver: Arc<ConfigResolver>,
}

impl ObjectStorageClient {
    /// Create a client with its own connection pool
    pub fn new(resolver: Arc<ConfigResolver>, config: &ClientConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(ClientError::ClientBuild)?;

        Ok(Self::with_http_client(resolver, http))
    }

    /// Create a client around an existing `reqwest::Client`
    pub fn with_http_client(resolver: Arc<ConfigResolver>, http: Client) -> Self {
        Self { http, resolver }
    }

    /// The resolver used for every operation
    pub fn resolver(&self) -> &Arc<ConfigResolver> {
        &self.resolver
    }

    // ==================== Object Operations ====================

    /// Upload an object
    #[instrument(skip(self, token, data, metadata), fields(size = data.len()))]
    pub async fn upload(
        &self,
        token: &str,
        container: &str,
        object_name: &str,
        data: Bytes,
        content_type: &str,
        metadata: Option<&HashMap<String, String>>,
    ) -> Result<UploadResult> {
        let config = self.resolver.resolve_active().await?;
        let url = config.object_url(container, object_name);

        let mut request = self
            .http
            .put(&url)
            .header(X_AUTH_TOKEN, token)
            .header(header::CONTENT_TYPE, content_type)
            .header(header::CONTENT_LENGTH, data.len());

        for (key, value) in metadata.into_iter().flatten() {
            request = request.header(object_meta_header(key), value.as_str());
        }

        debug!("Sending PUT request to {}", url);
        let response = self
            .execute(request.body(data))
            .await
            .map_err(|failure| {
                warn!(error = %failure.message(), "Upload rejected");
                ClientError::upload(failure)
            })?;

        let etag = etag_of(&response).unwrap_or_default();
        info!("Uploaded object {}/{}", container, object_name);

        Ok(UploadResult { etag, url })
    }

    /// Download an object with its content type and user metadata
    #[instrument(skip(self, token))]
    pub async fn download(&self, token: &str, container: &str, object_name: &str) -> Result<DownloadedObject> {
        let config = self.resolver.resolve_active().await?;
        let url = config.object_url(container, object_name);

        debug!("Sending GET request to {}", url);
        let response = self
            .execute(self.http.get(&url).header(X_AUTH_TOKEN, token))
            .await
            .map_err(|failure| object_failure(failure, container, object_name, ClientError::download))?;

        let content_type = header_str(&response, header::CONTENT_TYPE)
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();
        let metadata = user_metadata(&response);
        let etag = etag_of(&response);

        let data = response
            .bytes()
            .await
            .map_err(|e| ClientError::download(BackendFailure::Transport(e)))?;

        Ok(DownloadedObject {
            data,
            content_type,
            metadata,
            etag,
        })
    }

    /// Fetch object metadata without the body
    #[instrument(skip(self, token))]
    pub async fn stat(&self, token: &str, container: &str, object_name: &str) -> Result<ObjectMetadata> {
        let config = self.resolver.resolve_active().await?;
        let url = config.object_url(container, object_name);

        debug!("Sending HEAD request to {}", url);
        let response = self
            .execute(self.http.head(&url).header(X_AUTH_TOKEN, token))
            .await
            .map_err(|failure| object_failure(failure, container, object_name, ClientError::download))?;

        Ok(ObjectMetadata {
            name: object_name.to_string(),
            size: header_str(&response, header::CONTENT_LENGTH)
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
            last_modified: header_str(&response, header::LAST_MODIFIED).and_then(parse_timestamp),
            content_type: header_str(&response, header::CONTENT_TYPE).map(str::to_string),
            hash: etag_of(&response),
            metadata: user_metadata(&response),
        })
    }

    /// Delete an object
    #[instrument(skip(self, token))]
    pub async fn delete(&self, token: &str, container: &str, object_name: &str) -> Result<()> {
        let config = self.resolver.resolve_active().await?;
        let url = config.object_url(container, object_name);

        debug!("Sending DELETE request to {}", url);
        self.execute(self.http.delete(&url).header(X_AUTH_TOKEN, token))
            .await
            .map_err(|failure| object_failure(failure, container, object_name, ClientError::delete))?;

        info!("Deleted object {}/{}", container, object_name);
        Ok(())
    }

    /// List objects in a container
    #[instrument(skip(self, token))]
    pub async fn list(
        &self,
        token: &str,
        container: &str,
        prefix: Option<&str>,
        limit: Option<u32>,
    ) -> Result<Vec<ObjectMetadata>> {
        let config = self.resolver.resolve_active().await?;
        let url = config.container_url(container);

        let mut query = vec![("format", "json".to_string())];
        if let Some(prefix) = prefix.filter(|p| !p.is_empty()) {
            query.push(("prefix", prefix.to_string()));
        }
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }

        debug!("Sending GET request to {}", url);
        let entries: Vec<SwiftObjectEntry> = self
            .fetch_json(self.http.get(&url).header(X_AUTH_TOKEN, token).query(&query))
            .await
            .map_err(|failure| {
                if failure.is_not_found() {
                    ClientError::ContainerNotFound(container.to_string())
                } else {
                    ClientError::list(failure)
                }
            })?;

        Ok(entries
            .into_iter()
            .filter_map(SwiftObjectEntry::into_metadata)
            .collect())
    }

    // ==================== Container Operations ====================

    /// Create a container, optionally readable and listable by anyone
    #[instrument(skip(self, token))]
    pub async fn create_container(&self, token: &str, name: &str, is_public: bool) -> Result<()> {
        let config = self.resolver.resolve_active().await?;
        let url = config.container_url(name);

        let mut request = self
            .http
            .put(&url)
            .header(X_AUTH_TOKEN, token)
            .header(header::CONTENT_LENGTH, 0);
        if is_public {
            request = request.header(X_CONTAINER_READ, PUBLIC_READ_ACL);
        }

        debug!("Sending PUT request to {}", url);
        self.execute(request)
            .await
            .map_err(ClientError::create_container)?;

        info!("Created container {}", name);
        Ok(())
    }

    /// List the account's containers
    #[instrument(skip(self, token))]
    pub async fn list_containers(&self, token: &str) -> Result<Vec<ContainerInfo>> {
        let config = self.resolver.resolve_active().await?;
        let url = config.account_url();

        debug!("Sending GET request to {}", url);
        let entries: Vec<SwiftContainerEntry> = self
            .fetch_json(
                self.http
                    .get(&url)
                    .header(X_AUTH_TOKEN, token)
                    .query(&[("format", "json")]),
            )
            .await
            .map_err(ClientError::list)?;

        Ok(entries.into_iter().map(ContainerInfo::from).collect())
    }

    /// Probe the account root; never fails
    #[instrument(skip(self, token))]
    pub async fn check_connection(&self, token: &str) -> ConnectionStatus {
        let config = match self.resolver.resolve_active().await {
            Ok(config) => config,
            Err(e) => return ConnectionStatus::failed(e),
        };

        let url = config.account_url();
        debug!("Sending HEAD request to {}", url);
        match self.execute(self.http.head(&url).header(X_AUTH_TOKEN, token)).await {
            Ok(_) => ConnectionStatus::connected(),
            Err(failure) => {
                warn!(error = %failure.message(), "Swift connection check failed");
                ConnectionStatus::failed(failure.message())
            }
        }
    }

    // ==================== Helper Methods ====================

    async fn execute(&self, request: RequestBuilder) -> std::result::Result<Response, BackendFailure> {
        let response = request.send().await.map_err(BackendFailure::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(BackendFailure::Status(status, text));
        }

        Ok(response)
    }

    /// Run a listing request; an empty body (`204 No Content`) is an empty list
    async fn fetch_json<T: serde::de::DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> std::result::Result<Vec<T>, BackendFailure> {
        let response = self.execute(request).await?;
        let body = response.bytes().await.map_err(BackendFailure::Transport)?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        serde_json::from_slice(&body)
            .map_err(|e| BackendFailure::Body(format!("invalid listing response: {}", e)))
    }
}

fn object_failure(
    failure: BackendFailure,
    container: &str,
    object_name: &str,
    otherwise: fn(BackendFailure) -> ClientError,
) -> ClientError {
    if failure.is_not_found() {
        ClientError::ObjectNotFound {
            container: container.to_string(),
            object: object_name.to_string(),
        }
    } else {
        otherwise(failure)
    }
}

fn header_str(response: &Response, name: header::HeaderName) -> Option<&str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}

fn etag_of(response: &Response) -> Option<String> {
    header_str(response, header::ETAG).map(|s| s.trim_matches('"').to_string())
}

fn user_metadata(response: &Response) -> HashMap<String, String> {
    let mut metadata = HashMap::new();
    for (name, value) in response.headers() {
        if let Some(key) = strip_object_meta_prefix(name.as_str()) {
            if let Ok(v) = value.to_str() {
                metadata.insert(key.to_string(), v.to_string());
            }
        }
    }
    metadata
}
