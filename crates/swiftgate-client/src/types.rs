//! Operation results and backend wire shapes

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use swiftgate_core::{ContainerInfo, ObjectMetadata};

/// Result of an upload
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UploadResult {
    /// ETag reported by the backend (quotes stripped)
    pub etag: String,
    /// Canonical object URL
    pub url: String,
}

/// A downloaded object
#[derive(Clone, Debug)]
pub struct DownloadedObject {
    /// Object data
    pub data: Bytes,
    /// Content type, `application/octet-stream` when the backend sent none
    pub content_type: String,
    /// User metadata, keys without the `x-object-meta-` prefix
    pub metadata: HashMap<String, String>,
    /// ETag
    pub etag: Option<String>,
}

/// Outcome of a connectivity probe
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConnectionStatus {
    pub connected: bool,
    pub message: String,
}

impl ConnectionStatus {
    pub(crate) fn connected() -> Self {
        Self {
            connected: true,
            message: "Successfully connected to Swift".to_string(),
        }
    }

    pub(crate) fn failed(detail: impl std::fmt::Display) -> Self {
        Self {
            connected: false,
            message: format!("Connection failed: {}", detail),
        }
    }
}

/// One entry of a `?format=json` container listing
#[derive(Debug, Deserialize)]
pub(crate) struct SwiftObjectEntry {
    /// Absent on `subdir` pseudo-entries
    pub name: Option<String>,
    #[serde(default)]
    pub bytes: u64,
    pub last_modified: Option<String>,
    pub content_type: Option<String>,
    pub hash: Option<String>,
}

impl SwiftObjectEntry {
    pub(crate) fn into_metadata(self) -> Option<ObjectMetadata> {
        let name = self.name?;
        Some(ObjectMetadata {
            name,
            size: self.bytes,
            last_modified: self
                .last_modified
                .as_deref()
                .and_then(swiftgate_core::metadata::parse_timestamp),
            content_type: self.content_type,
            hash: self.hash,
            metadata: HashMap::new(),
        })
    }
}

/// One entry of a `?format=json` account listing
#[derive(Debug, Deserialize)]
pub(crate) struct SwiftContainerEntry {
    pub name: String,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub bytes: u64,
}

impl From<SwiftContainerEntry> for ContainerInfo {
    fn from(entry: SwiftContainerEntry) -> Self {
        ContainerInfo {
            name: entry.name,
            count: entry.count,
            bytes: entry.bytes,
        }
    }
}
