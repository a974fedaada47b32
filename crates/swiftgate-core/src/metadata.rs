//! Object and container metadata
//!
//! These are transient views built from backend responses. Nothing here is
//! persisted by the gateway.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Header prefix carrying user-defined object metadata
pub const OBJECT_META_PREFIX: &str = "x-object-meta-";

/// Metadata for a single object
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMetadata {
    /// Object name within its container
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// Last modification time reported by the backend
    pub last_modified: Option<DateTime<Utc>>,
    /// Content type
    pub content_type: Option<String>,
    /// Backend content digest (MD5 for Swift)
    pub hash: Option<String>,
    /// User-defined metadata
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl ObjectMetadata {
    /// Create metadata with a name and size
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            ..Default::default()
        }
    }

    /// Add user metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Summary of a container
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerInfo {
    pub name: String,
    /// Number of objects
    pub count: u64,
    /// Total size in bytes
    pub bytes: u64,
}

/// Header name for a user metadata key
pub fn object_meta_header(key: &str) -> String {
    format!("X-Object-Meta-{}", key)
}

/// Recover a user metadata key from a header name (case-insensitive prefix)
pub fn strip_object_meta_prefix(header: &str) -> Option<&str> {
    let prefix_len = OBJECT_META_PREFIX.len();
    if header.len() > prefix_len
        && header.is_char_boundary(prefix_len)
        && header[..prefix_len].eq_ignore_ascii_case(OBJECT_META_PREFIX)
    {
        Some(&header[prefix_len..])
    } else {
        None
    }
}

/// Parse a backend timestamp
///
/// Swift listings use `2024-01-01T10:00:00.123456` (UTC, no offset); object
/// headers use the HTTP date format.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    DateTime::parse_from_rfc2822(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
