//! # Swiftgate Client
//!
//! Object storage client for Swift-compatible backends.
//!
//! The client never authenticates on its own: every operation forwards an
//! opaque, already-issued token in `X-Auth-Token` and addresses the account
//! of the active backend configuration (`/v1/AUTH_{tenant}/...`).
//!
//! ## Example
//!
//! ```rust,ignore
//! use swiftgate_client::{ClientConfig, ObjectStorageClient};
//! use swiftgate_core::{ConfigResolver, MemoryConfigStore};
//! use std::sync::Arc;
//!
//! let resolver = Arc::new(ConfigResolver::new(Arc::new(MemoryConfigStore::new())));
//! let client = ObjectStorageClient::new(resolver, &ClientConfig::default())?;
//!
//! client.create_container(token, "photos", false).await?;
//! client.upload(token, "photos", "cat.jpg", data, "image/jpeg", None).await?;
//! let object = client.download(token, "photos", "cat.jpg").await?;
//! ```

mod client;
mod config;
mod error;
mod types;

pub use client::{ObjectStorageClient, PUBLIC_READ_ACL, X_AUTH_TOKEN, X_CONTAINER_READ};
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use types::{ConnectionStatus, DownloadedObject, UploadResult};
