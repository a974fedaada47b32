//! # Swiftgate Core
//!
//! Domain model for the Swiftgate object-storage gateway.
//!
//! This crate provides:
//! - **Backend configuration**: records describing a Swift-compatible store
//! - **Config store**: the persistence contract plus an in-memory store
//! - **Config resolution**: active/by-id lookup with an optional TTL cache
//! - **Temp URLs**: HMAC-SHA1 signed, time-limited object URLs
//! - **Metadata**: object and container views built from backend responses
//!
//! ## Example
//!
//! ```rust,ignore
//! use swiftgate_core::{ConfigResolver, MemoryConfigStore, NewBackendConfig, SignedUrlIssuer, TempUrlMethod};
//! use std::sync::Arc;
//!
//! let resolver = ConfigResolver::new(Arc::new(MemoryConfigStore::new()));
//! resolver.create(NewBackendConfig::new("primary", "http://store", "T1").with_temp_url_key("k")).await?;
//!
//! let config = resolver.resolve_active().await?;
//! let grant = SignedUrlIssuer::new().issue(&config, "c1", "o1.txt", 3600, TempUrlMethod::Get)?;
//! println!("{}", grant.url);
//! ```

pub mod config;
pub mod error;
pub mod metadata;
pub mod resolver;
pub mod store;
pub mod tempurl;

pub use config::{BackendConfig, BackendConfigPatch, NewBackendConfig};
pub use error::{CoreError, Result};
pub use metadata::{ContainerInfo, ObjectMetadata};
pub use resolver::ConfigResolver;
pub use store::{ConfigFilter, ConfigStore, MemoryConfigStore};
pub use tempurl::{SignedUrlIssuer, TempUrlGrant, TempUrlMethod, MAX_TTL_SECS, MIN_TTL_SECS};
