//! Error types for the swiftgate-core crate

use thiserror::Error;

/// Result type alias using `CoreError`
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised while resolving, storing, or signing against a backend configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// No configuration is flagged active
    #[error("no active Swift configuration found")]
    NoActiveConfig,

    /// Configuration id unknown to the store
    #[error("Swift configuration not found: {0}")]
    ConfigNotFound(String),

    /// Unique name constraint violated
    #[error("a Swift configuration named '{0}' already exists")]
    DuplicateName(String),

    /// Temp URL issuance requested but the configuration has no key
    #[error("temp URL key not configured")]
    SigningKeyNotConfigured,

    /// Configuration record failed validation
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration store failure
    #[error("configuration store error: {0}")]
    Store(String),
}
