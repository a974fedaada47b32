//! Backend configuration records
//!
//! A [`BackendConfig`] describes one Swift-compatible object store: where it
//! lives, which account (tenant) the gateway addresses, and the optional key
//! used to sign temporary URLs. Records are owned by a
//! [`ConfigStore`](crate::store::ConfigStore); everything else in the gateway
//! only borrows them for the lifetime of a request.

use crate::{CoreError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored backend configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendConfig {
    /// Store-assigned identifier
    pub id: String,
    /// Unique display name
    pub name: String,
    /// Identity (Keystone) endpoint, only informational for a token-forwarding gateway
    pub auth_url: Option<String>,
    /// Object storage endpoint, e.g. `https://swift.example.org:8080/swift`
    pub storage_url: String,
    /// Account namespace used in `/v1/AUTH_{tenant}` paths
    pub tenant_name: String,
    /// Only needed when the gateway authenticates on its own
    pub username: Option<String>,
    /// Only needed when the gateway authenticates on its own
    pub password: Option<String>,
    /// Account or container key for temp URL signatures
    pub temp_url_key: Option<String>,
    /// Whether this record takes part in active resolution
    pub is_active: bool,
    /// Free-text description
    pub description: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl BackendConfig {
    /// Storage endpoint without a trailing slash
    pub fn base_url(&self) -> &str {
        self.storage_url.trim_end_matches('/')
    }

    /// `/v1/AUTH_{tenant}`
    pub fn account_path(&self) -> String {
        format!("/v1/AUTH_{}", self.tenant_name)
    }

    /// `/v1/AUTH_{tenant}/{container}`
    pub fn container_path(&self, container: &str) -> String {
        format!("{}/{}", self.account_path(), container)
    }

    /// `/v1/AUTH_{tenant}/{container}/{object}`, unencoded
    ///
    /// This is the form Swift decodes the request path back into, and so the
    /// form temp URL signatures are computed over.
    pub fn object_path(&self, container: &str, object: &str) -> String {
        format!("{}/{}", self.container_path(container), object)
    }

    /// Absolute URL of the account root
    pub fn account_url(&self) -> String {
        format!("{}/v1/AUTH_{}", self.base_url(), urlencoding::encode(&self.tenant_name))
    }

    /// Absolute URL of a container
    pub fn container_url(&self, container: &str) -> String {
        format!("{}/{}", self.account_url(), urlencoding::encode(container))
    }

    /// Canonical (public) URL of an object, percent-encoded per segment
    pub fn object_url(&self, container: &str, object: &str) -> String {
        format!("{}/{}", self.container_url(container), encode_object_name(object))
    }

    /// Apply a partial update; only supplied fields change
    pub fn apply(&mut self, patch: BackendConfigPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(auth_url) = patch.auth_url {
            self.auth_url = Some(auth_url);
        }
        if let Some(storage_url) = patch.storage_url {
            self.storage_url = storage_url;
        }
        if let Some(tenant_name) = patch.tenant_name {
            self.tenant_name = tenant_name;
        }
        if let Some(username) = patch.username {
            self.username = Some(username);
        }
        if let Some(password) = patch.password {
            self.password = Some(password);
        }
        if let Some(key) = patch.temp_url_key {
            self.temp_url_key = Some(key);
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
    }
}

/// Fields accepted when creating a configuration
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBackendConfig {
    pub name: String,
    #[serde(default)]
    pub auth_url: Option<String>,
    pub storage_url: String,
    pub tenant_name: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub temp_url_key: Option<String>,
    /// Defaults to `true` when omitted
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewBackendConfig {
    /// Create a minimal active configuration
    pub fn new(
        name: impl Into<String>,
        storage_url: impl Into<String>,
        tenant_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            storage_url: storage_url.into(),
            tenant_name: tenant_name.into(),
            ..Default::default()
        }
    }

    /// Set the temp URL signing key
    pub fn with_temp_url_key(mut self, key: impl Into<String>) -> Self {
        self.temp_url_key = Some(key.into());
        self
    }

    /// Set the active flag
    pub fn with_active(mut self, active: bool) -> Self {
        self.is_active = Some(active);
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Check required fields and URL shapes
    pub fn validate(&self) -> Result<()> {
        require_non_empty("name", &self.name)?;
        require_non_empty("tenantName", &self.tenant_name)?;
        require_http_url("storageUrl", &self.storage_url)?;
        if let Some(auth_url) = &self.auth_url {
            require_http_url("authUrl", auth_url)?;
        }
        Ok(())
    }

    /// Materialise a stored record
    pub fn into_record(self, id: String, now: DateTime<Utc>) -> BackendConfig {
        BackendConfig {
            id,
            name: self.name,
            auth_url: self.auth_url,
            storage_url: self.storage_url,
            tenant_name: self.tenant_name,
            username: self.username,
            password: self.password,
            temp_url_key: self.temp_url_key,
            is_active: self.is_active.unwrap_or(true),
            description: self.description,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update; `None` leaves a field untouched
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackendConfigPatch {
    pub name: Option<String>,
    pub auth_url: Option<String>,
    pub storage_url: Option<String>,
    pub tenant_name: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub temp_url_key: Option<String>,
    pub is_active: Option<bool>,
    pub description: Option<String>,
}

impl BackendConfigPatch {
    /// Check the fields that are present
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            require_non_empty("name", name)?;
        }
        if let Some(tenant) = &self.tenant_name {
            require_non_empty("tenantName", tenant)?;
        }
        if let Some(url) = &self.storage_url {
            require_http_url("storageUrl", url)?;
        }
        if let Some(url) = &self.auth_url {
            require_http_url("authUrl", url)?;
        }
        Ok(())
    }

    /// Set the active flag
    pub fn active(is_active: bool) -> Self {
        Self {
            is_active: Some(is_active),
            ..Default::default()
        }
    }
}

/// Percent-encode an object name, keeping `/` as the pseudo-directory separator
fn encode_object_name(name: &str) -> String {
    name.split('/')
        .map(urlencoding::encode)
        .collect::<Vec<_>>()
        .join("/")
}

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CoreError::InvalidConfig(format!("{} must not be empty", field)));
    }
    Ok(())
}

fn require_http_url(field: &str, value: &str) -> Result<()> {
    let parsed = url::Url::parse(value)
        .map_err(|e| CoreError::InvalidConfig(format!("{} is not a valid URL: {}", field, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(CoreError::InvalidConfig(format!(
            "{} must use http or https, got '{}'",
            field, other
        ))),
    }
}
