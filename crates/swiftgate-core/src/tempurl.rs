//! Swift temporary URL signing
//!
//! A temp URL grants unauthenticated access to one object for one HTTP method
//! until an absolute expiry. The backend recomputes
//!
//! ```text
//! hex(HMAC-SHA1(key, "{METHOD}\n{expires}\n{path}"))
//! ```
//!
//! over the request it receives, so the message layout here has to match it
//! byte for byte.

use crate::config::BackendConfig;
use crate::{CoreError, Result};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use std::fmt;
use std::str::FromStr;

type HmacSha1 = Hmac<Sha1>;

/// Shortest lifetime accepted at the caller-facing boundary (1 minute)
pub const MIN_TTL_SECS: u64 = 60;
/// Longest lifetime accepted at the caller-facing boundary (7 days)
pub const MAX_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Method a temp URL authorises
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TempUrlMethod {
    #[default]
    Get,
    Put,
    Post,
    Delete,
}

impl TempUrlMethod {
    /// Upper-case method name as it appears in the signed message
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for TempUrlMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TempUrlMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "PUT" => Ok(Self::Put),
            "POST" => Ok(Self::Post),
            "DELETE" => Ok(Self::Delete),
            other => Err(format!("unsupported temp URL method: {}", other)),
        }
    }
}

/// A computed temp URL
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TempUrlGrant {
    pub container: String,
    pub object_name: String,
    pub method: TempUrlMethod,
    /// Absolute expiry, Unix seconds
    pub expires: i64,
    /// Hex HMAC-SHA1 signature
    pub signature: String,
    /// Full signed URL
    pub url: String,
}

impl TempUrlGrant {
    /// Expiry as a timestamp
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.expires, 0)
    }
}

/// Issues temp URLs for the objects of a backend configuration
///
/// Issuance is a pure function of its inputs and the clock; it performs no
/// I/O and never adjusts the requested lifetime.
#[derive(Clone, Copy, Debug, Default)]
pub struct SignedUrlIssuer;

impl SignedUrlIssuer {
    pub fn new() -> Self {
        Self
    }

    /// Issue a temp URL valid for `ttl_secs` from now
    pub fn issue(
        &self,
        config: &BackendConfig,
        container: &str,
        object_name: &str,
        ttl_secs: u64,
        method: TempUrlMethod,
    ) -> Result<TempUrlGrant> {
        self.issue_at(config, container, object_name, ttl_secs, method, Utc::now().timestamp())
    }

    /// Issue a temp URL relative to an explicit current time (Unix seconds)
    pub fn issue_at(
        &self,
        config: &BackendConfig,
        container: &str,
        object_name: &str,
        ttl_secs: u64,
        method: TempUrlMethod,
        now: i64,
    ) -> Result<TempUrlGrant> {
        let key = config
            .temp_url_key
            .as_deref()
            .ok_or(CoreError::SigningKeyNotConfigured)?;

        let expires = now.saturating_add_unsigned(ttl_secs);
        let path = config.object_path(container, object_name);
        let signature = sign(key, method.as_str(), expires, &path)?;
        let url = format!(
            "{}?temp_url_sig={}&temp_url_expires={}",
            config.object_url(container, object_name),
            signature,
            expires
        );

        Ok(TempUrlGrant {
            container: container.to_string(),
            object_name: object_name.to_string(),
            method,
            expires,
            signature,
            url,
        })
    }
}

/// `hex(HMAC-SHA1(key, "{method}\n{expires}\n{path}"))`
pub fn sign(key: &str, method: &str, expires: i64, path: &str) -> Result<String> {
    let mut mac = HmacSha1::new_from_slice(key.as_bytes())
        .map_err(|e| CoreError::InvalidConfig(format!("unusable temp URL key: {}", e)))?;
    mac.update(format!("{}\n{}\n{}", method, expires, path).as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NewBackendConfig;
    use proptest::prelude::*;

    fn config(key: Option<&str>) -> BackendConfig {
        let mut new = NewBackendConfig::new("store", "http://store", "T1");
        new.temp_url_key = key.map(str::to_string);
        new.into_record("id".to_string(), Utc::now())
    }

    #[test]
    fn test_known_vector() {
        let sig = sign(
            "mykey",
            "GET",
            1323479485,
            "/v1/AUTH_account/container/object",
        )
        .unwrap();
        assert_eq!(sig, "d9fc2067e52b06598421664cf6610bfc8fc431f6");
    }

    #[test]
    fn test_end_to_end_grant() {
        let grant = SignedUrlIssuer::new()
            .issue_at(&config(Some("k")), "c1", "o1.txt", 3600, TempUrlMethod::Get, 1_000_000_000)
            .unwrap();

        assert_eq!(grant.expires, 1_000_003_600);
        assert_eq!(grant.signature.len(), 40);
        assert!(grant.signature.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(grant.signature, "a4145cd93cee49b5a7956a68c74943784c2c9ce0");
        assert_eq!(
            grant.signature,
            sign("k", "GET", 1_000_003_600, "/v1/AUTH_T1/c1/o1.txt").unwrap()
        );
        assert_eq!(
            grant.url,
            format!(
                "http://store/v1/AUTH_T1/c1/o1.txt?temp_url_sig={}&temp_url_expires=1000003600",
                grant.signature
            )
        );
    }

    #[test]
    fn test_missing_key() {
        let err = SignedUrlIssuer::new()
            .issue_at(&config(None), "c", "o", 60, TempUrlMethod::Get, 0)
            .unwrap_err();
        assert_eq!(err, CoreError::SigningKeyNotConfigured);
    }

    #[test]
    fn test_ttl_is_not_clamped() {
        let issuer = SignedUrlIssuer::new();
        let short = issuer.issue_at(&config(Some("k")), "c", "o", 1, TempUrlMethod::Get, 100).unwrap();
        let long = issuer
            .issue_at(&config(Some("k")), "c", "o", MAX_TTL_SECS * 2, TempUrlMethod::Get, 100)
            .unwrap();
        assert_eq!(short.expires, 101);
        assert_eq!(long.expires, 100 + (MAX_TTL_SECS * 2) as i64);
    }

    #[test]
    fn test_issue_is_deterministic() {
        let issuer = SignedUrlIssuer::new();
        let cfg = config(Some("secret"));
        let a = issuer.issue_at(&cfg, "c", "o", 600, TempUrlMethod::Put, 42).unwrap();
        let b = issuer.issue_at(&cfg, "c", "o", 600, TempUrlMethod::Put, 42).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!("get".parse::<TempUrlMethod>().unwrap(), TempUrlMethod::Get);
        assert_eq!("DELETE".parse::<TempUrlMethod>().unwrap(), TempUrlMethod::Delete);
        assert!("PATCH".parse::<TempUrlMethod>().is_err());
        assert_eq!(TempUrlMethod::default().as_str(), "GET");
    }

    #[test]
    fn test_trailing_slash_in_storage_url() {
        let mut cfg = config(Some("k"));
        cfg.storage_url = "http://store/".to_string();
        let grant = SignedUrlIssuer::new()
            .issue_at(&cfg, "c", "o", 60, TempUrlMethod::Get, 0)
            .unwrap();
        assert!(grant.url.starts_with("http://store/v1/AUTH_T1/c/o?"));
    }

    #[test]
    fn test_url_is_encoded_but_signature_is_not() {
        let grant = SignedUrlIssuer::new()
            .issue_at(&config(Some("k")), "docs", "what?.txt", 60, TempUrlMethod::Get, 0)
            .unwrap();
        assert_eq!(
            grant.signature,
            sign("k", "GET", 60, "/v1/AUTH_T1/docs/what?.txt").unwrap()
        );
        assert!(grant
            .url
            .starts_with("http://store/v1/AUTH_T1/docs/what%3F.txt?temp_url_sig="));
    }

    proptest! {
        #[test]
        fn prop_signature_changes_with_any_input(
            expires in 0i64..4_000_000_000,
            container in "[a-z0-9]{1,12}",
            object in "[a-z0-9._-]{1,24}",
        ) {
            let path = format!("/v1/AUTH_T1/{}/{}", container, object);
            let base = sign("k", "GET", expires, &path).unwrap();

            prop_assert_ne!(&base, &sign("k", "PUT", expires, &path).unwrap());
            prop_assert_ne!(&base, &sign("k", "GET", expires + 1, &path).unwrap());
            prop_assert_ne!(&base, &sign("k", "GET", expires, &format!("{}x", path)).unwrap());
            prop_assert_ne!(&base, &sign("k2", "GET", expires, &path).unwrap());
        }
    }
}
