//! Credential envelope extraction
//!
//! Callers present `Authorization: Bearer <jwt>`. The JWT has already been
//! verified at the edge, so the gateway only decodes it to pull out the
//! forwarded backend token and a few claims. Signatures are never checked
//! here.

use chrono::Utc;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a credential could not be used
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("invalid authorization header, expected 'Bearer <token>'")]
    InvalidFormat,

    #[error("malformed credential: {0}")]
    Malformed(String),

    #[error("credential has expired")]
    Expired,

    #[error("backend token not found in credential")]
    BackendTokenMissing,

    #[error("project id not found in credential")]
    ProjectIdMissing,
}

/// Decoded credential envelope
///
/// Every field is optional on the wire; callers check presence of the field
/// they need and report a specific error when it is missing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialEnvelope {
    /// Backend access token forwarded as `X-Auth-Token`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<DomainClaim>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectClaim>,
    /// Expiration time (Unix seconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// Issued at
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Subject
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Issuer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainClaim {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectClaim {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<RoleClaim>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleClaim {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl CredentialEnvelope {
    /// Whether `exp` lies before `now`; a missing `exp` never expires
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.exp.is_some_and(|exp| exp < now)
    }

    pub fn project_id(&self) -> Option<&str> {
        self.project
            .as_ref()
            .and_then(|p| p.id.as_deref())
            .filter(|id| !id.is_empty())
    }

    pub fn role_name(&self) -> Option<&str> {
        self.project
            .as_ref()
            .and_then(|p| p.role.as_ref())
            .and_then(|r| r.name.as_deref())
    }
}

/// Extracts the forwarded backend token and claims from a bearer credential
#[derive(Clone)]
pub struct TokenExtractor {
    validation: Validation,
    key: DecodingKey,
}

impl Default for TokenExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TokenExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenExtractor").finish_non_exhaustive()
    }
}

impl TokenExtractor {
    pub fn new() -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Self {
            validation,
            key: DecodingKey::from_secret(&[]),
        }
    }

    /// Decode the envelope carried by an `Authorization` header value
    pub fn decode(&self, auth_header: &str) -> Result<CredentialEnvelope, CredentialError> {
        let jwt = extract_bearer_token(auth_header).ok_or(CredentialError::InvalidFormat)?;

        decode::<CredentialEnvelope>(jwt, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Credential decoding failed: {}", e);
                CredentialError::Malformed(e.to_string())
            })
    }

    /// Backend token to forward, checked against the current time
    pub fn extract_token(&self, auth_header: &str) -> Result<String, CredentialError> {
        self.extract_token_at(auth_header, Utc::now().timestamp())
    }

    /// Backend token to forward, checked against `now` (Unix seconds)
    pub fn extract_token_at(&self, auth_header: &str, now: i64) -> Result<String, CredentialError> {
        let envelope = self.decode(auth_header)?;

        if envelope.is_expired_at(now) {
            return Err(CredentialError::Expired);
        }

        envelope
            .token
            .filter(|t| !t.is_empty())
            .ok_or(CredentialError::BackendTokenMissing)
    }

    /// Project identifier of the caller
    pub fn extract_project_id(&self, auth_header: &str) -> Result<String, CredentialError> {
        let envelope = self.decode(auth_header)?;
        envelope
            .project_id()
            .map(str::to_string)
            .ok_or(CredentialError::ProjectIdMissing)
    }

    /// Whether the caller's project role is `role_name`; false on any decode failure
    pub fn has_role(&self, auth_header: &str, role_name: &str) -> bool {
        self.decode(auth_header)
            .ok()
            .is_some_and(|envelope| envelope.role_name() == Some(role_name))
    }
}

/// Extract bearer token from Authorization header
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const NOW: i64 = 1_700_000_000;

    fn envelope(token: Option<&str>, exp: Option<i64>, project: Option<&str>) -> CredentialEnvelope {
        CredentialEnvelope {
            token: token.map(str::to_string),
            domain: Some(DomainClaim { id: Some("default".to_string()) }),
            project: project.map(|id| ProjectClaim {
                id: Some(id.to_string()),
                role: Some(RoleClaim {
                    name: Some("member".to_string()),
                    id: Some("r-1".to_string()),
                }),
            }),
            exp,
            iat: Some(NOW - 60),
            sub: Some("user-1".to_string()),
            iss: Some("identity".to_string()),
        }
    }

    fn bearer(claims: &CredentialEnvelope) -> String {
        let jwt = encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(b"edge-secret"),
        )
        .unwrap();
        format!("Bearer {}", jwt)
    }

    #[test]
    fn test_extract_token() {
        let header = bearer(&envelope(Some("T"), Some(NOW + 3600), Some("P")));
        let extractor = TokenExtractor::new();

        assert_eq!(extractor.extract_token_at(&header, NOW).unwrap(), "T");
    }

    #[test]
    fn test_signature_is_not_verified() {
        let claims = envelope(Some("T"), Some(NOW + 3600), Some("P"));
        let jwt = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(b"some-other-secret"),
        )
        .unwrap();

        let extractor = TokenExtractor::new();
        assert_eq!(
            extractor.extract_token_at(&format!("Bearer {}", jwt), NOW).unwrap(),
            "T"
        );
    }

    #[test]
    fn test_expired_token() {
        let header = bearer(&envelope(Some("T"), Some(NOW - 1), Some("P")));
        assert_eq!(
            TokenExtractor::new().extract_token_at(&header, NOW),
            Err(CredentialError::Expired)
        );
    }

    #[test]
    fn test_missing_exp_never_expires() {
        let header = bearer(&envelope(Some("T"), None, Some("P")));
        assert_eq!(TokenExtractor::new().extract_token_at(&header, NOW).unwrap(), "T");
    }

    #[test]
    fn test_invalid_format() {
        let extractor = TokenExtractor::new();
        for header in ["", "Basic abc", "bearer abc", "Bearer ", "Token x.y.z"] {
            assert_eq!(
                extractor.extract_token_at(header, NOW),
                Err(CredentialError::InvalidFormat),
                "header {:?}",
                header
            );
        }
    }

    #[test]
    fn test_malformed_payload() {
        let result = TokenExtractor::new().extract_token_at("Bearer not-a-jwt", NOW);
        assert!(matches!(result, Err(CredentialError::Malformed(_))));
    }

    #[test]
    fn test_backend_token_missing() {
        let header = bearer(&envelope(None, Some(NOW + 60), Some("P")));
        assert_eq!(
            TokenExtractor::new().extract_token_at(&header, NOW),
            Err(CredentialError::BackendTokenMissing)
        );
    }

    #[test]
    fn test_expiry_checked_before_token_presence() {
        let header = bearer(&envelope(None, Some(NOW - 60), Some("P")));
        assert_eq!(
            TokenExtractor::new().extract_token_at(&header, NOW),
            Err(CredentialError::Expired)
        );
    }

    #[test]
    fn test_extract_project_id() {
        let extractor = TokenExtractor::new();

        let header = bearer(&envelope(Some("T"), Some(NOW + 60), Some("proj-42")));
        assert_eq!(extractor.extract_project_id(&header).unwrap(), "proj-42");

        let header = bearer(&envelope(Some("T"), Some(NOW + 60), None));
        assert_eq!(
            extractor.extract_project_id(&header),
            Err(CredentialError::ProjectIdMissing)
        );
    }

    #[test]
    fn test_has_role() {
        let extractor = TokenExtractor::new();
        let header = bearer(&envelope(Some("T"), Some(NOW + 60), Some("P")));

        assert!(extractor.has_role(&header, "member"));
        assert!(!extractor.has_role(&header, "admin"));
        assert!(!extractor.has_role(&bearer(&envelope(Some("T"), None, None)), "member"));
        assert!(!extractor.has_role("Bearer garbage", "member"));
        assert!(!extractor.has_role("", "member"));
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc123"), Some("abc123"));
        assert_eq!(extract_bearer_token("Bearer   "), None);
        assert_eq!(extract_bearer_token("Basic xyz"), None);
    }
}
