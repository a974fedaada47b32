//! Gateway configuration

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Prefix of environment variables overriding configuration (`SWIFTGATE__PORT=8080`)
pub const ENV_PREFIX: &str = "SWIFTGATE";

/// Gateway server configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Path prefix for every route
    pub api_prefix: String,
    /// Timeout for a single backend request (seconds)
    pub backend_timeout_secs: u64,
    /// Rate limit (requests per second per project)
    pub rate_limit_rps: u32,
    /// Maximum request body size (bytes)
    pub max_body_size: usize,
    /// How long the active configuration may be served from cache (seconds, 0 disables)
    pub config_cache_ttl_secs: u64,
    /// Enable CORS
    pub cors_enabled: bool,
    /// JSON file with backend configurations to insert at startup
    pub seed_file: Option<PathBuf>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            api_prefix: "/api/v1".to_string(),
            backend_timeout_secs: 30,
            rate_limit_rps: 100,
            max_body_size: 512 * 1024 * 1024, // 512 MiB
            config_cache_ttl_secs: 0,
            cors_enabled: true,
            seed_file: None,
        }
    }
}

impl GatewayConfig {
    /// Layer defaults, an optional file, then `SWIFTGATE__*` environment variables
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Get the bind address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Route prefix with a leading slash and no trailing slash; empty for the root
    pub fn route_prefix(&self) -> String {
        let trimmed = self.api_prefix.trim().trim_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{}", trimmed)
        }
    }

    pub fn backend_timeout(&self) -> Duration {
        Duration::from_secs(self.backend_timeout_secs)
    }

    pub fn config_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.config_cache_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
        assert_eq!(config.route_prefix(), "/api/v1");
        assert_eq!(config.backend_timeout(), Duration::from_secs(30));
        assert_eq!(config.config_cache_ttl(), Duration::ZERO);
    }

    #[test]
    fn test_route_prefix_normalisation() {
        let mut config = GatewayConfig::default();
        for (raw, expected) in [("api/v2/", "/api/v2"), ("/", ""), ("", ""), ("/gw", "/gw")] {
            config.api_prefix = raw.to_string();
            assert_eq!(config.route_prefix(), expected, "prefix {:?}", raw);
        }
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "port = 8081\napi_prefix = \"/v2\"\nconfig_cache_ttl_secs = 15\nseed_file = \"seed.json\""
        )
        .unwrap();

        let config = GatewayConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.port, 8081);
        assert_eq!(config.api_prefix, "/v2");
        assert_eq!(config.config_cache_ttl(), Duration::from_secs(15));
        assert_eq!(config.seed_file, Some(PathBuf::from("seed.json")));
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.rate_limit_rps, 100);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(GatewayConfig::load(Some(&missing)).is_err());
    }
}
