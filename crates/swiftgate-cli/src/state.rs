//! Application state

use crate::config::GatewayConfig;
use crate::gateway::Gateway;
use crate::middleware::RateLimit;
use std::sync::Arc;
use swiftgate_client::{ClientConfig, ObjectStorageClient};
use swiftgate_core::{ConfigResolver, ConfigStore, MemoryConfigStore};
use tracing::info;

/// Application state shared across handlers
pub struct AppState {
    /// Gateway configuration
    pub config: GatewayConfig,
    /// Request orchestrator
    pub gateway: Gateway,
    /// Per-project request limiter
    pub rate_limit: RateLimit,
}

impl AppState {
    /// Create state backed by an in-memory configuration store
    pub fn new(config: GatewayConfig) -> anyhow::Result<Self> {
        info!("Using in-memory configuration store");
        Self::with_store(config, Arc::new(MemoryConfigStore::new()))
    }

    /// Create state over an existing configuration store
    pub fn with_store(config: GatewayConfig, store: Arc<dyn ConfigStore>) -> anyhow::Result<Self> {
        let resolver = Arc::new(ConfigResolver::new(store).with_cache_ttl(config.config_cache_ttl()));
        if !config.config_cache_ttl().is_zero() {
            info!(
                "Active configuration cached for {}s",
                config.config_cache_ttl_secs
            );
        }

        let client_config = ClientConfig::default().with_timeout(config.backend_timeout());
        let client = ObjectStorageClient::new(Arc::clone(&resolver), &client_config)?;

        Ok(Self {
            gateway: Gateway::new(resolver, client),
            rate_limit: RateLimit::new(config.rate_limit_rps),
            config,
        })
    }

    pub fn resolver(&self) -> &Arc<ConfigResolver> {
        self.gateway.resolver()
    }
}
