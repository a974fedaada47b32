//! Active configuration resolution
//!
//! [`ConfigResolver`] is the only path through which request handling reaches
//! backend configuration. It never keeps a process-wide "current" record:
//! every call asks the store, unless a time-bounded cache was enabled, in which
//! case the cached active record is served until it expires or a mutation made
//! through this resolver invalidates it.

use crate::config::{BackendConfig, BackendConfigPatch, NewBackendConfig};
use crate::store::{ConfigFilter, ConfigStore};
use crate::{CoreError, Result};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Resolves and manages backend configurations on top of a [`ConfigStore`]
pub struct ConfigResolver {
    store: Arc<dyn ConfigStore>,
    cache_ttl: Duration,
    cached: Mutex<Option<(Instant, BackendConfig)>>,
}

impl ConfigResolver {
    /// Create a resolver that reads the store on every call
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self {
            store,
            cache_ttl: Duration::ZERO,
            cached: Mutex::new(None),
        }
    }

    /// Cache the active record for `ttl` (zero disables caching)
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// The underlying store
    pub fn store(&self) -> &Arc<dyn ConfigStore> {
        &self.store
    }

    /// First record flagged active
    ///
    /// With several active records the store's first match wins; that is not
    /// treated as an error.
    pub async fn resolve_active(&self) -> Result<BackendConfig> {
        if let Some(config) = self.cached_active() {
            return Ok(config);
        }

        let config = self
            .store
            .find_one(&ConfigFilter::active())
            .await?
            .ok_or(CoreError::NoActiveConfig)?;

        if !self.cache_ttl.is_zero() {
            *self.cached.lock() = Some((Instant::now(), config.clone()));
        }
        debug!(config = %config.name, "Resolved active Swift configuration");
        Ok(config)
    }

    /// Record by id
    pub async fn resolve_by_id(&self, id: &str) -> Result<BackendConfig> {
        self.store
            .find_one(&ConfigFilter::by_id(id))
            .await?
            .ok_or_else(|| CoreError::ConfigNotFound(id.to_string()))
    }

    /// List records, optionally only the active ones
    pub async fn list(&self, active_only: bool) -> Result<Vec<BackendConfig>> {
        let filter = if active_only {
            ConfigFilter::active()
        } else {
            ConfigFilter::all()
        };
        self.store.find(&filter).await
    }

    /// Validate and insert a new record
    pub async fn create(&self, new: NewBackendConfig) -> Result<BackendConfig> {
        new.validate()?;
        let config = self.store.insert(new).await?;
        self.invalidate();
        info!(id = %config.id, name = %config.name, "Created Swift configuration");
        Ok(config)
    }

    /// Merge a partial update into an existing record
    pub async fn update(&self, id: &str, patch: BackendConfigPatch) -> Result<BackendConfig> {
        patch.validate()?;
        let config = self
            .store
            .update_by_id(id, patch)
            .await?
            .ok_or_else(|| CoreError::ConfigNotFound(id.to_string()))?;
        self.invalidate();
        info!(id = %config.id, "Updated Swift configuration");
        Ok(config)
    }

    /// Delete a record
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.store
            .delete_by_id(id)
            .await?
            .ok_or_else(|| CoreError::ConfigNotFound(id.to_string()))?;
        self.invalidate();
        info!(id = %id, "Deleted Swift configuration");
        Ok(())
    }

    /// Drop the cached active record
    pub fn invalidate(&self) {
        self.cached.lock().take();
    }

    fn cached_active(&self) -> Option<BackendConfig> {
        if self.cache_ttl.is_zero() {
            return None;
        }
        let guard = self.cached.lock();
        match guard.as_ref() {
            Some((at, config)) if at.elapsed() < self.cache_ttl => Some(config.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryConfigStore;

    fn resolver() -> (Arc<MemoryConfigStore>, ConfigResolver) {
        let store = Arc::new(MemoryConfigStore::new());
        let resolver = ConfigResolver::new(store.clone());
        (store, resolver)
    }

    #[tokio::test]
    async fn test_no_active_config() {
        let (_, resolver) = resolver();
        assert_eq!(resolver.resolve_active().await.unwrap_err(), CoreError::NoActiveConfig);

        resolver
            .create(NewBackendConfig::new("idle", "http://a", "t").with_active(false))
            .await
            .unwrap();
        assert_eq!(resolver.resolve_active().await.unwrap_err(), CoreError::NoActiveConfig);
    }

    #[tokio::test]
    async fn test_single_active_config() {
        let (_, resolver) = resolver();
        resolver
            .create(NewBackendConfig::new("idle", "http://a", "t").with_active(false))
            .await
            .unwrap();
        let active = resolver.create(NewBackendConfig::new("live", "http://b", "t")).await.unwrap();

        assert_eq!(resolver.resolve_active().await.unwrap(), active);
    }

    #[tokio::test]
    async fn test_multiple_active_configs_pick_first() {
        let (_, resolver) = resolver();
        let first = resolver.create(NewBackendConfig::new("one", "http://a", "t")).await.unwrap();
        resolver.create(NewBackendConfig::new("two", "http://b", "t")).await.unwrap();

        for _ in 0..3 {
            assert_eq!(resolver.resolve_active().await.unwrap().id, first.id);
        }
    }

    #[tokio::test]
    async fn test_resolve_by_id() {
        let (_, resolver) = resolver();
        let created = resolver.create(NewBackendConfig::new("a", "http://a", "t")).await.unwrap();
        assert_eq!(resolver.resolve_by_id(&created.id).await.unwrap(), created);
        assert_eq!(
            resolver.resolve_by_id("nope").await.unwrap_err(),
            CoreError::ConfigNotFound("nope".to_string())
        );
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let (_, resolver) = resolver();
        let created = resolver.create(NewBackendConfig::new("a", "http://a", "t")).await.unwrap();

        let updated = resolver
            .update(&created.id, BackendConfigPatch { tenant_name: Some("t2".to_string()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(updated.tenant_name, "t2");
        assert_eq!(updated.storage_url, "http://a");
        assert!(updated.updated_at >= created.updated_at);

        resolver.delete(&created.id).await.unwrap();
        assert!(matches!(resolver.delete(&created.id).await, Err(CoreError::ConfigNotFound(_))));
        assert!(matches!(
            resolver.update(&created.id, BackendConfigPatch::active(true)).await,
            Err(CoreError::ConfigNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_and_duplicate() {
        let (_, resolver) = resolver();
        assert!(matches!(
            resolver.create(NewBackendConfig::new("a", "not a url", "t")).await,
            Err(CoreError::InvalidConfig(_))
        ));
        resolver.create(NewBackendConfig::new("a", "http://a", "t")).await.unwrap();
        assert!(matches!(
            resolver.create(NewBackendConfig::new("a", "http://a", "t")).await,
            Err(CoreError::DuplicateName(_))
        ));
    }

    #[tokio::test]
    async fn test_list_active_only() {
        let (_, resolver) = resolver();
        resolver.create(NewBackendConfig::new("a", "http://a", "t")).await.unwrap();
        resolver
            .create(NewBackendConfig::new("b", "http://b", "t").with_active(false))
            .await
            .unwrap();

        assert_eq!(resolver.list(true).await.unwrap().len(), 1);
        assert_eq!(resolver.list(false).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_cache_serves_until_invalidated() {
        let store = Arc::new(MemoryConfigStore::new());
        let resolver = ConfigResolver::new(store.clone()).with_cache_ttl(Duration::from_secs(60));
        let created = resolver.create(NewBackendConfig::new("a", "http://a", "t")).await.unwrap();
        assert_eq!(resolver.resolve_active().await.unwrap().id, created.id);

        // A write that bypasses the resolver is not seen until the cache is dropped
        store.update_by_id(&created.id, BackendConfigPatch::active(false)).await.unwrap();
        assert_eq!(resolver.resolve_active().await.unwrap().id, created.id);

        resolver.invalidate();
        assert_eq!(resolver.resolve_active().await.unwrap_err(), CoreError::NoActiveConfig);
    }

    #[tokio::test]
    async fn test_mutation_through_resolver_invalidates_cache() {
        let store = Arc::new(MemoryConfigStore::new());
        let resolver = ConfigResolver::new(store).with_cache_ttl(Duration::from_secs(60));
        let created = resolver.create(NewBackendConfig::new("a", "http://a", "t")).await.unwrap();
        resolver.resolve_active().await.unwrap();

        resolver.update(&created.id, BackendConfigPatch::active(false)).await.unwrap();
        assert_eq!(resolver.resolve_active().await.unwrap_err(), CoreError::NoActiveConfig);
    }
}
