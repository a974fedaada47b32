//! Configuration store contract and an in-memory implementation
//!
//! The gateway consumes configuration records through [`ConfigStore`] so the
//! persistence layer (a document database in production) stays external.
//! [`MemoryConfigStore`] backs tests, development, and seeded deployments.

use crate::config::{BackendConfig, BackendConfigPatch, NewBackendConfig};
use crate::{CoreError, Result};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Record filter; unset fields match anything
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigFilter {
    pub id: Option<String>,
    pub name: Option<String>,
    pub is_active: Option<bool>,
}

impl ConfigFilter {
    /// Match every record
    pub fn all() -> Self {
        Self::default()
    }

    /// Match active records
    pub fn active() -> Self {
        Self {
            is_active: Some(true),
            ..Default::default()
        }
    }

    /// Match a single id
    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    /// Check whether a record satisfies the filter
    pub fn matches(&self, record: &BackendConfig) -> bool {
        self.id.as_ref().is_none_or(|id| *id == record.id)
            && self.name.as_ref().is_none_or(|name| *name == record.name)
            && self.is_active.is_none_or(|active| active == record.is_active)
    }
}

/// Persistence contract for backend configurations
///
/// `find` returns records in a stable order (insertion order for the bundled
/// store) so that "first match" is deterministic.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// All records matching the filter
    async fn find(&self, filter: &ConfigFilter) -> Result<Vec<BackendConfig>>;

    /// First record matching the filter
    async fn find_one(&self, filter: &ConfigFilter) -> Result<Option<BackendConfig>> {
        Ok(self.find(filter).await?.into_iter().next())
    }

    /// Insert a new record, failing with `DuplicateName` on a name clash
    async fn insert(&self, record: NewBackendConfig) -> Result<BackendConfig>;

    /// Merge a patch into an existing record
    async fn update_by_id(&self, id: &str, patch: BackendConfigPatch) -> Result<Option<BackendConfig>>;

    /// Remove a record, returning it if it existed
    async fn delete_by_id(&self, id: &str) -> Result<Option<BackendConfig>>;
}

/// In-memory configuration store
#[derive(Clone, Default)]
pub struct MemoryConfigStore {
    records: Arc<DashMap<String, (u64, BackendConfig)>>,
    names: Arc<DashMap<String, String>>,
    seq: Arc<AtomicU64>,
}

impl MemoryConfigStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn find(&self, filter: &ConfigFilter) -> Result<Vec<BackendConfig>> {
        let mut matched: Vec<(u64, BackendConfig)> = self
            .records
            .iter()
            .filter(|entry| filter.matches(&entry.value().1))
            .map(|entry| entry.value().clone())
            .collect();
        matched.sort_by_key(|(seq, _)| *seq);
        Ok(matched.into_iter().map(|(_, record)| record).collect())
    }

    async fn insert(&self, record: NewBackendConfig) -> Result<BackendConfig> {
        let id = uuid::Uuid::new_v4().to_string();
        match self.names.entry(record.name.clone()) {
            Entry::Occupied(_) => return Err(CoreError::DuplicateName(record.name)),
            Entry::Vacant(slot) => {
                slot.insert(id.clone());
            }
        }

        let seq = self.seq.fetch_add(1, Ordering::SeqCst);
        let stored = record.into_record(id.clone(), Utc::now());
        self.records.insert(id, (seq, stored.clone()));
        Ok(stored)
    }

    async fn update_by_id(&self, id: &str, patch: BackendConfigPatch) -> Result<Option<BackendConfig>> {
        let Some(mut entry) = self.records.get_mut(id) else {
            return Ok(None);
        };
        let record = &mut entry.value_mut().1;

        if let Some(new_name) = patch.name.as_ref().filter(|n| **n != record.name) {
            match self.names.entry(new_name.clone()) {
                Entry::Occupied(_) => return Err(CoreError::DuplicateName(new_name.clone())),
                Entry::Vacant(slot) => {
                    slot.insert(id.to_string());
                }
            }
            self.names.remove(&record.name);
        }

        record.apply(patch);
        record.updated_at = Utc::now();
        Ok(Some(record.clone()))
    }

    async fn delete_by_id(&self, id: &str) -> Result<Option<BackendConfig>> {
        let removed = self.records.remove(id).map(|(_, (_, record))| record);
        if let Some(record) = &removed {
            self.names.remove(&record.name);
        }
        Ok(removed)
    }
}
