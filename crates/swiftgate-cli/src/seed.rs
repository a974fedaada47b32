//! Startup seeding of backend configurations

use anyhow::Context;
use std::path::Path;
use swiftgate_core::{ConfigResolver, CoreError, NewBackendConfig};
use tracing::{info, warn};

/// Insert every record of a JSON array file; names already present are skipped
///
/// Returns the number of records inserted.
pub async fn seed_from_file(resolver: &ConfigResolver, path: &Path) -> anyhow::Result<usize> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read seed file {}", path.display()))?;
    let records: Vec<NewBackendConfig> = serde_json::from_str(&raw)
        .with_context(|| format!("invalid seed file {}", path.display()))?;

    let mut inserted = 0;
    for record in records {
        let name = record.name.clone();
        match resolver.create(record).await {
            Ok(config) => {
                info!(id = %config.id, "Seeded Swift configuration '{}'", name);
                inserted += 1;
            }
            Err(CoreError::DuplicateName(_)) => {
                warn!("Swift configuration '{}' already exists, skipping", name);
            }
            Err(e) => {
                return Err(e).with_context(|| format!("failed to seed configuration '{}'", name));
            }
        }
    }

    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Arc;
    use swiftgate_core::MemoryConfigStore;

    fn seed_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn resolver() -> ConfigResolver {
        ConfigResolver::new(Arc::new(MemoryConfigStore::new()))
    }

    #[tokio::test]
    async fn test_seed_inserts_records() {
        let file = seed_file(
            r#"[
                {"name": "itu", "storageUrl": "https://swift.example.org/swift", "tenantName": "T1",
                 "tempUrlKey": "secret", "description": "primary store"},
                {"name": "backup", "storageUrl": "http://backup:8080", "tenantName": "T2", "isActive": false}
            ]"#,
        );
        let resolver = resolver();

        assert_eq!(seed_from_file(&resolver, file.path()).await.unwrap(), 2);

        let active = resolver.resolve_active().await.unwrap();
        assert_eq!(active.name, "itu");
        assert_eq!(active.temp_url_key.as_deref(), Some("secret"));
        assert_eq!(resolver.list(false).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_seed_skips_existing_names() {
        let file = seed_file(r#"[{"name": "itu", "storageUrl": "http://store", "tenantName": "T1"}]"#);
        let resolver = resolver();

        assert_eq!(seed_from_file(&resolver, file.path()).await.unwrap(), 1);
        assert_eq!(seed_from_file(&resolver, file.path()).await.unwrap(), 0);
        assert_eq!(resolver.list(false).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_seed_rejects_invalid_records() {
        let file = seed_file(r#"[{"name": "bad", "storageUrl": "not a url", "tenantName": "T1"}]"#);
        assert!(seed_from_file(&resolver(), file.path()).await.is_err());

        let file = seed_file("{ not json");
        assert!(seed_from_file(&resolver(), file.path()).await.is_err());
    }
}
