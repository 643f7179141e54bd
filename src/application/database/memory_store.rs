use std::collections::BTreeMap;

use tokio::sync::RwLock;
use tracing::debug;

use super::entries_size;
use super::KeyValueStore;
use super::StorageError;

/// In-process [`KeyValueStore`].
///
/// An optional byte quota mimics the limits of browser storage: a write that
/// would push the total size of all entries above the quota is refused and
/// the store is left unchanged.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that refuses writes once key and value bytes exceed `quota`.
    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            quota: Some(quota),
        }
    }

    /// Total size of all entries, counted as key plus value length.
    pub async fn size(&self) -> usize {
        entries_size(self.entries.read().await.iter())
    }
}

#[async_trait::async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut entries = self.entries.write().await;

        if let Some(limit) = self.quota {
            let replaced = entries.get(key).map_or(0, |old| key.len() + old.len());
            let required = entries_size(entries.iter()) - replaced + key.len() + value.len();
            if required > limit {
                debug!("refusing write of {key}: {required} bytes exceeds quota of {limit}");
                return Err(StorageError::QuotaExceeded { required, limit });
            }
        }

        entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.entries.read().await.keys().cloned().collect())
    }
}
