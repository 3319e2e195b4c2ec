use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use super::{MappingStore, StoreResult};

/// In-memory mapping store. Cloning shares the underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryMappingStore {
    entries: Arc<DashMap<String, String>>,
}

impl MemoryMappingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl MappingStore for MemoryMappingStore {
    async fn find(&self, source_id: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.get(source_id).map(|entry| entry.value().clone()))
    }

    async fn save(&self, source_id: &str, destination_id: &str) -> StoreResult<()> {
        self.entries
            .insert(source_id.to_string(), destination_id.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn find_missing_returns_none() {
        let store = MemoryMappingStore::new();
        assert_eq!(store.find("100.1").await.unwrap(), None);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn save_upserts() {
        let store = MemoryMappingStore::new();
        store.save("100.1", "P1").await.unwrap();
        store.save("100.1", "C7").await.unwrap();

        assert_eq!(store.find("100.1").await.unwrap().as_deref(), Some("C7"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn clones_share_entries() {
        let store = MemoryMappingStore::new();
        let other = store.clone();
        store.save("1", "a").await.unwrap();
        assert_eq!(other.find("1").await.unwrap().as_deref(), Some("a"));
    }
}
