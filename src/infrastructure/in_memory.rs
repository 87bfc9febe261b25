use crate::domain::ports::KeyValueStore;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory key-value store.
///
/// Uses `Arc<RwLock<HashMap<String, Vec<u8>>>>` to allow shared concurrent access.
/// Clones share the same underlying map, which lets tests inspect what the
/// engine persisted.
#[derive(Default, Clone)]
pub struct InMemoryKeyValueStore {
    entries: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl InMemoryKeyValueStore {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).cloned())
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_store_roundtrip() {
        let store = InMemoryKeyValueStore::new();
        store.put("history", b"[]".to_vec()).await.unwrap();

        assert_eq!(store.get("history").await.unwrap(), Some(b"[]".to_vec()));
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_in_memory_store_clones_share_state() {
        let store = InMemoryKeyValueStore::new();
        let view = store.clone();
        store.put("k", vec![1, 2, 3]).await.unwrap();
        assert_eq!(view.get("k").await.unwrap(), Some(vec![1, 2, 3]));

        view.delete("k").await.unwrap();
        assert!(store.get("k").await.unwrap().is_none());
    }
}
