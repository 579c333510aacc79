//! In-memory store, used for tests and `--in-memory` runs

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;

use super::{validate_key, PersistentStore, StoreError};

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.values.lock().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl PersistentStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        validate_key(key)?;
        let values = self.values.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        let mut values = self.values.lock().map_err(|_| StoreError::Poisoned)?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        let mut values = self.values.lock().map_err(|_| StoreError::Poisoned)?;
        values.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get("activeTimer").await.unwrap(), None);

        store.set("activeTimer", "{}").await.unwrap();
        assert_eq!(store.get("activeTimer").await.unwrap().as_deref(), Some("{}"));

        store.remove("activeTimer").await.unwrap();
        assert!(store.is_empty());

        // absent keys remove cleanly
        store.remove("activeTimer").await.unwrap();
    }

    #[tokio::test]
    async fn test_remove_many() {
        let store = MemoryStore::new();
        store.set("a", "1").await.unwrap();
        store.set("b", "2").await.unwrap();
        store.set("c", "3").await.unwrap();

        store.remove_many(&["a", "b"]).await.unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("c").await.unwrap().as_deref(), Some("3"));
    }
}
