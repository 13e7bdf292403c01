use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::store::KeyValueStore;

/// Process-local store, mostly for tests
#[derive(Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn load(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn save(&self, key: &str, value: Value) -> Result<()> {
        self.values.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.values.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_save_load_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.load("documents").await.unwrap(), None);

        store.save("documents", json!([1, 2])).await.unwrap();
        store.save("description", json!("reports")).await.unwrap();
        assert_eq!(store.load("documents").await.unwrap(), Some(json!([1, 2])));
        assert_eq!(store.load("description").await.unwrap(), Some(json!("reports")));

        store.remove("documents").await.unwrap();
        store.remove("documents").await.unwrap();
        assert_eq!(store.load("documents").await.unwrap(), None);
    }
}
