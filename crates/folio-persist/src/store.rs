use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// Named JSON values
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// `None` when nothing was saved under `key`
    async fn load(&self, key: &str) -> Result<Option<Value>>;

    async fn save(&self, key: &str, value: Value) -> Result<()>;

    /// Removing a missing key is not an error
    async fn remove(&self, key: &str) -> Result<()>;
}

#[async_trait]
impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    async fn load(&self, key: &str) -> Result<Option<Value>> {
        (**self).load(key).await
    }

    async fn save(&self, key: &str, value: Value) -> Result<()> {
        (**self).save(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key).await
    }
}
