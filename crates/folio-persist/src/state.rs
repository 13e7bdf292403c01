use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::store::KeyValueStore;

/// A typed value mirrored into a [`KeyValueStore`] under one key.
///
/// Storage is best effort: a missing or unreadable value falls back to the
/// default, and failed writes are logged while the in-memory value stays
/// authoritative.
pub struct PersistentState<T, S> {
    key: String,
    value: T,
    store: S,
}

impl<T, S> PersistentState<T, S>
where
    T: Serialize + DeserializeOwned + Send + Sync,
    S: KeyValueStore,
{
    pub async fn load(store: S, key: impl Into<String>, default: T) -> Self {
        let key = key.into();

        let value = match store.load(&key).await {
            Ok(Some(raw)) => match serde_json::from_value(raw) {
                Ok(value) => value,
                Err(e) => {
                    warn!("Stored value for {} is unreadable, using default: {}", key, e);
                    default
                }
            },
            Ok(None) => default,
            Err(e) => {
                warn!("Failed to load {}, using default: {}", key, e);
                default
            }
        };

        Self { key, value, store }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub async fn set(&mut self, value: T) {
        self.value = value;
        self.persist().await;
    }

    /// Mutate in place, then save
    pub async fn update<F>(&mut self, f: F)
    where
        F: FnOnce(&mut T),
    {
        f(&mut self.value);
        self.persist().await;
    }

    /// Drop the stored value and go back to `default`
    pub async fn reset(&mut self, default: T) {
        self.value = default;
        if let Err(e) = self.store.remove(&self.key).await {
            warn!("Failed to remove {}: {}", self.key, e);
        }
    }

    async fn persist(&self) {
        let raw = match serde_json::to_value(&self.value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to serialize {}: {}", self.key, e);
                return;
            }
        };

        if let Err(e) = self.store.save(&self.key, raw).await {
            warn!("Failed to save {}: {}", self.key, e);
        }
    }
}
