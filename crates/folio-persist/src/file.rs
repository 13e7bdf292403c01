// One `<key>.json` file per key

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::error::{PersistError, Result};
use crate::store::KeyValueStore;

pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// The directory is created on first save
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(PersistError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

fn io_error(path: &Path, source: std::io::Error) -> PersistError {
    PersistError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn load(&self, key: &str) -> Result<Option<Value>> {
        let path = self.path_for(key)?;

        let data = match tokio::fs::read_to_string(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(&path, e)),
        };

        Ok(Some(serde_json::from_str(&data)?))
    }

    async fn save(&self, key: &str, value: Value) -> Result<()> {
        let path = self.path_for(key)?;
        let json = serde_json::to_string_pretty(&value)?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| io_error(&self.dir, e))?;

        // Replace atomically
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| io_error(&tmp, e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| io_error(&path, e))?;

        debug!("Saved {} to {}", key, path.display());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(&path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(tmp.path().join("state"));

        assert_eq!(store.load("documents").await.unwrap(), None);
        store.remove("documents").await.unwrap();
    }

    #[tokio::test]
    async fn test_persist_and_reload() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("state");

        JsonFileStore::new(&dir)
            .save("session_cost", json!({"total": 0.5}))
            .await
            .unwrap();
        assert!(dir.join("session_cost.json").exists());
        assert!(!dir.join("session_cost.json.tmp").exists());

        let reopened = JsonFileStore::new(&dir);
        assert_eq!(
            reopened.load("session_cost").await.unwrap(),
            Some(json!({"total": 0.5}))
        );
    }

    #[tokio::test]
    async fn test_rejects_path_like_keys() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(tmp.path());

        for key in ["", "../escape", "a/b", "a.b"] {
            assert!(matches!(
                store.save(key, json!(1)).await,
                Err(PersistError::InvalidKey(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("documents.json"), "{not json").unwrap();
        let store = JsonFileStore::new(tmp.path());

        assert!(matches!(store.load("documents").await, Err(PersistError::Json(_))));
    }
}
