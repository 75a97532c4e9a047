use async_trait::async_trait;
use std::{collections::HashMap, env, path::PathBuf};
use tokio::{fs, sync::Mutex};

pub const DAILY_LOGS_KEY: &str = "bb_daily_logs";
pub const WEIGHT_LOGS_KEY: &str = "bb_weight_logs";
pub const SETTINGS_KEY: &str = "bb_settings";
pub const CHAT_HISTORY_KEY: &str = "bb_chat_history";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to read {key}: {source}")]
    Read {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {key}: {source}")]
    Write {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Flat string key-value storage, one JSON document per key.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.lock().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, std::io::Error> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)).await {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Read {
                key: key.to_string(),
                source,
            }),
        }
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::write(self.path_for(key), value)
            .await
            .map_err(|source| StorageError::Write {
                key: key.to_string(),
                source,
            })
    }
}

pub fn resolve_data_dir() -> PathBuf {
    if let Ok(path) = env::var("APP_DATA_DIR") {
        return PathBuf::from(path);
    }

    PathBuf::from("data")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unique_dir() -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!("binge_breaker_store_{}_{}", std::process::id(), nanos));
        path
    }

    #[tokio::test]
    async fn memory_store_returns_none_for_missing_key() {
        let store = MemoryStore::new();
        assert!(store.get_item(SETTINGS_KEY).await.unwrap().is_none());

        store.set_item(SETTINGS_KEY, "{}").await.unwrap();
        assert_eq!(store.get_item(SETTINGS_KEY).await.unwrap().as_deref(), Some("{}"));
    }

    #[tokio::test]
    async fn file_store_writes_one_file_per_key() {
        let dir = unique_dir();
        let store = FileStore::open(&dir).await.unwrap();
        assert!(store.get_item(DAILY_LOGS_KEY).await.unwrap().is_none());

        store.set_item(DAILY_LOGS_KEY, "[]").await.unwrap();
        assert!(dir.join("bb_daily_logs.json").exists());
        assert_eq!(store.get_item(DAILY_LOGS_KEY).await.unwrap().as_deref(), Some("[]"));

        let _ = std::fs::remove_dir_all(dir);
    }
}
