//! Abstract key-value persistence boundary.
//!
//! The engine treats storage as an async blob store with `get`/`set`/`remove`
//! and no transactions across keys. Two backends are provided:
//!
//! - [`MemoryKv`]: in-process map, for tests and ephemeral sessions
//! - [`JsonFileKv`]: the whole key space in one JSON file, written atomically
//!   (temp file + rename) so readers never observe partial writes

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::error::{Error, Result};

/// Backend-level failure, wrapped into [`Error`] with the offending key.
#[derive(Error, Debug)]
pub enum KvError {
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed backing file: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Asynchronous key-value blob store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> std::result::Result<Option<String>, KvError>;
    async fn set(&self, key: &str, value: &str) -> std::result::Result<(), KvError>;
    async fn remove(&self, key: &str) -> std::result::Result<(), KvError>;
}

/// In-memory backend.
#[derive(Debug, Default)]
pub struct MemoryKv {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKv {
    async fn get(&self, key: &str) -> std::result::Result<Option<String>, KvError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> std::result::Result<(), KvError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> std::result::Result<(), KvError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

/// File-backed store holding the whole key space as one JSON object.
#[derive(Debug)]
pub struct JsonFileKv {
    path: PathBuf,
    /// Serializes read-modify-write cycles against the backing file.
    guard: Mutex<()>,
}

impl JsonFileKv {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    async fn read_entries(&self) -> std::result::Result<HashMap<String, String>, KvError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(err) => Err(KvError::Io(err)),
        }
    }

    /// Write temp file then rename, so a crash mid-write leaves the previous
    /// contents intact.
    async fn write_entries(
        &self,
        entries: &HashMap<String, String>,
    ) -> std::result::Result<(), KvError> {
        let json = serde_json::to_string(entries)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, json.as_bytes()).await?;
        tokio::fs::rename(&temp_path, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for JsonFileKv {
    async fn get(&self, key: &str) -> std::result::Result<Option<String>, KvError> {
        Ok(self.read_entries().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> std::result::Result<(), KvError> {
        let _guard = self.guard.lock().await;
        let mut entries = self.read_entries().await?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries).await
    }

    async fn remove(&self, key: &str) -> std::result::Result<(), KvError> {
        let _guard = self.guard.lock().await;
        let mut entries = self.read_entries().await?;
        if entries.remove(key).is_some() {
            self.write_entries(&entries).await?;
        }
        Ok(())
    }
}

/// Load and decode the value under `key`, falling back to the default when
/// the key is absent. A failed read or malformed value is an error, never a
/// silent default.
pub(crate) async fn load_json_or_default<S, T>(kv: &S, key: &str) -> Result<T>
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned + Default,
{
    let raw = kv.get(key).await.map_err(|source| Error::StorageRead {
        key: key.to_string(),
        source,
    })?;
    match raw {
        None => Ok(T::default()),
        Some(json) => {
            debug!(key, bytes = json.len(), "loaded blob");
            serde_json::from_str(&json).map_err(|source| Error::CorruptRecord {
                key: key.to_string(),
                source,
            })
        }
    }
}

/// Encode `value` and write it under `key`.
pub(crate) async fn store_json<S, T>(kv: &S, key: &str, value: &T) -> Result<()>
where
    S: KeyValueStore + ?Sized,
    T: Serialize,
{
    let json = serde_json::to_string(value).map_err(|source| Error::EncodeRecord {
        key: key.to_string(),
        source,
    })?;
    debug!(key, bytes = json.len(), "storing blob");
    kv.set(key, &json).await.map_err(|source| Error::StorageWrite {
        key: key.to_string(),
        source,
    })
}
