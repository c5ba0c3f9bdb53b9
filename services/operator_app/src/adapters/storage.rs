//! services/operator_app/src/adapters/storage.rs
//!
//! Concrete implementations of the `KeyValueStore` port: a process-local map and
//! a JSON file on disk that survives restarts.

use async_trait::async_trait;
use spio_core::ports::{KeyValueStore, PortError, PortResult};
use std::collections::{BTreeMap, HashMap};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::{Mutex, RwLock};

//=========================================================================================
// In-Memory Store
//=========================================================================================

/// A store that forgets everything when the process exits.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> PortResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> PortResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn reset(&self) -> PortResult<()> {
        self.entries.write().await.clear();
        Ok(())
    }
}

//=========================================================================================
// File Store
//=========================================================================================

/// Keeps every entry in a single JSON object on disk.
///
/// Writes go to a sibling temp file that is then renamed over the original, so a
/// crash mid-write leaves the previous contents intact. A missing file reads as
/// an empty store; a file that does not parse yields `PortError::Corrupt` until
/// [`KeyValueStore::reset`] removes it.
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> PortResult<BTreeMap<String, String>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(BTreeMap::new()),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                PortError::Corrupt(format!(
                    "{} is not a valid store file: {}",
                    self.path.display(),
                    e
                ))
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(storage_error(&self.path, e)),
        }
    }

    async fn save(&self, entries: &BTreeMap<String, String>) -> PortResult<()> {
        let bytes = serde_json::to_vec_pretty(entries)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| storage_error(parent, e))?;
        }

        let tmp_path = self.path.with_extension("tmp");
        tokio::fs::write(&tmp_path, bytes)
            .await
            .map_err(|e| storage_error(&tmp_path, e))?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| storage_error(&self.path, e))
    }
}

fn storage_error(path: &Path, e: std::io::Error) -> PortError {
    PortError::StorageUnavailable(format!("{}: {}", path.display(), e))
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> PortResult<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries).await
    }

    async fn remove(&self, key: &str) -> PortResult<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.save(&entries).await
    }

    async fn reset(&self) -> PortResult<()> {
        let _guard = self.lock.lock().await;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_error(&self.path, e)),
        }
    }
}
