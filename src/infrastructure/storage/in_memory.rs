//! In-memory backend implementation

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::{StorageBackend, StorageError};

/// Thread-safe in-memory backend
///
/// Useful for testing and for running without device storage. Data is lost
/// when the process terminates.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryBackend {
    /// Creates a new empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend pre-populated with entries
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: RwLock::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    fn poisoned(operation: &str, err: impl std::fmt::Display) -> StorageError {
        StorageError::backend(operation, format!("Failed to acquire lock: {}", err))
    }
}

#[async_trait]
impl StorageBackend for InMemoryBackend {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| Self::poisoned("getItem", e))?;

        Ok(entries.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| Self::poisoned("setItem", e))?;

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| Self::poisoned("removeItem", e))?;

        entries.remove(key);
        Ok(())
    }

    async fn multi_get(
        &self,
        keys: &[String],
    ) -> Result<Vec<(String, Option<String>)>, StorageError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| Self::poisoned("multiGet", e))?;

        Ok(keys
            .iter()
            .map(|key| (key.clone(), entries.get(key).cloned()))
            .collect())
    }

    async fn multi_set(&self, items: &[(String, String)]) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| Self::poisoned("multiSet", e))?;

        for (key, value) in items {
            entries.insert(key.clone(), value.clone());
        }

        Ok(())
    }

    async fn multi_remove(&self, keys: &[String]) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| Self::poisoned("multiRemove", e))?;

        for key in keys {
            entries.remove(key);
        }

        Ok(())
    }

    async fn get_all_keys(&self) -> Result<Vec<String>, StorageError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| Self::poisoned("getAllKeys", e))?;

        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    async fn clear(&self) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| Self::poisoned("clear", e))?;

        entries.clear();
        Ok(())
    }
}
