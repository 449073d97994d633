//! Persistent backend trait definition

use std::fmt;

use async_trait::async_trait;

use crate::domain::StorageError;

#[cfg(test)]
use mockall::automock;

/// Operations a persistent backend exposes, used for error context and logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageOperation {
    GetItem,
    SetItem,
    RemoveItem,
    MultiGet,
    MultiSet,
    MultiRemove,
    GetAllKeys,
    Clear,
}

impl StorageOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GetItem => "getItem",
            Self::SetItem => "setItem",
            Self::RemoveItem => "removeItem",
            Self::MultiGet => "multiGet",
            Self::MultiSet => "multiSet",
            Self::MultiRemove => "multiRemove",
            Self::GetAllKeys => "getAllKeys",
            Self::Clear => "clear",
        }
    }
}

impl fmt::Display for StorageOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Platform key-value backend.
///
/// Any call may fail. Batch operations default to per-key loops so simple
/// backends only need the single-key methods.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Reads a value, `None` when the key is absent
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Writes a value, replacing any previous one
    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Deletes a value; deleting an absent key is not an error
    async fn remove_item(&self, key: &str) -> Result<(), StorageError>;

    /// Reads several values, one pair per requested key in request order
    async fn multi_get(
        &self,
        keys: &[String],
    ) -> Result<Vec<(String, Option<String>)>, StorageError> {
        let mut results = Vec::with_capacity(keys.len());

        for key in keys {
            results.push((key.clone(), self.get_item(key).await?));
        }

        Ok(results)
    }

    /// Writes several values
    async fn multi_set(&self, entries: &[(String, String)]) -> Result<(), StorageError> {
        for (key, value) in entries {
            self.set_item(key, value).await?;
        }

        Ok(())
    }

    /// Deletes several values
    async fn multi_remove(&self, keys: &[String]) -> Result<(), StorageError> {
        for key in keys {
            self.remove_item(key).await?;
        }

        Ok(())
    }

    /// Lists every key currently held by the backend
    async fn get_all_keys(&self) -> Result<Vec<String>, StorageError>;

    /// Unconditionally wipes the backend, including keys the app does not own
    async fn clear(&self) -> Result<(), StorageError>;
}
