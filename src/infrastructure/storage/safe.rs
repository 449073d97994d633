//! Safe storage wrapper with in-memory fallback

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::domain::{NamespacePolicy, StorageBackend};

/// Where a write ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persistence {
    /// Written to the persistent backend
    Durable,
    /// Held only in process memory; lost on restart
    MemoryOnly,
}

impl Persistence {
    pub fn is_durable(&self) -> bool {
        matches!(self, Self::Durable)
    }
}

/// Storage for one logical store that never fails towards its caller.
///
/// Backend failures are logged and absorbed: writes that cannot be persisted
/// land in a per-instance memory map, and reads consult that map after the
/// persistent read. Entries in the map are newer than anything the backend
/// holds for the same key, so they win on read. A successful persistent write
/// or a remove drops the key from the map; recovery drops entries through the
/// `clear_fallback*` methods.
pub struct SafeStorage {
    store_name: String,
    backend: Arc<dyn StorageBackend>,
    fallback: RwLock<HashMap<String, String>>,
}

impl fmt::Debug for SafeStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SafeStorage")
            .field("store_name", &self.store_name)
            .finish_non_exhaustive()
    }
}

impl SafeStorage {
    pub fn new(store_name: impl Into<String>, backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            store_name: store_name.into(),
            backend,
            fallback: RwLock::new(HashMap::new()),
        }
    }

    pub fn store_name(&self) -> &str {
        &self.store_name
    }

    /// Number of values currently held only in memory
    pub async fn fallback_len(&self) -> usize {
        self.fallback.read().await.len()
    }

    /// Drops the memory-only value for a key. Returns true if one was held.
    pub async fn clear_fallback(&self, key: &str) -> bool {
        self.fallback.write().await.remove(key).is_some()
    }

    /// Drops every memory-only value whose key the policy owns
    pub async fn clear_fallback_owned(&self, policy: &NamespacePolicy) -> usize {
        let mut fallback = self.fallback.write().await;
        let before = fallback.len();
        fallback.retain(|key, _| !policy.owns(key));
        before - fallback.len()
    }

    /// Drops every memory-only value
    pub async fn clear_fallback_all(&self) -> usize {
        let mut fallback = self.fallback.write().await;
        let cleared = fallback.len();
        fallback.clear();
        cleared
    }

    /// Reads a value; `None` means absent, never an error
    pub async fn get_item(&self, key: &str) -> Option<String> {
        let persisted = match self.backend.get_item(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!(
                    store = %self.store_name,
                    key,
                    error = %e,
                    "Storage read failed, using memory fallback"
                );
                None
            }
        };

        match self.fallback.read().await.get(key) {
            Some(value) => Some(value.clone()),
            None => persisted,
        }
    }

    /// Writes a value. Always succeeds from the caller's point of view.
    pub async fn set_item(&self, key: &str, value: &str) {
        self.set_item_checked(key, value).await;
    }

    /// Writes a value and reports whether it reached the persistent backend
    pub async fn set_item_checked(&self, key: &str, value: &str) -> Persistence {
        match self.backend.set_item(key, value).await {
            Ok(()) => {
                self.fallback.write().await.remove(key);
                Persistence::Durable
            }
            Err(e) => {
                warn!(
                    store = %self.store_name,
                    key,
                    error = %e,
                    "Storage write failed, keeping value in memory"
                );
                self.fallback
                    .write()
                    .await
                    .insert(key.to_string(), value.to_string());
                Persistence::MemoryOnly
            }
        }
    }

    /// Removes a value from both the backend and the memory fallback
    pub async fn remove_item(&self, key: &str) {
        self.fallback.write().await.remove(key);

        if let Err(e) = self.backend.remove_item(key).await {
            warn!(
                store = %self.store_name,
                key,
                error = %e,
                "Storage remove failed"
            );
        }
    }

    /// Reads several values, one pair per key in request order
    pub async fn multi_get(&self, keys: &[String]) -> Vec<(String, Option<String>)> {
        let persisted = match self.backend.multi_get(keys).await {
            Ok(pairs) => pairs,
            Err(e) => {
                warn!(
                    store = %self.store_name,
                    count = keys.len(),
                    error = %e,
                    "Storage batch read failed, using memory fallback"
                );
                keys.iter().map(|key| (key.clone(), None)).collect()
            }
        };

        let fallback = self.fallback.read().await;

        persisted
            .into_iter()
            .map(|(key, value)| {
                let value = fallback.get(&key).cloned().or(value);
                (key, value)
            })
            .collect()
    }

    /// Writes several values. Always succeeds from the caller's point of view.
    pub async fn multi_set(&self, entries: &[(String, String)]) {
        match self.backend.multi_set(entries).await {
            Ok(()) => {
                let mut fallback = self.fallback.write().await;

                for (key, _) in entries {
                    fallback.remove(key);
                }
            }
            Err(e) => {
                warn!(
                    store = %self.store_name,
                    count = entries.len(),
                    error = %e,
                    "Storage batch write failed, keeping values in memory"
                );
                let mut fallback = self.fallback.write().await;

                for (key, value) in entries {
                    fallback.insert(key.clone(), value.clone());
                }
            }
        }

        debug!(store = %self.store_name, count = entries.len(), "Batch write done");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StorageOperation;
    use crate::domain::storage::mock::FaultyBackend;

    fn safe(backend: &Arc<FaultyBackend>) -> SafeStorage {
        SafeStorage::new("auth-storage", backend.clone())
    }

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn entries(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_write_then_read_healthy() {
        let backend = Arc::new(FaultyBackend::new());
        let storage = safe(&backend);

        assert_eq!(storage.set_item_checked("k", "v").await, Persistence::Durable);
        assert_eq!(storage.get_item("k").await, Some("v".to_string()));
        assert!(backend.contains("k"));
        assert_eq!(storage.fallback_len().await, 0);
    }

    #[tokio::test]
    async fn test_write_then_read_degraded() {
        let backend = Arc::new(FaultyBackend::new().failing_everywhere());
        let storage = safe(&backend);

        storage.set_item("k", "v").await;

        assert_eq!(storage.get_item("k").await, Some("v".to_string()));
        assert_eq!(storage.fallback_len().await, 1);
    }

    #[tokio::test]
    async fn test_failed_write_with_working_reads() {
        let backend = Arc::new(
            FaultyBackend::new()
                .with_entry("k", "old")
                .failing_on(StorageOperation::SetItem),
        );
        let storage = safe(&backend);

        assert_eq!(storage.set_item_checked("k", "new").await, Persistence::MemoryOnly);

        assert_eq!(storage.get_item("k").await, Some("new".to_string()));
    }

    #[tokio::test]
    async fn test_get_missing_on_failure_is_none() {
        let backend = Arc::new(FaultyBackend::new().failing_on(StorageOperation::GetItem));
        let storage = safe(&backend);

        assert!(storage.get_item("missing").await.is_none());
    }

    #[tokio::test]
    async fn test_successful_write_clears_fallback() {
        let backend = Arc::new(FaultyBackend::new().failing_on(StorageOperation::SetItem));
        let storage = safe(&backend);

        storage.set_item("k", "memory").await;
        backend.heal();
        storage.set_item("k", "disk").await;

        assert_eq!(storage.fallback_len().await, 0);
        assert_eq!(storage.get_item("k").await, Some("disk".to_string()));
    }

    #[tokio::test]
    async fn test_remove_swallows_failure_and_clears_fallback() {
        let backend = Arc::new(FaultyBackend::new().failing_everywhere());
        let storage = safe(&backend);

        storage.set_item("k", "v").await;
        storage.remove_item("k").await;

        assert!(storage.get_item("k").await.is_none());
    }

    #[tokio::test]
    async fn test_remove_healthy() {
        let backend = Arc::new(FaultyBackend::new().with_entry("k", "v"));
        let storage = safe(&backend);

        storage.remove_item("k").await;

        assert!(!backend.contains("k"));
    }

    #[tokio::test]
    async fn test_multi_get_batch_failure_uses_fallback() {
        let backend = Arc::new(FaultyBackend::new().failing_everywhere());
        let storage = safe(&backend);
        storage.set_item("a", "1").await;

        let result = storage.multi_get(&keys(&["a", "b"])).await;

        assert_eq!(
            result,
            vec![("a".to_string(), Some("1".to_string())), ("b".to_string(), None)]
        );
    }

    #[tokio::test]
    async fn test_multi_get_overlays_fallback_on_success() {
        let backend = Arc::new(
            FaultyBackend::new()
                .with_entry("b", "2")
                .failing_on(StorageOperation::SetItem),
        );
        let storage = safe(&backend);
        storage.set_item("a", "1").await;

        let result = storage.multi_get(&keys(&["a", "b"])).await;

        assert_eq!(
            result,
            vec![
                ("a".to_string(), Some("1".to_string())),
                ("b".to_string(), Some("2".to_string())),
            ]
        );
    }

    #[tokio::test]
    async fn test_multi_set_batch_failure_then_read() {
        let backend = Arc::new(FaultyBackend::new().failing_everywhere());
        let storage = safe(&backend);

        storage.multi_set(&entries(&[("a", "1"), ("b", "2")])).await;

        assert_eq!(storage.get_item("a").await, Some("1".to_string()));
        assert_eq!(storage.get_item("b").await, Some("2".to_string()));
        assert_eq!(storage.fallback_len().await, 2);
    }

    #[tokio::test]
    async fn test_multi_set_healthy() {
        let backend = Arc::new(FaultyBackend::new());
        let storage = safe(&backend);

        storage.multi_set(&entries(&[("a", "1"), ("b", "2")])).await;

        assert_eq!(backend.keys(), vec!["a", "b"]);
        assert_eq!(storage.fallback_len().await, 0);
    }

    #[tokio::test]
    async fn test_clear_fallback_key() {
        let backend = Arc::new(FaultyBackend::new().failing_on(StorageOperation::SetItem));
        let storage = safe(&backend);
        storage.set_item("auth-storage", "{broken").await;
        storage.set_item("@app_theme", "dark").await;

        assert!(storage.clear_fallback("auth-storage").await);
        assert!(!storage.clear_fallback("auth-storage").await);

        assert!(storage.get_item("auth-storage").await.is_none());
        assert_eq!(storage.get_item("@app_theme").await, Some("dark".to_string()));
    }

    #[tokio::test]
    async fn test_clear_fallback_owned_keeps_foreign_keys() {
        let backend = Arc::new(FaultyBackend::new().failing_everywhere());
        let storage = safe(&backend);
        storage
            .multi_set(&entries(&[
                ("@app_a", "1"),
                ("auth-storage", "{}"),
                ("other_key", "2"),
            ]))
            .await;

        let cleared = storage.clear_fallback_owned(&NamespacePolicy::default()).await;

        assert_eq!(cleared, 2);
        assert_eq!(storage.get_item("other_key").await, Some("2".to_string()));
        assert!(storage.get_item("@app_a").await.is_none());
    }

    #[tokio::test]
    async fn test_clear_fallback_all() {
        let backend = Arc::new(FaultyBackend::new().failing_everywhere());
        let storage = safe(&backend);
        storage.multi_set(&entries(&[("a", "1"), ("b", "2")])).await;

        assert_eq!(storage.clear_fallback_all().await, 2);
        assert_eq!(storage.fallback_len().await, 0);
    }

    #[test]
    fn test_persistence_is_durable() {
        assert!(Persistence::Durable.is_durable());
        assert!(!Persistence::MemoryOnly.is_durable());
    }

    #[tokio::test]
    async fn test_fallback_is_per_instance() {
        let backend = Arc::new(FaultyBackend::new().failing_everywhere());
        let auth = SafeStorage::new("auth-storage", backend.clone());
        let flags = SafeStorage::new("feature-flags-storage", backend.clone());

        auth.set_item("k", "v").await;

        assert!(flags.get_item("k").await.is_none());
        assert_eq!(auth.store_name(), "auth-storage");
    }
}
