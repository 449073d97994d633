//! Typed application state persisted through safe storage

use std::marker::PhantomData;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::PersistedState;

use super::safe::{Persistence, SafeStorage};

/// Envelope written under the store key
#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    state: T,
    #[serde(default)]
    version: u32,
}

/// Loads and saves one `PersistedState` as a versioned JSON envelope.
///
/// Unreadable payloads are treated as absent: consumers start from their
/// default state instead of failing.
#[derive(Debug)]
pub struct PersistedStore<T> {
    store: Arc<SafeStorage>,
    _state: PhantomData<fn() -> T>,
}

impl<T> Clone for PersistedStore<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _state: PhantomData,
        }
    }
}

impl<T: PersistedState> PersistedStore<T> {
    pub fn new(store: Arc<SafeStorage>) -> Self {
        Self {
            store,
            _state: PhantomData,
        }
    }

    pub fn store(&self) -> &SafeStorage {
        &self.store
    }

    pub async fn load(&self) -> Option<T> {
        let raw = self.store.get_item(T::STORE_NAME).await?;

        let envelope: Envelope<T> = match serde_json::from_str(&raw) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(store = T::STORE_NAME, error = %e, "Discarding unreadable persisted state");
                return None;
            }
        };

        if envelope.version != T::VERSION {
            warn!(
                store = T::STORE_NAME,
                found = envelope.version,
                expected = T::VERSION,
                "Discarding persisted state with another version"
            );
            return None;
        }

        Some(envelope.state)
    }

    /// Loads the persisted state or the type's default
    pub async fn load_or_default(&self) -> T
    where
        T: Default,
    {
        self.load().await.unwrap_or_default()
    }

    pub async fn save(&self, state: &T) -> Persistence {
        let envelope = Envelope {
            state,
            version: T::VERSION,
        };

        match serde_json::to_string(&envelope) {
            Ok(raw) => self.store.set_item_checked(T::STORE_NAME, &raw).await,
            Err(e) => {
                warn!(store = T::STORE_NAME, error = %e, "Failed to serialize state");
                Persistence::MemoryOnly
            }
        }
    }

    pub async fn clear(&self) {
        self.store.remove_item(T::STORE_NAME).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::storage::mock::FaultyBackend;
    use crate::domain::{AuthState, FeatureFlags, StorageBackend};
    use crate::infrastructure::storage::InMemoryBackend;

    fn auth_store(backend: Arc<dyn StorageBackend>) -> PersistedStore<AuthState> {
        PersistedStore::new(Arc::new(SafeStorage::new(AuthState::STORE_NAME, backend)))
    }

    fn signed_in() -> AuthState {
        AuthState {
            token: Some("token".to_string()),
            user_id: Some("resident-7".to_string()),
            society_id: Some("society-1".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let backend = Arc::new(InMemoryBackend::new());
        let store = auth_store(backend.clone());

        assert_eq!(store.save(&signed_in()).await, Persistence::Durable);

        assert_eq!(store.load().await, Some(signed_in()));
        let raw = backend.get_item("auth-storage").await.unwrap().unwrap();
        assert!(raw.contains("\"version\":1"));
    }

    #[tokio::test]
    async fn test_load_absent() {
        let store = auth_store(Arc::new(InMemoryBackend::new()));

        assert!(store.load().await.is_none());
        assert_eq!(store.load_or_default().await, AuthState::default());
    }

    #[tokio::test]
    async fn test_corrupted_payload_is_absent() {
        let backend = Arc::new(InMemoryBackend::with_entries([("auth-storage", "{broken")]));
        let store = auth_store(backend);

        assert!(store.load().await.is_none());
    }

    #[tokio::test]
    async fn test_version_mismatch_is_absent() {
        let backend = Arc::new(InMemoryBackend::with_entries([(
            "auth-storage",
            r#"{"state":{"token":"t"},"version":0}"#,
        )]));
        let store = auth_store(backend);

        assert!(store.load().await.is_none());
    }

    #[tokio::test]
    async fn test_save_degraded_is_memory_only() {
        let store = auth_store(Arc::new(FaultyBackend::new().failing_everywhere()));

        assert_eq!(store.save(&signed_in()).await, Persistence::MemoryOnly);
        assert_eq!(store.load().await, Some(signed_in()));
    }

    #[tokio::test]
    async fn test_clear() {
        let store = auth_store(Arc::new(InMemoryBackend::new()));
        store.save(&signed_in()).await;

        store.clear().await;

        assert!(store.load().await.is_none());
    }

    #[tokio::test]
    async fn test_feature_flags_without_version_field() {
        let backend = Arc::new(InMemoryBackend::with_entries([(
            "feature-flags-storage",
            r#"{"state":{"flags":{"visitor_v2":true}}}"#,
        )]));
        let store: PersistedStore<FeatureFlags> = PersistedStore::new(Arc::new(
            SafeStorage::new(FeatureFlags::STORE_NAME, backend),
        ));

        let flags = store.load().await.unwrap();

        assert!(flags.is_enabled("visitor_v2"));
    }
}
