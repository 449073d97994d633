//! Owned storage lifecycle and per-store registry

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tracing::info;

use crate::domain::{NamespacePolicy, PersistedState, StorageBackend, StorageState};

use super::persisted::PersistedStore;
use super::probe::{self, DEFAULT_INIT_DELAY};
use super::recovery::{ResetOutcome, StorageRecovery};
use super::safe::SafeStorage;

/// Settings the manager needs beyond the backend itself
#[derive(Debug, Clone)]
pub struct StorageSettings {
    pub init_delay: Duration,
    pub policy: NamespacePolicy,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            init_delay: DEFAULT_INIT_DELAY,
            policy: NamespacePolicy::default(),
        }
    }
}

/// Explicitly owned storage container.
///
/// Created at startup, initialized once with [`StorageManager::initialize`],
/// and dropped at shutdown. Hands out one [`SafeStorage`] per logical store
/// and tracks the lifecycle state across probes and recoveries.
pub struct StorageManager {
    backend: Arc<dyn StorageBackend>,
    settings: StorageSettings,
    recovery: StorageRecovery,
    state: RwLock<StorageState>,
    stores: RwLock<HashMap<String, Arc<SafeStorage>>>,
}

impl std::fmt::Debug for StorageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageManager")
            .field("settings", &self.settings)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl StorageManager {
    pub fn new(backend: Arc<dyn StorageBackend>, settings: StorageSettings) -> Self {
        let recovery = StorageRecovery::new(backend.clone(), settings.policy.clone());

        Self {
            backend,
            settings,
            recovery,
            state: RwLock::new(StorageState::Uninitialized),
            stores: RwLock::new(HashMap::new()),
        }
    }

    pub fn state(&self) -> StorageState {
        // a poisoned lock still holds a valid state value
        *self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn set_state(&self, state: StorageState) {
        *self.state.write().unwrap_or_else(|e| e.into_inner()) = state;
    }

    pub fn backend(&self) -> &Arc<dyn StorageBackend> {
        &self.backend
    }

    pub fn recovery(&self) -> &StorageRecovery {
        &self.recovery
    }

    /// Runs the initialization gate and settles on `Available` or `Degraded`
    pub async fn initialize(&self) -> StorageState {
        self.set_state(StorageState::Probing);

        let available =
            probe::initialize_storage(self.backend.as_ref(), self.settings.init_delay).await;
        let state = StorageState::from_probe(available);
        self.set_state(state);

        info!(state = %state, "Storage initialized");
        state
    }

    /// Re-probes the backend without the degraded-start wait
    pub async fn refresh(&self) -> StorageState {
        self.set_state(StorageState::Probing);

        let available = probe::is_storage_available(self.backend.as_ref()).await;
        let state = StorageState::from_probe(available);
        self.set_state(state);
        state
    }

    /// Returns the safe storage for a logical store, creating it on first use
    pub fn store(&self, name: &str) -> Arc<SafeStorage> {
        if let Some(store) = self
            .stores
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
        {
            return store.clone();
        }

        self.stores
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(SafeStorage::new(name, self.backend.clone())))
            .clone()
    }

    fn registered_stores(&self) -> Vec<Arc<SafeStorage>> {
        self.stores
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .cloned()
            .collect()
    }

    /// Typed persisted state bound to its store
    pub fn persisted<T: PersistedState>(&self) -> PersistedStore<T> {
        PersistedStore::new(self.store(T::STORE_NAME))
    }

    /// Removes a corrupted store key and settles the state from the re-probe.
    ///
    /// The key is also dropped from the memory fallback of every registered
    /// store, so a corrupted value that never reached the backend cannot
    /// outlive the recovery.
    pub async fn recover(&self, store_name: &str) -> bool {
        self.set_state(StorageState::Recovering);

        for store in self.registered_stores() {
            store.clear_fallback(store_name).await;
        }

        let recovered = self.recovery.recover_from_corruption(store_name).await;
        self.set_state(StorageState::from_probe(recovered));
        recovered
    }

    /// Runs an emergency reset and settles the state from a fresh probe
    pub async fn emergency_reset(&self) -> ResetOutcome {
        self.set_state(StorageState::Recovering);

        let outcome = self.recovery.emergency_reset().await;

        for store in self.registered_stores() {
            match &outcome {
                ResetOutcome::Scoped { .. } => {
                    store.clear_fallback_owned(&self.settings.policy).await;
                }
                ResetOutcome::FullClear => {
                    store.clear_fallback_all().await;
                }
                ResetOutcome::Failed => {}
            }
        }

        let available = probe::is_storage_available(self.backend.as_ref()).await;
        self.set_state(StorageState::from_probe(available));
        outcome
    }
}
