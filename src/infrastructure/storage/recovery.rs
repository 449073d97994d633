//! Recovery utilities for corrupted or failing storage

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::domain::{NamespacePolicy, StorageBackend};

use super::probe::is_storage_available;

/// Result of an emergency reset
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetOutcome {
    /// Only application-owned keys were removed
    Scoped { removed: Vec<String> },
    /// Keys could not be listed; the whole backend was wiped
    FullClear,
    /// Neither the scoped removal nor the full clear succeeded
    Failed,
}

impl ResetOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed)
    }
}

/// Recovery operations against a persistent backend. None of them fail
/// towards the caller.
pub struct StorageRecovery {
    backend: Arc<dyn StorageBackend>,
    policy: NamespacePolicy,
}

impl std::fmt::Debug for StorageRecovery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageRecovery")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl StorageRecovery {
    pub fn new(backend: Arc<dyn StorageBackend>, policy: NamespacePolicy) -> Self {
        Self { backend, policy }
    }

    pub fn policy(&self) -> &NamespacePolicy {
        &self.policy
    }

    /// Removes the persisted key for `store_name` and re-probes the backend.
    /// Returns true when the removal succeeded and the probe passes.
    pub async fn recover_from_corruption(&self, store_name: &str) -> bool {
        if let Err(e) = self.backend.remove_item(store_name).await {
            warn!(store = store_name, error = %e, "Failed to remove corrupted store");
            return false;
        }

        let available = is_storage_available(self.backend.as_ref()).await;

        if available {
            info!(store = store_name, "Recovered corrupted store");
        } else {
            warn!(store = store_name, "Store removed but storage is still unavailable");
        }

        available
    }

    /// Removes every application-owned key. Falls back to wiping the whole
    /// backend only when the keys cannot be listed.
    pub async fn emergency_reset(&self) -> ResetOutcome {
        let keys = match self.backend.get_all_keys().await {
            Ok(keys) => keys,
            Err(e) => {
                error!(error = %e, "Failed to list storage keys, clearing all storage");
                return self.full_clear().await;
            }
        };

        let owned = self.policy.filter_owned(keys);

        if owned.is_empty() {
            info!("Emergency reset found no application keys");
            return ResetOutcome::Scoped { removed: owned };
        }

        match self.backend.multi_remove(&owned).await {
            Ok(()) => {
                info!(count = owned.len(), "Emergency reset removed application keys");
                ResetOutcome::Scoped { removed: owned }
            }
            Err(e) => {
                error!(error = %e, count = owned.len(), "Failed to remove application keys");
                ResetOutcome::Failed
            }
        }
    }

    async fn full_clear(&self) -> ResetOutcome {
        match self.backend.clear().await {
            Ok(()) => {
                warn!("All storage cleared");
                ResetOutcome::FullClear
            }
            Err(e) => {
                error!(error = %e, "Failed to clear storage");
                ResetOutcome::Failed
            }
        }
    }
}
