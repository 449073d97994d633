//! Domain layer - storage abstractions, errors and persisted state types

pub mod error;
pub mod state;
pub mod storage;

pub use error::StorageError;
pub use state::{AuthState, FeatureFlags, PersistedState};
pub use storage::{
    APP_KEY_PREFIX, AUTH_STORE, FEATURE_FLAGS_STORE, NamespacePolicy, StorageBackend,
    StorageOperation, StorageState,
};
