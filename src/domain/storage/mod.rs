//! Storage domain - persistent backend abstraction and key ownership

mod backend;
mod namespace;
mod state;

pub use backend::{StorageBackend, StorageOperation};
pub use namespace::{APP_KEY_PREFIX, AUTH_STORE, FEATURE_FLAGS_STORE, NamespacePolicy};
pub use state::StorageState;

#[cfg(test)]
pub use backend::{MockStorageBackend, mock};
