//! Storage infrastructure - backends, safe wrapper, probe and recovery

mod factory;
mod file;
mod in_memory;
mod manager;
mod persisted;
pub mod probe;
mod recovery;
mod safe;

pub use factory::{BackendConfig, BackendFactory, BackendType};
pub use file::FileBackend;
pub use in_memory::InMemoryBackend;
pub use manager::{StorageManager, StorageSettings};
pub use persisted::PersistedStore;
pub use probe::{initialize_storage, is_storage_available};
pub use recovery::{ResetOutcome, StorageRecovery};
pub use safe::{Persistence, SafeStorage};
