//! Resilient key-value storage
//!
//! A best-effort persistent storage layer for client-side state stores:
//! - Liveness probe and an initialization gate for cold starts
//! - Per-store safe storage that falls back to memory when the backend fails
//! - Targeted recovery of corrupted stores and a namespace-scoped emergency reset
//! - Typed, versioned persisted state for auth and feature flags

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::{
    AuthState, FeatureFlags, NamespacePolicy, PersistedState, StorageBackend, StorageError,
    StorageOperation, StorageState,
};
pub use infrastructure::storage::{
    BackendConfig, BackendFactory, BackendType, FileBackend, InMemoryBackend, Persistence,
    PersistedStore, ResetOutcome, SafeStorage, StorageManager, StorageRecovery, StorageSettings,
    initialize_storage, is_storage_available,
};
