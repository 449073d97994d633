//! Backend factory for runtime backend selection

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use crate::domain::{StorageBackend, StorageError};

use super::file::FileBackend;
use super::in_memory::InMemoryBackend;

/// Supported backend types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendType {
    /// Volatile in-process backend
    InMemory,
    /// JSON document on disk
    #[default]
    File,
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendType::InMemory => write!(f, "memory"),
            BackendType::File => write!(f, "file"),
        }
    }
}

impl FromStr for BackendType {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" | "inmemory" | "in-memory" | "in_memory" => Ok(BackendType::InMemory),
            "file" | "disk" => Ok(BackendType::File),
            _ => Err(StorageError::configuration(format!(
                "Unknown storage backend: {}. Valid backends: memory, file",
                s
            ))),
        }
    }
}

/// Backend configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    InMemory,
    File { path: PathBuf },
}

impl BackendConfig {
    pub fn in_memory() -> Self {
        Self::InMemory
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File { path: path.into() }
    }

    /// Builds a configuration from a backend name and an optional path
    pub fn from_parts(backend: &str, path: Option<&str>) -> Result<Self, StorageError> {
        match backend.parse::<BackendType>()? {
            BackendType::InMemory => Ok(Self::InMemory),
            BackendType::File => path.filter(|p| !p.is_empty()).map(Self::file).ok_or_else(|| {
                StorageError::configuration("File backend requires storage.path")
            }),
        }
    }

    pub fn backend_type(&self) -> BackendType {
        match self {
            Self::InMemory => BackendType::InMemory,
            Self::File { .. } => BackendType::File,
        }
    }
}

/// Factory for creating backend instances
#[derive(Debug)]
pub struct BackendFactory;

impl BackendFactory {
    /// Creates a backend for the configuration
    pub fn create(config: &BackendConfig) -> Arc<dyn StorageBackend> {
        match config {
            BackendConfig::InMemory => Arc::new(InMemoryBackend::new()),
            BackendConfig::File { path } => Arc::new(FileBackend::new(path.clone())),
        }
    }
}
