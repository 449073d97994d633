use thiserror::Error;

/// Errors raised by persistent storage backends and configuration.
///
/// These never reach consumers of `SafeStorage`; the safe layer converts
/// them into `None`, no-ops or `false` after logging.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Backend error during {operation}: {message}")]
    Backend { operation: String, message: String },

    #[error("Storage corrupted: {message}")]
    Corrupted { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl StorageError {
    pub fn backend(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Backend {
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn corrupted(message: impl Into<String>) -> Self {
        Self::Corrupted {
            message: message.into(),
        }
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}
