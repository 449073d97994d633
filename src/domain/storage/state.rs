//! Storage lifecycle states

use std::fmt;

use serde::Serialize;

/// Lifecycle of the storage layer.
///
/// `Uninitialized -> Probing -> {Available, Degraded} -> Recovering ->
/// {Available, Degraded}`. `Degraded` is not terminal: any later probe may
/// bring storage back to `Available`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageState {
    #[default]
    Uninitialized,
    Probing,
    Available,
    Degraded,
    Recovering,
}

impl StorageState {
    /// Settled state for a probe result
    pub fn from_probe(available: bool) -> Self {
        if available {
            Self::Available
        } else {
            Self::Degraded
        }
    }

    /// True while an operation is in flight
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Probing | Self::Recovering)
    }

    /// Only memory fallback is expected to work
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded)
    }
}

impl fmt::Display for StorageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "uninitialized"),
            Self::Probing => write!(f, "probing"),
            Self::Available => write!(f, "available"),
            Self::Degraded => write!(f, "degraded"),
            Self::Recovering => write!(f, "recovering"),
        }
    }
}
