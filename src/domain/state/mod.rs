//! Application state types persisted through the storage layer

use std::collections::BTreeMap;
use std::fmt::Debug;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use super::storage::{AUTH_STORE, FEATURE_FLAGS_STORE};

/// State that is persisted as a whole under a single store key
pub trait PersistedState: Clone + Debug + Send + Sync + Serialize + DeserializeOwned {
    /// Store key the state is written under
    const STORE_NAME: &'static str;

    /// Schema version; persisted payloads with another version are discarded
    const VERSION: u32 = 0;
}

/// Authenticated session for the current resident, guard or admin
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    pub token: Option<String>,
    pub refresh_token: Option<String>,
    pub user_id: Option<String>,
    pub society_id: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && !self.is_expired_at(Utc::now())
    }

    /// A session without an expiry never expires
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

impl PersistedState for AuthState {
    const STORE_NAME: &'static str = AUTH_STORE;
    const VERSION: u32 = 1;
}

/// Locally persisted feature flag overrides
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeatureFlags {
    #[serde(default)]
    pub flags: BTreeMap<String, bool>,
}

impl FeatureFlags {
    pub fn with_flag(mut self, name: impl Into<String>, enabled: bool) -> Self {
        self.flags.insert(name.into(), enabled);
        self
    }

    /// Unknown flags are disabled
    pub fn is_enabled(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }
}

impl PersistedState for FeatureFlags {
    const STORE_NAME: &'static str = FEATURE_FLAGS_STORE;
}
