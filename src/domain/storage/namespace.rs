//! Application-owned key namespaces

/// Prefix carried by every key the application writes directly
pub const APP_KEY_PREFIX: &str = "@app_";

/// Persisted state store for the authenticated session
pub const AUTH_STORE: &str = "auth-storage";

/// Persisted state store for feature flag overrides
pub const FEATURE_FLAGS_STORE: &str = "feature-flags-storage";

/// Explicit allow-list of keys the application owns.
///
/// A key is owned when it starts with one of the prefixes or equals one of
/// the named stores. Bulk removal only ever targets owned keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespacePolicy {
    prefixes: Vec<String>,
    named_stores: Vec<String>,
}

impl Default for NamespacePolicy {
    fn default() -> Self {
        Self {
            prefixes: vec![APP_KEY_PREFIX.to_string()],
            named_stores: vec![AUTH_STORE.to_string(), FEATURE_FLAGS_STORE.to_string()],
        }
    }
}

impl NamespacePolicy {
    /// Creates an empty policy that owns nothing
    pub fn empty() -> Self {
        Self {
            prefixes: Vec::new(),
            named_stores: Vec::new(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();

        // an empty prefix would match every key
        if !prefix.is_empty() {
            self.prefixes.push(prefix);
        }
        self
    }

    pub fn with_named_store(mut self, name: impl Into<String>) -> Self {
        self.named_stores.push(name.into());
        self
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    pub fn named_stores(&self) -> &[String] {
        &self.named_stores
    }

    /// Returns true if the key belongs to the application
    pub fn owns(&self, key: &str) -> bool {
        self.named_stores.iter().any(|name| name == key)
            || self.prefixes.iter().any(|prefix| key.starts_with(prefix.as_str()))
    }

    /// Filters keys down to the ones the application owns, preserving order
    pub fn filter_owned<I>(&self, keys: I) -> Vec<String>
    where
        I: IntoIterator<Item = String>,
    {
        keys.into_iter().filter(|key| self.owns(key)).collect()
    }
}
