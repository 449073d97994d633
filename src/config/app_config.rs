use std::time::Duration;

use serde::Deserialize;

use crate::domain::{APP_KEY_PREFIX, AUTH_STORE, FEATURE_FLAGS_STORE, NamespacePolicy, StorageError};
use crate::infrastructure::storage::{BackendConfig, StorageSettings};

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// `memory` or `file`
    pub backend: String,
    /// Location of the storage document for the `file` backend
    pub path: Option<String>,
    pub init_delay_ms: u64,
    pub prefixes: Vec<String>,
    pub named_stores: Vec<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: "file".to_string(),
            path: Some("data/storage.json".to_string()),
            init_delay_ms: 100,
            prefixes: vec![APP_KEY_PREFIX.to_string()],
            named_stores: vec![AUTH_STORE.to_string(), FEATURE_FLAGS_STORE.to_string()],
        }
    }
}

impl StorageConfig {
    pub fn backend_config(&self) -> Result<BackendConfig, StorageError> {
        BackendConfig::from_parts(&self.backend, self.path.as_deref())
    }

    pub fn namespace_policy(&self) -> NamespacePolicy {
        let policy = self
            .prefixes
            .iter()
            .fold(NamespacePolicy::empty(), |policy, prefix| policy.with_prefix(prefix.clone()));

        self.named_stores
            .iter()
            .fold(policy, |policy, name| policy.with_named_store(name.clone()))
    }

    pub fn settings(&self) -> StorageSettings {
        StorageSettings {
            init_delay: Duration::from_millis(self.init_delay_ms),
            policy: self.namespace_policy(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("storage.prefixes")
                    .with_list_parse_key("storage.named_stores")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::BackendType;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.storage.init_delay_ms, 100);
        assert_eq!(
            config.storage.backend_config().unwrap().backend_type(),
            BackendType::File
        );
    }

    #[test]
    fn test_default_policy_matches_domain_default() {
        assert_eq!(
            StorageConfig::default().namespace_policy(),
            NamespacePolicy::default()
        );
    }

    #[test]
    fn test_settings_from_config() {
        let storage = StorageConfig {
            init_delay_ms: 250,
            prefixes: vec!["@society_".to_string()],
            named_stores: vec!["visitor-storage".to_string()],
            ..Default::default()
        };

        let settings = storage.settings();

        assert_eq!(settings.init_delay, Duration::from_millis(250));
        assert!(settings.policy.owns("@society_theme"));
        assert!(settings.policy.owns("visitor-storage"));
        assert!(!settings.policy.owns("auth-storage"));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: AppConfig = serde_json::from_str(
            r#"{"storage":{"backend":"memory"},"logging":{"format":"json"}}"#,
        )
        .unwrap();

        assert!(matches!(config.logging.format, LogFormat::Json));
        assert_eq!(config.logging.level, "info");
        assert_eq!(
            config.storage.backend_config().unwrap(),
            BackendConfig::InMemory
        );
    }
}
