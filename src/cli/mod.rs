//! CLI module for the resilient storage layer
//!
//! Provides subcommands that exercise the storage layer against the
//! configured backend:
//! - `probe`: liveness check and initialization gate
//! - `get`, `set`, `remove`, `keys`: store inspection through safe storage
//! - `recover`, `reset`: recovery utilities

pub mod inspect;
pub mod recover;

use clap::{Args, Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;
use crate::infrastructure::storage::{BackendConfig, BackendFactory, StorageManager};

/// Resilient key-value storage with in-memory fallback and recovery
#[derive(Parser)]
#[command(name = "resilient-storage")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub backend: BackendArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Backend overrides applied on top of the loaded configuration
#[derive(Args, Clone, Debug, Default)]
pub struct BackendArgs {
    /// Backend to use (`memory` or `file`), overrides storage.backend
    #[arg(long, global = true)]
    pub backend: Option<String>,

    /// Storage document path for the file backend, overrides storage.path
    #[arg(long, global = true)]
    pub path: Option<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Probe the backend and report the storage state
    Probe,

    /// Read a key through a store's safe storage
    Get(inspect::GetArgs),

    /// Write a key through a store's safe storage
    Set(inspect::SetArgs),

    /// Remove a key through a store's safe storage
    Remove(inspect::GetArgs),

    /// List keys held by the backend
    Keys(inspect::KeysArgs),

    /// Remove a corrupted store key and re-probe
    Recover(recover::RecoverArgs),

    /// Remove every application-owned key
    Reset,
}

/// Loads configuration, installs logging and builds the storage manager
pub fn bootstrap(args: &BackendArgs) -> anyhow::Result<StorageManager> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_default();
    logging::init_logging(&config.logging);

    let backend_config = resolve_backend(&config, args)?;
    let backend = BackendFactory::create(&backend_config);

    tracing::debug!(backend = %backend_config.backend_type(), "Storage backend selected");

    Ok(StorageManager::new(backend, config.storage.settings()))
}

fn resolve_backend(config: &AppConfig, args: &BackendArgs) -> anyhow::Result<BackendConfig> {
    let backend = args.backend.as_deref().unwrap_or(&config.storage.backend);
    let path = args.path.as_deref().or(config.storage.path.as_deref());

    Ok(BackendConfig::from_parts(backend, path)?)
}

/// Runs a parsed command
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let manager = bootstrap(&cli.backend)?;

    match cli.command {
        Command::Probe => inspect::probe(&manager).await,
        Command::Get(args) => inspect::get(&manager, args).await,
        Command::Set(args) => inspect::set(&manager, args).await,
        Command::Remove(args) => inspect::remove(&manager, args).await,
        Command::Keys(args) => inspect::keys(&manager, args).await,
        Command::Recover(args) => recover::recover(&manager, args).await,
        Command::Reset => recover::reset(&manager).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::BackendType;

    #[test]
    fn test_parse_set() {
        let cli = Cli::parse_from(["resilient-storage", "set", "auth-storage", "k", "v"]);

        match cli.command {
            Command::Set(args) => {
                assert_eq!(args.store, "auth-storage");
                assert_eq!(args.key, "k");
                assert_eq!(args.value, "v");
            }
            _ => panic!("Expected set command"),
        }
    }

    #[test]
    fn test_parse_global_backend_flag() {
        let cli = Cli::parse_from(["resilient-storage", "keys", "--backend", "memory", "--all"]);

        assert_eq!(cli.backend.backend.as_deref(), Some("memory"));
        assert!(matches!(cli.command, Command::Keys(ref args) if args.all));
    }

    #[test]
    fn test_resolve_backend_prefers_flags() {
        let config = AppConfig::default();
        let args = BackendArgs {
            backend: Some("memory".to_string()),
            path: None,
        };

        let resolved = resolve_backend(&config, &args).unwrap();

        assert_eq!(resolved.backend_type(), BackendType::InMemory);
    }

    #[test]
    fn test_resolve_backend_path_override() {
        let config = AppConfig::default();
        let args = BackendArgs {
            backend: None,
            path: Some("/tmp/other.json".to_string()),
        };

        assert_eq!(
            resolve_backend(&config, &args).unwrap(),
            BackendConfig::file("/tmp/other.json")
        );
    }
}
