//! Inspection commands - probe and per-key access through safe storage

use clap::Args;
use tracing::info;

use crate::domain::StorageBackend;
use crate::infrastructure::storage::{Persistence, StorageManager};

/// Arguments addressing one key of a store
#[derive(Args, Clone, Debug)]
pub struct GetArgs {
    /// Logical store name (e.g. auth-storage)
    pub store: String,

    /// Key to address
    pub key: String,
}

/// Arguments for writing one key of a store
#[derive(Args, Clone, Debug)]
pub struct SetArgs {
    /// Logical store name (e.g. auth-storage)
    pub store: String,

    /// Key to write
    pub key: String,

    /// Value to write
    pub value: String,
}

/// Arguments for listing keys
#[derive(Args, Clone, Debug)]
pub struct KeysArgs {
    /// Include keys outside the application namespaces
    #[arg(long)]
    pub all: bool,
}

pub async fn probe(manager: &StorageManager) -> anyhow::Result<()> {
    let state = manager.initialize().await;
    println!("{}", state);
    Ok(())
}

pub async fn get(manager: &StorageManager, args: GetArgs) -> anyhow::Result<()> {
    match manager.store(&args.store).get_item(&args.key).await {
        Some(value) => println!("{}", value),
        None => info!(store = %args.store, key = %args.key, "Key not found"),
    }
    Ok(())
}

pub async fn set(manager: &StorageManager, args: SetArgs) -> anyhow::Result<()> {
    let persistence = manager
        .store(&args.store)
        .set_item_checked(&args.key, &args.value)
        .await;

    println!("{}", persistence_label(persistence));
    Ok(())
}

fn persistence_label(persistence: Persistence) -> &'static str {
    if persistence.is_durable() {
        "persisted"
    } else {
        "memory-only"
    }
}

pub async fn remove(manager: &StorageManager, args: GetArgs) -> anyhow::Result<()> {
    manager.store(&args.store).remove_item(&args.key).await;
    Ok(())
}

pub async fn keys(manager: &StorageManager, args: KeysArgs) -> anyhow::Result<()> {
    let keys = manager.backend().get_all_keys().await?;

    let keys = if args.all {
        keys
    } else {
        manager.recovery().policy().filter_owned(keys)
    };

    for key in keys {
        println!("{}", key);
    }
    Ok(())
}
