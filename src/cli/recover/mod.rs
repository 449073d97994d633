//! Recovery commands - targeted store recovery and emergency reset

use clap::Args;
use tracing::warn;

use crate::infrastructure::storage::{ResetOutcome, StorageManager};

/// Arguments for the recover command
#[derive(Args, Clone, Debug)]
pub struct RecoverArgs {
    /// Store whose persisted key is corrupted
    pub store: String,
}

pub async fn recover(manager: &StorageManager, args: RecoverArgs) -> anyhow::Result<()> {
    if manager.recover(&args.store).await {
        println!("recovered {}", args.store);
        return Ok(());
    }

    let state = manager.state();

    if state.is_degraded() {
        warn!(store = %args.store, "Storage still unavailable, values live in memory only");
    }

    anyhow::bail!("Failed to recover store '{}' (state: {})", args.store, state)
}

pub async fn reset(manager: &StorageManager) -> anyhow::Result<()> {
    match manager.emergency_reset().await {
        ResetOutcome::Scoped { removed } => {
            for key in &removed {
                println!("removed {}", key);
            }
            println!("{} application keys removed", removed.len());
        }
        ResetOutcome::FullClear => {
            warn!("Key listing failed, all storage was cleared");
            println!("all storage cleared");
        }
        ResetOutcome::Failed => anyhow::bail!("Emergency reset failed"),
    }
    Ok(())
}
