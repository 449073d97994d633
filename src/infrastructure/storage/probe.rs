//! Backend liveness probe and initialization gate

use std::time::Duration;

use tracing::{debug, warn};

use crate::domain::{StorageBackend, StorageError};

/// Key written by the probe; it lives under the app prefix so an emergency
/// reset also sweeps a leftover probe entry
pub const PROBE_KEY: &str = "@app_storage_probe";

/// Sentinel value written and read back by the probe
pub const PROBE_VALUE: &str = "test";

/// Lower bound for the degraded-start wait
pub const MIN_INIT_DELAY: Duration = Duration::from_millis(50);

/// Default degraded-start wait
pub const DEFAULT_INIT_DELAY: Duration = Duration::from_millis(100);

/// Returns true when a write, a matching read-back and a delete of the probe
/// key all succeed. Never fails.
pub async fn is_storage_available(backend: &dyn StorageBackend) -> bool {
    match run_probe(backend).await {
        Ok(true) => true,
        Ok(false) => {
            warn!(key = PROBE_KEY, "Storage probe read back an unexpected value");
            false
        }
        Err(e) => {
            warn!(key = PROBE_KEY, error = %e, "Storage probe failed");
            false
        }
    }
}

async fn run_probe(backend: &dyn StorageBackend) -> Result<bool, StorageError> {
    backend.set_item(PROBE_KEY, PROBE_VALUE).await?;
    let value = backend.get_item(PROBE_KEY).await?;
    backend.remove_item(PROBE_KEY).await?;

    Ok(value.as_deref() == Some(PROBE_VALUE))
}

/// Probes the backend; when unavailable, waits at least `min_delay`
/// (clamped to [`MIN_INIT_DELAY`]) before letting the caller continue in
/// degraded mode. Returns whether storage is available.
pub async fn initialize_storage(backend: &dyn StorageBackend, min_delay: Duration) -> bool {
    if is_storage_available(backend).await {
        debug!("Storage available");
        return true;
    }

    let delay = min_delay.max(MIN_INIT_DELAY);
    warn!(
        delay_ms = delay.as_millis() as u64,
        "Storage unavailable, continuing with in-memory fallback"
    );
    tokio::time::sleep(delay).await;

    false
}
