//! JSON snapshot persistence for the CLI: the full store state is loaded at
//! command start and written back after a successful operation.

use std::path::Path;

use crate::store::memory::{MemoryStore, StoreSnapshot};
use crate::store::StoreError;

/// Load a store from the data file, or start empty if the file does not exist
/// yet (first run).
pub async fn load_store(path: impl AsRef<Path>) -> Result<MemoryStore, StoreError> {
    let path = path.as_ref();
    if !tokio::fs::try_exists(path).await? {
        tracing::debug!(path = %path.display(), "no data file yet, starting empty");
        return Ok(MemoryStore::new());
    }
    let bytes = tokio::fs::read(path).await?;
    let snapshot: StoreSnapshot = serde_json::from_slice(&bytes)?;
    Ok(MemoryStore::from_snapshot(snapshot))
}

/// Persist the store state. The write goes through a temp file and rename so a
/// crash mid-write never truncates the data file.
pub async fn save_store(store: &MemoryStore, path: impl AsRef<Path>) -> Result<(), StoreError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    let snapshot = store.snapshot().await;
    let json = serde_json::to_vec_pretty(&snapshot)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, &json).await?;
    tokio::fs::rename(&tmp, path).await?;
    tracing::debug!(path = %path.display(), bytes = json.len(), "store snapshot saved");
    Ok(())
}
