//! [`StatusStore`] — persistence of [`SyncStatus`].
//!
//! Status bookkeeping is best-effort: read failures yield the default status
//! and write failures are logged, never raised.

use std::sync::Arc;

use lectio_core::{kv::KeyValueStore, status::SyncStatus};
use tracing::warn;

/// Storage key of the sync-status blob.
pub const SYNC_STATUS_KEY: &str = "lectio.sync_status";

pub struct StatusStore<S> {
  kv: Arc<S>,
}

impl<S: KeyValueStore> StatusStore<S> {
  pub fn new(kv: Arc<S>) -> Self { Self { kv } }

  pub async fn get(&self) -> SyncStatus {
    match self.kv.get(SYNC_STATUS_KEY).await {
      Ok(Some(blob)) => serde_json::from_str(&blob).unwrap_or_else(|e| {
        warn!(error = %e, "sync status is corrupt; using default");
        SyncStatus::default()
      }),
      Ok(None) => SyncStatus::default(),
      Err(e) => {
        warn!(error = %e, "could not read sync status; using default");
        SyncStatus::default()
      }
    }
  }

  /// Read-modify-write the persisted status.
  pub async fn update(&self, apply: impl FnOnce(&mut SyncStatus)) {
    let mut status = self.get().await;
    apply(&mut status);

    let blob = match serde_json::to_string(&status) {
      Ok(blob) => blob,
      Err(e) => {
        warn!(error = %e, "could not encode sync status");
        return;
      }
    };
    if let Err(e) = self.kv.set(SYNC_STATUS_KEY, blob).await {
      warn!(error = %e, "could not persist sync status");
    }
  }
}
