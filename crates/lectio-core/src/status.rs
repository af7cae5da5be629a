//! Synchronisation status, persisted beside the favorites collection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The engine's last known synchronisation state.
///
/// `is_syncing` goes `false → true → false` around each full sync.
/// `pending_sync` is orthogonal: set whenever a local mutation could not be
/// confirmed remotely, cleared by a later successful push or full sync.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
  pub is_syncing:   bool,
  pub last_sync_at: Option<DateTime<Utc>>,
  pub pending_sync: bool,
  pub error:        Option<String>,
}

impl SyncStatus {
  /// Idle and nothing waiting to reach the remote side.
  pub fn is_settled(&self) -> bool {
    !self.is_syncing && !self.pending_sync && self.error.is_none()
  }
}
