//! [`LocalFavorites`] — the on-device favorites collection.
//!
//! The whole collection lives as one JSON array under [`FAVORITES_KEY`]. Every
//! mutation reads it whole, edits it in memory, and writes it back whole.

use std::sync::Arc;

use lectio_core::{
  canon::ScriptureCanon,
  dedup::{dedup, migrate},
  favorite::{FavoriteRecord, StoredFavorite},
  kv::KeyValueStore,
};
use tracing::{info, warn};

use crate::{Error, Result};

/// Storage key of the favorites blob.
pub const FAVORITES_KEY: &str = "lectio.favorites";

pub struct LocalFavorites<S> {
  kv:    Arc<S>,
  canon: Arc<ScriptureCanon>,
}

impl<S: KeyValueStore> LocalFavorites<S> {
  pub fn new(kv: Arc<S>, canon: Arc<ScriptureCanon>) -> Self { Self { kv, canon } }

  /// The current collection: migrated, deduplicated, never failing.
  ///
  /// A missing or unreadable blob reads as empty. Nothing is written, so
  /// readers outside the engine never race its writes.
  pub async fn read(&self) -> Vec<FavoriteRecord> {
    dedup(migrate(self.read_stored().await, &self.canon).records)
  }

  /// Like [`LocalFavorites::read`], but if any record lacked a kind the
  /// migrated collection is written back straight away. Only the engine's
  /// mutating paths call this.
  pub async fn load(&self) -> Vec<FavoriteRecord> {
    let stored = self.read_stored().await;
    let migration = migrate(stored, &self.canon);

    if migration.changed() {
      match self.save(&migration.records).await {
        Ok(()) => info!(migrated = migration.migrated, "classified legacy favorites"),
        Err(e) => warn!(error = %e, "could not persist migrated favorites"),
      }
    }

    dedup(migration.records)
  }

  /// Overwrite the whole collection.
  pub async fn save(&self, records: &[FavoriteRecord]) -> Result<()> {
    let blob = serde_json::to_string(records)?;
    self
      .kv
      .set(FAVORITES_KEY, blob)
      .await
      .map_err(Error::storage)
  }

  /// Deduplicate the stored collection in place, returning how many records
  /// were dropped. Nothing is written when there was nothing to drop.
  pub async fn clean_duplicates(&self) -> Result<usize> {
    let migration = migrate(self.read_stored().await, &self.canon);
    let before = migration.records.len();
    let cleaned = dedup(migration.records);
    let removed = before - cleaned.len();

    if removed > 0 || migration.migrated > 0 {
      self.save(&cleaned).await?;
    }
    if removed > 0 {
      info!(removed, "removed duplicate favorites");
    }
    Ok(removed)
  }

  /// Read the raw stored records, skipping any that cannot be understood.
  async fn read_stored(&self) -> Vec<StoredFavorite> {
    let blob = match self.kv.get(FAVORITES_KEY).await {
      Ok(Some(blob)) => blob,
      Ok(None) => return Vec::new(),
      Err(e) => {
        warn!(error = %e, "could not read favorites; treating as empty");
        return Vec::new();
      }
    };

    let values: Vec<serde_json::Value> = match serde_json::from_str(&blob) {
      Ok(values) => values,
      Err(e) => {
        warn!(error = %e, "favorites blob is corrupt; treating as empty");
        return Vec::new();
      }
    };

    values
      .into_iter()
      .filter_map(|value| match serde_json::from_value::<StoredFavorite>(value) {
        Ok(stored) => Some(stored),
        Err(e) => {
          warn!(error = %e, "skipping unreadable favorite");
          None
        }
      })
      .collect()
  }
}
