//! [`Favorites`] — the read model handed to the presentation layer.
//!
//! Holds the latest [`Snapshot`] of the local collection in a
//! [`tokio::sync::watch`] channel. The snapshot is re-read after every
//! mutating call and, optionally, on a fixed polling interval.

use std::{sync::Arc, time::Duration};

use lectio_core::{
  favorite::{FavoriteRecord, FavoriteSelection, NaturalKey},
  gateway::FavoritesGateway,
  kv::KeyValueStore,
  status::SyncStatus,
  view::{FavoriteEntry, FavoriteFilter, SortOrder, list_view},
};
use tokio::{
  sync::watch,
  task::JoinHandle,
  time::{MissedTickBehavior, interval},
};

use crate::{Result, SyncEngine, SyncOutcome};

/// What the presentation layer renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
  pub favorites: Vec<FavoriteRecord>,
  /// `true` until the first read of the local collection finishes.
  pub loading:   bool,
}

impl Default for Snapshot {
  fn default() -> Self { Self { favorites: Vec::new(), loading: true } }
}

pub struct Favorites<S, G> {
  engine: Arc<SyncEngine<S, G>>,
  tx:     watch::Sender<Snapshot>,
}

impl<S, G> Favorites<S, G>
where
  S: KeyValueStore + 'static,
  G: FavoritesGateway + 'static,
{
  pub fn new(engine: Arc<SyncEngine<S, G>>) -> Self {
    let (tx, _) = watch::channel(Snapshot::default());
    Self { engine, tx }
  }

  pub fn engine(&self) -> &Arc<SyncEngine<S, G>> { &self.engine }

  /// A receiver notified whenever the snapshot changes.
  pub fn subscribe(&self) -> watch::Receiver<Snapshot> { self.tx.subscribe() }

  pub fn snapshot(&self) -> Snapshot { self.tx.borrow().clone() }

  pub fn favorites(&self) -> Vec<FavoriteRecord> { self.tx.borrow().favorites.clone() }

  pub fn is_loading(&self) -> bool { self.tx.borrow().loading }

  /// Membership test against the current snapshot.
  pub fn is_favorite(&self, book_id: &str, chapter_id: u32, paragraph_number: u32) -> bool {
    self
      .tx
      .borrow()
      .favorites
      .iter()
      .any(|f| f.is_at(book_id, chapter_id, paragraph_number))
  }

  /// The current snapshot filtered, ordered, and grouped for display.
  pub fn list(&self, filter: FavoriteFilter, order: SortOrder) -> Vec<FavoriteEntry> {
    list_view(&self.tx.borrow().favorites, filter, order)
  }

  pub async fn sync_status(&self) -> SyncStatus { self.engine.sync_status().await }

  /// Re-read the local collection, notifying subscribers only on change.
  pub async fn refresh(&self) {
    let favorites = self.engine.favorites().await;
    self.tx.send_if_modified(|snapshot| {
      let changed = snapshot.loading || snapshot.favorites != favorites;
      if changed {
        snapshot.favorites = favorites;
        snapshot.loading = false;
      }
      changed
    });
  }

  /// Refresh on a fixed interval until the returned task is aborted.
  pub fn spawn_polling(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
    let this = Arc::clone(self);
    tokio::spawn(async move {
      let mut ticker = interval(every);
      ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
      loop {
        ticker.tick().await;
        this.refresh().await;
      }
    })
  }

  // ── Mutations ───────────────────────────────────────────────────────────

  pub async fn add_favorite(&self, record: FavoriteRecord) -> Result<bool> {
    let added = self.engine.add_favorite(record).await?;
    self.refresh().await;
    Ok(added)
  }

  /// Add every paragraph of a selection as one group. Returns how many were
  /// new.
  pub async fn add_selection(&self, selection: FavoriteSelection, timestamp: i64) -> Result<usize> {
    let added = self
      .engine
      .add_favorites(selection.into_records(timestamp))
      .await?;
    self.refresh().await;
    Ok(added)
  }

  /// Unfavorite the selected paragraphs that are favorites and favorite the
  /// rest. Returns `(added, removed)`.
  pub async fn toggle_selection(
    &self,
    selection: FavoriteSelection,
    timestamp: i64,
  ) -> Result<(usize, usize)> {
    let current = self.engine.favorites().await;
    let (present, absent): (Vec<NaturalKey>, Vec<NaturalKey>) = selection
      .keys()
      .partition(|k| current.iter().any(|f| f.has_key(k)));

    let removed = if present.is_empty() {
      0
    } else {
      self.engine.remove_favorites(&present).await?
    };

    let added = if absent.is_empty() {
      0
    } else {
      let to_add = FavoriteSelection {
        paragraphs: selection
          .paragraphs
          .iter()
          .filter(|(n, _)| absent.iter().any(|k| k.paragraph_number == *n))
          .cloned()
          .collect(),
        ..selection
      };
      self.engine.add_favorites(to_add.into_records(timestamp)).await?
    };

    self.refresh().await;
    Ok((added, removed))
  }

  pub async fn remove_favorite(&self, key: &NaturalKey) -> Result<bool> {
    let removed = self.engine.remove_favorite(key).await?;
    self.refresh().await;
    Ok(removed)
  }

  pub async fn remove_group(&self, group_id: &str) -> Result<usize> {
    let removed = self.engine.remove_group(group_id).await?;
    self.refresh().await;
    Ok(removed)
  }

  pub async fn clear_all(&self) -> Result<()> {
    self.engine.clear_all().await?;
    self.refresh().await;
    Ok(())
  }

  pub async fn sync(&self) -> Result<SyncOutcome> {
    let outcome = self.engine.sync().await?;
    self.refresh().await;
    Ok(outcome)
  }

  pub async fn clean_duplicates(&self) -> Result<usize> {
    let removed = self.engine.clean_duplicates().await?;
    self.refresh().await;
    Ok(removed)
  }
}
