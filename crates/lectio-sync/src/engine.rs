//! [`SyncEngine`] — reconciliation of the local collection with the remote
//! service.
//!
//! Writes land locally first; the remote side is updated best-effort. A full
//! [`SyncEngine::sync`] unions both sides by natural key, with local records
//! winning every collision, and pushes local-only records upstream.

use std::{
  collections::HashSet,
  sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
  },
};

use chrono::Utc;
use lectio_core::{
  canon::ScriptureCanon,
  dedup::merge_local_first,
  favorite::{FavoriteRecord, NaturalKey},
  gateway::FavoritesGateway,
  kv::KeyValueStore,
  remote::{from_remote, to_remote},
  status::SyncStatus,
};
use tracing::{debug, error, info, warn};

use crate::{LocalFavorites, Result, StatusStore};

// ─── Outcomes ────────────────────────────────────────────────────────────────

/// Counts from one completed full sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
  /// Size of the merged local collection.
  pub merged:        usize,
  /// Remote-only records brought into the local collection.
  pub pulled:        usize,
  /// Local-only records pushed to the remote side.
  pub pushed:        usize,
  /// Local-only records whose push failed. They are retried by the next
  /// sync; the status does not flag them as pending.
  pub push_failures: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
  Completed(SyncReport),
  /// Another sync was running; this call did nothing.
  AlreadyRunning,
  /// The remote listing failed; local state was left untouched.
  RemoteUnavailable { reason: String },
}

enum Reconciled {
  Done(SyncReport),
  RemoteUnavailable(String),
}

// ─── In-progress guard ───────────────────────────────────────────────────────

/// Holds the engine's in-progress flag for the lifetime of one sync.
struct SyncGuard<'a>(&'a AtomicBool);

impl<'a> SyncGuard<'a> {
  fn acquire(flag: &'a AtomicBool) -> Option<Self> {
    flag
      .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
      .ok()
      .map(|_| Self(flag))
  }
}

impl Drop for SyncGuard<'_> {
  fn drop(&mut self) { self.0.store(false, Ordering::Release); }
}

// ─── Engine ──────────────────────────────────────────────────────────────────

pub struct SyncEngine<S, G> {
  local:   LocalFavorites<S>,
  status:  StatusStore<S>,
  gateway: Arc<G>,
  canon:   Arc<ScriptureCanon>,
  syncing: AtomicBool,
}

impl<S, G> SyncEngine<S, G>
where
  S: KeyValueStore,
  G: FavoritesGateway,
{
  /// An engine classifying books with the built-in scripture canon.
  pub fn new(kv: Arc<S>, gateway: Arc<G>) -> Self {
    Self::with_canon(kv, gateway, ScriptureCanon::default())
  }

  pub fn with_canon(kv: Arc<S>, gateway: Arc<G>, canon: ScriptureCanon) -> Self {
    let canon = Arc::new(canon);
    Self {
      local: LocalFavorites::new(kv.clone(), canon.clone()),
      status: StatusStore::new(kv),
      gateway,
      canon,
      syncing: AtomicBool::new(false),
    }
  }

  // ── Reads ───────────────────────────────────────────────────────────────

  /// The local collection as it stands. Never writes.
  pub async fn favorites(&self) -> Vec<FavoriteRecord> { self.local.read().await }

  pub async fn sync_status(&self) -> SyncStatus { self.status.get().await }

  /// The canon used to classify pulled and migrated records.
  pub fn canon(&self) -> &ScriptureCanon { &self.canon }

  pub fn is_syncing(&self) -> bool { self.syncing.load(Ordering::Acquire) }

  pub async fn clean_duplicates(&self) -> Result<usize> { self.local.clean_duplicates().await }

  // ── Mutations ───────────────────────────────────────────────────────────

  /// Add one favorite. Returns `false` if its natural key was already present.
  pub async fn add_favorite(&self, record: FavoriteRecord) -> Result<bool> {
    Ok(self.add_favorites(vec![record]).await? == 1)
  }

  /// Add several favorites in one local write, skipping natural keys already
  /// present. Returns how many were added.
  pub async fn add_favorites(&self, records: Vec<FavoriteRecord>) -> Result<usize> {
    let mut favorites = self.local.load().await;
    let mut keys: HashSet<NaturalKey> = favorites.iter().map(FavoriteRecord::key).collect();

    let mut added = Vec::new();
    for record in records {
      if keys.insert(record.key()) {
        added.push(record);
      } else {
        debug!(key = %record.key(), "favorite already present; skipping");
      }
    }
    if added.is_empty() {
      return Ok(0);
    }

    favorites.extend(added.iter().cloned());
    self.local.save(&favorites).await?;

    let mut confirmed = true;
    for record in &added {
      if let Err(e) = self.gateway.create(&to_remote(record)).await {
        warn!(key = %record.key(), error = %e, "favorite saved locally; remote push deferred");
        confirmed = false;
      }
    }
    self.status.update(|s| s.pending_sync = !confirmed).await;

    Ok(added.len())
  }

  /// Remove one favorite. Returns `false` if it was not present locally.
  pub async fn remove_favorite(&self, key: &NaturalKey) -> Result<bool> {
    Ok(self.remove_favorites(std::slice::from_ref(key)).await? == 1)
  }

  /// Remove every member of a multi-paragraph group.
  pub async fn remove_group(&self, group_id: &str) -> Result<usize> {
    let keys: Vec<NaturalKey> = self
      .local
      .load()
      .await
      .iter()
      .filter(|f| f.group_id.as_deref() == Some(group_id))
      .map(FavoriteRecord::key)
      .collect();
    self.remove_favorites(&keys).await
  }

  /// Remove favorites by natural key in one local write, then delete their
  /// remote counterparts. Returns how many were removed locally.
  pub async fn remove_favorites(&self, keys: &[NaturalKey]) -> Result<usize> {
    let favorites = self.local.load().await;
    let before = favorites.len();
    let kept: Vec<FavoriteRecord> = favorites
      .into_iter()
      .filter(|f| !keys.iter().any(|k| f.has_key(k)))
      .collect();
    let removed = before - kept.len();
    self.local.save(&kept).await?;

    if !keys.is_empty() && !self.delete_remote(keys).await {
      self.status.update(|s| s.pending_sync = true).await;
    }

    Ok(removed)
  }

  /// Empty the local collection, then ask the remote side to do the same.
  pub async fn clear_all(&self) -> Result<()> {
    self.local.save(&[]).await?;

    if let Err(e) = self.gateway.delete_all().await {
      warn!(error = %e, "favorites cleared locally; remote clear failed");
      self.status.update(|s| s.pending_sync = true).await;
    }
    Ok(())
  }

  /// Delete the remote records matching `keys`. Keys the remote side does not
  /// know are skipped. Returns `false` if any remote call failed.
  async fn delete_remote(&self, keys: &[NaturalKey]) -> bool {
    let remote = match self.gateway.list().await {
      Ok(remote) => remote,
      Err(e) => {
        warn!(error = %e, "could not list remote favorites for removal");
        return false;
      }
    };

    let mut ok = true;
    for key in keys {
      let Some(found) = remote.iter().find(|r| r.has_key(key)) else {
        warn!(%key, "favorite not found remotely; nothing to delete");
        continue;
      };
      match self.gateway.delete_by_id(found.id).await {
        Ok(()) => debug!(%key, id = found.id, "removed remote favorite"),
        Err(e) => {
          warn!(%key, id = found.id, error = %e, "could not delete remote favorite");
          ok = false;
        }
      }
    }
    ok
  }

  // ── Full sync ───────────────────────────────────────────────────────────

  /// Reconcile the local collection with the remote one.
  ///
  /// At most one sync runs at a time; a concurrent call returns
  /// [`SyncOutcome::AlreadyRunning`] immediately. Remote failures are
  /// recorded in the status and reported as outcomes; a local storage
  /// failure is recorded and then returned as an error.
  pub async fn sync(&self) -> Result<SyncOutcome> {
    let Some(_guard) = SyncGuard::acquire(&self.syncing) else {
      debug!("sync already in progress");
      return Ok(SyncOutcome::AlreadyRunning);
    };

    self
      .status
      .update(|s| {
        s.is_syncing = true;
        s.error = None;
      })
      .await;

    match self.reconcile().await {
      Ok(Reconciled::Done(report)) => {
        info!(
          merged = report.merged,
          pulled = report.pulled,
          pushed = report.pushed,
          push_failures = report.push_failures,
          "favorites sync completed"
        );
        self
          .status
          .update(|s| {
            s.is_syncing = false;
            s.last_sync_at = Some(Utc::now());
            s.pending_sync = false;
            s.error = None;
          })
          .await;
        Ok(SyncOutcome::Completed(report))
      }
      Ok(Reconciled::RemoteUnavailable(reason)) => {
        let recorded = reason.clone();
        self
          .status
          .update(|s| {
            s.is_syncing = false;
            s.pending_sync = true;
            s.error = Some(recorded);
          })
          .await;
        Ok(SyncOutcome::RemoteUnavailable { reason })
      }
      Err(e) => {
        error!(error = %e, "favorites sync failed");
        let message = e.to_string();
        self
          .status
          .update(|s| {
            s.is_syncing = false;
            s.pending_sync = true;
            s.error = Some(message);
          })
          .await;
        Err(e)
      }
    }
  }

  async fn reconcile(&self) -> Result<Reconciled> {
    let (local, remote) = tokio::join!(self.local.load(), self.gateway.list());
    let remote = match remote {
      Ok(remote) => remote,
      Err(e) => {
        warn!(error = %e, "remote favorites unavailable; sync deferred");
        return Ok(Reconciled::RemoteUnavailable(e.to_string()));
      }
    };

    let translated: Vec<FavoriteRecord> = remote
      .iter()
      .filter_map(|r| match from_remote(r, &self.canon) {
        Ok(record) => Some(record),
        Err(e) => {
          warn!(id = r.id, error = %e, "skipping unreadable remote favorite");
          None
        }
      })
      .collect();
    let remote_keys: HashSet<NaturalKey> = translated.iter().map(FavoriteRecord::key).collect();

    let mut report = SyncReport::default();
    for record in local.iter().filter(|r| !remote_keys.contains(&r.key())) {
      match self.gateway.create(&to_remote(record)).await {
        Ok(()) => report.pushed += 1,
        Err(e) => {
          warn!(key = %record.key(), error = %e, "could not push favorite");
          report.push_failures += 1;
        }
      }
    }

    let local_len = local.len();
    let merged = merge_local_first(local, translated);
    self.local.save(&merged).await?;

    report.merged = merged.len();
    report.pulled = merged.len() - local_len;
    Ok(Reconciled::Done(report))
  }
}
