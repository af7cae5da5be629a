//! [`SqliteFavorites`] — the SQLite implementation of [`FavoritesRepository`].

use std::path::Path;

use chrono::Utc;
use lectio_core::{
  remote::{NewRemoteFavorite, RemoteFavorite},
  repository::FavoritesRepository,
};
use rusqlite::OptionalExtension as _;

use crate::{
  Error, Result,
  encode::{FAVORITE_COLUMNS, RawFavorite, encode_dt},
  schema::FAVORITES_SCHEMA,
};

/// Per-user remote favorites backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteFavorites {
  conn: tokio_rusqlite::Connection,
}

impl SqliteFavorites {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(FAVORITES_SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

impl FavoritesRepository for SqliteFavorites {
  type Error = Error;

  async fn list(&self, user_id: i64) -> Result<Vec<RemoteFavorite>> {
    let raws: Vec<RawFavorite> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {FAVORITE_COLUMNS} FROM user_favorites
           WHERE user_id = ?1
           ORDER BY created_at DESC, id DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![user_id], RawFavorite::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFavorite::into_favorite).collect()
  }

  async fn insert(
    &self,
    user_id: i64,
    favorite: NewRemoteFavorite,
  ) -> Result<Option<RemoteFavorite>> {
    let created_at = encode_dt(Utc::now());

    let inserted: Option<(i64, Option<RawFavorite>)> = self
      .conn
      .call(move |conn| {
        // A natural-key conflict leaves the existing row untouched.
        let changed = conn.execute(
          "INSERT OR IGNORE INTO user_favorites
             (user_id, book_slug, chapter_id, paragraph_index, paragraph_text, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            user_id,
            favorite.book_slug,
            favorite.chapter_id,
            favorite.paragraph_index,
            favorite.paragraph_text,
            created_at,
          ],
        )?;
        if changed == 0 {
          return Ok(None);
        }

        let id = conn.last_insert_rowid();
        let raw = conn
          .query_row(
            &format!("SELECT {FAVORITE_COLUMNS} FROM user_favorites WHERE id = ?1"),
            rusqlite::params![id],
            RawFavorite::from_row,
          )
          .optional()?;
        Ok(Some((id, raw)))
      })
      .await?;

    match inserted {
      None => Ok(None),
      Some((_, Some(raw))) => raw.into_favorite().map(Some),
      Some((id, None)) => Err(Error::MissingAfterInsert(id)),
    }
  }

  async fn delete(&self, user_id: i64, id: i64) -> Result<bool> {
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM user_favorites WHERE id = ?1 AND user_id = ?2",
          rusqlite::params![id, user_id],
        )?)
      })
      .await?;

    Ok(removed > 0)
  }

  async fn delete_all(&self, user_id: i64) -> Result<u64> {
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM user_favorites WHERE user_id = ?1",
          rusqlite::params![user_id],
        )?)
      })
      .await?;

    Ok(removed as u64)
  }
}
