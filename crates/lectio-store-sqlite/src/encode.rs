//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings.

use chrono::{DateTime, Utc};
use lectio_core::remote::RemoteFavorite;

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list shared by every `user_favorites` SELECT.
pub const FAVORITE_COLUMNS: &str =
  "id, user_id, book_slug, chapter_id, paragraph_index, paragraph_text, created_at";

/// Raw values read directly from a `user_favorites` row.
pub struct RawFavorite {
  pub id:              i64,
  pub user_id:         i64,
  pub book_slug:       String,
  pub chapter_id:      String,
  pub paragraph_index: u32,
  pub paragraph_text:  String,
  pub created_at:      String,
}

impl RawFavorite {
  /// Map a row selected with [`FAVORITE_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:              row.get(0)?,
      user_id:         row.get(1)?,
      book_slug:       row.get(2)?,
      chapter_id:      row.get(3)?,
      paragraph_index: row.get(4)?,
      paragraph_text:  row.get(5)?,
      created_at:      row.get(6)?,
    })
  }

  pub fn into_favorite(self) -> Result<RemoteFavorite> {
    Ok(RemoteFavorite {
      id:              self.id,
      user_id:         self.user_id,
      book_slug:       self.book_slug,
      chapter_id:      self.chapter_id,
      paragraph_index: self.paragraph_index,
      paragraph_text:  self.paragraph_text,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}
