//! The remote favorites shape and its mapping to and from local records.
//!
//! The service keys rows by a server-assigned integer id, names the natural
//! key fields in snake_case, and stores the chapter id as a string. It knows
//! nothing of kinds or groups; those are local enrichments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  canon::ScriptureCanon,
  favorite::{FavoriteRecord, NaturalKey},
};

/// A favorite as stored and listed by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFavorite {
  pub id:              i64,
  pub user_id:         i64,
  pub book_slug:       String,
  pub chapter_id:      String,
  pub paragraph_index: u32,
  pub paragraph_text:  String,
  pub created_at:      DateTime<Utc>,
}

impl RemoteFavorite {
  /// The natural key, if the stored chapter id is a number.
  pub fn key(&self) -> Result<NaturalKey> {
    Ok(NaturalKey::new(
      self.book_slug.clone(),
      parse_chapter_id(&self.chapter_id)?,
      self.paragraph_index,
    ))
  }

  pub fn has_key(&self, key: &NaturalKey) -> bool {
    self.book_slug == key.book_id
      && self.paragraph_index == key.paragraph_number
      && parse_chapter_id(&self.chapter_id).is_ok_and(|c| c == key.chapter_id)
  }
}

/// Body of `POST /favorites`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRemoteFavorite {
  pub book_slug:       String,
  pub chapter_id:      String,
  pub paragraph_index: u32,
  pub paragraph_text:  String,
}

/// Envelope of `GET /favorites`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FavoriteList {
  pub favorites: Vec<RemoteFavorite>,
}

fn parse_chapter_id(raw: &str) -> Result<u32> {
  raw
    .trim()
    .parse()
    .map_err(|_| Error::InvalidChapterId(raw.to_string()))
}

// ─── Mapping ─────────────────────────────────────────────────────────────────

/// Local → remote. Kind and group fields are dropped.
pub fn to_remote(record: &FavoriteRecord) -> NewRemoteFavorite {
  NewRemoteFavorite {
    book_slug:       record.book_id.clone(),
    chapter_id:      record.chapter_id.to_string(),
    paragraph_index: record.paragraph_number,
    paragraph_text:  record.paragraph_text.clone(),
  }
}

/// Remote → local. The kind is recovered from the canon; display titles are
/// unknown remotely and left empty; the timestamp is the server's creation
/// time.
pub fn from_remote(remote: &RemoteFavorite, canon: &ScriptureCanon) -> Result<FavoriteRecord> {
  Ok(FavoriteRecord {
    book_id:          remote.book_slug.clone(),
    chapter_id:       parse_chapter_id(&remote.chapter_id)?,
    paragraph_number: remote.paragraph_index,
    book_title:       String::new(),
    chapter_name:     String::new(),
    paragraph_text:   remote.paragraph_text.clone(),
    timestamp:        remote.created_at.timestamp_millis(),
    kind:             canon.classify(&remote.book_slug),
    group_id:         None,
    group_range:      None,
  })
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;
  use crate::favorite::FavoriteKind;

  fn remote(book: &str, chapter: &str, paragraph: u32) -> RemoteFavorite {
    RemoteFavorite {
      id:              7,
      user_id:         1,
      book_slug:       book.into(),
      chapter_id:      chapter.into(),
      paragraph_index: paragraph,
      paragraph_text:  "No princípio...".into(),
      created_at:      Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
    }
  }

  #[test]
  fn to_remote_field_correspondence() {
    let record = FavoriteRecord {
      book_id:          "caminho".into(),
      chapter_id:       12,
      paragraph_number: 5,
      book_title:       "Caminho".into(),
      chapter_name:     "Oração".into(),
      paragraph_text:   "texto".into(),
      timestamp:        1,
      kind:             FavoriteKind::Book,
      group_id:         Some("g".into()),
      group_range:      Some("5-6".into()),
    };
    let new = to_remote(&record);
    assert_eq!(new, NewRemoteFavorite {
      book_slug:       "caminho".into(),
      chapter_id:      "12".into(),
      paragraph_index: 5,
      paragraph_text:  "texto".into(),
    });
  }

  #[test]
  fn from_remote_field_correspondence() {
    let record = from_remote(&remote("genesis", "1", 1), &ScriptureCanon::default()).unwrap();
    assert_eq!(record.book_id, "genesis");
    assert_eq!(record.chapter_id, 1);
    assert_eq!(record.paragraph_number, 1);
    assert_eq!(record.paragraph_text, "No princípio...");
    assert_eq!(record.timestamp, 1_700_000_000_000);
    assert_eq!(record.kind, FavoriteKind::Scripture);
    assert!(record.book_title.is_empty());
    assert!(record.group_id.is_none());
  }

  #[test]
  fn from_remote_rejects_non_numeric_chapter() {
    let err = from_remote(&remote("caminho", "prologo", 1), &ScriptureCanon::default());
    assert!(matches!(err, Err(Error::InvalidChapterId(_))));
  }

  #[test]
  fn remote_key_matching_parses_chapter() {
    let r = remote("caminho", " 3 ", 9);
    assert!(r.has_key(&NaturalKey::new("caminho", 3, 9)));
    assert!(!r.has_key(&NaturalKey::new("caminho", 3, 8)));
    assert_eq!(r.key().unwrap(), NaturalKey::new("caminho", 3, 9));
  }

  #[test]
  fn list_envelope_parses() {
    let json = r#"{"favorites":[{"id":1,"user_id":2,"book_slug":"sulco","chapter_id":"4",
      "paragraph_index":3,"paragraph_text":"t","created_at":"2024-05-01T10:00:00Z"}]}"#;
    let list: FavoriteList = serde_json::from_str(json).unwrap();
    assert_eq!(list.favorites.len(), 1);
    assert_eq!(list.favorites[0].chapter_id, "4");
  }
}
