//! Favorite records — the bookmarks a reader keeps on individual paragraphs.
//!
//! A record carries a denormalised display payload captured when it was
//! created. Only the natural key identifies it; the payload is never kept in
//! sync with the source text.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

// ─── Kind ────────────────────────────────────────────────────────────────────

/// The content family a favorite belongs to.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum FavoriteKind {
  /// A verse of a biblical book.
  #[serde(alias = "biblia")]
  Scripture,
  /// A paragraph of any other work.
  #[serde(alias = "livro")]
  Book,
}

// ─── Natural key ─────────────────────────────────────────────────────────────

/// The `(book_id, chapter_id, paragraph_number)` triple that identifies a
/// favorite regardless of where it is stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NaturalKey {
  pub book_id:          String,
  pub chapter_id:       u32,
  pub paragraph_number: u32,
}

impl NaturalKey {
  pub fn new(
    book_id: impl Into<String>,
    chapter_id: u32,
    paragraph_number: u32,
  ) -> Self {
    Self { book_id: book_id.into(), chapter_id, paragraph_number }
  }
}

impl fmt::Display for NaturalKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}-{}-{}", self.book_id, self.chapter_id, self.paragraph_number)
  }
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// A favorited paragraph as held in the local collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRecord {
  /// Book or biblical-book slug.
  pub book_id:          String,
  pub chapter_id:       u32,
  /// Verse or paragraph number within the chapter.
  pub paragraph_number: u32,
  pub book_title:       String,
  pub chapter_name:     String,
  pub paragraph_text:   String,
  /// Creation time in epoch milliseconds.
  pub timestamp:        i64,
  pub kind:             FavoriteKind,
  /// Shared by every record created from one multi-paragraph selection.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub group_id:         Option<String>,
  /// Human-readable span of the group, e.g. `"3-7"`.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub group_range:      Option<String>,
}

impl FavoriteRecord {
  pub fn key(&self) -> NaturalKey {
    NaturalKey::new(self.book_id.clone(), self.chapter_id, self.paragraph_number)
  }

  /// Compare against a natural key without allocating.
  pub fn has_key(&self, key: &NaturalKey) -> bool {
    self.is_at(&key.book_id, key.chapter_id, key.paragraph_number)
  }

  pub fn is_at(&self, book_id: &str, chapter_id: u32, paragraph_number: u32) -> bool {
    self.book_id == book_id
      && self.chapter_id == chapter_id
      && self.paragraph_number == paragraph_number
  }
}

// ─── Stored shape ────────────────────────────────────────────────────────────

/// A record exactly as found in the persisted blob.
///
/// Older app versions wrote `bookSlug`/`type`, omitted `type` altogether, or
/// stored cloud-derived chapter ids as strings. Migration turns this into a
/// [`FavoriteRecord`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFavorite {
  #[serde(alias = "bookSlug")]
  pub book_id:          String,
  #[serde(deserialize_with = "number_or_numeric_string")]
  pub chapter_id:       u32,
  pub paragraph_number: u32,
  #[serde(default)]
  pub book_title:       String,
  #[serde(default)]
  pub chapter_name:     String,
  #[serde(default)]
  pub paragraph_text:   String,
  #[serde(default)]
  pub timestamp:        i64,
  #[serde(default, alias = "type")]
  pub kind:             Option<FavoriteKind>,
  #[serde(default)]
  pub group_id:         Option<String>,
  #[serde(default)]
  pub group_range:      Option<String>,
}

impl StoredFavorite {
  /// Complete the record with the given kind, keeping a stored one if present.
  pub fn into_record(self, fallback_kind: FavoriteKind) -> FavoriteRecord {
    FavoriteRecord {
      book_id:          self.book_id,
      chapter_id:       self.chapter_id,
      paragraph_number: self.paragraph_number,
      book_title:       self.book_title,
      chapter_name:     self.chapter_name,
      paragraph_text:   self.paragraph_text,
      timestamp:        self.timestamp,
      kind:             self.kind.unwrap_or(fallback_kind),
      group_id:         self.group_id,
      group_range:      self.group_range,
    }
  }
}

fn number_or_numeric_string<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
  D: Deserializer<'de>,
{
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Raw {
    Number(u32),
    Text(String),
  }

  match Raw::deserialize(deserializer)? {
    Raw::Number(n) => Ok(n),
    Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
  }
}

// ─── Selection ───────────────────────────────────────────────────────────────

/// One user gesture selecting one or more paragraphs of a chapter.
#[derive(Debug, Clone)]
pub struct FavoriteSelection {
  pub book_id:      String,
  pub book_title:   String,
  pub chapter_id:   u32,
  pub chapter_name: String,
  pub kind:         FavoriteKind,
  /// `(paragraph_number, paragraph_text)` pairs.
  pub paragraphs:   Vec<(u32, String)>,
}

impl FavoriteSelection {
  /// The natural keys covered by this selection.
  pub fn keys(&self) -> impl Iterator<Item = NaturalKey> + '_ {
    self
      .paragraphs
      .iter()
      .map(|(n, _)| NaturalKey::new(self.book_id.clone(), self.chapter_id, *n))
  }

  /// Build one record per paragraph, all stamped with `timestamp`.
  ///
  /// Two or more paragraphs share a fresh group id and a `"min-max"` range.
  pub fn into_records(self, timestamp: i64) -> Vec<FavoriteRecord> {
    let group = (self.paragraphs.len() > 1).then(|| {
      let min = self.paragraphs.iter().map(|(n, _)| *n).min().unwrap_or_default();
      let max = self.paragraphs.iter().map(|(n, _)| *n).max().unwrap_or_default();
      (Uuid::new_v4().to_string(), format!("{min}-{max}"))
    });

    self
      .paragraphs
      .into_iter()
      .map(|(paragraph_number, paragraph_text)| FavoriteRecord {
        book_id: self.book_id.clone(),
        chapter_id: self.chapter_id,
        paragraph_number,
        book_title: self.book_title.clone(),
        chapter_name: self.chapter_name.clone(),
        paragraph_text,
        timestamp,
        kind: self.kind,
        group_id: group.as_ref().map(|(id, _)| id.clone()),
        group_range: group.as_ref().map(|(_, range)| range.clone()),
      })
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use super::*;

  #[test]
  fn canonical_shape_uses_camel_case() {
    let record = FavoriteRecord {
      book_id:          "caminho".into(),
      chapter_id:       1,
      paragraph_number: 5,
      book_title:       "Caminho".into(),
      chapter_name:     "Caráter".into(),
      paragraph_text:   "Não queiras ser como aquele galo...".into(),
      timestamp:        1_700_000_000_000,
      kind:             FavoriteKind::Book,
      group_id:         None,
      group_range:      None,
    };
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["bookId"], "caminho");
    assert_eq!(json["paragraphNumber"], 5);
    assert_eq!(json["kind"], "book");
    assert!(json.get("groupId").is_none());
  }

  #[test]
  fn legacy_shape_is_accepted() {
    let raw = r#"{
      "bookSlug": "genesis",
      "bookTitle": "Gênesis",
      "chapterId": "3",
      "chapterName": "Capítulo 3",
      "paragraphNumber": 15,
      "paragraphText": "Porei inimizade...",
      "timestamp": 42,
      "type": "biblia"
    }"#;
    let stored: StoredFavorite = serde_json::from_str(raw).unwrap();
    assert_eq!(stored.book_id, "genesis");
    assert_eq!(stored.chapter_id, 3);
    assert_eq!(stored.kind, Some(FavoriteKind::Scripture));
  }

  #[test]
  fn missing_kind_falls_back() {
    let raw = r#"{"bookId":"caminho","chapterId":1,"paragraphNumber":2}"#;
    let stored: StoredFavorite = serde_json::from_str(raw).unwrap();
    assert!(stored.kind.is_none());
    let record = stored.into_record(FavoriteKind::Book);
    assert_eq!(record.kind, FavoriteKind::Book);
    assert_eq!(record.paragraph_text, "");
  }

  #[test]
  fn kind_parses_case_insensitively() {
    assert_eq!(FavoriteKind::from_str("Scripture").unwrap(), FavoriteKind::Scripture);
    assert_eq!(FavoriteKind::Book.to_string(), "book");
  }

  #[test]
  fn multi_paragraph_selection_shares_a_group() {
    let selection = FavoriteSelection {
      book_id:      "sulco".into(),
      book_title:   "Sulco".into(),
      chapter_id:   2,
      chapter_name: "Audácia".into(),
      kind:         FavoriteKind::Book,
      paragraphs:   vec![(7, "c".into()), (3, "a".into()), (5, "b".into())],
    };
    let records = selection.into_records(99);
    assert_eq!(records.len(), 3);
    let group = records[0].group_id.clone().unwrap();
    assert!(records.iter().all(|r| r.group_id.as_deref() == Some(group.as_str())));
    assert!(records.iter().all(|r| r.group_range.as_deref() == Some("3-7")));
    assert!(records.iter().all(|r| r.timestamp == 99));
  }

  #[test]
  fn single_paragraph_selection_has_no_group() {
    let selection = FavoriteSelection {
      book_id:      "sulco".into(),
      book_title:   "Sulco".into(),
      chapter_id:   2,
      chapter_name: "Audácia".into(),
      kind:         FavoriteKind::Book,
      paragraphs:   vec![(4, "only".into())],
    };
    let records = selection.into_records(1);
    assert_eq!(records.len(), 1);
    assert!(records[0].group_id.is_none());
    assert!(records[0].group_range.is_none());
  }
}
