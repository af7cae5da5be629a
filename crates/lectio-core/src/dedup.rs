//! Migration, deduplication, and local-first merging of favorite collections.
//!
//! Every function here upholds the natural-key invariant: its output never
//! holds two records with the same `(book_id, chapter_id, paragraph_number)`.

use std::collections::{HashMap, HashSet};

use crate::{
  canon::ScriptureCanon,
  favorite::{FavoriteRecord, NaturalKey, StoredFavorite},
};

// ─── Migration ───────────────────────────────────────────────────────────────

/// The outcome of [`migrate`].
#[derive(Debug, Clone)]
pub struct Migration {
  pub records:  Vec<FavoriteRecord>,
  /// How many records had no kind and were classified.
  pub migrated: usize,
}

impl Migration {
  pub fn changed(&self) -> bool { self.migrated > 0 }
}

/// Give every stored record a kind, classifying the ones that lack it.
///
/// Records that already carry a kind pass through untouched, so running this
/// over an already-migrated collection reports zero migrations.
pub fn migrate(stored: Vec<StoredFavorite>, canon: &ScriptureCanon) -> Migration {
  let mut migrated = 0;
  let records = stored
    .into_iter()
    .map(|s| {
      if s.kind.is_none() {
        migrated += 1;
      }
      let fallback = canon.classify(&s.book_id);
      s.into_record(fallback)
    })
    .collect();
  Migration { records, migrated }
}

// ─── Dedup ───────────────────────────────────────────────────────────────────

/// Collapse records sharing a natural key, keeping the greatest `timestamp`.
///
/// On equal timestamps the first record encountered is kept. Output follows
/// the order in which each key was first seen.
pub fn dedup(records: impl IntoIterator<Item = FavoriteRecord>) -> Vec<FavoriteRecord> {
  let mut slots: HashMap<NaturalKey, usize> = HashMap::new();
  let mut out: Vec<FavoriteRecord> = Vec::new();

  for record in records {
    match slots.get(&record.key()) {
      Some(&i) => {
        if record.timestamp > out[i].timestamp {
          out[i] = record;
        }
      }
      None => {
        slots.insert(record.key(), out.len());
        out.push(record);
      }
    }
  }

  out
}

// ─── Merge ───────────────────────────────────────────────────────────────────

/// Union of `local` and `remote` where a local record always wins a key
/// collision, whatever the timestamps say.
///
/// Local records come first, followed by remote-only records.
pub fn merge_local_first(
  local: Vec<FavoriteRecord>,
  remote: Vec<FavoriteRecord>,
) -> Vec<FavoriteRecord> {
  let mut merged = dedup(local);
  let mut seen: HashSet<NaturalKey> = merged.iter().map(FavoriteRecord::key).collect();

  for record in dedup(remote) {
    if seen.insert(record.key()) {
      merged.push(record);
    }
  }

  merged
}

#[cfg(test)]
mod tests {
  use std::collections::HashSet;

  use super::*;
  use crate::favorite::FavoriteKind;

  fn rec(book: &str, chapter: u32, paragraph: u32, ts: i64, text: &str) -> FavoriteRecord {
    FavoriteRecord {
      book_id:          book.into(),
      chapter_id:       chapter,
      paragraph_number: paragraph,
      book_title:       book.to_uppercase(),
      chapter_name:     format!("Capítulo {chapter}"),
      paragraph_text:   text.into(),
      timestamp:        ts,
      kind:             FavoriteKind::Book,
      group_id:         None,
      group_range:      None,
    }
  }

  fn keys(records: &[FavoriteRecord]) -> HashSet<NaturalKey> {
    records.iter().map(FavoriteRecord::key).collect()
  }

  fn stored(json: &str) -> Vec<StoredFavorite> { serde_json::from_str(json).unwrap() }

  // ── dedup ───────────────────────────────────────────────────────────────

  #[test]
  fn dedup_keeps_most_recent() {
    let input = vec![
      rec("caminho", 1, 5, 10, "a"),
      rec("caminho", 1, 5, 30, "b"),
      rec("caminho", 1, 5, 20, "c"),
    ];
    let out = dedup(input);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].timestamp, 30);
    assert_eq!(out[0].paragraph_text, "b");
  }

  #[test]
  fn dedup_equal_timestamps_keeps_first() {
    let out = dedup(vec![rec("caminho", 1, 5, 7, "first"), rec("caminho", 1, 5, 7, "second")]);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].paragraph_text, "first");
  }

  #[test]
  fn dedup_is_idempotent() {
    let input = vec![
      rec("sulco", 2, 1, 5, "x"),
      rec("caminho", 1, 5, 10, "a"),
      rec("sulco", 2, 1, 9, "y"),
      rec("forja", 3, 3, 1, "z"),
      rec("caminho", 1, 5, 2, "b"),
    ];
    let once = dedup(input);
    let twice = dedup(once.clone());
    assert_eq!(once, twice);
    assert_eq!(once.len(), 3);
  }

  #[test]
  fn dedup_preserves_first_seen_order() {
    let out = dedup(vec![
      rec("b", 1, 1, 1, ""),
      rec("a", 1, 1, 1, ""),
      rec("b", 1, 1, 5, ""),
    ]);
    assert_eq!(out[0].book_id, "b");
    assert_eq!(out[1].book_id, "a");
  }

  // ── migrate ─────────────────────────────────────────────────────────────

  #[test]
  fn migrate_classifies_missing_kinds() {
    let input = stored(
      r#"[
        {"bookSlug":"salmos","chapterId":23,"paragraphNumber":1,"timestamp":1},
        {"bookSlug":"caminho","chapterId":1,"paragraphNumber":5,"timestamp":2},
        {"bookId":"mateus","chapterId":5,"paragraphNumber":3,"timestamp":3,"kind":"book"}
      ]"#,
    );
    let m = migrate(input, &ScriptureCanon::default());
    assert_eq!(m.migrated, 2);
    assert_eq!(m.records[0].kind, FavoriteKind::Scripture);
    assert_eq!(m.records[1].kind, FavoriteKind::Book);
    // An explicit kind is never recomputed.
    assert_eq!(m.records[2].kind, FavoriteKind::Book);
  }

  #[test]
  fn migrate_is_idempotent() {
    let input = stored(
      r#"[
        {"bookSlug":"genesis","chapterId":1,"paragraphNumber":1,"timestamp":1},
        {"bookSlug":"forja","chapterId":4,"paragraphNumber":9,"timestamp":2}
      ]"#,
    );
    let canon = ScriptureCanon::default();
    let first = migrate(input, &canon);
    assert!(first.changed());

    let blob = serde_json::to_string(&first.records).unwrap();
    let second = migrate(stored(&blob), &canon);
    assert!(!second.changed());
    assert_eq!(first.records, second.records);
  }

  // ── merge ───────────────────────────────────────────────────────────────

  #[test]
  fn merge_distinct_keys_is_commutative() {
    let a = rec("caminho", 1, 1, 1, "A");
    let b = rec("caminho", 1, 2, 2, "B");
    let c = rec("sulco", 1, 1, 3, "C");
    let d = rec("forja", 1, 1, 4, "D");

    let ab_cd = merge_local_first(vec![a.clone(), b.clone()], vec![c.clone(), d.clone()]);
    let cd_ab = merge_local_first(vec![c, d], vec![a, b]);

    assert_eq!(ab_cd.len(), 4);
    assert_eq!(keys(&ab_cd), keys(&cd_ab));
  }

  #[test]
  fn merge_local_wins_collision() {
    let mine = rec("caminho", 1, 5, 5, "mine");
    let theirs = rec("caminho", 1, 5, 5, "theirs");
    let merged = merge_local_first(vec![mine], vec![theirs]);
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].paragraph_text, "mine");
  }

  #[test]
  fn merge_local_wins_even_when_remote_is_newer() {
    let merged = merge_local_first(
      vec![rec("caminho", 1, 5, 1, "mine")],
      vec![rec("caminho", 1, 5, 999, "theirs")],
    );
    assert_eq!(merged[0].paragraph_text, "mine");
  }

  #[test]
  fn merge_collapses_remote_duplicates() {
    let merged = merge_local_first(
      vec![],
      vec![rec("caminho", 1, 5, 1, "x"), rec("caminho", 1, 5, 2, "y")],
    );
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].paragraph_text, "y");
  }
}
