//! Read-side shaping of a favorites snapshot: filtering, ordering, and
//! folding multi-paragraph groups into single entries.

use std::collections::HashMap;

use crate::favorite::{FavoriteKind, FavoriteRecord};

/// Which content families to show.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum FavoriteFilter {
  #[default]
  All,
  Scripture,
  Book,
}

impl FavoriteFilter {
  pub fn admits(self, record: &FavoriteRecord) -> bool {
    match self {
      Self::All => true,
      Self::Scripture => record.kind == FavoriteKind::Scripture,
      Self::Book => record.kind == FavoriteKind::Book,
    }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SortOrder {
  /// Newest first.
  #[default]
  Recent,
  /// Oldest first.
  Oldest,
  /// Alphabetical by book title.
  Book,
  /// By book title, then chapter and paragraph within a book.
  Chapter,
}

/// One line of a favorites listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FavoriteEntry {
  Single(FavoriteRecord),
  Group {
    group_id: String,
    range:    Option<String>,
    items:    Vec<FavoriteRecord>,
  },
}

impl FavoriteEntry {
  /// The record representing this entry (a group's first member).
  pub fn head(&self) -> &FavoriteRecord {
    match self {
      Self::Single(r) => r,
      // Groups are only built with at least two items.
      Self::Group { items, .. } => &items[0],
    }
  }

  /// Number of favorites behind this entry.
  pub fn count(&self) -> usize {
    match self {
      Self::Single(_) => 1,
      Self::Group { items, .. } => items.len(),
    }
  }
}

pub fn sort(records: &mut [FavoriteRecord], order: SortOrder) {
  match order {
    SortOrder::Recent => records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp)),
    SortOrder::Oldest => records.sort_by(|a, b| a.timestamp.cmp(&b.timestamp)),
    SortOrder::Book => records.sort_by(|a, b| a.book_title.cmp(&b.book_title)),
    SortOrder::Chapter => records.sort_by(|a, b| {
      (&a.book_title, &a.book_id, a.chapter_id, a.paragraph_number).cmp(&(
        &b.book_title,
        &b.book_id,
        b.chapter_id,
        b.paragraph_number,
      ))
    }),
  }
}

/// Fold records sharing a `group_id` into one entry placed where the group's
/// first member appears. A group id held by a single record stays single.
pub fn group_entries(records: Vec<FavoriteRecord>) -> Vec<FavoriteEntry> {
  let mut members: HashMap<String, Vec<FavoriteRecord>> = HashMap::new();
  for record in &records {
    if let Some(group_id) = &record.group_id {
      members.entry(group_id.clone()).or_default().push(record.clone());
    }
  }

  let mut entries = Vec::with_capacity(records.len());
  for record in records {
    let Some(group_id) = &record.group_id else {
      entries.push(FavoriteEntry::Single(record));
      continue;
    };
    // A group is emitted once, at its first member; later members find it gone.
    match members.get(group_id).map(Vec::len) {
      Some(n) if n > 1 => {
        if let Some(items) = members.remove(group_id) {
          entries.push(FavoriteEntry::Group {
            group_id: group_id.clone(),
            range:    record.group_range.clone(),
            items,
          });
        }
      }
      Some(_) => entries.push(FavoriteEntry::Single(record)),
      None => {}
    }
  }

  entries
}

/// Filter, order, and group a snapshot for display.
pub fn list_view(
  records: &[FavoriteRecord],
  filter: FavoriteFilter,
  order: SortOrder,
) -> Vec<FavoriteEntry> {
  let mut selected: Vec<FavoriteRecord> =
    records.iter().filter(|r| filter.admits(r)).cloned().collect();
  sort(&mut selected, order);
  group_entries(selected)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn rec(book: &str, title: &str, chapter: u32, paragraph: u32, ts: i64) -> FavoriteRecord {
    FavoriteRecord {
      book_id:          book.into(),
      chapter_id:       chapter,
      paragraph_number: paragraph,
      book_title:       title.into(),
      chapter_name:     String::new(),
      paragraph_text:   String::new(),
      timestamp:        ts,
      kind:             if book == "salmos" { FavoriteKind::Scripture } else { FavoriteKind::Book },
      group_id:         None,
      group_range:      None,
    }
  }

  fn grouped(mut r: FavoriteRecord, id: &str) -> FavoriteRecord {
    r.group_id = Some(id.into());
    r.group_range = Some("1-2".into());
    r
  }

  #[test]
  fn filter_by_kind() {
    let records = vec![rec("salmos", "Salmos", 23, 1, 1), rec("caminho", "Caminho", 1, 1, 2)];
    let view = list_view(&records, FavoriteFilter::Scripture, SortOrder::Recent);
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].head().book_id, "salmos");
  }

  #[test]
  fn recent_and_oldest_orders() {
    let records = vec![rec("a", "A", 1, 1, 2), rec("b", "B", 1, 1, 3), rec("c", "C", 1, 1, 1)];
    let recent = list_view(&records, FavoriteFilter::All, SortOrder::Recent);
    let ts: Vec<i64> = recent.iter().map(|e| e.head().timestamp).collect();
    assert_eq!(ts, vec![3, 2, 1]);
    let oldest = list_view(&records, FavoriteFilter::All, SortOrder::Oldest);
    let ts: Vec<i64> = oldest.iter().map(|e| e.head().timestamp).collect();
    assert_eq!(ts, vec![1, 2, 3]);
  }

  #[test]
  fn chapter_order_within_book() {
    let records = vec![
      rec("sulco", "Sulco", 3, 1, 1),
      rec("caminho", "Caminho", 2, 1, 2),
      rec("sulco", "Sulco", 1, 4, 3),
    ];
    let view = list_view(&records, FavoriteFilter::All, SortOrder::Chapter);
    let order: Vec<(String, u32)> =
      view.iter().map(|e| (e.head().book_id.clone(), e.head().chapter_id)).collect();
    assert_eq!(order, vec![
      ("caminho".to_string(), 2),
      ("sulco".to_string(), 1),
      ("sulco".to_string(), 3),
    ]);
  }

  #[test]
  fn groups_fold_at_first_member() {
    let records = vec![
      rec("x", "X", 1, 9, 10),
      grouped(rec("caminho", "Caminho", 1, 1, 5), "g1"),
      rec("y", "Y", 1, 1, 4),
      grouped(rec("caminho", "Caminho", 1, 2, 5), "g1"),
    ];
    let entries = group_entries(records);
    assert_eq!(entries.len(), 3);
    assert!(matches!(&entries[1], FavoriteEntry::Group { items, .. } if items.len() == 2));
    assert_eq!(entries[2].head().book_id, "y");
  }

  #[test]
  fn lone_group_member_stays_single() {
    let entries = group_entries(vec![grouped(rec("caminho", "Caminho", 1, 1, 5), "g1")]);
    assert!(matches!(entries[0], FavoriteEntry::Single(_)));
  }

  #[test]
  fn interleaved_groups_keep_member_order() {
    let mut records = Vec::new();
    for p in 1..=50 {
      records.push(grouped(rec("caminho", "Caminho", 1, p, 5), "g1"));
      records.push(grouped(rec("sulco", "Sulco", 2, p, 5), "g2"));
    }
    records.push(rec("forja", "Forja", 3, 1, 1));

    let entries = group_entries(records);
    assert_eq!(entries.len(), 3);
    let FavoriteEntry::Group { group_id, items, .. } = &entries[0] else {
      panic!("expected a group, got {:?}", entries[0]);
    };
    assert_eq!(group_id, "g1");
    let paragraphs: Vec<u32> = items.iter().map(|r| r.paragraph_number).collect();
    assert_eq!(paragraphs, (1..=50).collect::<Vec<_>>());
    assert_eq!(entries[1].count(), 50);
    assert!(matches!(entries[2], FavoriteEntry::Single(_)));
  }
}
