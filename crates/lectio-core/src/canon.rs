//! Scripture-book classification.
//!
//! The remote service and legacy local records carry no [`FavoriteKind`], so
//! the kind is recovered by testing the book id against a closed list of
//! canonical biblical-book slugs. The list is data: callers may supply their
//! own.

use std::collections::HashSet;

use crate::favorite::FavoriteKind;

/// Slugs of the 73 books of the Catholic canon as used by the bundled Bible.
pub const DEFAULT_SCRIPTURE_BOOKS: &[&str] = &[
  // Old Testament
  "genesis", "exodo", "levitico", "numeros", "deuteronomio", "josue",
  "juizes", "rute", "1samuel", "2samuel", "1reis", "2reis", "1cronicas",
  "2cronicas", "esdras", "neemias", "tobias", "judite", "ester", "1macabeus",
  "2macabeus", "jo", "salmos", "proverbios", "eclesiastes", "canticos",
  "sabedoria", "eclesiastico", "isaias", "jeremias", "lamentacoes", "baruc",
  "ezequiel", "daniel", "oseias", "joel", "amos", "abdias", "jonas",
  "miqueias", "naum", "habacuc", "sofonias", "ageu", "zacarias", "malaquias",
  // New Testament
  "mateus", "marcos", "lucas", "joao", "atos", "romanos", "1corintios",
  "2corintios", "galatas", "efesios", "filipenses", "colossenses",
  "1tessalonicenses", "2tessalonicenses", "1timoteo", "2timoteo", "tito",
  "filemom", "hebreus", "tiago", "1pedro", "2pedro", "1joao", "2joao",
  "3joao", "judas", "apocalipse",
];

/// A closed set of scripture-book identifiers, matched case-insensitively.
#[derive(Debug, Clone)]
pub struct ScriptureCanon {
  books: HashSet<String>,
}

impl ScriptureCanon {
  pub fn new<I, S>(books: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    Self {
      books: books.into_iter().map(|b| b.as_ref().to_lowercase()).collect(),
    }
  }

  /// Exact (case-insensitive) membership; no prefix or fuzzy matching.
  pub fn is_scripture(&self, book_id: &str) -> bool {
    self.books.contains(&book_id.to_lowercase())
  }

  pub fn classify(&self, book_id: &str) -> FavoriteKind {
    if self.is_scripture(book_id) {
      FavoriteKind::Scripture
    } else {
      FavoriteKind::Book
    }
  }

  pub fn len(&self) -> usize { self.books.len() }

  pub fn is_empty(&self) -> bool { self.books.is_empty() }
}

impl Default for ScriptureCanon {
  fn default() -> Self { Self::new(DEFAULT_SCRIPTURE_BOOKS) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_canon_has_73_books() {
    assert_eq!(ScriptureCanon::default().len(), 73);
  }

  #[test]
  fn matching_ignores_case() {
    let canon = ScriptureCanon::default();
    assert_eq!(canon.classify("Genesis"), FavoriteKind::Scripture);
    assert_eq!(canon.classify("APOCALIPSE"), FavoriteKind::Scripture);
  }

  #[test]
  fn matching_is_exact() {
    let canon = ScriptureCanon::default();
    // "jo" is a book; neither a longer slug nor a prefix of one matches.
    assert_eq!(canon.classify("jo"), FavoriteKind::Scripture);
    assert_eq!(canon.classify("joaozinho"), FavoriteKind::Book);
    assert_eq!(canon.classify("gen"), FavoriteKind::Book);
    assert_eq!(canon.classify("caminho"), FavoriteKind::Book);
  }

  #[test]
  fn custom_canon_replaces_default() {
    let canon = ScriptureCanon::new(["Genesis", "Exodus"]);
    assert!(canon.is_scripture("exodus"));
    assert!(!canon.is_scripture("exodo"));
  }
}
