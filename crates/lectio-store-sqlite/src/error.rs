//! Error type for `lectio-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A row was inserted but could not be read back.
  #[error("favorite {0} vanished after insert")]
  MissingAfterInsert(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
