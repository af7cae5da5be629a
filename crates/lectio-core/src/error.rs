//! Error types for `lectio-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("remote chapter id is not a chapter number: {0:?}")]
  InvalidChapterId(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
