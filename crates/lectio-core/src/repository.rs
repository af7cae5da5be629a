//! The `FavoritesRepository` trait — server-side storage of remote favorites.
//!
//! Every operation is scoped to one authenticated user. Higher layers
//! (`lectio-api`) depend on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::remote::{NewRemoteFavorite, RemoteFavorite};

pub trait FavoritesRepository: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// All favorites of `user_id`, newest first.
  fn list(
    &self,
    user_id: i64,
  ) -> impl Future<Output = Result<Vec<RemoteFavorite>, Self::Error>> + Send + '_;

  /// Insert a favorite. Returns `None` when the user already has one with the
  /// same `(book_slug, chapter_id, paragraph_index)`.
  fn insert(
    &self,
    user_id: i64,
    favorite: NewRemoteFavorite,
  ) -> impl Future<Output = Result<Option<RemoteFavorite>, Self::Error>> + Send + '_;

  /// Delete one favorite. Returns `false` if `id` does not exist or belongs to
  /// another user.
  fn delete(
    &self,
    user_id: i64,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Delete every favorite of `user_id`, returning how many were removed.
  fn delete_all(
    &self,
    user_id: i64,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}
