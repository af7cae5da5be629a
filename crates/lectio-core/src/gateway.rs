//! The `FavoritesGateway` trait — the client's view of the remote service.
//!
//! Implemented by transport crates (e.g. the HTTP client in `lectio-cli`).
//! Every call may fail; the sync engine treats failures as non-fatal.

use std::future::Future;

use crate::remote::{NewRemoteFavorite, RemoteFavorite};

/// Abstract CRUD over the authenticated user's remote favorites.
pub trait FavoritesGateway: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Every remote favorite of the current user.
  fn list(
    &self,
  ) -> impl Future<Output = Result<Vec<RemoteFavorite>, Self::Error>> + Send + '_;

  /// Create a favorite. A natural-key conflict is a successful no-op.
  fn create<'a>(
    &'a self,
    favorite: &'a NewRemoteFavorite,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Delete one favorite by its server-assigned id.
  fn delete_by_id(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete every favorite of the current user.
  fn delete_all(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
