//! JSON REST API for the remote favorites service.
//!
//! Exposes an axum [`Router`] backed by any
//! [`lectio_core::repository::FavoritesRepository`]. Handlers read the caller's
//! [`UserId`] from a request extension; authenticating the request and
//! inserting that extension is the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", lectio_api::api_router(repo.clone()))
//! ```

pub mod error;
pub mod favorites;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get},
};
use lectio_core::repository::FavoritesRepository;

pub use error::ApiError;

/// The authenticated user a request acts for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserId(pub i64);

/// Build a fully-materialised API router for `repo`.
pub fn api_router<R>(repo: Arc<R>) -> Router<()>
where
  R: FavoritesRepository + 'static,
{
  Router::new()
    .route(
      "/favorites",
      get(favorites::list::<R>)
        .post(favorites::create::<R>)
        .delete(favorites::clear::<R>),
    )
    .route("/favorites/{id}", delete(favorites::delete_one::<R>))
    .with_state(repo)
}

#[cfg(test)]
mod tests;
