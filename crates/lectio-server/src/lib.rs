//! HTTP server for the remote favorites service.
//!
//! Mounts [`lectio_api`] under `/api` behind bearer-token authentication and
//! request tracing.

pub mod auth;
pub mod error;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, middleware};
use lectio_core::repository::FavoritesRepository;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::{AuthConfig, TokenEntry, require_user};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
  #[serde(default)]
  pub tokens:     Vec<TokenEntry>,
}

// ─── Application state ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct AppState<R> {
  pub repo: Arc<R>,
  pub auth: Arc<AuthConfig>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the server's axum [`Router`].
pub fn router<R>(state: AppState<R>) -> Router
where
  R: FavoritesRepository + 'static,
{
  let api = lectio_api::api_router(state.repo)
    .route_layer(middleware::from_fn_with_state(state.auth, require_user));

  Router::new()
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ────────────────────────────────────────────────────────
