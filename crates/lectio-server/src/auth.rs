//! Bearer-token authentication.
//!
//! The server never stores tokens, only the lowercase hex SHA-256 of each one
//! mapped to the user it authenticates.

use std::{collections::HashMap, sync::Arc};

use axum::{
  extract::{Request, State},
  http::{HeaderMap, header},
  middleware::Next,
  response::Response,
};
use lectio_api::UserId;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::error::Error;

/// One configured token, as it appears in `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenEntry {
  pub user_id:    i64,
  /// Hex SHA-256 of the bearer token.
  pub token_hash: String,
}

/// Token hashes accepted by this server instance.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
  users: HashMap<String, i64>,
}

impl AuthConfig {
  pub fn new(tokens: &[TokenEntry]) -> Self {
    let users = tokens
      .iter()
      .map(|t| (t.token_hash.trim().to_ascii_lowercase(), t.user_id))
      .collect();
    Self { users }
  }

  pub fn is_empty(&self) -> bool { self.users.is_empty() }
}

/// Lowercase hex SHA-256 of `token`.
pub fn hash_token(token: &str) -> String { hex::encode(Sha256::digest(token.as_bytes())) }

/// Resolve the user a request's `Authorization: Bearer` header belongs to.
pub fn verify_bearer(headers: &HeaderMap, config: &AuthConfig) -> Result<UserId, Error> {
  let token = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .map(str::trim)
    .filter(|t| !t.is_empty())
    .ok_or(Error::Unauthorized)?;

  config
    .users
    .get(&hash_token(token))
    .map(|&id| UserId(id))
    .ok_or(Error::Unauthorized)
}

/// Middleware: reject unauthenticated requests, otherwise attach the
/// caller's [`UserId`] as a request extension.
pub async fn require_user(
  State(config): State<Arc<AuthConfig>>,
  mut req: Request,
  next: Next,
) -> Result<Response, Error> {
  let user = verify_bearer(req.headers(), &config)?;
  req.extensions_mut().insert(user);
  Ok(next.run(req).await)
}
