//! [`HttpGateway`] — the remote favorites service over its JSON API.

use std::time::Duration;

use lectio_core::{
  gateway::FavoritesGateway,
  remote::{FavoriteList, NewRemoteFavorite, RemoteFavorite},
};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("{method} {path} → {status}")]
  Status {
    method: Method,
    path:   String,
    status: StatusCode,
  },
}

/// Connection settings for the favorites API.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
  /// Server root or API root; `/api` is appended when missing.
  pub base_url: String,
  /// Bearer token; requests are sent unauthenticated when `None`.
  pub token:    Option<String>,
}

/// Async HTTP client for the favorites API.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HttpGateway {
  client:   Client,
  base_url: String,
  token:    Option<String>,
}

impl HttpGateway {
  pub fn new(config: GatewayConfig) -> Result<Self, ClientError> {
    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    Ok(Self {
      client,
      base_url: api_root(&config.base_url),
      token: config.token.filter(|t| !t.is_empty()),
    })
  }

  fn request(&self, method: Method, path: &str) -> RequestBuilder {
    let req = self.client.request(method, format!("{}{path}", self.base_url));
    match &self.token {
      Some(token) => req.bearer_auth(token),
      None => req,
    }
  }

  async fn send(&self, req: RequestBuilder, method: Method, path: &str) -> Result<reqwest::Response, ClientError> {
    let resp = req.send().await?;
    if resp.status().is_success() {
      Ok(resp)
    } else {
      Err(ClientError::Status { method, path: path.to_string(), status: resp.status() })
    }
  }
}

/// Normalise a configured URL to the API root, without a trailing slash.
fn api_root(base_url: &str) -> String {
  let trimmed = base_url.trim().trim_end_matches('/');
  if trimmed.ends_with("/api") {
    trimmed.to_string()
  } else {
    format!("{trimmed}/api")
  }
}

impl FavoritesGateway for HttpGateway {
  type Error = ClientError;

  /// `GET /api/favorites`
  async fn list(&self) -> Result<Vec<RemoteFavorite>, ClientError> {
    let path = "/favorites";
    let resp = self
      .send(self.request(Method::GET, path), Method::GET, path)
      .await?;
    let list: FavoriteList = resp.json().await?;
    Ok(list.favorites)
  }

  /// `POST /api/favorites`; the server answers 200 for an existing favorite.
  async fn create(&self, favorite: &NewRemoteFavorite) -> Result<(), ClientError> {
    let path = "/favorites";
    self
      .send(self.request(Method::POST, path).json(favorite), Method::POST, path)
      .await?;
    Ok(())
  }

  /// `DELETE /api/favorites/{id}`
  async fn delete_by_id(&self, id: i64) -> Result<(), ClientError> {
    let path = format!("/favorites/{id}");
    self
      .send(self.request(Method::DELETE, &path), Method::DELETE, &path)
      .await?;
    Ok(())
  }

  /// `DELETE /api/favorites`
  async fn delete_all(&self) -> Result<(), ClientError> {
    let path = "/favorites";
    self
      .send(self.request(Method::DELETE, path), Method::DELETE, path)
      .await?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn api_root_appends_api() {
    assert_eq!(api_root("http://localhost:3000"), "http://localhost:3000/api");
    assert_eq!(api_root("http://localhost:3000/"), "http://localhost:3000/api");
  }

  #[test]
  fn api_root_keeps_existing_api() {
    assert_eq!(api_root("https://lectio.example/api"), "https://lectio.example/api");
    assert_eq!(api_root("https://lectio.example/api/"), "https://lectio.example/api");
  }

  #[test]
  fn empty_token_is_dropped() {
    let gateway = HttpGateway::new(GatewayConfig {
      base_url: "http://localhost:3000".into(),
      token:    Some(String::new()),
    })
    .unwrap();
    assert!(gateway.token.is_none());
  }
}
