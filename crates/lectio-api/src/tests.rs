//! In-process tests of the favorites routes over an in-memory SQLite store.

use std::sync::Arc;

use axum::{
  Extension, Router,
  body::Body,
  http::{Method, Request, StatusCode, header},
};
use lectio_store_sqlite::SqliteFavorites;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::{UserId, api_router};

async fn repo() -> Arc<SqliteFavorites> {
  Arc::new(SqliteFavorites::open_in_memory().await.unwrap())
}

fn app(repo: &Arc<SqliteFavorites>, user: i64) -> Router {
  api_router(repo.clone()).layer(Extension(UserId(user)))
}

async fn call(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(json) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(json.to_string())
    }
    None => Body::empty(),
  };
  let resp = app.oneshot(builder.body(body).unwrap()).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
  (status, value)
}

fn favorite(book: &str, chapter: &str, paragraph: u32) -> Value {
  json!({
    "book_slug": book,
    "chapter_id": chapter,
    "paragraph_index": paragraph,
    "paragraph_text": "texto",
  })
}

// ── Create ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_returns_201_with_row() {
  let repo = repo().await;
  let (status, body) =
    call(app(&repo, 1), Method::POST, "/favorites", Some(favorite("caminho", "1", 5))).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["favorite"]["book_slug"], "caminho");
  assert_eq!(body["favorite"]["user_id"], 1);
  assert!(body["favorite"]["id"].is_i64());
}

#[tokio::test]
async fn create_duplicate_returns_200_without_row() {
  let repo = repo().await;
  call(app(&repo, 1), Method::POST, "/favorites", Some(favorite("caminho", "1", 5))).await;
  let (status, body) =
    call(app(&repo, 1), Method::POST, "/favorites", Some(favorite("caminho", "1", 5))).await;
  assert_eq!(status, StatusCode::OK);
  assert!(body.get("favorite").is_none());

  let (_, listed) = call(app(&repo, 1), Method::GET, "/favorites", None).await;
  assert_eq!(listed["favorites"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn create_with_missing_field_returns_400() {
  let repo = repo().await;
  let body = json!({ "book_slug": "caminho", "chapter_id": "1", "paragraph_text": "x" });
  let (status, body) = call(app(&repo, 1), Method::POST, "/favorites", Some(body)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string());

  let (status, _) =
    call(app(&repo, 1), Method::POST, "/favorites", Some(favorite("", "1", 1))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn paragraph_zero_is_accepted() {
  let repo = repo().await;
  let (status, _) =
    call(app(&repo, 1), Method::POST, "/favorites", Some(favorite("caminho", "1", 0))).await;
  assert_eq!(status, StatusCode::CREATED);
}

// ── List ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_is_scoped_to_user() {
  let repo = repo().await;
  call(app(&repo, 1), Method::POST, "/favorites", Some(favorite("caminho", "1", 1))).await;
  call(app(&repo, 2), Method::POST, "/favorites", Some(favorite("sulco", "2", 2))).await;

  let (status, body) = call(app(&repo, 1), Method::GET, "/favorites", None).await;
  assert_eq!(status, StatusCode::OK);
  let favorites = body["favorites"].as_array().unwrap();
  assert_eq!(favorites.len(), 1);
  assert_eq!(favorites[0]["book_slug"], "caminho");
}

// ── Delete ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_one_then_404() {
  let repo = repo().await;
  let (_, created) =
    call(app(&repo, 1), Method::POST, "/favorites", Some(favorite("caminho", "1", 1))).await;
  let uri = format!("/favorites/{}", created["favorite"]["id"]);

  let (status, _) = call(app(&repo, 1), Method::DELETE, &uri, None).await;
  assert_eq!(status, StatusCode::OK);
  let (status, body) = call(app(&repo, 1), Method::DELETE, &uri, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(body["error"].is_string());
}

#[tokio::test]
async fn delete_other_users_favorite_is_404() {
  let repo = repo().await;
  let (_, created) =
    call(app(&repo, 1), Method::POST, "/favorites", Some(favorite("caminho", "1", 1))).await;
  let uri = format!("/favorites/{}", created["favorite"]["id"]);

  let (status, _) = call(app(&repo, 2), Method::DELETE, &uri, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  let (_, listed) = call(app(&repo, 1), Method::GET, "/favorites", None).await;
  assert_eq!(listed["favorites"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn clear_reports_removed_count() {
  let repo = repo().await;
  for p in 1..=3 {
    call(app(&repo, 1), Method::POST, "/favorites", Some(favorite("caminho", "1", p))).await;
  }
  let (status, body) = call(app(&repo, 1), Method::DELETE, "/favorites", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["removed"], 3);

  let (_, listed) = call(app(&repo, 1), Method::GET, "/favorites", None).await;
  assert!(listed["favorites"].as_array().unwrap().is_empty());
}
