//! Handlers for `/favorites` endpoints.
//!
//! | Method   | Path              | Notes |
//! |----------|-------------------|-------|
//! | `GET`    | `/favorites`      | Newest first, wrapped in `{"favorites": [...]}` |
//! | `POST`   | `/favorites`      | 201 on insert, 200 if the paragraph is already a favorite |
//! | `DELETE` | `/favorites/{id}` | 404 if absent or owned by another user |
//! | `DELETE` | `/favorites`      | Removes every favorite of the caller |

use std::sync::Arc;

use axum::{
  Extension, Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use lectio_core::{
  remote::{FavoriteList, NewRemoteFavorite},
  repository::FavoritesRepository,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::{UserId, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /favorites`
pub async fn list<R>(
  State(repo): State<Arc<R>>,
  Extension(UserId(user)): Extension<UserId>,
) -> Result<Json<FavoriteList>, ApiError>
where
  R: FavoritesRepository + 'static,
{
  let favorites = repo.list(user).await.map_err(ApiError::repository)?;
  Ok(Json(FavoriteList { favorites }))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// Every field is optional on the wire so that a missing field is reported
/// as a 400 rather than a deserialisation rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateBody {
  pub book_slug:       Option<String>,
  pub chapter_id:      Option<String>,
  pub paragraph_index: Option<u32>,
  pub paragraph_text:  Option<String>,
}

impl CreateBody {
  fn validate(self) -> Result<NewRemoteFavorite, ApiError> {
    fn required(field: Option<String>) -> Option<String> {
      field.filter(|s| !s.trim().is_empty())
    }
    match (
      required(self.book_slug),
      required(self.chapter_id),
      self.paragraph_index,
      required(self.paragraph_text),
    ) {
      (Some(book_slug), Some(chapter_id), Some(paragraph_index), Some(paragraph_text)) => {
        Ok(NewRemoteFavorite { book_slug, chapter_id, paragraph_index, paragraph_text })
      }
      _ => Err(ApiError::BadRequest("incomplete favorite".into())),
    }
  }
}

/// `POST /favorites`, body:
/// `{"book_slug":"…","chapter_id":"…","paragraph_index":0,"paragraph_text":"…"}`
pub async fn create<R>(
  State(repo): State<Arc<R>>,
  Extension(UserId(user)): Extension<UserId>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  R: FavoritesRepository + 'static,
{
  let favorite = body.validate()?;
  let inserted = repo
    .insert(user, favorite)
    .await
    .map_err(ApiError::repository)?;

  let response: (StatusCode, Json<Value>) = match inserted {
    Some(favorite) => (
      StatusCode::CREATED,
      Json(json!({ "message": "favorite added", "favorite": favorite })),
    ),
    None => {
      debug!(user, "favorite already exists");
      (StatusCode::OK, Json(json!({ "message": "favorite already exists" })))
    }
  };
  Ok(response)
}

// ─── Delete one ───────────────────────────────────────────────────────────────

/// `DELETE /favorites/{id}`
pub async fn delete_one<R>(
  State(repo): State<Arc<R>>,
  Extension(UserId(user)): Extension<UserId>,
  Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError>
where
  R: FavoritesRepository + 'static,
{
  if repo.delete(user, id).await.map_err(ApiError::repository)? {
    Ok(Json(json!({ "message": "favorite removed" })))
  } else {
    Err(ApiError::NotFound(format!("favorite {id} not found")))
  }
}

// ─── Clear ────────────────────────────────────────────────────────────────────

/// `DELETE /favorites`
pub async fn clear<R>(
  State(repo): State<Arc<R>>,
  Extension(UserId(user)): Extension<UserId>,
) -> Result<Json<Value>, ApiError>
where
  R: FavoritesRepository + 'static,
{
  let removed = repo.delete_all(user).await.map_err(ApiError::repository)?;
  Ok(Json(json!({ "message": "all favorites removed", "removed": removed })))
}
