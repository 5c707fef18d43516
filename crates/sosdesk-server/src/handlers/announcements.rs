//! Handlers for announcement endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/get_announcements` | Public; latest ten |
//! | `POST`   | `/create_announcement` | Admin; body `{"content":"..."}` |
//! | `PUT`    | `/update_announcement/{id}` | Admin; 404 if not found |
//! | `DELETE` | `/delete_announcement/{id}` | Admin; 404 if not found |

use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use sosdesk_core::{
  announcement::{self, Announcement, PUBLIC_LIMIT},
  store::SosStore,
};

use crate::{AppState, auth::Authenticated, error::Error};

#[derive(Debug, Deserialize)]
pub struct ContentBody {
  pub content: Option<String>,
}

impl ContentBody {
  fn normalized(&self) -> Result<String, Error> {
    announcement::normalize_content(self.content.as_deref().unwrap_or_default())
      .map_err(|_| Error::BadRequest("Missing or empty content field".into()))
  }
}

#[derive(Debug, Serialize)]
pub struct Created {
  pub message:      &'static str,
  pub announcement: Announcement,
}

#[derive(Debug, Serialize)]
pub struct Updated {
  pub message:      &'static str,
  #[serde(flatten)]
  pub announcement: Announcement,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
  pub message: &'static str,
}

/// `GET /get_announcements`
pub async fn list<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<Announcement>>, Error>
where
  S: SosStore + 'static,
{
  let announcements = state
    .store
    .list_announcements(PUBLIC_LIMIT)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;
  Ok(Json(announcements))
}

/// `POST /create_announcement`: returns 201 and the stored announcement.
pub async fn create<S>(
  _: Authenticated,
  State(state): State<AppState<S>>,
  body: Result<Json<ContentBody>, JsonRejection>,
) -> Result<impl IntoResponse, Error>
where
  S: SosStore + 'static,
{
  let Json(body) = body.map_err(super::bad_json)?;
  let content = body.normalized()?;

  let announcement = state
    .store
    .add_announcement(content)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;
  tracing::info!(id = announcement.id, "created announcement");

  Ok((
    StatusCode::CREATED,
    Json(Created {
      message: "Announcement created successfully",
      announcement,
    }),
  ))
}

/// `PUT /update_announcement/{id}`
pub async fn update<S>(
  _: Authenticated,
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
  body: Result<Json<ContentBody>, JsonRejection>,
) -> Result<Json<Updated>, Error>
where
  S: SosStore + 'static,
{
  let Json(body) = body.map_err(super::bad_json)?;
  let content = body.normalized()?;

  let announcement = state
    .store
    .update_announcement(id, content)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?
    .ok_or_else(|| Error::NotFound("Announcement not found".into()))?;
  tracing::info!(id, "updated announcement");

  Ok(Json(Updated {
    message: "Announcement updated successfully",
    announcement,
  }))
}

/// `DELETE /delete_announcement/{id}`
pub async fn delete_one<S>(
  _: Authenticated,
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Deleted>, Error>
where
  S: SosStore + 'static,
{
  let deleted = state
    .store
    .delete_announcement(id)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;

  if !deleted {
    return Err(Error::NotFound("Announcement not found".into()));
  }

  tracing::info!(id, "deleted announcement");
  Ok(Json(Deleted {
    message: "Announcement deleted successfully",
  }))
}
