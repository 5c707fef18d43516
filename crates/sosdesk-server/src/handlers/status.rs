//! Handler for `POST /update_status/{id}`, the only mutation ever applied to
//! a stored SOS record.

use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};
use sosdesk_core::{sos::SosStatus, store::SosStore};

use crate::{AppState, auth::Authenticated, error::Error};

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusUpdated {
  pub message:    &'static str,
  pub id:         i64,
  pub new_status: SosStatus,
}

/// `POST /update_status/{id}`, body: `{"status":"Under Review"}`
pub async fn update<S>(
  _: Authenticated,
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
  body: Result<Json<StatusBody>, JsonRejection>,
) -> Result<Json<StatusUpdated>, Error>
where
  S: SosStore + 'static,
{
  let Json(body) = body.map_err(super::bad_json)?;

  let raw = body
    .status
    .filter(|s| !s.is_empty())
    .ok_or_else(|| Error::BadRequest("Missing status field in request body".into()))?;

  let status = SosStatus::parse(&raw).map_err(|_| {
    Error::BadRequest(format!(
      "Invalid status: \"{raw}\". Allowed statuses are: {}",
      SosStatus::allowed_list()
    ))
  })?;

  let found = state
    .store
    .update_status(id, status)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;

  if !found {
    return Err(Error::NotFound(format!("SOS message with ID {id} not found")));
  }

  tracing::info!(id, %status, "updated sos status");
  Ok(Json(StatusUpdated {
    message: "Status updated successfully",
    id,
    new_status: status,
  }))
}
