//! Handlers for SOS intake and the admin listing.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/api/v1/sos` | Structured or legacy JSON payload; 201 + id/source |
//! | `POST` | `/submit_sos` | Web form, JSON or urlencoded; 201 + id |
//! | `GET`  | `/get_sos_messages` | Admin; newest first |

use std::collections::HashMap;

use axum::{
  Form, Json,
  extract::{FromRequest, Request, State, rejection::JsonRejection},
  http::{StatusCode, header},
  response::IntoResponse,
};
use serde::Serialize;
use serde_json::Value;
use sosdesk_core::{
  intake::{self, Payload},
  sos::SosRecord,
  store::SosStore,
};

use crate::{AppState, auth::Authenticated, error::Error};

// ─── API intake ───────────────────────────────────────────────────────────────

const NOT_JSON: &str = "Request must be JSON";

#[derive(Debug, Serialize)]
pub struct ApiSubmitted {
  pub status:  &'static str,
  pub message: String,
  pub id:      i64,
  pub source:  String,
}

/// `POST /api/v1/sos`: body is either shape accepted by
/// [`intake::classify`].
pub async fn api_submit<S>(
  State(state): State<AppState<S>>,
  body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, Error>
where
  S: SosStore + 'static,
{
  let payload = match body {
    Ok(Json(Value::Object(map))) => map,
    Ok(Json(_)) => {
      tracing::debug!("api sos body is not a JSON object");
      return Err(Error::BadRequest(NOT_JSON.into()));
    }
    Err(rejection) => {
      tracing::debug!(%rejection, "api sos body rejected");
      return Err(Error::BadRequest(NOT_JSON.into()));
    }
  };

  let submission = intake::classify(&payload)
    .inspect_err(|errors| tracing::info!(%errors, "unrecognised sos payload shape"))?;
  let format = submission.kind();

  let new_sos = submission
    .validate()
    .inspect_err(|errors| tracing::info!(format, %errors, "sos validation failed"))?;
  tracing::debug!(format, source = %new_sos.source, "normalized sos submission");

  let record = state
    .store
    .insert_sos(new_sos)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;
  tracing::info!(id = record.id, source = %record.source, "saved api sos submission");

  Ok((
    StatusCode::CREATED,
    Json(ApiSubmitted {
      status:  "success",
      message: format!(
        "SOS submitted successfully via API (Source: {})",
        record.source
      ),
      id:      record.id,
      source:  record.source,
    }),
  ))
}

// ─── Web form intake ──────────────────────────────────────────────────────────

/// A request body decoded from JSON when the content type says so, otherwise
/// from `application/x-www-form-urlencoded`.
pub struct FormOrJson(pub Payload);

impl<S> FromRequest<S> for FormOrJson
where
  S: Send + Sync,
{
  type Rejection = Error;

  async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
    let is_json = req
      .headers()
      .get(header::CONTENT_TYPE)
      .and_then(|v| v.to_str().ok())
      .is_some_and(|ct| ct.starts_with("application/json"));

    if is_json {
      let Json(value) = Json::<Value>::from_request(req, state)
        .await
        .map_err(super::bad_json)?;
      match value {
        Value::Object(map) => Ok(Self(map)),
        _ => Err(Error::BadRequest("Request body must be a JSON object".into())),
      }
    } else {
      let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
        .await
        .map_err(|e| Error::BadRequest(e.body_text()))?;
      Ok(Self(
        fields
          .into_iter()
          .map(|(k, v)| (k, Value::String(v)))
          .collect(),
      ))
    }
  }
}

#[derive(Debug, Serialize)]
pub struct WebSubmitted {
  pub message: &'static str,
  pub id:      i64,
}

/// `POST /submit_sos`. `name`, `location` and `message` are all required.
pub async fn web_submit<S>(
  State(state): State<AppState<S>>,
  FormOrJson(payload): FormOrJson,
) -> Result<impl IntoResponse, Error>
where
  S: SosStore + 'static,
{
  let new_sos = intake::normalize_web_form(&payload)
    .inspect_err(|errors| tracing::info!(%errors, "web form validation failed"))?;

  let record = state
    .store
    .insert_sos(new_sos)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;
  tracing::info!(id = record.id, "saved web form sos submission");

  Ok((
    StatusCode::CREATED,
    Json(WebSubmitted {
      message: "SOS submitted successfully via web form",
      id:      record.id,
    }),
  ))
}

// ─── Admin listing ────────────────────────────────────────────────────────────

/// `GET /get_sos_messages`
pub async fn list<S>(
  _: Authenticated,
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<SosRecord>>, Error>
where
  S: SosStore + 'static,
{
  let records = state
    .store
    .list_sos()
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;
  Ok(Json(records))
}
