//! Error types and axum `IntoResponse` implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use sosdesk_core::intake::ValidationErrors;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unauthorized")]
  Unauthorized,
  #[error("not found: {0}")]
  NotFound(String),
  #[error("bad request: {0}")]
  BadRequest(String),
  #[error("validation failed: {0}")]
  Validation(#[from] ValidationErrors),
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    match self {
      Error::Unauthorized => {
        let mut res = (
          StatusCode::UNAUTHORIZED,
          Json(json!({ "error": "Unauthorized" })),
        )
          .into_response();
        res.headers_mut().insert(
          header::WWW_AUTHENTICATE,
          HeaderValue::from_static("Basic realm=\"sosdesk\""),
        );
        res
      }
      Error::NotFound(msg) => {
        (StatusCode::NOT_FOUND, Json(json!({ "error": msg }))).into_response()
      }
      Error::BadRequest(msg) => {
        (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
      }
      Error::Validation(details) => (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "Validation failed", "details": details })),
      )
        .into_response(),
      // Store failures are logged in full but reported opaquely.
      Error::Store(e) => {
        tracing::error!(error = %e, "store operation failed");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          Json(json!({ "error": "Internal server error" })),
        )
          .into_response()
      }
    }
  }
}
