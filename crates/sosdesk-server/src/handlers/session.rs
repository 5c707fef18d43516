//! Admin login endpoints.
//!
//! The server keeps no session state: `/login` only confirms that a pair of
//! credentials is valid, and admin routes expect the same pair as HTTP Basic
//! credentials on every request.

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
  http::{HeaderMap, StatusCode},
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use sosdesk_core::store::SosStore;

use crate::{
  AppState,
  auth::{verify_auth, verify_credentials},
  error::Error,
};

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub username: Option<String>,
  pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginOutcome {
  pub message:   &'static str,
  pub logged_in: bool,
}

#[derive(Debug, Serialize)]
pub struct LoginStatus {
  pub logged_in: bool,
}

#[derive(Debug, Serialize)]
pub struct LoggedOut {
  pub message: &'static str,
}

/// `POST /login`, body: `{"username":"…","password":"…"}`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  body: Result<Json<LoginBody>, JsonRejection>,
) -> Result<impl IntoResponse, Error>
where
  S: SosStore + 'static,
{
  let Json(body) = body.map_err(super::bad_json)?;

  let (Some(username), Some(password)) = (
    body.username.filter(|u| !u.is_empty()),
    body.password.filter(|p| !p.is_empty()),
  ) else {
    return Err(Error::BadRequest("Missing username or password".into()));
  };

  if verify_credentials(&state.auth, &username, &password) {
    tracing::info!(%username, "admin login");
    Ok((
      StatusCode::OK,
      Json(LoginOutcome {
        message:   "Login successful",
        logged_in: true,
      }),
    ))
  } else {
    tracing::warn!(%username, "failed admin login");
    Ok((
      StatusCode::UNAUTHORIZED,
      Json(LoginOutcome {
        message:   "Invalid Credentials",
        logged_in: false,
      }),
    ))
  }
}

/// `GET /check_login`
pub async fn check<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
) -> Json<LoginStatus>
where
  S: SosStore + 'static,
{
  Json(LoginStatus {
    logged_in: verify_auth(&headers, &state.auth).is_ok(),
  })
}

/// `GET /logout`
pub async fn logout() -> Json<LoggedOut> {
  Json(LoggedOut {
    message: "Logged out successfully",
  })
}
