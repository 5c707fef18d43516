//! HTTP layer for sosdesk.
//!
//! Exposes an axum [`Router`] serving SOS intake, admin triage and
//! announcements, backed by any [`SosStore`].

pub mod auth;
pub mod error;
pub mod handlers;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  http::HeaderValue,
  routing::{delete, get, post, put},
};
use serde::Deserialize;
use sosdesk_core::store::SosStore;
use tower_http::{
  cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
  trace::TraceLayer,
};

use auth::AuthConfig;
use handlers::{announcements, session, sos, status};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `SOSDESK_*` environment variables.
///
/// The admin account has no default; startup fails if it is not supplied.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                String,
  #[serde(default = "default_port")]
  pub port:                u16,
  #[serde(default = "default_store_path")]
  pub store_path:          PathBuf,
  pub admin_username:      String,
  pub admin_password_hash: String,
  /// Browser origins allowed to call the API with credentials. Empty means
  /// any origin.
  #[serde(default)]
  pub cors_allow_origins:  Vec<String>,
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_store_path() -> PathBuf { PathBuf::from("sos.db") }

impl ServerConfig {
  pub fn auth(&self) -> AuthConfig {
    AuthConfig {
      username:      self.admin_username.clone(),
      password_hash: self.admin_password_hash.clone(),
    }
  }

  #[cfg(test)]
  pub(crate) fn for_tests(username: &str, password_hash: &str) -> Self {
    Self {
      host:                default_host(),
      port:                default_port(),
      store_path:          PathBuf::from(":memory:"),
      admin_username:      username.to_string(),
      admin_password_hash: password_hash.to_string(),
      cors_allow_origins:  Vec::new(),
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S: SosStore> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
  pub auth:   Arc<AuthConfig>,
}

impl<S: SosStore> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:  Arc::clone(&self.store),
      config: Arc::clone(&self.config),
      auth:   Arc::clone(&self.auth),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build an axum [`Router`] for the sosdesk server.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: SosStore + 'static,
{
  let cors = cors_layer(&state.config);

  Router::new()
    // SOS intake and triage
    .route("/api/v1/sos",                 post(sos::api_submit::<S>))
    .route("/submit_sos",                 post(sos::web_submit::<S>))
    .route("/get_sos_messages",           get(sos::list::<S>))
    .route("/update_status/{id}",         post(status::update::<S>))
    // Announcements
    .route("/get_announcements",          get(announcements::list::<S>))
    .route("/create_announcement",        post(announcements::create::<S>))
    .route("/update_announcement/{id}",   put(announcements::update::<S>))
    .route("/delete_announcement/{id}",   delete(announcements::delete_one::<S>))
    // Admin login
    .route("/login",                      post(session::login::<S>))
    .route("/check_login",                get(session::check::<S>))
    .route("/logout",                     get(session::logout))
    .route("/health",                     get(|| async { "ok" }))
    .layer(cors)
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
  if config.cors_allow_origins.is_empty() {
    return CorsLayer::very_permissive();
  }

  let origins: Vec<HeaderValue> = config
    .cors_allow_origins
    .iter()
    .filter_map(|origin| match HeaderValue::from_str(origin) {
      Ok(v) => Some(v),
      Err(_) => {
        tracing::warn!(%origin, "ignoring invalid CORS origin");
        None
      }
    })
    .collect();

  CorsLayer::new()
    .allow_origin(AllowOrigin::list(origins))
    .allow_methods(AllowMethods::mirror_request())
    .allow_headers(AllowHeaders::mirror_request())
    .allow_credentials(true)
}

// ─── Integration tests ────────────────────────────────────────────────────────
