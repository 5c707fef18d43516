//! Admin HTTP Basic-auth extractor and standalone verifier.
//!
//! Credentials come only from [`crate::ServerConfig`]; there is no built-in
//! account.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, header, request::Parts};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;

use crate::{AppState, error::Error};
use sosdesk_core::store::SosStore;

/// The single admin account accepted by this server instance.
#[derive(Clone)]
pub struct AuthConfig {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

/// Zero-size marker: present in the handler means the request was made by the
/// admin.
pub struct Authenticated;

/// Check a username/password pair against the configured admin account.
pub fn verify_credentials(config: &AuthConfig, username: &str, password: &str) -> bool {
  if username != config.username {
    return false;
  }

  let Ok(parsed_hash) = PasswordHash::new(&config.password_hash) else {
    return false;
  };

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .is_ok()
}

/// The `(username, password)` pair carried by an `Authorization: Basic`
/// header, if the header is present and well formed. The password may itself
/// contain `:`.
pub fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
  let encoded = headers
    .get(header::AUTHORIZATION)?
    .to_str()
    .ok()?
    .strip_prefix("Basic ")?;

  let decoded = String::from_utf8(B64.decode(encoded.trim()).ok()?).ok()?;
  let (username, password) = decoded.split_once(':')?;
  Some((username.to_owned(), password.to_owned()))
}

/// Require admin Basic credentials on a request.
pub fn verify_auth(headers: &HeaderMap, config: &AuthConfig) -> Result<(), Error> {
  let (username, password) = basic_credentials(headers).ok_or(Error::Unauthorized)?;

  if verify_credentials(config, &username, &password) {
    Ok(())
  } else {
    tracing::warn!(%username, "rejected admin credentials");
    Err(Error::Unauthorized)
  }
}

impl<S> FromRequestParts<AppState<S>> for Authenticated
where
  S: SosStore + Send + Sync + 'static,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    verify_auth(&parts.headers, &state.auth)?;
    Ok(Authenticated)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::Arc;
  use axum::http::Request;
  use crate::{AppState, ServerConfig};
  use sosdesk_core::{
    announcement::Announcement,
    sos::{NewSos, SosRecord, SosStatus},
  };

  // A minimal no-op store for testing auth only.
  struct NoopStore;

  impl SosStore for NoopStore {
    type Error = std::convert::Infallible;
    async fn insert_sos(&self, _: NewSos) -> Result<SosRecord, Self::Error> { unimplemented!() }
    async fn list_sos(&self) -> Result<Vec<SosRecord>, Self::Error> { unimplemented!() }
    async fn update_status(&self, _: i64, _: SosStatus) -> Result<bool, Self::Error> { unimplemented!() }
    async fn add_announcement(&self, _: String) -> Result<Announcement, Self::Error> { unimplemented!() }
    async fn list_announcements(&self, _: usize) -> Result<Vec<Announcement>, Self::Error> { unimplemented!() }
    async fn update_announcement(&self, _: i64, _: String) -> Result<Option<Announcement>, Self::Error> { unimplemented!() }
    async fn delete_announcement(&self, _: i64) -> Result<bool, Self::Error> { unimplemented!() }
  }

  fn make_state(password: &str) -> AppState<NoopStore> {
    use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
    use rand_core::OsRng;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string();

    AppState {
      store:  Arc::new(NoopStore),
      config: Arc::new(ServerConfig::for_tests("dispatch", &hash)),
      auth:   Arc::new(AuthConfig {
        username:      "dispatch".to_string(),
        password_hash: hash,
      }),
    }
  }

  async fn extract(req: Request<axum::body::Body>, state: &AppState<NoopStore>) -> Result<Authenticated, Error> {
    let (mut parts, _) = req.into_parts();
    Authenticated::from_request_parts(&mut parts, state).await
  }

  fn basic(user: &str, pass: &str) -> String {
    let encoded = B64.encode(format!("{user}:{pass}"));
    format!("Basic {encoded}")
  }

  #[tokio::test]
  async fn correct_credentials() {
    let state = make_state("secret");
    let req = Request::builder()
      .header(header::AUTHORIZATION, basic("dispatch", "secret"))
      .body(axum::body::Body::empty()).unwrap();
    assert!(extract(req, &state).await.is_ok());
  }

  #[tokio::test]
  async fn wrong_password() {
    let state = make_state("secret");
    let req = Request::builder()
      .header(header::AUTHORIZATION, basic("dispatch", "wrong"))
      .body(axum::body::Body::empty()).unwrap();
    assert!(matches!(extract(req, &state).await, Err(Error::Unauthorized)));
  }

  #[tokio::test]
  async fn wrong_username() {
    let state = make_state("secret");
    let req = Request::builder()
      .header(header::AUTHORIZATION, basic("admin", "secret"))
      .body(axum::body::Body::empty()).unwrap();
    assert!(matches!(extract(req, &state).await, Err(Error::Unauthorized)));
  }

  #[tokio::test]
  async fn missing_header() {
    let state = make_state("secret");
    let req = Request::builder().body(axum::body::Body::empty()).unwrap();
    assert!(matches!(extract(req, &state).await, Err(Error::Unauthorized)));
  }

  #[tokio::test]
  async fn invalid_base64() {
    let state = make_state("secret");
    let req = Request::builder()
      .header(header::AUTHORIZATION, "Basic !!!not-base64!!!")
      .body(axum::body::Body::empty()).unwrap();
    assert!(matches!(extract(req, &state).await, Err(Error::Unauthorized)));
  }

  #[test]
  fn basic_credentials_split_on_first_colon() {
    let mut headers = HeaderMap::new();
    headers.insert(
      header::AUTHORIZATION,
      basic("dispatch", "pa:ss").parse().unwrap(),
    );
    assert_eq!(
      basic_credentials(&headers),
      Some(("dispatch".to_string(), "pa:ss".to_string()))
    );
  }

  #[test]
  fn non_basic_scheme_has_no_credentials() {
    let mut headers = HeaderMap::new();
    headers.insert(header::AUTHORIZATION, "Bearer abc".parse().unwrap());
    assert_eq!(basic_credentials(&headers), None);
  }

  #[test]
  fn malformed_hash_never_verifies() {
    let config = AuthConfig {
      username:      "dispatch".to_string(),
      password_hash: "not-a-phc-string".to_string(),
    };
    assert!(!verify_credentials(&config, "dispatch", ""));
  }
}
