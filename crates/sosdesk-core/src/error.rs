//! Error types for `sosdesk-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid status: {0:?}")]
  InvalidStatus(String),

  #[error("announcement content must be a non-empty string")]
  EmptyContent,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
