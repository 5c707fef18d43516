//! Public announcements posted from the admin dashboard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// How many announcements the public listing returns.
pub const PUBLIC_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
  pub id:         i64,
  pub content:    String,
  pub created_at: DateTime<Utc>,
}

/// Trim announcement text, rejecting anything that is empty afterwards.
pub fn normalize_content(raw: &str) -> Result<String> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return Err(Error::EmptyContent);
  }
  Ok(trimmed.to_owned())
}
