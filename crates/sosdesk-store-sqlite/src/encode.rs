//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with a fixed microsecond width so
//! that lexical order in SQL matches chronological order. Statuses are stored
//! as their display form.

use chrono::{DateTime, SecondsFormat, Utc};
use sosdesk_core::{
  announcement::Announcement,
  sos::{SosRecord, SosStatus},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

/// The current time truncated to what [`encode_dt`] preserves, so a value
/// returned from an insert compares equal to the same row read back.
pub fn now() -> DateTime<Utc> {
  let now = Utc::now();
  decode_dt(&encode_dt(now)).unwrap_or(now)
}

// ─── SosStatus ───────────────────────────────────────────────────────────────

pub fn encode_status(s: SosStatus) -> &'static str { s.as_str() }

pub fn decode_status(s: &str) -> Result<SosStatus> { Ok(SosStatus::parse(s)?) }

// ─── Row types ───────────────────────────────────────────────────────────────

pub const SOS_COLUMNS: &str = "id, name, location, message, status, source, \
                               mobile_number, disaster_type, created_at";

/// Raw values read directly from a `sos_messages` row.
pub struct RawSos {
  pub id:            i64,
  pub name:          Option<String>,
  pub location:      String,
  pub message:       String,
  pub status:        String,
  pub source:        String,
  pub mobile_number: Option<String>,
  pub disaster_type: Option<String>,
  pub created_at:    String,
}

impl RawSos {
  /// Map a row selected with [`SOS_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      name:          row.get(1)?,
      location:      row.get(2)?,
      message:       row.get(3)?,
      status:        row.get(4)?,
      source:        row.get(5)?,
      mobile_number: row.get(6)?,
      disaster_type: row.get(7)?,
      created_at:    row.get(8)?,
    })
  }

  pub fn into_record(self) -> Result<SosRecord> {
    Ok(SosRecord {
      id:            self.id,
      name:          self.name,
      location:      self.location,
      message:       self.message,
      status:        decode_status(&self.status)?,
      source:        self.source,
      mobile_number: self.mobile_number,
      disaster_type: self.disaster_type,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

pub const ANNOUNCEMENT_COLUMNS: &str = "id, content, created_at";

/// Raw values read directly from an `announcements` row.
pub struct RawAnnouncement {
  pub id:         i64,
  pub content:    String,
  pub created_at: String,
}

impl RawAnnouncement {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      content:    row.get(1)?,
      created_at: row.get(2)?,
    })
  }

  pub fn into_announcement(self) -> Result<Announcement> {
    Ok(Announcement {
      id:         self.id,
      content:    self.content,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn timestamps_have_fixed_width() {
    let whole = Utc.with_ymd_and_hms(2025, 4, 1, 22, 0, 52).unwrap();
    assert_eq!(encode_dt(whole), "2025-04-01T22:00:52.000000Z");
    assert_eq!(decode_dt(&encode_dt(whole)).unwrap(), whole);
  }

  #[test]
  fn status_round_trips_through_display_form() {
    assert_eq!(encode_status(SosStatus::UnderReview), "Under Review");
    assert_eq!(decode_status("False Alarm").unwrap(), SosStatus::FalseAlarm);
    assert!(matches!(decode_status("Closed"), Err(Error::Core(_))));
  }
}
