//! SOS records: the unit of work triaged by the admin dashboard.
//!
//! A record is written once by the intake path and afterwards only its
//! `status` ever changes. Records are never deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr, VariantArray};

use crate::{Error, Result};

/// Stored in place of a missing reporter name.
pub const ANONYMOUS: &str = "Anonymous";

// ─── Status ──────────────────────────────────────────────────────────────────

/// Triage state of a record. The display string is also the wire and column
/// representation, e.g. `"Under Review"`.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  IntoStaticStr,
  VariantArray,
)]
pub enum SosStatus {
  #[default]
  Pending,
  #[serde(rename = "Under Review")]
  #[strum(serialize = "Under Review")]
  UnderReview,
  Resolved,
  #[serde(rename = "False Alarm")]
  #[strum(serialize = "False Alarm")]
  FalseAlarm,
}

impl SosStatus {
  /// Exact, case-sensitive parse of the display form.
  pub fn parse(s: &str) -> Result<Self> {
    s.parse().map_err(|_| Error::InvalidStatus(s.to_owned()))
  }

  pub fn as_str(self) -> &'static str { self.into() }

  /// Comma-separated list of every accepted status, in triage order.
  pub fn allowed_list() -> String {
    Self::VARIANTS
      .iter()
      .map(|s| s.as_str())
      .collect::<Vec<_>>()
      .join(", ")
  }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// A persisted SOS report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SosRecord {
  pub id:            i64,
  pub name:          Option<String>,
  /// Free-text address, or `"Lat: …, Lng: …"` for structured submissions.
  pub location:      String,
  pub message:       String,
  pub status:        SosStatus,
  /// Ingestion path tag, e.g. `"web"` or `"api_structured"`.
  pub source:        String,
  pub mobile_number: Option<String>,
  pub disaster_type: Option<String>,
  /// Server-assigned; never changes after creation.
  pub created_at:    DateTime<Utc>,
}

/// Input to [`crate::store::SosStore::insert_sos`], produced by the intake
/// normalizer. `id` and `created_at` are always assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewSos {
  /// `None` is persisted as [`ANONYMOUS`].
  pub name:          Option<String>,
  pub location:      String,
  pub message:       String,
  pub status:        SosStatus,
  pub source:        String,
  pub mobile_number: Option<String>,
  pub disaster_type: Option<String>,
}

impl NewSos {
  /// A `Pending` record with every optional field unset.
  pub fn new(
    location: impl Into<String>,
    message: impl Into<String>,
    source: impl Into<String>,
  ) -> Self {
    Self {
      name:          None,
      location:      location.into(),
      message:       message.into(),
      status:        SosStatus::Pending,
      source:        source.into(),
      mobile_number: None,
      disaster_type: None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn status_display_matches_wire_form() {
    assert_eq!(SosStatus::UnderReview.to_string(), "Under Review");
    assert_eq!(SosStatus::FalseAlarm.as_str(), "False Alarm");
    assert_eq!(
      serde_json::to_value(SosStatus::UnderReview).unwrap(),
      serde_json::json!("Under Review")
    );
  }

  #[test]
  fn status_parse_is_exact() {
    assert_eq!(SosStatus::parse("Resolved").unwrap(), SosStatus::Resolved);
    assert_eq!(
      SosStatus::parse("False Alarm").unwrap(),
      SosStatus::FalseAlarm
    );
    assert!(matches!(
      SosStatus::parse("resolved"),
      Err(Error::InvalidStatus(s)) if s == "resolved"
    ));
    assert!(SosStatus::parse("UnderReview").is_err());
    assert!(SosStatus::parse("").is_err());
  }

  #[test]
  fn allowed_list_is_in_triage_order() {
    assert_eq!(
      SosStatus::allowed_list(),
      "Pending, Under Review, Resolved, False Alarm"
    );
  }

  #[test]
  fn new_sos_starts_pending() {
    let sos = NewSos::new("Dock 4", "water rising", "web");
    assert_eq!(sos.status, SosStatus::Pending);
    assert!(sos.name.is_none());
  }
}
