//! The `SosStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `sosdesk-store-sqlite`).
//! The HTTP layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  announcement::Announcement,
  sos::{NewSos, SosRecord, SosStatus},
};

/// Abstraction over a sosdesk record store.
///
/// SOS records are insert-only apart from their status. Announcements are
/// plain CRUD.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait SosStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── SOS records ───────────────────────────────────────────────────────

  /// Persist a normalized submission. The store assigns `id` and
  /// `created_at`, and writes [`crate::sos::ANONYMOUS`] for a missing name.
  fn insert_sos(
    &self,
    input: NewSos,
  ) -> impl Future<Output = Result<SosRecord, Self::Error>> + Send + '_;

  /// All records, newest first.
  fn list_sos(
    &self,
  ) -> impl Future<Output = Result<Vec<SosRecord>, Self::Error>> + Send + '_;

  /// Set the status of a record. Returns `false` if `id` does not exist.
  fn update_status(
    &self,
    id: i64,
    status: SosStatus,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Announcements ─────────────────────────────────────────────────────

  fn add_announcement(
    &self,
    content: String,
  ) -> impl Future<Output = Result<Announcement, Self::Error>> + Send + '_;

  /// At most `limit` announcements, newest first.
  fn list_announcements(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Announcement>, Self::Error>> + Send + '_;

  /// Replace the content of an announcement. Returns `None` if not found.
  fn update_announcement(
    &self,
    id: i64,
    content: String,
  ) -> impl Future<Output = Result<Option<Announcement>, Self::Error>> + Send + '_;

  /// Returns `false` if `id` does not exist.
  fn delete_announcement(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
