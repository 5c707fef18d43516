//! [`SqliteStore`], the SQLite implementation of [`SosStore`].

use std::path::Path;

use sosdesk_core::{
  announcement::Announcement,
  sos::{ANONYMOUS, NewSos, SosRecord, SosStatus},
  store::SosStore,
};

use crate::{
  Result,
  encode::{
    ANNOUNCEMENT_COLUMNS, RawAnnouncement, RawSos, SOS_COLUMNS, encode_dt,
    encode_status, now,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A sosdesk record store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mainly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── SosStore impl ───────────────────────────────────────────────────────────

impl SosStore for SqliteStore {
  type Error = crate::Error;

  // ── SOS records ───────────────────────────────────────────────────────────

  async fn insert_sos(&self, input: NewSos) -> Result<SosRecord> {
    let created_at = now();
    let name       = input.name.unwrap_or_else(|| ANONYMOUS.to_owned());

    let name_col     = name.clone();
    let location     = input.location.clone();
    let message      = input.message.clone();
    let status_str   = encode_status(input.status);
    let source       = input.source.clone();
    let mobile       = input.mobile_number.clone();
    let disaster     = input.disaster_type.clone();
    let created_str  = encode_dt(created_at);

    let id: i64 = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sos_messages (
             name, location, message, status, source,
             mobile_number, disaster_type, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            name_col,
            location,
            message,
            status_str,
            source,
            mobile,
            disaster,
            created_str,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    tracing::debug!(id, source = %input.source, "inserted sos record");

    Ok(SosRecord {
      id,
      name: Some(name),
      location: input.location,
      message: input.message,
      status: input.status,
      source: input.source,
      mobile_number: input.mobile_number,
      disaster_type: input.disaster_type,
      created_at,
    })
  }

  async fn list_sos(&self) -> Result<Vec<SosRecord>> {
    let raws: Vec<RawSos> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SOS_COLUMNS} FROM sos_messages
           ORDER BY created_at DESC, id DESC"
        ))?;
        let rows = stmt
          .query_map([], RawSos::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSos::into_record).collect()
  }

  async fn update_status(&self, id: i64, status: SosStatus) -> Result<bool> {
    let status_str = encode_status(status);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE sos_messages SET status = ?1 WHERE id = ?2",
          rusqlite::params![status_str, id],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  // ── Announcements ─────────────────────────────────────────────────────────

  async fn add_announcement(&self, content: String) -> Result<Announcement> {
    let created_at  = now();
    let created_str = encode_dt(created_at);
    let content_col = content.clone();

    let id: i64 = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO announcements (content, created_at) VALUES (?1, ?2)",
          rusqlite::params![content_col, created_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Announcement { id, content, created_at })
  }

  async fn list_announcements(&self, limit: usize) -> Result<Vec<Announcement>> {
    let limit_val = i64::try_from(limit).unwrap_or(i64::MAX);

    let raws: Vec<RawAnnouncement> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ANNOUNCEMENT_COLUMNS} FROM announcements
           ORDER BY created_at DESC, id DESC
           LIMIT ?1"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![limit_val], RawAnnouncement::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAnnouncement::into_announcement).collect()
  }

  async fn update_announcement(
    &self,
    id:      i64,
    content: String,
  ) -> Result<Option<Announcement>> {
    let raw: Option<RawAnnouncement> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = tx.execute(
          "UPDATE announcements SET content = ?1 WHERE id = ?2",
          rusqlite::params![content, id],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        let raw = tx.query_row(
          &format!("SELECT {ANNOUNCEMENT_COLUMNS} FROM announcements WHERE id = ?1"),
          rusqlite::params![id],
          RawAnnouncement::from_row,
        )?;
        tx.commit()?;
        Ok(Some(raw))
      })
      .await?;

    raw.map(RawAnnouncement::into_announcement).transpose()
  }

  async fn delete_announcement(&self, id: i64) -> Result<bool> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM announcements WHERE id = ?1",
          rusqlite::params![id],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }
}
