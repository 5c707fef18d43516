//! SQL schema for the sosdesk SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Rows are never deleted; only `status` is ever updated.
CREATE TABLE IF NOT EXISTS sos_messages (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    name          TEXT DEFAULT 'Anonymous',
    location      TEXT NOT NULL CHECK (length(trim(location)) > 0),
    message       TEXT NOT NULL CHECK (length(trim(message)) > 0),
    status        TEXT NOT NULL DEFAULT 'Pending'
                  CHECK (status IN ('Pending', 'Under Review', 'Resolved', 'False Alarm')),
    source        TEXT NOT NULL DEFAULT 'web',
    mobile_number TEXT,
    disaster_type TEXT,
    created_at    TEXT NOT NULL   -- RFC 3339 UTC, fixed microsecond width
);

CREATE TABLE IF NOT EXISTS announcements (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    content    TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS sos_created_idx          ON sos_messages(created_at);
CREATE INDEX IF NOT EXISTS announcements_created_idx ON announcements(created_at);

PRAGMA user_version = 1;
";
