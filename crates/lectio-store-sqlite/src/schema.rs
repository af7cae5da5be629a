//! SQL schemas for the lectio SQLite stores.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Device-side key-value table; idempotent thanks to `IF NOT EXISTS`.
pub const KV_SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Each value is written and read whole; no partial updates.
CREATE TABLE IF NOT EXISTS kv (
    key    TEXT PRIMARY KEY,
    value  TEXT NOT NULL
);

PRAGMA user_version = 1;
";

/// Server-side favorites table.
pub const FAVORITES_SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS user_favorites (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id         INTEGER NOT NULL,
    book_slug       TEXT    NOT NULL,
    chapter_id      TEXT    NOT NULL,   -- kept as text, as clients send it
    paragraph_index INTEGER NOT NULL,
    paragraph_text  TEXT    NOT NULL,
    created_at      TEXT    NOT NULL,   -- ISO 8601 UTC; server-assigned
    UNIQUE (user_id, book_slug, chapter_id, paragraph_index)
);

CREATE INDEX IF NOT EXISTS user_favorites_user_idx ON user_favorites(user_id);

PRAGMA user_version = 1;
";
