//! SQL schema for the Hearth SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One document per (user, card type). The UNIQUE pair is the upsert
-- conflict target.
CREATE TABLE IF NOT EXISTS card_contents (
    id          TEXT PRIMARY KEY,
    user_id     TEXT NOT NULL,
    card_type   TEXT NOT NULL CHECK (card_type IN (
                  'hero', 'reflection', 'habits', 'journal', 'quickstart', 'roadmap'
                )),
    content     TEXT NOT NULL,   -- JSON object
    created_at  TEXT NOT NULL,   -- ISO 8601 UTC; server-assigned
    updated_at  TEXT NOT NULL,
    UNIQUE (user_id, card_type)
);

-- Audit trail; strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS card_update_logs (
    id              TEXT PRIMARY KEY,
    card_content_id TEXT NOT NULL REFERENCES card_contents(id),
    updated_by      TEXT,
    update_source   TEXT NOT NULL,   -- 'api' | 'bulk_api'
    idempotency_key TEXT UNIQUE,     -- NULLs never collide
    request_data    TEXT NOT NULL,   -- verbatim request body
    created_at      TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS card_update_logs_card_idx
    ON card_update_logs(card_content_id);

PRAGMA user_version = 1;
";
