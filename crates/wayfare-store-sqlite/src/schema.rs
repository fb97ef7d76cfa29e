//! SQL schema for the Wayfare SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS principals (
    principal_id        INTEGER PRIMARY KEY AUTOINCREMENT,
    external_subject_id TEXT    NOT NULL UNIQUE,
    email               TEXT    UNIQUE,          -- NULLs never collide
    display_name        TEXT,
    avatar_url          TEXT,
    email_verified      INTEGER NOT NULL DEFAULT 0,
    role                TEXT    NOT NULL DEFAULT 'user'
                        CHECK (role IN ('user', 'admin')),
    created_at          TEXT    NOT NULL         -- ISO 8601 UTC
);

-- One row per (actor, kind, target). Rows are inserted and deleted, never
-- updated.
CREATE TABLE IF NOT EXISTS engagements (
    engagement_id INTEGER PRIMARY KEY AUTOINCREMENT,
    actor_id      INTEGER NOT NULL
                  REFERENCES principals(principal_id) ON DELETE CASCADE,
    kind          TEXT    NOT NULL
                  CHECK (kind IN ('like', 'scrap', 'bookmark')),
    target_type   TEXT    NOT NULL
                  CHECK (target_type IN ('content_a', 'content_b', 'place')),
    target_id     INTEGER NOT NULL,
    created_at    TEXT    NOT NULL,
    UNIQUE (actor_id, kind, target_type, target_id)
);

CREATE INDEX IF NOT EXISTS engagements_target_idx
    ON engagements(target_type, target_id);
CREATE INDEX IF NOT EXISTS engagements_actor_idx
    ON engagements(actor_id);

PRAGMA user_version = 1;
";
