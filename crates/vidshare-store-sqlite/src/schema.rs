//! SQL schema for the vidshare SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id            TEXT PRIMARY KEY,
    username           TEXT NOT NULL UNIQUE,   -- lower-cased
    email              TEXT NOT NULL UNIQUE,   -- lower-cased
    full_name          TEXT NOT NULL,
    avatar             TEXT NOT NULL,
    cover_image        TEXT,
    password_hash      TEXT NOT NULL,          -- argon2 PHC string
    refresh_token_hash TEXT,                   -- SHA-256 hex or NULL
    refresh_expires_at TEXT,
    created_at         TEXT NOT NULL,
    updated_at         TEXT NOT NULL
);

-- Access tokens, stored by SHA-256 digest.
CREATE TABLE IF NOT EXISTS sessions (
    token_hash TEXT PRIMARY KEY,
    user_id    TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    issued_at  TEXT NOT NULL,
    expires_at TEXT NOT NULL
);

-- Videos, tweets and comments share one table, tagged by kind.
-- The full resource lives in payload_json; the other columns are copies
-- used for filtering and joins.
CREATE TABLE IF NOT EXISTS contents (
    content_id   TEXT PRIMARY KEY,
    kind         TEXT NOT NULL,   -- 'video' | 'tweet' | 'comment'
    owner_id     TEXT NOT NULL REFERENCES users(user_id),
    parent_id    TEXT,            -- the video a comment belongs to
    payload_json TEXT NOT NULL,
    search_key   TEXT,            -- lower-cased video title
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL
);

-- Likes and subscriptions. A relationship is never updated in place; its
-- existence is the whole state. The UNIQUE constraint is what makes the
-- toggle safe under concurrent requests.
CREATE TABLE IF NOT EXISTS relationships (
    relationship_id TEXT PRIMARY KEY,
    kind            TEXT NOT NULL,   -- 'video_like' | 'comment_like' | 'tweet_like' | 'subscription'
    actor_id        TEXT NOT NULL,
    target_id       TEXT NOT NULL,
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL,
    UNIQUE (kind, actor_id, target_id)
);

CREATE TABLE IF NOT EXISTS watch_history (
    user_id    TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    video_id   TEXT NOT NULL,
    watched_at TEXT NOT NULL,
    PRIMARY KEY (user_id, video_id)
);

CREATE INDEX IF NOT EXISTS contents_kind_owner_idx  ON contents(kind, owner_id);
CREATE INDEX IF NOT EXISTS contents_parent_idx      ON contents(parent_id);
CREATE INDEX IF NOT EXISTS relationships_target_idx ON relationships(kind, target_id);
CREATE INDEX IF NOT EXISTS sessions_user_idx        ON sessions(user_id);
CREATE INDEX IF NOT EXISTS users_refresh_idx        ON users(refresh_token_hash);

PRAGMA user_version = 1;
";
