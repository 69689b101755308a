//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with fixed microsecond precision
//! so that they sort lexicographically. UUIDs are stored as hyphenated
//! lowercase strings. Content payloads are stored as compact JSON.

use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;
use vidshare_core::{
  content::{Content, ContentKind},
  identity::{PublicProfile, RefreshCredential, Session, User},
  relationship::RelationKind,
};

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: impl Into<Uuid>) -> String { id.into().hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Kinds ────────────────────────────────────────────────────────────────────

pub fn encode_content_kind(k: ContentKind) -> &'static str { k.as_str() }

pub fn encode_relation_kind(k: RelationKind) -> &'static str { k.as_str() }

// ─── Content payload ─────────────────────────────────────────────────────────

pub fn encode_payload<R: Content>(resource: &R) -> Result<String> {
  Ok(serde_json::to_string(resource)?)
}

pub fn decode_payload<R: Content>(s: &str) -> Result<R> { Ok(serde_json::from_str(s)?) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawUser`], for `SELECT` statements.
pub const USER_COLUMNS: &str = "u.user_id, u.username, u.email, u.full_name, u.avatar, \
   u.cover_image, u.password_hash, u.refresh_token_hash, u.refresh_expires_at, \
   u.created_at, u.updated_at";

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:            String,
  pub username:           String,
  pub email:              String,
  pub full_name:          String,
  pub avatar:             String,
  pub cover_image:        Option<String>,
  pub password_hash:      String,
  pub refresh_token_hash: Option<String>,
  pub refresh_expires_at: Option<String>,
  pub created_at:         String,
  pub updated_at:         String,
}

impl RawUser {
  /// Read from a row selected with [`USER_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:            row.get(0)?,
      username:           row.get(1)?,
      email:              row.get(2)?,
      full_name:          row.get(3)?,
      avatar:             row.get(4)?,
      cover_image:        row.get(5)?,
      password_hash:      row.get(6)?,
      refresh_token_hash: row.get(7)?,
      refresh_expires_at: row.get(8)?,
      created_at:         row.get(9)?,
      updated_at:         row.get(10)?,
    })
  }

  /// Decode into a [`User`]. The watch history is attached separately.
  pub fn into_user(self, watch_history: Vec<String>) -> Result<User> {
    let refresh = match (self.refresh_token_hash, self.refresh_expires_at) {
      (Some(token_hash), Some(at)) => Some(RefreshCredential {
        token_hash,
        expires_at: decode_dt(&at)?,
      }),
      _ => None,
    };

    Ok(User {
      user_id: decode_uuid(&self.user_id)?.into(),
      username: self.username,
      email: self.email,
      full_name: self.full_name,
      avatar: self.avatar,
      cover_image: self.cover_image,
      watch_history: watch_history
        .iter()
        .map(|s| decode_uuid(s).map(Into::into))
        .collect::<Result<_>>()?,
      password_hash: self.password_hash,
      refresh,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Column list matching [`RawProfile`].
pub const PROFILE_COLUMNS: &str = "u.user_id, u.username, u.full_name, u.avatar";

/// The public projection columns of a `users` row.
pub struct RawProfile {
  pub user_id:   String,
  pub username:  String,
  pub full_name: String,
  pub avatar:    String,
}

impl RawProfile {
  /// Read four consecutive columns starting at `offset`.
  pub fn from_row(row: &rusqlite::Row<'_>, offset: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:   row.get(offset)?,
      username:  row.get(offset + 1)?,
      full_name: row.get(offset + 2)?,
      avatar:    row.get(offset + 3)?,
    })
  }

  pub fn into_profile(self) -> Result<PublicProfile> {
    Ok(PublicProfile {
      user_id:   decode_uuid(&self.user_id)?.into(),
      username:  self.username,
      full_name: self.full_name,
      avatar:    self.avatar,
    })
  }
}

/// A content payload joined with its owner's public projection.
pub struct RawJoined {
  pub payload: String,
  pub owner:   RawProfile,
}

impl RawJoined {
  /// Read `payload_json` at column 0 followed by [`PROFILE_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self { payload: row.get(0)?, owner: RawProfile::from_row(row, 1)? })
  }

  pub fn decode<R: Content>(self) -> Result<(R, PublicProfile)> {
    Ok((decode_payload(&self.payload)?, self.owner.into_profile()?))
  }
}

/// Raw strings read directly from a `sessions` row.
pub struct RawSession {
  pub token_hash: String,
  pub user_id:    String,
  pub issued_at:  String,
  pub expires_at: String,
}

impl RawSession {
  pub fn into_session(self) -> Result<Session> {
    Ok(Session {
      token_hash: self.token_hash,
      user_id:    decode_uuid(&self.user_id)?.into(),
      issued_at:  decode_dt(&self.issued_at)?,
      expires_at: decode_dt(&self.expires_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn timestamps_sort_lexicographically() {
    let a = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    let b = Utc.timestamp_opt(1_700_000_000, 500_000_000).unwrap();
    let c = Utc.timestamp_opt(1_700_000_001, 0).unwrap();
    let (ea, eb, ec) = (encode_dt(a), encode_dt(b), encode_dt(c));
    assert!(ea < eb && eb < ec, "{ea} {eb} {ec}");
    assert_eq!(decode_dt(&eb).unwrap(), b);
  }
}
