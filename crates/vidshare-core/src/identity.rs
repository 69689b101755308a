//! Identities, their credentials, and the public projections shown to others.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{UserId, VideoId};

// ─── Identity ────────────────────────────────────────────────────────────────

/// The refresh credential held by an identity between login and logout.
///
/// Only the SHA-256 digest of the token is kept; the token itself is handed to
/// the client once and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshCredential {
  pub token_hash: String,
  pub expires_at: DateTime<Utc>,
}

/// A registered user. Doubles as a "channel" when it owns videos.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub user_id:       UserId,
  /// Unique, lower-cased handle.
  pub username:      String,
  /// Unique, lower-cased contact address.
  pub email:         String,
  pub full_name:     String,
  pub avatar:        String,
  pub cover_image:   Option<String>,
  /// Most recently watched first.
  pub watch_history: Vec<VideoId>,
  /// argon2 PHC string; never serialised.
  #[serde(skip)]
  pub password_hash: String,
  #[serde(skip)]
  pub refresh:       Option<RefreshCredential>,
  pub created_at:    DateTime<Utc>,
  pub updated_at:    DateTime<Utc>,
}

impl User {
  /// The reduced projection joined onto listings.
  pub fn profile(&self) -> PublicProfile {
    PublicProfile {
      user_id:   self.user_id,
      username:  self.username.clone(),
      full_name: self.full_name.clone(),
      avatar:    self.avatar.clone(),
    }
  }
}

/// Input to registration. The password must already be hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub username:      String,
  pub email:         String,
  pub full_name:     String,
  pub avatar:        String,
  pub cover_image:   Option<String>,
  pub password_hash: String,
}

impl NewUser {
  /// Build the persisted record, normalising handle and address.
  pub fn into_user(self) -> User {
    let now = Utc::now();
    User {
      user_id:       UserId::new(),
      username:      normalise_handle(&self.username),
      email:         normalise_handle(&self.email),
      full_name:     self.full_name.trim().to_owned(),
      avatar:        self.avatar,
      cover_image:   self.cover_image,
      watch_history: Vec::new(),
      password_hash: self.password_hash,
      refresh:       None,
      created_at:    now,
      updated_at:    now,
    }
  }
}

/// Handles and addresses are compared trimmed and lower-cased.
pub fn normalise_handle(s: &str) -> String { s.trim().to_lowercase() }

// ─── Projections ─────────────────────────────────────────────────────────────

/// The public identity fields of an owner, subscriber, or channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
  pub user_id:   UserId,
  pub username:  String,
  pub full_name: String,
  pub avatar:    String,
}

/// A channel page as seen by a particular viewer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelProfile {
  #[serde(flatten)]
  pub profile:                     PublicProfile,
  pub cover_image:                 Option<String>,
  pub subscribers_count:           u64,
  pub channels_subscribed_to_count: u64,
  /// Whether the viewer subscribes to this channel.
  pub is_subscribed:               bool,
}

// ─── Sessions ────────────────────────────────────────────────────────────────

/// An issued access token, stored by digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
  pub token_hash: String,
  pub user_id:    UserId,
  pub issued_at:  DateTime<Utc>,
  pub expires_at: DateTime<Utc>,
}

impl Session {
  pub fn is_expired(&self, now: DateTime<Utc>) -> bool { self.expires_at <= now }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn new_user() -> NewUser {
    NewUser {
      username:      "  Alice ".into(),
      email:         "Alice@Example.COM".into(),
      full_name:     " Alice Liddell ".into(),
      avatar:        "http://media/avatar.png".into(),
      cover_image:   None,
      password_hash: "$argon2id$stub".into(),
    }
  }

  #[test]
  fn into_user_normalises_handle_and_email() {
    let user = new_user().into_user();
    assert_eq!(user.username, "alice");
    assert_eq!(user.email, "alice@example.com");
    assert_eq!(user.full_name, "Alice Liddell");
    assert!(user.watch_history.is_empty());
    assert!(user.refresh.is_none());
  }

  #[test]
  fn serialised_user_hides_credentials() {
    let user = new_user().into_user();
    let json = serde_json::to_value(&user).unwrap();
    assert!(json.get("passwordHash").is_none());
    assert!(json.get("refresh").is_none());
    assert_eq!(json["username"], "alice");
  }

  #[test]
  fn session_expiry_is_inclusive() {
    let now = Utc::now();
    let session = Session {
      token_hash: "x".into(),
      user_id:    UserId::new(),
      issued_at:  now,
      expires_at: now,
    };
    assert!(session.is_expired(now));
  }
}
