//! Partial updates applied by the ownership-gated mutation engine.
//!
//! Only fields that are present *and* non-blank overwrite the existing value;
//! a patch never clears a field.

use crate::{
  content::{Comment, Tweet, Video},
  identity::{User, normalise_handle},
};

/// A field-level change to a resource of type `R`.
pub trait Patch<R> {
  /// Apply the patch in place. Returns `true` if anything changed.
  fn apply(self, target: &mut R) -> bool;
}

/// Overwrite `slot` with the trimmed `value` if it is present and non-blank.
fn overwrite(slot: &mut String, value: Option<String>) -> bool {
  match value.as_deref().map(str::trim) {
    Some(v) if !v.is_empty() && slot.as_str() != v => {
      *slot = v.to_owned();
      true
    }
    _ => false,
  }
}

// ─── Video ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct VideoPatch {
  pub title:       Option<String>,
  pub description: Option<String>,
  /// Hosted reference of a freshly uploaded thumbnail.
  pub thumbnail:   Option<String>,
}

impl VideoPatch {
  pub fn is_empty(&self) -> bool {
    [&self.title, &self.description, &self.thumbnail]
      .iter()
      .all(|f| f.as_deref().is_none_or(|v| v.trim().is_empty()))
  }
}

impl Patch<Video> for VideoPatch {
  fn apply(self, video: &mut Video) -> bool {
    let a = overwrite(&mut video.title, self.title);
    let b = overwrite(&mut video.description, self.description);
    let c = overwrite(&mut video.thumbnail, self.thumbnail);
    a | b | c
  }
}

/// Negates the publication flag; the current value is the only input.
#[derive(Debug, Clone, Copy, Default)]
pub struct PublishToggle;

impl Patch<Video> for PublishToggle {
  fn apply(self, video: &mut Video) -> bool {
    video.is_published = !video.is_published;
    true
  }
}

// ─── Text content ────────────────────────────────────────────────────────────

/// Replaces the body of a tweet or comment.
#[derive(Debug, Clone, Default)]
pub struct TextPatch {
  pub content: Option<String>,
}

impl Patch<Tweet> for TextPatch {
  fn apply(self, tweet: &mut Tweet) -> bool {
    overwrite(&mut tweet.content, self.content)
  }
}

impl Patch<Comment> for TextPatch {
  fn apply(self, comment: &mut Comment) -> bool {
    overwrite(&mut comment.content, self.content)
  }
}

// ─── Account ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct AccountPatch {
  pub full_name: Option<String>,
  pub email:     Option<String>,
}

impl Patch<User> for AccountPatch {
  fn apply(self, user: &mut User) -> bool {
    let a = overwrite(&mut user.full_name, self.full_name.map(|n| n.trim().to_owned()));
    let b = overwrite(&mut user.email, self.email.map(|e| normalise_handle(&e)));
    a | b
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::id::UserId;

  fn video() -> Video {
    Video::new(
      UserId::new(),
      "Original".into(),
      "First cut".into(),
      "file".into(),
      "thumb-1".into(),
      12.0,
    )
  }

  #[test]
  fn only_present_fields_overwrite() {
    let mut v = video();
    let changed = VideoPatch {
      title: Some("Renamed".into()),
      ..Default::default()
    }
    .apply(&mut v);

    assert!(changed);
    assert_eq!(v.title, "Renamed");
    assert_eq!(v.description, "First cut");
    assert_eq!(v.thumbnail, "thumb-1");
  }

  #[test]
  fn overwritten_values_are_trimmed() {
    let mut v = video();
    let patch = VideoPatch { title: Some("  spaced  ".into()), ..Default::default() };
    assert!(patch.apply(&mut v));
    assert_eq!(v.title, "spaced");

    let again = VideoPatch { title: Some("spaced\n".into()), ..Default::default() };
    assert!(!again.apply(&mut v));
  }

  #[test]
  fn blank_fields_are_ignored() {
    let mut v = video();
    let patch = VideoPatch {
      title:       Some("   ".into()),
      description: Some(String::new()),
      thumbnail:   None,
    };
    assert!(patch.is_empty());
    assert!(!patch.apply(&mut v));
    assert_eq!(v.title, "Original");
  }

  #[test]
  fn publish_toggle_twice_is_identity() {
    let mut v = video();
    let before = v.is_published;
    PublishToggle.apply(&mut v);
    assert_eq!(v.is_published, !before);
    PublishToggle.apply(&mut v);
    assert_eq!(v.is_published, before);
  }

  #[test]
  fn account_patch_normalises_email() {
    let mut user = crate::identity::NewUser {
      username:      "bob".into(),
      email:         "bob@example.com".into(),
      full_name:     "Bob".into(),
      avatar:        "a".into(),
      cover_image:   None,
      password_hash: "h".into(),
    }
    .into_user();

    AccountPatch { full_name: None, email: Some(" Bob@Work.Example ".into()) }
      .apply(&mut user);
    assert_eq!(user.email, "bob@work.example");
    assert_eq!(user.full_name, "Bob");
  }
}
