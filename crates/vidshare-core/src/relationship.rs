//! Directed binary relationships: likes and subscriptions.
//!
//! A relationship carries no state beyond its existence. It is created and
//! destroyed by the toggle engine and never updated in place.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::id::{CommentId, TweetId, UserId, VideoId};

/// Discriminant stored in the `kind` column of the relationship table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
  VideoLike,
  CommentLike,
  TweetLike,
  /// subscriber → channel
  Subscription,
}

impl RelationKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::VideoLike => "video_like",
      Self::CommentLike => "comment_like",
      Self::TweetLike => "tweet_like",
      Self::Subscription => "subscription",
    }
  }
}

impl fmt::Display for RelationKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// The strongly-typed target of a toggle. The relationship kind follows from
/// the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
  Video(VideoId),
  Comment(CommentId),
  Tweet(TweetId),
  Channel(UserId),
}

impl Target {
  pub fn kind(&self) -> RelationKind {
    match self {
      Self::Video(_) => RelationKind::VideoLike,
      Self::Comment(_) => RelationKind::CommentLike,
      Self::Tweet(_) => RelationKind::TweetLike,
      Self::Channel(_) => RelationKind::Subscription,
    }
  }

  pub fn as_uuid(&self) -> Uuid {
    match self {
      Self::Video(id) => id.as_uuid(),
      Self::Comment(id) => id.as_uuid(),
      Self::Tweet(id) => id.as_uuid(),
      Self::Channel(id) => id.as_uuid(),
    }
  }
}

/// The uniqueness tuple of a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RelationshipKey {
  pub kind:   RelationKind,
  pub actor:  UserId,
  pub target: Uuid,
}

impl RelationshipKey {
  pub fn new(actor: UserId, target: Target) -> Self {
    Self { kind: target.kind(), actor, target: target.as_uuid() }
  }
}

/// Outcome of a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Toggled {
  Created,
  Deleted,
}

impl Toggled {
  pub fn is_created(&self) -> bool { matches!(self, Self::Created) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn kind_follows_target() {
    assert_eq!(Target::Video(VideoId::new()).kind(), RelationKind::VideoLike);
    assert_eq!(
      Target::Channel(UserId::new()).kind(),
      RelationKind::Subscription
    );
  }
}
