//! Strongly-typed identifiers.
//!
//! Every reference that enters the system from the outside is parsed into one
//! of these newtypes before it reaches a store call. A malformed value fails
//! with [`Error::InvalidIdentifier`] and never touches the database.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Error;

macro_rules! define_id {
  ($(#[$meta:meta])* $name:ident, $label:literal) => {
    $(#[$meta])*
    #[derive(
      Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
      Deserialize,
    )]
    #[serde(transparent)]
    pub struct $name(Uuid);

    impl $name {
      /// Human-readable name of the referenced kind, used in error messages.
      pub const LABEL: &'static str = $label;

      /// Mint a fresh random identifier.
      pub fn new() -> Self { Self(Uuid::new_v4()) }

      pub const fn from_uuid(id: Uuid) -> Self { Self(id) }

      pub const fn as_uuid(&self) -> Uuid { self.0 }
    }

    impl Default for $name {
      fn default() -> Self { Self::new() }
    }

    impl From<Uuid> for $name {
      fn from(id: Uuid) -> Self { Self(id) }
    }

    impl From<$name> for Uuid {
      fn from(id: $name) -> Self { id.0 }
    }

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
      }
    }

    impl FromStr for $name {
      type Err = Error;

      fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self).map_err(|_| {
          Error::InvalidIdentifier(format!("invalid {} id: {s:?}", $label))
        })
      }
    }
  };
}

define_id!(
  /// An identity (user / channel).
  UserId,
  "user"
);
define_id!(VideoId, "video");
define_id!(TweetId, "tweet");
define_id!(CommentId, "comment");
