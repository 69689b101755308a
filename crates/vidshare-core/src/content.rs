//! Content resources: videos, tweets and comments.
//!
//! All three share one persisted shape: an id, a kind discriminant, an
//! exclusive owner, an optional parent (the video a comment belongs to), and a
//! kind-specific JSON payload. The [`Content`] trait is the seam that lets a
//! single store implementation and a single ownership-gated mutation engine
//! serve every kind.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::{
  id::{CommentId, TweetId, UserId, VideoId},
  identity::PublicProfile,
};

// ─── Kind ────────────────────────────────────────────────────────────────────

/// Discriminant stored in the `kind` column of the content table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
  Video,
  Tweet,
  Comment,
}

impl ContentKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Video => "video",
      Self::Tweet => "tweet",
      Self::Comment => "comment",
    }
  }
}

impl fmt::Display for ContentKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// A content resource with an exclusive owner.
pub trait Content:
  Serialize + DeserializeOwned + Clone + Send + Sync + 'static
{
  type Id: Copy
    + Eq
    + fmt::Display
    + Into<Uuid>
    + From<Uuid>
    + Send
    + Sync
    + 'static;

  const KIND: ContentKind;

  fn id(&self) -> Self::Id;
  fn owner(&self) -> UserId;
  /// The resource this one hangs off, if any.
  fn parent(&self) -> Option<Uuid> { None }
  /// Case-folded text that title searches match against.
  fn search_key(&self) -> Option<String> { None }
  fn created_at(&self) -> DateTime<Utc>;
  fn touch(&mut self, at: DateTime<Utc>);
}

// ─── Video ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
  pub video_id:     VideoId,
  pub owner:        UserId,
  /// Hosted media reference for the video stream.
  pub video_file:   String,
  pub thumbnail:    String,
  pub title:        String,
  pub description:  String,
  /// Seconds, as reported by the media host.
  pub duration:     f64,
  pub views:        u64,
  pub is_published: bool,
  pub created_at:   DateTime<Utc>,
  pub updated_at:   DateTime<Utc>,
}

impl Video {
  pub fn new(
    owner: UserId,
    title: String,
    description: String,
    video_file: String,
    thumbnail: String,
    duration: f64,
  ) -> Self {
    let now = Utc::now();
    Self {
      video_id: VideoId::new(),
      owner,
      video_file,
      thumbnail,
      title,
      description,
      duration,
      views: 0,
      is_published: true,
      created_at: now,
      updated_at: now,
    }
  }

  /// Whether `viewer` may see this video at all.
  pub fn visible_to(&self, viewer: UserId) -> bool {
    self.is_published || self.owner == viewer
  }
}

impl Content for Video {
  type Id = VideoId;

  const KIND: ContentKind = ContentKind::Video;

  fn id(&self) -> VideoId { self.video_id }

  fn owner(&self) -> UserId { self.owner }

  fn search_key(&self) -> Option<String> { Some(self.title.to_lowercase()) }

  fn created_at(&self) -> DateTime<Utc> { self.created_at }

  fn touch(&mut self, at: DateTime<Utc>) { self.updated_at = at; }
}

// ─── Tweet ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tweet {
  pub tweet_id:   TweetId,
  pub owner:      UserId,
  pub content:    String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Tweet {
  pub fn new(owner: UserId, content: String) -> Self {
    let now = Utc::now();
    Self { tweet_id: TweetId::new(), owner, content, created_at: now, updated_at: now }
  }
}

impl Content for Tweet {
  type Id = TweetId;

  const KIND: ContentKind = ContentKind::Tweet;

  fn id(&self) -> TweetId { self.tweet_id }

  fn owner(&self) -> UserId { self.owner }

  fn created_at(&self) -> DateTime<Utc> { self.created_at }

  fn touch(&mut self, at: DateTime<Utc>) { self.updated_at = at; }
}

// ─── Comment ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
  pub comment_id: CommentId,
  pub video:      VideoId,
  pub owner:      UserId,
  pub content:    String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Comment {
  pub fn new(video: VideoId, owner: UserId, content: String) -> Self {
    let now = Utc::now();
    Self {
      comment_id: CommentId::new(),
      video,
      owner,
      content,
      created_at: now,
      updated_at: now,
    }
  }
}

impl Content for Comment {
  type Id = CommentId;

  const KIND: ContentKind = ContentKind::Comment;

  fn id(&self) -> CommentId { self.comment_id }

  fn owner(&self) -> UserId { self.owner }

  fn parent(&self) -> Option<Uuid> { Some(self.video.as_uuid()) }

  fn created_at(&self) -> DateTime<Utc> { self.created_at }

  fn touch(&mut self, at: DateTime<Utc>) { self.updated_at = at; }
}

// ─── Listings ────────────────────────────────────────────────────────────────

/// A video joined with its owner's public projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoListing {
  pub video: Video,
  pub owner: PublicProfile,
}

/// A comment joined with its author's public projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentListing {
  pub comment: Comment,
  pub owner:   PublicProfile,
}
