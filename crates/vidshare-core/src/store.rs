//! Store traits.
//!
//! The traits are implemented by storage backends (e.g.
//! `vidshare-store-sqlite`). The engines in this crate and the HTTP layer in
//! `vidshare-api` depend on these abstractions, not on any concrete backend.
//!
//! All methods return `Send` futures so the traits can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`).

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::{
  content::{Comment, CommentListing, Content, Tweet, Video, VideoListing},
  id::{UserId, VideoId},
  identity::{PublicProfile, Session, User},
  page::{Page, PageRequest, VideoQuery},
  relationship::{RelationKind, RelationshipKey, Toggled},
};

// ─── Backend ─────────────────────────────────────────────────────────────────

/// Shared error type of a backend. The conversion into [`crate::Error`] is
/// where a backend maps its uniqueness violations to `Conflict`.
pub trait Backend: Send + Sync + 'static {
  type Error: std::error::Error + Send + Sync + 'static + Into<crate::Error>;
}

// ─── Identities ──────────────────────────────────────────────────────────────

pub trait IdentityStore: Backend {
  /// Persist a new identity. Duplicate handle or address is a conflict.
  fn create_user<'a>(
    &'a self,
    user: &'a User,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn get_user(
    &self,
    id: UserId,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Find an identity whose handle equals `username` or whose address equals
  /// `email`. Both inputs are compared normalised.
  fn find_user<'a>(
    &'a self,
    username: Option<&'a str>,
    email: Option<&'a str>,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  /// The identity whose current refresh credential has digest `token_hash`.
  fn find_user_by_refresh<'a>(
    &'a self,
    token_hash: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  /// Overwrite the identity's profile and credential columns. The watch
  /// history is maintained separately via [`IdentityStore::record_watch`].
  fn update_user<'a>(
    &'a self,
    user: &'a User,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn create_session<'a>(
    &'a self,
    session: &'a Session,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn find_session<'a>(
    &'a self,
    token_hash: &'a str,
  ) -> impl Future<Output = Result<Option<Session>, Self::Error>> + Send + 'a;

  /// Drop every access token of `user`, except `keep` if given.
  fn revoke_sessions<'a>(
    &'a self,
    user: UserId,
    keep: Option<&'a str>,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + 'a;

  /// Move `video` to the front of `user`'s watch history.
  fn record_watch(
    &self,
    user: UserId,
    video: VideoId,
    at: DateTime<Utc>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// The watch history of `user`, most recent first, joined with owners.
  fn watch_history(
    &self,
    user: UserId,
  ) -> impl Future<Output = Result<Vec<VideoListing>, Self::Error>> + Send + '_;
}

// ─── Content ─────────────────────────────────────────────────────────────────

/// Persistence for one content kind.
pub trait ContentStore<R: Content>: Backend {
  fn insert<'a>(
    &'a self,
    resource: &'a R,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn get(
    &self,
    id: R::Id,
  ) -> impl Future<Output = Result<Option<R>, Self::Error>> + Send + '_;

  fn update<'a>(
    &'a self,
    resource: &'a R,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Delete the resource together with the relationships targeting it.
  /// Returns `false` if nothing was deleted.
  fn delete(
    &self,
    id: R::Id,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}

// ─── Relationships ───────────────────────────────────────────────────────────

pub trait RelationshipStore: Backend {
  /// Atomically delete the relationship if it exists, otherwise create it.
  ///
  /// Implementations must rely on a uniqueness constraint over
  /// `(kind, actor, target)`; a duplicate insert observed under a race is a
  /// no-op reported as [`Toggled::Created`].
  fn toggle_relationship(
    &self,
    key: RelationshipKey,
  ) -> impl Future<Output = Result<Toggled, Self::Error>> + Send + '_;

  fn has_relationship(
    &self,
    key: RelationshipKey,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// How many actors hold a relationship of `kind` to `target`.
  fn count_by_target(
    &self,
    kind: RelationKind,
    target: uuid::Uuid,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// How many relationships of `kind` `actor` holds.
  fn count_by_actor(
    &self,
    kind: RelationKind,
    actor: UserId,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}

// ─── Catalog reads ───────────────────────────────────────────────────────────

/// Joined reads used by the listing endpoints.
pub trait Catalog: Backend {
  fn list_videos<'a>(
    &'a self,
    query: &'a VideoQuery,
  ) -> impl Future<Output = Result<Page<VideoListing>, Self::Error>> + Send + 'a;

  fn video_listing(
    &self,
    id: VideoId,
  ) -> impl Future<Output = Result<Option<VideoListing>, Self::Error>> + Send + '_;

  /// Increment the view counter. Returns the new count, `None` if missing.
  fn add_view(
    &self,
    id: VideoId,
  ) -> impl Future<Output = Result<Option<u64>, Self::Error>> + Send + '_;

  /// Videos `user` likes, most recently liked first.
  fn liked_videos(
    &self,
    user: UserId,
  ) -> impl Future<Output = Result<Vec<VideoListing>, Self::Error>> + Send + '_;

  /// Tweets owned by `owner`, newest first.
  fn list_tweets(
    &self,
    owner: UserId,
  ) -> impl Future<Output = Result<Vec<Tweet>, Self::Error>> + Send + '_;

  /// Comments on `video`, newest first.
  fn list_comments(
    &self,
    video: VideoId,
    page: PageRequest,
  ) -> impl Future<Output = Result<Page<CommentListing>, Self::Error>> + Send + '_;

  /// Identities subscribed to `channel`.
  fn subscribers(
    &self,
    channel: UserId,
  ) -> impl Future<Output = Result<Vec<PublicProfile>, Self::Error>> + Send + '_;

  /// Channels `subscriber` subscribes to.
  fn subscribed_channels(
    &self,
    subscriber: UserId,
  ) -> impl Future<Output = Result<Vec<PublicProfile>, Self::Error>> + Send + '_;
}

// ─── Everything ──────────────────────────────────────────────────────────────

/// A backend implementing every store trait.
pub trait Store:
  IdentityStore
  + RelationshipStore
  + Catalog
  + ContentStore<Video>
  + ContentStore<Tweet>
  + ContentStore<Comment>
{
}

impl<T> Store for T where
  T: IdentityStore
    + RelationshipStore
    + Catalog
    + ContentStore<Video>
    + ContentStore<Tweet>
    + ContentStore<Comment>
{
}

/// Lift a backend error into the domain error.
pub(crate) fn lift<E: Into<crate::Error>>(e: E) -> crate::Error { e.into() }
