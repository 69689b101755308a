//! Handlers for `/likes` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/likes/toggle/v/{videoId}` | 201 when liked, 200 when unliked |
//! | `POST` | `/likes/toggle/c/{commentId}` | |
//! | `POST` | `/likes/toggle/t/{tweetId}` | |
//! | `GET`  | `/likes/videos` | Videos the caller likes, most recent first |

use axum::extract::{Path, State};
use serde::Serialize;
use vidshare_core::{
  content::VideoListing,
  id::{CommentId, TweetId, UserId, VideoId},
  media::MediaHost,
  relationship::{Target, Toggled},
  store::Store,
  toggle,
};

use crate::{AppState, auth::AuthUser, envelope::ApiResponse, error::ApiError};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeState {
  pub is_liked:    bool,
  pub likes_count: u64,
}

/// Flip the like and report the resulting state. `noun` names the target in
/// the message.
async fn flip<S: Store>(
  store: &S,
  actor: UserId,
  target: Target,
  noun: &str,
) -> Result<ApiResponse<LikeState>, ApiError> {
  let outcome = toggle::toggle(store, actor, target).await?;
  let likes_count = store
    .count_by_target(target.kind(), target.as_uuid())
    .await
    .map_err(ApiError::store)?;

  let state = LikeState { is_liked: outcome.is_created(), likes_count };
  Ok(match outcome {
    Toggled::Created => ApiResponse::created(state, format!("{noun} liked successfully")),
    Toggled::Deleted => ApiResponse::ok(state, format!("{noun} unliked successfully")),
  })
}

/// `POST /likes/toggle/v/{videoId}`
pub async fn toggle_video<S, M>(
  State(state): State<AppState<S, M>>,
  AuthUser { user, .. }: AuthUser,
  Path(video_id): Path<String>,
) -> Result<ApiResponse<LikeState>, ApiError>
where
  S: Store,
  M: MediaHost,
{
  let id: VideoId = video_id.parse()?;
  flip(&*state.store, user.user_id, Target::Video(id), "video").await
}

/// `POST /likes/toggle/c/{commentId}`
pub async fn toggle_comment<S, M>(
  State(state): State<AppState<S, M>>,
  AuthUser { user, .. }: AuthUser,
  Path(comment_id): Path<String>,
) -> Result<ApiResponse<LikeState>, ApiError>
where
  S: Store,
  M: MediaHost,
{
  let id: CommentId = comment_id.parse()?;
  flip(&*state.store, user.user_id, Target::Comment(id), "comment").await
}

/// `POST /likes/toggle/t/{tweetId}`
pub async fn toggle_tweet<S, M>(
  State(state): State<AppState<S, M>>,
  AuthUser { user, .. }: AuthUser,
  Path(tweet_id): Path<String>,
) -> Result<ApiResponse<LikeState>, ApiError>
where
  S: Store,
  M: MediaHost,
{
  let id: TweetId = tweet_id.parse()?;
  flip(&*state.store, user.user_id, Target::Tweet(id), "tweet").await
}

/// `GET /likes/videos`
pub async fn liked_videos<S, M>(
  State(state): State<AppState<S, M>>,
  AuthUser { user, .. }: AuthUser,
) -> Result<ApiResponse<Vec<VideoListing>>, ApiError>
where
  S: Store,
  M: MediaHost,
{
  let videos = state
    .store
    .liked_videos(user.user_id)
    .await
    .map_err(ApiError::store)?;
  Ok(ApiResponse::ok(videos, "liked videos fetched successfully"))
}
