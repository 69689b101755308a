//! Handlers for `/comments` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/comments/{videoId}` | `?page&limit`; newest first |
//! | `POST`  | `/comments/{videoId}` | Body: `{"content"}`; returns 201 |
//! | `PATCH` | `/comments/c/{commentId}` | Body: `{"content"}`; author only |
//! | `DELETE`| `/comments/c/{commentId}` | Author only |

use axum::extract::{Path, State};
use serde::Deserialize;
use serde_json::{Value, json};
use vidshare_core::{
  Error as CoreError,
  content::{Comment, CommentListing, Video},
  id::{CommentId, UserId, VideoId},
  media::MediaHost,
  mutation::{self, required},
  page::Page,
  patch::TextPatch,
  store::{ContentStore, Store},
};

use crate::{
  AppState,
  auth::AuthUser,
  envelope::ApiResponse,
  error::ApiError,
  form::{JsonBody, QueryParams},
  tweets::ContentBody,
};

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
  pub page:  Option<String>,
  pub limit: Option<String>,
}

/// The video `id`, provided `viewer` may see it.
async fn visible_video<S: Store>(
  store: &S,
  viewer: UserId,
  id: VideoId,
) -> Result<Video, ApiError> {
  let video = ContentStore::<Video>::get(store, id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| CoreError::NotFound("video not found".to_owned()))?;
  if !video.visible_to(viewer) {
    return Err(ApiError(CoreError::Forbidden("this video is not published".to_owned())));
  }
  Ok(video)
}

/// `GET /comments/{videoId}`
pub async fn list<S, M>(
  State(state): State<AppState<S, M>>,
  AuthUser { user, .. }: AuthUser,
  Path(video_id): Path<String>,
  QueryParams(params): QueryParams<PageParams>,
) -> Result<ApiResponse<Page<CommentListing>>, ApiError>
where
  S: Store,
  M: MediaHost,
{
  let id: VideoId = video_id.parse()?;
  let page = state.page_request(params.page.as_deref(), params.limit.as_deref())?;
  visible_video(&*state.store, user.user_id, id).await?;

  let comments = state
    .store
    .list_comments(id, page)
    .await
    .map_err(ApiError::store)?;
  Ok(ApiResponse::ok(comments, "comments fetched successfully"))
}

/// `POST /comments/{videoId}`
pub async fn create<S, M>(
  State(state): State<AppState<S, M>>,
  AuthUser { user, .. }: AuthUser,
  Path(video_id): Path<String>,
  JsonBody(body): JsonBody<ContentBody>,
) -> Result<ApiResponse<Comment>, ApiError>
where
  S: Store,
  M: MediaHost,
{
  let id: VideoId = video_id.parse()?;
  let content = required("content", body.content)?;
  visible_video(&*state.store, user.user_id, id).await?;

  let comment = Comment::new(id, user.user_id, content);
  ContentStore::<Comment>::insert(&*state.store, &comment)
    .await
    .map_err(ApiError::store)?;
  Ok(ApiResponse::created(comment, "comment added successfully"))
}

/// `PATCH /comments/c/{commentId}`
pub async fn update<S, M>(
  State(state): State<AppState<S, M>>,
  AuthUser { user, .. }: AuthUser,
  Path(comment_id): Path<String>,
  JsonBody(body): JsonBody<ContentBody>,
) -> Result<ApiResponse<Comment>, ApiError>
where
  S: Store,
  M: MediaHost,
{
  let id: CommentId = comment_id.parse()?;
  let content = required("content", body.content)?;
  let comment = mutation::mutate::<S, Comment, _>(
    &*state.store,
    user.user_id,
    id,
    TextPatch { content: Some(content) },
  )
  .await?;
  Ok(ApiResponse::ok(comment, "comment updated successfully"))
}

/// `DELETE /comments/c/{commentId}`
pub async fn delete_one<S, M>(
  State(state): State<AppState<S, M>>,
  AuthUser { user, .. }: AuthUser,
  Path(comment_id): Path<String>,
) -> Result<ApiResponse<Value>, ApiError>
where
  S: Store,
  M: MediaHost,
{
  let id: CommentId = comment_id.parse()?;
  mutation::remove::<S, Comment>(&*state.store, user.user_id, id).await?;
  Ok(ApiResponse::ok(json!({}), "comment deleted successfully"))
}
