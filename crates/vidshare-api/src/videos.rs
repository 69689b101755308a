//! Handlers for `/videos` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/videos` | `?page&limit&query&sortBy&sortType&userId` |
//! | `POST`  | `/videos` | Multipart: `title`, `description`, `videoFile` and `thumbnail` files, optional `duration` |
//! | `GET`   | `/videos/{videoId}` | Counts a view and records watch history |
//! | `PATCH` | `/videos/{videoId}` | Multipart: `title`?, `description`?, `thumbnail` file? |
//! | `DELETE`| `/videos/{videoId}` | Owner only; discards hosted assets |
//! | `PATCH` | `/videos/toggle/publish/{videoId}` | Body-less; owner only |

use axum::extract::{Multipart, Path, State, multipart::MultipartRejection};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use vidshare_core::{
  Error as CoreError,
  content::{Video, VideoListing},
  id::{UserId, VideoId},
  media::{MediaHost, MediaKind},
  mutation::{self, NewVideoForm},
  page::{Page, SortField, SortOrder, VideoQuery},
  patch::VideoPatch,
  relationship::{RelationKind, RelationshipKey, Target},
  store::Store,
  toggle,
};

use crate::{
  AppState,
  auth::AuthUser,
  envelope::ApiResponse,
  error::ApiError,
  form::{Form, QueryParams},
};

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
  pub page:      Option<String>,
  pub limit:     Option<String>,
  /// Case-insensitive title substring.
  pub query:     Option<String>,
  pub sort_by:   Option<String>,
  /// `asc`; anything else sorts descending.
  pub sort_type: Option<String>,
  pub user_id:   Option<String>,
}

/// `GET /videos`. Unpublished videos are included only when the caller
/// lists their own channel.
pub async fn list<S, M>(
  State(state): State<AppState<S, M>>,
  AuthUser { user, .. }: AuthUser,
  QueryParams(params): QueryParams<ListParams>,
) -> Result<ApiResponse<Page<VideoListing>>, ApiError>
where
  S: Store,
  M: MediaHost,
{
  let page = state.page_request(params.page.as_deref(), params.limit.as_deref())?;
  let owner = params
    .user_id
    .as_deref()
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(str::parse::<UserId>)
    .transpose()?;
  let sort = params
    .sort_by
    .as_deref()
    .filter(|s| !s.trim().is_empty())
    .map(SortField::parse)
    .transpose()?
    .unwrap_or_default();

  let query = VideoQuery {
    title: params.query,
    owner,
    published_only: owner != Some(user.user_id),
    sort,
    order: SortOrder::parse(params.sort_type.as_deref()),
    page,
  };

  let videos = state
    .store
    .list_videos(&query)
    .await
    .map_err(ApiError::store)?;
  Ok(ApiResponse::ok(videos, "videos fetched successfully"))
}

// ─── Publish ─────────────────────────────────────────────────────────────────

/// `POST /videos`: returns 201 + the new video.
pub async fn publish<S, M>(
  State(state): State<AppState<S, M>>,
  AuthUser { user, .. }: AuthUser,
  multipart: Result<Multipart, MultipartRejection>,
) -> Result<ApiResponse<Video>, ApiError>
where
  S: Store,
  M: MediaHost,
{
  let mut form = Form::read(multipart).await?;
  let duration = form
    .text("duration")
    .filter(|d| !d.trim().is_empty())
    .map(|d| {
      d.trim()
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite() && *d >= 0.0)
        .ok_or_else(|| {
          CoreError::InvalidOperation(format!("duration must be a number of seconds, got {d:?}"))
        })
    })
    .transpose()?;

  let new_video = NewVideoForm {
    title: form.text("title"),
    description: form.text("description"),
    video_file: form.file("videoFile"),
    thumbnail: form.file("thumbnail"),
    duration,
  };

  let video =
    mutation::publish_video(&*state.store, &*state.media, user.user_id, new_video).await?;
  Ok(ApiResponse::created(video, "video published successfully"))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// A video as seen by one viewer.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetails {
  #[serde(flatten)]
  pub listing:           VideoListing,
  pub likes_count:       u64,
  pub is_liked:          bool,
  pub subscribers_count: u64,
  pub is_subscribed:     bool,
}

/// `GET /videos/{videoId}`
pub async fn get_one<S, M>(
  State(state): State<AppState<S, M>>,
  AuthUser { user, .. }: AuthUser,
  Path(video_id): Path<String>,
) -> Result<ApiResponse<VideoDetails>, ApiError>
where
  S: Store,
  M: MediaHost,
{
  let id: VideoId = video_id.parse()?;
  let store = &*state.store;

  let mut listing = store
    .video_listing(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| CoreError::NotFound("video not found".to_owned()))?;
  if !listing.video.visible_to(user.user_id) {
    return Err(ApiError(CoreError::Forbidden("this video is not published".to_owned())));
  }

  if let Some(views) = store.add_view(id).await.map_err(ApiError::store)? {
    listing.video.views = views;
  }
  store
    .record_watch(user.user_id, id, Utc::now())
    .await
    .map_err(ApiError::store)?;

  let owner = listing.owner.user_id;
  let likes_count = store
    .count_by_target(RelationKind::VideoLike, id.into())
    .await
    .map_err(ApiError::store)?;
  let is_liked = toggle::holds(store, user.user_id, Target::Video(id)).await?;
  let subscribers_count = store
    .count_by_target(RelationKind::Subscription, owner.into())
    .await
    .map_err(ApiError::store)?;
  let is_subscribed = store
    .has_relationship(RelationshipKey::new(user.user_id, Target::Channel(owner)))
    .await
    .map_err(ApiError::store)?;

  let details = VideoDetails {
    listing,
    likes_count,
    is_liked,
    subscribers_count,
    is_subscribed,
  };
  Ok(ApiResponse::ok(details, "video fetched successfully"))
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// `PATCH /videos/{videoId}`. A new thumbnail replaces and discards the old.
pub async fn update<S, M>(
  State(state): State<AppState<S, M>>,
  AuthUser { user, .. }: AuthUser,
  Path(video_id): Path<String>,
  multipart: Result<Multipart, MultipartRejection>,
) -> Result<ApiResponse<Video>, ApiError>
where
  S: Store,
  M: MediaHost,
{
  let id: VideoId = video_id.parse()?;
  let mut form = Form::read(multipart).await?;
  let title = form.text("title");
  let description = form.text("description");
  let thumbnail = form.file("thumbnail");

  let text_only = VideoPatch {
    title: title.clone(),
    description: description.clone(),
    thumbnail: None,
  };
  if text_only.is_empty() && thumbnail.is_none() {
    return Err(ApiError(CoreError::MissingField(
      "title, description or thumbnail is required".to_owned(),
    )));
  }

  let store = &*state.store;
  let media = &*state.media;
  let previous = mutation::load_owned::<S, Video>(store, user.user_id, id).await?;

  let updated = mutation::mutate_with_asset::<S, M, Video, _, _>(
    store,
    media,
    user.user_id,
    id,
    MediaKind::Image,
    thumbnail,
    |asset| VideoPatch {
      title,
      description,
      thumbnail: asset.map(|a| a.url.clone()),
    },
  )
  .await?;

  if updated.thumbnail != previous.thumbnail {
    mutation::discard(media, &previous.thumbnail).await;
  }
  tracing::debug!(video = %id, "video updated");
  Ok(ApiResponse::ok(updated, "video updated successfully"))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /videos/{videoId}`
pub async fn delete_one<S, M>(
  State(state): State<AppState<S, M>>,
  AuthUser { user, .. }: AuthUser,
  Path(video_id): Path<String>,
) -> Result<ApiResponse<Value>, ApiError>
where
  S: Store,
  M: MediaHost,
{
  let id: VideoId = video_id.parse()?;
  mutation::remove_video(&*state.store, &*state.media, user.user_id, id).await?;
  tracing::info!(video = %id, owner = %user.user_id, "video deleted");
  Ok(ApiResponse::ok(json!({}), "video deleted successfully"))
}

// ─── Publish toggle ──────────────────────────────────────────────────────────

/// `PATCH /videos/toggle/publish/{videoId}`
pub async fn toggle_publish<S, M>(
  State(state): State<AppState<S, M>>,
  AuthUser { user, .. }: AuthUser,
  Path(video_id): Path<String>,
) -> Result<ApiResponse<Value>, ApiError>
where
  S: Store,
  M: MediaHost,
{
  let id: VideoId = video_id.parse()?;
  let video = mutation::toggle_publish(&*state.store, user.user_id, id).await?;
  Ok(ApiResponse::ok(
    json!({ "isPublished": video.is_published }),
    "publish status toggled successfully",
  ))
}
