//! JSON REST API for vidshare.
//!
//! Exposes an axum [`Router`] backed by any [`vidshare_core::store::Store`]
//! and [`vidshare_core::media::MediaHost`]. Every route lives under
//! `/api/v1`, and every response is either the success envelope
//! ([`ApiResponse`]) or the error envelope ([`ApiError`]). Static media
//! serving and request tracing belong to the caller.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = vidshare_api::api_router(AppState::new(store, media, config));
//! ```

pub mod auth;
pub mod comments;
pub mod envelope;
pub mod error;
pub mod form;
pub mod healthcheck;
pub mod likes;
pub mod subscriptions;
pub mod tweets;
pub mod users;
pub mod videos;

use std::sync::Arc;

use axum::{
  Router,
  extract::DefaultBodyLimit,
  routing::{get, patch, post},
};
use vidshare_core::{media::MediaHost, page::PageRequest, store::Store};

pub use auth::{AuthConfig, AuthUser};
pub use envelope::ApiResponse;
pub use error::ApiError;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Limits and lifetimes applied by the API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub auth:             AuthConfig,
  /// Upper bound on `limit` for every paginated listing.
  pub max_page_size:    u32,
  /// Upper bound on a request body, multipart uploads included.
  pub max_upload_bytes: usize,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      auth:             AuthConfig::default(),
      max_page_size:    100,
      max_upload_bytes: 64 * 1024 * 1024,
    }
  }
}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S, M> {
  pub store:  Arc<S>,
  pub media:  Arc<M>,
  pub config: Arc<ApiConfig>,
}

impl<S, M> AppState<S, M> {
  pub fn new(store: S, media: M, config: ApiConfig) -> Self {
    Self {
      store:  Arc::new(store),
      media:  Arc::new(media),
      config: Arc::new(config),
    }
  }

  /// Parse `page` / `limit` query values against the configured maximum.
  pub(crate) fn page_request(
    &self,
    page: Option<&str>,
    limit: Option<&str>,
  ) -> Result<PageRequest, ApiError> {
    Ok(PageRequest::parse(page, limit, self.config.max_page_size)?)
  }
}

// Manual impl: cloning the state never requires cloning `S` or `M`.
impl<S, M> Clone for AppState<S, M> {
  fn clone(&self) -> Self {
    Self {
      store:  Arc::clone(&self.store),
      media:  Arc::clone(&self.media),
      config: Arc::clone(&self.config),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router.
///
/// The returned `Router<()>` can be merged into any parent router regardless
/// of its own state type.
pub fn api_router<S, M>(state: AppState<S, M>) -> Router<()>
where
  S: Store,
  M: MediaHost,
{
  let routes = Router::new()
    .route("/healthcheck", get(healthcheck::handler))
    // Users
    .route("/users/register", post(users::register::<S, M>))
    .route("/users/login", post(users::login::<S, M>))
    .route("/users/logout", post(users::logout::<S, M>))
    .route("/users/refresh-token", post(users::refresh::<S, M>))
    .route("/users/change-password", post(users::change_password::<S, M>))
    .route("/users/current-user", get(users::current::<S, M>))
    .route("/users/update-account", patch(users::update_account::<S, M>))
    .route("/users/avatar", patch(users::update_avatar::<S, M>))
    .route("/users/cover-image", patch(users::update_cover_image::<S, M>))
    .route("/users/c/{username}", get(users::channel::<S, M>))
    .route("/users/history", get(users::history::<S, M>))
    // Videos
    .route("/videos", get(videos::list::<S, M>).post(videos::publish::<S, M>))
    .route(
      "/videos/{videoId}",
      get(videos::get_one::<S, M>)
        .patch(videos::update::<S, M>)
        .delete(videos::delete_one::<S, M>),
    )
    .route("/videos/toggle/publish/{videoId}", patch(videos::toggle_publish::<S, M>))
    // Tweets
    .route("/tweets", post(tweets::create::<S, M>))
    .route("/tweets/user/{userId}", get(tweets::list::<S, M>))
    .route(
      "/tweets/{tweetId}",
      patch(tweets::update::<S, M>).delete(tweets::delete_one::<S, M>),
    )
    // Comments
    .route(
      "/comments/{videoId}",
      get(comments::list::<S, M>).post(comments::create::<S, M>),
    )
    .route(
      "/comments/c/{commentId}",
      patch(comments::update::<S, M>).delete(comments::delete_one::<S, M>),
    )
    // Likes
    .route("/likes/toggle/v/{videoId}", post(likes::toggle_video::<S, M>))
    .route("/likes/toggle/c/{commentId}", post(likes::toggle_comment::<S, M>))
    .route("/likes/toggle/t/{tweetId}", post(likes::toggle_tweet::<S, M>))
    .route("/likes/videos", get(likes::liked_videos::<S, M>))
    // Subscriptions
    .route(
      "/subscriptions/c/{channelId}",
      post(subscriptions::toggle::<S, M>).get(subscriptions::subscribers::<S, M>),
    )
    .route("/subscriptions/u/{subscriberId}", get(subscriptions::channels::<S, M>));

  let body_limit = state.config.max_upload_bytes;
  Router::new()
    .nest("/api/v1", routes)
    .layer(DefaultBodyLimit::max(body_limit))
    .with_state(state)
}
