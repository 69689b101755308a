//! Handlers for `/tweets` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `POST`  | `/tweets` | Body: `{"content"}`; returns 201 |
//! | `GET`   | `/tweets/user/{userId}` | Newest first |
//! | `PATCH` | `/tweets/{tweetId}` | Body: `{"content"}`; owner only |
//! | `DELETE`| `/tweets/{tweetId}` | Owner only |

use axum::extract::{Path, State};
use serde::Deserialize;
use serde_json::{Value, json};
use vidshare_core::{
  Error as CoreError,
  content::Tweet,
  id::{TweetId, UserId},
  media::MediaHost,
  mutation::{self, required},
  patch::TextPatch,
  store::{ContentStore, Store},
};

use crate::{AppState, auth::AuthUser, envelope::ApiResponse, error::ApiError, form::JsonBody};

/// Body of every tweet and comment write.
#[derive(Debug, Deserialize)]
pub struct ContentBody {
  pub content: Option<String>,
}

/// `POST /tweets`
pub async fn create<S, M>(
  State(state): State<AppState<S, M>>,
  AuthUser { user, .. }: AuthUser,
  JsonBody(body): JsonBody<ContentBody>,
) -> Result<ApiResponse<Tweet>, ApiError>
where
  S: Store,
  M: MediaHost,
{
  let content = required("content", body.content)?;
  let tweet = Tweet::new(user.user_id, content);
  ContentStore::<Tweet>::insert(&*state.store, &tweet)
    .await
    .map_err(ApiError::store)?;
  Ok(ApiResponse::created(tweet, "tweet created successfully"))
}

/// `GET /tweets/user/{userId}`
pub async fn list<S, M>(
  State(state): State<AppState<S, M>>,
  _: AuthUser,
  Path(user_id): Path<String>,
) -> Result<ApiResponse<Vec<Tweet>>, ApiError>
where
  S: Store,
  M: MediaHost,
{
  let owner: UserId = user_id.parse()?;
  if state.store.get_user(owner).await.map_err(ApiError::store)?.is_none() {
    return Err(ApiError(CoreError::NotFound("user not found".to_owned())));
  }

  let tweets = state
    .store
    .list_tweets(owner)
    .await
    .map_err(ApiError::store)?;
  Ok(ApiResponse::ok(tweets, "tweets fetched successfully"))
}

/// `PATCH /tweets/{tweetId}`
pub async fn update<S, M>(
  State(state): State<AppState<S, M>>,
  AuthUser { user, .. }: AuthUser,
  Path(tweet_id): Path<String>,
  JsonBody(body): JsonBody<ContentBody>,
) -> Result<ApiResponse<Tweet>, ApiError>
where
  S: Store,
  M: MediaHost,
{
  let id: TweetId = tweet_id.parse()?;
  let content = required("content", body.content)?;
  let tweet = mutation::mutate::<S, Tweet, _>(
    &*state.store,
    user.user_id,
    id,
    TextPatch { content: Some(content) },
  )
  .await?;
  Ok(ApiResponse::ok(tweet, "tweet updated successfully"))
}

/// `DELETE /tweets/{tweetId}`
pub async fn delete_one<S, M>(
  State(state): State<AppState<S, M>>,
  AuthUser { user, .. }: AuthUser,
  Path(tweet_id): Path<String>,
) -> Result<ApiResponse<Value>, ApiError>
where
  S: Store,
  M: MediaHost,
{
  let id: TweetId = tweet_id.parse()?;
  mutation::remove::<S, Tweet>(&*state.store, user.user_id, id).await?;
  Ok(ApiResponse::ok(json!({}), "tweet deleted successfully"))
}
