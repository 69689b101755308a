//! Handlers for `/subscriptions` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/subscriptions/c/{channelId}` | 201 when subscribed, 200 when unsubscribed |
//! | `GET`  | `/subscriptions/c/{channelId}` | Subscribers of the channel |
//! | `GET`  | `/subscriptions/u/{subscriberId}` | Channels the identity subscribes to |

use axum::extract::{Path, State};
use serde::Serialize;
use vidshare_core::{
  id::UserId,
  identity::PublicProfile,
  media::MediaHost,
  relationship::{RelationKind, Target, Toggled},
  store::Store,
  toggle,
};

use crate::{AppState, auth::AuthUser, envelope::ApiResponse, error::ApiError};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionState {
  pub is_subscribed:     bool,
  pub subscribers_count: u64,
}

/// `POST /subscriptions/c/{channelId}`
pub async fn toggle<S, M>(
  State(state): State<AppState<S, M>>,
  AuthUser { user, .. }: AuthUser,
  Path(channel_id): Path<String>,
) -> Result<ApiResponse<SubscriptionState>, ApiError>
where
  S: Store,
  M: MediaHost,
{
  let channel: UserId = channel_id.parse()?;
  let store = &*state.store;

  let outcome = toggle::toggle(store, user.user_id, Target::Channel(channel)).await?;
  let subscribers_count = store
    .count_by_target(RelationKind::Subscription, channel.into())
    .await
    .map_err(ApiError::store)?;

  let body = SubscriptionState { is_subscribed: outcome.is_created(), subscribers_count };
  Ok(match outcome {
    Toggled::Created => ApiResponse::created(body, "subscribed successfully"),
    Toggled::Deleted => ApiResponse::ok(body, "unsubscribed successfully"),
  })
}

/// `GET /subscriptions/c/{channelId}`
pub async fn subscribers<S, M>(
  State(state): State<AppState<S, M>>,
  _: AuthUser,
  Path(channel_id): Path<String>,
) -> Result<ApiResponse<Vec<PublicProfile>>, ApiError>
where
  S: Store,
  M: MediaHost,
{
  let channel: UserId = channel_id.parse()?;
  let subscribers = state
    .store
    .subscribers(channel)
    .await
    .map_err(ApiError::store)?;
  Ok(ApiResponse::ok(subscribers, "subscribers fetched successfully"))
}

/// `GET /subscriptions/u/{subscriberId}`
pub async fn channels<S, M>(
  State(state): State<AppState<S, M>>,
  _: AuthUser,
  Path(subscriber_id): Path<String>,
) -> Result<ApiResponse<Vec<PublicProfile>>, ApiError>
where
  S: Store,
  M: MediaHost,
{
  let subscriber: UserId = subscriber_id.parse()?;
  let channels = state
    .store
    .subscribed_channels(subscriber)
    .await
    .map_err(ApiError::store)?;
  Ok(ApiResponse::ok(channels, "subscribed channels fetched successfully"))
}
