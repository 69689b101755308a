//! Handlers for `/users` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `POST`  | `/users/register` | Multipart: `fullName`, `email`, `username`, `password`, `avatar` file, optional `coverImage` file |
//! | `POST`  | `/users/login` | Body: `{"username"\|"email", "password"}`; sets token cookies |
//! | `POST`  | `/users/logout` | Revokes every session and the refresh credential |
//! | `POST`  | `/users/refresh-token` | Body `{"refreshToken"}` or the refresh cookie; rotates both tokens |
//! | `POST`  | `/users/change-password` | Body: `{"oldPassword", "newPassword"}` |
//! | `GET`   | `/users/current-user` | |
//! | `PATCH` | `/users/update-account` | Body: `{"fullName"?, "email"?}` |
//! | `PATCH` | `/users/avatar` | Multipart: `avatar` file |
//! | `PATCH` | `/users/cover-image` | Multipart: `coverImage` file |
//! | `GET`   | `/users/c/{username}` | Channel profile with subscription counts |
//! | `GET`   | `/users/history` | Watch history, most recent first |

use axum::{
  body::Bytes,
  extract::{Multipart, Path, State, multipart::MultipartRejection},
  http::HeaderMap,
  response::{AppendHeaders, IntoResponse},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use vidshare_core::{
  Error as CoreError,
  content::VideoListing,
  identity::{ChannelProfile, NewUser, User},
  media::{MediaHost, MediaKind, Upload},
  mutation::{self, required},
  patch::{AccountPatch, Patch as _},
  relationship::{RelationKind, RelationshipKey, Target},
  store::Store,
};

use crate::{
  AppState,
  auth::{
    self, AuthUser, IssuedTokens, REFRESH_COOKIE, digest, issue_tokens, read_cookie,
    unauthorized,
  },
  envelope::ApiResponse,
  error::ApiError,
  form::{Form, JsonBody},
};

/// Like [`required`] but without trimming: whitespace in a password counts.
fn secret(field: &str, value: Option<String>) -> Result<String, ApiError> {
  value
    .filter(|v| !v.trim().is_empty())
    .ok_or_else(|| ApiError(CoreError::MissingField(format!("{field} is required"))))
}

// ─── Register ────────────────────────────────────────────────────────────────

/// `POST /users/register`: returns 201 + the new identity.
pub async fn register<S, M>(
  State(state): State<AppState<S, M>>,
  multipart: Result<Multipart, MultipartRejection>,
) -> Result<ApiResponse<User>, ApiError>
where
  S: Store,
  M: MediaHost,
{
  let mut form = Form::read(multipart).await?;
  let full_name = required("fullName", form.text("fullName"))?;
  let email = required("email", form.text("email"))?;
  let username = required("username", form.text("username"))?;
  let password = secret("password", form.text("password"))?;
  let avatar = form
    .file("avatar")
    .ok_or_else(|| CoreError::MissingField("avatar file is required".to_owned()))?;
  let cover = form.file("coverImage");

  let existing = state
    .store
    .find_user(Some(username.as_str()), Some(email.as_str()))
    .await
    .map_err(ApiError::store)?;
  if existing.is_some() {
    return Err(ApiError(CoreError::Conflict(
      "user with email or username already exists".to_owned(),
    )));
  }

  let password_hash = auth::hash_password(&password)?;

  let media = &*state.media;
  let avatar = mutation::host(media, MediaKind::Image, avatar).await?;
  let cover = match cover {
    Some(upload) => match mutation::host(media, MediaKind::Image, upload).await {
      Ok(asset) => Some(asset),
      Err(e) => {
        mutation::discard(media, &avatar.url).await;
        return Err(e.into());
      }
    },
    None => None,
  };

  let user = NewUser {
    username,
    email,
    full_name,
    avatar: avatar.url,
    cover_image: cover.map(|c| c.url),
    password_hash,
  }
  .into_user();

  if let Err(e) = state.store.create_user(&user).await {
    mutation::discard(media, &user.avatar).await;
    if let Some(cover) = &user.cover_image {
      mutation::discard(media, cover).await;
    }
    return Err(ApiError::store(e));
  }

  tracing::info!(user = %user.user_id, username = %user.username, "user registered");
  Ok(ApiResponse::created(user, "user registered successfully"))
}

// ─── Sessions ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginBody {
  pub username: Option<String>,
  pub email:    Option<String>,
  pub password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggedIn {
  pub user:   User,
  #[serde(flatten)]
  pub tokens: IssuedTokens,
}

/// `POST /users/login`
pub async fn login<S, M>(
  State(state): State<AppState<S, M>>,
  JsonBody(body): JsonBody<LoginBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: Store,
  M: MediaHost,
{
  let username = body.username.filter(|s| !s.trim().is_empty());
  let email = body.email.filter(|s| !s.trim().is_empty());
  if username.is_none() && email.is_none() {
    return Err(ApiError(CoreError::MissingField(
      "username or email is required".to_owned(),
    )));
  }
  let password = secret("password", body.password)?;

  let mut user = state
    .store
    .find_user(username.as_deref(), email.as_deref())
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError(CoreError::NotFound("user does not exist".to_owned())))?;

  if !auth::verify_password(&password, &user.password_hash) {
    return Err(unauthorized("invalid user credentials"));
  }

  let tokens = issue_tokens(&*state.store, &state.config.auth, &mut user).await?;
  tracing::info!(user = %user.user_id, "user logged in");

  let cookies = tokens.cookies(&state.config.auth);
  Ok((
    AppendHeaders(cookies),
    ApiResponse::ok(LoggedIn { user, tokens }, "user logged in successfully"),
  ))
}

/// `POST /users/logout`
pub async fn logout<S, M>(
  State(state): State<AppState<S, M>>,
  AuthUser { mut user, .. }: AuthUser,
) -> Result<impl IntoResponse, ApiError>
where
  S: Store,
  M: MediaHost,
{
  user.refresh = None;
  state.store.update_user(&user).await.map_err(ApiError::store)?;
  let revoked = state
    .store
    .revoke_sessions(user.user_id, None)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(user = %user.user_id, revoked, "user logged out");

  Ok((
    AppendHeaders(auth::clear_cookies()),
    ApiResponse::ok(json!({}), "user logged out"),
  ))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshBody {
  pub refresh_token: Option<String>,
}

/// `POST /users/refresh-token`. The body is optional; the refresh cookie is
/// used when it is absent.
pub async fn refresh<S, M>(
  State(state): State<AppState<S, M>>,
  headers: HeaderMap,
  body: Bytes,
) -> Result<impl IntoResponse, ApiError>
where
  S: Store,
  M: MediaHost,
{
  let body: RefreshBody = if body.iter().all(u8::is_ascii_whitespace) {
    RefreshBody::default()
  } else {
    serde_json::from_slice(&body).map_err(|e| {
      ApiError(CoreError::InvalidOperation(format!("invalid JSON body: {e}")))
    })?
  };

  let token = body
    .refresh_token
    .filter(|t| !t.trim().is_empty())
    .or_else(|| read_cookie(&headers, REFRESH_COOKIE).map(str::to_owned))
    .ok_or_else(|| unauthorized("unauthorized request"))?;

  let mut user = state
    .store
    .find_user_by_refresh(&digest(token.trim()))
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| unauthorized("invalid refresh token"))?;

  let now = Utc::now();
  if user.refresh.as_ref().is_none_or(|r| r.expires_at <= now) {
    return Err(unauthorized("refresh token is expired"));
  }

  let tokens = issue_tokens(&*state.store, &state.config.auth, &mut user).await?;
  tracing::debug!(user = %user.user_id, "tokens rotated");

  let cookies = tokens.cookies(&state.config.auth);
  Ok((AppendHeaders(cookies), ApiResponse::ok(tokens, "access token refreshed")))
}

// ─── Credentials ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordBody {
  pub old_password: Option<String>,
  pub new_password: Option<String>,
}

/// `POST /users/change-password`. Every other session is revoked.
pub async fn change_password<S, M>(
  State(state): State<AppState<S, M>>,
  AuthUser { mut user, token_hash }: AuthUser,
  JsonBody(body): JsonBody<ChangePasswordBody>,
) -> Result<ApiResponse<Value>, ApiError>
where
  S: Store,
  M: MediaHost,
{
  let old_password = secret("oldPassword", body.old_password)?;
  let new_password = secret("newPassword", body.new_password)?;

  if !auth::verify_password(&old_password, &user.password_hash) {
    return Err(ApiError(CoreError::InvalidOperation(
      "invalid old password".to_owned(),
    )));
  }

  user.password_hash = auth::hash_password(&new_password)?;
  user.updated_at = Utc::now();
  state.store.update_user(&user).await.map_err(ApiError::store)?;
  state
    .store
    .revoke_sessions(user.user_id, Some(&token_hash))
    .await
    .map_err(ApiError::store)?;

  tracing::info!(user = %user.user_id, "password changed");
  Ok(ApiResponse::ok(json!({}), "password changed successfully"))
}

// ─── Profile ─────────────────────────────────────────────────────────────────

/// `GET /users/current-user`
pub async fn current<S, M>(AuthUser { user, .. }: AuthUser) -> ApiResponse<User>
where
  S: Store,
  M: MediaHost,
{
  ApiResponse::ok(user, "current user fetched successfully")
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountBody {
  pub full_name: Option<String>,
  pub email:     Option<String>,
}

/// `PATCH /users/update-account`. Absent or blank fields are left alone.
pub async fn update_account<S, M>(
  State(state): State<AppState<S, M>>,
  AuthUser { mut user, .. }: AuthUser,
  JsonBody(body): JsonBody<UpdateAccountBody>,
) -> Result<ApiResponse<User>, ApiError>
where
  S: Store,
  M: MediaHost,
{
  let patch = AccountPatch { full_name: body.full_name, email: body.email };
  let blank = |f: &Option<String>| f.as_deref().is_none_or(|v| v.trim().is_empty());
  if blank(&patch.full_name) && blank(&patch.email) {
    return Err(ApiError(CoreError::MissingField(
      "fullName or email is required".to_owned(),
    )));
  }

  if patch.apply(&mut user) {
    user.updated_at = Utc::now();
    state.store.update_user(&user).await.map_err(ApiError::store)?;
  }
  Ok(ApiResponse::ok(user, "account details updated successfully"))
}

enum ImageSlot {
  Avatar,
  Cover,
}

/// Upload `upload`, swap it into `slot`, then discard the previous image.
async fn replace_image<S, M>(
  state: &AppState<S, M>,
  mut user: User,
  slot: ImageSlot,
  upload: Upload,
) -> Result<User, ApiError>
where
  S: Store,
  M: MediaHost,
{
  let media = &*state.media;
  let asset = mutation::host(media, MediaKind::Image, upload).await?;

  let previous = match slot {
    ImageSlot::Avatar => Some(std::mem::replace(&mut user.avatar, asset.url.clone())),
    ImageSlot::Cover => user.cover_image.replace(asset.url.clone()),
  };
  user.updated_at = Utc::now();

  if let Err(e) = state.store.update_user(&user).await {
    mutation::discard(media, &asset.url).await;
    return Err(ApiError::store(e));
  }
  if let Some(previous) = previous {
    mutation::discard(media, &previous).await;
  }
  Ok(user)
}

/// `PATCH /users/avatar`
pub async fn update_avatar<S, M>(
  State(state): State<AppState<S, M>>,
  AuthUser { user, .. }: AuthUser,
  multipart: Result<Multipart, MultipartRejection>,
) -> Result<ApiResponse<User>, ApiError>
where
  S: Store,
  M: MediaHost,
{
  let upload = Form::read(multipart)
    .await?
    .file("avatar")
    .ok_or_else(|| CoreError::MissingField("avatar file is required".to_owned()))?;
  let user = replace_image(&state, user, ImageSlot::Avatar, upload).await?;
  Ok(ApiResponse::ok(user, "avatar updated successfully"))
}

/// `PATCH /users/cover-image`
pub async fn update_cover_image<S, M>(
  State(state): State<AppState<S, M>>,
  AuthUser { user, .. }: AuthUser,
  multipart: Result<Multipart, MultipartRejection>,
) -> Result<ApiResponse<User>, ApiError>
where
  S: Store,
  M: MediaHost,
{
  let upload = Form::read(multipart)
    .await?
    .file("coverImage")
    .ok_or_else(|| CoreError::MissingField("cover image file is required".to_owned()))?;
  let user = replace_image(&state, user, ImageSlot::Cover, upload).await?;
  Ok(ApiResponse::ok(user, "cover image updated successfully"))
}

/// `GET /users/c/{username}`
pub async fn channel<S, M>(
  State(state): State<AppState<S, M>>,
  AuthUser { user: viewer, .. }: AuthUser,
  Path(username): Path<String>,
) -> Result<ApiResponse<ChannelProfile>, ApiError>
where
  S: Store,
  M: MediaHost,
{
  let store = &*state.store;
  let channel = store
    .find_user(Some(username.as_str()), None)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError(CoreError::NotFound("channel does not exist".to_owned())))?;

  let subscribers_count = store
    .count_by_target(RelationKind::Subscription, channel.user_id.into())
    .await
    .map_err(ApiError::store)?;
  let channels_subscribed_to_count = store
    .count_by_actor(RelationKind::Subscription, channel.user_id)
    .await
    .map_err(ApiError::store)?;
  let is_subscribed = store
    .has_relationship(RelationshipKey::new(
      viewer.user_id,
      Target::Channel(channel.user_id),
    ))
    .await
    .map_err(ApiError::store)?;

  let profile = ChannelProfile {
    profile: channel.profile(),
    cover_image: channel.cover_image,
    subscribers_count,
    channels_subscribed_to_count,
    is_subscribed,
  };
  Ok(ApiResponse::ok(profile, "channel fetched successfully"))
}

/// `GET /users/history`
pub async fn history<S, M>(
  State(state): State<AppState<S, M>>,
  AuthUser { user, .. }: AuthUser,
) -> Result<ApiResponse<Vec<VideoListing>>, ApiError>
where
  S: Store,
  M: MediaHost,
{
  let history = state
    .store
    .watch_history(user.user_id)
    .await
    .map_err(ApiError::store)?;
  Ok(ApiResponse::ok(history, "watch history fetched successfully"))
}
