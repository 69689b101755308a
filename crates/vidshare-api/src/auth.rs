//! Credentials and the bearer-token authentication gate.
//!
//! Passwords are stored as argon2 PHC strings. Access and refresh tokens are
//! opaque: 32 random bytes, base64url encoded. The store only ever sees
//! their SHA-256 hex digests.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, HeaderName, header, request::Parts},
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{Duration, Utc};
use rand_core::{OsRng, RngCore as _};
use serde::Serialize;
use sha2::{Digest as _, Sha256};
use vidshare_core::{
  Error as CoreError,
  identity::{RefreshCredential, Session, User},
  media::MediaHost,
  store::{IdentityStore, Store},
};

use crate::{AppState, error::ApiError};

pub const ACCESS_COOKIE: &str = "accessToken";
pub const REFRESH_COOKIE: &str = "refreshToken";

/// Token lifetimes.
#[derive(Debug, Clone)]
pub struct AuthConfig {
  pub access_token_ttl:  Duration,
  pub refresh_token_ttl: Duration,
}

impl Default for AuthConfig {
  fn default() -> Self {
    Self {
      access_token_ttl:  Duration::days(1),
      refresh_token_ttl: Duration::days(10),
    }
  }
}

// ─── Primitives ──────────────────────────────────────────────────────────────

/// A fresh opaque token.
pub fn generate_token() -> String {
  let mut bytes = [0u8; 32];
  OsRng.fill_bytes(&mut bytes);
  URL_SAFE_NO_PAD.encode(bytes)
}

/// The digest under which a token is stored.
pub fn digest(token: &str) -> String { hex::encode(Sha256::digest(token.as_bytes())) }

pub fn hash_password(password: &str) -> Result<String, CoreError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| CoreError::Store(format!("argon2 error: {e}").into()))
}

/// Whether `password` matches the PHC string `hash`. A malformed hash never
/// matches.
pub fn verify_password(password: &str, hash: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(hash) else {
    return false;
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}

// ─── Issuing ─────────────────────────────────────────────────────────────────

/// The plaintext tokens handed to a client once.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedTokens {
  pub access_token:  String,
  pub refresh_token: String,
}

impl IssuedTokens {
  /// `Set-Cookie` headers carrying both tokens.
  pub fn cookies(&self, config: &AuthConfig) -> [(HeaderName, String); 2] {
    [
      (
        header::SET_COOKIE,
        cookie(ACCESS_COOKIE, &self.access_token, config.access_token_ttl.num_seconds()),
      ),
      (
        header::SET_COOKIE,
        cookie(REFRESH_COOKIE, &self.refresh_token, config.refresh_token_ttl.num_seconds()),
      ),
    ]
  }
}

/// `Set-Cookie` headers that expire both token cookies.
pub fn clear_cookies() -> [(HeaderName, String); 2] {
  [
    (header::SET_COOKIE, cookie(ACCESS_COOKIE, "", 0)),
    (header::SET_COOKIE, cookie(REFRESH_COOKIE, "", 0)),
  ]
}

fn cookie(name: &str, value: &str, max_age: i64) -> String {
  format!("{name}={value}; Max-Age={max_age}; Path=/; HttpOnly; Secure; SameSite=Strict")
}

/// Open a session for `user` and rotate its refresh credential.
pub async fn issue_tokens<S: IdentityStore>(
  store: &S,
  config: &AuthConfig,
  user: &mut User,
) -> Result<IssuedTokens, ApiError> {
  let now = Utc::now();
  let access_token = generate_token();
  let refresh_token = generate_token();

  store
    .create_session(&Session {
      token_hash: digest(&access_token),
      user_id:    user.user_id,
      issued_at:  now,
      expires_at: now + config.access_token_ttl,
    })
    .await
    .map_err(ApiError::store)?;

  user.refresh = Some(RefreshCredential {
    token_hash: digest(&refresh_token),
    expires_at: now + config.refresh_token_ttl,
  });
  store.update_user(user).await.map_err(ApiError::store)?;

  Ok(IssuedTokens { access_token, refresh_token })
}

// ─── Reading ─────────────────────────────────────────────────────────────────

/// The value of cookie `name`, if the request carries it.
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
  headers
    .get_all(header::COOKIE)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|v| v.split(';'))
    .filter_map(|pair| pair.trim().split_once('='))
    .find(|(k, _)| *k == name)
    .map(|(_, v)| v)
    .filter(|v| !v.is_empty())
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
  headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .map(str::trim)
    .filter(|t| !t.is_empty())
}

// ─── Extractor ───────────────────────────────────────────────────────────────

/// The authenticated identity. Present in a handler means the request carried
/// a live access token, either as a bearer header or as the access cookie.
#[derive(Debug, Clone)]
pub struct AuthUser {
  pub user:       User,
  /// Digest of the access token the request used.
  pub token_hash: String,
}

impl<S, M> FromRequestParts<AppState<S, M>> for AuthUser
where
  S: Store,
  M: MediaHost,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, M>,
  ) -> Result<Self, Self::Rejection> {
    let token_hash = bearer_token(&parts.headers)
      .or_else(|| read_cookie(&parts.headers, ACCESS_COOKIE))
      .map(digest)
      .ok_or_else(|| unauthorized("unauthorized request"))?;

    let session = state
      .store
      .find_session(&token_hash)
      .await
      .map_err(ApiError::store)?
      .ok_or_else(|| unauthorized("invalid access token"))?;

    if session.is_expired(Utc::now()) {
      return Err(unauthorized("access token expired"));
    }

    let user = state
      .store
      .get_user(session.user_id)
      .await
      .map_err(ApiError::store)?
      .ok_or_else(|| unauthorized("invalid access token"))?;

    Ok(AuthUser { user, token_hash })
  }
}

pub(crate) fn unauthorized(message: &str) -> ApiError {
  ApiError(CoreError::Unauthorized(message.to_owned()))
}
