//! [`IdentityStore`] for [`SqliteStore`].

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use vidshare_core::{
  content::{Video, VideoListing},
  id::{UserId, VideoId},
  identity::{Session, User, normalise_handle},
  store::IdentityStore,
};

use crate::{
  Error, Result, SqliteStore,
  encode::{
    PROFILE_COLUMNS, RawJoined, RawSession, RawUser, USER_COLUMNS, encode_dt,
    encode_uuid,
  },
};

/// Load one user row plus its watch-history ids.
fn load_user(
  conn: &rusqlite::Connection,
  where_clause: &str,
  params: impl rusqlite::Params,
) -> rusqlite::Result<Option<(RawUser, Vec<String>)>> {
  let sql = format!("SELECT {USER_COLUMNS} FROM users u WHERE {where_clause} LIMIT 1");
  let Some(raw) = conn.query_row(&sql, params, RawUser::from_row).optional()? else {
    return Ok(None);
  };

  let mut stmt = conn.prepare(
    "SELECT video_id FROM watch_history WHERE user_id = ?1 ORDER BY watched_at DESC",
  )?;
  let history = stmt
    .query_map(rusqlite::params![raw.user_id], |row| row.get(0))?
    .collect::<rusqlite::Result<Vec<String>>>()?;

  Ok(Some((raw, history)))
}

impl IdentityStore for SqliteStore {
  async fn create_user(&self, user: &User) -> Result<()> {
    let id_str      = encode_uuid(user.user_id);
    let username    = user.username.clone();
    let email       = user.email.clone();
    let full_name   = user.full_name.clone();
    let avatar      = user.avatar.clone();
    let cover_image = user.cover_image.clone();
    let password    = user.password_hash.clone();
    let created_str = encode_dt(user.created_at);
    let updated_str = encode_dt(user.updated_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (
             user_id, username, email, full_name, avatar, cover_image,
             password_hash, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            id_str,
            username,
            email,
            full_name,
            avatar,
            cover_image,
            password,
            created_str,
            updated_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_user(&self, id: UserId) -> Result<Option<User>> {
    let id_str = encode_uuid(id);

    let raw = self
      .conn
      .call(move |conn| Ok(load_user(conn, "u.user_id = ?1", rusqlite::params![id_str])?))
      .await?;

    raw.map(|(raw, history)| raw.into_user(history)).transpose()
  }

  async fn find_user(
    &self,
    username: Option<&str>,
    email: Option<&str>,
  ) -> Result<Option<User>> {
    let username = username.map(normalise_handle).filter(|s| !s.is_empty());
    let email    = email.map(normalise_handle).filter(|s| !s.is_empty());
    if username.is_none() && email.is_none() {
      return Ok(None);
    }

    let raw = self
      .conn
      .call(move |conn| {
        Ok(load_user(
          conn,
          "u.username = ?1 OR u.email = ?2",
          rusqlite::params![username, email],
        )?)
      })
      .await?;

    raw.map(|(raw, history)| raw.into_user(history)).transpose()
  }

  async fn find_user_by_refresh(&self, token_hash: &str) -> Result<Option<User>> {
    let hash = token_hash.to_owned();

    let raw = self
      .conn
      .call(move |conn| {
        Ok(load_user(conn, "u.refresh_token_hash = ?1", rusqlite::params![hash])?)
      })
      .await?;

    raw.map(|(raw, history)| raw.into_user(history)).transpose()
  }

  async fn update_user(&self, user: &User) -> Result<()> {
    let id_str       = encode_uuid(user.user_id);
    let username     = user.username.clone();
    let email        = user.email.clone();
    let full_name    = user.full_name.clone();
    let avatar       = user.avatar.clone();
    let cover_image  = user.cover_image.clone();
    let password     = user.password_hash.clone();
    let refresh_hash = user.refresh.as_ref().map(|r| r.token_hash.clone());
    let refresh_exp  = user.refresh.as_ref().map(|r| encode_dt(r.expires_at));
    let updated_str  = encode_dt(user.updated_at);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE users SET
             username = ?2, email = ?3, full_name = ?4, avatar = ?5,
             cover_image = ?6, password_hash = ?7, refresh_token_hash = ?8,
             refresh_expires_at = ?9, updated_at = ?10
           WHERE user_id = ?1",
          rusqlite::params![
            id_str,
            username,
            email,
            full_name,
            avatar,
            cover_image,
            password,
            refresh_hash,
            refresh_exp,
            updated_str,
          ],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::Core(vidshare_core::Error::NotFound(
        "user not found".to_owned(),
      )));
    }
    Ok(())
  }

  // ── Sessions ──────────────────────────────────────────────────────────────

  async fn create_session(&self, session: &Session) -> Result<()> {
    let hash       = session.token_hash.clone();
    let user_str   = encode_uuid(session.user_id);
    let issued_str = encode_dt(session.issued_at);
    let exp_str    = encode_dt(session.expires_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sessions (token_hash, user_id, issued_at, expires_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![hash, user_str, issued_str, exp_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn find_session(&self, token_hash: &str) -> Result<Option<Session>> {
    let hash = token_hash.to_owned();

    let raw: Option<RawSession> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT token_hash, user_id, issued_at, expires_at
             FROM sessions WHERE token_hash = ?1",
            rusqlite::params![hash],
            |row| {
              Ok(RawSession {
                token_hash: row.get(0)?,
                user_id:    row.get(1)?,
                issued_at:  row.get(2)?,
                expires_at: row.get(3)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawSession::into_session).transpose()
  }

  async fn revoke_sessions(&self, user: UserId, keep: Option<&str>) -> Result<u64> {
    let user_str = encode_uuid(user);
    let keep     = keep.map(str::to_owned);

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM sessions
           WHERE user_id = ?1 AND (?2 IS NULL OR token_hash != ?2)",
          rusqlite::params![user_str, keep],
        )?)
      })
      .await?;
    Ok(removed as u64)
  }

  // ── Watch history ─────────────────────────────────────────────────────────

  async fn record_watch(
    &self,
    user: UserId,
    video: VideoId,
    at: DateTime<Utc>,
  ) -> Result<()> {
    let user_str  = encode_uuid(user);
    let video_str = encode_uuid(video);
    let at_str    = encode_dt(at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO watch_history (user_id, video_id, watched_at)
           VALUES (?1, ?2, ?3)
           ON CONFLICT (user_id, video_id) DO UPDATE SET watched_at = excluded.watched_at",
          rusqlite::params![user_str, video_str, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn watch_history(&self, user: UserId) -> Result<Vec<VideoListing>> {
    let user_str = encode_uuid(user);

    let raws: Vec<RawJoined> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT c.payload_json, {PROFILE_COLUMNS}
           FROM watch_history w
           JOIN contents c ON c.content_id = w.video_id AND c.kind = 'video'
           JOIN users u    ON u.user_id = c.owner_id
           WHERE w.user_id = ?1
             AND (json_extract(c.payload_json, '$.isPublished') = 1 OR c.owner_id = ?1)
           ORDER BY w.watched_at DESC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![user_str], RawJoined::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|raw| {
        let (video, owner) = raw.decode::<Video>()?;
        Ok(VideoListing { video, owner })
      })
      .collect()
  }
}
