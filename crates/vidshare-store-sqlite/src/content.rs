//! [`ContentStore`] for [`SqliteStore`], one generic impl for every kind.

use rusqlite::OptionalExtension as _;
use vidshare_core::{
  content::{Content, ContentKind},
  relationship::RelationKind,
  store::ContentStore,
};

use crate::{
  Error, Result, SqliteStore,
  encode::{
    decode_payload, encode_content_kind, encode_dt, encode_payload,
    encode_relation_kind, encode_uuid,
  },
};

/// The like kind whose targets are resources of `kind`.
fn like_kind(kind: ContentKind) -> RelationKind {
  match kind {
    ContentKind::Video => RelationKind::VideoLike,
    ContentKind::Tweet => RelationKind::TweetLike,
    ContentKind::Comment => RelationKind::CommentLike,
  }
}

impl<R: Content> ContentStore<R> for SqliteStore {
  async fn insert(&self, resource: &R) -> Result<()> {
    let id_str      = encode_uuid(resource.id());
    let kind_str    = encode_content_kind(R::KIND);
    let owner_str   = encode_uuid(resource.owner());
    let parent_str  = resource.parent().map(encode_uuid);
    let search_key  = resource.search_key();
    let payload     = encode_payload(resource)?;
    let created_str = encode_dt(resource.created_at());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO contents (
             content_id, kind, owner_id, parent_id, payload_json, search_key,
             created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
          rusqlite::params![
            id_str, kind_str, owner_str, parent_str, payload, search_key, created_str
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get(&self, id: R::Id) -> Result<Option<R>> {
    let id_str   = encode_uuid(id);
    let kind_str = encode_content_kind(R::KIND);

    let payload: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT payload_json FROM contents WHERE content_id = ?1 AND kind = ?2",
            rusqlite::params![id_str, kind_str],
            |row| row.get(0),
          )
          .optional()?)
      })
      .await?;

    payload.as_deref().map(decode_payload).transpose()
  }

  async fn update(&self, resource: &R) -> Result<()> {
    let id_str      = encode_uuid(resource.id());
    let kind_str    = encode_content_kind(R::KIND);
    let search_key  = resource.search_key();
    let payload     = encode_payload(resource)?;
    let updated_str = encode_dt(chrono::Utc::now());

    // The view counter is owned by `add_view`; an update never rolls it back.
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE contents SET
             payload_json = CASE kind
               WHEN 'video' THEN json_set(?3, '$.views', json_extract(payload_json, '$.views'))
               ELSE ?3
             END,
             search_key = ?5,
             updated_at = ?4
           WHERE content_id = ?1 AND kind = ?2",
          rusqlite::params![id_str, kind_str, payload, updated_str, search_key],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::Core(vidshare_core::Error::NotFound(format!(
        "{} not found",
        R::KIND
      ))));
    }
    Ok(())
  }

  async fn delete(&self, id: R::Id) -> Result<bool> {
    let id_str    = encode_uuid(id);
    let kind      = R::KIND;
    let kind_str  = encode_content_kind(kind);
    let like_str  = encode_relation_kind(like_kind(kind));
    let cmt_like  = encode_relation_kind(RelationKind::CommentLike);

    let deleted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        if kind == ContentKind::Video {
          tx.execute(
            "DELETE FROM relationships
             WHERE kind = ?1 AND target_id IN (
               SELECT content_id FROM contents WHERE kind = 'comment' AND parent_id = ?2
             )",
            rusqlite::params![cmt_like, id_str],
          )?;
          tx.execute(
            "DELETE FROM contents WHERE kind = 'comment' AND parent_id = ?1",
            rusqlite::params![id_str],
          )?;
          tx.execute(
            "DELETE FROM watch_history WHERE video_id = ?1",
            rusqlite::params![id_str],
          )?;
        }

        tx.execute(
          "DELETE FROM relationships WHERE kind = ?1 AND target_id = ?2",
          rusqlite::params![like_str, id_str],
        )?;
        let n = tx.execute(
          "DELETE FROM contents WHERE content_id = ?1 AND kind = ?2",
          rusqlite::params![id_str, kind_str],
        )?;

        tx.commit()?;
        Ok(n > 0)
      })
      .await?;

    if deleted {
      tracing::debug!(kind = %kind, id = %id, "content deleted");
    }
    Ok(deleted)
  }
}
