//! [`Catalog`] for [`SqliteStore`]: the joined, read-only listing queries.

use rusqlite::OptionalExtension as _;
use vidshare_core::{
  content::{Comment, CommentListing, Tweet, Video, VideoListing},
  id::{UserId, VideoId},
  identity::PublicProfile,
  page::{Page, PageRequest, SortField, SortOrder, VideoQuery},
  store::Catalog,
};

use crate::{
  Result, SqliteStore,
  encode::{PROFILE_COLUMNS, RawJoined, RawProfile, decode_payload, encode_uuid},
  store::like_pattern,
};

/// SQL expression for a whitelisted sort field. Never built from input text.
fn sort_expr(field: SortField) -> &'static str {
  match field {
    SortField::CreatedAt => "c.created_at",
    SortField::UpdatedAt => "c.updated_at",
    SortField::Views => "json_extract(c.payload_json, '$.views')",
    SortField::Duration => "json_extract(c.payload_json, '$.duration')",
    SortField::Title => "c.search_key",
  }
}

fn sort_dir(order: SortOrder) -> &'static str {
  match order {
    SortOrder::Asc => "ASC",
    SortOrder::Desc => "DESC",
  }
}

fn into_video_listings(raws: Vec<RawJoined>) -> Result<Vec<VideoListing>> {
  raws
    .into_iter()
    .map(|raw| {
      let (video, owner) = raw.decode::<Video>()?;
      Ok(VideoListing { video, owner })
    })
    .collect()
}

fn into_profiles(raws: Vec<RawProfile>) -> Result<Vec<PublicProfile>> {
  raws.into_iter().map(RawProfile::into_profile).collect()
}

/// Profiles on the far side of a subscription. `join_col` is the column the
/// users are joined on; `filter_col` is the column matched against `id`.
async fn subscription_profiles(
  store: &SqliteStore,
  join_col: &'static str,
  filter_col: &'static str,
  id: UserId,
) -> Result<Vec<PublicProfile>> {
  let id_str = encode_uuid(id);

  let raws: Vec<RawProfile> = store
    .conn
    .call(move |conn| {
      let sql = format!(
        "SELECT {PROFILE_COLUMNS}
         FROM relationships r
         JOIN users u ON u.user_id = r.{join_col}
         WHERE r.kind = 'subscription' AND r.{filter_col} = ?1
         ORDER BY r.created_at DESC"
      );
      let mut stmt = conn.prepare(&sql)?;
      let rows = stmt
        .query_map(rusqlite::params![id_str], |row| RawProfile::from_row(row, 0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
      Ok(rows)
    })
    .await?;

  into_profiles(raws)
}

impl Catalog for SqliteStore {
  async fn list_videos(&self, query: &VideoQuery) -> Result<Page<VideoListing>> {
    let title_pattern = query
      .title
      .as_deref()
      .map(str::trim)
      .filter(|t| !t.is_empty())
      .map(|t| like_pattern(&t.to_lowercase()));
    let owner_str      = query.owner.map(encode_uuid);
    let published_only = query.published_only;
    let order_by       = format!(
      "{} {}, c.content_id {}",
      sort_expr(query.sort),
      sort_dir(query.order),
      sort_dir(query.order),
    );
    let request        = query.page;
    let limit_val      = i64::from(request.limit);
    let offset_val     = request.offset() as i64;

    let (total, raws): (i64, Vec<RawJoined>) = self
      .conn
      .call(move |conn| {
        let filter = "c.kind = 'video'
           AND (?1 IS NULL OR c.search_key LIKE ?1 ESCAPE '\\')
           AND (?2 IS NULL OR c.owner_id = ?2)
           AND (?3 = 0 OR json_extract(c.payload_json, '$.isPublished') = 1)";

        let total: i64 = conn.query_row(
          &format!(
            "SELECT COUNT(*) FROM contents c JOIN users u ON u.user_id = c.owner_id
             WHERE {filter}"
          ),
          rusqlite::params![title_pattern, owner_str, published_only],
          |row| row.get(0),
        )?;

        let sql = format!(
          "SELECT c.payload_json, {PROFILE_COLUMNS}
           FROM contents c
           JOIN users u ON u.user_id = c.owner_id
           WHERE {filter}
           ORDER BY {order_by}
           LIMIT ?4 OFFSET ?5"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![title_pattern, owner_str, published_only, limit_val, offset_val],
            RawJoined::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((total, rows))
      })
      .await?;

    Ok(Page::new(into_video_listings(raws)?, total as u64, request))
  }

  async fn video_listing(&self, id: VideoId) -> Result<Option<VideoListing>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawJoined> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT c.payload_json, {PROFILE_COLUMNS}
           FROM contents c
           JOIN users u ON u.user_id = c.owner_id
           WHERE c.content_id = ?1 AND c.kind = 'video'"
        );
        Ok(conn
          .query_row(&sql, rusqlite::params![id_str], RawJoined::from_row)
          .optional()?)
      })
      .await?;

    raw
      .map(|raw| {
        let (video, owner) = raw.decode::<Video>()?;
        Ok(VideoListing { video, owner })
      })
      .transpose()
  }

  async fn add_view(&self, id: VideoId) -> Result<Option<u64>> {
    let id_str = encode_uuid(id);

    let views: Option<i64> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "UPDATE contents
             SET payload_json = json_set(
               payload_json, '$.views', json_extract(payload_json, '$.views') + 1
             )
             WHERE content_id = ?1 AND kind = 'video'
             RETURNING json_extract(payload_json, '$.views')",
            rusqlite::params![id_str],
            |row| row.get(0),
          )
          .optional()?)
      })
      .await?;

    Ok(views.map(|v| v as u64))
  }

  async fn liked_videos(&self, user: UserId) -> Result<Vec<VideoListing>> {
    let user_str = encode_uuid(user);

    let raws: Vec<RawJoined> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT c.payload_json, {PROFILE_COLUMNS}
           FROM relationships r
           JOIN contents c ON c.content_id = r.target_id AND c.kind = 'video'
           JOIN users u    ON u.user_id = c.owner_id
           WHERE r.kind = 'video_like' AND r.actor_id = ?1
             AND (json_extract(c.payload_json, '$.isPublished') = 1 OR c.owner_id = ?1)
           ORDER BY r.created_at DESC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![user_str], RawJoined::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    into_video_listings(raws)
  }

  async fn list_tweets(&self, owner: UserId) -> Result<Vec<Tweet>> {
    let owner_str = encode_uuid(owner);

    let payloads: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT payload_json FROM contents
           WHERE kind = 'tweet' AND owner_id = ?1
           ORDER BY created_at DESC, content_id DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![owner_str], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    payloads.iter().map(|p| decode_payload(p)).collect()
  }

  async fn list_comments(
    &self,
    video: VideoId,
    page: PageRequest,
  ) -> Result<Page<CommentListing>> {
    let video_str  = encode_uuid(video);
    let limit_val  = i64::from(page.limit);
    let offset_val = page.offset() as i64;

    let (total, raws): (i64, Vec<RawJoined>) = self
      .conn
      .call(move |conn| {
        let total: i64 = conn.query_row(
          "SELECT COUNT(*) FROM contents c JOIN users u ON u.user_id = c.owner_id
           WHERE c.kind = 'comment' AND c.parent_id = ?1",
          rusqlite::params![video_str],
          |row| row.get(0),
        )?;

        let sql = format!(
          "SELECT c.payload_json, {PROFILE_COLUMNS}
           FROM contents c
           JOIN users u ON u.user_id = c.owner_id
           WHERE c.kind = 'comment' AND c.parent_id = ?1
           ORDER BY c.created_at DESC, c.content_id DESC
           LIMIT ?2 OFFSET ?3"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![video_str, limit_val, offset_val],
            RawJoined::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok((total, rows))
      })
      .await?;

    let docs = raws
      .into_iter()
      .map(|raw| {
        let (comment, owner) = raw.decode::<Comment>()?;
        Ok(CommentListing { comment, owner })
      })
      .collect::<Result<Vec<_>>>()?;

    Ok(Page::new(docs, total as u64, page))
  }

  async fn subscribers(&self, channel: UserId) -> Result<Vec<PublicProfile>> {
    subscription_profiles(self, "actor_id", "target_id", channel).await
  }

  async fn subscribed_channels(&self, subscriber: UserId) -> Result<Vec<PublicProfile>> {
    subscription_profiles(self, "target_id", "actor_id", subscriber).await
  }
}
