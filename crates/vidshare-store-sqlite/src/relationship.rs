//! [`RelationshipStore`] for [`SqliteStore`].

use chrono::Utc;
use uuid::Uuid;
use vidshare_core::{
  id::UserId,
  relationship::{RelationKind, RelationshipKey, Toggled},
  store::RelationshipStore,
};

use crate::{
  Result, SqliteStore,
  encode::{encode_dt, encode_relation_kind, encode_uuid},
};

impl RelationshipStore for SqliteStore {
  async fn toggle_relationship(&self, key: RelationshipKey) -> Result<Toggled> {
    let rel_id_str = encode_uuid(Uuid::new_v4());
    let kind_str   = encode_relation_kind(key.kind);
    let actor_str  = encode_uuid(key.actor);
    let target_str = encode_uuid(key.target);
    let at_str     = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let removed = tx.execute(
          "DELETE FROM relationships
           WHERE kind = ?1 AND actor_id = ?2 AND target_id = ?3",
          rusqlite::params![kind_str, actor_str, target_str],
        )?;

        let outcome = if removed > 0 {
          Toggled::Deleted
        } else {
          // A row that appeared concurrently is left alone; the caller asked
          // for the relationship to exist and it does.
          tx.execute(
            "INSERT INTO relationships (
               relationship_id, kind, actor_id, target_id, created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?5)
             ON CONFLICT (kind, actor_id, target_id) DO NOTHING",
            rusqlite::params![rel_id_str, kind_str, actor_str, target_str, at_str],
          )?;
          Toggled::Created
        };

        tx.commit()?;
        Ok(outcome)
      })
      .await
      .map_err(Into::into)
  }

  async fn has_relationship(&self, key: RelationshipKey) -> Result<bool> {
    let kind_str   = encode_relation_kind(key.kind);
    let actor_str  = encode_uuid(key.actor);
    let target_str = encode_uuid(key.target);

    let exists = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT EXISTS (
             SELECT 1 FROM relationships
             WHERE kind = ?1 AND actor_id = ?2 AND target_id = ?3
           )",
          rusqlite::params![kind_str, actor_str, target_str],
          |row| row.get::<_, bool>(0),
        )?)
      })
      .await?;
    Ok(exists)
  }

  async fn count_by_target(&self, kind: RelationKind, target: Uuid) -> Result<u64> {
    let kind_str   = encode_relation_kind(kind);
    let target_str = encode_uuid(target);

    let n: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM relationships WHERE kind = ?1 AND target_id = ?2",
          rusqlite::params![kind_str, target_str],
          |row| row.get(0),
        )?)
      })
      .await?;
    Ok(n as u64)
  }

  async fn count_by_actor(&self, kind: RelationKind, actor: UserId) -> Result<u64> {
    let kind_str  = encode_relation_kind(kind);
    let actor_str = encode_uuid(actor);

    let n: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM relationships WHERE kind = ?1 AND actor_id = ?2",
          rusqlite::params![kind_str, actor_str],
          |row| row.get(0),
        )?)
      })
      .await?;
    Ok(n as u64)
  }
}
