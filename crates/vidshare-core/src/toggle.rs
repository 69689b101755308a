//! The toggle-relationship engine.
//!
//! `toggle` flips the existence of one `(actor, target, kind)` relationship.
//! Targets arrive already parsed (see [`crate::id`]), so malformed references
//! are rejected before this module is reached. The existence check and the
//! flip happen inside the store in one atomic step.

use crate::{
  Error, Result,
  id::UserId,
  relationship::{RelationshipKey, Target, Toggled},
  store::{RelationshipStore, lift},
};

/// Create the relationship if absent, delete it if present.
///
/// Fails with [`Error::InvalidOperation`] when an identity tries to subscribe
/// to its own channel; no store call is made in that case.
pub async fn toggle<S>(store: &S, actor: UserId, target: Target) -> Result<Toggled>
where
  S: RelationshipStore,
{
  if let Target::Channel(channel) = target
    && channel == actor
  {
    return Err(Error::InvalidOperation(
      "you cannot subscribe to your own channel".to_owned(),
    ));
  }

  let key = RelationshipKey::new(actor, target);
  let outcome = store.toggle_relationship(key).await.map_err(lift)?;

  tracing::debug!(
    kind = %key.kind,
    actor = %actor,
    target = %key.target,
    ?outcome,
    "relationship toggled"
  );

  Ok(outcome)
}

/// Whether `actor` currently holds a relationship to `target`.
pub async fn holds<S>(store: &S, actor: UserId, target: Target) -> Result<bool>
where
  S: RelationshipStore,
{
  store
    .has_relationship(RelationshipKey::new(actor, target))
    .await
    .map_err(lift)
}
