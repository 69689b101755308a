//! Error types for `vidshare-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A path or body reference that is not a well-formed identifier.
  #[error("{0}")]
  InvalidIdentifier(String),

  /// A well-formed request that the domain refuses (e.g. self-subscription).
  #[error("{0}")]
  InvalidOperation(String),

  #[error("{0}")]
  MissingField(String),

  #[error("{0}")]
  NotFound(String),

  /// The actor is not the owner of the resource being mutated.
  #[error("{0}")]
  Forbidden(String),

  #[error("{0}")]
  Unauthorized(String),

  /// A uniqueness violation surfaced by the store.
  #[error("{0}")]
  Conflict(String),

  /// The media host (or another external collaborator) failed.
  #[error("{0}")]
  UpstreamFailure(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Short machine-readable name of the variant, used in logs.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::InvalidIdentifier(_) => "invalid_identifier",
      Self::InvalidOperation(_) => "invalid_operation",
      Self::MissingField(_) => "missing_field",
      Self::NotFound(_) => "not_found",
      Self::Forbidden(_) => "forbidden",
      Self::Unauthorized(_) => "unauthorized",
      Self::Conflict(_) => "conflict",
      Self::UpstreamFailure(_) => "upstream_failure",
      Self::Serialization(_) => "serialization",
      Self::Store(_) => "store",
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
