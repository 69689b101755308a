//! Error type for `vidshare-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] vidshare_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),
}

impl Error {
  /// Whether this is a `UNIQUE` / `PRIMARY KEY` constraint violation.
  pub fn is_unique_violation(&self) -> bool {
    match self {
      Error::Database(tokio_rusqlite::Error::Rusqlite(
        rusqlite::Error::SqliteFailure(e, _),
      )) => {
        e.code == rusqlite::ErrorCode::ConstraintViolation
          && matches!(
            e.extended_code,
            rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
              | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
          )
      }
      _ => false,
    }
  }
}

impl From<Error> for vidshare_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Core(inner) => inner,
      e if e.is_unique_violation() => {
        vidshare_core::Error::Conflict("resource already exists".to_owned())
      }
      e => vidshare_core::Error::Store(Box::new(e)),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
