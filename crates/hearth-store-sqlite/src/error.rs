//! Error type for `hearth-store-sqlite`.

use hearth_core::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] hearth_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// An audit row with this idempotency key already exists.
  #[error("idempotency key already logged: {0:?}")]
  DuplicateIdempotencyKey(String),
}

impl StoreError for Error {
  fn is_duplicate_idempotency_key(&self) -> bool {
    matches!(self, Self::DuplicateIdempotencyKey(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
