//! Error types for `hearth-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown card type: {0:?}")]
  UnknownCardType(String),

  #[error("unknown update source: {0:?}")]
  UnknownUpdateSource(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A request payload failed shape validation. The message is shown to the
/// caller verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
  pub fn new(message: impl Into<String>) -> Self { Self(message.into()) }
}
