//! The append-only audit trail of card writes.
//!
//! Every accepted write appends exactly one [`CardUpdateLog`]. Rows are
//! never updated or deleted; the idempotency key column doubles as the
//! replay detector.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Error;

/// Which entry point originated a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateSource {
  /// `POST /update-card`
  Api,
  /// `POST /bulk-update-cards`
  BulkApi,
}

impl UpdateSource {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Api => "api",
      Self::BulkApi => "bulk_api",
    }
  }
}

impl fmt::Display for UpdateSource {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for UpdateSource {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "api" => Ok(Self::Api),
      "bulk_api" => Ok(Self::BulkApi),
      other => Err(Error::UnknownUpdateSource(other.to_owned())),
    }
  }
}

/// One audit record. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardUpdateLog {
  pub id:              Uuid,
  pub card_content_id: Uuid,
  /// `None` for service-originated writes.
  pub updated_by:      Option<String>,
  pub update_source:   UpdateSource,
  /// Globally unique when present.
  pub idempotency_key: Option<String>,
  /// Verbatim copy of the accepted request body.
  pub request_data:    serde_json::Value,
  pub created_at:      DateTime<Utc>,
}

/// Input to [`crate::store::CardStore::append_log`].
#[derive(Debug, Clone)]
pub struct NewCardUpdateLog {
  pub card_content_id: Uuid,
  pub updated_by:      Option<String>,
  pub update_source:   UpdateSource,
  pub idempotency_key: Option<String>,
  pub request_data:    serde_json::Value,
}
