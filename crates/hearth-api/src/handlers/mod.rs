//! Request handlers and the pieces they share.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/get-card` | `?cardType&userId`; `data: null` when nothing is stored |
//! | `POST` | `/update-card` | Body `{cardType, content, userId}` |
//! | `POST` | `/bulk-update-cards` | Body `{updates: [{cardType, content}], userId}`; may be 207 |

pub mod bulk;
pub mod get;
pub mod update;

use bytes::Bytes;
use hearth_core::{
  ValidationError,
  log::NewCardUpdateLog,
  store::{CardStore, StoreError as _},
};
use serde::Serialize;

pub(crate) const ALREADY_PROCESSED: &str = "Request already processed";

/// Success body shared by `get-card` and `update-card`. `data` serialises as
/// `null` when absent.
#[derive(Debug, Serialize)]
pub(crate) struct Envelope<T> {
  pub success: bool,
  pub data:    Option<T>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message: Option<&'static str>,
}

impl<T> Envelope<T> {
  pub fn data(data: Option<T>) -> Self {
    Self { success: true, data, message: None }
  }

  pub fn already_processed() -> Self {
    Self { success: true, data: None, message: Some(ALREADY_PROCESSED) }
  }
}

/// Parse a request body as JSON without requiring a `content-type` header.
pub(crate) fn parse_json(body: &Bytes) -> Result<serde_json::Value, ValidationError> {
  serde_json::from_slice(body)
    .map_err(|e| ValidationError::new(format!("request body is not valid JSON: {e}")))
}

/// How appending an audit row went. The card write itself has already
/// succeeded whichever variant comes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AuditOutcome {
  Recorded,
  /// A concurrent request logged the same idempotency key first. The row
  /// for this write was appended again without the key.
  DuplicateKey,
  Failed,
}

/// Append one audit row, reporting rather than propagating failure.
///
/// Every applied upsert gets exactly one row. When the idempotency key has
/// already been claimed by a concurrent request the row is kept and the key
/// dropped from it.
pub(crate) async fn record_audit<S>(store: &S, input: NewCardUpdateLog) -> AuditOutcome
where
  S: CardStore,
{
  let card_content_id = input.card_content_id;
  let keyless = input
    .idempotency_key
    .is_some()
    .then(|| NewCardUpdateLog { idempotency_key: None, ..input.clone() });

  match store.append_log(input).await {
    Ok(log) => {
      tracing::debug!(log_id = %log.id, %card_content_id, "audit row appended");
      AuditOutcome::Recorded
    }
    Err(e) if e.is_duplicate_idempotency_key() => {
      tracing::warn!(
        %card_content_id,
        error = %e,
        "idempotency key raced a concurrent request"
      );
      let Some(keyless) = keyless else {
        return AuditOutcome::Failed;
      };
      match store.append_log(keyless).await {
        Ok(log) => {
          tracing::debug!(log_id = %log.id, %card_content_id, "audit row appended without key");
        }
        Err(e) => {
          tracing::error!(
            %card_content_id,
            error = %e,
            "failed to append audit row after upsert"
          );
        }
      }
      AuditOutcome::DuplicateKey
    }
    Err(e) => {
      tracing::error!(
        %card_content_id,
        error = %e,
        "failed to append audit row after upsert"
      );
      AuditOutcome::Failed
    }
  }
}
