//! `POST /bulk-update-cards`: many upserts under one idempotency key.
//!
//! The whole `updates` array is validated before any write. Items are then
//! dispatched to the store concurrently and the handler waits for every
//! outcome. One item's failure never aborts its siblings.

use axum::{
  Json,
  extract::State,
  http::{HeaderMap, StatusCode},
};
use bytes::Bytes;
use futures::future::join_all;
use hearth_core::{
  card::{CardContent, CardType, NewCardContent},
  log::{NewCardUpdateLog, UpdateSource},
  store::CardStore,
  validate,
};
use serde::Serialize;

use crate::{
  AppState,
  auth::ServiceCaller,
  error::ApiError,
  handlers::{ALREADY_PROCESSED, AuditOutcome, parse_json, record_audit},
  idempotency::{self, Guard, IdempotencyKey},
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemResult {
  pub card_type: CardType,
  pub success:   bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub data:      Option<CardContent>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error:     Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemError {
  pub card_type: CardType,
  pub error:     String,
}

#[derive(Debug, Serialize)]
pub struct BulkResponse {
  /// `true` only when no item failed.
  pub success:   bool,
  pub processed: usize,
  pub failed:    usize,
  pub results:   Vec<ItemResult>,
  pub errors:    Vec<ItemError>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message:   Option<&'static str>,
}

impl BulkResponse {
  fn already_processed() -> Self {
    Self {
      success:   true,
      processed: 0,
      failed:    0,
      results:   Vec::new(),
      errors:    Vec::new(),
      message:   Some(ALREADY_PROCESSED),
    }
  }

  /// 200 when everything landed, 207 when some did, 500 when none did.
  fn status(&self) -> StatusCode {
    if self.failed == 0 {
      StatusCode::OK
    } else if self.processed > 0 {
      StatusCode::MULTI_STATUS
    } else {
      StatusCode::INTERNAL_SERVER_ERROR
    }
  }
}

/// `POST /bulk-update-cards` — body: `{"updates": [{"cardType", "content"}], "userId": "..."}`
pub async fn handler<S>(
  _caller: ServiceCaller,
  State(state): State<AppState<S>>,
  headers: HeaderMap,
  body: Bytes,
) -> Result<(StatusCode, Json<BulkResponse>), ApiError>
where
  S: CardStore + Clone + 'static,
{
  let request_data = parse_json(&body)?;
  let request = validate::bulk_request(&request_data)?;
  let user_id = request.require_user_id()?.to_owned();
  let key = IdempotencyKey::from_headers(&headers)?;

  let guard = idempotency::check(&*state.store, key.as_ref())
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  if let Guard::AlreadyProcessed(log) = guard {
    tracing::info!(
      idempotency_key = log.idempotency_key.as_deref(),
      log_id = %log.id,
      "bulk-update-cards replay skipped"
    );
    return Ok((StatusCode::OK, Json(BulkResponse::already_processed())));
  }

  let store = &*state.store;
  let outcomes = join_all(request.updates.iter().map(|item| {
    store.upsert_card(NewCardContent {
      user_id:   user_id.clone(),
      card_type: item.card_type,
      content:   item.content.clone(),
    })
  }))
  .await;

  // The key column is unique, so the batch key goes on the first audit row
  // written and the rest carry none. If a concurrent request already holds
  // the key, the item's row is still written and the key is not retried.
  let mut batch_key = key.map(IdempotencyKey::into_string);
  let mut results = Vec::with_capacity(outcomes.len());
  let mut errors = Vec::new();

  for (item, outcome) in request.updates.iter().zip(outcomes) {
    match outcome {
      Ok(card) => {
        let audit = record_audit(store, NewCardUpdateLog {
          card_content_id: card.id,
          updated_by:      None,
          update_source:   UpdateSource::BulkApi,
          idempotency_key: batch_key.clone(),
          request_data:    request_data.clone(),
        })
        .await;
        if matches!(audit, AuditOutcome::Recorded | AuditOutcome::DuplicateKey) {
          batch_key = None;
        }
        results.push(ItemResult {
          card_type: item.card_type,
          success:   true,
          data:      Some(card),
          error:     None,
        });
      }
      Err(e) => {
        let message = e.to_string();
        tracing::warn!(
          card_type = %item.card_type,
          %user_id,
          error = %message,
          "bulk item failed"
        );
        errors.push(ItemError { card_type: item.card_type, error: message.clone() });
        results.push(ItemResult {
          card_type: item.card_type,
          success:   false,
          data:      None,
          error:     Some(message),
        });
      }
    }
  }

  let failed = errors.len();
  let response = BulkResponse {
    success: failed == 0,
    processed: results.len() - failed,
    failed,
    results,
    errors,
    message: None,
  };

  tracing::info!(
    %user_id,
    processed = response.processed,
    failed = response.failed,
    "bulk-update-cards finished"
  );
  Ok((response.status(), Json(response)))
}
