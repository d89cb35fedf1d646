//! `POST /update-card` — validate, dedup, upsert, audit.

use axum::{
  Json,
  extract::State,
  http::HeaderMap,
};
use bytes::Bytes;
use hearth_core::{
  card::{CardContent, NewCardContent},
  log::{NewCardUpdateLog, UpdateSource},
  store::CardStore,
  validate,
};

use crate::{
  AppState,
  auth::ServiceCaller,
  error::ApiError,
  handlers::{AuditOutcome, Envelope, parse_json, record_audit},
  idempotency::{self, Guard, IdempotencyKey},
};

/// `POST /update-card` — body: `{"cardType": "...", "content": {...}, "userId": "..."}`
///
/// Returns the upserted row. A replayed idempotency key returns success with
/// `data: null` and an explanatory `message` instead of writing again.
pub async fn handler<S>(
  _caller: ServiceCaller,
  State(state): State<AppState<S>>,
  headers: HeaderMap,
  body: Bytes,
) -> Result<Json<Envelope<CardContent>>, ApiError>
where
  S: CardStore + Clone + 'static,
{
  let request_data = parse_json(&body)?;
  let request = validate::update_request(&request_data)?;
  let user_id = request.require_user_id()?.to_owned();
  let key = IdempotencyKey::from_headers(&headers)?;

  let guard = idempotency::check(&*state.store, key.as_ref())
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  if let Guard::AlreadyProcessed(log) = guard {
    tracing::info!(
      idempotency_key = key.as_ref().map(IdempotencyKey::as_str),
      log_id = %log.id,
      "update-card replay skipped"
    );
    return Ok(Json(Envelope::already_processed()));
  }

  let card = state
    .store
    .upsert_card(NewCardContent {
      user_id:   user_id.clone(),
      card_type: request.card_type,
      content:   request.content,
    })
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  tracing::info!(card_type = %card.card_type, %user_id, card_id = %card.id, "card upserted");

  let outcome = record_audit(&*state.store, NewCardUpdateLog {
    card_content_id: card.id,
    updated_by:      None,
    update_source:   UpdateSource::Api,
    idempotency_key: key.map(IdempotencyKey::into_string),
    request_data,
  })
  .await;

  // A lost race on the key means another request already reported this
  // logical write as done. An audit failure does not undo the upsert.
  match outcome {
    AuditOutcome::DuplicateKey => Ok(Json(Envelope::already_processed())),
    AuditOutcome::Recorded | AuditOutcome::Failed => Ok(Json(Envelope::data(Some(card)))),
  }
}
