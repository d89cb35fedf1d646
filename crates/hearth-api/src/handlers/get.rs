//! `GET /get-card` — fetch one card document.

use axum::{
  Json,
  extract::{Query, State, rejection::QueryRejection},
};
use hearth_core::{ValidationError, card::CardContent, store::CardStore, validate};
use serde::Deserialize;

use crate::{AppState, auth::ServiceCaller, error::ApiError, handlers::Envelope};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetParams {
  pub card_type: Option<String>,
  pub user_id:   Option<String>,
}

/// `GET /get-card?cardType=<type>&userId=<id>`
///
/// "Nothing stored yet" is a success with `data: null`, not a 404.
pub async fn handler<S>(
  _caller: ServiceCaller,
  State(state): State<AppState<S>>,
  params: Result<Query<GetParams>, QueryRejection>,
) -> Result<Json<Envelope<CardContent>>, ApiError>
where
  S: CardStore + Clone + 'static,
{
  let Query(params) = params.map_err(|e| ValidationError::new(e.body_text()))?;

  let raw_type = params
    .card_type
    .ok_or_else(|| ValidationError::new("cardType is required"))?;
  let card_type = validate::card_type(&raw_type)?;
  let user_id = params
    .user_id
    .filter(|u| !u.trim().is_empty())
    .ok_or_else(|| ValidationError::new("userId is required"))?;

  let card = state
    .store
    .get_card(&user_id, card_type)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  tracing::debug!(%card_type, %user_id, found = card.is_some(), "get-card");
  Ok(Json(Envelope::data(card)))
}
