//! Error types and axum `IntoResponse` implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use hearth_core::ValidationError;
use serde_json::json;
use thiserror::Error;

/// An error returned by a handler. Every variant renders as
/// `{"success": false, "error": "<message>"}`.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  Validation(#[from] ValidationError),

  #[error("unauthorized: {0}")]
  Unauthorized(&'static str),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::Validation(_) => StatusCode::BAD_REQUEST,
      ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
      ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }
    (status, Json(json!({ "success": false, "error": self.to_string() })))
      .into_response()
  }
}
