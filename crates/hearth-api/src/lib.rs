//! HTTP layer for the Hearth card-content service.
//!
//! Exposes an axum [`Router`] with the `get-card`, `update-card` and
//! `bulk-update-cards` endpoints backed by any [`CardStore`].

pub mod auth;
pub mod error;
pub mod handlers;
pub mod idempotency;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  http::{HeaderName, Method, header},
  routing::{get, post},
};
use hearth_core::store::CardStore;
use serde::Deserialize;
use tower_http::{
  cors::{Any, CorsLayer},
  trace::TraceLayer,
};

use auth::AuthConfig;
use idempotency::IDEMPOTENCY_KEY_HEADER;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `HEARTH_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:        String,
  pub port:        u16,
  pub store_path:  PathBuf,
  /// The elevated credential callers must present as a bearer token.
  pub service_key: String,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: CardStore> {
  pub store: Arc<S>,
  pub auth:  Arc<AuthConfig>,
}

impl<S: CardStore> AppState<S> {
  pub fn new(store: S, service_key: &str) -> Self {
    Self {
      store: Arc::new(store),
      auth:  Arc::new(AuthConfig::new(service_key)),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build an axum [`Router`] for the card endpoints.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: CardStore + Clone + 'static,
{
  Router::new()
    .route("/get-card",          get(handlers::get::handler::<S>))
    .route("/update-card",       post(handlers::update::handler::<S>))
    .route("/bulk-update-cards", post(handlers::bulk::handler::<S>))
    .layer(cors_layer())
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

/// Preflight answers with an open origin and the custom headers callers send.
fn cors_layer() -> CorsLayer {
  CorsLayer::new()
    .allow_origin(Any)
    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
    .allow_headers([
      header::AUTHORIZATION,
      header::CONTENT_TYPE,
      HeaderName::from_static("x-client-info"),
      HeaderName::from_static("apikey"),
      IDEMPOTENCY_KEY_HEADER,
    ])
}

// ─── Integration tests ────────────────────────────────────────────────────────
