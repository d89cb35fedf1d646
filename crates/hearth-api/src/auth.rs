//! Service-key bearer auth extractor and standalone verifier.
//!
//! Only one trusted caller may use the write path: whoever holds the
//! configured service key. This is a capability check, not end-user auth.

use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, header, request::Parts};
use hearth_core::store::CardStore;
use sha2::{Digest, Sha256};

use crate::{AppState, error::ApiError};

/// The elevated credential accepted by this server instance.
#[derive(Clone)]
pub struct AuthConfig {
  service_key_digest: Vec<u8>,
}

impl AuthConfig {
  pub fn new(service_key: &str) -> Self {
    Self { service_key_digest: Sha256::digest(service_key.as_bytes()).to_vec() }
  }
}

/// Zero-size marker: present in the handler means the caller presented the
/// service key.
pub struct ServiceCaller;

/// Verify `authorization: Bearer <key>` against the configured key.
///
/// Both sides are digested first so the comparison is over fixed-length
/// values regardless of what the caller sent.
pub fn verify_service_key(
  headers: &HeaderMap,
  config: &AuthConfig,
) -> Result<(), ApiError> {
  let header_val = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthorized("missing authorization header"))?;

  let token = header_val
    .strip_prefix("Bearer ")
    .ok_or(ApiError::Unauthorized("expected a bearer token"))?;

  let presented = Sha256::digest(token.as_bytes());
  if presented.as_slice() != config.service_key_digest.as_slice() {
    return Err(ApiError::Unauthorized("insufficient privilege"));
  }

  Ok(())
}

impl<S> FromRequestParts<AppState<S>> for ServiceCaller
where
  S: CardStore + Clone + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    verify_service_key(&parts.headers, &state.auth)?;
    Ok(ServiceCaller)
  }
}
