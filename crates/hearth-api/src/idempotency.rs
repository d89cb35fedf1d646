//! Replay detection for write requests.
//!
//! A caller that may retry attaches an `idempotency-key` header. The guard
//! looks the key up in the audit log; a hit means the write already landed.
//!
//! The lookup is a single read, not a lock: two concurrent requests with the
//! same fresh key can both pass. The UNIQUE index on the audit log's key
//! column then lets only one of them record the key, and the upsert's
//! last-write-wins decides which content survives.

use axum::http::{HeaderMap, HeaderName};
use hearth_core::{ValidationError, log::CardUpdateLog, store::CardStore};

pub const IDEMPOTENCY_KEY_HEADER: HeaderName = HeaderName::from_static("idempotency-key");

const MAX_KEY_LEN: usize = 255;

/// A caller-supplied opaque replay token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
  /// Read the optional header. Blank values count as absent.
  pub fn from_headers(headers: &HeaderMap) -> Result<Option<Self>, ValidationError> {
    let Some(raw) = headers.get(&IDEMPOTENCY_KEY_HEADER) else {
      return Ok(None);
    };
    let value = raw
      .to_str()
      .map_err(|_| ValidationError::new("idempotency-key must be visible ASCII"))?
      .trim();
    if value.is_empty() {
      return Ok(None);
    }
    if value.len() > MAX_KEY_LEN {
      return Err(ValidationError::new(format!(
        "idempotency-key must be at most {MAX_KEY_LEN} bytes"
      )));
    }
    Ok(Some(Self(value.to_owned())))
  }

  pub fn as_str(&self) -> &str { &self.0 }

  pub fn into_string(self) -> String { self.0 }
}

/// What the handler should do next.
#[derive(Debug)]
pub enum Guard {
  Proceed,
  /// The key is already in the audit log; skip the write.
  AlreadyProcessed(CardUpdateLog),
}

/// Look `key` up in the audit log. With no key, dedup is skipped entirely and
/// the store is never touched.
pub async fn check<S>(store: &S, key: Option<&IdempotencyKey>) -> Result<Guard, S::Error>
where
  S: CardStore,
{
  let Some(key) = key else {
    return Ok(Guard::Proceed);
  };
  Ok(match store.find_log_by_idempotency_key(key.as_str()).await? {
    Some(log) => Guard::AlreadyProcessed(log),
    None => Guard::Proceed,
  })
}

#[cfg(test)]
mod tests {
  use axum::http::HeaderValue;

  use super::*;

  fn with_key(value: &str) -> HeaderMap {
    let mut h = HeaderMap::new();
    h.insert(IDEMPOTENCY_KEY_HEADER, HeaderValue::from_str(value).unwrap());
    h
  }

  #[test]
  fn absent_and_blank_keys_are_none() {
    assert_eq!(IdempotencyKey::from_headers(&HeaderMap::new()).unwrap(), None);
    assert_eq!(IdempotencyKey::from_headers(&with_key("   ")).unwrap(), None);
  }

  #[test]
  fn key_is_trimmed() {
    let key = IdempotencyKey::from_headers(&with_key(" abc-123 ")).unwrap().unwrap();
    assert_eq!(key.as_str(), "abc-123");
  }

  #[test]
  fn oversized_key_is_rejected() {
    let long = "k".repeat(MAX_KEY_LEN + 1);
    assert!(IdempotencyKey::from_headers(&with_key(&long)).is_err());
    let max = "k".repeat(MAX_KEY_LEN);
    assert!(IdempotencyKey::from_headers(&with_key(&max)).unwrap().is_some());
  }
}
