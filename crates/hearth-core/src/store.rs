//! The `CardStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `hearth-store-sqlite`).
//! The HTTP layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  card::{CardContent, CardType, NewCardContent},
  log::{CardUpdateLog, NewCardUpdateLog},
};

/// Errors a [`CardStore`] backend can report.
///
/// Backends classify the one failure the HTTP layer reacts to specially: an
/// audit row whose idempotency key is already logged.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn is_duplicate_idempotency_key(&self) -> bool { false }
}

impl StoreError for std::convert::Infallible {}

/// Abstraction over the primary card store.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait CardStore: Send + Sync {
  type Error: StoreError;

  // ── Cards ─────────────────────────────────────────────────────────────

  /// Fetch the unique card for `(user_id, card_type)`. Returns `None` when
  /// nothing has been written for that pair yet.
  fn get_card<'a>(
    &'a self,
    user_id: &'a str,
    card_type: CardType,
  ) -> impl Future<Output = Result<Option<CardContent>, Self::Error>> + Send + 'a;

  /// Insert the card, or replace its `content` and bump `updated_at` if a
  /// row for `(user_id, card_type)` already exists. One atomic statement;
  /// concurrent writers to the same key resolve last-write-wins.
  fn upsert_card(
    &self,
    input: NewCardContent,
  ) -> impl Future<Output = Result<CardContent, Self::Error>> + Send + '_;

  // ── Audit log (append-only) ───────────────────────────────────────────

  /// Append one audit row. Fails with an error for which
  /// [`StoreError::is_duplicate_idempotency_key`] is `true` when the row's
  /// key has already been logged.
  fn append_log(
    &self,
    input: NewCardUpdateLog,
  ) -> impl Future<Output = Result<CardUpdateLog, Self::Error>> + Send + '_;

  /// Look up the audit row carrying `key`, if any.
  fn find_log_by_idempotency_key<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<CardUpdateLog>, Self::Error>> + Send + 'a;

  /// All audit rows for one card, oldest first.
  fn list_logs(
    &self,
    card_content_id: Uuid,
  ) -> impl Future<Output = Result<Vec<CardUpdateLog>, Self::Error>> + Send + '_;
}
