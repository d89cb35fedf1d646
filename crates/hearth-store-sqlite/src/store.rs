//! [`SqliteStore`], the SQLite implementation of [`CardStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use hearth_core::{
  card::{CardContent, CardType, NewCardContent},
  log::{CardUpdateLog, NewCardUpdateLog},
  store::CardStore,
};

use crate::{
  Error, Result,
  encode::{CARD_COLUMNS, LOG_COLUMNS, RawCard, RawLog, encode_dt, encode_json, encode_uuid},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Hearth card store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// `true` if `err` is a UNIQUE violation on `column` (`table.column`).
fn is_unique_violation(err: &rusqlite::Error, column: &str) -> bool {
  matches!(
    err,
    rusqlite::Error::SqliteFailure(e, Some(msg))
      if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        && msg.contains(column)
  )
}

// ─── CardStore impl ──────────────────────────────────────────────────────────

impl CardStore for SqliteStore {
  type Error = Error;

  // ── Cards ─────────────────────────────────────────────────────────────────

  async fn get_card(
    &self,
    user_id:   &str,
    card_type: CardType,
  ) -> Result<Option<CardContent>> {
    let user_id  = user_id.to_owned();
    let type_str = card_type.as_str();

    let raw: Option<RawCard> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {CARD_COLUMNS} FROM card_contents
               WHERE user_id = ?1 AND card_type = ?2"
            ),
            rusqlite::params![user_id, type_str],
            RawCard::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawCard::into_card).transpose()
  }

  async fn upsert_card(&self, input: NewCardContent) -> Result<CardContent> {
    let id_str      = encode_uuid(Uuid::new_v4());
    let type_str    = input.card_type.as_str();
    let content_str = encode_json(&input.content);
    let now_str     = encode_dt(Utc::now());
    let user_id     = input.user_id;

    // A single statement: the conflict target resolves concurrent writers
    // last-write-wins, and the original `id` / `created_at` survive.
    let raw: RawCard = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          &format!(
            "INSERT INTO card_contents (id, user_id, card_type, content, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)
             ON CONFLICT (user_id, card_type) DO UPDATE SET
               content    = excluded.content,
               updated_at = excluded.updated_at
             RETURNING {CARD_COLUMNS}"
          ),
          rusqlite::params![id_str, user_id, type_str, content_str, now_str],
          RawCard::from_row,
        )?)
      })
      .await?;

    raw.into_card()
  }

  // ── Audit log (append-only) ───────────────────────────────────────────────

  async fn append_log(&self, input: NewCardUpdateLog) -> Result<CardUpdateLog> {
    let log = CardUpdateLog {
      id:              Uuid::new_v4(),
      card_content_id: input.card_content_id,
      updated_by:      input.updated_by,
      update_source:   input.update_source,
      idempotency_key: input.idempotency_key,
      request_data:    input.request_data,
      created_at:      Utc::now(),
    };

    let id_str      = encode_uuid(log.id);
    let card_id_str = encode_uuid(log.card_content_id);
    let updated_by  = log.updated_by.clone();
    let source_str  = log.update_source.as_str();
    let key         = log.idempotency_key.clone();
    let request_str = encode_json(&log.request_data);
    let at_str      = encode_dt(log.created_at);

    let inserted = self
      .conn
      .call(move |conn| {
        let res = conn.execute(
          "INSERT INTO card_update_logs (
             id, card_content_id, updated_by, update_source,
             idempotency_key, request_data, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            id_str,
            card_id_str,
            updated_by,
            source_str,
            key,
            request_str,
            at_str,
          ],
        );
        match res {
          Ok(_) => Ok(true),
          Err(e) if is_unique_violation(&e, "card_update_logs.idempotency_key") => {
            Ok(false)
          }
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    if !inserted {
      let key = log.idempotency_key.unwrap_or_default();
      tracing::debug!(idempotency_key = %key, "audit row rejected by unique key");
      return Err(Error::DuplicateIdempotencyKey(key));
    }

    Ok(log)
  }

  async fn find_log_by_idempotency_key(
    &self,
    key: &str,
  ) -> Result<Option<CardUpdateLog>> {
    let key = key.to_owned();

    let raw: Option<RawLog> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {LOG_COLUMNS} FROM card_update_logs WHERE idempotency_key = ?1"
            ),
            rusqlite::params![key],
            RawLog::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawLog::into_log).transpose()
  }

  async fn list_logs(&self, card_content_id: Uuid) -> Result<Vec<CardUpdateLog>> {
    let card_id_str = encode_uuid(card_content_id);

    let raws: Vec<RawLog> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {LOG_COLUMNS} FROM card_update_logs
           WHERE card_content_id = ?1
           ORDER BY rowid"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![card_id_str], RawLog::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLog::into_log).collect()
  }
}
