//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. JSON documents are stored
//! compact. UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, Utc};
use hearth_core::{card::CardContent, log::CardUpdateLog};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── JSON documents ──────────────────────────────────────────────────────────

pub fn encode_json(value: &serde_json::Value) -> String { value.to_string() }

pub fn decode_json(s: &str) -> Result<serde_json::Value> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list shared by every `card_contents` read, in [`RawCard`] order.
pub const CARD_COLUMNS: &str =
  "id, user_id, card_type, content, created_at, updated_at";

/// Column list shared by every `card_update_logs` read, in [`RawLog`] order.
pub const LOG_COLUMNS: &str = "id, card_content_id, updated_by, update_source, \
                               idempotency_key, request_data, created_at";

/// Raw strings read directly from a `card_contents` row.
pub struct RawCard {
  pub id:         String,
  pub user_id:    String,
  pub card_type:  String,
  pub content:    String,
  pub created_at: String,
  pub updated_at: String,
}

impl RawCard {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      user_id:    row.get(1)?,
      card_type:  row.get(2)?,
      content:    row.get(3)?,
      created_at: row.get(4)?,
      updated_at: row.get(5)?,
    })
  }

  pub fn into_card(self) -> Result<CardContent> {
    Ok(CardContent {
      id:         decode_uuid(&self.id)?,
      user_id:    self.user_id,
      card_type:  self.card_type.parse()?,
      content:    decode_json(&self.content)?,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `card_update_logs` row.
pub struct RawLog {
  pub id:              String,
  pub card_content_id: String,
  pub updated_by:      Option<String>,
  pub update_source:   String,
  pub idempotency_key: Option<String>,
  pub request_data:    String,
  pub created_at:      String,
}

impl RawLog {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:              row.get(0)?,
      card_content_id: row.get(1)?,
      updated_by:      row.get(2)?,
      update_source:   row.get(3)?,
      idempotency_key: row.get(4)?,
      request_data:    row.get(5)?,
      created_at:      row.get(6)?,
    })
  }

  pub fn into_log(self) -> Result<CardUpdateLog> {
    Ok(CardUpdateLog {
      id:              decode_uuid(&self.id)?,
      card_content_id: decode_uuid(&self.card_content_id)?,
      updated_by:      self.updated_by,
      update_source:   self.update_source.parse()?,
      idempotency_key: self.idempotency_key,
      request_data:    decode_json(&self.request_data)?,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}
