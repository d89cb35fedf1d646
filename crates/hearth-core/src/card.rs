//! Card content: one JSON document per (user, card type) pair.
//!
//! The document's schema belongs to the dashboard widget that renders it and
//! is not enforced here beyond "it is a JSON object".

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Error;

// ─── CardType ────────────────────────────────────────────────────────────────

/// The closed set of dashboard widget categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
  Hero,
  Reflection,
  Habits,
  Journal,
  Quickstart,
  Roadmap,
}

impl CardType {
  pub const ALL: [CardType; 6] = [
    Self::Hero,
    Self::Reflection,
    Self::Habits,
    Self::Journal,
    Self::Quickstart,
    Self::Roadmap,
  ];

  /// The wire and column representation. Must match the serde tags above.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Hero => "hero",
      Self::Reflection => "reflection",
      Self::Habits => "habits",
      Self::Journal => "journal",
      Self::Quickstart => "quickstart",
      Self::Roadmap => "roadmap",
    }
  }

  /// Comma-separated list of every accepted value, for error messages.
  pub fn allowed() -> String {
    Self::ALL
      .iter()
      .map(|t| t.as_str())
      .collect::<Vec<_>>()
      .join(", ")
  }
}

impl fmt::Display for CardType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for CardType {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL
      .into_iter()
      .find(|t| t.as_str() == s)
      .ok_or_else(|| Error::UnknownCardType(s.to_owned()))
  }
}

// ─── CardContent ─────────────────────────────────────────────────────────────

/// A persisted card document. At most one exists per `(user_id, card_type)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardContent {
  pub id:         Uuid,
  pub user_id:    String,
  pub card_type:  CardType,
  /// Always a JSON object.
  pub content:    serde_json::Value,
  pub created_at: DateTime<Utc>,
  /// Bumped by every upsert that replaces `content`.
  pub updated_at: DateTime<Utc>,
}

/// Input to [`crate::store::CardStore::upsert_card`]. Identity and
/// timestamps are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewCardContent {
  pub user_id:   String,
  pub card_type: CardType,
  pub content:   serde_json::Value,
}
