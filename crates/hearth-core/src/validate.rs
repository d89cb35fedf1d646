//! Shape validation for card write requests.
//!
//! Request bodies arrive as untyped JSON so each violation can be reported
//! with a precise message. Every function here is pure.

use serde_json::{Map, Value};

use crate::{ValidationError, card::CardType};

/// A validated `POST /update-card` body.
#[derive(Debug, Clone, PartialEq)]
pub struct CardUpdateRequest {
  pub user_id:   Option<String>,
  pub card_type: CardType,
  /// Always a JSON object.
  pub content:   Value,
}

/// One element of a validated `updates` array.
#[derive(Debug, Clone, PartialEq)]
pub struct CardUpdateItem {
  pub card_type: CardType,
  pub content:   Value,
}

/// A validated `POST /bulk-update-cards` body.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkUpdateRequest {
  pub user_id: Option<String>,
  pub updates: Vec<CardUpdateItem>,
}

impl CardUpdateRequest {
  pub fn require_user_id(&self) -> Result<&str, ValidationError> {
    require_user_id(self.user_id.as_deref())
  }
}

impl BulkUpdateRequest {
  pub fn require_user_id(&self) -> Result<&str, ValidationError> {
    require_user_id(self.user_id.as_deref())
  }
}

/// Validate a single-update body: `{cardType, content, userId?}`.
pub fn update_request(body: &Value) -> Result<CardUpdateRequest, ValidationError> {
  let obj = as_object(body, "request body")?;
  let item = update_item(obj, None)?;
  Ok(CardUpdateRequest {
    user_id:   optional_user_id(obj)?,
    card_type: item.card_type,
    content:   item.content,
  })
}

/// Validate a bulk body: `{updates: [{cardType, content}], userId?}`.
///
/// All-or-nothing: the first invalid element rejects the whole batch.
pub fn bulk_request(body: &Value) -> Result<BulkUpdateRequest, ValidationError> {
  let obj = as_object(body, "request body")?;

  let updates = match obj.get("updates") {
    Some(Value::Array(items)) => items,
    Some(_) => return Err(ValidationError::new("updates must be an array")),
    None => return Err(ValidationError::new("updates is required")),
  };
  if updates.is_empty() {
    return Err(ValidationError::new("updates must not be empty"));
  }

  let updates = updates
    .iter()
    .enumerate()
    .map(|(i, item)| {
      let label = format!("updates[{i}]");
      update_item(as_object(item, &label)?, Some(&label))
    })
    .collect::<Result<Vec<_>, _>>()?;

  Ok(BulkUpdateRequest { user_id: optional_user_id(obj)?, updates })
}

/// Parse a card type taken from a query string or path.
pub fn card_type(raw: &str) -> Result<CardType, ValidationError> {
  raw.parse().map_err(|_| {
    ValidationError::new(format!(
      "invalid cardType {raw:?}; expected one of: {}",
      CardType::allowed()
    ))
  })
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn as_object<'a>(
  value: &'a Value,
  label: &str,
) -> Result<&'a Map<String, Value>, ValidationError> {
  value
    .as_object()
    .ok_or_else(|| ValidationError::new(format!("{label} must be a JSON object")))
}

fn update_item(
  obj: &Map<String, Value>,
  label: Option<&str>,
) -> Result<CardUpdateItem, ValidationError> {
  let prefix = label.map(|l| format!("{l}: ")).unwrap_or_default();

  let card_type = match obj.get("cardType") {
    Some(Value::String(raw)) => {
      card_type(raw).map_err(|e| ValidationError::new(format!("{prefix}{e}")))?
    }
    Some(_) => {
      return Err(ValidationError::new(format!("{prefix}cardType must be a string")));
    }
    None => return Err(ValidationError::new(format!("{prefix}cardType is required"))),
  };

  let content = match obj.get("content") {
    Some(content @ Value::Object(_)) => content.clone(),
    Some(Value::Null) | None => {
      return Err(ValidationError::new(format!("{prefix}content is required")));
    }
    Some(_) => {
      return Err(ValidationError::new(format!(
        "{prefix}content must be a JSON object"
      )));
    }
  };

  Ok(CardUpdateItem { card_type, content })
}

fn optional_user_id(obj: &Map<String, Value>) -> Result<Option<String>, ValidationError> {
  match obj.get("userId") {
    None | Some(Value::Null) => Ok(None),
    Some(Value::String(s)) => Ok(Some(s.clone())),
    Some(_) => Err(ValidationError::new("userId must be a string")),
  }
}

fn require_user_id(user_id: Option<&str>) -> Result<&str, ValidationError> {
  let id = user_id.ok_or_else(|| ValidationError::new("userId is required"))?;
  if id.trim().is_empty() {
    return Err(ValidationError::new("userId must not be empty"));
  }
  Ok(id)
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn accepts_well_formed_update() {
    let req = update_request(&json!({
      "cardType": "habits",
      "content": { "streak": 3 },
      "userId": "user-1",
    }))
    .unwrap();
    assert_eq!(req.card_type, CardType::Habits);
    assert_eq!(req.content, json!({ "streak": 3 }));
    assert_eq!(req.require_user_id().unwrap(), "user-1");
  }

  #[test]
  fn rejects_card_type_outside_enum() {
    let err = update_request(&json!({ "cardType": "sidebar", "content": {} }))
      .unwrap_err();
    assert!(err.0.contains("sidebar"), "{err}");
    assert!(err.0.contains("quickstart"), "{err}");
  }

  #[test]
  fn rejects_non_object_content() {
    for content in [json!([1, 2]), json!("text"), json!(7), json!(true)] {
      let err =
        update_request(&json!({ "cardType": "hero", "content": content })).unwrap_err();
      assert_eq!(err.0, "content must be a JSON object");
    }
  }

  #[test]
  fn rejects_missing_content() {
    let err = update_request(&json!({ "cardType": "hero" })).unwrap_err();
    assert_eq!(err.0, "content is required");
    let err = update_request(&json!({ "cardType": "hero", "content": null }))
      .unwrap_err();
    assert_eq!(err.0, "content is required");
  }

  #[test]
  fn rejects_non_string_user_id() {
    let err = update_request(&json!({
      "cardType": "hero",
      "content": {},
      "userId": 42,
    }))
    .unwrap_err();
    assert_eq!(err.0, "userId must be a string");
  }

  #[test]
  fn user_id_is_optional_in_shape_but_required_for_writes() {
    let req = update_request(&json!({ "cardType": "hero", "content": {} })).unwrap();
    assert_eq!(req.user_id, None);
    assert_eq!(req.require_user_id().unwrap_err().0, "userId is required");

    let req = update_request(&json!({ "cardType": "hero", "content": {}, "userId": "  " }))
      .unwrap();
    assert_eq!(req.require_user_id().unwrap_err().0, "userId must not be empty");
  }

  #[test]
  fn bulk_requires_updates_array() {
    let err = bulk_request(&json!({ "updates": {} })).unwrap_err();
    assert_eq!(err.0, "updates must be an array");
    let err = bulk_request(&json!({ "userId": "u" })).unwrap_err();
    assert_eq!(err.0, "updates is required");
    let err = bulk_request(&json!({ "updates": [] })).unwrap_err();
    assert_eq!(err.0, "updates must not be empty");
  }

  #[test]
  fn bulk_rejects_whole_batch_on_one_bad_item() {
    let err = bulk_request(&json!({
      "userId": "u",
      "updates": [
        { "cardType": "hero", "content": {} },
        { "cardType": "nope", "content": {} },
        { "cardType": "journal", "content": {} },
      ],
    }))
    .unwrap_err();
    assert!(err.0.starts_with("updates[1]: invalid cardType"), "{err}");
  }

  #[test]
  fn bulk_preserves_item_order() {
    let req = bulk_request(&json!({
      "userId": "u",
      "updates": [
        { "cardType": "roadmap", "content": { "a": 1 } },
        { "cardType": "reflection", "content": { "b": 2 } },
      ],
    }))
    .unwrap();
    let types: Vec<_> = req.updates.iter().map(|u| u.card_type).collect();
    assert_eq!(types, [CardType::Roadmap, CardType::Reflection]);
  }

  #[test]
  fn non_object_body_is_rejected() {
    assert_eq!(
      update_request(&json!([])).unwrap_err().0,
      "request body must be a JSON object"
    );
    assert_eq!(
      bulk_request(&json!({ "updates": [3] })).unwrap_err().0,
      "updates[0] must be a JSON object"
    );
  }
}
