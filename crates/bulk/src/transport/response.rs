//! Bulk response body parsing.
//!
//! A 200 response can still carry failed items:
//!
//! ```json
//! {"took":3,"errors":true,"items":[
//!   {"index":{"_id":"1","status":201}},
//!   {"index":{"_id":"2","status":400,"error":{"type":"mapper_parsing_exception","reason":"..."}}}
//! ]}
//! ```

use std::{collections::HashMap, fmt};

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
pub struct BulkResponse {
  #[serde(default)]
  pub took: u64,
  #[serde(default)]
  pub errors: bool,
  #[serde(default)]
  pub items: Vec<HashMap<String, ItemResult>>,
}

/// Per-item result, keyed by its action in the response array
#[derive(Debug, Clone, Deserialize)]
pub struct ItemResult {
  #[serde(rename = "_id", default)]
  pub id: Option<String>,
  #[serde(rename = "_index", default)]
  pub index: Option<String>,
  #[serde(default)]
  pub status: u16,
  #[serde(default)]
  pub error: Option<Value>,
}

impl ItemResult {
  fn failed(&self) -> bool {
    self.error.is_some() || self.status >= 300
  }
}

/// One item the service refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
  pub action: String,
  pub id: Option<String>,
  pub status: u16,
  pub reason: String,
}

impl fmt::Display for ItemFailure {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{} {} -> {}: {}",
      self.action,
      self.id.as_deref().unwrap_or("<no id>"),
      self.status,
      self.reason
    )
  }
}

impl BulkResponse {
  pub fn parse(body: &[u8]) -> Result<Self, serde_json::Error> {
    serde_json::from_slice(body)
  }

  /// Items that failed, in response order
  pub fn failures(&self) -> Vec<ItemFailure> {
    self
      .items
      .iter()
      .flat_map(|item| item.iter())
      .filter(|(_, result)| result.failed())
      .map(|(action, result)| ItemFailure {
        action: action.clone(),
        id: result.id.clone(),
        status: result.status,
        reason: describe_error(result.error.as_ref()),
      })
      .collect()
  }
}

/// Older servers report errors as plain strings, newer ones as objects
fn describe_error(error: Option<&Value>) -> String {
  match error {
    None => "no error detail".to_string(),
    Some(Value::String(message)) => message.clone(),
    Some(Value::Object(map)) => {
      let kind = map.get("type").and_then(Value::as_str).unwrap_or("error");
      match map.get("reason").and_then(Value::as_str) {
        Some(reason) => format!("{kind}: {reason}"),
        None => kind.to_string(),
      }
    }
    Some(other) => other.to_string(),
  }
}
