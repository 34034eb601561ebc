//! Bulk instructions and their wire form.
//!
//! Every instruction renders into one metadata line, optionally followed by a
//! body line, in the newline-delimited JSON shape the `_bulk` endpoint expects:
//!
//! ```text
//! {"index":{"_id":"1","_index":"people","_routing":"eu"}}
//! {"name":"ada"}
//! {"delete":{"_id":"2","_index":"people"}}
//! ```

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

// ============================================================================
// Instruction Trait
// ============================================================================

/// One logical bulk operation.
///
/// Instructions are immutable once built. Submitting one moves it into the
/// batch owner, which renders it into the current batch buffer.
pub trait Instruction: Send + fmt::Debug + 'static {
  /// Document id this instruction targets
  fn id(&self) -> &str;

  /// The bulk action keyword
  fn action(&self) -> Action;

  /// Append the wire form of this instruction to `sink`.
  ///
  /// Implementations may leave partial output behind on error; callers that
  /// need all-or-nothing appends must roll the sink back themselves.
  fn write_to(&self, sink: &mut Vec<u8>) -> Result<(), RenderError>;
}

/// Bulk action keyword used as the key of the metadata line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
  Index,
  Delete,
}

impl Action {
  pub fn as_str(&self) -> &'static str {
    match self {
      Action::Index => "index",
      Action::Delete => "delete",
    }
  }
}

impl fmt::Display for Action {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ============================================================================
// Metadata
// ============================================================================

/// Metadata shared by every action line.
///
/// `_type` and `_routing` are left out of the wire form when unset or empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metadata {
  #[serde(rename = "_id")]
  pub id: String,
  #[serde(rename = "_index")]
  pub index: String,
  #[serde(rename = "_type", skip_serializing_if = "is_blank")]
  pub doc_type: Option<String>,
  #[serde(rename = "_routing", skip_serializing_if = "is_blank")]
  pub routing: Option<String>,
}

fn is_blank(value: &Option<String>) -> bool {
  value.as_deref().is_none_or(str::is_empty)
}

fn non_empty(value: impl Into<String>) -> Option<String> {
  let value = value.into();
  if value.is_empty() { None } else { Some(value) }
}

impl Metadata {
  pub fn new(id: impl Into<String>, index: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      index: index.into(),
      doc_type: None,
      routing: None,
    }
  }

  fn validate(&self) -> Result<(), RenderError> {
    if self.id.is_empty() {
      return Err(RenderError::MissingField { field: "_id" });
    }
    if self.index.is_empty() {
      return Err(RenderError::MissingField { field: "_index" });
    }
    Ok(())
  }

  fn write_line(&self, action: Action, sink: &mut Vec<u8>) -> Result<(), RenderError> {
    let line = match action {
      Action::Index => ActionLine::Index(self),
      Action::Delete => ActionLine::Delete(self),
    };
    serde_json::to_writer(&mut *sink, &line)?;
    sink.push(b'\n');
    Ok(())
  }
}

/// Externally tagged wrapper producing `{"<action>":{...}}`
#[derive(Serialize)]
#[serde(rename_all = "lowercase")]
enum ActionLine<'a> {
  Index(&'a Metadata),
  Delete(&'a Metadata),
}

// ============================================================================
// Update
// ============================================================================

/// Index (create or replace) a document.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateInstruction {
  meta: Metadata,
  body: Value,
}

impl UpdateInstruction {
  pub fn new(id: impl Into<String>, index: impl Into<String>, body: Map<String, Value>) -> Self {
    Self {
      meta: Metadata::new(id, index),
      body: Value::Object(body),
    }
  }

  /// Build from an arbitrary JSON value. Anything other than an object is
  /// rejected when the instruction is rendered, not here.
  pub fn from_value(id: impl Into<String>, index: impl Into<String>, body: Value) -> Self {
    Self {
      meta: Metadata::new(id, index),
      body,
    }
  }

  /// Build from any serializable document
  pub fn from_document<T: Serialize>(
    id: impl Into<String>,
    index: impl Into<String>,
    document: &T,
  ) -> Result<Self, RenderError> {
    let body = serde_json::to_value(document)?;
    Ok(Self::from_value(id, index, body))
  }

  pub fn with_type(mut self, doc_type: impl Into<String>) -> Self {
    self.meta.doc_type = non_empty(doc_type);
    self
  }

  pub fn with_routing(mut self, routing: impl Into<String>) -> Self {
    self.meta.routing = non_empty(routing);
    self
  }

  pub fn metadata(&self) -> &Metadata {
    &self.meta
  }

  pub fn body(&self) -> &Value {
    &self.body
  }
}

impl Instruction for UpdateInstruction {
  fn id(&self) -> &str {
    &self.meta.id
  }

  fn action(&self) -> Action {
    Action::Index
  }

  fn write_to(&self, sink: &mut Vec<u8>) -> Result<(), RenderError> {
    self.meta.validate()?;
    let Value::Object(body) = &self.body else {
      return Err(RenderError::BodyNotObject {
        id: self.meta.id.clone(),
        kind: value_kind(&self.body),
      });
    };

    self.meta.write_line(Action::Index, sink)?;
    serde_json::to_writer(&mut *sink, body)?;
    sink.push(b'\n');
    Ok(())
  }
}

fn value_kind(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "boolean",
    Value::Number(_) => "number",
    Value::String(_) => "string",
    Value::Array(_) => "array",
    Value::Object(_) => "object",
  }
}

// ============================================================================
// Delete
// ============================================================================

/// Remove a document from an index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteInstruction {
  meta: Metadata,
}

impl DeleteInstruction {
  pub fn new(id: impl Into<String>, index: impl Into<String>) -> Self {
    Self {
      meta: Metadata::new(id, index),
    }
  }

  pub fn with_type(mut self, doc_type: impl Into<String>) -> Self {
    self.meta.doc_type = non_empty(doc_type);
    self
  }

  pub fn with_routing(mut self, routing: impl Into<String>) -> Self {
    self.meta.routing = non_empty(routing);
    self
  }

  pub fn metadata(&self) -> &Metadata {
    &self.meta
  }
}

impl Instruction for DeleteInstruction {
  fn id(&self) -> &str {
    &self.meta.id
  }

  fn action(&self) -> Action {
    Action::Delete
  }

  fn write_to(&self, sink: &mut Vec<u8>) -> Result<(), RenderError> {
    self.meta.validate()?;
    self.meta.write_line(Action::Delete, sink)
  }
}

// ============================================================================
// Errors
// ============================================================================

/// Why an instruction could not be rendered
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
  #[error("Missing required field {field}")]
  MissingField { field: &'static str },
  #[error("Body of document {id} must be a JSON object, got {kind}")]
  BodyNotObject { id: String, kind: &'static str },
  #[error("Encoding failed: {0}")]
  Encode(#[from] serde_json::Error),
  #[error("Invalid instruction: {0}")]
  Invalid(String),
}
