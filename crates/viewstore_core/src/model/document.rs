//! JSON document model.
//!
//! # Responsibility
//! - Pair a stable identifier with an arbitrary JSON object body.
//! - Expose the `type` discriminator field map functions filter on.
//!
//! # Invariants
//! - `id` is stable and never reused for another document.
//! - The body is always a JSON object, never a bare scalar or array.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for every stored document.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type DocId = String;

/// Error raised when raw JSON cannot be treated as a document body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// The provided JSON value is not an object.
    NotAnObject,
    /// The `_id` field is missing or not a string.
    MissingId,
}

impl Display for DocumentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnObject => write!(f, "document body must be a JSON object"),
            Self::MissingId => write!(f, "document is missing a string `_id` field"),
        }
    }
}

impl Error for DocumentError {}

/// One JSON document as seen by map functions.
///
/// The body keeps whatever fields the caller stored; the view layer only
/// ever reads them. Serialized form inlines the id as `_id` next to the
/// body fields, matching the wire shape of document-store payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Stable document identifier.
    #[serde(rename = "_id")]
    pub id: DocId,
    /// Arbitrary caller-defined fields.
    #[serde(flatten)]
    pub body: Map<String, Value>,
}

impl Document {
    /// Creates a document from an id and a prepared body map.
    pub fn new(id: impl Into<DocId>, body: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            body,
        }
    }

    /// Creates a document with a generated identifier.
    ///
    /// Used by ingestion paths where the caller has no external identity.
    pub fn with_generated_id(body: Map<String, Value>) -> Self {
        Self::new(Uuid::new_v4().simple().to_string(), body)
    }

    /// Builds a document from a raw JSON value carrying an `_id` field.
    ///
    /// # Errors
    /// - [`DocumentError::NotAnObject`] when `value` is not an object.
    /// - [`DocumentError::MissingId`] when `_id` is absent or non-string.
    pub fn from_value(value: Value) -> Result<Self, DocumentError> {
        let Value::Object(mut body) = value else {
            return Err(DocumentError::NotAnObject);
        };
        let id = match body.remove("_id") {
            Some(Value::String(id)) if !id.trim().is_empty() => id,
            _ => return Err(DocumentError::MissingId),
        };
        Ok(Self { id, body })
    }

    /// Returns the `type` discriminator when present as a string.
    pub fn doc_type(&self) -> Option<&str> {
        self.body.get("type").and_then(Value::as_str)
    }

    /// Returns one body field by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.body.get(name)
    }

    /// Returns the body as an owned JSON value.
    pub fn body_value(&self) -> Value {
        Value::Object(self.body.clone())
    }
}
