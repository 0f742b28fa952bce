//! Field-projection map functions and the builtin `project-task` view.
//!
//! # Responsibility
//! - Filter documents on an exact `type` literal.
//! - Project named body fields into an array key and an object value.
//!
//! # Invariants
//! - A non-matching document emits zero rows; a matching one emits exactly one.
//! - Projected fields are copied verbatim; missing fields become JSON null.

use crate::model::document::Document;
use crate::view::map::{Emitter, MapFn};
use serde_json::{Map, Value};

/// Map function that indexes one document type by a fixed field projection.
///
/// The key is an array of the named key fields; the value is an object of
/// the named value fields. Fields absent from the document project as
/// `null` rather than failing, so partially-filled documents still index.
#[derive(Debug, Clone)]
pub struct FieldProjection {
    doc_type: String,
    key_fields: Vec<String>,
    value_fields: Vec<String>,
}

impl FieldProjection {
    pub fn new<K, V>(doc_type: impl Into<String>, key_fields: K, value_fields: V) -> Self
    where
        K: IntoIterator,
        K::Item: Into<String>,
        V: IntoIterator,
        V::Item: Into<String>,
    {
        Self {
            doc_type: doc_type.into(),
            key_fields: key_fields.into_iter().map(Into::into).collect(),
            value_fields: value_fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the `type` literal this projection filters on.
    pub fn doc_type(&self) -> &str {
        &self.doc_type
    }

    fn project(&self, doc: &Document, field: &str) -> Value {
        doc.field(field).cloned().unwrap_or(Value::Null)
    }
}

impl MapFn for FieldProjection {
    fn map(&self, doc: &Document, emitter: &mut Emitter) {
        if doc.doc_type() != Some(self.doc_type.as_str()) {
            return;
        }

        let key = Value::Array(
            self.key_fields
                .iter()
                .map(|field| self.project(doc, field))
                .collect(),
        );

        let mut value = Map::new();
        for field in &self.value_fields {
            value.insert(field.clone(), self.project(doc, field));
        }

        emitter.emit(key, Value::Object(value));
    }
}

/// The `project-task/list` view projection.
///
/// For documents with `type == "project-task"`, emits key
/// `[projectId, name]` and value
/// `{name, startDate, completionDate, estimatedHours, actualHours}`.
pub fn project_task_list() -> FieldProjection {
    FieldProjection::new(
        "project-task",
        ["projectId", "name"],
        [
            "name",
            "startDate",
            "completionDate",
            "estimatedHours",
            "actualHours",
        ],
    )
}
