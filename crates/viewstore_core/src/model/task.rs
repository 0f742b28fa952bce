//! Typed `project-task` document codec.
//!
//! # Responsibility
//! - Give ingestion callers a typed shape for `project-task` documents.
//! - Render/parse date fields via the canonical document date patterns.
//!
//! # Invariants
//! - `to_document` always stamps `type = "project-task"`.
//! - Optional fields absent on the record are absent from the body, not null.

use crate::json::dates::{format_utc, parse_datetime};
use crate::model::document::{DocId, Document};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Decode error for typed `project-task` reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskDecodeError {
    /// Document `type` is missing or not `project-task`.
    WrongType { found: Option<String> },
    /// A required field is missing or not a string.
    MissingField(&'static str),
    /// A present field has an unusable value.
    InvalidField {
        field: &'static str,
        message: String,
    },
}

impl Display for TaskDecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WrongType { found: Some(found) } => {
                write!(f, "expected document type `project-task`, found `{found}`")
            }
            Self::WrongType { found: None } => {
                write!(f, "expected document type `project-task`, found none")
            }
            Self::MissingField(field) => write!(f, "missing required field `{field}`"),
            Self::InvalidField { field, message } => {
                write!(f, "invalid field `{field}`: {message}")
            }
        }
    }
}

impl Error for TaskDecodeError {}

/// Typed record for the `project-task` document shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectTask {
    /// Owning project identifier.
    pub project_id: String,
    /// Task display name.
    pub name: String,
    /// Scheduled start, when known.
    pub start_date: Option<DateTime<Utc>>,
    /// Actual completion, when the task has finished.
    pub completion_date: Option<DateTime<Utc>>,
    /// Planned effort in hours.
    pub estimated_hours: Option<f64>,
    /// Recorded effort in hours.
    pub actual_hours: Option<f64>,
}

impl ProjectTask {
    /// Document `type` value for this record.
    pub const DOC_TYPE: &'static str = "project-task";

    /// Creates a task with only the required identity fields set.
    pub fn new(project_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            name: name.into(),
            start_date: None,
            completion_date: None,
            estimated_hours: None,
            actual_hours: None,
        }
    }

    /// Renders this record as a storable document under the given id.
    ///
    /// Date fields use the canonical pattern so every producer writes the
    /// same textual form.
    pub fn to_document(&self, id: impl Into<DocId>) -> Document {
        let mut body = Map::new();
        body.insert("type".to_string(), Value::String(Self::DOC_TYPE.to_string()));
        body.insert(
            "projectId".to_string(),
            Value::String(self.project_id.clone()),
        );
        body.insert("name".to_string(), Value::String(self.name.clone()));
        if let Some(start) = &self.start_date {
            body.insert("startDate".to_string(), Value::String(format_utc(start)));
        }
        if let Some(completion) = &self.completion_date {
            body.insert(
                "completionDate".to_string(),
                Value::String(format_utc(completion)),
            );
        }
        if let Some(estimated) = self.estimated_hours {
            body.insert("estimatedHours".to_string(), json_number(estimated));
        }
        if let Some(actual) = self.actual_hours {
            body.insert("actualHours".to_string(), json_number(actual));
        }
        Document::new(id, body)
    }

    /// Decodes a typed record from a raw document.
    ///
    /// # Errors
    /// - [`TaskDecodeError::WrongType`] when `type` is not `project-task`.
    /// - [`TaskDecodeError::MissingField`] when `projectId` or `name` is
    ///   missing or non-string.
    /// - [`TaskDecodeError::InvalidField`] when a date or hours field is
    ///   present but unparseable.
    pub fn from_document(doc: &Document) -> Result<Self, TaskDecodeError> {
        match doc.doc_type() {
            Some(Self::DOC_TYPE) => {}
            found => {
                return Err(TaskDecodeError::WrongType {
                    found: found.map(str::to_string),
                });
            }
        }

        Ok(Self {
            project_id: required_string(doc, "projectId")?,
            name: required_string(doc, "name")?,
            start_date: optional_date(doc, "startDate")?,
            completion_date: optional_date(doc, "completionDate")?,
            estimated_hours: optional_hours(doc, "estimatedHours")?,
            actual_hours: optional_hours(doc, "actualHours")?,
        })
    }
}

fn json_number(value: f64) -> Value {
    serde_json::Number::from_f64(value).map_or(Value::Null, Value::Number)
}

fn required_string(doc: &Document, field: &'static str) -> Result<String, TaskDecodeError> {
    doc.field(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(TaskDecodeError::MissingField(field))
}

fn optional_date(
    doc: &Document,
    field: &'static str,
) -> Result<Option<DateTime<Utc>>, TaskDecodeError> {
    match doc.field(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => {
            parse_datetime(text)
                .map(Some)
                .ok_or_else(|| TaskDecodeError::InvalidField {
                    field,
                    message: format!("unrecognized date `{text}`"),
                })
        }
        Some(other) => Err(TaskDecodeError::InvalidField {
            field,
            message: format!("expected date string, found {other}"),
        }),
    }
}

fn optional_hours(doc: &Document, field: &'static str) -> Result<Option<f64>, TaskDecodeError> {
    match doc.field(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => Ok(number.as_f64()),
        Some(other) => Err(TaskDecodeError::InvalidField {
            field,
            message: format!("expected number, found {other}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::{ProjectTask, TaskDecodeError};
    use crate::model::document::Document;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn document_roundtrip_preserves_all_fields() {
        let mut task = ProjectTask::new("P1", "Design");
        task.start_date = Some(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());
        task.completion_date = Some(Utc.with_ymd_and_hms(2020, 2, 1, 0, 0, 0).unwrap());
        task.estimated_hours = Some(40.0);
        task.actual_hours = Some(38.0);

        let doc = task.to_document("task-1");
        assert_eq!(doc.doc_type(), Some("project-task"));
        assert_eq!(doc.field("startDate"), Some(&json!("2020/01/01 00:00:00 +0000")));

        let decoded = ProjectTask::from_document(&doc).expect("roundtrip should decode");
        assert_eq!(decoded, task);
    }

    #[test]
    fn optional_fields_stay_absent() {
        let doc = ProjectTask::new("P1", "Design").to_document("task-1");
        assert_eq!(doc.field("startDate"), None);
        assert_eq!(doc.field("estimatedHours"), None);

        let decoded = ProjectTask::from_document(&doc).unwrap();
        assert_eq!(decoded.start_date, None);
        assert_eq!(decoded.estimated_hours, None);
    }

    #[test]
    fn wrong_type_is_rejected() {
        let doc = Document::from_value(json!({"_id": "n1", "type": "note"})).unwrap();
        assert_eq!(
            ProjectTask::from_document(&doc).unwrap_err(),
            TaskDecodeError::WrongType {
                found: Some("note".to_string())
            }
        );
    }

    #[test]
    fn bad_field_values_are_reported_per_field() {
        let doc = Document::from_value(json!({
            "_id": "t1",
            "type": "project-task",
            "projectId": "P1",
            "name": "Design",
            "startDate": "yesterday",
        }))
        .unwrap();
        assert!(matches!(
            ProjectTask::from_document(&doc).unwrap_err(),
            TaskDecodeError::InvalidField {
                field: "startDate",
                ..
            }
        ));

        let doc = Document::from_value(json!({
            "_id": "t2",
            "type": "project-task",
            "projectId": "P1",
            "name": "Design",
            "estimatedHours": "forty",
        }))
        .unwrap();
        assert!(matches!(
            ProjectTask::from_document(&doc).unwrap_err(),
            TaskDecodeError::InvalidField {
                field: "estimatedHours",
                ..
            }
        ));
    }

    #[test]
    fn missing_identity_fields_are_reported() {
        let doc = Document::from_value(json!({"_id": "t1", "type": "project-task"})).unwrap();
        assert_eq!(
            ProjectTask::from_document(&doc).unwrap_err(),
            TaskDecodeError::MissingField("projectId")
        );
    }
}
