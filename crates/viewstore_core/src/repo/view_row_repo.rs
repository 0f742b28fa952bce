//! View row storage and ordered scans.
//!
//! # Responsibility
//! - Replace the emitted rows for one `(design, view, doc_id)` atomically
//!   with respect to that document.
//! - Scan rows in collation order with key/range/limit options.
//! - Track the per-view indexed sequence high-water mark.
//!
//! # Invariants
//! - Rows are ordered by `(collation_key, doc_id)`; ties never reorder
//!   between scans.
//! - `collation_key` is always derived from `key` at write time.

use crate::repo::document_repo::{RepoError, RepoResult};
use crate::view::collation::collation_key;
use crate::view::map::EmittedRow;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, Row};
use serde_json::Value;

/// One materialized row returned by a view scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewRow {
    pub key: Value,
    pub doc_id: String,
    pub value: Value,
}

/// Query options for ordered view scans.
///
/// `key` short-circuits the range bounds; `start_key`/`end_key` are both
/// inclusive. Equal keys tie-break by `doc_id`, reversed under
/// `descending`.
#[derive(Debug, Clone, Default)]
pub struct ViewQuery {
    pub key: Option<Value>,
    pub start_key: Option<Value>,
    pub end_key: Option<Value>,
    pub descending: bool,
    pub limit: Option<u32>,
}

impl ViewQuery {
    /// Creates an exact-key query.
    pub fn by_key(key: Value) -> Self {
        Self {
            key: Some(key),
            ..Self::default()
        }
    }
}

/// SQLite-backed view row repository.
pub struct SqliteViewRowRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteViewRowRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Replaces every row this document previously contributed to the view.
    ///
    /// Passing an empty slice clears the document's contribution, which is
    /// how tombstoned and no-longer-matching documents leave the index.
    pub fn replace_rows_for_doc(
        &self,
        design: &str,
        view: &str,
        doc_id: &str,
        rows: &[EmittedRow],
    ) -> RepoResult<()> {
        self.conn.execute(
            "DELETE FROM view_rows WHERE design = ?1 AND view = ?2 AND doc_id = ?3;",
            params![design, view, doc_id],
        )?;

        let mut insert = self.conn.prepare(
            "INSERT INTO view_rows (design, view, doc_id, collation_key, key, value)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
        )?;
        for row in rows {
            let key_text = encode_json(&row.key, "view row key")?;
            let value_text = encode_json(&row.value, "view row value")?;
            insert.execute(params![
                design,
                view,
                doc_id,
                collation_key(&row.key),
                key_text,
                value_text,
            ])?;
        }

        Ok(())
    }

    /// Scans rows for one view in collation order.
    pub fn scan(&self, design: &str, view: &str, query: &ViewQuery) -> RepoResult<Vec<ViewRow>> {
        let mut sql = String::from(
            "SELECT key, doc_id, value
             FROM view_rows
             WHERE design = ? AND view = ?",
        );
        let mut bind_values: Vec<SqlValue> = vec![
            SqlValue::Text(design.to_string()),
            SqlValue::Text(view.to_string()),
        ];

        if let Some(key) = &query.key {
            sql.push_str(" AND collation_key = ?");
            bind_values.push(SqlValue::Blob(collation_key(key)));
        } else {
            if let Some(start_key) = &query.start_key {
                sql.push_str(" AND collation_key >= ?");
                bind_values.push(SqlValue::Blob(collation_key(start_key)));
            }
            if let Some(end_key) = &query.end_key {
                sql.push_str(" AND collation_key <= ?");
                bind_values.push(SqlValue::Blob(collation_key(end_key)));
            }
        }

        if query.descending {
            sql.push_str(" ORDER BY collation_key DESC, doc_id DESC");
        } else {
            sql.push_str(" ORDER BY collation_key ASC, doc_id ASC");
        }

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(SqlValue::Integer(i64::from(limit)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut result = Vec::new();

        while let Some(row) = rows.next()? {
            result.push(parse_view_row(row)?);
        }

        Ok(result)
    }

    /// Returns the indexed sequence high-water mark for one view.
    ///
    /// Views that have never been updated report 0.
    pub fn indexed_seq(&self, design: &str, view: &str) -> RepoResult<i64> {
        let mut stmt = self.conn.prepare(
            "SELECT indexed_seq FROM view_state WHERE design = ?1 AND view = ?2;",
        )?;
        let mut rows = stmt.query(params![design, view])?;
        if let Some(row) = rows.next()? {
            return Ok(row.get(0)?);
        }
        Ok(0)
    }

    /// Advances the indexed sequence high-water mark for one view.
    pub fn set_indexed_seq(&self, design: &str, view: &str, seq: i64) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO view_state (design, view, indexed_seq)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (design, view) DO UPDATE SET indexed_seq = excluded.indexed_seq;",
            params![design, view, seq],
        )?;
        Ok(())
    }
}

fn parse_view_row(row: &Row<'_>) -> RepoResult<ViewRow> {
    let key_text: String = row.get("key")?;
    let value_text: String = row.get("value")?;

    Ok(ViewRow {
        key: decode_json(&key_text, "view_rows.key")?,
        doc_id: row.get("doc_id")?,
        value: decode_json(&value_text, "view_rows.value")?,
    })
}

fn encode_json(value: &Value, what: &str) -> RepoResult<String> {
    serde_json::to_string(value)
        .map_err(|err| RepoError::InvalidData(format!("unserializable {what}: {err}")))
}

fn decode_json(text: &str, column: &str) -> RepoResult<Value> {
    serde_json::from_str(text)
        .map_err(|err| RepoError::InvalidData(format!("invalid JSON in {column}: {err}")))
}
