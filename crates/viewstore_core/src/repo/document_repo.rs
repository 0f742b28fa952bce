//! Document repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide put/get/delete APIs over staged source documents.
//! - Expose the changes feed the incremental indexer consumes.
//!
//! # Invariants
//! - Every put/delete allocates a sequence larger than any earlier write.
//! - Deletes keep a tombstone row so indexers observe the removal.

use crate::db::DbError;
use crate::model::document::{DocId, Document};
use rusqlite::{params, Connection, Row};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(DocId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "document not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// One entry in the changes feed.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentChange {
    pub doc_id: DocId,
    pub seq: i64,
    pub deleted: bool,
    /// Live document body; `None` for tombstones.
    pub document: Option<Document>,
}

/// Repository interface for document storage.
pub trait DocumentRepository {
    /// Inserts or replaces a document, returning its new sequence.
    fn put_document(&self, doc: &Document) -> RepoResult<i64>;
    /// Reads one live document by id. Tombstoned documents read as absent.
    fn get_document(&self, id: &str) -> RepoResult<Option<Document>>;
    /// Tombstones a document, returning the delete sequence.
    fn delete_document(&self, id: &str) -> RepoResult<i64>;
    /// Lists changes with `seq > since`, in sequence order.
    fn changes_since(&self, since: i64, limit: Option<u32>) -> RepoResult<Vec<DocumentChange>>;
}

/// SQLite-backed document repository.
pub struct SqliteDocumentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDocumentRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn next_seq(&self) -> RepoResult<i64> {
        let max: i64 =
            self.conn
                .query_row("SELECT COALESCE(MAX(seq), 0) FROM documents;", [], |row| {
                    row.get(0)
                })?;
        Ok(max + 1)
    }
}

impl DocumentRepository for SqliteDocumentRepository<'_> {
    fn put_document(&self, doc: &Document) -> RepoResult<i64> {
        let seq = self.next_seq()?;
        let body = serde_json::to_string(&doc.body_value())
            .map_err(|err| RepoError::InvalidData(format!("unserializable body: {err}")))?;

        self.conn.execute(
            "INSERT INTO documents (doc_id, body, seq, is_deleted)
             VALUES (?1, ?2, ?3, 0)
             ON CONFLICT (doc_id) DO UPDATE SET
                body = excluded.body,
                seq = excluded.seq,
                is_deleted = 0,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![doc.id, body, seq],
        )?;

        Ok(seq)
    }

    fn get_document(&self, id: &str) -> RepoResult<Option<Document>> {
        let mut stmt = self.conn.prepare(
            "SELECT doc_id, body, seq, is_deleted
             FROM documents
             WHERE doc_id = ?1 AND is_deleted = 0;",
        )?;

        let mut rows = stmt.query(params![id])?;
        if let Some(row) = rows.next()? {
            return Ok(parse_change_row(row)?.document);
        }

        Ok(None)
    }

    fn delete_document(&self, id: &str) -> RepoResult<i64> {
        let seq = self.next_seq()?;
        let changed = self.conn.execute(
            "UPDATE documents
             SET
                is_deleted = 1,
                seq = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE doc_id = ?2 AND is_deleted = 0;",
            params![seq, id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id.to_string()));
        }

        Ok(seq)
    }

    fn changes_since(&self, since: i64, limit: Option<u32>) -> RepoResult<Vec<DocumentChange>> {
        let mut sql = String::from(
            "SELECT doc_id, body, seq, is_deleted
             FROM documents
             WHERE seq > ?1
             ORDER BY seq ASC",
        );
        if limit.is_some() {
            sql.push_str(" LIMIT ?2");
        }
        sql.push(';');

        let mut stmt = self.conn.prepare(&sql)?;
        let mut changes = Vec::new();

        let mut rows = match limit {
            Some(limit) => stmt.query(params![since, i64::from(limit)])?,
            None => stmt.query(params![since])?,
        };
        while let Some(row) = rows.next()? {
            changes.push(parse_change_row(row)?);
        }

        Ok(changes)
    }
}

fn parse_change_row(row: &Row<'_>) -> RepoResult<DocumentChange> {
    let doc_id: String = row.get("doc_id")?;
    let seq: i64 = row.get("seq")?;

    let deleted = match row.get::<_, i64>("is_deleted")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_deleted value `{other}` in documents.is_deleted"
            )));
        }
    };

    let document = if deleted {
        None
    } else {
        let body_text: String = row.get("body")?;
        let body: Value = serde_json::from_str(&body_text).map_err(|err| {
            RepoError::InvalidData(format!("unparseable body for `{doc_id}`: {err}"))
        })?;
        let Value::Object(body) = body else {
            return Err(RepoError::InvalidData(format!(
                "body for `{doc_id}` is not a JSON object"
            )));
        };
        Some(Document::new(doc_id.clone(), body))
    };

    Ok(DocumentChange {
        doc_id,
        seq,
        deleted,
        document,
    })
}
