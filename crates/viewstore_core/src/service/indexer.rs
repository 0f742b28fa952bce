//! Incremental view index maintenance and queries.
//!
//! # Responsibility
//! - Fold new document changes into each registered view's stored rows.
//! - Serve ordered view queries, validating the view exists first.
//!
//! # Invariants
//! - Each document is mapped independently; no ordering is assumed
//!   between documents within one update.
//! - `update_view` with no new changes is a no-op and reports zero docs.
//! - A document's previous rows are removed before its new rows land.

use crate::model::document::Document;
use crate::repo::document_repo::{DocumentRepository, RepoError, SqliteDocumentRepository};
use crate::repo::view_row_repo::{SqliteViewRowRepository, ViewQuery, ViewRow};
use crate::view::map::run_map;
use crate::view::registry::{RegistryError, ViewRegistry};
use log::info;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type IndexResult<T> = Result<T, IndexError>;

/// Indexing-layer error combining registry and persistence failures.
#[derive(Debug)]
pub enum IndexError {
    Registry(RegistryError),
    Repo(RepoError),
}

impl Display for IndexError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Registry(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for IndexError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Registry(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RegistryError> for IndexError {
    fn from(value: RegistryError) -> Self {
        Self::Registry(value)
    }
}

impl From<RepoError> for IndexError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Outcome summary of one `update_view` run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexUpdate {
    /// Documents folded into the view during this run.
    pub docs_indexed: usize,
    /// Rows emitted by the map function during this run.
    pub rows_emitted: usize,
    /// High-water mark after this run.
    pub indexed_seq: i64,
}

/// View index maintenance over one SQLite connection.
pub struct ViewIndexer<'conn> {
    conn: &'conn Connection,
    registry: ViewRegistry,
}

impl<'conn> ViewIndexer<'conn> {
    pub fn new(conn: &'conn Connection, registry: ViewRegistry) -> Self {
        Self { conn, registry }
    }

    pub fn registry(&self) -> &ViewRegistry {
        &self.registry
    }

    /// Stores a document and returns its update sequence.
    ///
    /// Stored documents become visible to views on the next update run.
    pub fn put_document(&self, doc: &Document) -> IndexResult<i64> {
        let repo = SqliteDocumentRepository::new(self.conn);
        Ok(repo.put_document(doc)?)
    }

    /// Tombstones a document and returns the delete sequence.
    pub fn delete_document(&self, id: &str) -> IndexResult<i64> {
        let repo = SqliteDocumentRepository::new(self.conn);
        Ok(repo.delete_document(id)?)
    }

    /// Reads one live document by id.
    pub fn get_document(&self, id: &str) -> IndexResult<Option<Document>> {
        let repo = SqliteDocumentRepository::new(self.conn);
        Ok(repo.get_document(id)?)
    }

    /// Folds pending document changes into one view's stored rows.
    ///
    /// # Side effects
    /// - Emits `view_update` logging events with counts and duration.
    pub fn update_view(&self, design: &str, view: &str) -> IndexResult<IndexUpdate> {
        let started_at = Instant::now();
        let map_fn = self.registry.get(design, view)?;

        let doc_repo = SqliteDocumentRepository::new(self.conn);
        let row_repo = SqliteViewRowRepository::new(self.conn);

        let since = row_repo.indexed_seq(design, view)?;
        let changes = doc_repo.changes_since(since, None)?;

        let mut update = IndexUpdate {
            docs_indexed: 0,
            rows_emitted: 0,
            indexed_seq: since,
        };

        for change in &changes {
            let rows = match &change.document {
                Some(doc) => run_map(map_fn.as_ref(), doc),
                None => Vec::new(),
            };
            update.rows_emitted += rows.len();
            row_repo.replace_rows_for_doc(design, view, &change.doc_id, &rows)?;
            update.docs_indexed += 1;
            update.indexed_seq = update.indexed_seq.max(change.seq);
        }

        if update.indexed_seq > since {
            row_repo.set_indexed_seq(design, view, update.indexed_seq)?;
        }

        info!(
            "event=view_update module=indexer status=ok design={design} view={view} docs={} rows={} indexed_seq={} duration_ms={}",
            update.docs_indexed,
            update.rows_emitted,
            update.indexed_seq,
            started_at.elapsed().as_millis()
        );

        Ok(update)
    }

    /// Runs `update_view` for every registered view.
    pub fn update_all(&self) -> IndexResult<Vec<IndexUpdate>> {
        let mut updates = Vec::new();
        for (design, view) in self.registry.view_ids() {
            updates.push(self.update_view(&design, &view)?);
        }
        Ok(updates)
    }

    /// Queries one view's rows in collation order.
    ///
    /// Fails with [`RegistryError::ViewNotFound`] for unregistered views
    /// instead of silently returning an empty result.
    pub fn query_view(
        &self,
        design: &str,
        view: &str,
        query: &ViewQuery,
    ) -> IndexResult<Vec<ViewRow>> {
        self.registry.get(design, view)?;
        let row_repo = SqliteViewRowRepository::new(self.conn);
        Ok(row_repo.scan(design, view, query)?)
    }
}
