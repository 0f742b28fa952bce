//! Core view-indexing logic for viewstore.
//! This crate is the single source of truth for index invariants.
//!
//! Documents are JSON objects carrying a `type` discriminator. Map
//! functions project matching documents into `(key, value)` rows, and the
//! indexer folds those rows into a SQLite-backed secondary index that can
//! be scanned in key collation order.

pub mod db;
pub mod json;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod view;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::document::{DocId, Document, DocumentError};
pub use model::task::{ProjectTask, TaskDecodeError};
pub use repo::document_repo::{
    DocumentChange, DocumentRepository, RepoError, RepoResult, SqliteDocumentRepository,
};
pub use repo::view_row_repo::{SqliteViewRowRepository, ViewQuery, ViewRow};
pub use service::indexer::{IndexError, IndexResult, IndexUpdate, ViewIndexer};
pub use view::map::{run_map, EmittedRow, Emitter, MapFn};
pub use view::project_task::{project_task_list, FieldProjection};
pub use view::registry::{builtin_registry, DesignDoc, RegistryError, ViewRegistry};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
