//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for documents and
//!   materialized view rows.
//! - Isolate SQLite query details from the indexing service.
//!
//! # Invariants
//! - Document writes allocate a strictly increasing update sequence.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod document_repo;
pub mod view_row_repo;
