//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into index-maintenance APIs.
//! - Keep callers decoupled from SQL and row-encoding details.

pub mod indexer;
