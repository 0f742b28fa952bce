//! Domain model for documents consumed by the view pipeline.
//!
//! # Responsibility
//! - Define the canonical JSON document shape fed to map functions.
//! - Provide the typed `project-task` record used by ingestion callers.
//!
//! # Invariants
//! - Every document is identified by a stable string `DocId`.
//! - The view layer treats document bodies as read-only.

pub mod document;
pub mod task;
