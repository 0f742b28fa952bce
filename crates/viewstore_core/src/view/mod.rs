//! View layer: map functions, key collation and the design registry.
//!
//! # Responsibility
//! - Define the map-function contract documents flow through.
//! - Order emitted keys the way the index stores and scans them.
//! - Group named views into design documents.
//!
//! # Invariants
//! - Map functions are pure and infallible; they only read the document.
//! - Key ordering is total and agrees with the stored byte encoding.

pub mod collation;
pub mod map;
pub mod project_task;
pub mod registry;
