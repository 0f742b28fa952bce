//! Map-function contract and emit collector.
//!
//! # Responsibility
//! - Define the `MapFn` trait every view implements.
//! - Collect emitted `(key, value)` pairs on behalf of the host.
//!
//! # Invariants
//! - A map invocation sees exactly one document and no shared state.
//! - Emission order within one invocation is preserved.

use crate::model::document::Document;
use serde_json::Value;

/// One `(key, value)` pair produced by a map function.
#[derive(Debug, Clone, PartialEq)]
pub struct EmittedRow {
    pub key: Value,
    pub value: Value,
}

/// Host-side collector passed into map invocations.
///
/// Plays the role of the `emit` callback a view engine hands to its map
/// functions: each call records one row for the index being built.
#[derive(Debug, Default)]
pub struct Emitter {
    rows: Vec<EmittedRow>,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one emitted row.
    pub fn emit(&mut self, key: Value, value: Value) {
        self.rows.push(EmittedRow { key, value });
    }

    pub fn rows(&self) -> &[EmittedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Consumes the collector, returning rows in emission order.
    pub fn into_rows(self) -> Vec<EmittedRow> {
        self.rows
    }
}

/// A view map function: one document in, zero or more emitted rows out.
///
/// Implementations must not fail; a document that does not match simply
/// produces no rows.
pub trait MapFn {
    fn map(&self, doc: &Document, emitter: &mut Emitter);
}

impl std::fmt::Debug for dyn MapFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MapFn")
    }
}

/// Runs one map function over one document and returns the emitted rows.
pub fn run_map(map_fn: &dyn MapFn, doc: &Document) -> Vec<EmittedRow> {
    let mut emitter = Emitter::new();
    map_fn.map(doc, &mut emitter);
    emitter.into_rows()
}
