//! CLI entry point for loading documents and querying views.
//!
//! # Responsibility
//! - Provide a minimal executable to exercise `viewstore_core` end to end.
//! - Keep output deterministic: one JSON line per view row.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::process::ExitCode;

use viewstore_core::db::open_db;
use viewstore_core::{builtin_registry, Document, ViewIndexer, ViewQuery};

const USAGE: &str = "usage:
  viewstore <db-path> load <docs.ndjson>
  viewstore <db-path> query <design> <view> [limit]";

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<(), String> {
    let (db_path, command, rest) = match args {
        [db_path, command, rest @ ..] => (db_path, command.as_str(), rest),
        _ => return Err(USAGE.to_string()),
    };

    let conn = open_db(db_path).map_err(|err| format!("cannot open `{db_path}`: {err}"))?;
    let indexer = ViewIndexer::new(&conn, builtin_registry());

    match (command, rest) {
        ("load", [docs_path]) => load_documents(&indexer, docs_path),
        ("query", [design, view]) => query_view(&indexer, design, view, None),
        ("query", [design, view, limit]) => {
            let limit: u32 = limit
                .parse()
                .map_err(|_| format!("invalid limit `{limit}`"))?;
            query_view(&indexer, design, view, Some(limit))
        }
        _ => Err(USAGE.to_string()),
    }
}

/// Loads newline-delimited JSON documents, then refreshes every view.
fn load_documents(indexer: &ViewIndexer<'_>, docs_path: &str) -> Result<(), String> {
    let file = File::open(docs_path).map_err(|err| format!("cannot open `{docs_path}`: {err}"))?;
    let reader = BufReader::new(file);

    let mut loaded = 0usize;
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.map_err(|err| format!("read error in `{docs_path}`: {err}"))?;
        if line.trim().is_empty() {
            continue;
        }
        let value = serde_json::from_str(&line)
            .map_err(|err| format!("line {}: invalid JSON: {err}", line_no + 1))?;
        let doc =
            Document::from_value(value).map_err(|err| format!("line {}: {err}", line_no + 1))?;
        indexer
            .put_document(&doc)
            .map_err(|err| format!("line {}: {err}", line_no + 1))?;
        loaded += 1;
    }

    let updates = indexer.update_all().map_err(|err| err.to_string())?;
    let rows: usize = updates.iter().map(|update| update.rows_emitted).sum();
    println!("loaded {loaded} documents, emitted {rows} rows");
    Ok(())
}

fn query_view(
    indexer: &ViewIndexer<'_>,
    design: &str,
    view: &str,
    limit: Option<u32>,
) -> Result<(), String> {
    indexer.update_all().map_err(|err| err.to_string())?;

    let query = ViewQuery {
        limit,
        ..ViewQuery::default()
    };
    let rows = indexer
        .query_view(design, view, &query)
        .map_err(|err| err.to_string())?;

    for row in rows {
        let line = serde_json::json!({
            "key": row.key,
            "id": row.doc_id,
            "value": row.value,
        });
        println!("{line}");
    }
    Ok(())
}
