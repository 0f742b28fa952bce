//! Date rendering and lenient parsing for document fields.
//!
//! # Responsibility
//! - Render timestamps in the canonical `yyyy/MM/dd HH:mm:ss Z` form used
//!   by stored documents.
//! - Parse date strings from the historical family of accepted patterns so
//!   documents written by older producers still decode.
//!
//! # Invariants
//! - `format_utc` output always parses back via `parse_datetime`.
//! - Parsing never panics; unknown shapes return `None`.

use chrono::{DateTime, Utc};

/// Canonical pattern for dates written into document bodies.
pub const CANONICAL_DATE_PATTERN: &str = "%Y/%m/%d %H:%M:%S %z";

/// Slash-separated patterns accepted on input, tried in order.
///
/// Covers optional fractional seconds and offsets with or without a
/// separating space. Named zones are accepted only as numeric offsets.
const ACCEPTED_PATTERNS: &[&str] = &[
    CANONICAL_DATE_PATTERN,
    "%Y/%m/%d %H:%M:%S%.f %z",
    "%Y/%m/%d %H:%M:%S%z",
    "%Y/%m/%d %H:%M:%S%.f%z",
];

/// Renders a timestamp in the canonical document form, normalized to UTC.
pub fn format_utc(datetime: &DateTime<Utc>) -> String {
    datetime.format(CANONICAL_DATE_PATTERN).to_string()
}

/// Parses a date string leniently against the accepted pattern family.
///
/// Falls back to RFC 2822 (`Mon, 02 Jan 2006 15:04:05 +0000`) for values
/// produced by HTTP-adjacent tooling. Returns `None` when no pattern fits.
pub fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    for pattern in ACCEPTED_PATTERNS {
        if let Ok(parsed) = DateTime::parse_from_str(trimmed, pattern) {
            return Some(parsed.with_timezone(&Utc));
        }
    }

    DateTime::parse_from_rfc2822(trimmed)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}
