//! View key collation and order-preserving key encoding.
//!
//! # Responsibility
//! - Define the total order over JSON view keys used by index scans.
//! - Encode keys into byte strings whose memcmp order matches that order,
//!   so SQLite can store and range-scan them as plain BLOBs.
//!
//! # Invariants
//! - `collation_key(a) < collation_key(b)` iff `cmp_keys(a, b) == Less`.
//! - Type rank: null < false < true < numbers < strings < arrays < objects.
//! - Numbers collate by numeric value; `1` and `1.0` are equal keys.
//!
//! Encoding scheme: a type-tag byte, then a type-specific payload. Numbers
//! are `f64` big-endian with the sign bit flipped (all bits flipped when
//! negative). Strings are UTF-8 with `0x00` escaped as `0x00 0xFF` and a
//! `0x00 0x00` terminator. Arrays and objects concatenate their element
//! encodings and close with a single `0x00`, which sorts a strict prefix
//! before any longer sequence. String order is raw byte order, a
//! simplification of full ICU collation.

use serde_json::Value;
use std::cmp::Ordering;

const TAG_NULL: u8 = 0x01;
const TAG_FALSE: u8 = 0x02;
const TAG_TRUE: u8 = 0x03;
const TAG_NUMBER: u8 = 0x04;
const TAG_STRING: u8 = 0x05;
const TAG_ARRAY: u8 = 0x06;
const TAG_OBJECT: u8 = 0x07;

const CONTAINER_END: u8 = 0x00;

/// Compares two view keys in collation order.
pub fn cmp_keys(a: &Value, b: &Value) -> Ordering {
    match type_rank(a).cmp(&type_rank(b)) {
        Ordering::Equal => cmp_same_rank(a, b),
        unequal => unequal,
    }
}

/// Encodes a view key as an order-preserving byte string.
pub fn collation_key(key: &Value) -> Vec<u8> {
    let mut out = Vec::new();
    encode_value(key, &mut out);
    out
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => TAG_NULL,
        Value::Bool(false) => TAG_FALSE,
        Value::Bool(true) => TAG_TRUE,
        Value::Number(_) => TAG_NUMBER,
        Value::String(_) => TAG_STRING,
        Value::Array(_) => TAG_ARRAY,
        Value::Object(_) => TAG_OBJECT,
    }
}

fn cmp_same_rank(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(left), Value::Number(right)) => {
            numeric(left).total_cmp(&numeric(right))
        }
        (Value::String(left), Value::String(right)) => left.as_bytes().cmp(right.as_bytes()),
        (Value::Array(left), Value::Array(right)) => {
            for (left_item, right_item) in left.iter().zip(right.iter()) {
                match cmp_keys(left_item, right_item) {
                    Ordering::Equal => continue,
                    unequal => return unequal,
                }
            }
            left.len().cmp(&right.len())
        }
        (Value::Object(left), Value::Object(right)) => {
            for ((left_key, left_value), (right_key, right_value)) in
                left.iter().zip(right.iter())
            {
                match left_key.as_bytes().cmp(right_key.as_bytes()) {
                    Ordering::Equal => {}
                    unequal => return unequal,
                }
                match cmp_keys(left_value, right_value) {
                    Ordering::Equal => {}
                    unequal => return unequal,
                }
            }
            left.len().cmp(&right.len())
        }
        // Null and both bool cases carry no payload beyond the rank.
        _ => Ordering::Equal,
    }
}

fn encode_value(value: &Value, out: &mut Vec<u8>) {
    out.push(type_rank(value));
    match value {
        Value::Null | Value::Bool(_) => {}
        Value::Number(number) => encode_number(numeric(number), out),
        Value::String(text) => encode_bytes(text.as_bytes(), out),
        Value::Array(items) => {
            for item in items {
                encode_value(item, out);
            }
            out.push(CONTAINER_END);
        }
        Value::Object(entries) => {
            for (entry_key, entry_value) in entries {
                encode_bytes(entry_key.as_bytes(), out);
                encode_value(entry_value, out);
            }
            out.push(CONTAINER_END);
        }
    }
}

/// Big-endian `f64` with the sign bit flipped; all bits flipped for
/// negatives. Resulting byte order matches `f64::total_cmp`.
fn encode_number(value: f64, out: &mut Vec<u8>) {
    let mut bits = value.to_bits();
    if bits & (1 << 63) != 0 {
        bits = !bits;
    } else {
        bits ^= 1 << 63;
    }
    out.extend_from_slice(&bits.to_be_bytes());
}

/// `0x00` escaped as `0x00 0xFF`, terminated with `0x00 0x00`.
fn encode_bytes(bytes: &[u8], out: &mut Vec<u8>) {
    for &byte in bytes {
        out.push(byte);
        if byte == 0x00 {
            out.push(0xFF);
        }
    }
    out.push(0x00);
    out.push(0x00);
}

/// Integers above 2^53 lose exactness through `f64`; acceptable for view
/// keys, which collate numerically rather than textually.
fn numeric(number: &serde_json::Number) -> f64 {
    number.as_f64().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::{cmp_keys, collation_key};
    use serde_json::{json, Value};
    use std::cmp::Ordering;

    fn sample_keys() -> Vec<Value> {
        vec![
            json!(null),
            json!(false),
            json!(true),
            json!(-10.5),
            json!(-1),
            json!(0),
            json!(1),
            json!(1.5),
            json!(100),
            json!(""),
            json!("a"),
            json!("a\u{0}b"),
            json!("ab"),
            json!("b"),
            json!([]),
            json!([1]),
            json!([1, 2]),
            json!([1, "x"]),
            json!([2]),
            json!(["P1", "Design"]),
            json!(["P1", "Review"]),
            json!(["P2", "Design"]),
            json!({}),
            json!({"a": 1}),
            json!({"a": 2}),
            json!({"b": 1}),
        ]
    }

    #[test]
    fn sample_keys_are_listed_in_strictly_increasing_order() {
        let keys = sample_keys();
        for window in keys.windows(2) {
            assert_eq!(
                cmp_keys(&window[0], &window[1]),
                Ordering::Less,
                "expected {} < {}",
                window[0],
                window[1]
            );
        }
    }

    #[test]
    fn encoded_order_agrees_with_comparator() {
        let keys = sample_keys();
        for left in &keys {
            for right in &keys {
                let structural = cmp_keys(left, right);
                let encoded = collation_key(left).cmp(&collation_key(right));
                assert_eq!(structural, encoded, "mismatch for {left} vs {right}");
            }
        }
    }

    #[test]
    fn equal_numeric_keys_share_an_encoding() {
        assert_eq!(cmp_keys(&json!(1), &json!(1.0)), Ordering::Equal);
        assert_eq!(collation_key(&json!(1)), collation_key(&json!(1.0)));
    }

    #[test]
    fn embedded_nul_in_strings_keeps_prefix_order() {
        let plain = collation_key(&json!("a"));
        let with_nul = collation_key(&json!("a\u{0}"));
        let longer = collation_key(&json!("ab"));
        assert!(plain < with_nul);
        assert!(with_nul < longer);
    }

    #[test]
    fn array_prefix_sorts_before_extension() {
        assert!(collation_key(&json!(["P1"])) < collation_key(&json!(["P1", "Design"])));
        assert_eq!(
            cmp_keys(&json!(["P1"]), &json!(["P1", "Design"])),
            Ordering::Less
        );
    }
}
