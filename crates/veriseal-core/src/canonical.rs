//! Canonical JSON encoding for deterministic hashing and signing.
//!
//! The output follows RFC 8785 (JCS) conventions:
//! - Object keys sorted by Unicode code point
//! - No insignificant whitespace
//! - Minimal string escaping
//! - Every number is an IEEE 754 double, written in ECMAScript shortest form
//!
//! **This encoding is FROZEN.** Every payload hash, `ts_prev` link and
//! signature is computed over these bytes; changing a single rule
//! invalidates every envelope ever issued.

use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::error::CanonicalError;

/// Canonicalize JSON text.
///
/// Only objects and arrays are accepted at the top level.
pub fn canonicalize(input: &[u8]) -> Result<Vec<u8>, CanonicalError> {
    if input.is_empty() {
        return Err(CanonicalError::EmptyInput);
    }

    // from_slice rejects trailing non-whitespace after the first value
    let value: Value =
        serde_json::from_slice(input).map_err(|e| CanonicalError::InvalidJson(e.to_string()))?;

    canonical_value_bytes(&value)
}

/// Canonicalize an already parsed JSON value.
///
/// Produces the same bytes as [`canonicalize`] on the value's JSON text.
pub fn canonical_value_bytes(value: &Value) -> Result<Vec<u8>, CanonicalError> {
    match value {
        Value::Object(_) | Value::Array(_) => {
            let mut buf = Vec::new();
            encode_value_to(&mut buf, value);
            Ok(buf)
        }
        _ => Err(CanonicalError::TopLevelNotObjectOrArray),
    }
}

/// Canonicalize any serializable value (structs serialize as objects).
pub fn to_canonical_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, CanonicalError> {
    let value =
        serde_json::to_value(value).map_err(|e| CanonicalError::InvalidJson(e.to_string()))?;
    canonical_value_bytes(&value)
}

/// Recursively encode a JSON value.
fn encode_value_to(buf: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Null => buf.extend_from_slice(b"null"),
        Value::Bool(true) => buf.extend_from_slice(b"true"),
        Value::Bool(false) => buf.extend_from_slice(b"false"),
        Value::Number(n) => encode_number(buf, n),
        Value::String(s) => encode_string(buf, s),
        Value::Array(items) => encode_array(buf, items),
        Value::Object(map) => encode_object_canonical(buf, map),
    }
}

/// Encode an array in element order.
fn encode_array(buf: &mut Vec<u8>, items: &[Value]) {
    buf.push(b'[');
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            buf.push(b',');
        }
        encode_value_to(buf, item);
    }
    buf.push(b']');
}

/// Encode an object with keys sorted by code point.
///
/// Rust's `str` ordering compares UTF-8 bytes, which orders by code point.
fn encode_object_canonical(buf: &mut Vec<u8>, map: &Map<String, Value>) {
    let mut entries: Vec<(&String, &Value)> = map.iter().collect();
    entries.sort_by(|a, b| a.0.as_str().cmp(b.0.as_str()));

    buf.push(b'{');
    for (i, (key, value)) in entries.into_iter().enumerate() {
        if i > 0 {
            buf.push(b',');
        }
        encode_string(buf, key);
        buf.push(b':');
        encode_value_to(buf, value);
    }
    buf.push(b'}');
}

/// Encode a string with minimal escaping.
fn encode_string(buf: &mut Vec<u8>, s: &str) {
    const HEX: &[u8; 16] = b"0123456789abcdef";

    buf.push(b'"');
    for ch in s.chars() {
        match ch {
            '"' => buf.extend_from_slice(b"\\\""),
            '\\' => buf.extend_from_slice(b"\\\\"),
            '\u{08}' => buf.extend_from_slice(b"\\b"),
            '\t' => buf.extend_from_slice(b"\\t"),
            '\n' => buf.extend_from_slice(b"\\n"),
            '\u{0c}' => buf.extend_from_slice(b"\\f"),
            '\r' => buf.extend_from_slice(b"\\r"),
            c if (c as u32) < 0x20 => {
                let b = c as u8;
                buf.extend_from_slice(b"\\u00");
                buf.push(HEX[(b >> 4) as usize]);
                buf.push(HEX[(b & 0x0f) as usize]);
            }
            c => {
                let mut tmp = [0u8; 4];
                buf.extend_from_slice(c.encode_utf8(&mut tmp).as_bytes());
            }
        }
    }
    buf.push(b'"');
}

/// Encode a number as the nearest f64.
///
/// Integer literals take the same path as fractional and exponent forms,
/// so `9007199254740993` and `9007199254740993.0` encode identically.
fn encode_number(buf: &mut Vec<u8>, n: &Number) {
    // always Some without serde_json's arbitrary_precision
    if let Some(f) = n.as_f64() {
        encode_f64(buf, f);
    }
}

/// Encode a finite f64 the way ECMAScript `Number.prototype.toString` does.
fn encode_f64(buf: &mut Vec<u8>, f: f64) {
    if f == 0.0 {
        // covers -0.0
        buf.push(b'0');
        return;
    }
    if f < 0.0 {
        buf.push(b'-');
    }

    // `{:e}` yields the shortest round-tripping digits, e.g. "1.2345e-7"
    let sci = format!("{:e}", f.abs());
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    // value = 0.d1d2...dk * 10^n
    let k = digits.len() as i32;
    let n = exp + 1;

    if k <= n && n <= 21 {
        buf.extend_from_slice(digits.as_bytes());
        buf.extend(std::iter::repeat(b'0').take((n - k) as usize));
    } else if 0 < n && n <= 21 {
        let (int_part, frac_part) = digits.split_at(n as usize);
        buf.extend_from_slice(int_part.as_bytes());
        buf.push(b'.');
        buf.extend_from_slice(frac_part.as_bytes());
    } else if -6 < n && n <= 0 {
        buf.extend_from_slice(b"0.");
        buf.extend(std::iter::repeat(b'0').take((-n) as usize));
        buf.extend_from_slice(digits.as_bytes());
    } else {
        let (first, rest) = digits.split_at(1);
        buf.extend_from_slice(first.as_bytes());
        if !rest.is_empty() {
            buf.push(b'.');
            buf.extend_from_slice(rest.as_bytes());
        }
        buf.push(b'e');
        let e = n - 1;
        buf.push(if e < 0 { b'-' } else { b'+' });
        buf.extend_from_slice(e.unsigned_abs().to_string().as_bytes());
    }
}
