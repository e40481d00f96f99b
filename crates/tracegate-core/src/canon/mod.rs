//! Canonical JSON codec for envelope identity.
//!
//! This module converts record values to a unique canonical byte sequence
//! following RFC 8785 (JCS - JSON Canonicalization Scheme), restricted to an
//! integer-only numeric profile, and computes the SHA-256 digest over those
//! bytes. The digest is the artifact identifier everywhere in the ledger.
//!
//! # Canonicalization Rules
//!
//! 1. Object member names are sorted ascending by Unicode code point
//! 2. No whitespace between tokens; array element order is preserved
//! 3. Strings use minimal escaping per RFC 8785 Section 3.2.2.2 (only `"`,
//!    `\`, and U+0000..U+001F; short escapes where defined; lowercase
//!    `\uXXXX` otherwise)
//! 4. Numbers must be integral values within the safe range (fit in a
//!    signed 64-bit integer and in an IEEE-754 double without loss, i.e.
//!    magnitude at most 2^53 - 1); negative zero is serialized as `0`
//! 5. Duplicate object keys are illegal and rejected at the parse boundary
//! 6. Structures nested deeper than 128 levels are rejected
//!
//! Canonicalization is a pure function: repeated calls over equal JSON data
//! yield byte-equal output regardless of construction order.
//!
//! # Example
//!
//! ```
//! use tracegate_core::canon::{canonical_json, parse_canonical_input};
//!
//! let value = parse_canonical_input(r#"{ "z": 1, "a": 2 }"#).unwrap();
//! assert_eq!(canonical_json(&value).unwrap(), r#"{"a":2,"z":1}"#);
//! ```

mod hash;

pub use hash::{EnvelopeHash, ParseHashError, HASH_LEN};

use std::collections::BTreeSet;
use std::fmt::Write as _;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Maximum recursion depth for canonicalization to prevent stack overflow.
pub const MAX_DEPTH: usize = 128;

/// Largest integer magnitude that survives an IEEE-754 double round-trip
/// without loss (2^53 - 1).
pub const MAX_SAFE_INTEGER: u64 = 9_007_199_254_740_991;

/// Errors that can occur during canonicalization.
///
/// The commit gate treats every variant as a schema rejection: a record that
/// cannot be canonicalized has no canonical bytes, hence no identity, and is
/// never persisted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CodecError {
    /// A number with a fractional or non-finite value was encountered.
    #[error("non-integer number: canonical form requires integral values")]
    NonIntegerNumber,

    /// An integral number is outside the safe range.
    #[error("number out of range: {value} exceeds the safe integer range")]
    NumberOutOfRange {
        /// String representation of the out-of-range number.
        value: String,
    },

    /// A duplicate key was found in an object during parsing.
    #[error("duplicate key: '{key}' appears multiple times in object")]
    DuplicateKey {
        /// The duplicated key.
        key: String,
    },

    /// The maximum nesting depth was exceeded.
    #[error("max depth exceeded: value nested deeper than {max_depth} levels")]
    MaxDepthExceeded {
        /// The maximum depth that was exceeded.
        max_depth: usize,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {message}")]
    Parse {
        /// Description of the parse error.
        message: String,
    },
}

/// Serializes a record value to its canonical UTF-8 byte sequence.
///
/// # Errors
///
/// Returns [`CodecError`] if the value contains a non-integral or
/// out-of-range number, or nests deeper than [`MAX_DEPTH`] levels.
pub fn canonicalize(value: &Value) -> Result<Vec<u8>, CodecError> {
    canonical_json(value).map(String::into_bytes)
}

/// Serializes a record value to its canonical JSON string.
///
/// # Errors
///
/// Returns [`CodecError`] under the same conditions as [`canonicalize`].
pub fn canonical_json(value: &Value) -> Result<String, CodecError> {
    validate_value(value, 0)?;
    let mut output = String::new();
    emit_value(value, &mut output);
    Ok(output)
}

/// Computes the envelope hash: SHA-256 over the canonical UTF-8 bytes.
///
/// # Errors
///
/// Returns [`CodecError`] under the same conditions as [`canonicalize`].
pub fn envelope_hash(value: &Value) -> Result<EnvelopeHash, CodecError> {
    Ok(EnvelopeHash::of(&canonicalize(value)?))
}

/// Parses JSON text into a value, rejecting duplicate object keys.
///
/// `serde_json::Value` cannot represent duplicate keys (last value wins), so
/// the duplicate-key rule is enforced here at the text boundary with a
/// custom deserializer that checks decoded keys. Escape-sequence aliases
/// (`"a"` vs `"a"`) are detected because comparison happens after
/// decoding.
///
/// # Errors
///
/// Returns [`CodecError::DuplicateKey`] for repeated keys and
/// [`CodecError::Parse`] for malformed JSON.
pub fn parse_canonical_input(input: &str) -> Result<Value, CodecError> {
    let mut deserializer = serde_json::Deserializer::from_str(input);
    let value = CheckedValue::deserialize(&mut deserializer).map_err(|e| {
        let msg = e.to_string();
        if let Some(rest) = msg.strip_prefix("duplicate key: ") {
            // serde_json appends " at line X column Y"; strip it.
            let key = rest.split(" at line ").next().unwrap_or(rest).to_string();
            CodecError::DuplicateKey { key }
        } else {
            CodecError::Parse { message: msg }
        }
    })?;
    Ok(value.0)
}

/// Wrapper type for JSON values that checks for duplicate keys during
/// deserialization.
struct CheckedValue(Value);

impl<'de> Deserialize<'de> for CheckedValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("any valid JSON value")
            }

            fn visit_bool<E>(self, v: bool) -> Result<Self::Value, E> {
                Ok(Value::Bool(v))
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
                Ok(Value::Number(v.into()))
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
                Ok(Value::Number(v.into()))
            }

            fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Number::from_f64(v)
                    .map(Value::Number)
                    .ok_or_else(|| de::Error::custom("invalid float value"))
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E> {
                Ok(Value::String(v.to_owned()))
            }

            fn visit_string<E>(self, v: String) -> Result<Self::Value, E> {
                Ok(Value::String(v))
            }

            fn visit_none<E>(self) -> Result<Self::Value, E> {
                Ok(Value::Null)
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E> {
                Ok(Value::Null)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut vec = Vec::new();
                while let Some(elem) = seq.next_element::<CheckedValue>()? {
                    vec.push(elem.0);
                }
                Ok(Value::Array(vec))
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut seen_keys = BTreeSet::new();
                let mut obj = Map::new();

                while let Some(key) = map.next_key::<String>()? {
                    if !seen_keys.insert(key.clone()) {
                        return Err(de::Error::custom(format!("duplicate key: {key}")));
                    }
                    let value = map.next_value::<CheckedValue>()?;
                    obj.insert(key, value.0);
                }
                Ok(Value::Object(obj))
            }
        }

        deserializer
            .deserialize_any(ValueVisitor)
            .map(CheckedValue)
    }
}

/// Recursively validates a value against the canonical-form constraints.
fn validate_value(value: &Value, depth: usize) -> Result<(), CodecError> {
    if depth > MAX_DEPTH {
        return Err(CodecError::MaxDepthExceeded {
            max_depth: MAX_DEPTH,
        });
    }

    match value {
        Value::Null | Value::Bool(_) | Value::String(_) => Ok(()),
        Value::Number(n) => validate_number(n),
        Value::Array(arr) => {
            for item in arr {
                validate_value(item, depth + 1)?;
            }
            Ok(())
        },
        Value::Object(obj) => {
            for val in obj.values() {
                validate_value(val, depth + 1)?;
            }
            Ok(())
        },
    }
}

/// Validates that a number carries an integral value within the safe range.
///
/// Legality is decided on the value, not the lexical form: `7.0` is the
/// integer 7, and `-0.0` is the integer 0.
fn validate_number(n: &Number) -> Result<(), CodecError> {
    if let Some(i) = n.as_i64() {
        if i.unsigned_abs() > MAX_SAFE_INTEGER {
            return Err(CodecError::NumberOutOfRange {
                value: i.to_string(),
            });
        }
        return Ok(());
    }

    if let Some(u) = n.as_u64() {
        if u > MAX_SAFE_INTEGER {
            return Err(CodecError::NumberOutOfRange {
                value: u.to_string(),
            });
        }
        return Ok(());
    }

    // serde_json only yields finite floats here.
    let f = n.as_f64().ok_or(CodecError::NonIntegerNumber)?;
    if f.fract() != 0.0 {
        return Err(CodecError::NonIntegerNumber);
    }
    #[allow(clippy::cast_precision_loss)]
    if f.abs() > MAX_SAFE_INTEGER as f64 {
        return Err(CodecError::NumberOutOfRange {
            value: n.to_string(),
        });
    }
    Ok(())
}

/// Emits a value in canonical form. Assumes [`validate_value`] has passed.
fn emit_value(value: &Value, output: &mut String) {
    match value {
        Value::Null => output.push_str("null"),
        Value::Bool(b) => output.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => emit_number(n, output),
        Value::String(s) => emit_string(s, output),
        Value::Array(arr) => emit_array(arr, output),
        Value::Object(obj) => emit_object(obj, output),
    }
}

/// Emits a validated number as its integer value.
fn emit_number(n: &Number, output: &mut String) {
    if let Some(i) = n.as_i64() {
        let _ = write!(output, "{i}");
    } else if let Some(u) = n.as_u64() {
        let _ = write!(output, "{u}");
    } else if let Some(f) = n.as_f64() {
        // Integral by validation; the cast also folds -0.0 to 0.
        #[allow(clippy::cast_possible_truncation)]
        let i = f as i64;
        let _ = write!(output, "{i}");
    }
}

/// Emits a string with minimal escaping per RFC 8785 Section 3.2.2.2.
///
/// Only quotation mark, reverse solidus, and U+0000 through U+001F are
/// escaped; short escapes are used where defined and lowercase `\uXXXX`
/// otherwise. Everything else (including U+007F and C1 controls) is emitted
/// as raw UTF-8.
fn emit_string(s: &str, output: &mut String) {
    output.push('"');
    for c in s.chars() {
        match c {
            '"' => output.push_str("\\\""),
            '\\' => output.push_str("\\\\"),
            '\u{0008}' => output.push_str("\\b"),
            '\u{000C}' => output.push_str("\\f"),
            '\n' => output.push_str("\\n"),
            '\r' => output.push_str("\\r"),
            '\t' => output.push_str("\\t"),
            c if ('\u{0000}'..='\u{001F}').contains(&c) => {
                let _ = write!(output, "\\u{:04x}", c as u32);
            },
            c => output.push(c),
        }
    }
    output.push('"');
}

/// Emits an array in canonical form, preserving element order.
fn emit_array(arr: &[Value], output: &mut String) {
    output.push('[');
    for (i, item) in arr.iter().enumerate() {
        if i > 0 {
            output.push(',');
        }
        emit_value(item, output);
    }
    output.push(']');
}

/// Emits an object in canonical form with members sorted ascending by
/// Unicode code point.
fn emit_object(obj: &Map<String, Value>, output: &mut String) {
    let mut sorted_keys: Vec<&String> = obj.keys().collect();
    sorted_keys.sort();

    output.push('{');
    for (i, key) in sorted_keys.iter().enumerate() {
        if i > 0 {
            output.push(',');
        }
        emit_string(key, output);
        output.push(':');
        emit_value(&obj[*key], output);
    }
    output.push('}');
}
