//! Shared field-validation helpers.
//!
//! Every helper reports through [`SchemaError`] with a JSON-pointer path so
//! the per-kind validators stay declarative: a validator is a sequence of
//! helper calls in schema order.

use serde_json::{Map, Value};

use super::SchemaError;
use crate::canon::MAX_SAFE_INTEGER;
use crate::record::{is_hex_sha256, is_resource, is_span_id, is_token, is_trace_id};

pub(super) type Obj = Map<String, Value>;

pub(super) fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Obj, SchemaError> {
    value
        .as_object()
        .ok_or_else(|| SchemaError::wrong_type(path, "an object"))
}

pub(super) fn require<'a>(obj: &'a Obj, path: &str, field: &str) -> Result<&'a Value, SchemaError> {
    obj.get(field)
        .ok_or_else(|| SchemaError::required(path, field))
}

pub(super) fn require_str<'a>(obj: &'a Obj, path: &str, field: &str) -> Result<&'a str, SchemaError> {
    require(obj, path, field)?
        .as_str()
        .ok_or_else(|| SchemaError::wrong_type(&format!("{path}/{field}"), "a string"))
}

pub(super) fn require_object<'a>(obj: &'a Obj, path: &str, field: &str) -> Result<&'a Obj, SchemaError> {
    let value = require(obj, path, field)?;
    as_object(value, &format!("{path}/{field}"))
}

pub(super) fn require_const(obj: &Obj, path: &str, field: &str, expected: &str) -> Result<(), SchemaError> {
    let value = require_str(obj, path, field)?;
    if value == expected {
        Ok(())
    } else {
        Err(SchemaError::constant(path, field, expected))
    }
}

/// Requires a non-negative integer within the codec's safe range.
///
/// Floats and negatives are schema violations even when their value is
/// integral; timestamps and sizes are integers on the wire.
pub(super) fn require_count(obj: &Obj, path: &str, field: &str) -> Result<u64, SchemaError> {
    let field_path = format!("{path}/{field}");
    let n = require(obj, path, field)?
        .as_u64()
        .ok_or_else(|| SchemaError::wrong_type(&field_path, "a non-negative integer"))?;
    if n > MAX_SAFE_INTEGER {
        return Err(SchemaError::wrong_type(
            &field_path,
            "an integer within the safe range",
        ));
    }
    Ok(n)
}

pub(super) fn require_token(obj: &Obj, path: &str, field: &str) -> Result<(), SchemaError> {
    let value = require_str(obj, path, field)?;
    if is_token(value) {
        Ok(())
    } else {
        Err(SchemaError::pattern(
            &format!("{path}/{field}"),
            "^[a-z0-9][a-z0-9_\\-:.]{0,127}$",
        ))
    }
}

pub(super) fn require_resource(obj: &Obj, path: &str, field: &str) -> Result<(), SchemaError> {
    let value = require_str(obj, path, field)?;
    if is_resource(value) {
        Ok(())
    } else {
        Err(SchemaError::pattern(
            &format!("{path}/{field}"),
            "^[a-z0-9][a-z0-9_\\-:./]{0,255}$",
        ))
    }
}

pub(super) fn require_sha256(obj: &Obj, path: &str, field: &str) -> Result<(), SchemaError> {
    let value = require_str(obj, path, field)?;
    if is_hex_sha256(value) {
        Ok(())
    } else {
        Err(SchemaError::pattern(
            &format!("{path}/{field}"),
            "^[0-9a-f]{64}$",
        ))
    }
}

/// Rejects properties outside the allowed set (closed-world schemas).
pub(super) fn check_closed(obj: &Obj, path: &str, allowed: &[&str]) -> Result<(), SchemaError> {
    for key in obj.keys() {
        if !allowed.contains(&key.as_str()) {
            return Err(SchemaError::additional_properties(path, key));
        }
    }
    Ok(())
}

/// Validates a string set: an object mapping token keys to the literal
/// boolean `true`. The discipline keeps canonical form independent of
/// insertion order.
pub(super) fn require_string_set(obj: &Obj, path: &str, field: &str) -> Result<(), SchemaError> {
    let field_path = format!("{path}/{field}");
    let set = require_object(obj, path, field)?;
    for (key, value) in set {
        if !is_token(key) {
            return Err(SchemaError::pattern(
                &format!("{field_path}/{key}"),
                "^[a-z0-9][a-z0-9_\\-:.]{0,127}$",
            ));
        }
        if value != &Value::Bool(true) {
            return Err(SchemaError::wrong_type(
                &format!("{field_path}/{key}"),
                "the literal true",
            ));
        }
    }
    Ok(())
}

/// Validates `decision.result` against the closed `{allow, deny}` set.
pub(super) fn require_const_decision_result(decision: &Obj) -> Result<(), SchemaError> {
    let result = require_str(decision, "/decision", "result")?;
    match result {
        "allow" | "deny" => Ok(()),
        other => Err(SchemaError::enumeration(
            "/decision/result",
            format!("'{other}' is not one of allow, deny"),
        )),
    }
}

/// Validates a content-addressed reference:
/// `{ content_type, sha256, size_bytes }`.
pub(super) fn require_blob_ref(obj: &Obj, path: &str, field: &str) -> Result<(), SchemaError> {
    let field_path = format!("{path}/{field}");
    let blob = require_object(obj, path, field)?;
    require_resource(blob, &field_path, "content_type")?;
    require_sha256(blob, &field_path, "sha256")?;
    require_count(blob, &field_path, "size_bytes")?;
    check_closed(blob, &field_path, &["content_type", "sha256", "size_bytes"])
}

/// Validates the trace context shared by every kind.
pub(super) fn check_trace(obj: &Obj) -> Result<(), SchemaError> {
    let trace = require_object(obj, "", "trace")?;

    let trace_id = trace
        .get("trace_id")
        .ok_or_else(SchemaError::missing_trace_id)?
        .as_str()
        .ok_or_else(|| SchemaError::wrong_type("/trace/trace_id", "a string"))?;
    if !is_trace_id(trace_id) {
        return Err(SchemaError::pattern(
            "/trace/trace_id",
            "32 lowercase hex characters, not all zeros",
        ));
    }

    let span_id = require_str(trace, "/trace", "span_id")?;
    if !is_span_id(span_id) {
        return Err(SchemaError::pattern(
            "/trace/span_id",
            "16 lowercase hex characters, not all zeros",
        ));
    }

    require_token(trace, "/trace", "span_kind")?;

    if let Some(parent) = trace.get("parent_span_id") {
        let parent = parent
            .as_str()
            .ok_or_else(|| SchemaError::wrong_type("/trace/parent_span_id", "a string"))?;
        if !is_span_id(parent) {
            return Err(SchemaError::pattern(
                "/trace/parent_span_id",
                "16 lowercase hex characters, not all zeros",
            ));
        }
    }

    check_closed(
        trace,
        "/trace",
        &["trace_id", "span_id", "span_kind", "parent_span_id"],
    )
}

/// Validates the producer block shared by every kind.
pub(super) fn check_producer(obj: &Obj) -> Result<(), SchemaError> {
    let producer = require_object(obj, "", "producer")?;
    require_token(producer, "/producer", "layer")?;
    require_token(producer, "/producer", "component")?;
    check_closed(producer, "/producer", &["layer", "component"])
}
