//! Closed-world structural validation for the envelope record kinds.
//!
//! The validator checks a record value against the fixed shape of its
//! declared `record_type`. Schemas are closed-world: unknown properties
//! fail. Cross-references are *not* resolved here; prerequisite existence
//! is a later phase of the commit gate.
//!
//! # Error reporting
//!
//! Validation reports the first error in schema order, which is stable for
//! fixed inputs. Schema order is:
//!
//! 1. the root value is an object
//! 2. `record_type` (required, string, member of the closed set)
//! 3. `spec_version`, `canon_version` (required, fixed constants)
//! 4. no additional root properties for the selected kind
//! 5. `trace` (trace_id, span_id, span_kind, optional parent_span_id)
//! 6. `producer` (layer, component)
//! 7. kind-specific fields, in the order documented by the per-kind
//!    validators
//!
//! Error kinds are stable strings of the form `schema_violation.<keyword>`
//! with named specializations: `schema_violation.required.<field>`,
//! `schema_violation.const.<field>`,
//! `schema_violation.additional_properties`, `schema_violation.pattern`,
//! `schema_violation.enum`, `schema_violation.type`, and
//! `schema_violation.trace_context.missing_trace_id`.

mod common;
mod kinds;


use serde_json::Value;
use thiserror::Error;

use crate::record::{RecordKind, CANON_VERSION, SPEC_VERSION};

/// A structural validation failure.
///
/// `kind` is the stable contract string; `path` is a JSON pointer to the
/// offending location; `message` is a human diagnostic and not part of the
/// contract.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind} at '{path}': {message}")]
pub struct SchemaError {
    /// Stable error-kind string (`schema_violation.<keyword>`).
    pub kind: String,
    /// JSON pointer to the offending location (`""` for the root).
    pub path: String,
    /// Human-readable diagnostic.
    pub message: String,
}

impl SchemaError {
    pub(crate) fn required(path: &str, field: &str) -> Self {
        Self {
            kind: format!("schema_violation.required.{field}"),
            path: format!("{path}/{field}"),
            message: format!("missing required property '{field}'"),
        }
    }

    pub(crate) fn wrong_type(path: &str, expected: &str) -> Self {
        Self {
            kind: "schema_violation.type".to_string(),
            path: path.to_string(),
            message: format!("expected {expected}"),
        }
    }

    pub(crate) fn pattern(path: &str, expected: &str) -> Self {
        Self {
            kind: "schema_violation.pattern".to_string(),
            path: path.to_string(),
            message: format!("value does not match {expected}"),
        }
    }

    pub(crate) fn enumeration(path: &str, message: impl Into<String>) -> Self {
        Self {
            kind: "schema_violation.enum".to_string(),
            path: path.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn constant(path: &str, field: &str, expected: &str) -> Self {
        Self {
            kind: format!("schema_violation.const.{field}"),
            path: format!("{path}/{field}"),
            message: format!("value must be \"{expected}\""),
        }
    }

    pub(crate) fn additional_properties(path: &str, property: &str) -> Self {
        Self {
            kind: "schema_violation.additional_properties".to_string(),
            path: path.to_string(),
            message: format!("unexpected property '{property}'"),
        }
    }

    pub(crate) fn missing_trace_id() -> Self {
        Self {
            kind: "schema_violation.trace_context.missing_trace_id".to_string(),
            path: "/trace/trace_id".to_string(),
            message: "trace context is missing trace_id".to_string(),
        }
    }
}

/// Validates a record against the closed set of envelope shapes.
///
/// Returns the record's kind on success.
///
/// # Errors
///
/// Returns the first [`SchemaError`] in schema order.
pub fn validate(record: &Value) -> Result<RecordKind, SchemaError> {
    let obj = common::as_object(record, "")?;

    let record_type = common::require_str(obj, "", "record_type")?;
    let kind = RecordKind::parse(record_type).ok_or_else(|| {
        SchemaError::enumeration(
            "/record_type",
            format!("'{record_type}' is not a recognized record type"),
        )
    })?;

    common::require_const(obj, "", "spec_version", SPEC_VERSION)?;
    common::require_const(obj, "", "canon_version", CANON_VERSION)?;
    common::check_closed(obj, "", kinds::allowed_root_keys(kind))?;

    common::check_trace(obj)?;
    common::check_producer(obj)?;

    match kind {
        RecordKind::AuthContext => kinds::validate_auth_context(obj)?,
        RecordKind::PolicyDecision => kinds::validate_policy_decision(obj)?,
        RecordKind::ModelCall => kinds::validate_model_call(obj)?,
        RecordKind::ToolCall => kinds::validate_tool_call(obj)?,
    }

    Ok(kind)
}
