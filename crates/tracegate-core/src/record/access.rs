//! Field accessors over schema-validated record values.
//!
//! The gate, resolver, and replay engines all read a handful of envelope
//! fields after schema validation has established their shape. These
//! accessors centralize the raw `serde_json::Value` traversal; callers that
//! run after validation may treat `None` as a store-integrity failure, never
//! as a reason to coerce.

use serde_json::Value;

/// Returns the record's `trace.trace_id`, if present.
pub(crate) fn trace_id(record: &Value) -> Option<&str> {
    record.get("trace")?.get("trace_id")?.as_str()
}

/// Returns the record's `record_type`, if present.
pub(crate) fn record_type(record: &Value) -> Option<&str> {
    record.get("record_type")?.as_str()
}

/// Returns the referenced `auth_context` envelope hash, if present.
pub(crate) fn auth_context_ref(record: &Value) -> Option<&str> {
    record.get("auth_context_envelope_sha256")?.as_str()
}

/// Returns the referenced `policy_decision` envelope hash, if present.
pub(crate) fn policy_decision_ref(record: &Value) -> Option<&str> {
    record.get("policy_decision_envelope_sha256")?.as_str()
}

/// Returns the record's `decision.result`, if present.
pub(crate) fn decision_result(record: &Value) -> Option<&str> {
    record.get("decision")?.get("result")?.as_str()
}

/// Returns the time key used for trace ordering, treating anything
/// non-numeric as 0.
pub(crate) fn time_key(record: &Value, field: &str) -> u64 {
    record.get(field).and_then(Value::as_u64).unwrap_or(0)
}
