//! Per-kind envelope validators.
//!
//! Each validator checks its kind-specific fields in a fixed order; the
//! shared envelope fields (`record_type`, versions, trace, producer) are
//! validated by the caller before dispatch. Field order per kind:
//!
//! - `auth_context`: ts_ms, actor, credential, grants
//! - `policy_decision`: ts_ms, auth_context_envelope_sha256, policy,
//!   request, decision
//! - `model_call`: started_at_ms, ended_at_ms,
//!   auth_context_envelope_sha256, policy_decision_envelope_sha256, model,
//!   request, response, outcome, usage (optional)
//! - `tool_call`: started_at_ms, ended_at_ms,
//!   auth_context_envelope_sha256, policy_decision_envelope_sha256, tool,
//!   request, response, outcome

use super::common::{
    check_closed, require_blob_ref, require_const_decision_result, require_count, require_object,
    require_resource, require_sha256, require_string_set, require_token, Obj,
};
use super::SchemaError;
use crate::record::RecordKind;

/// Returns the closed set of root properties for the given kind.
pub(super) fn allowed_root_keys(kind: RecordKind) -> &'static [&'static str] {
    match kind {
        RecordKind::AuthContext => &[
            "spec_version",
            "canon_version",
            "record_type",
            "trace",
            "producer",
            "ts_ms",
            "actor",
            "credential",
            "grants",
        ],
        RecordKind::PolicyDecision => &[
            "spec_version",
            "canon_version",
            "record_type",
            "trace",
            "producer",
            "ts_ms",
            "auth_context_envelope_sha256",
            "policy",
            "request",
            "decision",
        ],
        RecordKind::ModelCall => &[
            "spec_version",
            "canon_version",
            "record_type",
            "trace",
            "producer",
            "started_at_ms",
            "ended_at_ms",
            "auth_context_envelope_sha256",
            "policy_decision_envelope_sha256",
            "model",
            "request",
            "response",
            "outcome",
            "usage",
        ],
        RecordKind::ToolCall => &[
            "spec_version",
            "canon_version",
            "record_type",
            "trace",
            "producer",
            "started_at_ms",
            "ended_at_ms",
            "auth_context_envelope_sha256",
            "policy_decision_envelope_sha256",
            "tool",
            "request",
            "response",
            "outcome",
        ],
    }
}

pub(super) fn validate_auth_context(obj: &Obj) -> Result<(), SchemaError> {
    require_count(obj, "", "ts_ms")?;

    let actor = require_object(obj, "", "actor")?;
    require_token(actor, "/actor", "actor_kind")?;
    require_token(actor, "/actor", "actor_id")?;
    check_closed(actor, "/actor", &["actor_kind", "actor_id"])?;

    let credential = require_object(obj, "", "credential")?;
    require_token(credential, "/credential", "credential_kind")?;
    require_token(credential, "/credential", "issuer")?;
    require_sha256(credential, "/credential", "presented_hash_sha256")?;
    require_count(credential, "/credential", "verified_at_ms")?;
    require_count(credential, "/credential", "expires_at_ms")?;
    check_closed(
        credential,
        "/credential",
        &[
            "credential_kind",
            "issuer",
            "presented_hash_sha256",
            "verified_at_ms",
            "expires_at_ms",
        ],
    )?;

    require_string_set(obj, "", "grants")
}

pub(super) fn validate_policy_decision(obj: &Obj) -> Result<(), SchemaError> {
    require_count(obj, "", "ts_ms")?;
    require_sha256(obj, "", "auth_context_envelope_sha256")?;

    let policy = require_object(obj, "", "policy")?;
    require_token(policy, "/policy", "policy_id")?;
    require_token(policy, "/policy", "policy_version")?;
    require_sha256(policy, "/policy", "policy_sha256")?;
    check_closed(
        policy,
        "/policy",
        &["policy_id", "policy_version", "policy_sha256"],
    )?;

    let request = require_object(obj, "", "request")?;
    require_token(request, "/request", "action")?;
    require_resource(request, "/request", "resource")?;
    check_closed(request, "/request", &["action", "resource"])?;

    let decision = require_object(obj, "", "decision")?;
    require_const_decision_result(decision)?;
    require_string_set(decision, "/decision", "reason_codes")?;
    require_string_set(decision, "/decision", "obligations")?;
    check_closed(
        decision,
        "/decision",
        &["result", "reason_codes", "obligations"],
    )
}

pub(super) fn validate_model_call(obj: &Obj) -> Result<(), SchemaError> {
    validate_evidence_common(obj)?;

    let model = require_object(obj, "", "model")?;
    require_token(model, "/model", "provider")?;
    require_token(model, "/model", "model_id")?;
    check_closed(model, "/model", &["provider", "model_id"])?;

    validate_evidence_tail(obj)?;

    if obj.contains_key("usage") {
        let usage = require_object(obj, "", "usage")?;
        require_count(usage, "/usage", "input_tokens")?;
        require_count(usage, "/usage", "output_tokens")?;
        check_closed(usage, "/usage", &["input_tokens", "output_tokens"])?;
    }
    Ok(())
}

pub(super) fn validate_tool_call(obj: &Obj) -> Result<(), SchemaError> {
    validate_evidence_common(obj)?;

    let tool = require_object(obj, "", "tool")?;
    require_token(tool, "/tool", "tool_id")?;
    require_token(tool, "/tool", "tool_version")?;
    check_closed(tool, "/tool", &["tool_id", "tool_version"])?;

    validate_evidence_tail(obj)
}

/// Timing and prerequisite fields shared by the evidence kinds.
fn validate_evidence_common(obj: &Obj) -> Result<(), SchemaError> {
    require_count(obj, "", "started_at_ms")?;
    require_count(obj, "", "ended_at_ms")?;
    require_sha256(obj, "", "auth_context_envelope_sha256")?;
    require_sha256(obj, "", "policy_decision_envelope_sha256")
}

/// Request/response references and outcome shared by the evidence kinds.
fn validate_evidence_tail(obj: &Obj) -> Result<(), SchemaError> {
    require_blob_ref(obj, "", "request")?;
    require_blob_ref(obj, "", "response")?;

    let outcome = require_object(obj, "", "outcome")?;
    require_token(outcome, "/outcome", "status")?;
    check_closed(outcome, "/outcome", &["status"])
}
