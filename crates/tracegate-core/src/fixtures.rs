//! Record fixtures shared by unit tests.
//!
//! Builders produce schema-valid records wired to each other by envelope
//! hash; tests mutate the returned values to produce the failure they are
//! exercising.

use serde_json::{json, Value};

pub(crate) const TRACE_A: &str = "4bf92f3577b34da6a3ce929d0e0e4736";
pub(crate) const TRACE_B: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";

pub(crate) const SPAN_AUTH: &str = "00f067aa0ba902b7";
pub(crate) const SPAN_POLICY: &str = "11f067aa0ba902b7";
pub(crate) const SPAN_CALL: &str = "22f067aa0ba902b7";

pub(crate) const TS_MS: u64 = 1_769_817_600_000;

pub(crate) fn auth_context(trace_id: &str) -> Value {
    json!({
        "spec_version": "1.0.0",
        "canon_version": "1",
        "record_type": "auth_context",
        "trace": {
            "trace_id": trace_id,
            "span_id": SPAN_AUTH,
            "span_kind": "server"
        },
        "producer": { "layer": "ingress", "component": "auth-gateway" },
        "ts_ms": TS_MS,
        "actor": { "actor_kind": "user", "actor_id": "alice" },
        "credential": {
            "credential_kind": "oidc",
            "issuer": "idp.example.test",
            "presented_hash_sha256": "c".repeat(64),
            "verified_at_ms": TS_MS - 1_000,
            "expires_at_ms": TS_MS + 3_600_000
        },
        "grants": { "models:invoke": true, "tools:exec": true }
    })
}

pub(crate) fn policy_decision(trace_id: &str, auth_hash: &str, result: &str) -> Value {
    json!({
        "spec_version": "1.0.0",
        "canon_version": "1",
        "record_type": "policy_decision",
        "trace": {
            "trace_id": trace_id,
            "span_id": SPAN_POLICY,
            "span_kind": "internal",
            "parent_span_id": SPAN_AUTH
        },
        "producer": { "layer": "policy", "component": "policy-engine" },
        "ts_ms": TS_MS + 5,
        "auth_context_envelope_sha256": auth_hash,
        "policy": {
            "policy_id": "model-access",
            "policy_version": "1.2.0",
            "policy_sha256": "d".repeat(64)
        },
        "request": { "action": "models:invoke", "resource": "models/claude" },
        "decision": {
            "result": result,
            "reason_codes": { "grant:matched": true },
            "obligations": { "log:full": true }
        }
    })
}

pub(crate) fn model_call(trace_id: &str, auth_hash: &str, policy_hash: &str) -> Value {
    json!({
        "spec_version": "1.0.0",
        "canon_version": "1",
        "record_type": "model_call",
        "trace": {
            "trace_id": trace_id,
            "span_id": SPAN_CALL,
            "span_kind": "client",
            "parent_span_id": SPAN_POLICY
        },
        "producer": { "layer": "adapter", "component": "model-router" },
        "started_at_ms": TS_MS + 10,
        "ended_at_ms": TS_MS + 950,
        "auth_context_envelope_sha256": auth_hash,
        "policy_decision_envelope_sha256": policy_hash,
        "model": { "provider": "anthropic", "model_id": "claude-opus" },
        "request": blob_ref('1', 2_048),
        "response": blob_ref('2', 8_192),
        "outcome": { "status": "ok" },
        "usage": { "input_tokens": 512, "output_tokens": 1024 }
    })
}

pub(crate) fn tool_call(trace_id: &str, auth_hash: &str, policy_hash: &str) -> Value {
    json!({
        "spec_version": "1.0.0",
        "canon_version": "1",
        "record_type": "tool_call",
        "trace": {
            "trace_id": trace_id,
            "span_id": SPAN_CALL,
            "span_kind": "client",
            "parent_span_id": SPAN_POLICY
        },
        "producer": { "layer": "adapter", "component": "tool-runner" },
        "started_at_ms": TS_MS + 10,
        "ended_at_ms": TS_MS + 430,
        "auth_context_envelope_sha256": auth_hash,
        "policy_decision_envelope_sha256": policy_hash,
        "tool": { "tool_id": "shell.exec", "tool_version": "2.0.1" },
        "request": blob_ref('3', 256),
        "response": blob_ref('4', 640),
        "outcome": { "status": "ok" }
    })
}

pub(crate) fn blob_ref(sha_char: char, size_bytes: u64) -> Value {
    json!({
        "content_type": "application/json",
        "sha256": sha_char.to_string().repeat(64),
        "size_bytes": size_bytes
    })
}
