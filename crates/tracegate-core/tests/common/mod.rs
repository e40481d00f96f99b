//! Shared record builders for the integration suites.

#![allow(dead_code)]

use serde_json::{json, Value};
use tracegate_core::canon::envelope_hash;
use tracegate_core::gate::CommitGate;
use tracegate_core::store::MemoryStore;
use tracegate_core::EnvelopeHash;

pub const TRACE_A: &str = "4bf92f3577b34da6a3ce929d0e0e4736";
pub const TRACE_B: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";

pub const TS_MS: u64 = 1_769_817_600_000;

pub fn auth_context(trace_id: &str) -> Value {
    json!({
        "spec_version": "1.0.0",
        "canon_version": "1",
        "record_type": "auth_context",
        "trace": {
            "trace_id": trace_id,
            "span_id": "00f067aa0ba902b7",
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

pub fn policy_decision(trace_id: &str, auth_hash: &str, result: &str) -> Value {
    json!({
        "spec_version": "1.0.0",
        "canon_version": "1",
        "record_type": "policy_decision",
        "trace": {
            "trace_id": trace_id,
            "span_id": "11f067aa0ba902b7",
            "span_kind": "internal",
            "parent_span_id": "00f067aa0ba902b7"
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

pub fn model_call(trace_id: &str, auth_hash: &str, policy_hash: &str) -> Value {
    json!({
        "spec_version": "1.0.0",
        "canon_version": "1",
        "record_type": "model_call",
        "trace": {
            "trace_id": trace_id,
            "span_id": "22f067aa0ba902b7",
            "span_kind": "client",
            "parent_span_id": "11f067aa0ba902b7"
        },
        "producer": { "layer": "adapter", "component": "model-router" },
        "started_at_ms": TS_MS + 10,
        "ended_at_ms": TS_MS + 950,
        "auth_context_envelope_sha256": auth_hash,
        "policy_decision_envelope_sha256": policy_hash,
        "model": { "provider": "anthropic", "model_id": "claude-opus" },
        "request": {
            "content_type": "application/json",
            "sha256": "1".repeat(64),
            "size_bytes": 2_048
        },
        "response": {
            "content_type": "application/json",
            "sha256": "2".repeat(64),
            "size_bytes": 8_192
        },
        "outcome": { "status": "ok" },
        "usage": { "input_tokens": 512, "output_tokens": 1024 }
    })
}

pub fn tool_call(trace_id: &str, auth_hash: &str, policy_hash: &str) -> Value {
    json!({
        "spec_version": "1.0.0",
        "canon_version": "1",
        "record_type": "tool_call",
        "trace": {
            "trace_id": trace_id,
            "span_id": "33f067aa0ba902b7",
            "span_kind": "client",
            "parent_span_id": "11f067aa0ba902b7"
        },
        "producer": { "layer": "adapter", "component": "tool-runner" },
        "started_at_ms": TS_MS + 10,
        "ended_at_ms": TS_MS + 430,
        "auth_context_envelope_sha256": auth_hash,
        "policy_decision_envelope_sha256": policy_hash,
        "tool": { "tool_id": "shell.exec", "tool_version": "2.0.1" },
        "request": {
            "content_type": "application/json",
            "sha256": "3".repeat(64),
            "size_bytes": 256
        },
        "response": {
            "content_type": "application/json",
            "sha256": "4".repeat(64),
            "size_bytes": 640
        },
        "outcome": { "status": "ok" }
    })
}

/// Commits a record with its correct declared hash and asserts acceptance.
pub fn commit_ok(gate: &CommitGate<MemoryStore>, kind: &str, record: Value) -> EnvelopeHash {
    let declared = envelope_hash(&record).unwrap();
    let outcome = gate.commit(kind, &declared.to_hex(), record).unwrap();
    assert!(outcome.accepted, "expected acceptance, got {outcome:?}");
    outcome.computed_envelope_hash.unwrap()
}

/// Accepts a full auth -> allow policy -> model call chain for a trace.
pub fn accept_model_chain(
    gate: &CommitGate<MemoryStore>,
    trace_id: &str,
) -> (EnvelopeHash, EnvelopeHash, EnvelopeHash) {
    let auth_hash = commit_ok(gate, "auth_context", auth_context(trace_id));
    let policy_hash = commit_ok(
        gate,
        "policy_decision",
        policy_decision(trace_id, &auth_hash.to_hex(), "allow"),
    );
    let call_hash = commit_ok(
        gate,
        "model_call",
        model_call(trace_id, &auth_hash.to_hex(), &policy_hash.to_hex()),
    );
    (auth_hash, policy_hash, call_hash)
}
