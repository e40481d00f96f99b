use serde_json::{json, Value};

use super::CommitGate;
use crate::canon::{envelope_hash, EnvelopeHash};
use crate::fixtures::{auth_context, model_call, policy_decision, tool_call, TRACE_A, TRACE_B};
use crate::outcome::{kind, Classification};
use crate::store::{ArtifactStore, MemoryStore};

fn gate() -> CommitGate<MemoryStore> {
    CommitGate::new(MemoryStore::new())
}

/// Commits a record with the correct declared hash and asserts acceptance.
fn commit_ok(gate: &CommitGate<MemoryStore>, kind_str: &str, record: Value) -> EnvelopeHash {
    let declared = envelope_hash(&record).unwrap();
    let outcome = gate.commit(kind_str, &declared.to_hex(), record).unwrap();
    assert!(outcome.accepted, "expected acceptance, got {outcome:?}");
    outcome.computed_envelope_hash.unwrap()
}

/// Accepts an auth chain root plus an allow decision; returns both hashes.
fn seed_allow_chain(gate: &CommitGate<MemoryStore>) -> (EnvelopeHash, EnvelopeHash) {
    let auth_hash = commit_ok(gate, "auth_context", auth_context(TRACE_A));
    let policy = policy_decision(TRACE_A, &auth_hash.to_hex(), "allow");
    let policy_hash = commit_ok(gate, "policy_decision", policy);
    (auth_hash, policy_hash)
}

// =========================================================================
// Acceptance
// =========================================================================

#[test]
fn test_accept_auth_context() {
    let gate = gate();
    let record = auth_context(TRACE_A);
    let expected_hash = envelope_hash(&record).unwrap();

    let outcome = gate
        .commit("auth_context", &expected_hash.to_hex(), record)
        .unwrap();

    assert!(outcome.accepted);
    assert_eq!(outcome.classification, Classification::Accept);
    assert_eq!(outcome.error_kind, None);
    assert_eq!(outcome.computed_envelope_hash, Some(expected_hash));
    assert!(outcome.canonical_bytes.is_some());
    assert_eq!(gate.store().accepted_len(), 1);
    assert_eq!(gate.store().rejected_len(), 0);
}

#[test]
fn test_accept_full_chain() {
    let gate = gate();
    let (auth_hash, policy_hash) = seed_allow_chain(&gate);
    commit_ok(
        &gate,
        "model_call",
        model_call(TRACE_A, &auth_hash.to_hex(), &policy_hash.to_hex()),
    );
    commit_ok(
        &gate,
        "tool_call",
        tool_call(TRACE_A, &auth_hash.to_hex(), &policy_hash.to_hex()),
    );
    assert_eq!(gate.store().accepted_len(), 4);
    assert_eq!(gate.store().rejected_len(), 0);
}

#[test]
fn test_acceptance_is_idempotent() {
    let gate = gate();
    let record = auth_context(TRACE_A);
    let declared = envelope_hash(&record).unwrap().to_hex();

    let first = gate
        .commit("auth_context", &declared, record.clone())
        .unwrap();
    let second = gate.commit("auth_context", &declared, record).unwrap();

    assert_eq!(first, second);
    assert_eq!(gate.store().accepted_len(), 1);
}

// =========================================================================
// Step 1: Record-Kind Check
// =========================================================================

#[test]
fn test_forbidden_record_type_is_dropped() {
    let gate = gate();
    let record = auth_context(TRACE_A);
    let declared = envelope_hash(&record).unwrap().to_hex();

    let outcome = gate.commit("session_start", &declared, record).unwrap();

    assert_eq!(outcome.classification, Classification::RecordTypeForbidden);
    assert_eq!(
        outcome.error_kind.as_deref(),
        Some(kind::RECORD_TYPE_FORBIDDEN)
    );
    assert_eq!(outcome.computed_envelope_hash, None);
    assert_eq!(outcome.canonical_bytes, None);
    assert!(gate.store().is_empty());
}

// =========================================================================
// Steps 2-4: Schema Rejection (never persisted)
// =========================================================================

#[test]
fn test_schema_invalid_record_is_dropped() {
    let gate = gate();
    let mut record = auth_context(TRACE_A);
    record.as_object_mut().unwrap().remove("credential");
    let declared = envelope_hash(&record).unwrap().to_hex();

    let outcome = gate.commit("auth_context", &declared, record).unwrap();

    assert_eq!(outcome.classification, Classification::SchemaReject);
    assert_eq!(
        outcome.error_kind.as_deref(),
        Some("schema_violation.required.credential")
    );
    assert!(gate.store().is_empty());
}

#[test]
fn test_payload_kind_disagreement_is_schema_reject() {
    let gate = gate();
    let record = auth_context(TRACE_A);
    let declared = envelope_hash(&record).unwrap().to_hex();

    // Declared kind is in the closed set but disagrees with the payload.
    let outcome = gate.commit("policy_decision", &declared, record).unwrap();

    assert_eq!(outcome.classification, Classification::SchemaReject);
    assert_eq!(
        outcome.error_kind.as_deref(),
        Some(kind::RECORD_TYPE_MISMATCH)
    );
    assert!(gate.store().is_empty());
}

// =========================================================================
// Step 6: Hash Comparison
// =========================================================================

#[test]
fn test_hash_mismatch_persists_attempt_under_computed_hash() {
    let gate = gate();
    let (auth_hash, policy_hash) = seed_allow_chain(&gate);
    let record = tool_call(TRACE_A, &auth_hash.to_hex(), &policy_hash.to_hex());
    let computed = envelope_hash(&record).unwrap();

    let outcome = gate
        .commit("tool_call", &"0".repeat(64), record)
        .unwrap();

    assert_eq!(outcome.classification, Classification::HashMismatch);
    assert_eq!(
        outcome.error_kind.as_deref(),
        Some(kind::ENVELOPE_HASH_MISMATCH)
    );
    assert_eq!(outcome.computed_envelope_hash, Some(computed));

    // Keyed by the computed hash, not the declared one.
    let attempt = gate.store().get_rejected(&computed).unwrap().unwrap();
    assert_eq!(attempt.classification, Classification::HashMismatch);
    assert!(gate
        .store()
        .get_rejected(&EnvelopeHash::from_hex(&"0".repeat(64)).unwrap())
        .unwrap()
        .is_none());
}

#[test]
fn test_uppercase_declared_hash_is_mismatch() {
    let gate = gate();
    let record = auth_context(TRACE_A);
    let declared = envelope_hash(&record).unwrap().to_hex().to_uppercase();

    let outcome = gate.commit("auth_context", &declared, record).unwrap();
    assert_eq!(outcome.classification, Classification::HashMismatch);
}

// =========================================================================
// Step 7: Prerequisite Resolution
// =========================================================================

#[test]
fn test_policy_decision_missing_auth_context() {
    let gate = gate();
    let record = policy_decision(TRACE_A, &"1".repeat(64), "allow");
    let computed = envelope_hash(&record).unwrap();

    let outcome = gate
        .commit("policy_decision", &computed.to_hex(), record)
        .unwrap();

    assert_eq!(outcome.classification, Classification::MissingPrereq);
    assert_eq!(
        outcome.error_kind.as_deref(),
        Some(kind::MISSING_PREREQ_AUTH_CONTEXT)
    );
    assert_eq!(gate.store().rejected_len(), 1);
    assert!(gate.store().get_rejected(&computed).unwrap().is_some());
}

#[test]
fn test_evidence_missing_policy_decision() {
    let gate = gate();
    let auth_hash = commit_ok(&gate, "auth_context", auth_context(TRACE_A));
    let record = model_call(TRACE_A, &auth_hash.to_hex(), &"2".repeat(64));
    let computed = envelope_hash(&record).unwrap();

    let outcome = gate.commit("model_call", &computed.to_hex(), record).unwrap();

    assert_eq!(outcome.classification, Classification::MissingPrereq);
    assert_eq!(
        outcome.error_kind.as_deref(),
        Some(kind::MISSING_PREREQ_POLICY_DECISION)
    );
}

#[test]
fn test_reference_to_wrong_kind_is_missing_prereq() {
    let gate = gate();
    let (auth_hash, _) = seed_allow_chain(&gate);
    // The auth-context slot points at an accepted record of the wrong kind.
    let record = policy_decision(TRACE_A, &auth_hash.to_hex(), "allow");
    let policy_hash = envelope_hash(&record).unwrap();
    gate.commit("policy_decision", &policy_hash.to_hex(), record)
        .unwrap();

    let bad = policy_decision(TRACE_A, &policy_hash.to_hex(), "allow");
    let computed = envelope_hash(&bad).unwrap();
    let outcome = gate
        .commit("policy_decision", &computed.to_hex(), bad)
        .unwrap();

    assert_eq!(outcome.classification, Classification::MissingPrereq);
    assert_eq!(
        outcome.error_kind.as_deref(),
        Some(kind::MISSING_PREREQ_AUTH_CONTEXT)
    );
}

#[test]
fn test_rejected_attempt_does_not_satisfy_prerequisite() {
    let gate = gate();
    // Reject a policy decision (missing prereq), then reference it.
    let rejected_policy = policy_decision(TRACE_A, &"1".repeat(64), "allow");
    let rejected_hash = envelope_hash(&rejected_policy).unwrap();
    gate.commit("policy_decision", &rejected_hash.to_hex(), rejected_policy)
        .unwrap();

    let auth_hash = commit_ok(&gate, "auth_context", auth_context(TRACE_A));
    let record = tool_call(TRACE_A, &auth_hash.to_hex(), &rejected_hash.to_hex());
    let computed = envelope_hash(&record).unwrap();
    let outcome = gate.commit("tool_call", &computed.to_hex(), record).unwrap();

    assert_eq!(outcome.classification, Classification::MissingPrereq);
}

// =========================================================================
// Step 8: Trace Continuity
// =========================================================================

#[test]
fn test_trace_violation() {
    let gate = gate();
    let (auth_hash, policy_hash) = seed_allow_chain(&gate);
    let record = model_call(TRACE_B, &auth_hash.to_hex(), &policy_hash.to_hex());
    let computed = envelope_hash(&record).unwrap();

    let outcome = gate.commit("model_call", &computed.to_hex(), record).unwrap();

    assert_eq!(outcome.classification, Classification::TraceViolation);
    assert_eq!(outcome.error_kind.as_deref(), Some(kind::TRACE_ID_MISMATCH));
    assert!(gate.store().get_rejected(&computed).unwrap().is_some());
}

// =========================================================================
// Step 9: Authorization
// =========================================================================

#[test]
fn test_unauthorized_execution_on_deny() {
    let gate = gate();
    let auth_hash = commit_ok(&gate, "auth_context", auth_context(TRACE_A));
    let deny = policy_decision(TRACE_A, &auth_hash.to_hex(), "deny");
    let deny_hash = commit_ok(&gate, "policy_decision", deny);

    let record = tool_call(TRACE_A, &auth_hash.to_hex(), &deny_hash.to_hex());
    let computed = envelope_hash(&record).unwrap();
    let outcome = gate.commit("tool_call", &computed.to_hex(), record).unwrap();

    assert_eq!(outcome.classification, Classification::UnauthorizedExecution);
    assert_eq!(outcome.error_kind.as_deref(), Some(kind::POLICY_DENIED));
    let attempt = gate.store().get_rejected(&computed).unwrap().unwrap();
    assert_eq!(attempt.error_kind, kind::POLICY_DENIED);
}

// =========================================================================
// Determinism
// =========================================================================

#[test]
fn test_commit_is_deterministic_for_fixed_store() {
    let gate = gate();
    let record = policy_decision(TRACE_A, &"1".repeat(64), "allow");
    let declared = envelope_hash(&record).unwrap().to_hex();

    let first = gate
        .commit("policy_decision", &declared, record.clone())
        .unwrap();
    let second = gate.commit("policy_decision", &declared, record).unwrap();

    assert_eq!(first.classification, second.classification);
    assert_eq!(
        first.computed_envelope_hash,
        second.computed_envelope_hash
    );
}

#[test]
fn test_key_order_does_not_change_identity() {
    let gate = gate();
    let record = auth_context(TRACE_A);
    // Same data, different construction order.
    let mut reordered = json!({});
    let obj = record.as_object().unwrap();
    for key in obj.keys().rev() {
        reordered[key] = obj[key].clone();
    }

    let declared = envelope_hash(&record).unwrap();
    assert_eq!(declared, envelope_hash(&reordered).unwrap());

    let outcome = gate
        .commit("auth_context", &declared.to_hex(), reordered)
        .unwrap();
    assert!(outcome.accepted);
}
