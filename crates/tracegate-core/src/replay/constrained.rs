//! Constrained replay: baseline/candidate comparison under a variance
//! policy.
//!
//! A re-run of a governed action may legitimately produce different model
//! or tool output while still being governance-equivalent to the original.
//! Constrained replay certifies that equivalence: both traces must pass
//! invariant replay, their policy paths must match as multisets of
//! signature projections, their evidence identities must match, and any
//! response difference between matched evidence pairs must be explicitly
//! allowed by the [`VariancePolicy`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::result::{finish, ReplayType};
use super::{verify_chain, ReplayError, ReplayOutcome};
use crate::canon::{self, EnvelopeHash};
use crate::outcome::{kind, Classification};
use crate::record::{access, RecordKind};
use crate::store::ArtifactStore;
use crate::time::Clock;
use crate::trace::{resolve_chain, ChainEntry, ResolveOptions};

/// Per-kind variance rule. Everything defaults to closed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VarianceRule {
    /// Allow the `response` content reference to differ between matched
    /// evidence pairs.
    pub allow_response_blobref: bool,
}

/// The variance policy consumed by constrained replay: which fields of
/// which evidence kinds may differ between two otherwise policy-equivalent
/// traces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VariancePolicy {
    /// Variance rule for `model_call` evidence.
    pub model_call: VarianceRule,
    /// Variance rule for `tool_call` evidence.
    pub tool_call: VarianceRule,
}

impl VariancePolicy {
    fn rule(&self, record_kind: RecordKind) -> VarianceRule {
        match record_kind {
            RecordKind::ToolCall => self.tool_call,
            _ => self.model_call,
        }
    }
}

/// An evidence record paired with its comparison identity.
struct EvidenceIdentity<'a> {
    entry: &'a ChainEntry,
    identity: String,
}

/// Compares a baseline trace and a candidate trace under the variance
/// policy and emits a content-addressed result.
///
/// The result's `target_trace_id` is the candidate trace;
/// `input_envelope_hashes` lists the baseline chain followed by the
/// candidate chain; on pass, `details.allowed_differences` enumerates the
/// approved differences.
///
/// # Errors
///
/// Returns [`ReplayError`] only for infrastructure failures; verification
/// failures are reported through the outcome.
pub fn constrained_replay(
    store: &impl ArtifactStore,
    baseline_trace_id: &str,
    candidate_trace_id: &str,
    policy: &VariancePolicy,
    clock: &dyn Clock,
) -> Result<ReplayOutcome, ReplayError> {
    let baseline = resolve_chain(store, baseline_trace_id, ResolveOptions::default())?;
    let candidate = resolve_chain(store, candidate_trace_id, ResolveOptions::default())?;

    let input_hashes: Vec<EnvelopeHash> = baseline
        .iter()
        .chain(candidate.iter())
        .map(|e| e.envelope_hash)
        .collect();

    let base_details = |extra: Value| {
        let mut details = json!({
            "baseline_trace_id": baseline_trace_id,
            "candidate_trace_id": candidate_trace_id,
        });
        if let (Some(obj), Some(extra_obj)) = (details.as_object_mut(), extra.as_object()) {
            for (key, value) in extra_obj {
                obj.insert(key.clone(), value.clone());
            }
        }
        details
    };
    let fail = |failure: (Classification, String), extra: Value| {
        finish(
            store,
            ReplayType::Constrained,
            candidate_trace_id,
            &input_hashes,
            Some(failure),
            base_details(extra),
            clock,
        )
    };

    // Pre-checks: both traces must pass invariant replay.
    for (trace_id, chain) in [
        (baseline_trace_id, &baseline),
        (candidate_trace_id, &candidate),
    ] {
        if chain.is_empty() {
            return fail(
                (
                    Classification::ReplayChainNotFound,
                    kind::REPLAY_CHAIN_NOT_FOUND.to_string(),
                ),
                json!({ "failed_trace_id": trace_id }),
            );
        }
        if let Some(failure) = verify_chain(store, trace_id, chain, false)? {
            return fail(
                (failure.classification, failure.error_kind),
                json!({
                    "failed_trace_id": trace_id,
                    "offending_envelope_hash": failure.offending.to_hex(),
                    "message": failure.message,
                }),
            );
        }
    }

    // Policy-path equivalence, as multisets of signature projections.
    let baseline_policies = policy_signatures(&baseline)?;
    let candidate_policies = policy_signatures(&candidate)?;
    let baseline_path = sorted_values(&baseline_policies);
    let candidate_path = sorted_values(&candidate_policies);
    if baseline_path != candidate_path {
        return fail(
            (
                Classification::ReplayPolicyPathMismatch,
                kind::REPLAY_POLICY_PATH_MISMATCH.to_string(),
            ),
            json!({
                "baseline_policy_count": baseline_path.len(),
                "candidate_policy_count": candidate_path.len(),
                "message": "policy decision signatures differ between the traces",
            }),
        );
    }

    // Evidence identity equivalence.
    let baseline_evidence = match evidence_identities(&baseline, &baseline_policies)? {
        Ok(evidence) => evidence,
        Err(failure) => return fail(failure, json!({ "failed_trace_id": baseline_trace_id })),
    };
    let candidate_evidence = match evidence_identities(&candidate, &candidate_policies)? {
        Ok(evidence) => evidence,
        Err(failure) => return fail(failure, json!({ "failed_trace_id": candidate_trace_id })),
    };

    let baseline_ids: Vec<&str> = baseline_evidence.iter().map(|e| e.identity.as_str()).collect();
    let candidate_ids: Vec<&str> = candidate_evidence.iter().map(|e| e.identity.as_str()).collect();
    if baseline_ids != candidate_ids {
        return fail(
            (
                Classification::ReplayPolicyPathMismatch,
                kind::REPLAY_POLICY_PATH_MISMATCH.to_string(),
            ),
            json!({
                "baseline_evidence_count": baseline_ids.len(),
                "candidate_evidence_count": candidate_ids.len(),
                "message": "evidence identities differ between the traces",
            }),
        );
    }

    // Variance enforcement over matched pairs.
    let mut allowed_differences = Vec::new();
    for (base, cand) in baseline_evidence.iter().zip(&candidate_evidence) {
        let base_response = canon::canonical_json(&base.entry.record["response"])?;
        let cand_response = canon::canonical_json(&cand.entry.record["response"])?;
        if base_response == cand_response {
            continue;
        }

        if !policy.rule(base.entry.kind).allow_response_blobref {
            return fail(
                (
                    Classification::ReplayVarianceViolation,
                    kind::REPLAY_VARIANCE_RESPONSE_BLOBREF.to_string(),
                ),
                json!({
                    "kind": base.entry.kind.as_str(),
                    "baseline_envelope_hash": base.entry.envelope_hash.to_hex(),
                    "candidate_envelope_hash": cand.entry.envelope_hash.to_hex(),
                    "message": "response reference differs and variance is not allowed",
                }),
            );
        }
        allowed_differences.push(json!({
            "kind": base.entry.kind.as_str(),
            "field": "response",
            "baseline_envelope_hash": base.entry.envelope_hash.to_hex(),
            "candidate_envelope_hash": cand.entry.envelope_hash.to_hex(),
        }));
    }

    finish(
        store,
        ReplayType::Constrained,
        candidate_trace_id,
        &input_hashes,
        None,
        base_details(json!({ "allowed_differences": allowed_differences })),
        clock,
    )
}

/// Projects each policy decision in the chain to its signature tuple,
/// keyed by envelope hash.
///
/// The signature covers `(policy_id, policy_version, policy_sha256,
/// action, resource, result, sorted reason-code keys, sorted obligation
/// keys)`, serialized canonically so signatures compare as plain strings.
fn policy_signatures(chain: &[ChainEntry]) -> Result<BTreeMap<String, String>, ReplayError> {
    let mut signatures = BTreeMap::new();
    for entry in chain.iter().filter(|e| e.kind == RecordKind::PolicyDecision) {
        let record = &entry.record;
        let projection = json!({
            "action": record["request"]["action"],
            "obligations": sorted_keys(&record["decision"]["obligations"]),
            "policy_id": record["policy"]["policy_id"],
            "policy_sha256": record["policy"]["policy_sha256"],
            "policy_version": record["policy"]["policy_version"],
            "reason_codes": sorted_keys(&record["decision"]["reason_codes"]),
            "resource": record["request"]["resource"],
            "result": record["decision"]["result"],
        });
        signatures.insert(
            entry.envelope_hash.to_hex(),
            canon::canonical_json(&projection)?,
        );
    }
    Ok(signatures)
}

/// Forms each evidence record's identity: `(kind, identifier block,
/// request reference, referenced policy signature)`. Entries come back
/// sorted by identity, chain order breaking ties among duplicates.
fn evidence_identities<'a>(
    chain: &'a [ChainEntry],
    policies: &BTreeMap<String, String>,
) -> Result<Result<Vec<EvidenceIdentity<'a>>, (Classification, String)>, ReplayError> {
    let mut evidence = Vec::new();
    for entry in chain.iter().filter(|e| e.kind.is_evidence()) {
        let policy_signature = access::policy_decision_ref(&entry.record)
            .and_then(|hex| policies.get(hex));
        let Some(policy_signature) = policy_signature else {
            return Ok(Err((
                Classification::MissingPrereq,
                kind::MISSING_PREREQ_POLICY_DECISION.to_string(),
            )));
        };

        let identifier = match entry.kind {
            RecordKind::ToolCall => &entry.record["tool"],
            _ => &entry.record["model"],
        };
        let identity = canon::canonical_json(&json!({
            "identifier": identifier,
            "kind": entry.kind.as_str(),
            "policy_signature": policy_signature,
            "request": entry.record["request"],
        }))?;
        evidence.push(EvidenceIdentity { entry, identity });
    }

    evidence.sort_by(|a, b| a.identity.cmp(&b.identity));
    Ok(Ok(evidence))
}

fn sorted_values(map: &BTreeMap<String, String>) -> Vec<&str> {
    let mut values: Vec<&str> = map.values().map(String::as_str).collect();
    values.sort_unstable();
    values
}

fn sorted_keys(value: &Value) -> Vec<String> {
    let mut keys: Vec<String> = value
        .as_object()
        .map(|obj| obj.keys().cloned().collect())
        .unwrap_or_default();
    keys.sort_unstable();
    keys
}
