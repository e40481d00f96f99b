//! Replay result emission.
//!
//! Replay results are content-addressed records in their own store
//! namespace. They are not envelopes: they carry no `record_type`, never
//! pass through the commit gate, and have a fixed shape - every field is
//! always present, with JSON `null` for an absent failure class or kind:
//!
//! ```json
//! {
//!   "replay_type": "invariant",
//!   "target_trace_id": "...",
//!   "input_envelope_hashes": ["..."],
//!   "result": "pass",
//!   "failure_class": null,
//!   "failure_kind": null,
//!   "generated_at_ms": 1769817600000,
//!   "details": {}
//! }
//! ```
//!
//! The `generated_at_ms` stamp comes from the injected clock and is the
//! only place "now" enters the core.

use serde_json::{json, Value};

use super::{ReplayError, ReplayOutcome};
use crate::canon::{self, EnvelopeHash};
use crate::outcome::Classification;
use crate::store::{ArtifactStore, ReplayResultArtifact};
use crate::time::Clock;

/// The replay engine that produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayType {
    /// Bit-exact re-verification.
    Forensic,
    /// Integrity and governance invariants.
    Invariant,
    /// Baseline/candidate comparison under a variance policy.
    Constrained,
}

impl ReplayType {
    /// Returns the wire-format name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Forensic => "forensic",
            Self::Invariant => "invariant",
            Self::Constrained => "constrained",
        }
    }
}

impl std::fmt::Display for ReplayType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonicalizes a replay record, hashes it, and stores it in the
/// replay-result namespace. The hash is the result's artifact identifier;
/// any caller may later fetch the result by hash to audit a run.
///
/// # Errors
///
/// Returns [`ReplayError::Codec`] if the record does not canonicalize and
/// [`ReplayError::Store`] on backend failure.
pub fn emit_replay_result(
    store: &impl ArtifactStore,
    record: &Value,
) -> Result<EnvelopeHash, ReplayError> {
    let canonical_bytes = canon::canonicalize(record)?;
    let result_hash = EnvelopeHash::of(&canonical_bytes);
    store.put_replay_result(ReplayResultArtifact {
        result_hash,
        record: record.clone(),
        canonical_bytes,
    })?;
    Ok(result_hash)
}

/// Builds the fixed-shape result record, emits it, and wraps everything in
/// a [`ReplayOutcome`]. Shared by all three engines.
pub(super) fn finish(
    store: &impl ArtifactStore,
    replay_type: ReplayType,
    target_trace_id: &str,
    input_hashes: &[EnvelopeHash],
    failure: Option<(Classification, String)>,
    details: Value,
    clock: &dyn Clock,
) -> Result<ReplayOutcome, ReplayError> {
    let hashes: Vec<String> = input_hashes.iter().map(EnvelopeHash::to_hex).collect();
    let record = json!({
        "replay_type": replay_type.as_str(),
        "target_trace_id": target_trace_id,
        "input_envelope_hashes": hashes,
        "result": if failure.is_none() { "pass" } else { "fail" },
        "failure_class": failure.as_ref().map(|(class, _)| class.as_str()),
        "failure_kind": failure.as_ref().map(|(_, kind)| kind.clone()),
        "generated_at_ms": clock.now_ms(),
        "details": details,
    });

    let result_hash = emit_replay_result(store, &record)?;
    match &failure {
        Some((class, kind)) => tracing::warn!(
            replay_type = %replay_type,
            target_trace_id,
            result_hash = %result_hash,
            classification = %class,
            error_kind = %kind,
            "replay failed"
        ),
        None => tracing::debug!(
            replay_type = %replay_type,
            target_trace_id,
            result_hash = %result_hash,
            "replay passed"
        ),
    }

    let (failure_class, failure_kind) = match failure {
        Some((class, kind)) => (Some(class), Some(kind)),
        None => (None, None),
    };
    Ok(ReplayOutcome {
        passed: failure_class.is_none(),
        failure_class,
        failure_kind,
        result_hash,
        record,
    })
}
