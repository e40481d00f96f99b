//! Replay engines: re-verification over persisted artifacts.
//!
//! Replay never executes a model or a tool. Each engine reads a trace's
//! accepted chain through the resolver, re-checks the invariants the gate
//! enforced at commit time, and emits a content-addressed result record
//! into the replay-result namespace:
//!
//! - [`invariant_replay`]: integrity and governance invariants
//! - [`forensic_replay`]: invariant checks plus bit-exact canonical-byte
//!   equality against the stored artifacts
//! - [`constrained_replay`]: compares a baseline and a candidate trace
//!   under an explicit [`VariancePolicy`]
//!
//! An engine reports the first failing class it encounters; it does not
//! continue to enumerate subsequent problems.

mod constrained;
mod forensic;
mod invariant;
mod result;


pub use constrained::{constrained_replay, VariancePolicy, VarianceRule};
pub use forensic::forensic_replay;
pub use invariant::invariant_replay;
pub use result::{emit_replay_result, ReplayType};

use serde_json::Value;
use thiserror::Error;

use crate::canon::{self, CodecError, EnvelopeHash};
use crate::outcome::{kind, Classification};
use crate::record::{access, RecordKind};
use crate::schema;
use crate::store::{ArtifactStore, StoreError};
use crate::trace::ChainEntry;

/// Errors that abort a replay run without producing a result record.
///
/// Verification failures are *outcomes*, not errors; this type covers only
/// infrastructure failures.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReplayError {
    /// Storage backend failure.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The result record could not be canonicalized.
    #[error("replay result could not be canonicalized: {0}")]
    Codec(#[from] CodecError),
}

/// The outcome of a replay run: the content-addressed result record plus
/// its classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayOutcome {
    /// True when the replay passed.
    pub passed: bool,
    /// The failing classification, when the replay failed.
    pub failure_class: Option<Classification>,
    /// The stable error-kind string, when the replay failed.
    pub failure_kind: Option<String>,
    /// The result record's artifact identifier.
    pub result_hash: EnvelopeHash,
    /// The result record as stored.
    pub record: Value,
}

/// A verification failure within a chain.
pub(crate) struct ChainFailure {
    pub classification: Classification,
    pub error_kind: String,
    pub offending: EnvelopeHash,
    pub message: String,
}

/// Re-verifies a trace's accepted chain without executing anything.
///
/// Checks, each short-circuiting on first failure, per record in chain
/// order:
///
/// 1. the record still validates against its schema
/// 2. canonical bytes recompute and their hash equals the stored key
/// 3. (forensic only) recomputed canonical bytes equal the stored bytes
/// 4. the record's `trace_id` equals the requested one
/// 5. prerequisites resolve in the accepted namespace and share the
///    `trace_id`; evidence requires its policy decision's result to be
///    `allow`
pub(crate) fn verify_chain(
    store: &impl ArtifactStore,
    trace_id: &str,
    chain: &[ChainEntry],
    require_byte_equality: bool,
) -> Result<Option<ChainFailure>, StoreError> {
    for entry in chain {
        if let Err(err) = schema::validate(&entry.record) {
            return Ok(Some(ChainFailure {
                classification: Classification::SchemaReject,
                error_kind: err.kind,
                offending: entry.envelope_hash,
                message: err.message,
            }));
        }

        let Ok(recomputed) = canon::canonicalize(&entry.record) else {
            return Ok(Some(ChainFailure {
                classification: Classification::SchemaReject,
                error_kind: kind::CANONICAL_FORM.to_string(),
                offending: entry.envelope_hash,
                message: "stored record no longer canonicalizes".to_string(),
            }));
        };

        if EnvelopeHash::of(&recomputed) != entry.envelope_hash {
            return Ok(Some(ChainFailure {
                classification: Classification::HashMismatch,
                error_kind: kind::ENVELOPE_HASH_MISMATCH.to_string(),
                offending: entry.envelope_hash,
                message: "recomputed envelope hash differs from the stored key".to_string(),
            }));
        }

        if require_byte_equality && recomputed != entry.canonical_bytes {
            return Ok(Some(ChainFailure {
                classification: Classification::HashMismatch,
                error_kind: kind::CANONICAL_JSON_MISMATCH.to_string(),
                offending: entry.envelope_hash,
                message: "recomputed canonical bytes differ from the stored bytes".to_string(),
            }));
        }

        if access::trace_id(&entry.record) != Some(trace_id) {
            return Ok(Some(ChainFailure {
                classification: Classification::TraceViolation,
                error_kind: kind::TRACE_ID_MISMATCH.to_string(),
                offending: entry.envelope_hash,
                message: "record trace_id differs from the requested trace".to_string(),
            }));
        }

        if let Some(failure) = verify_prerequisites(store, trace_id, entry)? {
            return Ok(Some(failure));
        }
    }

    Ok(None)
}

/// Re-checks an entry's cross-references against the accepted namespace.
fn verify_prerequisites(
    store: &impl ArtifactStore,
    trace_id: &str,
    entry: &ChainEntry,
) -> Result<Option<ChainFailure>, StoreError> {
    let mut requirements: Vec<(Option<&str>, RecordKind, &'static str)> = Vec::new();
    match entry.kind {
        RecordKind::AuthContext => {},
        RecordKind::PolicyDecision => {
            requirements.push((
                access::auth_context_ref(&entry.record),
                RecordKind::AuthContext,
                kind::MISSING_PREREQ_AUTH_CONTEXT,
            ));
        },
        RecordKind::ModelCall | RecordKind::ToolCall => {
            requirements.push((
                access::auth_context_ref(&entry.record),
                RecordKind::AuthContext,
                kind::MISSING_PREREQ_AUTH_CONTEXT,
            ));
            requirements.push((
                access::policy_decision_ref(&entry.record),
                RecordKind::PolicyDecision,
                kind::MISSING_PREREQ_POLICY_DECISION,
            ));
        },
    }

    for (reference, required_kind, miss_kind) in requirements {
        let hash = reference.and_then(|hex| EnvelopeHash::from_hex(hex).ok());
        let artifact = match hash {
            Some(hash) => store.get_accepted(&hash)?,
            None => None,
        };
        let Some(artifact) = artifact.filter(|a| a.kind == required_kind) else {
            return Ok(Some(ChainFailure {
                classification: Classification::MissingPrereq,
                error_kind: miss_kind.to_string(),
                offending: entry.envelope_hash,
                message: format!("referenced {required_kind} is not an accepted artifact"),
            }));
        };

        if access::trace_id(&artifact.record) != Some(trace_id) {
            return Ok(Some(ChainFailure {
                classification: Classification::TraceViolation,
                error_kind: kind::TRACE_ID_MISMATCH.to_string(),
                offending: entry.envelope_hash,
                message: format!("referenced {required_kind} belongs to a different trace"),
            }));
        }

        if entry.kind.is_evidence()
            && required_kind == RecordKind::PolicyDecision
            && access::decision_result(&artifact.record) != Some("allow")
        {
            return Ok(Some(ChainFailure {
                classification: Classification::UnauthorizedExecution,
                error_kind: kind::POLICY_DENIED.to_string(),
                offending: entry.envelope_hash,
                message: "referenced policy decision does not allow execution".to_string(),
            }));
        }
    }

    Ok(None)
}
