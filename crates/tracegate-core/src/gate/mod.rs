//! The commit gate: the ledger's single write aperture.
//!
//! Every record enters the store through [`CommitGate::commit`], which runs
//! a fixed validation sequence and mutates the store according to the
//! outcome. The sequence is never reordered:
//!
//! 1. **Record-kind check** - the declared kind must be in the closed set;
//!    else `RECORD_TYPE_FORBIDDEN` (not persisted)
//! 2. **Schema validation** - else `SCHEMA_REJECT` (not persisted)
//! 3. **Payload-kind agreement** - the record's own `record_type` must
//!    equal the declared kind; else `SCHEMA_REJECT` (not persisted)
//! 4. **Canonicalize** - any codec error is `SCHEMA_REJECT`
//! 5. **Hash** - SHA-256 over the canonical bytes
//! 6. **Hash comparison** - declared vs computed; else `HASH_MISMATCH`
//!    (rejected-attempt keyed by the computed hash)
//! 7. **Prerequisite resolution** - referenced artifacts must resolve in
//!    the accepted namespace; else `MISSING_PREREQ` (rejected-attempt)
//! 8. **Trace continuity** - the record's `trace_id` must equal every
//!    resolved prerequisite's; else `TRACE_VIOLATION` (rejected-attempt)
//! 9. **Authorization** - evidence requires its policy decision's result
//!    to be `allow`; else `UNAUTHORIZED_EXECUTION` (rejected-attempt)
//! 10. **Persist accepted**
//!
//! A submitted record terminates as accepted, rejected-attempt, or dropped.
//! The gate never retries, never coerces, and never infers missing fields;
//! all validation completes before any store write, so a cancelled commit
//! leaves no partial state.

#[cfg(test)]
mod tests;

use serde_json::Value;

use crate::canon::{self, EnvelopeHash};
use crate::outcome::{kind, Classification};
use crate::record::{access, RecordKind};
use crate::schema;
use crate::store::{AcceptedArtifact, ArtifactStore, RejectedAttempt, StoreError};

/// The structured outcome of a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    /// True when the record was persisted as an accepted artifact.
    pub accepted: bool,
    /// The outcome classification.
    pub classification: Classification,
    /// The stable error-kind string for rejections.
    pub error_kind: Option<String>,
    /// The computed envelope hash, when canonical bytes were defined.
    pub computed_envelope_hash: Option<EnvelopeHash>,
    /// The canonical bytes, when defined.
    pub canonical_bytes: Option<Vec<u8>>,
}

impl CommitOutcome {
    fn dropped(classification: Classification, error_kind: impl Into<String>) -> Self {
        Self {
            accepted: false,
            classification,
            error_kind: Some(error_kind.into()),
            computed_envelope_hash: None,
            canonical_bytes: None,
        }
    }
}

/// The single write aperture over an artifact store.
#[derive(Debug, Clone)]
pub struct CommitGate<S> {
    store: S,
}

impl<S: ArtifactStore> CommitGate<S> {
    /// Creates a gate over the given store.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Consumes the gate and returns the underlying store.
    #[must_use]
    pub fn into_store(self) -> S {
        self.store
    }

    /// Submits a record through the fixed validation sequence.
    ///
    /// For a fixed store state, the outcome classification and computed
    /// envelope hash are the same regardless of when the call runs.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] only for storage-backend failures; every
    /// validation failure is reported through the outcome.
    pub fn commit(
        &self,
        declared_kind: &str,
        declared_hash: &str,
        record: Value,
    ) -> Result<CommitOutcome, StoreError> {
        // Step 1: record-kind check.
        let Some(declared) = RecordKind::parse(declared_kind) else {
            tracing::warn!(
                declared_kind,
                classification = %Classification::RecordTypeForbidden,
                "record dropped"
            );
            return Ok(CommitOutcome::dropped(
                Classification::RecordTypeForbidden,
                kind::RECORD_TYPE_FORBIDDEN,
            ));
        };

        // Step 2: schema validation.
        let payload_kind = match schema::validate(&record) {
            Ok(kind) => kind,
            Err(err) => {
                tracing::warn!(
                    declared_kind,
                    error_kind = %err.kind,
                    classification = %Classification::SchemaReject,
                    "record dropped"
                );
                return Ok(CommitOutcome::dropped(
                    Classification::SchemaReject,
                    err.kind,
                ));
            },
        };

        // Step 3: payload-kind agreement.
        if payload_kind != declared {
            tracing::warn!(
                declared_kind,
                payload_kind = %payload_kind,
                classification = %Classification::SchemaReject,
                "record dropped"
            );
            return Ok(CommitOutcome::dropped(
                Classification::SchemaReject,
                kind::RECORD_TYPE_MISMATCH,
            ));
        }

        // Step 4: canonicalize.
        let Ok(canonical_bytes) = canon::canonicalize(&record) else {
            return Ok(CommitOutcome::dropped(
                Classification::SchemaReject,
                kind::CANONICAL_FORM,
            ));
        };

        // Step 5: hash.
        let computed = EnvelopeHash::of(&canonical_bytes);

        // Step 6: hash comparison, as lowercase hex.
        if declared_hash != computed.to_hex() {
            return self.reject(
                declared,
                record,
                canonical_bytes,
                computed,
                Classification::HashMismatch,
                kind::ENVELOPE_HASH_MISMATCH,
            );
        }

        // Step 7: prerequisite resolution.
        let mut requirements: Vec<(Option<EnvelopeHash>, RecordKind, &'static str)> = Vec::new();
        if declared != RecordKind::AuthContext {
            requirements.push((
                referenced_hash(access::auth_context_ref(&record)),
                RecordKind::AuthContext,
                kind::MISSING_PREREQ_AUTH_CONTEXT,
            ));
        }
        if declared.is_evidence() {
            requirements.push((
                referenced_hash(access::policy_decision_ref(&record)),
                RecordKind::PolicyDecision,
                kind::MISSING_PREREQ_POLICY_DECISION,
            ));
        }

        let mut resolved = Vec::with_capacity(requirements.len());
        for (reference, required_kind, miss_kind) in requirements {
            let artifact = match reference {
                Some(hash) => self.store.get_accepted(&hash)?,
                None => None,
            };
            let Some(artifact) = artifact.filter(|a| a.kind == required_kind) else {
                return self.reject(
                    declared,
                    record,
                    canonical_bytes,
                    computed,
                    Classification::MissingPrereq,
                    miss_kind,
                );
            };
            resolved.push(artifact);
        }

        // Step 8: trace continuity.
        let record_trace = access::trace_id(&record).unwrap_or_default().to_owned();
        if resolved
            .iter()
            .any(|a| access::trace_id(&a.record) != Some(record_trace.as_str()))
        {
            return self.reject(
                declared,
                record,
                canonical_bytes,
                computed,
                Classification::TraceViolation,
                kind::TRACE_ID_MISMATCH,
            );
        }

        // Step 9: authorization.
        if declared.is_evidence() {
            let allowed = resolved
                .iter()
                .find(|a| a.kind == RecordKind::PolicyDecision)
                .is_some_and(|a| access::decision_result(&a.record) == Some("allow"));
            if !allowed {
                return self.reject(
                    declared,
                    record,
                    canonical_bytes,
                    computed,
                    Classification::UnauthorizedExecution,
                    kind::POLICY_DENIED,
                );
            }
        }

        // Step 10: persist accepted.
        self.store.put_accepted(AcceptedArtifact {
            envelope_hash: computed,
            kind: declared,
            record,
            canonical_bytes: canonical_bytes.clone(),
        })?;
        tracing::debug!(
            envelope_hash = %computed,
            record_type = %declared,
            "record accepted"
        );

        Ok(CommitOutcome {
            accepted: true,
            classification: Classification::Accept,
            error_kind: None,
            computed_envelope_hash: Some(computed),
            canonical_bytes: Some(canonical_bytes),
        })
    }

    /// Persists a rejected attempt and returns its outcome.
    fn reject(
        &self,
        record_kind: RecordKind,
        record: Value,
        canonical_bytes: Vec<u8>,
        computed: EnvelopeHash,
        classification: Classification,
        error_kind: &'static str,
    ) -> Result<CommitOutcome, StoreError> {
        self.store.put_rejected(RejectedAttempt {
            envelope_hash: computed,
            kind: record_kind,
            record,
            canonical_bytes: canonical_bytes.clone(),
            classification,
            error_kind: error_kind.to_string(),
        })?;
        tracing::warn!(
            envelope_hash = %computed,
            classification = %classification,
            error_kind,
            "record rejected"
        );

        Ok(CommitOutcome {
            accepted: false,
            classification,
            error_kind: Some(error_kind.to_string()),
            computed_envelope_hash: Some(computed),
            canonical_bytes: Some(canonical_bytes),
        })
    }
}

/// Parses a schema-validated hash reference field.
fn referenced_hash(reference: Option<&str>) -> Option<EnvelopeHash> {
    reference.and_then(|hex| EnvelopeHash::from_hex(hex).ok())
}
