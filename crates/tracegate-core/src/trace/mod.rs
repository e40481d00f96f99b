//! Trace index and resolver: a deterministic per-trace view of the store.
//!
//! The index scans the accepted namespace (optionally including rejected
//! attempts), buckets records by `trace_id`, and orders each bucket by:
//!
//! 1. kind class: `auth_context(0) < policy_decision(1) <
//!    model_call/tool_call(2)`
//! 2. time key: `ts_ms` for auth/policy records, `started_at_ms` for
//!    evidence (non-numeric treated as 0)
//! 3. envelope hash, lexicographic, as the tiebreaker
//!
//! Ordering is a pure function of the store contents: rebuilding over the
//! same store yields byte-identical chains regardless of insertion order.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::canon::EnvelopeHash;
use crate::outcome::Classification;
use crate::record::{access, RecordKind};
use crate::store::{ArtifactStore, StoreError};

/// Options controlling which namespaces the resolver scans.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveOptions {
    /// Include rejected-attempt artifacts in the chain view.
    pub include_rejected_attempts: bool,
}

/// How a chain entry was persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// The entry is an accepted artifact.
    Accepted,
    /// The entry is a rejected attempt.
    RejectedAttempt {
        /// The failure classification recorded with the attempt.
        classification: Classification,
        /// The stable error-kind string recorded with the attempt.
        error_kind: String,
    },
}

/// One record in a resolved chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainEntry {
    /// The artifact identifier.
    pub envelope_hash: EnvelopeHash,
    /// The record kind.
    pub kind: RecordKind,
    /// The record value.
    pub record: Value,
    /// The canonical bytes stored with the artifact.
    pub canonical_bytes: Vec<u8>,
    /// Accepted or rejected-attempt.
    pub disposition: Disposition,
}

impl ChainEntry {
    /// Returns true for accepted entries.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        self.disposition == Disposition::Accepted
    }
}

/// A deterministic view of the store, bucketed by trace identifier.
#[derive(Debug, Clone, Default)]
pub struct TraceIndex {
    buckets: BTreeMap<String, Vec<ChainEntry>>,
}

impl TraceIndex {
    /// Builds the index from a snapshot of the store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on storage-backend failure.
    pub fn build(store: &impl ArtifactStore, options: ResolveOptions) -> Result<Self, StoreError> {
        let mut buckets: BTreeMap<String, Vec<ChainEntry>> = BTreeMap::new();

        for artifact in store.accepted_snapshot()? {
            let Some(trace_id) = access::trace_id(&artifact.record).map(str::to_owned) else {
                continue;
            };
            buckets.entry(trace_id).or_default().push(ChainEntry {
                envelope_hash: artifact.envelope_hash,
                kind: artifact.kind,
                record: artifact.record,
                canonical_bytes: artifact.canonical_bytes,
                disposition: Disposition::Accepted,
            });
        }

        if options.include_rejected_attempts {
            for attempt in store.rejected_snapshot()? {
                let Some(trace_id) = access::trace_id(&attempt.record).map(str::to_owned) else {
                    continue;
                };
                buckets.entry(trace_id).or_default().push(ChainEntry {
                    envelope_hash: attempt.envelope_hash,
                    kind: attempt.kind,
                    record: attempt.record,
                    canonical_bytes: attempt.canonical_bytes,
                    disposition: Disposition::RejectedAttempt {
                        classification: attempt.classification,
                        error_kind: attempt.error_kind,
                    },
                });
            }
        }

        for entries in buckets.values_mut() {
            entries.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));
        }

        Ok(Self { buckets })
    }

    /// Resolves the ordered chain for a trace, or `None` when the trace has
    /// no records in the scanned namespaces.
    #[must_use]
    pub fn resolve(&self, trace_id: &str) -> Option<&[ChainEntry]> {
        self.buckets.get(trace_id).map(Vec::as_slice)
    }

    /// Iterates all trace identifiers in the index, in lexicographic order.
    pub fn trace_ids(&self) -> impl Iterator<Item = &str> {
        self.buckets.keys().map(String::as_str)
    }

    /// Returns the number of traces in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Returns true if the index holds no traces.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Resolves a single trace without retaining the index.
///
/// Returns an empty vector when the trace has no records.
///
/// # Errors
///
/// Returns [`StoreError`] on storage-backend failure.
pub fn resolve_chain(
    store: &impl ArtifactStore,
    trace_id: &str,
    options: ResolveOptions,
) -> Result<Vec<ChainEntry>, StoreError> {
    let index = TraceIndex::build(store, options)?;
    Ok(index.resolve(trace_id).map(<[ChainEntry]>::to_vec).unwrap_or_default())
}

fn sort_key(entry: &ChainEntry) -> (u8, u64, String) {
    (
        entry.kind.kind_class(),
        access::time_key(&entry.record, entry.kind.time_key_field()),
        entry.envelope_hash.to_hex(),
    )
}
