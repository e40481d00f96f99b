//! Forensic replay: bit-exact re-verification.
//!
//! Beyond the invariant checks, forensic replay requires that the
//! canonical bytes recomputed during replay equal the bytes stored with
//! the original artifact, byte for byte. A mismatch is classified
//! `HASH_MISMATCH` with kind `hash_mismatch.canonical_json_mismatch`.
//!
//! This is the local-recompute strategy; re-ingesting the chain through a
//! fresh commit gate over an empty store is an equivalent formulation and
//! is expressible with the public gate API.

use super::invariant::replay_with_strategy;
use super::result::ReplayType;
use super::{ReplayError, ReplayOutcome};
use crate::store::ArtifactStore;
use crate::time::Clock;

/// Re-verifies a trace bit-exactly and emits a content-addressed result.
///
/// Every trace that passes forensic replay also passes
/// [`invariant_replay`](super::invariant_replay): the forensic checks are
/// a strict superset.
///
/// # Errors
///
/// Returns [`ReplayError`] only for infrastructure failures; verification
/// failures are reported through the outcome.
pub fn forensic_replay(
    store: &impl ArtifactStore,
    trace_id: &str,
    clock: &dyn Clock,
) -> Result<ReplayOutcome, ReplayError> {
    replay_with_strategy(store, trace_id, ReplayType::Forensic, true, clock)
}
