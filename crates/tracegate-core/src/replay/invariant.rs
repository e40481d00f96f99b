//! Invariant replay: governance re-verification without execution.

use serde_json::json;

use super::result::{finish, ReplayType};
use super::{verify_chain, ReplayError, ReplayOutcome};
use crate::canon::EnvelopeHash;
use crate::outcome::{kind, Classification};
use crate::store::ArtifactStore;
use crate::time::Clock;
use crate::trace::{resolve_chain, ResolveOptions};

/// Verifies a trace's accepted chain and emits a content-addressed result.
///
/// On the first failing check the result record carries the failing
/// classification, the offending record's hash, and a concise diagnostic.
/// On success it enumerates the input hashes of the verified chain.
///
/// # Errors
///
/// Returns [`ReplayError`] only for infrastructure failures; verification
/// failures are reported through the outcome.
pub fn invariant_replay(
    store: &impl ArtifactStore,
    trace_id: &str,
    clock: &dyn Clock,
) -> Result<ReplayOutcome, ReplayError> {
    replay_with_strategy(store, trace_id, ReplayType::Invariant, false, clock)
}

/// Shared driver for the invariant and forensic engines.
pub(super) fn replay_with_strategy(
    store: &impl ArtifactStore,
    trace_id: &str,
    replay_type: ReplayType,
    require_byte_equality: bool,
    clock: &dyn Clock,
) -> Result<ReplayOutcome, ReplayError> {
    let chain = resolve_chain(store, trace_id, ResolveOptions::default())?;
    if chain.is_empty() {
        return finish(
            store,
            replay_type,
            trace_id,
            &[],
            Some((
                Classification::ReplayChainNotFound,
                kind::REPLAY_CHAIN_NOT_FOUND.to_string(),
            )),
            json!({ "message": "no accepted chain exists for the trace" }),
            clock,
        );
    }

    let input_hashes: Vec<EnvelopeHash> = chain.iter().map(|e| e.envelope_hash).collect();

    match verify_chain(store, trace_id, &chain, require_byte_equality)? {
        Some(failure) => finish(
            store,
            replay_type,
            trace_id,
            &input_hashes,
            Some((failure.classification, failure.error_kind)),
            json!({
                "offending_envelope_hash": failure.offending.to_hex(),
                "message": failure.message,
            }),
            clock,
        ),
        None => finish(
            store,
            replay_type,
            trace_id,
            &input_hashes,
            None,
            json!({}),
            clock,
        ),
    }
}
