//! Stable error-kind strings.
//!
//! These strings are part of the external contract: consumers and test
//! vectors match them exactly. Schema-violation kinds are produced by the
//! schema validator (`schema_violation.<keyword>` with named
//! specializations); the remainder are produced by the gate and the replay
//! engines.

/// A `policy_decision` references an `auth_context` that is not in the
/// accepted namespace.
pub const MISSING_PREREQ_AUTH_CONTEXT: &str = "missing_prereq.auth_context";

/// A `model_call`/`tool_call` references a `policy_decision` that is not in
/// the accepted namespace.
pub const MISSING_PREREQ_POLICY_DECISION: &str = "missing_prereq.policy_decision";

/// A record's `trace_id` disagrees with a resolved prerequisite's.
pub const TRACE_ID_MISMATCH: &str = "trace_violation.trace_id_mismatch";

/// The referenced policy decision's result is not `allow`.
pub const POLICY_DENIED: &str = "unauthorized.policy_denied";

/// The declared envelope hash does not equal the computed one.
pub const ENVELOPE_HASH_MISMATCH: &str = "hash_mismatch.envelope_hash";

/// Canonical bytes recomputed during forensic replay differ from the bytes
/// stored with the artifact.
pub const CANONICAL_JSON_MISMATCH: &str = "hash_mismatch.canonical_json_mismatch";

/// The declared record kind is outside the closed set.
pub const RECORD_TYPE_FORBIDDEN: &str = "record_type.forbidden";

/// The record's own `record_type` disagrees with the declared kind.
pub const RECORD_TYPE_MISMATCH: &str = "schema_violation.record_type_mismatch";

/// A schema-valid record failed canonicalization.
pub const CANONICAL_FORM: &str = "schema_violation.canonical_form";

/// Replay: the requested trace has no accepted chain.
pub const REPLAY_CHAIN_NOT_FOUND: &str = "replay.chain_not_found";

/// Replay: policy-path signatures differ between baseline and candidate.
pub const REPLAY_POLICY_PATH_MISMATCH: &str = "replay.policy_path_mismatch";

/// Replay: a response reference differs and the variance policy does not
/// allow it for that evidence kind.
pub const REPLAY_VARIANCE_RESPONSE_BLOBREF: &str = "replay.variance.response_blobref";
