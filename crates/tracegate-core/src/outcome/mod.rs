//! The closed failure taxonomy and its persistence policy.
//!
//! Errors are outcomes, not exceptions: every public operation on the gate
//! or the replay engines returns a structured outcome whose classification
//! is drawn from this closed set. The gate never retries, never coerces,
//! and never infers missing fields; the caller decides whether to re-submit
//! a corrected record.
//!
//! Persistence follows the classification:
//!
//! | Class | Persistence |
//! |---|---|
//! | `ACCEPT` | stored as accepted |
//! | `SCHEMA_REJECT` | not persisted (no canonical bytes exist by rule) |
//! | `HASH_MISMATCH` | stored as rejected-attempt |
//! | `MISSING_PREREQ` | stored as rejected-attempt |
//! | `TRACE_VIOLATION` | stored as rejected-attempt |
//! | `UNAUTHORIZED_EXECUTION` | stored as rejected-attempt |
//! | `RECORD_TYPE_FORBIDDEN` | not persisted |
//!
//! The replay-specific classes (`REPLAY_*`) classify replay results, which
//! live in their own content-addressed namespace and are always persisted
//! by the emitter.
//!
//! Error-kind strings are part of the external contract: test vectors
//! assert against the exact constants in [`kind`].

pub mod kind;

use serde::{Deserialize, Serialize};

/// The closed set of outcome classifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    /// All checks passed; the record is an accepted artifact.
    Accept,
    /// Schema validation failed, canonicalization failed, or the declared
    /// record kind disagrees with the payload.
    SchemaReject,
    /// The declared hash does not equal the computed envelope hash.
    HashMismatch,
    /// A required referenced artifact is absent from the accepted namespace.
    MissingPrereq,
    /// The record's `trace_id` disagrees with a prerequisite's.
    TraceViolation,
    /// The referenced policy decision's result is not `allow`.
    UnauthorizedExecution,
    /// The declared record kind is outside the closed set.
    RecordTypeForbidden,
    /// Replay: no accepted chain exists for the requested trace.
    ReplayChainNotFound,
    /// Replay: baseline and candidate policy paths are not equivalent.
    ReplayPolicyPathMismatch,
    /// Replay: evidence differs in a way the variance policy does not allow.
    ReplayVarianceViolation,
}

impl Classification {
    /// Returns the stable wire name (`SCREAMING_SNAKE_CASE`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Accept => "ACCEPT",
            Self::SchemaReject => "SCHEMA_REJECT",
            Self::HashMismatch => "HASH_MISMATCH",
            Self::MissingPrereq => "MISSING_PREREQ",
            Self::TraceViolation => "TRACE_VIOLATION",
            Self::UnauthorizedExecution => "UNAUTHORIZED_EXECUTION",
            Self::RecordTypeForbidden => "RECORD_TYPE_FORBIDDEN",
            Self::ReplayChainNotFound => "REPLAY_CHAIN_NOT_FOUND",
            Self::ReplayPolicyPathMismatch => "REPLAY_POLICY_PATH_MISMATCH",
            Self::ReplayVarianceViolation => "REPLAY_VARIANCE_VIOLATION",
        }
    }

    /// Returns true if a gate rejection with this classification persists a
    /// rejected-attempt artifact.
    ///
    /// Schema-invalid submissions have no canonical bytes, so nothing can
    /// be content-addressed; they are dropped entirely.
    #[must_use]
    pub const fn persists_attempt(self) -> bool {
        matches!(
            self,
            Self::HashMismatch
                | Self::MissingPrereq
                | Self::TraceViolation
                | Self::UnauthorizedExecution
        )
    }

    /// Returns true for the replay-only classifications.
    #[must_use]
    pub const fn is_replay_class(self) -> bool {
        matches!(
            self,
            Self::ReplayChainNotFound
                | Self::ReplayPolicyPathMismatch
                | Self::ReplayVarianceViolation
        )
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_are_screaming_snake() {
        assert_eq!(Classification::SchemaReject.as_str(), "SCHEMA_REJECT");
        assert_eq!(
            Classification::ReplayPolicyPathMismatch.as_str(),
            "REPLAY_POLICY_PATH_MISMATCH"
        );
        let encoded = serde_json::to_string(&Classification::UnauthorizedExecution).unwrap();
        assert_eq!(encoded, "\"UNAUTHORIZED_EXECUTION\"");
    }

    #[test]
    fn test_serde_roundtrip_matches_as_str() {
        for class in [
            Classification::Accept,
            Classification::SchemaReject,
            Classification::HashMismatch,
            Classification::MissingPrereq,
            Classification::TraceViolation,
            Classification::UnauthorizedExecution,
            Classification::RecordTypeForbidden,
            Classification::ReplayChainNotFound,
            Classification::ReplayPolicyPathMismatch,
            Classification::ReplayVarianceViolation,
        ] {
            let encoded = serde_json::to_string(&class).unwrap();
            assert_eq!(encoded, format!("\"{}\"", class.as_str()));
            let decoded: Classification = serde_json::from_str(&encoded).unwrap();
            assert_eq!(decoded, class);
        }
    }

    #[test]
    fn test_persistence_policy() {
        assert!(Classification::HashMismatch.persists_attempt());
        assert!(Classification::MissingPrereq.persists_attempt());
        assert!(Classification::TraceViolation.persists_attempt());
        assert!(Classification::UnauthorizedExecution.persists_attempt());
        assert!(!Classification::Accept.persists_attempt());
        assert!(!Classification::SchemaReject.persists_attempt());
        assert!(!Classification::RecordTypeForbidden.persists_attempt());
    }
}
