//! Content-addressed storage for ledger artifacts.
//!
//! The store is the only shared mutable resource in the core. It holds
//! three namespaces, each keyed by envelope hash:
//!
//! - **accepted**: records that passed every step of the commit gate; the
//!   only artifacts later consumers are allowed to cite as evidence
//! - **rejected-attempts**: schema-valid records that failed a post-schema
//!   step, retained for forensic purposes
//! - **replay-results**: outcome records emitted by the replay engines
//!
//! The store is append-only by construction: no deletion, no update.
//! Writes are compare-and-insert - storing content that already exists
//! under its hash is an idempotent no-op, and storing *different* content
//! under an existing hash is a [`StoreError::Collision`] (impossible for a
//! working SHA-256, checked anyway so a corrupted backend cannot silently
//! rewrite history). Content-addressing makes a hash determine its content
//! across all three namespaces; the same envelope may legitimately appear
//! as both an accepted artifact and an earlier rejected attempt.

mod memory;

pub use memory::MemoryStore;

use serde_json::Value;
use thiserror::Error;

use crate::canon::EnvelopeHash;
use crate::outcome::Classification;
use crate::record::RecordKind;

/// Errors that can occur during store operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreError {
    /// Different content was presented under an existing hash.
    #[error("content collision: hash {hash} already maps to different content")]
    Collision {
        /// The colliding hash (hex-encoded).
        hash: String,
    },

    /// Storage backend failure.
    #[error("storage error: {message}")]
    Backend {
        /// Description of the error.
        message: String,
    },
}

/// An envelope that passed every step of the commit gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedArtifact {
    /// The artifact identifier: SHA-256 of the canonical bytes.
    pub envelope_hash: EnvelopeHash,
    /// The record kind.
    pub kind: RecordKind,
    /// The record value as accepted.
    pub record: Value,
    /// The canonical bytes the hash was computed over.
    pub canonical_bytes: Vec<u8>,
}

/// A schema-valid envelope that failed at a post-schema gate step.
///
/// Rejected attempts are evidence of equal durability to accepted records;
/// the absence of a rejection is also information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedAttempt {
    /// The computed envelope hash of the attempted record.
    pub envelope_hash: EnvelopeHash,
    /// The record kind.
    pub kind: RecordKind,
    /// The record value as submitted.
    pub record: Value,
    /// The canonical bytes the hash was computed over.
    pub canonical_bytes: Vec<u8>,
    /// The failure classification.
    pub classification: Classification,
    /// The stable error-kind string.
    pub error_kind: String,
}

/// A content-addressed replay result record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayResultArtifact {
    /// The result's artifact identifier.
    pub result_hash: EnvelopeHash,
    /// The replay result record.
    pub record: Value,
    /// The canonical bytes the hash was computed over.
    pub canonical_bytes: Vec<u8>,
}

/// Trait for ledger storage backends.
///
/// Implementations must keep all three namespaces append-only, admit
/// concurrent readers, and serialize concurrent writers against the same
/// hash. An in-memory map suffices for tests and for production uses where
/// durability is provided by an external ledger.
pub trait ArtifactStore: Send + Sync {
    /// Looks up an accepted artifact by envelope hash.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] on backend failure.
    fn get_accepted(&self, hash: &EnvelopeHash) -> Result<Option<AcceptedArtifact>, StoreError>;

    /// Inserts an accepted artifact, keyed by its envelope hash.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Collision`] if the hash already maps to
    /// different canonical bytes in any namespace.
    fn put_accepted(&self, artifact: AcceptedArtifact) -> Result<(), StoreError>;

    /// Looks up a rejected attempt by envelope hash.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] on backend failure.
    fn get_rejected(&self, hash: &EnvelopeHash) -> Result<Option<RejectedAttempt>, StoreError>;

    /// Inserts a rejected attempt, keyed by its computed envelope hash.
    ///
    /// Idempotent: a second attempt with the same hash keeps the first
    /// attempt record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Collision`] if the hash already maps to
    /// different canonical bytes in any namespace.
    fn put_rejected(&self, attempt: RejectedAttempt) -> Result<(), StoreError>;

    /// Looks up a replay result by its artifact hash.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] on backend failure.
    fn get_replay_result(
        &self,
        hash: &EnvelopeHash,
    ) -> Result<Option<ReplayResultArtifact>, StoreError>;

    /// Inserts a replay result, keyed by its artifact hash.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Collision`] if the hash already maps to
    /// different canonical bytes in any namespace.
    fn put_replay_result(&self, artifact: ReplayResultArtifact) -> Result<(), StoreError>;

    /// Returns a snapshot of the accepted namespace in hash order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] on backend failure.
    fn accepted_snapshot(&self) -> Result<Vec<AcceptedArtifact>, StoreError>;

    /// Returns a snapshot of the rejected-attempt namespace in hash order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] on backend failure.
    fn rejected_snapshot(&self) -> Result<Vec<RejectedAttempt>, StoreError>;
}
