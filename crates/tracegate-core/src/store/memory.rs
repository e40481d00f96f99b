//! In-memory artifact store.
//!
//! Backs the three content-addressed namespaces with `BTreeMap`s behind
//! `RwLock`s, so readers run concurrently, writers against the same hash
//! serialize, and snapshot enumeration is deterministic (hash order).
//! Clones share the underlying storage.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use super::{
    AcceptedArtifact, ArtifactStore, RejectedAttempt, ReplayResultArtifact, StoreError,
};
use crate::canon::EnvelopeHash;

/// In-memory content-addressed store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    accepted: Arc<RwLock<BTreeMap<EnvelopeHash, AcceptedArtifact>>>,
    rejected: Arc<RwLock<BTreeMap<EnvelopeHash, RejectedAttempt>>>,
    replay_results: Arc<RwLock<BTreeMap<EnvelopeHash, ReplayResultArtifact>>>,
}

impl MemoryStore {
    /// Creates a new, empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of accepted artifacts.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned (indicates a thread panic).
    #[must_use]
    pub fn accepted_len(&self) -> usize {
        self.accepted.read().expect("lock poisoned").len()
    }

    /// Returns the number of rejected attempts.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned (indicates a thread panic).
    #[must_use]
    pub fn rejected_len(&self) -> usize {
        self.rejected.read().expect("lock poisoned").len()
    }

    /// Returns the number of replay results.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned (indicates a thread panic).
    #[must_use]
    pub fn replay_results_len(&self) -> usize {
        self.replay_results.read().expect("lock poisoned").len()
    }

    /// Returns true if all three namespaces are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accepted_len() == 0 && self.rejected_len() == 0 && self.replay_results_len() == 0
    }

    /// Checks the cross-namespace content-addressing invariant for `hash`:
    /// any existing entry under the hash must carry the same canonical
    /// bytes.
    fn check_content(&self, hash: &EnvelopeHash, bytes: &[u8]) -> Result<(), StoreError> {
        let existing_bytes: Option<Vec<u8>> = {
            let accepted = self.accepted.read().expect("lock poisoned");
            accepted.get(hash).map(|a| a.canonical_bytes.clone())
        }
        .or_else(|| {
            let rejected = self.rejected.read().expect("lock poisoned");
            rejected.get(hash).map(|a| a.canonical_bytes.clone())
        })
        .or_else(|| {
            let results = self.replay_results.read().expect("lock poisoned");
            results.get(hash).map(|a| a.canonical_bytes.clone())
        });

        match existing_bytes {
            Some(existing) if existing != bytes => Err(StoreError::Collision {
                hash: hash.to_hex(),
            }),
            _ => Ok(()),
        }
    }
}

impl Clone for MemoryStore {
    fn clone(&self) -> Self {
        Self {
            accepted: Arc::clone(&self.accepted),
            rejected: Arc::clone(&self.rejected),
            replay_results: Arc::clone(&self.replay_results),
        }
    }
}

impl ArtifactStore for MemoryStore {
    fn get_accepted(&self, hash: &EnvelopeHash) -> Result<Option<AcceptedArtifact>, StoreError> {
        Ok(self
            .accepted
            .read()
            .expect("lock poisoned")
            .get(hash)
            .cloned())
    }

    fn put_accepted(&self, artifact: AcceptedArtifact) -> Result<(), StoreError> {
        self.check_content(&artifact.envelope_hash, &artifact.canonical_bytes)?;
        self.accepted
            .write()
            .expect("lock poisoned")
            .entry(artifact.envelope_hash)
            .or_insert(artifact);
        Ok(())
    }

    fn get_rejected(&self, hash: &EnvelopeHash) -> Result<Option<RejectedAttempt>, StoreError> {
        Ok(self
            .rejected
            .read()
            .expect("lock poisoned")
            .get(hash)
            .cloned())
    }

    fn put_rejected(&self, attempt: RejectedAttempt) -> Result<(), StoreError> {
        self.check_content(&attempt.envelope_hash, &attempt.canonical_bytes)?;
        self.rejected
            .write()
            .expect("lock poisoned")
            .entry(attempt.envelope_hash)
            .or_insert(attempt);
        Ok(())
    }

    fn get_replay_result(
        &self,
        hash: &EnvelopeHash,
    ) -> Result<Option<ReplayResultArtifact>, StoreError> {
        Ok(self
            .replay_results
            .read()
            .expect("lock poisoned")
            .get(hash)
            .cloned())
    }

    fn put_replay_result(&self, artifact: ReplayResultArtifact) -> Result<(), StoreError> {
        self.check_content(&artifact.result_hash, &artifact.canonical_bytes)?;
        self.replay_results
            .write()
            .expect("lock poisoned")
            .entry(artifact.result_hash)
            .or_insert(artifact);
        Ok(())
    }

    fn accepted_snapshot(&self) -> Result<Vec<AcceptedArtifact>, StoreError> {
        Ok(self
            .accepted
            .read()
            .expect("lock poisoned")
            .values()
            .cloned()
            .collect())
    }

    fn rejected_snapshot(&self) -> Result<Vec<RejectedAttempt>, StoreError> {
        Ok(self
            .rejected
            .read()
            .expect("lock poisoned")
            .values()
            .cloned()
            .collect())
    }
}
