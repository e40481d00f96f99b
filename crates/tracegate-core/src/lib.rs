//! # tracegate-core
//!
//! Core library for tracegate - a tamper-evident, content-addressed evidence
//! ledger for governance decisions about AI-assisted actions.
//!
//! Every action that matters - who was authenticated, what policy decided,
//! which model or tool executed - becomes an immutable record keyed by the
//! SHA-256 hash of its canonical JSON form. A single write aperture (the
//! [commit gate](gate)) validates every record against a closed-world
//! contract before persisting it; the [replay engines](replay) later verify,
//! without executing anything, that a stored trace still satisfies the same
//! invariants it did when first accepted.
//!
//! ## Subsystems
//!
//! - **Canonicalization and hashing** ([`canon`]): deterministic RFC 8785
//!   serialization with an integer-only numeric profile; SHA-256 over the
//!   canonical bytes is the artifact identifier.
//! - **Schema validation** ([`schema`]): closed-world structural validation
//!   for the four envelope record kinds.
//! - **The commit gate** ([`gate`]): a fixed-sequence validator that accepts
//!   or rejects records, persisting accepted artifacts and rejected-attempt
//!   artifacts as evidence.
//! - **Trace resolution** ([`trace`]): a deterministic per-trace view over
//!   the store.
//! - **Replay** ([`replay`]): forensic, invariant, and constrained verifiers
//!   that operate strictly over persisted artifacts and emit their own
//!   content-addressed result records.
//!
//! ## Example
//!
//! ```rust
//! use serde_json::json;
//! use tracegate_core::canon::envelope_hash;
//! use tracegate_core::gate::CommitGate;
//! use tracegate_core::store::MemoryStore;
//!
//! let record = json!({
//!     "spec_version": "1.0.0",
//!     "canon_version": "1",
//!     "record_type": "auth_context",
//!     "trace": {
//!         "trace_id": "4bf92f3577b34da6a3ce929d0e0e4736",
//!         "span_id": "00f067aa0ba902b7",
//!         "span_kind": "server"
//!     },
//!     "producer": { "layer": "ingress", "component": "gateway" },
//!     "ts_ms": 1_769_817_600_000_u64,
//!     "actor": { "actor_kind": "user", "actor_id": "alice" },
//!     "credential": {
//!         "credential_kind": "oidc",
//!         "issuer": "https:idp.example",
//!         "presented_hash_sha256": "a".repeat(64),
//!         "verified_at_ms": 1_769_817_599_000_u64,
//!         "expires_at_ms": 1_769_821_200_000_u64
//!     },
//!     "grants": { "models:invoke": true }
//! });
//!
//! let declared = envelope_hash(&record).unwrap().to_hex();
//! let gate = CommitGate::new(MemoryStore::new());
//! let outcome = gate.commit("auth_context", &declared, record).unwrap();
//! assert!(outcome.accepted);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

#[cfg(test)]
pub(crate) mod fixtures;

pub mod canon;
pub mod gate;
pub mod outcome;
pub mod record;
pub mod replay;
pub mod schema;
pub mod store;
pub mod time;
pub mod trace;

pub use canon::{canonicalize, envelope_hash, CodecError, EnvelopeHash};
pub use gate::{CommitGate, CommitOutcome};
pub use outcome::Classification;
pub use record::RecordKind;
pub use schema::{validate, SchemaError};
pub use store::{ArtifactStore, MemoryStore};
