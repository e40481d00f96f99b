#![no_main]
//! Fuzz target for the commit gate.
//!
//! Splits arbitrary bytes into a declared kind, a declared hash, and a
//! record payload, then drives a commit. The gate must classify every
//! input without panicking, and schema-level rejections must leave the
//! store untouched.

use libfuzzer_sys::fuzz_target;
use tracegate_core::gate::CommitGate;
use tracegate_core::store::MemoryStore;
use tracegate_core::Classification;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let mut parts = input.splitn(3, '\n');
    let declared_kind = parts.next().unwrap_or_default();
    let declared_hash = parts.next().unwrap_or_default();
    let Ok(record) = serde_json::from_str(parts.next().unwrap_or_default()) else {
        return;
    };

    let gate = CommitGate::new(MemoryStore::new());
    let outcome = gate
        .commit(declared_kind, declared_hash, record)
        .expect("in-memory store never fails");

    // A fresh store holds no prerequisites, so nothing can be accepted
    // except a self-contained auth_context; everything else classifies.
    if outcome.accepted {
        assert_eq!(outcome.classification, Classification::Accept);
        assert_eq!(gate.store().accepted_len(), 1);
    } else if !outcome.classification.persists_attempt() {
        assert!(gate.store().is_empty());
    }
});
