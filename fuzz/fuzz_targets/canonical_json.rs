#![no_main]
//! Fuzz target for the canonical JSON codec.
//!
//! Feeds arbitrary bytes through the duplicate-detecting parse entry and,
//! when parsing succeeds, through canonicalization and hashing. The goal
//! is to verify that no crafted input can cause a panic, unbounded
//! recursion, or a canonical form that is not a fixpoint.

use libfuzzer_sys::fuzz_target;
use tracegate_core::canon::{canonicalize, envelope_hash, parse_canonical_input};

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    // Phase 1: parsing with duplicate-key detection must never panic.
    let Ok(value) = parse_canonical_input(input) else {
        return; // Expected for most fuzz inputs.
    };

    // Phase 2: canonicalization must never panic, and when it succeeds the
    // output must be a fixpoint with a stable hash.
    let Ok(canonical) = canonicalize(&value) else {
        return;
    };
    let reparsed = parse_canonical_input(
        std::str::from_utf8(&canonical).expect("canonical bytes are UTF-8"),
    )
    .expect("canonical bytes reparse");
    let second = canonicalize(&reparsed).expect("canonical form recanonicalizes");
    assert_eq!(canonical, second, "canonical form must be a fixpoint");

    // Phase 3: hashing is a pure function of the canonical bytes.
    let first_hash = envelope_hash(&value).expect("hash succeeds after canonicalize");
    let second_hash = envelope_hash(&reparsed).expect("hash succeeds after reparse");
    assert_eq!(first_hash, second_hash);
});
