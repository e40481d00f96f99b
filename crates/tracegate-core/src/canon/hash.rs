//! Envelope hash: the SHA-256 artifact identifier.
//!
//! An artifact's identity is the SHA-256 digest of the canonical UTF-8 bytes
//! of its canonical JSON serialization. Identity is intrinsic to content;
//! two byte-identical records have identical identity. When compared as
//! identity, digests are encoded as 64 lowercase hex characters.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Length of an envelope hash in bytes.
pub const HASH_LEN: usize = 32;

/// Error returned when parsing a textual envelope hash.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid envelope hash: expected 64 lowercase hex characters, got {got:?}")]
pub struct ParseHashError {
    /// The rejected input, truncated for display.
    pub got: String,
}

/// A content-addressed artifact identifier: SHA-256 over canonical bytes.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EnvelopeHash([u8; HASH_LEN]);

impl EnvelopeHash {
    /// Computes the hash of the given canonical bytes.
    #[must_use]
    pub fn of(canonical_bytes: &[u8]) -> Self {
        let digest = Sha256::digest(canonical_bytes);
        Self(digest.into())
    }

    /// Wraps a raw 32-byte digest.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; HASH_LEN]) -> Self {
        Self(bytes)
    }

    /// Returns the raw digest bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }

    /// Returns the canonical textual form: 64 lowercase hex characters.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parses the canonical textual form.
    ///
    /// Uppercase hex is rejected: the identity contract is lowercase only.
    ///
    /// # Errors
    ///
    /// Returns [`ParseHashError`] if `s` is not exactly 64 lowercase hex
    /// characters.
    pub fn from_hex(s: &str) -> Result<Self, ParseHashError> {
        if s.len() != HASH_LEN * 2 || !s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return Err(ParseHashError {
                got: s.chars().take(80).collect(),
            });
        }
        let raw = hex::decode(s).map_err(|_| ParseHashError {
            got: s.chars().take(80).collect(),
        })?;
        let mut bytes = [0u8; HASH_LEN];
        bytes.copy_from_slice(&raw);
        Ok(Self(bytes))
    }
}

impl fmt::Display for EnvelopeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for EnvelopeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EnvelopeHash({})", self.to_hex())
    }
}

impl FromStr for EnvelopeHash {
    type Err = ParseHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for EnvelopeHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for EnvelopeHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(D::Error::custom)
    }
}
