//! Record kinds and envelope field primitives.
//!
//! The ledger accepts a closed set of four envelope record kinds, encoded as
//! the [`RecordKind`] sum type. Replay results are content-addressed records
//! too, but they are not envelopes and never pass through the commit gate,
//! so they have no `RecordKind`.
//!
//! This module also carries the value-constraint primitives shared by the
//! schema validator and the gate: lowercase-hex digests, trace/span
//! identifiers, and the token/resource character classes.

mod fields;

pub(crate) mod access;

pub use fields::{is_hex_sha256, is_resource, is_span_id, is_token, is_trace_id};

use serde::{Deserialize, Serialize};

/// Fixed specification version carried by every envelope for this canon
/// revision. A mismatch fails schema validation.
pub const SPEC_VERSION: &str = "1.0.0";

/// Fixed canonicalization version carried by every envelope for this canon
/// revision. A mismatch fails schema validation.
pub const CANON_VERSION: &str = "1";

/// The closed set of envelope record kinds.
///
/// Cross-reference obligations per kind:
///
/// - [`AuthContext`](RecordKind::AuthContext): chain root, no prerequisite.
/// - [`PolicyDecision`](RecordKind::PolicyDecision): references an accepted
///   `auth_context` by envelope hash.
/// - [`ModelCall`](RecordKind::ModelCall) / [`ToolCall`](RecordKind::ToolCall):
///   reference both an accepted `auth_context` and an accepted
///   `policy_decision`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// Authenticated principal, credentials, grants.
    AuthContext,
    /// Allow/deny with policy identity and reason codes.
    PolicyDecision,
    /// Evidence of a model invocation.
    ModelCall,
    /// Evidence of a tool invocation.
    ToolCall,
}

impl RecordKind {
    /// All envelope record kinds, in chain order.
    pub const ALL: [Self; 4] = [
        Self::AuthContext,
        Self::PolicyDecision,
        Self::ModelCall,
        Self::ToolCall,
    ];

    /// Parses a `record_type` string into a kind.
    ///
    /// Returns `None` for anything outside the closed set.
    #[must_use]
    pub fn parse(record_type: &str) -> Option<Self> {
        match record_type {
            "auth_context" => Some(Self::AuthContext),
            "policy_decision" => Some(Self::PolicyDecision),
            "model_call" => Some(Self::ModelCall),
            "tool_call" => Some(Self::ToolCall),
            _ => None,
        }
    }

    /// Returns the wire-format `record_type` string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AuthContext => "auth_context",
            Self::PolicyDecision => "policy_decision",
            Self::ModelCall => "model_call",
            Self::ToolCall => "tool_call",
        }
    }

    /// Returns the ordering class used by the trace resolver:
    /// `auth_context(0) < policy_decision(1) < model_call/tool_call(2)`.
    #[must_use]
    pub const fn kind_class(self) -> u8 {
        match self {
            Self::AuthContext => 0,
            Self::PolicyDecision => 1,
            Self::ModelCall | Self::ToolCall => 2,
        }
    }

    /// Returns true for the evidence kinds (`model_call`, `tool_call`).
    #[must_use]
    pub const fn is_evidence(self) -> bool {
        matches!(self, Self::ModelCall | Self::ToolCall)
    }

    /// Returns the record field that carries this kind's time key for
    /// trace ordering.
    #[must_use]
    pub const fn time_key_field(self) -> &'static str {
        match self {
            Self::AuthContext | Self::PolicyDecision => "ts_ms",
            Self::ModelCall | Self::ToolCall => "started_at_ms",
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
