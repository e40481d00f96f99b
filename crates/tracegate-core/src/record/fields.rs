//! Character-class validators for envelope field constraints.
//!
//! The wire contract pins every identifier-like field to a small character
//! class. These checks are hand-written over bytes so the accepted languages
//! are exactly the documented ones.

/// Returns true if `s` is a 64-character lowercase hex SHA-256 digest.
#[must_use]
pub fn is_hex_sha256(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(is_lower_hex_byte)
}

/// Returns true if `s` is a valid trace identifier: 32 lowercase hex
/// characters, not all zeros.
#[must_use]
pub fn is_trace_id(s: &str) -> bool {
    s.len() == 32 && s.bytes().all(is_lower_hex_byte) && !s.bytes().all(|b| b == b'0')
}

/// Returns true if `s` is a valid span identifier: 16 lowercase hex
/// characters, not all zeros.
#[must_use]
pub fn is_span_id(s: &str) -> bool {
    s.len() == 16 && s.bytes().all(is_lower_hex_byte) && !s.bytes().all(|b| b == b'0')
}

/// Returns true if `s` matches the token class
/// `[a-z0-9][a-z0-9_\-:.]{0,127}`.
#[must_use]
pub fn is_token(s: &str) -> bool {
    let bytes = s.as_bytes();
    match bytes.split_first() {
        Some((first, rest)) => {
            bytes.len() <= 128
                && is_token_head_byte(*first)
                && rest.iter().all(|b| is_token_tail_byte(*b))
        },
        None => false,
    }
}

/// Returns true if `s` matches the resource class
/// `[a-z0-9][a-z0-9_\-:./]{0,255}`.
#[must_use]
pub fn is_resource(s: &str) -> bool {
    let bytes = s.as_bytes();
    match bytes.split_first() {
        Some((first, rest)) => {
            bytes.len() <= 256
                && is_token_head_byte(*first)
                && rest.iter().all(|b| is_token_tail_byte(*b) || *b == b'/')
        },
        None => false,
    }
}

const fn is_lower_hex_byte(b: u8) -> bool {
    matches!(b, b'0'..=b'9' | b'a'..=b'f')
}

const fn is_token_head_byte(b: u8) -> bool {
    matches!(b, b'a'..=b'z' | b'0'..=b'9')
}

const fn is_token_tail_byte(b: u8) -> bool {
    matches!(b, b'a'..=b'z' | b'0'..=b'9' | b'_' | b'-' | b':' | b'.')
}
