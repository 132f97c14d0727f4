//! Text armoring for envelopes
//!
//! Envelopes travel as standard RFC 4648 base64 with `=` padding. The
//! version lives inside the binary envelope, not in the armor, so a blob
//! is nothing more than the base64 of the envelope bytes.

use crate::error::{ErrorCategory, ErrorKind, PowderError, Result};
use base64::{Engine, engine::general_purpose::STANDARD};

/// Armor envelope bytes as a base64 string.
pub fn encode(body: &[u8]) -> String {
    STANDARD.encode(body)
}

/// Decode an armored blob back into envelope bytes.
pub fn decode(armored: &str) -> Result<Vec<u8>> {
    STANDARD.decode(armored).map_err(|e| {
        PowderError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::ArmoringDecode,
            format!("base64 decoding failed: {}", e),
            e,
        )
    })
}
