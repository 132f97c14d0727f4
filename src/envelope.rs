//! Binary envelope layout
//!
//! Every envelope has the same fixed-offset layout regardless of version:
//!
//! | Offset | Size | Field                                  |
//! |--------|------|----------------------------------------|
//! | 0      | 1    | head byte (`HEAD`)                     |
//! | 1      | 1    | format version                         |
//! | 2      | 12   | PBKDF2 salt                            |
//! | 14     | 12   | AES-GCM nonce                          |
//! | 26     | N+16 | AES-256-GCM ciphertext and tag         |
//!
//! The version only selects the PBKDF2 round count.

use crate::error::{ErrorCategory, ErrorKind, PowderError, Result};

/// Head byte identifying a powder envelope.
pub const HEAD: u8 = 0x00;

/// Length of the PBKDF2 salt in bytes
pub const SALT_LEN: usize = 12;

/// Length of the AES-GCM nonce in bytes
pub const NONCE_LEN: usize = 12;

/// Length of the AES-GCM authentication tag in bytes
pub const TAG_LEN: usize = 16;

const VERSION_OFFSET: usize = 1;
const SALT_OFFSET: usize = 2;
const NONCE_OFFSET: usize = SALT_OFFSET + SALT_LEN;

/// Everything before the sealed payload.
pub const HEADER_LEN: usize = NONCE_OFFSET + NONCE_LEN;

/// Header plus the tag of an empty plaintext.
pub const MIN_ENVELOPE_LEN: usize = HEADER_LEN + TAG_LEN;

/// Envelope format versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum FormatVersion {
    /// PBKDF2 with 100 rounds. The original format, as written by the
    /// editor extension.
    V1,
    /// PBKDF2 with 600,000 rounds.
    V2,
}

impl FormatVersion {
    /// Version used for all new encryptions.
    pub const CURRENT: FormatVersion = FormatVersion::V2;

    /// The version byte written at offset 1.
    pub const fn byte(self) -> u8 {
        match self {
            FormatVersion::V1 => 1,
            FormatVersion::V2 => 2,
        }
    }

    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(FormatVersion::V1),
            2 => Some(FormatVersion::V2),
            _ => None,
        }
    }

    /// PBKDF2-HMAC-SHA256 iteration count for this version.
    pub const fn pbkdf2_rounds(self) -> u32 {
        match self {
            FormatVersion::V1 => 100,
            FormatVersion::V2 => 600_000,
        }
    }
}

impl std::fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.byte())
    }
}

/// A parsed envelope borrowing its sealed payload from the decoded blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope<'a> {
    pub version: FormatVersion,
    pub salt: [u8; SALT_LEN],
    pub nonce: [u8; NONCE_LEN],
    /// Ciphertext followed by the 16-byte tag.
    pub sealed: &'a [u8],
}

impl<'a> Envelope<'a> {
    /// Parse raw envelope bytes.
    ///
    /// Only the framing is validated here; whether the sealed payload
    /// authenticates is up to [`crate::secretcrypt::open`].
    pub fn parse(bytes: &'a [u8]) -> Result<Self> {
        match bytes.first() {
            None => {
                return Err(PowderError::with_kind(
                    ErrorCategory::User,
                    ErrorKind::TruncatedInput,
                    "input is empty",
                ));
            }
            Some(&head) if head != HEAD => {
                return Err(PowderError::with_kind(
                    ErrorCategory::User,
                    ErrorKind::NotEnvelope,
                    "input unrecognized as powder data",
                ));
            }
            Some(_) => {}
        }

        if bytes.len() < MIN_ENVELOPE_LEN {
            return Err(PowderError::with_kind(
                ErrorCategory::User,
                ErrorKind::TruncatedInput,
                format!(
                    "input likely truncated: {} bytes, envelope needs at least {}",
                    bytes.len(),
                    MIN_ENVELOPE_LEN
                ),
            ));
        }

        let version_byte = bytes[VERSION_OFFSET];
        let version = FormatVersion::from_byte(version_byte).ok_or_else(|| {
            PowderError::with_kind(
                ErrorCategory::User,
                ErrorKind::UnsupportedVersion,
                format!(
                    "input claims to be powder data, but version {} is not one we support",
                    version_byte
                ),
            )
        })?;

        let mut salt = [0u8; SALT_LEN];
        salt.copy_from_slice(&bytes[SALT_OFFSET..NONCE_OFFSET]);
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&bytes[NONCE_OFFSET..HEADER_LEN]);

        Ok(Self {
            version,
            salt,
            nonce,
            sealed: &bytes[HEADER_LEN..],
        })
    }

    /// Serialize into a buffer of exactly `HEADER_LEN + sealed.len()` bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![0u8; HEADER_LEN + self.sealed.len()];
        out[0] = HEAD;
        out[VERSION_OFFSET] = self.version.byte();
        out[SALT_OFFSET..NONCE_OFFSET].copy_from_slice(&self.salt);
        out[NONCE_OFFSET..HEADER_LEN].copy_from_slice(&self.nonce);
        out[HEADER_LEN..].copy_from_slice(self.sealed);
        out
    }
}
