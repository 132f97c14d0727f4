//! powder - passphrase-protected text envelopes
//!
//! A blob is the standard base64 of a small binary envelope holding a
//! format version, a PBKDF2 salt, an AES-GCM nonce and the AES-256-GCM
//! ciphertext of a UTF-8 string. See [`envelope`] for the exact layout.

#![forbid(unsafe_code)]

pub mod armor;
pub mod codec;
pub mod envelope;
pub mod error;
pub mod file_ops;
pub mod passphrase;
pub mod secretcrypt;

pub use codec::{decrypt, encrypt, encrypt_with_version, envelope_version, is_encrypted, open};
pub use envelope::FormatVersion;
pub use error::{ErrorCategory, ErrorKind, PowderError, Result};
