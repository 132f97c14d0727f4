//! Encryption/decryption using PBKDF2-HMAC-SHA256 + AES-256-GCM
//!
//! This module implements passphrase-based encryption using:
//! - PBKDF2-HMAC-SHA256 for key derivation from passphrase, with the round
//!   count selected by the envelope's format version
//! - AES-256-GCM for authenticated encryption
//!
//! Output is a complete binary envelope (see [`crate::envelope`]).

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::envelope::{Envelope, FormatVersion, NONCE_LEN, SALT_LEN};
use crate::error::{ErrorCategory, ErrorKind, PowderError, Result};

/// Length of derived key in bytes
pub const KEY_LEN: usize = 32;

/// Derive a 32-byte key from a passphrase and salt using PBKDF2-HMAC-SHA256
pub fn derive_key(
    passphrase: &[u8],
    salt: &[u8; SALT_LEN],
    version: FormatVersion,
) -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2::pbkdf2_hmac::<Sha256>(passphrase, salt, version.pbkdf2_rounds(), &mut key[..]);
    key
}

fn cipher(key: &[u8; KEY_LEN]) -> Aes256Gcm {
    Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key))
}

/// Encrypt plaintext with a passphrase using random salt and nonce
///
/// Returns the binary envelope: head(1) + version(1) + salt(12) + nonce(12) + sealed(variable)
pub fn seal(passphrase: &[u8], plaintext: &[u8], version: FormatVersion) -> Result<Vec<u8>> {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);

    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);

    seal_deterministic(passphrase, plaintext, version, &salt, &nonce)
}

/// Encrypt plaintext with a passphrase using provided salt and nonce
///
/// This function is ONLY for testing purposes to generate deterministic output.
/// NEVER use this in production - always use `seal()` which generates random salt/nonce.
pub fn seal_deterministic(
    passphrase: &[u8],
    plaintext: &[u8],
    version: FormatVersion,
    salt: &[u8; SALT_LEN],
    nonce: &[u8; NONCE_LEN],
) -> Result<Vec<u8>> {
    let key = derive_key(passphrase, salt, version);

    let sealed = cipher(&key)
        .encrypt(Nonce::from_slice(nonce), plaintext)
        .map_err(|e| {
            PowderError::with_kind(
                ErrorCategory::Internal,
                ErrorKind::CipherFailure,
                format!("encryption failed: {}", e),
            )
        })?;

    let envelope = Envelope {
        version,
        salt: *salt,
        nonce: *nonce,
        sealed: &sealed,
    };
    Ok(envelope.to_bytes())
}

/// Decrypt a binary envelope with a passphrase
///
/// The returned plaintext is the raw authenticated payload; NUL handling
/// and UTF-8 decoding are left to the caller.
pub fn open(passphrase: &[u8], envelope_bytes: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    let envelope = Envelope::parse(envelope_bytes)?;

    let key = derive_key(passphrase, &envelope.salt, envelope.version);
    let plaintext = cipher(&key)
        .decrypt(Nonce::from_slice(&envelope.nonce), envelope.sealed)
        .map_err(|_| {
            PowderError::with_kind(
                ErrorCategory::User,
                ErrorKind::AuthenticationFailed,
                "corrupt input, tampered-with data, or bad passphrase",
            )
        })?;

    Ok(Zeroizing::new(plaintext))
}
