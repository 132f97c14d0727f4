//! String-level envelope codec
//!
//! This is the surface an embedding application calls: it works with
//! plaintext and passphrase strings and base64 blobs, and never logs.
//!
//! [`decrypt`] folds every recoverable failure (not base64, not an
//! envelope, truncated, unknown version, wrong passphrase, tampering) into
//! `Ok(None)`. [`open`] runs the same steps but reports which one failed.
//!
//! An authenticated payload always yields text: it is cut at its first NUL
//! byte and invalid UTF-8 sequences become U+FFFD.

use crate::armor;
use crate::envelope::{Envelope, FormatVersion, HEAD};
use crate::error::Result;
use crate::secretcrypt;

/// Cheap format sniff: does `blob` decode to bytes starting with the head byte?
///
/// Never fails. Only the head byte is checked, so a `true` here does not
/// mean [`decrypt`] will succeed.
pub fn is_encrypted(blob: &str) -> bool {
    match armor::decode(blob) {
        Ok(bytes) => bytes.first() == Some(&HEAD),
        Err(_) => false,
    }
}

/// Encrypt `plaintext` under `passphrase` using the current format version.
///
/// Every call draws a fresh salt and nonce, so encrypting the same input
/// twice yields different blobs.
pub fn encrypt(plaintext: &str, passphrase: &str) -> Result<String> {
    encrypt_with_version(plaintext, passphrase, FormatVersion::CURRENT)
}

/// Encrypt with an explicit format version.
///
/// Use [`FormatVersion::V1`] only when the blob must be readable by
/// consumers that predate version 2.
pub fn encrypt_with_version(
    plaintext: &str,
    passphrase: &str,
    version: FormatVersion,
) -> Result<String> {
    let envelope = secretcrypt::seal(passphrase.as_bytes(), plaintext.as_bytes(), version)?;
    Ok(armor::encode(&envelope))
}

/// Decrypt `blob`, returning `Ok(None)` for any malformed input or
/// authentication failure.
///
/// Only internal failures of the cryptographic primitives surface as `Err`.
pub fn decrypt(blob: &str, passphrase: &str) -> Result<Option<String>> {
    match open(blob, passphrase) {
        Ok(plaintext) => Ok(Some(plaintext)),
        Err(e) if e.is_recoverable() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Decrypt `blob`, reporting why it failed.
///
/// The payload is cut at its first NUL byte, then decoded lossily.
pub fn open(blob: &str, passphrase: &str) -> Result<String> {
    let bytes = armor::decode(blob)?;
    let mut payload = secretcrypt::open(passphrase.as_bytes(), &bytes)?;

    if let Some(nul) = payload.iter().position(|&b| b == 0) {
        payload.truncate(nul);
    }

    Ok(String::from_utf8_lossy(&payload).into_owned())
}

/// Format version of `blob`, or `None` if it is not a well-formed envelope.
pub fn envelope_version(blob: &str) -> Option<FormatVersion> {
    let bytes = armor::decode(blob).ok()?;
    Envelope::parse(&bytes).ok().map(|envelope| envelope.version)
}
