//! File encryption/decryption operations
//!
//! This module provides high-level file operations for encrypting, decrypting,
//! updating and inspecting files holding powder envelopes.
//!
//! Encrypted files contain a single base64 blob. Surrounding whitespace
//! (such as the trailing newline an editor adds) is ignored on read.

use crate::codec;
use crate::envelope::FormatVersion;
use crate::error::{ErrorCategory, ErrorKind, PowderError, Result};
use crate::passphrase::PassphraseSource;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Encrypt a file with a passphrase
///
/// Reads UTF-8 plaintext from `input_path`, encrypts it using a passphrase
/// from `passphrase_source`, and writes the blob to `output_path`.
///
/// The output file is created with mode 0o600 (read/write for owner only) on Unix systems.
pub fn encrypt_file(
    input_path: &Path,
    output_path: &Path,
    passphrase_source: &mut dyn PassphraseSource,
    version: FormatVersion,
) -> Result<()> {
    let plaintext = read_text_file(input_path)?;
    let passphrase = passphrase_source.passphrase()?;

    log::debug!(
        "encrypting {} with format {}",
        input_path.display(),
        version
    );
    let blob = codec::encrypt_with_version(&plaintext, &passphrase, version)
        .map_err(|e| e.with_context("encryption failed"))?;
    write_file_secure(output_path, blob.as_bytes())
        .map_err(|e| e.with_context(format!("failed to write to {}", output_path.display())))?;

    Ok(())
}

/// Decrypt a file with a passphrase
///
/// Reads a blob from `input_path`, decrypts it using a passphrase from
/// `passphrase_source`, and writes the plaintext to `output_path`.
///
/// The output file is created with mode 0o600 (read/write for owner only) on Unix systems.
pub fn decrypt_file(
    input_path: &Path,
    output_path: &Path,
    passphrase_source: &mut dyn PassphraseSource,
) -> Result<()> {
    let blob = read_text_file(input_path)?;
    let passphrase = passphrase_source.passphrase()?;

    let plaintext = open_logged(input_path, blob.trim(), &passphrase)?;
    write_file_secure(output_path, plaintext.as_bytes())
        .map_err(|e| e.with_context(format!("failed to write to {}", output_path.display())))?;
    Ok(())
}

/// Update an encrypted file with new plaintext using the same passphrase
///
/// This function:
/// 1. Decrypts the existing file at `crypt_path` to validate the passphrase
/// 2. Reads new plaintext from `plain_path`
/// 3. Encrypts the new plaintext with the validated passphrase, keeping the
///    format version of the existing file
/// 4. Atomically writes to `crypt_path` (tempfile + fsync + rename)
///
/// The atomic write ensures that either the old file or the new file exists,
/// never a partial/corrupted file.
///
/// The passphrase validation prevents accidental passphrase changes.
pub fn update_file(
    plain_path: &Path,
    crypt_path: &Path,
    passphrase_source: &mut dyn PassphraseSource,
) -> Result<()> {
    let existing = read_text_file(crypt_path)?;
    let existing = existing.trim();
    let passphrase = passphrase_source.passphrase()?;

    // Validate passphrase by decrypting existing file (discard plaintext)
    open_logged(crypt_path, existing, &passphrase)?;
    let version = codec::envelope_version(existing).ok_or_else(|| {
        PowderError::with_kind(
            ErrorCategory::Internal,
            ErrorKind::InternalInvariant,
            "envelope opened but its version could not be read back",
        )
    })?;

    let new_plaintext = read_text_file(plain_path)?;
    log::debug!(
        "re-encrypting {} with format {}",
        crypt_path.display(),
        version
    );
    let new_blob = codec::encrypt_with_version(&new_plaintext, &passphrase, version)
        .map_err(|e| e.with_context("failed to encrypt"))?;

    // Great, let's re-write it (atomically).
    let crypt_dir = match crypt_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut temp_file = tempfile::NamedTempFile::new_in(crypt_dir)
        .map_err(|e| io_error(ErrorCategory::Internal, "failed to create tempfile", e))?;

    temp_file
        .write_all(new_blob.as_bytes())
        .map_err(|e| io_error(ErrorCategory::Internal, "failed to write to tempfile", e))?;
    // Flush and fsync() such that the rename later, if it succeeds, will
    // always point to a valid file.
    temp_file
        .flush()
        .map_err(|e| io_error(ErrorCategory::Internal, "failed to flush tempfile", e))?;
    temp_file.as_file().sync_all().map_err(|e| {
        io_error(
            ErrorCategory::Internal,
            "failed to sync file prior to rename",
            e,
        )
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        temp_file
            .as_file()
            .set_permissions(fs::Permissions::from_mode(0o600))
            .map_err(|e| {
                io_error(
                    ErrorCategory::Internal,
                    "failed to set tempfile permissions",
                    e,
                )
            })?;
    }
    temp_file.persist(crypt_path).map_err(|e| {
        io_error(
            ErrorCategory::Internal,
            format!("failed to rename to target file {}", crypt_path.display()),
            e.error,
        )
    })?;
    Ok(())
}

/// Report whether `input_path` holds a powder envelope, and its version.
///
/// Returns `Ok(None)` for files that are not well-formed envelopes. No
/// passphrase is needed, so nothing is authenticated.
pub fn check_file(input_path: &Path) -> Result<Option<FormatVersion>> {
    let contents = fs::read(input_path).map_err(|e| read_error(input_path, e))?;
    let Ok(text) = std::str::from_utf8(&contents) else {
        return Ok(None);
    };
    let blob = text.trim();
    if !codec::is_encrypted(blob) {
        return Ok(None);
    }
    Ok(codec::envelope_version(blob))
}

fn open_logged(path: &Path, blob: &str, passphrase: &str) -> Result<String> {
    codec::open(blob, passphrase).map_err(|e| {
        if e.is_authentication_failure() {
            log::warn!("authentication failed for {}", path.display());
        } else if e.is_malformed() {
            log::debug!("{} is not a usable envelope: {}", path.display(), e);
        }
        e.with_context(format!("failed to decrypt {}", path.display()))
    })
}

fn read_text_file(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| read_error(path, e))?;
    String::from_utf8(bytes).map_err(|e| {
        PowderError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::InvalidUtf8,
            format!("{} is not valid UTF-8", path.display()),
            e,
        )
    })
}

/// Write file with secure permissions (0o600 on Unix)
fn write_file_secure(path: &Path, contents: &[u8]) -> Result<()> {
    #[cfg(unix)]
    {
        use std::fs::OpenOptions;
        use std::os::unix::fs::OpenOptionsExt;

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .map_err(|e| {
                io_error(
                    ErrorCategory::User,
                    format!("failed to open {}", path.display()),
                    e,
                )
            })?;

        file.write_all(contents).map_err(|e| {
            io_error(
                ErrorCategory::Internal,
                format!("failed to write {}", path.display()),
                e,
            )
        })?;
        Ok(())
    }

    #[cfg(not(unix))]
    {
        fs::write(path, contents).map_err(|e| {
            io_error(
                ErrorCategory::User,
                format!("failed to write {}", path.display()),
                e,
            )
        })?;
        Ok(())
    }
}

fn io_error(category: ErrorCategory, msg: impl Into<String>, err: io::Error) -> PowderError {
    PowderError::with_kind_and_source(category, ErrorKind::Io, msg, err)
}

fn read_error(path: &Path, err: io::Error) -> PowderError {
    let category = if err.kind() == io::ErrorKind::NotFound {
        ErrorCategory::User
    } else {
        ErrorCategory::Internal
    };
    io_error(category, format!("failed to read from {}", path.display()), err)
}
