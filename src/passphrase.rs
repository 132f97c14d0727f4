//! Where passphrases come from
//!
//! The codec takes the passphrase as `&str`, so every source yields a
//! [`Passphrase`]: UTF-8 text held in a buffer that is wiped on drop.
//! Sources that read raw bytes reject anything that is not UTF-8 as
//! `ErrorKind::InvalidUtf8`.

use std::io::{self, IsTerminal, Read};
use std::ops::Deref;

use zeroize::Zeroizing;

use crate::error::{ErrorCategory, ErrorKind, PowderError, Result};

/// A passphrase, wiped from memory when dropped.
pub struct Passphrase(Zeroizing<String>);

impl Passphrase {
    pub fn new(text: &str) -> Self {
        Passphrase(Zeroizing::new(text.to_owned()))
    }

    /// Interpret raw bytes as a passphrase. The bytes are wiped whether or
    /// not they turn out to be UTF-8.
    pub fn from_bytes(bytes: Zeroizing<Vec<u8>>) -> Result<Self> {
        std::str::from_utf8(&bytes).map(Self::new).map_err(|e| {
            PowderError::with_kind_and_source(
                ErrorCategory::User,
                ErrorKind::InvalidUtf8,
                "passphrase is not valid UTF-8",
                e,
            )
        })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for Passphrase {
    type Target = str;

    fn deref(&self) -> &str {
        self.as_str()
    }
}

/// Something that can be asked for the passphrase of one operation.
pub trait PassphraseSource {
    fn passphrase(&mut self) -> Result<Passphrase>;
}

/// A passphrase known up front, handed out on every request.
pub struct FixedPassphrase(Passphrase);

impl FixedPassphrase {
    pub fn new(text: &str) -> Self {
        FixedPassphrase(Passphrase::new(text))
    }
}

impl PassphraseSource for FixedPassphrase {
    fn passphrase(&mut self) -> Result<Passphrase> {
        Ok(Passphrase::new(&self.0))
    }
}

/// Reads a stream to its end and uses the contents.
///
/// A single trailing line ending (`\n` or `\r\n`) is dropped, so
/// `echo secret | powder --passphrase-stdin ...` uses `secret`.
pub struct StreamPassphrase<R> {
    stream: R,
}

impl<R: Read> StreamPassphrase<R> {
    pub fn new(stream: R) -> Self {
        Self { stream }
    }
}

impl<R: Read> PassphraseSource for StreamPassphrase<R> {
    fn passphrase(&mut self) -> Result<Passphrase> {
        let mut bytes = Zeroizing::new(Vec::new());
        self.stream.read_to_end(&mut bytes).map_err(|e| {
            PowderError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::Io,
                format!("error reading passphrase: {}", e),
                e,
            )
        })?;

        let len = bytes.len();
        if bytes.ends_with(b"\r\n") {
            bytes.truncate(len - 2);
        } else if bytes.ends_with(b"\n") {
            bytes.truncate(len - 1);
        }
        Passphrase::from_bytes(bytes)
    }
}

/// Prompts on the controlling terminal and reads without echo.
pub struct TerminalPrompt {
    prompt: String,
}

impl TerminalPrompt {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

impl Default for TerminalPrompt {
    fn default() -> Self {
        Self::new("Passphrase (powder): ")
    }
}

impl PassphraseSource for TerminalPrompt {
    fn passphrase(&mut self) -> Result<Passphrase> {
        if !io::stdin().is_terminal() {
            return Err(PowderError::with_kind(
                ErrorCategory::User,
                ErrorKind::PassphraseUnavailable,
                "stdin is not a terminal; use --passphrase-stdin to pipe a passphrase",
            ));
        }

        let text = rpassword::prompt_password(&self.prompt).map_err(|e| {
            PowderError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::PassphraseUnavailable,
                format!("failed to read passphrase: {}", e),
                e,
            )
        })?;
        Ok(Passphrase(Zeroizing::new(text)))
    }
}
