use std::error::Error as StdError;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorCategory {
    /// Any failure that cannot be confidently attributed to any other error
    /// category in this enum.
    ///
    /// Internal errors come from the environment or the cryptographic
    /// primitives themselves and are not expected to be recoverable by
    /// the caller.
    Internal,

    /// The caller provided input that is not an envelope, is damaged, or
    /// does not open under the given passphrase.
    User,
}

/// Fine-grained condition flags for consumers that want to branch on error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Base64 decoding of the blob failed.
    ArmoringDecode,
    /// The decoded blob does not start with the envelope head byte.
    NotEnvelope,
    /// The decoded blob is shorter than the smallest possible envelope.
    TruncatedInput,
    /// The head byte matched but the version byte is not one we know.
    UnsupportedVersion,
    /// Authentication failed due to an incorrect passphrase or tampering
    /// or corruption.
    AuthenticationFailed,
    /// Text (plaintext or passphrase) was required to be UTF-8 and was not.
    InvalidUtf8,
    /// AES-256-GCM failed to seal data.
    CipherFailure,
    /// Passphrase could not be obtained from the configured reader.
    PassphraseUnavailable,
    /// Unexpected state reached within powder logic.
    InternalInvariant,
    /// Interaction with the filesystem, stdin/stdout, or other I/O failed.
    Io,
}

#[derive(Debug, Error)]
#[error("{msg}")]
pub struct PowderError {
    /// Broad error category, always provided.
    pub category: ErrorCategory,
    /// Optional specific condition tag for consumers that need to
    /// branch their behavior. Any code consuming errors MUST handle
    /// the absence of a defined kind.
    pub kind: Option<ErrorKind>,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    msg: String,
}

impl PowderError {
    /// Creates a new error that also tags the failure with a kind.
    pub fn with_kind(category: ErrorCategory, kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            category,
            kind: Some(kind),
            source: None,
            msg: msg.into(),
        }
    }

    /// Creates a new error that carries both a kind tag and the originating source error.
    pub fn with_kind_and_source(
        category: ErrorCategory,
        kind: ErrorKind,
        msg: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            category,
            kind: Some(kind),
            source: Some(Box::new(source)),
            msg: msg.into(),
        }
    }

    /// Wraps the current error with a higher-level message while preserving the original as source.
    pub fn with_context(self, msg: impl Into<String>) -> Self {
        let category = self.category;
        let kind = self.kind;
        Self {
            category,
            kind,
            source: Some(Box::new(self)),
            msg: msg.into(),
        }
    }

    /// True when the input was not a well-formed envelope at all.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self.kind,
            Some(
                ErrorKind::ArmoringDecode
                    | ErrorKind::NotEnvelope
                    | ErrorKind::TruncatedInput
                    | ErrorKind::UnsupportedVersion
            )
        )
    }

    /// True when the envelope parsed but did not open under the passphrase.
    pub fn is_authentication_failure(&self) -> bool {
        self.kind == Some(ErrorKind::AuthenticationFailed)
    }

    /// True for failures the caller is expected to handle as ordinary
    /// outcomes rather than hard errors.
    pub fn is_recoverable(&self) -> bool {
        self.category == ErrorCategory::User
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, PowderError>;
