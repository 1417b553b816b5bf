//! Error types for the patch codec.

/// Errors that can occur while encoding, decoding, or applying a patch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatchError {
    /// The serialized patch could not be decoded.
    #[error("malformed patch: {0}")]
    Malformed(String),

    /// The patch was written by an unknown format revision.
    #[error("unsupported patch format {0}")]
    UnsupportedFormat(u32),

    /// The base text has a different length than the one the patch was made from.
    #[error("base length mismatch: patch expects {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// A context or deleted line does not match the base text.
    #[error("context mismatch at line {line}: expected {expected:?}, found {found:?}")]
    ContextMismatch {
        line: usize,
        expected: String,
        found: Option<String>,
    },

    /// The patched text does not hash to the digest recorded in the patch.
    #[error("result digest mismatch: expected {expected}, computed {computed}")]
    DigestMismatch { expected: String, computed: String },

    /// Serialization failure while encoding a patch.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias for patch results.
pub type PatchResult<T> = Result<T, PatchError>;
