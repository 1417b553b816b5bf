//! Error types for version history operations.

use verso_patch::PatchError;
use verso_store::StoreError;
use verso_types::{DocumentId, TypeError, VersionNumber};

/// Errors produced while saving or reconstructing versions.
///
/// Reconstruction errors are fatal to the request that hit them; no partial
/// content is ever returned alongside one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HistoryError {
    /// A save was attempted with empty content. Nothing was written.
    #[error("cannot save empty content for document {document}")]
    EmptyContent { document: DocumentId },

    /// No baseline exists at or before the requested version.
    #[error("no baseline at or before version {version} of document {document}")]
    MissingBaseline {
        document: DocumentId,
        version: VersionNumber,
    },

    /// A version between the baseline and the target is absent.
    #[error("version chain of document {document} is broken: version {missing} is missing")]
    ChainBroken {
        document: DocumentId,
        missing: VersionNumber,
    },

    /// A stored patch does not apply to the reconstructed predecessor.
    #[error("patch of version {version} of document {document} does not apply: {source}")]
    PatchApply {
        document: DocumentId,
        version: VersionNumber,
        #[source]
        source: PatchError,
    },

    /// The version does not exist or has been soft-deleted.
    #[error("version {version} of document {document} not found")]
    VersionNotFound {
        document: DocumentId,
        version: VersionNumber,
    },

    /// The document has run out of version numbers.
    #[error("type error: {0}")]
    Type(#[from] TypeError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Convenience alias for history results.
pub type HistoryResult<T> = Result<T, HistoryError>;

/// Errors produced while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
