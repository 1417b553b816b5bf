use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid document id: {0}")]
    InvalidDocumentId(String),

    #[error("invalid version number: {0}")]
    InvalidVersionNumber(String),

    #[error("version numbers start at 1")]
    ZeroVersion,

    #[error("version number would exceed {}", u32::MAX)]
    VersionOverflow,
}
