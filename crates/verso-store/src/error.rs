use verso_types::{DocumentId, VersionNumber};

/// Errors from version store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A version with this number already exists for the document.
    #[error("version {number} already exists for document {document}")]
    VersionConflict {
        document: DocumentId,
        number: VersionNumber,
    },

    /// The backend is unreachable or failed.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
