//! Error types for the document model.

/// Errors that can occur while reading a document tree.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// The JSON is well-formed but does not describe a valid node.
    #[error("invalid node: {0}")]
    InvalidNode(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for tree results.
pub type TreeResult<T> = Result<T, TreeError>;
