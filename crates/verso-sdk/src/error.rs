use thiserror::Error;
use verso_history::HistoryError;
use verso_store::StoreError;

/// Errors returned by [`crate::Versioning`].
///
/// Store failures always surface as `History(HistoryError::Store(_))`,
/// whether they were hit directly or while saving or reconstructing.
#[derive(Debug, Error)]
pub enum SdkError {
    #[error(transparent)]
    History(#[from] HistoryError),

    #[error("config error: {0}")]
    Config(#[from] verso_history::ConfigError),
}

impl From<StoreError> for SdkError {
    fn from(err: StoreError) -> Self {
        Self::History(HistoryError::Store(err))
    }
}

impl SdkError {
    /// The history error behind this one, if any.
    pub fn as_history(&self) -> Option<&HistoryError> {
        match self {
            Self::History(e) => Some(e),
            Self::Config(_) => None,
        }
    }

    /// The store error behind this one, if any.
    pub fn as_store(&self) -> Option<&StoreError> {
        match self.as_history() {
            Some(HistoryError::Store(e)) => Some(e),
            _ => None,
        }
    }
}

pub type SdkResult<T> = Result<T, SdkError>;
