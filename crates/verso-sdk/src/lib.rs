//! High-level SDK for Verso.
//!
//! [`Versioning`] is the entry point for services embedding document
//! history: it exposes save, listing, content retrieval, rollback, structural
//! comparison, and soft deletion over any [`VersionStore`].

pub mod error;
pub mod receipt;
pub mod versioning;

pub use error::{SdkError, SdkResult};
pub use receipt::{RollbackOutcome, SaveReceipt, VersionDetail, VersionEntry};
pub use versioning::Versioning;

// Re-export key types
pub use verso_history::{ChainPolicy, ChangeSummary, HistoryError, VersioningConfig};
pub use verso_store::{InMemoryVersionStore, VersionStore};
pub use verso_tree::{Change, DiffStats, DocumentDiff};
pub use verso_types::{DocumentId, UserId, VersionKind, VersionNumber};
