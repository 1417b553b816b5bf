use async_trait::async_trait;
use verso_types::{DocumentId, VersionNumber, VersionRecord};

use crate::error::StoreResult;

/// Which rows a query may return with respect to the soft-delete flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActiveFilter {
    /// Every row, soft-deleted or not.
    All,
    /// Only rows whose `active` flag is set.
    ActiveOnly,
}

impl ActiveFilter {
    pub fn admits(self, record: &VersionRecord) -> bool {
        match self {
            Self::All => true,
            Self::ActiveOnly => record.active,
        }
    }
}

/// Keyed access to the version table and the live document rows.
///
/// All implementations must satisfy these invariants:
/// - `(document, number)` is unique; a duplicate insert fails with
///   `StoreError::VersionConflict` and changes nothing.
/// - `insert_version` writes the version row and the live content together
///   or not at all.
/// - Rows are never physically removed by this interface.
/// - Every call reads committed state; there is no caching across calls.
#[async_trait]
pub trait VersionStore: Send + Sync {
    /// Highest version number ever assigned to the document, counting
    /// soft-deleted rows.
    async fn max_version_number(&self, document: &DocumentId) -> StoreResult<Option<VersionNumber>>;

    /// The live document row's current full content.
    ///
    /// Returns `Ok(None)` if the document has no live row yet.
    async fn live_content(&self, document: &DocumentId) -> StoreResult<Option<String>>;

    /// Append a version row and replace the live content in one step.
    async fn insert_version(&self, record: &VersionRecord, live_content: &str) -> StoreResult<()>;

    /// Read one version row regardless of its `active` flag.
    async fn get_version(
        &self,
        document: &DocumentId,
        number: VersionNumber,
    ) -> StoreResult<Option<VersionRecord>>;

    /// The baseline with the largest number `<= at_or_before` admitted by `filter`.
    async fn latest_baseline(
        &self,
        document: &DocumentId,
        at_or_before: VersionNumber,
        filter: ActiveFilter,
    ) -> StoreResult<Option<VersionRecord>>;

    /// All rows admitted by `filter`, in ascending version order.
    async fn list_versions(
        &self,
        document: &DocumentId,
        filter: ActiveFilter,
    ) -> StoreResult<Vec<VersionRecord>>;

    /// Set the soft-delete flag. Returns `true` if the row exists.
    async fn set_active(
        &self,
        document: &DocumentId,
        number: VersionNumber,
        active: bool,
    ) -> StoreResult<bool>;

    /// The row holding the highest version number, soft-deleted or not.
    async fn latest_version(&self, document: &DocumentId) -> StoreResult<Option<VersionRecord>> {
        match self.max_version_number(document).await? {
            Some(max) => self.get_version(document, max).await,
            None => Ok(None),
        }
    }
}
