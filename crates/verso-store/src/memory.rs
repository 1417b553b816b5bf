//! In-memory version store for tests, tooling, and embedding.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use verso_types::{DocumentId, VersionNumber, VersionRecord};

use crate::error::{StoreError, StoreResult};
use crate::traits::{ActiveFilter, VersionStore};

/// Rows belonging to one document.
#[derive(Debug, Default)]
struct DocumentRows {
    live: Option<String>,
    versions: BTreeMap<VersionNumber, VersionRecord>,
}

/// An in-memory implementation of [`VersionStore`].
///
/// All rows live in a `HashMap` behind a `RwLock`. Locks are never held
/// across an `.await`, so the store is safe to share between tasks.
#[derive(Debug, Default)]
pub struct InMemoryVersionStore {
    documents: RwLock<HashMap<DocumentId, DocumentRows>>,
}

impl InMemoryVersionStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or overwrite a live document row without recording a version,
    /// as document creation upstream does.
    pub fn seed_document(&self, document: DocumentId, content: impl Into<String>) -> StoreResult<()> {
        let mut docs = self.write()?;
        docs.entry(document).or_default().live = Some(content.into());
        Ok(())
    }

    /// Physically remove a version row.
    ///
    /// The versioning core never does this. It models out-of-band data loss
    /// so chain-integrity checks can be exercised.
    pub fn purge_version(&self, document: &DocumentId, number: VersionNumber) -> StoreResult<bool> {
        let mut docs = self.write()?;
        Ok(docs
            .get_mut(document)
            .is_some_and(|rows| rows.versions.remove(&number).is_some()))
    }

    /// Number of version rows stored for `document`, soft-deleted or not.
    pub fn row_count(&self, document: &DocumentId) -> StoreResult<usize> {
        Ok(self.read()?.get(document).map_or(0, |rows| rows.versions.len()))
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, HashMap<DocumentId, DocumentRows>>> {
        self.documents
            .read()
            .map_err(|e| StoreError::Backend(format!("lock poisoned: {e}")))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, HashMap<DocumentId, DocumentRows>>> {
        self.documents
            .write()
            .map_err(|e| StoreError::Backend(format!("lock poisoned: {e}")))
    }
}

#[async_trait]
impl VersionStore for InMemoryVersionStore {
    async fn max_version_number(&self, document: &DocumentId) -> StoreResult<Option<VersionNumber>> {
        let docs = self.read()?;
        Ok(docs
            .get(document)
            .and_then(|rows| rows.versions.keys().next_back().copied()))
    }

    async fn live_content(&self, document: &DocumentId) -> StoreResult<Option<String>> {
        let docs = self.read()?;
        Ok(docs.get(document).and_then(|rows| rows.live.clone()))
    }

    async fn insert_version(&self, record: &VersionRecord, live_content: &str) -> StoreResult<()> {
        let mut docs = self.write()?;
        let rows = docs.entry(record.document).or_default();
        if rows.versions.contains_key(&record.number) {
            return Err(StoreError::VersionConflict {
                document: record.document,
                number: record.number,
            });
        }
        rows.versions.insert(record.number, record.clone());
        rows.live = Some(live_content.to_string());
        tracing::trace!(document = %record.document, version = %record.number, "version row inserted");
        Ok(())
    }

    async fn get_version(
        &self,
        document: &DocumentId,
        number: VersionNumber,
    ) -> StoreResult<Option<VersionRecord>> {
        let docs = self.read()?;
        Ok(docs
            .get(document)
            .and_then(|rows| rows.versions.get(&number).cloned()))
    }

    async fn latest_baseline(
        &self,
        document: &DocumentId,
        at_or_before: VersionNumber,
        filter: ActiveFilter,
    ) -> StoreResult<Option<VersionRecord>> {
        let docs = self.read()?;
        Ok(docs.get(document).and_then(|rows| {
            rows.versions
                .range(..=at_or_before)
                .rev()
                .map(|(_, record)| record)
                .find(|record| record.is_full() && filter.admits(record))
                .cloned()
        }))
    }

    async fn list_versions(
        &self,
        document: &DocumentId,
        filter: ActiveFilter,
    ) -> StoreResult<Vec<VersionRecord>> {
        let docs = self.read()?;
        Ok(docs
            .get(document)
            .map(|rows| {
                rows.versions
                    .values()
                    .filter(|record| filter.admits(record))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn set_active(
        &self,
        document: &DocumentId,
        number: VersionNumber,
        active: bool,
    ) -> StoreResult<bool> {
        let mut docs = self.write()?;
        match docs
            .get_mut(document)
            .and_then(|rows| rows.versions.get_mut(&number))
        {
            Some(record) => {
                record.active = active;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
