use std::sync::Arc;

use tracing::{debug, info};
use verso_history::{ContentReconstructor, HistoryError, VersionSequencer, VersioningConfig};
use verso_store::{ActiveFilter, InMemoryVersionStore, VersionStore};
use verso_tree::{diff_documents, DocumentDiff};
use verso_types::{DocumentId, UserId, VersionNumber};

use crate::error::SdkResult;
use crate::receipt::{RollbackOutcome, SaveReceipt, VersionDetail, VersionEntry};

/// High-level versioning API over a [`VersionStore`].
///
/// Holds no per-document state. Callers are expected to have authorized
/// the request before calling in.
pub struct Versioning<S: ?Sized> {
    store: Arc<S>,
    sequencer: VersionSequencer<S>,
    reconstructor: ContentReconstructor<S>,
}

impl Versioning<InMemoryVersionStore> {
    /// Versioning over a fresh in-memory store.
    pub fn in_memory(config: VersioningConfig) -> SdkResult<Self> {
        Self::new(Arc::new(InMemoryVersionStore::new()), config)
    }
}

impl<S: VersionStore + ?Sized> Versioning<S> {
    pub fn new(store: Arc<S>, config: VersioningConfig) -> SdkResult<Self> {
        config.validate()?;
        let reconstructor = ContentReconstructor::new(store.clone(), &config);
        let sequencer = VersionSequencer::new(store.clone(), config);
        Ok(Self {
            store,
            sequencer,
            reconstructor,
        })
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &VersioningConfig {
        self.sequencer.config()
    }

    // ---- Writes ----

    /// Record a save of `content`. Idempotent on unchanged content.
    pub async fn save(
        &self,
        document: &DocumentId,
        content: &str,
        saved_by: Option<UserId>,
    ) -> SdkResult<SaveReceipt> {
        let outcome = self.sequencer.create_version(document, content, saved_by).await?;
        Ok(SaveReceipt::from_outcome(&outcome)?)
    }

    /// Restore an earlier version by saving its content as a new version.
    ///
    /// History is never rewritten: the target stays where it is and the
    /// restored content is appended.
    pub async fn rollback(
        &self,
        document: &DocumentId,
        target: VersionNumber,
        saved_by: Option<UserId>,
    ) -> SdkResult<RollbackOutcome> {
        let (_, content) = self.reconstructor.resolve(document, target).await?;
        let outcome = self.sequencer.create_version(document, &content, saved_by).await?;
        info!(
            document = %document,
            target = %target,
            version = %outcome.record.number,
            created = outcome.created,
            "rolled back"
        );
        Ok(RollbackOutcome {
            rolled_back_to: target,
            new_version: outcome.record.number,
            content,
            created: outcome.created,
        })
    }

    /// Soft-delete a version. The row, its number, and its place in the
    /// chain are kept.
    pub async fn delete_version(&self, document: &DocumentId, number: VersionNumber) -> SdkResult<()> {
        let active = self
            .store
            .get_version(document, number)
            .await?
            .is_some_and(|r| r.active);
        if !active || !self.store.set_active(document, number, false).await? {
            return Err(HistoryError::VersionNotFound {
                document: *document,
                version: number,
            }
            .into());
        }
        info!(document = %document, version = %number, "version soft-deleted");
        Ok(())
    }

    // ---- Reads ----

    /// Active versions, newest first.
    pub async fn list_versions(&self, document: &DocumentId) -> SdkResult<Vec<VersionEntry>> {
        let rows = self.store.list_versions(document, ActiveFilter::ActiveOnly).await?;
        let entries = rows
            .iter()
            .rev()
            .map(VersionEntry::from_record)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Full content of an active version.
    pub async fn get_version_content(
        &self,
        document: &DocumentId,
        number: VersionNumber,
    ) -> SdkResult<String> {
        let (_, content) = self.reconstructor.resolve(document, number).await?;
        Ok(content)
    }

    /// Metadata and full content of an active version.
    pub async fn get_version(&self, document: &DocumentId, number: VersionNumber) -> SdkResult<VersionDetail> {
        let (record, content) = self.reconstructor.resolve(document, number).await?;
        Ok(VersionDetail {
            entry: VersionEntry::from_record(&record)?,
            content,
        })
    }

    /// Structural diff from version `old` to version `new`.
    pub async fn compare(
        &self,
        document: &DocumentId,
        old: VersionNumber,
        new: VersionNumber,
    ) -> SdkResult<DocumentDiff> {
        let (_, old_content) = self.reconstructor.resolve(document, old).await?;
        let (_, new_content) = self.reconstructor.resolve(document, new).await?;
        let diff = diff_documents(&old_content, &new_content);
        let stats = diff.stats();
        debug!(
            document = %document,
            old = %old,
            new = %new,
            added = stats.added,
            removed = stats.removed,
            moved = stats.moved,
            "versions compared"
        );
        Ok(diff)
    }
}
