//! Version numbering and the baseline/delta storage decision.

use std::sync::Arc;

use tracing::{debug, info};
use verso_store::VersionStore;
use verso_types::{DocumentId, UserId, VersionNumber, VersionRecord};

use crate::config::VersioningConfig;
use crate::error::{HistoryError, HistoryResult};
use crate::reconstructor::ContentReconstructor;

/// Result of a save.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaveOutcome {
    /// The version now describing the document's content.
    pub record: VersionRecord,
    /// `false` if the content was unchanged and no row was written.
    pub created: bool,
}

/// Assigns version numbers and persists each save as a baseline or a delta.
///
/// Saves to the same document are not serialized here. Two concurrent saves
/// may read the same `max(version)`; the store's uniqueness constraint then
/// rejects the second with `StoreError::VersionConflict`.
pub struct VersionSequencer<S: ?Sized> {
    store: Arc<S>,
    config: VersioningConfig,
    reconstructor: ContentReconstructor<S>,
}

impl<S: VersionStore + ?Sized> VersionSequencer<S> {
    pub fn new(store: Arc<S>, config: VersioningConfig) -> Self {
        let reconstructor = ContentReconstructor::new(store.clone(), &config);
        Self {
            store,
            config,
            reconstructor,
        }
    }

    pub fn config(&self) -> &VersioningConfig {
        &self.config
    }

    /// Record `content` as the next version of `document`.
    ///
    /// Saving content identical to the live document returns the latest
    /// existing version with `created == false`.
    pub async fn create_version(
        &self,
        document: &DocumentId,
        content: &str,
        saved_by: Option<UserId>,
    ) -> HistoryResult<SaveOutcome> {
        if content.is_empty() {
            return Err(HistoryError::EmptyContent { document: *document });
        }

        let max = self.store.max_version_number(document).await?;
        let live = self.store.live_content(document).await?;

        if live.as_deref() == Some(content) {
            if let Some(latest) = self.store.latest_version(document).await? {
                debug!(document = %document, version = %latest.number, "content unchanged, no version created");
                return Ok(SaveOutcome {
                    record: latest,
                    created: false,
                });
            }
        }

        let number = VersionNumber::after(max)?;
        let record = if self.config.is_baseline(number) {
            VersionRecord::baseline(*document, number, content)
        } else {
            let previous = match (live, max) {
                (Some(live), _) => live,
                (None, Some(max)) => self.reconstructor.restore(document, max).await?,
                (None, None) => String::new(),
            };
            let patch = self
                .config
                .codec()
                .encode_diff(&previous, content)
                .map_err(|source| HistoryError::PatchApply {
                    document: *document,
                    version: number,
                    source,
                })?;
            VersionRecord::delta(*document, number, patch)
        }
        .saved_by(saved_by);

        self.store.insert_version(&record, content).await?;
        info!(
            document = %document,
            version = %record.number,
            kind = ?record.kind(),
            bytes = content.len(),
            "version created"
        );

        Ok(SaveOutcome {
            record,
            created: true,
        })
    }
}
