//! Patch-chain replay.

use std::sync::Arc;

use tracing::{debug, warn};
use verso_patch::PatchCodec;
use verso_store::VersionStore;
use verso_types::{DocumentId, VersionBody, VersionNumber, VersionRecord};

use crate::config::{ChainPolicy, VersioningConfig};
use crate::error::{HistoryError, HistoryResult};

/// Rebuilds the content of historical versions.
///
/// Read-only: safe to run concurrently with saves and with other
/// reconstructions.
pub struct ContentReconstructor<S: ?Sized> {
    store: Arc<S>,
    policy: ChainPolicy,
    codec: PatchCodec,
}

impl<S: VersionStore + ?Sized> ContentReconstructor<S> {
    pub fn new(store: Arc<S>, config: &VersioningConfig) -> Self {
        Self {
            store,
            policy: config.chain_policy,
            codec: config.codec(),
        }
    }

    pub fn policy(&self) -> ChainPolicy {
        self.policy
    }

    /// Look up an active version and return it with its full content.
    ///
    /// Fails with `VersionNotFound` for unknown or soft-deleted versions.
    pub async fn resolve(
        &self,
        document: &DocumentId,
        number: VersionNumber,
    ) -> HistoryResult<(VersionRecord, String)> {
        let record = self
            .store
            .get_version(document, number)
            .await?
            .filter(|r| r.active)
            .ok_or(HistoryError::VersionNotFound {
                document: *document,
                version: number,
            })?;
        let content = match record.content() {
            Some(content) => content.to_string(),
            None => self.restore(document, number).await?,
        };
        Ok((record, content))
    }

    /// Rebuild the content of `target` from the nearest preceding baseline.
    pub async fn restore(&self, document: &DocumentId, target: VersionNumber) -> HistoryResult<String> {
        let filter = self.policy.filter();
        let baseline = self
            .store
            .latest_baseline(document, target, filter)
            .await?
            .ok_or_else(|| {
                warn!(document = %document, version = %target, "no baseline to reconstruct from");
                HistoryError::MissingBaseline {
                    document: *document,
                    version: target,
                }
            })?;

        let mut current = baseline.number;
        let mut text = match baseline.body {
            VersionBody::Baseline { content } => content,
            VersionBody::Delta { .. } => {
                return Err(HistoryError::MissingBaseline {
                    document: *document,
                    version: target,
                })
            }
        };

        let mut replayed = 0usize;
        while current < target {
            let next = current.next()?;
            let record = self
                .store
                .get_version(document, next)
                .await?
                .filter(|r| filter.admits(r))
                .ok_or_else(|| {
                    warn!(document = %document, missing = %next, target = %target, "version chain broken");
                    HistoryError::ChainBroken {
                        document: *document,
                        missing: next,
                    }
                })?;

            text = match record.body {
                VersionBody::Delta { patch } => {
                    self.codec.apply(&text, &patch).map_err(|source| {
                        warn!(document = %document, version = %next, error = %source, "patch does not apply");
                        HistoryError::PatchApply {
                            document: *document,
                            version: next,
                            source,
                        }
                    })?
                }
                VersionBody::Baseline { content } => content,
            };
            current = next;
            replayed += 1;
        }

        debug!(
            document = %document,
            version = %target,
            baseline = %baseline.number,
            replayed,
            "version reconstructed"
        );
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verso_patch::PatchError;
    use verso_store::InMemoryVersionStore;

    fn v(n: u32) -> VersionNumber {
        VersionNumber::new(n).unwrap()
    }

    /// Writes rows directly, bypassing the sequencer, so chains of any shape
    /// can be built.
    struct Chain {
        store: Arc<InMemoryVersionStore>,
        doc: DocumentId,
        codec: PatchCodec,
        last: String,
        next: VersionNumber,
    }

    impl Chain {
        fn new() -> Self {
            Self {
                store: Arc::new(InMemoryVersionStore::new()),
                doc: DocumentId::new(),
                codec: PatchCodec::default(),
                last: String::new(),
                next: VersionNumber::FIRST,
            }
        }

        async fn baseline(&mut self, content: &str) {
            let rec = VersionRecord::baseline(self.doc, self.next, content);
            self.store.insert_version(&rec, content).await.unwrap();
            self.advance(content);
        }

        async fn delta(&mut self, content: &str) {
            let patch = self.codec.encode_diff(&self.last, content).unwrap();
            let rec = VersionRecord::delta(self.doc, self.next, patch);
            self.store.insert_version(&rec, content).await.unwrap();
            self.advance(content);
        }

        fn advance(&mut self, content: &str) {
            self.last = content.to_string();
            self.next = self.next.next().unwrap();
        }

        fn reconstructor(&self, policy: ChainPolicy) -> ContentReconstructor<InMemoryVersionStore> {
            let config = VersioningConfig::default().with_chain_policy(policy);
            ContentReconstructor::new(self.store.clone(), &config)
        }
    }

    #[tokio::test]
    async fn replays_deltas_from_baseline() {
        let mut chain = Chain::new();
        chain.baseline("A").await;
        chain.delta("AB").await;
        chain.delta("ABC").await;

        let r = chain.reconstructor(ChainPolicy::IncludeInactive);
        assert_eq!(r.restore(&chain.doc, v(1)).await.unwrap(), "A");
        assert_eq!(r.restore(&chain.doc, v(2)).await.unwrap(), "AB");
        assert_eq!(r.restore(&chain.doc, v(3)).await.unwrap(), "ABC");
    }

    #[tokio::test]
    async fn starts_from_nearest_baseline() {
        let mut chain = Chain::new();
        chain.baseline("one").await;
        chain.delta("two").await;
        chain.baseline("three").await;
        chain.delta("four").await;

        // Break the first segment: the later baseline must still suffice.
        chain.store.purge_version(&chain.doc, v(2)).unwrap();
        let r = chain.reconstructor(ChainPolicy::IncludeInactive);
        assert_eq!(r.restore(&chain.doc, v(4)).await.unwrap(), "four");
    }

    #[tokio::test]
    async fn missing_baseline_is_reported() {
        let mut chain = Chain::new();
        chain.baseline("A").await;
        chain.delta("AB").await;
        chain.store.purge_version(&chain.doc, v(1)).unwrap();

        let r = chain.reconstructor(ChainPolicy::IncludeInactive);
        let err = r.restore(&chain.doc, v(2)).await.unwrap_err();
        assert_eq!(err, HistoryError::MissingBaseline { document: chain.doc, version: v(2) });
    }

    #[tokio::test]
    async fn gap_is_reported_with_missing_number() {
        let mut chain = Chain::new();
        chain.baseline("A").await;
        chain.delta("AB").await;
        chain.delta("ABC").await;
        chain.store.purge_version(&chain.doc, v(2)).unwrap();

        let r = chain.reconstructor(ChainPolicy::IncludeInactive);
        let err = r.restore(&chain.doc, v(3)).await.unwrap_err();
        assert_eq!(err, HistoryError::ChainBroken { document: chain.doc, missing: v(2) });
    }

    #[tokio::test]
    async fn target_past_the_end_is_a_gap() {
        let mut chain = Chain::new();
        chain.baseline("A").await;
        let r = chain.reconstructor(ChainPolicy::IncludeInactive);
        let err = r.restore(&chain.doc, v(2)).await.unwrap_err();
        assert!(matches!(err, HistoryError::ChainBroken { missing, .. } if missing == v(2)));
    }

    #[tokio::test]
    async fn soft_deleted_delta_is_replayed_when_included() {
        let mut chain = Chain::new();
        chain.baseline("A").await;
        chain.delta("AB").await;
        chain.delta("ABC").await;
        chain.store.set_active(&chain.doc, v(2), false).await.unwrap();

        let r = chain.reconstructor(ChainPolicy::IncludeInactive);
        assert_eq!(r.restore(&chain.doc, v(3)).await.unwrap(), "ABC");
    }

    #[tokio::test]
    async fn soft_deleted_delta_breaks_chain_when_excluded() {
        let mut chain = Chain::new();
        chain.baseline("A").await;
        chain.delta("AB").await;
        chain.delta("ABC").await;
        chain.store.set_active(&chain.doc, v(2), false).await.unwrap();

        let r = chain.reconstructor(ChainPolicy::ExcludeInactive);
        let err = r.restore(&chain.doc, v(3)).await.unwrap_err();
        assert_eq!(err, HistoryError::ChainBroken { document: chain.doc, missing: v(2) });
    }

    #[tokio::test]
    async fn misordered_patch_is_reported() {
        let mut chain = Chain::new();
        chain.baseline("first line\n").await;
        // A patch computed against some other text.
        let patch = chain.codec.encode_diff("unrelated\n", "second\n").unwrap();
        let rec = VersionRecord::delta(chain.doc, v(2), patch);
        chain.store.insert_version(&rec, "second\n").await.unwrap();

        let r = chain.reconstructor(ChainPolicy::IncludeInactive);
        let err = r.restore(&chain.doc, v(2)).await.unwrap_err();
        match err {
            HistoryError::PatchApply { version, source, .. } => {
                assert_eq!(version, v(2));
                assert!(matches!(source, PatchError::LengthMismatch { .. }));
            }
            other => panic!("expected PatchApply, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn resolve_returns_baseline_content_directly() {
        let mut chain = Chain::new();
        chain.baseline("A").await;
        chain.delta("AB").await;

        let r = chain.reconstructor(ChainPolicy::IncludeInactive);
        let (rec, content) = r.resolve(&chain.doc, v(1)).await.unwrap();
        assert!(rec.is_full());
        assert_eq!(content, "A");
        let (rec, content) = r.resolve(&chain.doc, v(2)).await.unwrap();
        assert!(!rec.is_full());
        assert_eq!(content, "AB");
    }

    #[tokio::test]
    async fn resolve_hides_soft_deleted_versions() {
        let mut chain = Chain::new();
        chain.baseline("A").await;
        chain.delta("AB").await;
        chain.store.set_active(&chain.doc, v(2), false).await.unwrap();

        let r = chain.reconstructor(ChainPolicy::IncludeInactive);
        let err = r.resolve(&chain.doc, v(2)).await.unwrap_err();
        assert_eq!(err, HistoryError::VersionNotFound { document: chain.doc, version: v(2) });
        let err = r.resolve(&chain.doc, v(7)).await.unwrap_err();
        assert!(matches!(err, HistoryError::VersionNotFound { .. }));
    }
}
