use serde::{Deserialize, Serialize};
use verso_patch::{Patch, PatchSummary};
use verso_types::{VersionBody, VersionRecord};

use crate::error::{HistoryError, HistoryResult};

/// What a version changed, as shown in history listings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ChangeSummary {
    /// A full snapshot of `bytes` bytes.
    Baseline { bytes: usize },
    /// A patch against the previous version.
    Delta(PatchSummary),
}

impl ChangeSummary {
    /// Summarize a stored version without reconstructing it.
    pub fn of(record: &VersionRecord) -> HistoryResult<Self> {
        match &record.body {
            VersionBody::Baseline { content } => Ok(Self::Baseline {
                bytes: content.len(),
            }),
            VersionBody::Delta { patch } => {
                let patch = Patch::decode(patch).map_err(|source| HistoryError::PatchApply {
                    document: record.document,
                    version: record.number,
                    source,
                })?;
                Ok(Self::Delta(patch.summary()))
            }
        }
    }
}
