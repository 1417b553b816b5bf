use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use verso_history::{ChangeSummary, HistoryResult, SaveOutcome};
use verso_types::{UserId, VersionKind, VersionNumber, VersionRecord};

/// Result of a save.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveReceipt {
    pub version_number: VersionNumber,
    pub summary: ChangeSummary,
    /// `false` if the content was unchanged and the latest version was
    /// returned instead.
    pub created: bool,
}

impl SaveReceipt {
    pub(crate) fn from_outcome(outcome: &SaveOutcome) -> HistoryResult<Self> {
        Ok(Self {
            version_number: outcome.record.number,
            summary: ChangeSummary::of(&outcome.record)?,
            created: outcome.created,
        })
    }
}

/// One row of a version listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionEntry {
    pub version_number: VersionNumber,
    pub kind: VersionKind,
    pub saved_at: DateTime<Utc>,
    pub saved_by: Option<UserId>,
    pub summary: ChangeSummary,
}

impl VersionEntry {
    pub(crate) fn from_record(record: &VersionRecord) -> HistoryResult<Self> {
        Ok(Self {
            version_number: record.number,
            kind: record.kind(),
            saved_at: record.saved_at,
            saved_by: record.saved_by.clone(),
            summary: ChangeSummary::of(record)?,
        })
    }
}

/// A version's metadata together with its reconstructed content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionDetail {
    #[serde(flatten)]
    pub entry: VersionEntry,
    pub content: String,
}

/// Result of rolling a document back to an earlier version.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollbackOutcome {
    pub rolled_back_to: VersionNumber,
    /// The version now holding the restored content.
    pub new_version: VersionNumber,
    pub content: String,
    /// `false` if the document already had the restored content.
    pub created: bool,
}
