use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::identity::{DocumentId, UserId};

/// Per-document revision number. Starts at 1 and never reuses a value.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct VersionNumber(u32);

impl VersionNumber {
    /// The first version of every document.
    pub const FIRST: Self = Self(1);

    /// Create a version number, rejecting zero.
    pub fn new(n: u32) -> Result<Self, TypeError> {
        if n == 0 {
            return Err(TypeError::ZeroVersion);
        }
        Ok(Self(n))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// The number that follows this one. Fails past `u32::MAX`.
    pub fn next(self) -> Result<Self, TypeError> {
        self.0.checked_add(1).map(Self).ok_or(TypeError::VersionOverflow)
    }

    /// The number that precedes this one, or `None` for version 1.
    pub fn prev(self) -> Option<Self> {
        (self.0 > 1).then(|| Self(self.0 - 1))
    }

    /// The number following `max`, or version 1 if the document has no versions.
    pub fn after(max: Option<Self>) -> Result<Self, TypeError> {
        max.map_or(Ok(Self::FIRST), Self::next)
    }
}

impl fmt::Debug for VersionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl fmt::Display for VersionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for VersionNumber {
    type Error = TypeError;

    fn try_from(n: u32) -> Result<Self, Self::Error> {
        Self::new(n)
    }
}

impl From<VersionNumber> for u32 {
    fn from(n: VersionNumber) -> Self {
        n.0
    }
}

impl FromStr for VersionNumber {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n: u32 = s
            .trim_start_matches('v')
            .parse()
            .map_err(|_| TypeError::InvalidVersionNumber(s.to_string()))?;
        Self::new(n)
    }
}

/// Whether a version stores full content or a patch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionKind {
    Baseline,
    Delta,
}

/// Payload of a version row. Exactly one of content or patch is present.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum VersionBody {
    /// The complete serialized document.
    Baseline { content: String },
    /// A serialized patch from the previous version's content to this one.
    Delta { patch: String },
}

impl VersionBody {
    pub fn kind(&self) -> VersionKind {
        match self {
            Self::Baseline { .. } => VersionKind::Baseline,
            Self::Delta { .. } => VersionKind::Delta,
        }
    }
}

/// One saved revision of one document.
///
/// Rows are append-only: after creation only `active` ever changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub document: DocumentId,
    pub number: VersionNumber,
    #[serde(flatten)]
    pub body: VersionBody,
    pub saved_at: DateTime<Utc>,
    pub saved_by: Option<UserId>,
    /// Soft-delete flag. Inactive rows are hidden from listings but kept.
    pub active: bool,
}

impl VersionRecord {
    /// A new, active baseline version saved now.
    pub fn baseline(document: DocumentId, number: VersionNumber, content: impl Into<String>) -> Self {
        Self::with_body(document, number, VersionBody::Baseline { content: content.into() })
    }

    /// A new, active delta version saved now.
    pub fn delta(document: DocumentId, number: VersionNumber, patch: impl Into<String>) -> Self {
        Self::with_body(document, number, VersionBody::Delta { patch: patch.into() })
    }

    fn with_body(document: DocumentId, number: VersionNumber, body: VersionBody) -> Self {
        Self {
            document,
            number,
            body,
            saved_at: Utc::now(),
            saved_by: None,
            active: true,
        }
    }

    pub fn saved_by(mut self, user: Option<UserId>) -> Self {
        self.saved_by = user;
        self
    }

    pub fn kind(&self) -> VersionKind {
        self.body.kind()
    }

    /// Returns `true` if this version stores full content.
    pub fn is_full(&self) -> bool {
        matches!(self.body, VersionBody::Baseline { .. })
    }

    /// Full content, present only on baselines.
    pub fn content(&self) -> Option<&str> {
        match &self.body {
            VersionBody::Baseline { content } => Some(content),
            VersionBody::Delta { .. } => None,
        }
    }

    /// Serialized patch, present only on deltas.
    pub fn diff(&self) -> Option<&str> {
        match &self.body {
            VersionBody::Delta { patch } => Some(patch),
            VersionBody::Baseline { .. } => None,
        }
    }
}
